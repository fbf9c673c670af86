mod dispatch;
mod form;
mod intent;

use std::io::Write;

use clap::Parser;
use postsync_core::SyncOrchestrator;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use dispatch::{Editor, Flow};

/// Interactive editing session for a posts JSON document and Markdown uploads.
///
/// Configuration is entered with `set <field> <value>` and kept in memory only.
#[derive(Parser, Debug)]
#[command(name = "postsync-editor")]
#[command(about = "Edit posts JSON and publish Markdown to an S3-compatible bucket")]
struct Args {
    /// Do not print the input prompt
    #[arg(long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries notifications.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    info!("Starting postsync-editor session");

    let mut editor = Editor::new(SyncOrchestrator::default());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = std::io::stdout();

    loop {
        if !args.quiet {
            write!(stdout, "> ")?;
            stdout.flush()?;
        }

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let intent = match intent::parse_line(&line) {
            Ok(Some(intent)) => intent,
            Ok(None) => continue,
            Err(e) => {
                // Covers `help` too, which clap reports as an error kind.
                write!(stdout, "{}", e)?;
                continue;
            }
        };

        if editor.dispatch(intent, &mut stdout).await? == Flow::Quit {
            break;
        }
    }

    info!("Session ended");
    Ok(())
}
