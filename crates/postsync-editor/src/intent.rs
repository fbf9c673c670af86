use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// One line of operator input.
#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_version_flag = true)]
pub struct IntentLine {
    #[command(subcommand)]
    pub intent: Intent,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Intent {
    /// Set a configuration field for this session
    Set {
        field: Field,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Show the current configuration (secret redacted)
    Show,

    /// Build the storage client from the current configuration
    #[command(alias = "initialize")]
    Init,

    /// Fetch the posts JSON into the JSON buffer
    Fetch,

    /// Print the JSON buffer
    Json,

    /// Replace the JSON buffer with the contents of a file
    JsonLoad { path: PathBuf },

    /// Send the JSON buffer back to the posts API
    Save,

    /// Replace the Markdown buffer with the contents of a file
    MdLoad { path: PathBuf },

    /// Append a line to the Markdown buffer
    MdAppend {
        #[arg(allow_hyphen_values = true, default_value = "")]
        text: String,
    },

    /// Print the rendered preview payload for the Markdown buffer
    Preview,

    /// Publish the Markdown buffer as `<content_id>.md`
    Upload { content_id: String },

    /// End the session
    #[command(alias = "exit")]
    Quit,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    ApiUrl,
    Endpoint,
    Bucket,
    AccessKey,
    SecretKey,
}

/// Parse a raw input line. `Ok(None)` for blank lines.
///
/// Free-text arguments are taken from the rest of the line as typed: `set`
/// values and file paths keep inner spaces, `md-append` keeps everything after
/// the single separator following the command.
pub fn parse_line(line: &str) -> Result<Option<Intent>, clap::Error> {
    let line = line.trim_start();
    if line.trim_end().is_empty() {
        return Ok(None);
    }

    let (command, rest) = split_word(line);
    let mut args = vec![command.to_string()];
    match command {
        "set" => {
            let (field, value) = split_word(rest.trim_start());
            args.extend(
                [field, value.trim()]
                    .into_iter()
                    .filter(|arg| !arg.is_empty())
                    .map(str::to_string),
            );
        }
        "json-load" | "md-load" => {
            let path = rest.trim();
            if !path.is_empty() {
                args.push(path.to_string());
            }
        }
        "md-append" => {
            if !rest.is_empty() {
                args.push(rest.to_string());
            }
        }
        _ => args.extend(rest.split_whitespace().map(str::to_string)),
    }

    IntentLine::try_parse_from(args).map(|parsed| Some(parsed.intent))
}

/// Split at the first whitespace character, dropping only that character.
fn split_word(text: &str) -> (&str, &str) {
    match text.char_indices().find(|(_, c)| c.is_whitespace()) {
        Some((index, separator)) => (&text[..index], &text[index + separator.len_utf8()..]),
        None => (text, ""),
    }
}
