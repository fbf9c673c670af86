//! Event-dispatch layer: one intent in, one line of feedback out.

use std::io::Write;

use postsync_core::{Notification, Session, SyncOrchestrator};
use tracing::debug;

use crate::form::ConfigForm;
use crate::intent::Intent;

/// Starting contents of the Markdown buffer.
pub const DEFAULT_MARKDOWN: &str = "## Hello from Markdown";

/// Whether the input loop should keep reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Session state owned by the dispatch layer.
pub struct Editor {
    orchestrator: SyncOrchestrator,
    session: Session,
    form: ConfigForm,
}

impl Editor {
    pub fn new(orchestrator: SyncOrchestrator) -> Self {
        Self {
            orchestrator,
            session: Session::with_markdown(DEFAULT_MARKDOWN),
            form: ConfigForm::default(),
        }
    }

    /// Run one intent to completion and write its feedback to `out`.
    pub async fn dispatch(&mut self, intent: Intent, out: &mut impl Write) -> std::io::Result<Flow> {
        debug!(?intent, "Dispatching intent");

        let notification = match intent {
            Intent::Set { field, value } => {
                self.form.set(field, value);
                None
            }
            Intent::Show => {
                writeln!(out, "{}", self.form)?;
                writeln!(out, "storage:    {}", initialized_label(&self.session))?;
                None
            }
            Intent::Init => {
                let snapshot = self.form.snapshot();
                Some(
                    self.orchestrator
                        .on_initialize(&mut self.session, &snapshot.storage),
                )
            }
            Intent::Fetch => {
                let snapshot = self.form.snapshot();
                let notification = self.orchestrator.on_fetch(&mut self.session, &snapshot).await;
                if notification.is_success() {
                    writeln!(out, "{}", self.session.json_buffer())?;
                }
                Some(notification)
            }
            Intent::Json => {
                writeln!(out, "{}", self.session.json_buffer())?;
                None
            }
            Intent::JsonLoad { path } => match tokio::fs::read_to_string(&path).await {
                Ok(text) => {
                    self.orchestrator.on_json_edit(&mut self.session, &text);
                    Some(Notification::Success(format!(
                        "Loaded {} into the JSON buffer.",
                        path.display()
                    )))
                }
                Err(e) => Some(Notification::Failure(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                ))),
            },
            Intent::Save => {
                let snapshot = self.form.snapshot();
                Some(
                    self.orchestrator
                        .on_save(&snapshot, self.session.json_buffer())
                        .await,
                )
            }
            Intent::MdLoad { path } => match tokio::fs::read_to_string(&path).await {
                Ok(text) => {
                    self.orchestrator.on_markdown_edit(&mut self.session, &text);
                    Some(Notification::Success(format!(
                        "Loaded {} into the Markdown buffer.",
                        path.display()
                    )))
                }
                Err(e) => Some(Notification::Failure(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                ))),
            },
            Intent::MdAppend { text } => {
                let mut buffer = self.session.markdown_buffer().to_string();
                if !buffer.is_empty() && !buffer.ends_with('\n') {
                    buffer.push('\n');
                }
                buffer.push_str(&text);
                self.orchestrator.on_markdown_edit(&mut self.session, &buffer);
                None
            }
            Intent::Preview => {
                let view = postsync_core::preview::project(self.session.markdown_buffer());
                let rendered = serde_json::to_string_pretty(&view)
                    .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
                writeln!(out, "{}", rendered)?;
                None
            }
            Intent::Upload { content_id } => {
                let snapshot = self.form.snapshot();
                Some(
                    self.orchestrator
                        .on_upload(
                            &self.session,
                            &snapshot,
                            &content_id,
                            self.session.markdown_buffer(),
                        )
                        .await,
                )
            }
            Intent::Quit => return Ok(Flow::Quit),
        };

        if let Some(notification) = notification {
            write_notification(out, &notification)?;
        }
        Ok(Flow::Continue)
    }
}

fn initialized_label(session: &Session) -> &'static str {
    if session.is_initialized() {
        "initialized"
    } else {
        "not initialized"
    }
}

fn write_notification(out: &mut impl Write, notification: &Notification) -> std::io::Result<()> {
    match notification {
        Notification::Success(message) => writeln!(out, "ok: {}", message),
        Notification::Failure(message) => writeln!(out, "error: {}", message),
    }
}
