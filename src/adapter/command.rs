use log::{debug, error, warn};
use toml::Table;

use super::{Outcome, evaluate};
use crate::{
    css::{LightningCss, Transform},
    host::{CSS_LANGUAGE_ID, Editor, NeverCancelled, Severity},
    service::Formatter,
};

/// Identifier the command is registered under.
pub const COMMAND_ID: &str = "lightning-css-formatter.formatAndMerge";

pub const NO_EDITOR: &str = "No active editor found.";
pub const NOT_CSS: &str = "This command only works on CSS files.";
pub const EMPTY: &str = "CSS file is empty.";
pub const ALREADY_FORMATTED: &str = "CSS is already formatted and optimized.";
pub const FORMATTED: &str = "CSS formatted and shorthands merged successfully using Lightning CSS!";

/// The interactive "format and merge" command. Every run ends with exactly one message to the
/// user and at most one edit.
#[derive(Debug, Clone, Default)]
pub struct CommandAdapter<E = LightningCss> {
    formatter: Formatter<E>,
}

impl<E: Transform> CommandAdapter<E> {
    pub fn new(formatter: Formatter<E>) -> Self {
        Self { formatter }
    }

    pub fn formatter(&self) -> &Formatter<E> {
        &self.formatter
    }

    pub async fn run<H: Editor + ?Sized>(&self, editor: &H) {
        let Some(document) = editor.active_document().await else {
            editor
                .show_message(Severity::Warning, NO_EDITOR.to_owned())
                .await;
            return;
        };
        if document.language_id != CSS_LANGUAGE_ID {
            debug!(
                "refusing to format {} ({})",
                document.file_label, document.language_id
            );
            editor.show_message(Severity::Warning, NOT_CSS.to_owned()).await;
            return;
        }

        let (severity, message) =
            match evaluate(&self.formatter, &document, &Table::new(), &NeverCancelled) {
                Outcome::Blank => (Severity::Info, EMPTY.to_owned()),
                Outcome::Unchanged => (Severity::Info, ALREADY_FORMATTED.to_owned()),
                Outcome::Changed(edit) => match editor.apply_edit(&document, edit).await {
                    Ok(()) => (Severity::Info, FORMATTED.to_owned()),
                    Err(e) => {
                        warn!("edit on {} was not applied: {e}", document.file_label);
                        (
                            Severity::Error,
                            format!("Lightning CSS Formatting Error: failed to apply edit: {e}"),
                        )
                    }
                },
                Outcome::Failed(e) => {
                    error!("Lightning CSS error in {}: {e}", document.file_label);
                    (
                        Severity::Error,
                        format!("Lightning CSS Formatting Error: {e}"),
                    )
                }
                Outcome::Cancelled => return,
            };
        editor.show_message(severity, message).await;
    }
}
