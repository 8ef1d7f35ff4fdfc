//! Entry points that run a document through the formatter.
//!
//! Both adapters share [`evaluate`], which does the work and reports what happened as an
//! [`Outcome`]. Each adapter then applies its own policy: the command tells the user about
//! every outcome, the provider stays silent and only shapes its return value.

pub mod command;
pub mod provider;

use toml::Table;

use crate::{
    css::Transform,
    error::TransformError,
    host::{CancellationToken, DocumentSnapshot, TextEdit, is_blank},
    service::Formatter,
};

pub use command::{COMMAND_ID, CommandAdapter};
pub use provider::ProviderAdapter;

/// What formatting a snapshot produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The document is empty or whitespace only, the engine was not called
    Blank,
    /// The token was cancelled before or right after formatting
    Cancelled,
    /// The engine returned the input unchanged
    Unchanged,
    /// The whole document has to be replaced
    Changed(TextEdit),
    Failed(TransformError),
}

/// Formats `document`, polling `cancel` before and after the engine call. The output is
/// compared to the input as a plain string.
pub fn evaluate<E, C>(
    formatter: &Formatter<E>,
    document: &DocumentSnapshot,
    overrides: &Table,
    cancel: &C,
) -> Outcome
where
    E: Transform,
    C: CancellationToken + ?Sized,
{
    if is_blank(&document.text) {
        return Outcome::Blank;
    }
    if cancel.is_cancelled() {
        return Outcome::Cancelled;
    }
    let result = formatter.format(&document.text, &document.file_label, overrides);
    if cancel.is_cancelled() {
        return Outcome::Cancelled;
    }
    match result {
        Ok(formatted) if formatted == document.text => Outcome::Unchanged,
        Ok(formatted) => Outcome::Changed(document.replace_all(formatted)),
        Err(e) => Outcome::Failed(e),
    }
}
