use log::{debug, error};
use toml::Table;

use super::{Outcome, evaluate};
use crate::{
    css::{LightningCss, Transform},
    host::{CancellationToken, DocumentSnapshot, TextEdit},
    service::Formatter,
};

/// Backs the host's "format document" request, which runs on every save. Never talks to the
/// user: `Some(vec![])` means nothing to change, `None` means cancelled or failed.
#[derive(Debug, Clone, Default)]
pub struct ProviderAdapter<E = LightningCss> {
    formatter: Formatter<E>,
    /// Per-workspace option overrides
    overrides: Table,
}

impl<E: Transform> ProviderAdapter<E> {
    pub fn new(formatter: Formatter<E>) -> Self {
        Self {
            formatter,
            overrides: Table::new(),
        }
    }

    pub fn formatter(&self) -> &Formatter<E> {
        &self.formatter
    }

    pub fn with_overrides(mut self, overrides: Table) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn provide_edits<C>(&self, document: &DocumentSnapshot, cancel: &C) -> Option<Vec<TextEdit>>
    where
        C: CancellationToken + ?Sized,
    {
        match evaluate(&self.formatter, document, &self.overrides, cancel) {
            Outcome::Blank | Outcome::Unchanged => Some(Vec::new()),
            Outcome::Changed(edit) => Some(vec![edit]),
            Outcome::Cancelled => {
                debug!("formatting {} cancelled", document.file_label);
                None
            }
            Outcome::Failed(e) => {
                error!("Lightning CSS error in {}: {e}", document.file_label);
                None
            }
        }
    }
}
