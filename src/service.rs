use log::debug;
use toml::Table;

use crate::{
    css::{LightningCss, Transform},
    error::TransformError,
    options,
};

/// Shapes the options and hands the source to the engine. Holds no state between calls.
#[derive(Debug, Clone, Default)]
pub struct Formatter<E = LightningCss> {
    engine: E,
}

impl<E: Transform> Formatter<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Formats `src`. `file_label` is only used by the engine for error reporting. Blank input
    /// is not special-cased here, callers filter it out first.
    pub fn format(
        &self,
        src: &str,
        file_label: &str,
        overrides: &Table,
    ) -> Result<String, TransformError> {
        let options = options::shape(overrides)?;
        debug!("formatting {file_label} ({} bytes)", src.len());
        self.engine.transform(file_label, src.as_bytes(), &options)
    }
}
