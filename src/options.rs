use serde::{Deserialize, Serialize};
use toml::{Table, Value};

use crate::error::TransformError;

/// Draft CSS syntax the engine should accept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Drafts {
    /// `@custom-media` rules and `(--name)` media queries
    pub custom_media: bool,
}

/// Options handed to the transform engine, after overrides were applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformOptions {
    /// Minify the printed output
    pub minify: bool,
    /// Emit a source map. Accepted for compatibility, maps are never produced
    pub source_map: bool,
    pub drafts: Drafts,
    /// Browserslist queries used to pick the output syntax
    pub targets: Option<Vec<String>>,
    /// Class names, ids and keyframes that can be dropped
    pub unused_symbols: Vec<String>,
    /// Skip invalid rules and declarations instead of failing
    pub error_recovery: bool,
    /// Keys the engine does not know about, kept as they were given
    #[serde(flatten)]
    pub extra: Table,
}

/// Returns the option set every format starts from: no minification, no source map, custom
/// media enabled.
pub fn base() -> Table {
    let mut drafts = Table::new();
    drafts.insert("custom_media".into(), Value::Boolean(true));

    let mut base = Table::new();
    base.insert("minify".into(), Value::Boolean(false));
    base.insert("source_map".into(), Value::Boolean(false));
    base.insert("drafts".into(), Value::Table(drafts));
    base
}

/// Overlays `overrides` on top of `base` one top-level key at a time. A nested table in the
/// overrides replaces the whole group it names.
pub fn merge(base: &Table, overrides: &Table) -> Table {
    let mut merged = base.clone();
    for (key, value) in overrides {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Builds the engine options for a set of overrides.
pub fn shape(overrides: &Table) -> Result<TransformOptions, TransformError> {
    Value::Table(merge(&base(), overrides))
        .try_into()
        .map_err(|e| TransformError::new(format!("Invalid transform option: {e}")))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use toml::{Table, Value};

    use super::*;

    fn table(src: &str) -> Table {
        src.parse().unwrap()
    }

    #[test]
    fn no_overrides_gives_base() {
        let options = shape(&Table::new()).unwrap();
        assert!(!options.minify);
        assert!(!options.source_map);
        assert!(options.drafts.custom_media);
        assert!(options.extra.is_empty());
    }

    #[test]
    fn scalar_override_wins() {
        let merged = merge(&base(), &table("minify = true"));
        assert_eq!(merged["minify"], Value::Boolean(true));
        assert_eq!(merged["source_map"], Value::Boolean(false));
        assert_eq!(merged["drafts"], base()["drafts"]);
    }

    #[test]
    fn nested_override_replaces_group() {
        let options = shape(&table("[drafts]")).unwrap();
        assert_eq!(options.drafts, Drafts::default());
        assert!(!options.drafts.custom_media);
        assert!(!options.minify);
    }

    #[test]
    fn unknown_keys_pass_through() {
        let options = shape(&table("css_modules = true\nproject_root = \"/tmp\"")).unwrap();
        assert_eq!(options.extra["css_modules"], Value::Boolean(true));
        assert_eq!(
            options.extra["project_root"],
            Value::String("/tmp".to_owned())
        );
    }

    #[test]
    fn mistyped_option_fails() {
        let err = shape(&table("minify = \"yes\"")).unwrap_err();
        assert!(err.message.starts_with("Invalid transform option"));
    }
}
