use std::collections::HashSet;

use lightningcss::{
    error::{Error, ErrorLocation, MinifyErrorKind},
    printer::PrinterOptions,
    stylesheet::{MinifyOptions, ParserFlags, ParserOptions, StyleSheet},
    targets::{Browsers, Targets},
};

use crate::{error::TransformError, options::TransformOptions};

/// Something that turns CSS source into CSS output.
pub trait Transform {
    fn transform(
        &self,
        filename: &str,
        code: &[u8],
        options: &TransformOptions,
    ) -> Result<String, TransformError>;
}

/// The Lightning CSS engine: parse, optimize (merges shorthands and drops duplicates), print.
#[derive(Debug, Clone, Copy, Default)]
pub struct LightningCss;

impl LightningCss {
    fn targets(options: &TransformOptions) -> Result<Targets, TransformError> {
        let mut targets = Targets::default();
        if let Some(queries) = &options.targets {
            targets.browsers = Browsers::from_browserslist(queries.iter().map(String::as_str))
                .map_err(|e| TransformError::new(format!("Invalid browserslist targets: {e}")))?;
        }
        Ok(targets)
    }
}

impl Transform for LightningCss {
    fn transform(
        &self,
        filename: &str,
        code: &[u8],
        options: &TransformOptions,
    ) -> Result<String, TransformError> {
        let src = std::str::from_utf8(code)
            .map_err(|e| TransformError::new(format!("Invalid UTF-8 in CSS source: {e}")))?;
        let targets = Self::targets(options)?;

        let mut flags = ParserFlags::empty();
        if options.drafts.custom_media {
            flags |= ParserFlags::CUSTOM_MEDIA;
        }
        let mut stylesheet = StyleSheet::parse(
            src,
            ParserOptions {
                filename: filename.to_owned(),
                error_recovery: options.error_recovery,
                flags,
                ..ParserOptions::default()
            },
        )
        .map_err(|e| convert(&e))?;

        stylesheet
            .minify(MinifyOptions {
                targets: targets.clone(),
                unused_symbols: options.unused_symbols.iter().cloned().collect::<HashSet<_>>(),
            })
            .map_err(|e| {
                let err = convert(&e);
                match &e.kind {
                    MinifyErrorKind::UnsupportedCustomMediaBooleanLogic { custom_media_loc } => {
                        err.near(custom_media_loc.line + 1, custom_media_loc.column)
                    }
                    _ => err,
                }
            })?;

        Ok(stylesheet
            .to_css(PrinterOptions {
                minify: options.minify,
                targets,
                ..PrinterOptions::default()
            })
            .map_err(|e| convert(&e))?
            .code)
    }
}

/// Lightning CSS lines start at 0, columns at 1.
fn convert<T: std::fmt::Display>(e: &Error<T>) -> TransformError {
    let err = TransformError::new(e.kind.to_string());
    match &e.loc {
        Some(ErrorLocation { line, column, .. }) => err.at(line + 1, *column),
        None => err,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{LightningCss, Transform};
    use crate::options::{self, TransformOptions};

    fn run(src: &str, options: &TransformOptions) -> Result<String, crate::error::TransformError> {
        LightningCss.transform("test.css", src.as_bytes(), options)
    }

    #[test]
    fn prints_pretty_and_merges() {
        let options = options::shape(&toml::Table::new()).unwrap();
        assert_eq!(
            run("a{color:red;color:red}", &options).unwrap(),
            "a {\n  color: red;\n}\n"
        );
    }

    #[test]
    fn minify_option_is_honoured() {
        let options = options::shape(&"minify = true".parse().unwrap()).unwrap();
        assert_eq!(run("a { color: red; }", &options).unwrap(), "a{color:red}");
    }

    #[test]
    fn custom_media_is_inlined_for_old_targets() {
        let src = "@custom-media --narrow (max-width: 30em);\n@media (--narrow) {\n  a {\n    color: red;\n  }\n}\n";

        // Modern output keeps the rule as written
        let modern = options::shape(&toml::Table::new()).unwrap();
        let out = run(src, &modern).unwrap();
        assert!(out.contains("--narrow"), "{out}");

        let old = options::shape(&"targets = [\"chrome 80\"]".parse().unwrap()).unwrap();
        let out = run(src, &old).unwrap();
        assert!(!out.contains("--narrow"), "{out}");
        assert!(out.contains("(max-width: 30em)"), "{out}");

        let no_drafts =
            options::shape(&"targets = [\"chrome 80\"]\n[drafts]".parse().unwrap()).unwrap();
        let out = run(src, &no_drafts).unwrap();
        assert!(out.contains("--narrow"), "{out}");
    }

    #[test]
    fn parse_error_has_location() {
        let options = options::shape(&toml::Table::new()).unwrap();
        let err = run("a {\n  color: red;\n}\n\n% {\n  color: blue;\n}\n", &options).unwrap_err();
        assert!(!err.message.is_empty());
        let loc = err.loc.expect("parse errors carry a location");
        assert!(loc.line >= 1);
    }

    #[test]
    fn invalid_utf8_fails() {
        let options = TransformOptions::default();
        let err = LightningCss
            .transform("test.css", &[0xff, 0xfe], &options)
            .unwrap_err();
        assert!(err.message.contains("UTF-8"));
    }
}
