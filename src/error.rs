use std::fmt;

use thiserror::Error;

/// A position in the source, both 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Failure reported by the transform engine.
///
/// `loc` is where the engine stopped, `near` is a secondary position some errors carry (for
/// example the `@custom-media` rule a failing query refers to).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}{}", message_or_unknown(.message), locations(.loc, .near))]
pub struct TransformError {
    pub message: String,
    pub loc: Option<Location>,
    pub near: Option<Location>,
}

fn message_or_unknown(message: &str) -> &str {
    if message.is_empty() {
        "Unknown error"
    } else {
        message
    }
}

fn locations(loc: &Option<Location>, near: &Option<Location>) -> String {
    let mut out = String::new();
    if let Some(loc) = loc {
        out.push_str(&format!(" at {loc}"));
    }
    if let Some(near) = near {
        out.push_str(&format!(" near {near}"));
    }
    out
}

impl TransformError {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
            loc: None,
            near: None,
        }
    }

    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.loc = Some(Location { line, column });
        self
    }

    pub fn near(mut self, line: u32, column: u32) -> Self {
        self.near = Some(Location { line, column });
        self
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::TransformError;

    #[test]
    fn display_appends_present_locations() {
        assert_eq!(TransformError::new("Unexpected token").to_string(), "Unexpected token");
        assert_eq!(
            TransformError::new("Unexpected token").at(3, 5).to_string(),
            "Unexpected token at line 3, column 5"
        );
        assert_eq!(
            TransformError::new("Unexpected token").near(1, 2).to_string(),
            "Unexpected token near line 1, column 2"
        );
        assert_eq!(
            TransformError::new("Bad media").at(4, 1).near(1, 15).to_string(),
            "Bad media at line 4, column 1 near line 1, column 15"
        );
    }

    #[test]
    fn empty_message_is_unknown() {
        assert_eq!(TransformError::new("").to_string(), "Unknown error");
    }
}
