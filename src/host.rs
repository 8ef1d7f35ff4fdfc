use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;

/// Language id of documents the command accepts.
pub const CSS_LANGUAGE_ID: &str = "css";

/// Zero-based line and UTF-16 character offset, as editors count them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

/// Replaces `range` with `new_text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: Range,
    pub new_text: String,
}

/// Range from the start of the first line to the end of the last line. `\n`, `\r\n` and `\r`
/// all end a line.
pub fn full_range(text: &str) -> Range {
    let mut line = 0;
    let mut character = 0;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                chars.next_if_eq(&'\n');
                line += 1;
                character = 0;
            }
            '\n' => {
                line += 1;
                character = 0;
            }
            c => character += c.len_utf16() as u32,
        }
    }
    Range {
        start: Position::default(),
        end: Position { line, character },
    }
}

/// Empty or whitespace-only text is never sent to the engine.
#[inline]
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Text of a document as it was when an operation started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSnapshot {
    pub text: String,
    /// Path or URI shown in errors and logs
    pub file_label: String,
    pub language_id: String,
}

impl DocumentSnapshot {
    pub fn new<T, L, I>(text: T, file_label: L, language_id: I) -> Self
    where
        T: Into<String>,
        L: Into<String>,
        I: Into<String>,
    {
        Self {
            text: text.into(),
            file_label: file_label.into(),
            language_id: language_id.into(),
        }
    }

    pub fn full_range(&self) -> Range {
        full_range(&self.text)
    }

    /// An edit replacing the whole document with `new_text`.
    pub fn replace_all(&self, new_text: String) -> TextEdit {
        TextEdit {
            range: self.full_range(),
            new_text,
        }
    }
}

/// Polled at fixed points, never interrupts running work.
pub trait CancellationToken {
    fn is_cancelled(&self) -> bool;
}

/// Token for operations that cannot be cancelled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancelled;

impl CancellationToken for NeverCancelled {
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl CancellationToken for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Acquire)
    }
}

impl<T: CancellationToken + ?Sized> CancellationToken for Arc<T> {
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

impl<T: CancellationToken + ?Sized> CancellationToken for &T {
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// The editor hosting the interactive command.
#[async_trait]
pub trait Editor: Send + Sync {
    /// The document the user is working on, if any.
    async fn active_document(&self) -> Option<DocumentSnapshot>;

    /// Applies `edit` to `document`, resolving once the host confirmed it.
    async fn apply_edit(&self, document: &DocumentSnapshot, edit: TextEdit) -> Result<(), String>;

    /// Shows a message to the user.
    async fn show_message(&self, severity: Severity, message: String);
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn end(text: &str) -> (u32, u32) {
        let range = full_range(text);
        assert_eq!(range.start, Position::default());
        (range.end.line, range.end.character)
    }

    #[test]
    fn range_of_single_line() {
        assert_eq!(end(""), (0, 0));
        assert_eq!(end("a{color:red}"), (0, 12));
    }

    #[test]
    fn range_counts_every_line_break() {
        assert_eq!(end("a {\n}\n"), (2, 0));
        assert_eq!(end("a {\r\n}"), (1, 1));
        assert_eq!(end("a {\r}\r\n\n b"), (3, 2));
    }

    #[test]
    fn range_counts_utf16_units() {
        assert_eq!(end("a::after { content: \"😀é\" }"), (0, 27));
    }

    #[test]
    fn blank_detection() {
        assert!(is_blank(""));
        assert!(is_blank("   \n\t "));
        assert!(!is_blank(" a{} "));
    }

    #[test]
    fn atomic_token() {
        let token = Arc::new(AtomicBool::new(false));
        assert!(!token.is_cancelled());
        token.store(true, Ordering::Release);
        assert!(token.is_cancelled());
        assert!(!NeverCancelled.is_cancelled());
    }
}
