//! Error types for lcfg parsing.

use std::fmt;
use std::io;

use thiserror::Error;

use crate::token::TokenClass;

/// Result type for lcfg operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Parse context carrying filename for error reporting.
#[derive(Clone, Debug, Default)]
pub struct ParseContext {
    pub filename: Option<String>,
}

impl ParseContext {
    /// Create a new parse context.
    pub fn new(filename: Option<&str>) -> Self {
        Self {
            filename: filename.map(String::from),
        }
    }

    /// Build a location for error messages.
    pub fn locate(&self, line: u32, col: u32) -> Location {
        Location {
            line,
            col,
            file: self.filename.clone(),
        }
    }
}

/// A 1-based position in the source, optionally tagged with its file name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    pub line: u32,
    pub col: u32,
    pub file: Option<String>,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "near line {}, col {}", self.line, self.col)?;
        if let Some(name) = &self.file {
            write!(f, " of <{}>", name)?;
        }
        Ok(())
    }
}

/// The set of tokens a parser state would have accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Expected(pub &'static [TokenClass]);

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.0.len();
        for (i, class) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(if i + 1 == n { " or " } else { ", " })?;
            }
            write!(f, "{}", class)?;
        }
        Ok(())
    }
}

/// Coarse classification of an [`Error`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The source could not be opened or read.
    Io,
    /// The byte stream is not a valid token sequence.
    Lex,
    /// A token arrived that the grammar does not allow in the current state.
    Parse,
    /// Input ended inside an open list or map.
    Structural,
    /// The handle was used in a way its lifecycle does not allow.
    Usage,
}

/// Error type for lcfg parsing.
#[derive(Error, Debug)]
pub enum Error {
    /// Opening the source failed.
    #[error("open({path}): {source}")]
    Open { path: String, source: io::Error },

    /// Reading from the source failed.
    #[error("read(): {0}")]
    Read(#[source] io::Error),

    /// A byte that cannot start or continue any token.
    #[error("parse error: invalid input character `{}' (0x{byte:02x}) {loc}", printable(.byte))]
    InvalidCharacter { byte: u8, loc: Location },

    /// A backslash followed by an unknown escape letter.
    #[error("invalid string escape sequence `{}' {loc}", printable(.byte))]
    InvalidEscape { byte: u8, loc: Location },

    /// `\x` not followed by two hex digits.
    #[error("invalid hex escape sequence `{}' {loc}", printable(.byte))]
    InvalidHexEscape { byte: u8, loc: Location },

    /// Input ended inside a string, escape or comment.
    #[error("parse error: premature end of file {loc}")]
    PrematureEof { loc: Location },

    /// A token the current grammar state does not accept.
    #[error("invalid token ({found}) {loc}: expected {expected}")]
    UnexpectedToken {
        found: TokenClass,
        expected: Expected,
        loc: Location,
    },

    /// Input ended while a list or map was still open.
    #[error("unexpected end of file: unterminated list/map {loc}")]
    Unterminated { loc: Location },

    /// The document's source was already consumed by an earlier parse.
    #[error("configuration source already consumed by an earlier parse")]
    SourceConsumed,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Open { .. } | Error::Read(_) => ErrorKind::Io,
            Error::InvalidCharacter { .. }
            | Error::InvalidEscape { .. }
            | Error::InvalidHexEscape { .. }
            | Error::PrematureEof { .. } => ErrorKind::Lex,
            Error::UnexpectedToken { .. } => ErrorKind::Parse,
            Error::Unterminated { .. } => ErrorKind::Structural,
            Error::SourceConsumed => ErrorKind::Usage,
        }
    }

    /// Source location of the error, if it has one.
    pub fn location(&self) -> Option<&Location> {
        match self {
            Error::InvalidCharacter { loc, .. }
            | Error::InvalidEscape { loc, .. }
            | Error::InvalidHexEscape { loc, .. }
            | Error::PrematureEof { loc }
            | Error::UnexpectedToken { loc, .. }
            | Error::Unterminated { loc } => Some(loc),
            Error::Open { .. } | Error::Read(_) | Error::SourceConsumed => None,
        }
    }
}

/// Render a byte for an error message, substituting `.` for non-printables.
fn printable(byte: &u8) -> char {
    if byte.is_ascii_graphic() || *byte == b' ' {
        *byte as char
    } else {
        '.'
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_display() {
        let ctx = ParseContext::new(None);
        assert_eq!(ctx.locate(3, 7).to_string(), "near line 3, col 7");
        let ctx = ParseContext::new(Some("app.conf"));
        assert_eq!(ctx.locate(1, 2).to_string(), "near line 1, col 2 of <app.conf>");
    }

    #[test]
    fn test_expected_display() {
        let one = Expected(&[TokenClass::Equals]);
        assert_eq!(one.to_string(), "`='");
        let many = Expected(&[TokenClass::String, TokenClass::ListOpen, TokenClass::MapOpen]);
        assert_eq!(many.to_string(), "string, `[' or `{'");
    }

    #[test]
    fn test_non_printable_byte_message() {
        let err = Error::InvalidCharacter {
            byte: 0x01,
            loc: ParseContext::new(None).locate(1, 1),
        };
        assert_eq!(
            err.to_string(),
            "parse error: invalid input character `.' (0x01) near line 1, col 1"
        );
        assert_eq!(err.kind(), ErrorKind::Lex);
    }
}
