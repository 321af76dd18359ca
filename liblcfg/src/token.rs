//! Tokens produced by the scanner.

use std::fmt;

/// The payload-carrying kind of a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// A bare key name.
    Identifier(String),
    /// `=`
    Equals,
    /// A quoted string, already unescaped. May hold arbitrary bytes.
    String(Vec<u8>),
    /// `[`
    ListOpen,
    /// `]`
    ListClose,
    /// `{`
    MapOpen,
    /// `}`
    MapClose,
    /// `,`
    Comma,
}

impl TokenKind {
    pub fn class(&self) -> TokenClass {
        match self {
            TokenKind::Identifier(_) => TokenClass::Identifier,
            TokenKind::Equals => TokenClass::Equals,
            TokenKind::String(_) => TokenClass::String,
            TokenKind::ListOpen => TokenClass::ListOpen,
            TokenKind::ListClose => TokenClass::ListClose,
            TokenKind::MapOpen => TokenClass::MapOpen,
            TokenKind::MapClose => TokenClass::MapClose,
            TokenKind::Comma => TokenClass::Comma,
        }
    }
}

/// Token kind without its payload, used to describe expectations in errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    Identifier,
    Equals,
    String,
    ListOpen,
    ListClose,
    MapOpen,
    MapClose,
    Comma,
}

impl fmt::Display for TokenClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TokenClass::Identifier => "identifier",
            TokenClass::Equals => "`='",
            TokenClass::String => "string",
            TokenClass::ListOpen => "`['",
            TokenClass::ListClose => "`]'",
            TokenClass::MapOpen => "`{'",
            TokenClass::MapClose => "`}'",
            TokenClass::Comma => "`,'",
        })
    }
}

/// A single token with the 1-based position of the last byte examined for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: u32,
    pub col: u32,
}
