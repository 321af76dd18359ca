//! Dotted key paths.

use std::fmt;

/// Separator between path components.
pub const SEPARATOR: char = '.';

/// The parser's current path: components joined by `.`.
///
/// Pushes and pops happen in lock-step with the parser's frame stack, so a
/// pop always removes exactly the component pushed last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPath {
    buf: String,
}

impl KeyPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an identifier component.
    pub fn push_key(&mut self, key: &str) {
        self.separate();
        self.buf.push_str(key);
    }

    /// Append a list index component.
    pub fn push_index(&mut self, index: usize) {
        use std::fmt::Write;
        self.separate();
        // Writing to a String cannot fail.
        let _ = write!(self.buf, "{}", index);
    }

    /// Remove the last component.
    pub fn pop(&mut self) {
        match self.buf.rfind(SEPARATOR) {
            Some(at) => self.buf.truncate(at),
            None => self.buf.clear(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    fn separate(&mut self) {
        if !self.buf.is_empty() {
            self.buf.push(SEPARATOR);
        }
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.buf)
    }
}

/// Split a dotted path into its non-empty components.
pub fn components(path: &str) -> impl Iterator<Item = &str> {
    path.split(SEPARATOR).filter(|c| !c.is_empty())
}
