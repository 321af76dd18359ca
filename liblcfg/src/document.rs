//! A configuration handle binding one source to its parse result.

use std::fs::File;
use std::io::Read;
use std::ops::ControlFlow;
use std::path::Path;

use crate::bindings::{Bindings, Visit};
use crate::error::{Error, ParseContext, Result};
use crate::parser::Parser;
use crate::scanner::Scanner;
use crate::tree::{self, Node};

/// A configuration source and, once parsed, its bindings.
///
/// ```
/// use liblcfg::Document;
///
/// let mut doc = Document::from_reader(&b"greeting = \"hello\""[..]);
/// doc.parse().unwrap();
/// assert_eq!(doc.get("greeting"), Some(&b"hello"[..]));
/// ```
pub struct Document<R> {
    source: Option<R>,
    ctx: ParseContext,
    bindings: Bindings,
}

impl Document<File> {
    /// Open a configuration file. The file name is used in error locations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Open {
            path: path.display().to_string(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::from_reader(file).with_filename(&name))
    }
}

impl<R: Read> Document<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            source: Some(reader),
            ctx: ParseContext::default(),
            bindings: Bindings::new(),
        }
    }

    /// Name the source in error messages.
    pub fn with_filename(mut self, name: &str) -> Self {
        self.ctx = ParseContext::new(Some(name));
        self
    }

    /// Run the scanner and parser over the whole source.
    ///
    /// The source is consumed; calling this again fails with
    /// [`Error::SourceConsumed`]. On error no bindings are kept.
    pub fn parse(&mut self) -> Result<()> {
        let reader = self.source.take().ok_or(Error::SourceConsumed)?;
        self.bindings = Bindings::new();
        let scanner = Scanner::new(reader, self.ctx.clone())?;
        self.bindings = Parser::new(scanner).parse()?;
        Ok(())
    }
}

impl<R> Document<R> {
    /// Call `f` for every binding in order; see [`Bindings::visit`].
    pub fn visit<F>(&self, f: F) -> Visit
    where
        F: FnMut(&str, &[u8]) -> ControlFlow<()>,
    {
        self.bindings.visit(f)
    }

    /// Value of the first binding at `path`.
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.bindings.get(path)
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Build the typed tree from the current bindings.
    pub fn build_tree(&self) -> Node {
        tree::build_tree(&self.bindings)
    }

    pub fn filename(&self) -> Option<&str> {
        self.ctx.filename.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::tree::Lookup;

    #[test]
    fn test_parse_then_query() {
        let mut doc = Document::from_reader(&br#"a = { b = ["x", "y"] }"#[..]);
        doc.parse().unwrap();
        assert_eq!(doc.get("a.b.1"), Some(&b"y"[..]));
        assert_eq!(doc.bindings().len(), 2);
        let root = doc.build_tree();
        assert!(matches!(root.get_list("a.b"), Lookup::Found(_)));
    }

    #[test]
    fn test_second_parse_is_rejected() {
        let mut doc = Document::from_reader(&b"a = \"b\""[..]);
        doc.parse().unwrap();
        let err = doc.parse().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
        // The earlier result is still there.
        assert_eq!(doc.get("a"), Some(&b"b"[..]));
    }

    #[test]
    fn test_failed_parse_exposes_nothing() {
        let mut doc = Document::from_reader(&br#"ok = "1" broken = ["#[..]);
        assert!(doc.parse().is_err());
        assert!(doc.bindings().is_empty());
        assert_eq!(doc.get("ok"), None);
        assert_eq!(doc.visit(|_, _| ControlFlow::Break(())), Visit::Completed);
    }

    #[test]
    fn test_filename_in_errors() {
        let mut doc = Document::from_reader(&b"a = 1"[..]).with_filename("app.conf");
        let err = doc.parse().unwrap_err();
        assert!(err.to_string().ends_with("of <app.conf>"), "{err}");
        assert_eq!(doc.filename(), Some("app.conf"));
    }

    #[test]
    fn test_open_missing_file() {
        let err = Document::open("/definitely/not/here.conf").err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.to_string().starts_with("open(/definitely/not/here.conf): "));
    }
}
