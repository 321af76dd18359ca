//! lcfg configuration file parser.
//!
//! lcfg is a small configuration format: `key = value` bindings where a value
//! is a quoted string, a `[ ... ]` list or a `{ ... }` map, with `//` and
//! `/* */` comments. Strings are byte strings and may carry binary data
//! through `\xHH` escapes.
//!
//! # Parsing Pipeline
//!
//! 1. **Scanner**: Reads the source in chunks and turns bytes into tokens
//!    with a finite-state machine, keeping one token of lookahead.
//!
//! 2. **Parser**: A pushdown automaton that turns tokens into a flat, ordered
//!    list of dotted-path bindings such as `servers.0.host`.
//!
//! 3. **Tree builder** (on demand): Rebuilds the nested structure from the
//!    bindings and infers which collections are lists and which are maps.

mod bindings;
mod document;
mod error;
mod parser;
mod path;
mod scanner;
mod token;
mod tree;

use std::io::Read;

pub use bindings::{Binding, Bindings, Visit};
pub use document::Document;
pub use error::{Error, ErrorKind, Expected, Location, ParseContext, Result};
pub use parser::Parser;
pub use path::KeyPath;
pub use scanner::{Scanner, CHUNK_SIZE};
pub use token::{Token, TokenClass, TokenKind};
pub use tree::{build_tree, CollectionKind, Lookup, Node, NodeKind, NodeValue};

/// Parse an lcfg document held in memory.
///
/// # Example
///
/// ```
/// use liblcfg::parse;
///
/// let bindings = parse(br#"list = ["a", "b"]"#).unwrap();
/// assert_eq!(bindings.get("list.1"), Some(&b"b"[..]));
/// ```
pub fn parse(input: &[u8]) -> Result<Bindings> {
    parse_with_filename(input, None)
}

/// Parse an lcfg document with a filename for error messages.
pub fn parse_with_filename(input: &[u8], filename: Option<&str>) -> Result<Bindings> {
    let ctx = ParseContext::new(filename);
    Parser::new(Scanner::new(input, ctx)?).parse()
}

/// Parse an lcfg document from any byte source.
pub fn parse_reader<R: Read>(reader: R) -> Result<Bindings> {
    Parser::new(Scanner::new(reader, ParseContext::default())?).parse()
}
