//! Phase 1: Scanner
//!
//! The scanner pulls raw bytes from a [`Read`] source in fixed-size chunks and
//! runs a byte-level state machine over them. It:
//! - Skips whitespace, `//` line comments and `/* */` block comments
//! - Emits the single-byte punctuation tokens
//! - Accumulates identifiers and quoted strings (decoding escapes)
//!
//! One token is always prepared ahead of the caller so that end of input can
//! be tested without consuming anything.

use std::io::{self, Read};

use crate::error::{Error, Location, ParseContext, Result};
use crate::token::{Token, TokenKind};

/// Number of bytes requested from the source per read.
pub const CHUNK_SIZE: usize = 4096;

/// Lexer state between two bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexState {
    /// Ready for the next token.
    Start,
    /// Saw `/`, need `/` or `*`.
    CommentStart,
    LineComment,
    BlockComment,
    /// Saw `*` inside a block comment.
    BlockCommentEnd,
    Identifier,
    Str,
    /// Saw `\` inside a string.
    Escape,
    /// Saw `\x`, need the high nibble.
    HexFirst,
    /// Saw `\x` and the high nibble.
    HexSecond(u8),
}

/// Tokenizer over a byte source.
pub struct Scanner<R> {
    reader: R,
    ctx: ParseContext,
    chunk: Box<[u8]>,
    offset: usize,
    filled: usize,
    eof: bool,
    line: u32,
    col: u32,
    lookahead: Option<Token>,
    failed: bool,
}

impl<R: Read> Scanner<R> {
    /// Create a scanner and prepare the first token.
    pub fn new(reader: R, ctx: ParseContext) -> Result<Self> {
        let mut scanner = Self {
            reader,
            ctx,
            chunk: vec![0; CHUNK_SIZE].into_boxed_slice(),
            offset: 0,
            filled: 0,
            eof: false,
            line: 1,
            col: 1,
            lookahead: None,
            failed: false,
        };
        scanner.lookahead = scanner.read_token()?;
        Ok(scanner)
    }

    /// Whether another token is available.
    pub fn has_next(&self) -> bool {
        self.lookahead.is_some()
    }

    /// Peek at the prepared token without consuming it.
    pub fn peek_token(&self) -> Option<&Token> {
        self.lookahead.as_ref()
    }

    /// Take the prepared token and prepare the one after it.
    ///
    /// Returns `Ok(None)` at end of input. Because of the lookahead, a lexical
    /// error in the following token is reported by this call.
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        let Some(token) = self.lookahead.take() else {
            return Ok(None);
        };
        self.lookahead = self.read_token()?;
        Ok(Some(token))
    }

    /// Current read position (the next byte to be consumed).
    pub fn location(&self) -> Location {
        self.ctx.locate(self.line, self.col)
    }

    pub fn context(&self) -> &ParseContext {
        &self.ctx
    }

    /// Look at the next byte without consuming it, refilling the chunk as needed.
    fn peek(&mut self) -> Result<Option<u8>> {
        if self.offset == self.filled && !self.eof {
            self.fill()?;
        }
        Ok(self.chunk[..self.filled].get(self.offset).copied())
    }

    fn fill(&mut self) -> Result<()> {
        loop {
            match self.reader.read(&mut self.chunk) {
                Ok(0) => {
                    self.eof = true;
                    self.offset = 0;
                    self.filled = 0;
                    return Ok(());
                }
                Ok(n) => {
                    self.offset = 0;
                    self.filled = n;
                    return Ok(());
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::Read(e)),
            }
        }
    }

    /// Consume the byte last returned by `peek`.
    fn bump(&mut self, byte: u8) {
        self.offset += 1;
        if byte == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
    }

    /// Run the state machine until one token is complete or input ends.
    fn read_token(&mut self) -> Result<Option<Token>> {
        let mut state = LexState::Start;
        let mut text: Vec<u8> = Vec::new();
        // Position of the last byte examined; becomes the token position.
        let (mut line, mut col) = (self.line, self.col);

        while let Some(byte) = self.peek()? {
            line = self.line;
            col = self.col;
            let mut consume = true;
            let mut emit = None;

            state = match state {
                LexState::Start => match byte {
                    b' ' | b'\t' | b'\r' | b'\n' => LexState::Start,
                    b'=' => {
                        emit = Some(TokenKind::Equals);
                        LexState::Start
                    }
                    b'[' => {
                        emit = Some(TokenKind::ListOpen);
                        LexState::Start
                    }
                    b']' => {
                        emit = Some(TokenKind::ListClose);
                        LexState::Start
                    }
                    b'{' => {
                        emit = Some(TokenKind::MapOpen);
                        LexState::Start
                    }
                    b'}' => {
                        emit = Some(TokenKind::MapClose);
                        LexState::Start
                    }
                    b',' => {
                        emit = Some(TokenKind::Comma);
                        LexState::Start
                    }
                    b'/' => LexState::CommentStart,
                    b'"' => LexState::Str,
                    b if b.is_ascii_alphabetic() => {
                        text.push(b);
                        LexState::Identifier
                    }
                    _ => return Err(self.invalid_character(byte)),
                },
                LexState::CommentStart => match byte {
                    b'/' => LexState::LineComment,
                    b'*' => LexState::BlockComment,
                    _ => return Err(self.invalid_character(byte)),
                },
                LexState::LineComment => match byte {
                    b'\n' => LexState::Start,
                    _ => LexState::LineComment,
                },
                LexState::BlockComment => match byte {
                    b'*' => LexState::BlockCommentEnd,
                    _ => LexState::BlockComment,
                },
                LexState::BlockCommentEnd => match byte {
                    b'/' => LexState::Start,
                    b'*' => LexState::BlockCommentEnd,
                    _ => LexState::BlockComment,
                },
                LexState::Identifier => {
                    if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
                        text.push(byte);
                        LexState::Identifier
                    } else {
                        // Terminator is left for the next call.
                        consume = false;
                        emit = Some(identifier(&text));
                        LexState::Start
                    }
                }
                LexState::Str => match byte {
                    b'"' => {
                        emit = Some(TokenKind::String(std::mem::take(&mut text)));
                        LexState::Start
                    }
                    b'\\' => LexState::Escape,
                    _ => {
                        text.push(byte);
                        LexState::Str
                    }
                },
                LexState::Escape => match unescape(byte) {
                    Some(decoded) => {
                        text.push(decoded);
                        LexState::Str
                    }
                    None if byte == b'x' => LexState::HexFirst,
                    None => {
                        return Err(Error::InvalidEscape {
                            byte,
                            loc: self.location(),
                        })
                    }
                },
                LexState::HexFirst => match hex_value(byte) {
                    Some(high) => LexState::HexSecond(high),
                    None => return Err(self.invalid_hex(byte)),
                },
                LexState::HexSecond(high) => match hex_value(byte) {
                    Some(low) => {
                        text.push(high << 4 | low);
                        LexState::Str
                    }
                    None => return Err(self.invalid_hex(byte)),
                },
            };

            if consume {
                self.bump(byte);
            }
            if let Some(kind) = emit {
                log::trace!("token {:?} at {}:{}", kind, line, col);
                return Ok(Some(Token { kind, line, col }));
            }
        }

        match state {
            LexState::Start => Ok(None),
            LexState::Identifier => {
                let kind = identifier(&text);
                log::trace!("token {:?} at {}:{}", kind, line, col);
                Ok(Some(Token { kind, line, col }))
            }
            _ => Err(Error::PrematureEof {
                loc: self.location(),
            }),
        }
    }

    fn invalid_character(&self, byte: u8) -> Error {
        Error::InvalidCharacter {
            byte,
            loc: self.location(),
        }
    }

    fn invalid_hex(&self, byte: u8) -> Error {
        Error::InvalidHexEscape {
            byte,
            loc: self.location(),
        }
    }
}

impl<R: Read> Iterator for Scanner<R> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_token() {
            Ok(token) => token.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// Identifier bytes are ASCII by construction.
fn identifier(text: &[u8]) -> TokenKind {
    TokenKind::Identifier(text.iter().map(|&b| b as char).collect())
}

/// Single-letter escapes. `\x` is handled by the hex states.
fn unescape(byte: u8) -> Option<u8> {
    match byte {
        b'"' => Some(b'"'),
        b'n' => Some(b'\n'),
        b't' => Some(b'\t'),
        b'r' => Some(b'\r'),
        b'0' => Some(b'\0'),
        b'\\' => Some(b'\\'),
        _ => None,
    }
}

fn hex_value(byte: u8) -> Option<u8> {
    (byte as char).to_digit(16).map(|d| d as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn scan(input: &[u8]) -> Result<Vec<Token>> {
        Scanner::new(input, ParseContext::default())?.collect()
    }

    fn kinds(input: &[u8]) -> Vec<TokenKind> {
        scan(input).unwrap().into_iter().map(|t| t.kind).collect()
    }

    fn ident(s: &str) -> TokenKind {
        TokenKind::Identifier(s.to_string())
    }

    /// Hands out one byte per read call.
    struct Trickle<'a>(&'a [u8]);

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.split_first() {
                Some((&b, rest)) if !buf.is_empty() => {
                    buf[0] = b;
                    self.0 = rest;
                    Ok(1)
                }
                _ => Ok(0),
            }
        }
    }

    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk on fire"))
        }
    }

    #[test]
    fn test_punctuation_and_identifiers() {
        assert_eq!(
            kinds(b"key_1 = [ a-b , { } ]"),
            vec![
                ident("key_1"),
                TokenKind::Equals,
                TokenKind::ListOpen,
                ident("a-b"),
                TokenKind::Comma,
                TokenKind::MapOpen,
                TokenKind::MapClose,
                TokenKind::ListClose,
            ]
        );
    }

    #[test]
    fn test_empty_and_whitespace_only() {
        assert!(kinds(b"").is_empty());
        assert!(kinds(b" \t\r\n\n").is_empty());
        let scanner = Scanner::new(&b"  "[..], ParseContext::default()).unwrap();
        assert!(!scanner.has_next());
    }

    #[test]
    fn test_comments() {
        let input = b"// line\na /* block\n * still */ = /**/ \"x\" // tail\n";
        assert_eq!(
            kinds(input),
            vec![ident("a"), TokenKind::Equals, TokenKind::String(b"x".to_vec())]
        );
    }

    #[test]
    fn test_block_comment_star_run() {
        assert_eq!(kinds(b"/* a **/ b"), vec![ident("b")]);
        assert_eq!(kinds(b"/* * / */ c"), vec![ident("c")]);
    }

    #[test]
    fn test_escapes() {
        assert_eq!(
            kinds(br#""a\tb\x41\\c""#),
            vec![TokenKind::String(vec![b'a', b'\t', b'b', b'A', b'\\', b'c'])]
        );
        assert_eq!(
            kinds(br#""\"\n\r\0\xff\xAb""#),
            vec![TokenKind::String(vec![b'"', b'\n', b'\r', 0, 0xff, 0xab])]
        );
    }

    #[test]
    fn test_string_keeps_raw_bytes() {
        assert_eq!(
            kinds(b"\"caf\xc3\xa9 // not a comment\""),
            vec![TokenKind::String(b"caf\xc3\xa9 // not a comment".to_vec())]
        );
    }

    #[test]
    fn test_token_positions_use_last_examined_byte() {
        let tokens = scan(b"foo = \"x\"\n  bar").unwrap();
        // The identifier ends on the space that terminates it.
        assert_eq!((tokens[0].line, tokens[0].col), (1, 4));
        assert_eq!((tokens[1].line, tokens[1].col), (1, 5));
        assert_eq!((tokens[2].line, tokens[2].col), (1, 9));
        // Identifier running into end of input ends on its own last byte.
        assert_eq!((tokens[3].line, tokens[3].col), (2, 5));
    }

    #[test]
    fn test_identifier_at_end_of_input() {
        assert_eq!(kinds(b"abc"), vec![ident("abc")]);
    }

    #[test]
    fn test_invalid_character() {
        let err = scan(b"a = 5").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Lex);
        match err {
            Error::InvalidCharacter { byte, loc } => {
                assert_eq!(byte, b'5');
                assert_eq!((loc.line, loc.col), (1, 5));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(matches!(
            scan(b"/x").unwrap_err(),
            Error::InvalidCharacter { byte: b'x', .. }
        ));
    }

    #[test]
    fn test_invalid_escape_position() {
        match scan(br#"foo = "\q""#).unwrap_err() {
            Error::InvalidEscape { byte, loc } => {
                assert_eq!(byte, b'q');
                assert_eq!((loc.line, loc.col), (1, 9));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_hex_escape() {
        assert!(matches!(
            scan(br#""\xg0""#).unwrap_err(),
            Error::InvalidHexEscape { byte: b'g', .. }
        ));
        assert!(matches!(
            scan(br#""\x4""#).unwrap_err(),
            Error::InvalidHexEscape { byte: b'"', .. }
        ));
    }

    #[test]
    fn test_premature_end_of_file() {
        let inputs: [&[u8]; 6] = [b"\"open", b"/* open", b"/* open *", b"\"\\", b"\"\\x4", b"/"];
        for input in inputs {
            let err = scan(input).unwrap_err();
            assert!(
                matches!(err, Error::PrematureEof { .. }),
                "{:?} gave {}",
                String::from_utf8_lossy(input),
                err
            );
        }
        // A line comment must be closed by a newline.
        assert!(matches!(
            scan(b"a // trailing").unwrap_err(),
            Error::PrematureEof { .. }
        ));
        assert_eq!(kinds(b"a // trailing\n"), vec![ident("a")]);
    }

    #[test]
    fn test_chunked_reads_match_slice_reads() {
        let input: &[u8] = b"a = { b = [\"x\\x41\", \"y\"] } // c\nd = \"e\"";
        let whole = scan(input).unwrap();
        let trickled: Vec<Token> = Scanner::new(Trickle(input), ParseContext::default())
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(whole, trickled);
    }

    #[test]
    fn test_input_larger_than_one_chunk() {
        let mut input = b"k = \"".to_vec();
        input.extend(std::iter::repeat(b'z').take(CHUNK_SIZE * 2 + 17));
        input.push(b'"');
        let tokens = kinds(&input);
        match &tokens[2] {
            TokenKind::String(bytes) => assert_eq!(bytes.len(), CHUNK_SIZE * 2 + 17),
            other => panic!("unexpected token {other:?}"),
        }
    }

    #[test]
    fn test_read_failure_is_io_error() {
        let err = Scanner::new(Broken, ParseContext::default()).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(err.to_string(), "read(): disk on fire");
    }

    #[test]
    fn test_iterator_fuses_after_error() {
        let mut scanner = Scanner::new(&b"a b ? c"[..], ParseContext::default()).unwrap();
        assert!(matches!(scanner.next(), Some(Ok(_))));
        assert!(matches!(scanner.next(), Some(Err(_))));
        assert!(scanner.next().is_none());
    }
}
