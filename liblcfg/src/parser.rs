//! Phase 2: Binding Parser
//!
//! A pushdown automaton over the scanner's token stream. Nesting is tracked
//! with an explicit stack of frames rather than recursion, so the depth of
//! lists and maps is bounded only by memory. The current dotted path is
//! pushed and popped in lock-step with the frames.
//!
//! Grammar:
//!
//! ```text
//! config     := binding*
//! binding    := IDENT '=' value
//! value      := STRING | '[' list_items ']' | '{' binding* '}'
//! list_items := (value (',' value)*)?
//! ```

use std::io::Read;

use crate::bindings::Bindings;
use crate::error::{Error, Expected, Result};
use crate::path::KeyPath;
use crate::scanner::Scanner;
use crate::token::{Token, TokenClass, TokenKind};

/// Automaton state held by each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    TopLevel,
    ExpectEquals,
    ExpectValue,
    InList,
    InMap,
}

impl State {
    /// Tokens this state accepts, for error messages.
    fn expected(self) -> Expected {
        use TokenClass::*;
        match self {
            State::TopLevel => Expected(&[Identifier]),
            State::ExpectEquals => Expected(&[Equals]),
            State::ExpectValue => Expected(&[String, ListOpen, MapOpen]),
            State::InList => Expected(&[String, ListOpen, MapOpen, Comma, ListClose]),
            State::InMap => Expected(&[Identifier, MapClose]),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    state: State,
    /// Index of the next list element; only meaningful for `InList`.
    counter: usize,
}

impl Frame {
    fn new(state: State) -> Self {
        Self { state, counter: 0 }
    }
}

/// Parser turning a token stream into ordered bindings.
pub struct Parser<R> {
    scanner: Scanner<R>,
    stack: Vec<Frame>,
    path: KeyPath,
    bindings: Bindings,
}

impl<R: Read> Parser<R> {
    pub fn new(scanner: Scanner<R>) -> Self {
        Self {
            scanner,
            stack: vec![Frame::new(State::TopLevel)],
            path: KeyPath::new(),
            bindings: Bindings::new(),
        }
    }

    /// Consume the whole token stream.
    ///
    /// On error nothing parsed so far is returned.
    pub fn parse(mut self) -> Result<Bindings> {
        while let Some(token) = self.scanner.next_token()? {
            self.step(token)?;
        }

        // Only the TopLevel frame may remain.
        if self.stack.len() != 1 {
            log::debug!("input ended {} levels deep", self.stack.len() - 1);
            return Err(Error::Unterminated {
                loc: self.scanner.location(),
            });
        }

        log::debug!("parsed {} bindings", self.bindings.len());
        Ok(self.bindings)
    }

    /// Apply one token to the automaton.
    fn step(&mut self, token: Token) -> Result<()> {
        let Frame { state, counter } = *self.top_mut();

        match (state, token.kind) {
            (State::TopLevel | State::InMap, TokenKind::Identifier(name)) => {
                self.path.push_key(&name);
                self.push(State::ExpectEquals);
            }
            (State::InMap, TokenKind::MapClose) => self.pop(),
            (State::ExpectEquals, TokenKind::Equals) => {
                self.top_mut().state = State::ExpectValue;
            }
            (State::ExpectValue, TokenKind::String(value)) => {
                self.bindings.push(self.path.as_str(), value);
                self.pop();
            }
            (State::ExpectValue, TokenKind::ListOpen) => {
                *self.top_mut() = Frame::new(State::InList);
            }
            (State::ExpectValue, TokenKind::MapOpen) => {
                self.top_mut().state = State::InMap;
            }
            (State::InList, TokenKind::Comma) => {}
            (State::InList, TokenKind::String(value)) => {
                self.path.push_index(counter);
                self.bindings.push(self.path.as_str(), value);
                self.path.pop();
                self.top_mut().counter += 1;
            }
            (State::InList, TokenKind::ListOpen) => self.open_element(counter, State::InList),
            (State::InList, TokenKind::MapOpen) => self.open_element(counter, State::InMap),
            (State::InList, TokenKind::ListClose) => self.pop(),
            (state, kind) => {
                return Err(Error::UnexpectedToken {
                    found: kind.class(),
                    expected: state.expected(),
                    loc: self.scanner.context().locate(token.line, token.col),
                });
            }
        }
        Ok(())
    }

    /// Start a nested list or map as element `index` of the current list.
    fn open_element(&mut self, index: usize, state: State) {
        self.path.push_index(index);
        self.top_mut().counter += 1;
        self.push(state);
    }

    fn top_mut(&mut self) -> &mut Frame {
        // The TopLevel frame at the bottom is never popped.
        let top = self.stack.len() - 1;
        &mut self.stack[top]
    }

    fn push(&mut self, state: State) {
        self.stack.push(Frame::new(state));
        log::trace!("push {:?} at {} (depth {})", state, self.path, self.stack.len());
    }

    /// Leave the current frame together with its path component.
    fn pop(&mut self) {
        self.stack.pop();
        self.path.pop();
        log::trace!("pop to {} (depth {})", self.path, self.stack.len());
    }
}
