//! Bracket-depth tracking for line-at-a-time input.
//!
//! The tracker keeps a stack of expected closers across the lines of one
//! command and answers a single question per line: is the command complete,
//! does it need more lines, or is a closer out of place.

use crate::lexer::{Closer, Token, TokenKind};

#[derive(Debug, Clone, PartialEq)]
pub enum BracketOutcome {
    /// Every opened bracket has been closed.
    Balanced,
    /// At least one bracket is still open; read another line.
    NeedsMore,
    /// A closer arrived with no opener or the wrong opener.
    Malformed(Token),
}

#[derive(Debug, Default, Clone)]
pub struct BracketTracker {
    stack: Vec<Closer>,
}

impl BracketTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans one line's tokens, continuing from the state left by earlier
    /// lines. Scanning stops at the first misplaced closer.
    pub fn feed(&mut self, tokens: &[Token]) -> BracketOutcome {
        for token in tokens {
            match &token.kind {
                TokenKind::Open(opener) => self.stack.push(opener.closer()),
                TokenKind::Close(closer) => {
                    if self.stack.last() != Some(closer) {
                        log::trace!(
                            "unexpected `{}` at {} (expected {:?})",
                            closer.as_str(),
                            token.span.start,
                            self.stack.last()
                        );
                        return BracketOutcome::Malformed(token.clone());
                    }
                    self.stack.pop();
                }
                _ => {}
            }
        }
        if self.stack.is_empty() {
            BracketOutcome::Balanced
        } else {
            BracketOutcome::NeedsMore
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Closers still owed, innermost last.
    pub fn expected(&self) -> &[Closer] {
        &self.stack
    }

    pub fn reset(&mut self) {
        self.stack.clear();
    }
}
