//! Joins input lines into complete commands.
//!
//! In single-line mode a command is complete as soon as its brackets
//! balance. In multi-line mode lines are collected verbatim until a blank
//! line. The pending buffer and the bracket stack always reset together.

use std::fmt;

use crate::brackets::{BracketOutcome, BracketTracker};
use crate::lexer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    SingleLine,
    MultiLine,
}

impl Mode {
    pub fn toggle(self) -> Self {
        match self {
            Self::SingleLine => Self::MultiLine,
            Self::MultiLine => Self::SingleLine,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SingleLine => f.write_str("single-line"),
            Self::MultiLine => f.write_str("multi-line"),
        }
    }
}

/// What a pushed line did to the pending buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum Accumulation {
    /// Blank line with nothing pending.
    Empty,
    /// The command continues on the next line.
    NeedMore,
    /// The buffer is complete; its lines joined by `\n`.
    Ready(String),
    /// The line could not continue the command (stray or wrong closer, or it
    /// failed to lex). The pending buffer was dropped; `source` is the line
    /// alone, to be parsed for its diagnostic.
    Malformed(String),
}

#[derive(Debug, Default)]
pub struct LineAccumulator {
    mode: Mode,
    pending: Vec<String>,
    brackets: BracketTracker,
}

impl LineAccumulator {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Switches mode. Anything pending is dropped.
    pub fn set_mode(&mut self, mode: Mode) {
        self.reset();
        self.mode = mode;
    }

    /// True when no command is in progress.
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pending_lines(&self) -> usize {
        self.pending.len()
    }

    pub fn bracket_depth(&self) -> usize {
        self.brackets.depth()
    }

    pub fn push_line(&mut self, line: &str) -> Accumulation {
        match self.mode {
            Mode::SingleLine => self.push_single_line(line),
            Mode::MultiLine => self.push_multi_line(line),
        }
    }

    fn push_single_line(&mut self, line: &str) -> Accumulation {
        if self.is_idle() && line.trim().is_empty() {
            return Accumulation::Empty;
        }
        let tokens = match lexer::tokenize(line) {
            Ok(tokens) => tokens,
            Err(diagnostic) => {
                log::debug!("line does not lex ({diagnostic}); dropping {} pending", self.pending.len());
                self.reset();
                return Accumulation::Malformed(line.to_string());
            }
        };
        match self.brackets.feed(&tokens) {
            BracketOutcome::Balanced => {
                self.pending.push(line.to_string());
                let source = self.take_pending();
                Accumulation::Ready(source)
            }
            BracketOutcome::NeedsMore => {
                self.pending.push(line.to_string());
                log::debug!(
                    "need more input: {} line(s), depth {}",
                    self.pending.len(),
                    self.brackets.depth()
                );
                Accumulation::NeedMore
            }
            BracketOutcome::Malformed(token) => {
                log::debug!(
                    "misplaced {} at {}; dropping {} pending",
                    token.kind,
                    token.span.start,
                    self.pending.len()
                );
                self.reset();
                Accumulation::Malformed(line.to_string())
            }
        }
    }

    fn push_multi_line(&mut self, line: &str) -> Accumulation {
        if !line.trim().is_empty() {
            self.pending.push(line.to_string());
            return Accumulation::NeedMore;
        }
        if self.is_idle() {
            Accumulation::Empty
        } else {
            Accumulation::Ready(self.take_pending())
        }
    }

    /// Hands over whatever is pending, if anything. Used at end of input.
    pub fn flush(&mut self) -> Option<String> {
        if self.is_idle() {
            self.brackets.reset();
            None
        } else {
            Some(self.take_pending())
        }
    }

    pub fn reset(&mut self) {
        self.pending.clear();
        self.brackets.reset();
    }

    fn take_pending(&mut self) -> String {
        let source = self.pending.join("\n");
        self.reset();
        source
    }
}
