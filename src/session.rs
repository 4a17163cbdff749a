//! One interactive session: mode, pending input, parser and diagnostics.
//!
//! The session is fed one line at a time and never fails. Every problem
//! becomes a diagnostic in the returned [`ParseReport`] (and goes through the
//! reporter, when one is set), after which the session is ready for the next
//! command.

use crate::accumulator::{Accumulation, LineAccumulator, Mode};
use crate::ast::Command;
use crate::command::CommandParser;
use crate::cursor::DEFAULT_MAX_NESTING;
use crate::error::{Diagnostic, ErrorManager};
use crate::grammar::StandardGrammar;

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub mode: Mode,
    pub prompt: String,
    pub continuation_prompt: String,
    /// Deepest bracket, block or prefix-operator nesting a command may use.
    pub max_nesting: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            mode: Mode::SingleLine,
            prompt: "> ".to_string(),
            continuation_prompt: ". ".to_string(),
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }
}

/// Textual commands handled by the session itself rather than the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    ToggleMode,
    Clear,
    Quit,
    Status,
    Help,
}

impl SessionCommand {
    /// Name, aliases and description of each command, in help order.
    pub const TABLE: [(SessionCommand, &'static [&'static str], &'static str); 5] = [
        (Self::ToggleMode, &["#mode", "#m"], "toggle single-line / multi-line input"),
        (Self::Clear, &["#clear", "#cls"], "clear the screen"),
        (Self::Status, &["#status", "#st"], "show mode and pending input"),
        (Self::Help, &["#help", "#h"], "list session commands"),
        (Self::Quit, &["#quit", "#q", "#exit"], "leave the shell"),
    ];

    /// Matches a whole (trimmed) line against the command names.
    pub fn parse(line: &str) -> Option<Self> {
        let word = line.trim();
        Self::TABLE
            .iter()
            .find(|(_, names, _)| names.contains(&word))
            .map(|(command, _, _)| *command)
    }

    pub fn help_text() -> String {
        Self::TABLE
            .iter()
            .map(|(_, names, description)| format!("  {:<22}{description}\n", names.join(", ")))
            .collect()
    }
}

/// Result of one parse attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseReport {
    pub source: String,
    /// Commands completed before any fatal error.
    pub commands: Vec<Command>,
    /// Everything reported during the attempt, fatal error last.
    pub diagnostics: Vec<Diagnostic>,
    /// Whether a fatal error stopped the attempt.
    pub aborted: bool,
}

impl ParseReport {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    /// Blank line with nothing pending.
    Ignored,
    /// The line was buffered; show the continuation prompt.
    NeedMore,
    /// A session command. Mode toggling has already been applied.
    Command(SessionCommand),
    Parsed(ParseReport),
}

pub struct Session {
    options: SessionOptions,
    accumulator: LineAccumulator,
    parser: CommandParser<StandardGrammar>,
    errors: ErrorManager,
}

impl Session {
    pub fn new(options: SessionOptions) -> Self {
        Self {
            accumulator: LineAccumulator::new(options.mode),
            parser: CommandParser::new(StandardGrammar).with_max_nesting(options.max_nesting),
            options,
            errors: ErrorManager::new(),
        }
    }

    /// Prints (or otherwise handles) each diagnostic as soon as it is found.
    pub fn set_reporter(&mut self, reporter: impl FnMut(&Diagnostic) + 'static) {
        self.errors.set_reporter(reporter);
    }

    pub fn mode(&self) -> Mode {
        self.accumulator.mode()
    }

    pub fn prompt(&self) -> &str {
        if self.accumulator.is_idle() {
            &self.options.prompt
        } else {
            &self.options.continuation_prompt
        }
    }

    pub fn errors(&self) -> &ErrorManager {
        &self.errors
    }

    pub fn status_line(&self) -> String {
        format!(
            "mode: {}, pending lines: {}, bracket depth: {}, errors: {}, warnings: {}",
            self.accumulator.mode(),
            self.accumulator.pending_lines(),
            self.accumulator.bracket_depth(),
            self.errors.total_errors(),
            self.errors.total_warnings()
        )
    }

    pub fn feed_line(&mut self, line: &str) -> LineOutcome {
        if self.accumulator.is_idle() {
            if let Some(command) = SessionCommand::parse(line) {
                self.apply(command);
                return LineOutcome::Command(command);
            }
        }
        match self.accumulator.push_line(line) {
            Accumulation::Empty => LineOutcome::Ignored,
            Accumulation::NeedMore => LineOutcome::NeedMore,
            Accumulation::Ready(source) => LineOutcome::Parsed(self.parse(source)),
            Accumulation::Malformed(source) => LineOutcome::Parsed(self.parse(source)),
        }
    }

    /// Parses whatever is still pending at end of input.
    pub fn finish(&mut self) -> Option<ParseReport> {
        let source = self.accumulator.flush()?;
        log::debug!("end of input with pending text; parsing it");
        Some(self.parse(source))
    }

    fn apply(&mut self, command: SessionCommand) {
        if command == SessionCommand::ToggleMode {
            let mode = self.accumulator.mode().toggle();
            self.accumulator.set_mode(mode);
            log::debug!("mode is now {mode}");
        }
    }

    fn parse(&mut self, source: String) -> ParseReport {
        self.errors.set_source(Some(&source));
        let parsed = self.parser.parse_source(&source, &mut self.errors);
        let aborted = parsed.fatal.is_some();
        if let Some(fatal) = parsed.fatal {
            self.errors.add_error(fatal);
        }
        self.errors.set_source(None);
        ParseReport {
            source,
            commands: parsed.commands,
            diagnostics: self.errors.take(),
            aborted,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionOptions::default())
    }
}
