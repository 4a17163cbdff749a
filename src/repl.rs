//! Interactive driver: reads lines, feeds the session, prints the trees.
//!
//! Diagnostics do not go through here. The session's reporter prints them
//! the moment they are found.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};
use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor};
use thiserror::Error;

use crate::printer::render_command;
use crate::session::{LineOutcome, ParseReport, Session, SessionCommand};

const MAX_HISTORY: usize = 1000;

#[derive(Debug, Error)]
pub enum ReplError {
    #[error("line editor: {0}")]
    Editor(#[from] ReadlineError),
    #[error("i/o: {0}")]
    Io(#[from] io::Error),
}

// ── Line sources ─────────────────────────────────────────────────────

pub trait LineSource {
    /// Next line without its terminator, or `None` at end of input.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, ReplError>;

    /// Records an input unit the session has consumed.
    fn remember(&mut self, _entry: &str) {}
}

pub fn history_path() -> Option<PathBuf> {
    home::home_dir().map(|d| d.join(".syntax_repl_history"))
}

/// Terminal input through rustyline, with history persisted on drop.
pub struct EditorSource {
    editor: DefaultEditor,
    history: Option<PathBuf>,
}

impl EditorSource {
    pub fn new(use_history: bool) -> Result<Self, ReplError> {
        let config = Config::builder()
            .max_history_size(MAX_HISTORY)?
            .auto_add_history(false)
            .build();
        let mut editor = DefaultEditor::with_config(config)?;
        let history = if use_history { history_path() } else { None };
        if let Some(path) = &history {
            if let Err(e) = editor.load_history(path) {
                log::debug!("no history loaded from {}: {e}", path.display());
            }
        }
        Ok(Self { editor, history })
    }
}

impl LineSource for EditorSource {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, ReplError> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn remember(&mut self, entry: &str) {
        let _ = self.editor.add_history_entry(entry);
    }
}

impl Drop for EditorSource {
    fn drop(&mut self) {
        if let Some(path) = &self.history {
            if let Err(e) = self.editor.save_history(path) {
                log::warn!("cannot save history to {}: {e}", path.display());
            }
        }
    }
}

/// Non-interactive input: pipes, files and `-e` strings.
pub struct ReaderSource<R> {
    reader: R,
}

impl<R: BufRead> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for ReaderSource<R> {
    fn read_line(&mut self, _prompt: &str) -> Result<Option<String>, ReplError> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }
}

// ── Run loop ─────────────────────────────────────────────────────────

/// Totals for one run; drives the process exit status.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub commands: usize,
    pub errors: usize,
    pub warnings: usize,
}

/// Reads until end of input or `#quit`. Parse errors never stop the loop;
/// only a failing line source or output stream does.
pub fn run<S, W>(session: &mut Session, source: &mut S, out: &mut W) -> Result<RunSummary, ReplError>
where
    S: LineSource + ?Sized,
    W: Write,
{
    let mut summary = RunSummary::default();
    while let Some(line) = source.read_line(session.prompt())? {
        match session.feed_line(&line) {
            LineOutcome::Ignored | LineOutcome::NeedMore => {}
            LineOutcome::Command(command) => {
                source.remember(line.trim());
                match command {
                    SessionCommand::Quit => break,
                    SessionCommand::Clear => clear_screen(out)?,
                    SessionCommand::Status => writeln!(out, "{}", session.status_line())?,
                    SessionCommand::Help => {
                        writeln!(out, "Session commands:")?;
                        write!(out, "{}", SessionCommand::help_text())?;
                    }
                    SessionCommand::ToggleMode => writeln!(out, "mode: {}", session.mode())?,
                }
            }
            LineOutcome::Parsed(report) => {
                source.remember(&report.source);
                write_report(&report, out, &mut summary)?;
            }
        }
        out.flush()?;
    }
    if let Some(report) = session.finish() {
        write_report(&report, out, &mut summary)?;
    }
    out.flush()?;

    summary.errors = session.errors().total_errors();
    summary.warnings = session.errors().total_warnings();
    Ok(summary)
}

fn write_report<W: Write>(
    report: &ParseReport,
    out: &mut W,
    summary: &mut RunSummary,
) -> io::Result<()> {
    for command in &report.commands {
        write!(out, "{}", render_command(command))?;
    }
    summary.commands += report.commands.len();
    Ok(())
}

pub fn clear_screen<W: Write>(out: &mut W) -> io::Result<()> {
    queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;
    out.flush()
}
