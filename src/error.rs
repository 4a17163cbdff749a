//! Diagnostic types, error codes and the diagnostic sink.
//!
//! Every problem found while recognizing or parsing a command is a
//! [`Diagnostic`] tagged with a stable [`ErrorCode`]. Fatal problems travel
//! as the `Err` side of [`ParseResult`]; recoverable ones are recorded in an
//! [`ErrorManager`] while parsing continues.

use std::fmt;

use thiserror::Error;

/// A 1-based line/column position in the source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceLoc {
    pub line: usize,
    pub col: usize,
}

impl SourceLoc {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

impl Default for SourceLoc {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl fmt::Display for SourceLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// Half-open source range: `end` points just past the last character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Span {
    pub start: SourceLoc,
    pub end: SourceLoc,
}

impl Span {
    pub fn new(start: SourceLoc, end: SourceLoc) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Stable diagnostic codes. The numbering groups lexical (1xx), syntactic
/// (2xx) and semantic (3xx) errors; warnings have their own series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ErrorCode {
    #[error("invalid character")]
    InvalidCharacter,
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated block comment")]
    UnterminatedComment,
    #[error("invalid escape sequence")]
    InvalidEscape,

    #[error("unexpected token")]
    UnexpectedToken,
    #[error("expected statement terminator `;`")]
    MissingTerminator,
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
    #[error("mismatched closing bracket")]
    MismatchedBracket,
    #[error("identifier expected")]
    ExpectedIdentifier,
    #[error("`try` requires a `catch` or `finally` clause")]
    MissingCatchOrFinally,
    #[error("nesting too deep")]
    NestingTooDeep,

    #[error("invalid assignment target")]
    InvalidAssignmentTarget,
    #[error("only call and object creation expressions can be used as a statement")]
    InvalidStatementExpression,
    #[error("`const` declaration requires an initializer")]
    ConstWithoutInitializer,

    #[error("number of values does not match number of assignment targets")]
    AssignmentCountMismatch,
}

impl ErrorCode {
    pub fn number(self) -> u32 {
        match self {
            Self::InvalidCharacter => 101,
            Self::UnterminatedString => 102,
            Self::UnterminatedComment => 103,
            Self::InvalidEscape => 104,
            Self::UnexpectedToken => 201,
            Self::MissingTerminator => 202,
            Self::UnexpectedEndOfInput => 203,
            Self::MismatchedBracket => 204,
            Self::ExpectedIdentifier => 205,
            Self::MissingCatchOrFinally => 206,
            Self::NestingTooDeep => 207,
            Self::InvalidAssignmentTarget => 301,
            Self::InvalidStatementExpression => 302,
            Self::ConstWithoutInitializer => 303,
            Self::AssignmentCountMismatch => 1,
        }
    }

    /// Severity a diagnostic with this code carries unless overridden.
    pub fn default_severity(self) -> Severity {
        match self {
            Self::AssignmentCountMismatch => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// The printable tag, e.g. `E0202` or `W0001`.
    pub fn tag(self) -> String {
        let prefix = match self.default_severity() {
            Severity::Error => 'E',
            Severity::Warning => 'W',
        };
        format!("{prefix}{:04}", self.number())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("error"),
            Self::Warning => f.write_str("warning"),
        }
    }
}

/// A located, coded problem report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub severity: Severity,
    pub location: Option<SourceLoc>,
    pub detail: Option<String>,
    /// Text of the offending source line, attached when the sink knows it.
    pub source_line: Option<String>,
}

impl Diagnostic {
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code,
            severity: code.default_severity(),
            location: None,
            detail: None,
            source_line: None,
        }
    }

    pub fn at(mut self, loc: SourceLoc) -> Self {
        self.location = Some(loc);
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_source_line(mut self, text: impl Into<String>) -> Self {
        self.source_line = Some(text.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Header line followed, when the source line is known, by the line and a
    /// caret under the reported column.
    pub fn render(&self) -> String {
        let mut out = self.to_string();
        if let (Some(loc), Some(source)) = (self.location, self.source_line.as_deref()) {
            out.push_str(&format!("\n  | {source}"));
            out.push_str(&format!("\n  | {:>width$}", "^", width = loc.col));
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.code.tag(), self.code)?;
        if let Some(ref detail) = self.detail {
            write!(f, ": {detail}")?;
        }
        if let Some(loc) = self.location {
            write!(f, " (line {}, column {})", loc.line, loc.col)?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostic {}

/// Convenience alias for fatal-to-this-command failures.
pub type ParseResult<T> = Result<T, Diagnostic>;

type Reporter = Box<dyn FnMut(&Diagnostic)>;

/// Collects diagnostics for the current parse attempt.
///
/// An optional reporter sees each diagnostic the moment it is added, so the
/// shell can print problems as they are detected instead of in a batch.
#[derive(Default)]
pub struct ErrorManager {
    diagnostics: Vec<Diagnostic>,
    reporter: Option<Reporter>,
    source: Option<String>,
    total_errors: usize,
    total_warnings: usize,
}

impl ErrorManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_reporter(&mut self, reporter: impl FnMut(&Diagnostic) + 'static) {
        self.reporter = Some(Box::new(reporter));
    }

    /// Source text that line numbers refer to; used to attach the offending
    /// line to each diagnostic.
    pub fn set_source(&mut self, source: Option<&str>) {
        self.source = source.map(str::to_owned);
    }

    pub fn add_error(&mut self, mut diagnostic: Diagnostic) {
        diagnostic.severity = Severity::Error;
        self.total_errors += 1;
        self.push(diagnostic);
    }

    pub fn add_warning(&mut self, mut diagnostic: Diagnostic) {
        diagnostic.severity = Severity::Warning;
        self.total_warnings += 1;
        self.push(diagnostic);
    }

    /// True when the diagnostics collected since the last `take` include an
    /// error.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Drains the diagnostics of the current attempt.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn total_errors(&self) -> usize {
        self.total_errors
    }

    pub fn total_warnings(&self) -> usize {
        self.total_warnings
    }

    fn push(&mut self, mut diagnostic: Diagnostic) {
        if diagnostic.source_line.is_none() {
            if let (Some(loc), Some(source)) = (diagnostic.location, self.source.as_deref()) {
                if let Some(text) = source.lines().nth(loc.line.saturating_sub(1)) {
                    diagnostic.source_line = Some(text.to_string());
                }
            }
        }
        log::debug!("diagnostic recorded: {diagnostic}");
        if let Some(reporter) = self.reporter.as_mut() {
            reporter(&diagnostic);
        }
        self.diagnostics.push(diagnostic);
    }
}

impl fmt::Debug for ErrorManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorManager")
            .field("diagnostics", &self.diagnostics)
            .field("has_reporter", &self.reporter.is_some())
            .field("total_errors", &self.total_errors)
            .field("total_warnings", &self.total_warnings)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::rc::Rc;

    const ALL_CODES: [ErrorCode; 15] = [
        ErrorCode::InvalidCharacter,
        ErrorCode::UnterminatedString,
        ErrorCode::UnterminatedComment,
        ErrorCode::InvalidEscape,
        ErrorCode::UnexpectedToken,
        ErrorCode::MissingTerminator,
        ErrorCode::UnexpectedEndOfInput,
        ErrorCode::MismatchedBracket,
        ErrorCode::ExpectedIdentifier,
        ErrorCode::MissingCatchOrFinally,
        ErrorCode::NestingTooDeep,
        ErrorCode::InvalidAssignmentTarget,
        ErrorCode::InvalidStatementExpression,
        ErrorCode::ConstWithoutInitializer,
        ErrorCode::AssignmentCountMismatch,
    ];

    #[test]
    fn tags_are_unique() {
        let tags: HashSet<String> = ALL_CODES.iter().map(|c| c.tag()).collect();
        assert_eq!(tags.len(), ALL_CODES.len());
    }

    #[test]
    fn missing_terminator_is_distinct_from_unexpected_token() {
        assert_ne!(
            ErrorCode::MissingTerminator.tag(),
            ErrorCode::UnexpectedToken.tag()
        );
        assert_eq!(ErrorCode::MissingTerminator.tag(), "E0202");
        assert_eq!(ErrorCode::AssignmentCountMismatch.tag(), "W0001");
        assert_eq!(ErrorCode::NestingTooDeep.tag(), "E0207");
    }

    #[test]
    fn display_includes_code_detail_and_location() {
        let diag = Diagnostic::new(ErrorCode::UnexpectedToken)
            .at(SourceLoc::new(2, 7))
            .with_detail("found `)`");
        assert_eq!(
            diag.to_string(),
            "error[E0201]: unexpected token: found `)` (line 2, column 7)"
        );
    }

    #[test]
    fn render_points_at_column() {
        let diag = Diagnostic::new(ErrorCode::MissingTerminator)
            .at(SourceLoc::new(1, 5))
            .with_source_line("x = 1");
        let rendered = diag.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "  | x = 1");
        assert_eq!(lines[2], "  |     ^");
    }

    #[test]
    fn manager_tracks_severity_and_source_lines() {
        let mut errors = ErrorManager::new();
        errors.set_source(Some("a = 1;\n1 = 2;"));
        errors.add_warning(Diagnostic::new(ErrorCode::AssignmentCountMismatch));
        assert!(!errors.has_errors());

        errors.add_error(Diagnostic::new(ErrorCode::InvalidAssignmentTarget).at(SourceLoc::new(2, 1)));
        assert!(errors.has_errors());
        assert_eq!(errors.diagnostics()[1].source_line.as_deref(), Some("1 = 2;"));

        let drained = errors.take();
        assert_eq!(drained.len(), 2);
        assert!(!errors.has_errors());
        assert_eq!(errors.total_errors(), 1);
        assert_eq!(errors.total_warnings(), 1);
    }

    #[test]
    fn reporter_sees_diagnostics_immediately() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut errors = ErrorManager::new();
        errors.set_reporter(move |d| sink.borrow_mut().push(d.code));
        errors.add_error(Diagnostic::new(ErrorCode::UnexpectedToken));
        assert_eq!(*seen.borrow(), vec![ErrorCode::UnexpectedToken]);
    }
}
