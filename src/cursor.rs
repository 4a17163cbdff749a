//! Random-access token view shared by the disambiguator and the grammar.
//!
//! Tokens are lexed once up front, so peeking at any index is cheap,
//! repeatable and free of side effects. Indexes past the end resolve to the
//! trailing end-of-input token.
//!
//! The cursor also carries the nesting budget. Every recursive grammar rule
//! runs through [`TokenCursor::nested`], so deeply nested input fails with
//! `E0207` instead of exhausting the stack.

use crate::error::{Diagnostic, ErrorCode, ParseResult, SourceLoc, Span};
use crate::lexer::{self, Closer, Keyword, Token, TokenKind};

/// Default limit on syntactic nesting (brackets, prefix operators,
/// right-associative chains, blocks).
pub const DEFAULT_MAX_NESTING: usize = 128;

pub struct TokenCursor {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    max_nesting: usize,
}

impl TokenCursor {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Eof)) {
            let end = tokens.last().map(|t| t.span.end).unwrap_or_default();
            tokens.push(Token::new(TokenKind::Eof, Span::new(end, end)));
        }
        Self {
            tokens,
            pos: 0,
            depth: 0,
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }

    pub fn with_max_nesting(mut self, max_nesting: usize) -> Self {
        self.max_nesting = max_nesting;
        self
    }

    pub fn from_source(source: &str) -> ParseResult<Self> {
        Ok(Self::new(lexer::tokenize(source)?))
    }

    /// Token at an absolute index.
    pub fn token_at(&self, index: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[index.min(last)]
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn peek(&self) -> &Token {
        self.token_at(self.pos)
    }

    pub fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    pub fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    pub fn advance(&mut self) -> &Token {
        let index = self.pos;
        if !self.at_end() {
            self.pos += 1;
        }
        self.token_at(index)
    }

    pub fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    pub fn check_keyword(&self, keyword: Keyword) -> bool {
        self.peek_kind().is_keyword(keyword)
    }

    /// Consumes the current token if it is `kind`.
    pub fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn eat_keyword(&mut self, keyword: Keyword) -> bool {
        if self.check_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Start of the current token.
    pub fn loc(&self) -> SourceLoc {
        self.peek().span.start
    }

    /// End of the most recently consumed token.
    pub fn previous_end(&self) -> SourceLoc {
        if self.pos == 0 {
            self.loc()
        } else {
            self.token_at(self.pos - 1).span.end
        }
    }

    /// Span from `start` to the end of the last consumed token.
    pub fn span_from(&self, start: SourceLoc) -> Span {
        Span::new(start, self.previous_end().max(start))
    }

    /// "Found X" diagnostic for the current token. Running out of input has
    /// its own code.
    pub fn unexpected(&self, expected: &str) -> Diagnostic {
        let found = self.peek_kind();
        let code = match found {
            TokenKind::Eof => ErrorCode::UnexpectedEndOfInput,
            _ => ErrorCode::UnexpectedToken,
        };
        Diagnostic::new(code)
            .at(self.loc())
            .with_detail(format!("expected {expected}, found {found}"))
    }

    pub fn expect(&mut self, kind: &TokenKind, expected: &str) -> ParseResult<&Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(expected))
        }
    }

    pub fn expect_identifier(&mut self) -> ParseResult<String> {
        if let TokenKind::Identifier(name) = self.peek_kind() {
            let name = name.clone();
            self.advance();
            return Ok(name);
        }
        let found = self.peek_kind();
        let code = match found {
            TokenKind::Eof => ErrorCode::UnexpectedEndOfInput,
            _ => ErrorCode::ExpectedIdentifier,
        };
        Err(Diagnostic::new(code)
            .at(self.loc())
            .with_detail(format!("expected identifier, found {found}")))
    }

    /// Consumes the closer matching a bracket opened at `opened_at`.
    pub fn expect_closer(&mut self, closer: Closer, opened_at: SourceLoc) -> ParseResult<()> {
        match self.peek_kind() {
            TokenKind::Close(c) if *c == closer => {
                self.advance();
                Ok(())
            }
            TokenKind::Close(other) => Err(Diagnostic::new(ErrorCode::MismatchedBracket)
                .at(self.loc())
                .with_detail(format!(
                    "expected `{}` to match the bracket opened at {opened_at}, found `{}`",
                    closer.as_str(),
                    other.as_str()
                ))),
            _ => Err(self.unexpected(&format!(
                "`{}` to match the bracket opened at {opened_at}",
                closer.as_str()
            ))),
        }
    }

    /// Requires the `;` that ends a statement. Anything else is reported as a
    /// missing terminator rather than a generic unexpected token.
    pub fn expect_terminator(&mut self) -> ParseResult<()> {
        if self.eat(&TokenKind::Semicolon) {
            return Ok(());
        }
        Err(self.missing_terminator())
    }

    pub fn missing_terminator(&self) -> Diagnostic {
        Diagnostic::new(ErrorCode::MissingTerminator)
            .at(self.previous_end())
            .with_detail(format!("found {}", self.peek_kind()))
    }

    /// Runs `rule` one level deeper, failing with `E0207` once the budget is
    /// spent.
    pub fn nested<T>(
        &mut self,
        rule: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<T> {
        if self.depth >= self.max_nesting {
            return Err(Diagnostic::new(ErrorCode::NestingTooDeep)
                .at(self.loc())
                .with_detail(format!("more than {} levels", self.max_nesting)));
        }
        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peeking_is_repeatable() {
        let cursor = TokenCursor::from_source("a + b").unwrap();
        assert_eq!(cursor.token_at(1).kind, TokenKind::Plus);
        assert_eq!(cursor.token_at(1).kind, TokenKind::Plus);
        assert_eq!(cursor.peek_kind(), &TokenKind::Identifier("a".into()));
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn indexes_past_the_end_resolve_to_eof() {
        let mut cursor = TokenCursor::from_source("a").unwrap();
        assert_eq!(cursor.token_at(99).kind, TokenKind::Eof);
        cursor.advance();
        cursor.advance();
        assert!(cursor.at_end());
        assert_eq!(cursor.position(), 1);
    }

    #[test]
    fn missing_eof_is_appended() {
        let cursor = TokenCursor::new(Vec::new());
        assert!(cursor.at_end());
    }

    #[test]
    fn terminator_error_points_after_previous_token() {
        let mut cursor = TokenCursor::from_source("x y").unwrap();
        cursor.advance();
        let err = cursor.expect_terminator().unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingTerminator);
        assert_eq!(err.location, Some(SourceLoc::new(1, 2)));
    }

    #[test]
    fn nesting_budget_is_restored_after_each_level() {
        let mut cursor = TokenCursor::from_source("a").unwrap().with_max_nesting(2);
        assert_eq!(cursor.nested(|c| c.nested(|_| Ok(()))), Ok(()));

        let err = cursor
            .nested(|c| c.nested(|c| c.nested(|_| Ok(()))))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NestingTooDeep);
        assert_eq!(err.location, Some(SourceLoc::new(1, 1)));

        assert_eq!(cursor.nested(|c| c.nested(|_| Ok(()))), Ok(()));
    }

    #[test]
    fn wrong_closer_is_mismatched_bracket() {
        let mut cursor = TokenCursor::from_source("]").unwrap();
        let err = cursor
            .expect_closer(Closer::Paren, SourceLoc::new(1, 1))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::MismatchedBracket);

        let mut cursor = TokenCursor::from_source("").unwrap();
        let err = cursor
            .expect_closer(Closer::Paren, SourceLoc::new(1, 1))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UnexpectedEndOfInput);
    }
}
