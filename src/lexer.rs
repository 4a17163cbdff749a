//! Turns a source buffer into a stream of tokens.
//!
//! Whitespace, including newlines, only separates tokens: deciding where a
//! command ends is the job of the bracket tracker and the parser, not the
//! scanner. The final token is always [`TokenKind::Eof`].

use std::fmt;

use crate::ast::BinaryOp;
use crate::error::{Diagnostic, ErrorCode, ParseResult, SourceLoc, Span};

/// Reserved words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Var,
    Const,
    Func,
    If,
    Else,
    While,
    Do,
    For,
    In,
    Return,
    Break,
    Continue,
    Throw,
    Try,
    Catch,
    Finally,
    New,
    This,
    Base,
    True,
    False,
    Null,
}

impl Keyword {
    pub fn from_word(word: &str) -> Option<Self> {
        let kw = match word {
            "var" => Self::Var,
            "const" => Self::Const,
            "func" => Self::Func,
            "if" => Self::If,
            "else" => Self::Else,
            "while" => Self::While,
            "do" => Self::Do,
            "for" => Self::For,
            "in" => Self::In,
            "return" => Self::Return,
            "break" => Self::Break,
            "continue" => Self::Continue,
            "throw" => Self::Throw,
            "try" => Self::Try,
            "catch" => Self::Catch,
            "finally" => Self::Finally,
            "new" => Self::New,
            "this" => Self::This,
            "base" => Self::Base,
            "true" => Self::True,
            "false" => Self::False,
            "null" => Self::Null,
            _ => return None,
        };
        Some(kw)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Var => "var",
            Self::Const => "const",
            Self::Func => "func",
            Self::If => "if",
            Self::Else => "else",
            Self::While => "while",
            Self::Do => "do",
            Self::For => "for",
            Self::In => "in",
            Self::Return => "return",
            Self::Break => "break",
            Self::Continue => "continue",
            Self::Throw => "throw",
            Self::Try => "try",
            Self::Catch => "catch",
            Self::Finally => "finally",
            Self::New => "new",
            Self::This => "this",
            Self::Base => "base",
            Self::True => "true",
            Self::False => "false",
            Self::Null => "null",
        }
    }

    /// Keywords that can only begin a statement: declarations, loops,
    /// conditionals, control flow and exception handling.
    pub fn introduces_statement(self) -> bool {
        match self {
            Self::Var
            | Self::Const
            | Self::Func
            | Self::If
            | Self::While
            | Self::Do
            | Self::For
            | Self::Return
            | Self::Break
            | Self::Continue
            | Self::Throw
            | Self::Try => true,
            Self::Else
            | Self::In
            | Self::Catch
            | Self::Finally
            | Self::New
            | Self::This
            | Self::Base
            | Self::True
            | Self::False
            | Self::Null => false,
        }
    }
}

/// Opening brackets, including the safe-navigation variants `?(` and `?[`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opener {
    Paren,
    SafeParen,
    Bracket,
    SafeBracket,
    Brace,
}

impl Opener {
    /// The closer that ends a scope opened by `self`. Safe variants share the
    /// closer of their plain counterpart.
    pub fn closer(self) -> Closer {
        match self {
            Self::Paren | Self::SafeParen => Closer::Paren,
            Self::Bracket | Self::SafeBracket => Closer::Bracket,
            Self::Brace => Closer::Brace,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Paren => "(",
            Self::SafeParen => "?(",
            Self::Bracket => "[",
            Self::SafeBracket => "?[",
            Self::Brace => "{",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Closer {
    Paren,
    Bracket,
    Brace,
}

impl Closer {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Paren => ")",
            Self::Bracket => "]",
            Self::Brace => "}",
        }
    }
}

/// Compound assignment operators (`+=`, `**=`, `..=`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompoundOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    Concat,
}

impl CompoundOp {
    pub const ALL: [CompoundOp; 12] = [
        Self::Add,
        Self::Sub,
        Self::Mul,
        Self::Div,
        Self::Rem,
        Self::Pow,
        Self::BitAnd,
        Self::BitOr,
        Self::BitXor,
        Self::Shl,
        Self::Shr,
        Self::Concat,
    ];

    /// The binary operator a compound assignment applies before storing.
    pub fn binary_op(self) -> BinaryOp {
        match self {
            Self::Add => BinaryOp::Add,
            Self::Sub => BinaryOp::Sub,
            Self::Mul => BinaryOp::Mul,
            Self::Div => BinaryOp::Div,
            Self::Rem => BinaryOp::Rem,
            Self::Pow => BinaryOp::Pow,
            Self::BitAnd => BinaryOp::BitAnd,
            Self::BitOr => BinaryOp::BitOr,
            Self::BitXor => BinaryOp::BitXor,
            Self::Shl => BinaryOp::Shl,
            Self::Shr => BinaryOp::Shr,
            Self::Concat => BinaryOp::Concat,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "+=",
            Self::Sub => "-=",
            Self::Mul => "*=",
            Self::Div => "/=",
            Self::Rem => "%=",
            Self::Pow => "**=",
            Self::BitAnd => "&=",
            Self::BitOr => "|=",
            Self::BitXor => "^=",
            Self::Shl => "<<=",
            Self::Shr => ">>=",
            Self::Concat => "..=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals and names
    Number(String),
    StringLit(String),
    Identifier(String),
    Keyword(Keyword),

    // Brackets
    Open(Opener),
    Close(Closer),

    // Punctuation
    Comma,
    Semicolon,
    Colon,
    Dot,
    SafeDot, // ?.

    // Assignment
    Assign,
    CompoundAssign(CompoundOp),

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Power,  // **
    DotDot, // ..
    Amp,
    Pipe,
    Caret,
    Tilde,
    Shl,
    Shr,
    Bang,
    AndAnd,
    OrOr,
    EqEq,
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    Coalesce, // ??

    Eof,
}

impl TokenKind {
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        matches!(self, Self::Keyword(k) if *k == keyword)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Number(n) => return write!(f, "number `{n}`"),
            Self::StringLit(_) => return f.write_str("string literal"),
            Self::Identifier(name) => return write!(f, "identifier `{name}`"),
            Self::Keyword(kw) => return write!(f, "keyword `{}`", kw.as_str()),
            Self::Open(o) => o.as_str(),
            Self::Close(c) => c.as_str(),
            Self::CompoundAssign(op) => op.as_str(),
            Self::Eof => return f.write_str("end of input"),
            Self::Comma => ",",
            Self::Semicolon => ";",
            Self::Colon => ":",
            Self::Dot => ".",
            Self::SafeDot => "?.",
            Self::Assign => "=",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::Power => "**",
            Self::DotDot => "..",
            Self::Amp => "&",
            Self::Pipe => "|",
            Self::Caret => "^",
            Self::Tilde => "~",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::Bang => "!",
            Self::AndAnd => "&&",
            Self::OrOr => "||",
            Self::EqEq => "==",
            Self::NotEq => "!=",
            Self::Less => "<",
            Self::LessEq => "<=",
            Self::Greater => ">",
            Self::GreaterEq => ">=",
            Self::Coalesce => "??",
        };
        write!(f, "`{text}`")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

pub struct Lexer {
    source: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    pub fn tokenize(&mut self) -> ParseResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace_and_comments()?;
            let start = self.loc();
            if self.at_end() {
                tokens.push(Token::new(TokenKind::Eof, Span::new(start, start)));
                break;
            }
            let kind = self.next_kind()?;
            tokens.push(Token::new(kind, Span::new(start, self.loc())));
        }
        Ok(tokens)
    }

    fn loc(&self) -> SourceLoc {
        SourceLoc::new(self.line, self.col)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.source.get(self.pos + n).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.source.get(self.pos).copied()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    /// Consumes `ch` if it is next.
    fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn skip_whitespace_and_comments(&mut self) -> ParseResult<()> {
        loop {
            while self.peek().is_some_and(char::is_whitespace) {
                self.advance();
            }

            // Block comments /* ... */ nest
            if self.peek() == Some('/') && self.peek_ahead(1) == Some('*') {
                let loc = self.loc();
                self.advance();
                self.advance();
                let mut depth = 1u32;
                while depth > 0 {
                    if self.at_end() {
                        return Err(Diagnostic::new(ErrorCode::UnterminatedComment).at(loc));
                    }
                    if self.peek() == Some('/') && self.peek_ahead(1) == Some('*') {
                        self.advance();
                        self.advance();
                        depth += 1;
                    } else if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                        self.advance();
                        self.advance();
                        depth -= 1;
                    } else {
                        self.advance();
                    }
                }
                continue;
            }

            if self.peek() == Some('/') && self.peek_ahead(1) == Some('/') {
                while let Some(ch) = self.peek() {
                    if ch == '\n' {
                        break;
                    }
                    self.advance();
                }
                continue;
            }

            break;
        }
        Ok(())
    }

    #[allow(clippy::too_many_lines)]
    fn next_kind(&mut self) -> ParseResult<TokenKind> {
        let loc = self.loc();
        let Some(ch) = self.advance() else {
            return Ok(TokenKind::Eof);
        };

        let kind = match ch {
            '\'' | '"' => return self.lex_string(ch, loc),
            '0'..='9' => return Ok(self.lex_number(ch)),
            c if c.is_alphabetic() || c == '_' => return Ok(self.lex_word(c)),

            '(' => TokenKind::Open(Opener::Paren),
            '[' => TokenKind::Open(Opener::Bracket),
            '{' => TokenKind::Open(Opener::Brace),
            ')' => TokenKind::Close(Closer::Paren),
            ']' => TokenKind::Close(Closer::Bracket),
            '}' => TokenKind::Close(Closer::Brace),
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            ':' => TokenKind::Colon,
            '~' => TokenKind::Tilde,

            '?' => {
                if self.eat('(') {
                    TokenKind::Open(Opener::SafeParen)
                } else if self.eat('[') {
                    TokenKind::Open(Opener::SafeBracket)
                } else if self.eat('.') {
                    TokenKind::SafeDot
                } else if self.eat('?') {
                    TokenKind::Coalesce
                } else {
                    return Err(Diagnostic::new(ErrorCode::InvalidCharacter)
                        .at(loc)
                        .with_detail("`?` must be followed by `(`, `[`, `.` or `?`"));
                }
            }
            '.' => {
                if self.eat('.') {
                    if self.eat('=') {
                        TokenKind::CompoundAssign(CompoundOp::Concat)
                    } else {
                        TokenKind::DotDot
                    }
                } else {
                    TokenKind::Dot
                }
            }
            '+' => self.with_assign(TokenKind::Plus, CompoundOp::Add),
            '-' => self.with_assign(TokenKind::Minus, CompoundOp::Sub),
            '*' => {
                if self.eat('*') {
                    self.with_assign(TokenKind::Power, CompoundOp::Pow)
                } else {
                    self.with_assign(TokenKind::Star, CompoundOp::Mul)
                }
            }
            '/' => self.with_assign(TokenKind::Slash, CompoundOp::Div),
            '%' => self.with_assign(TokenKind::Percent, CompoundOp::Rem),
            '^' => self.with_assign(TokenKind::Caret, CompoundOp::BitXor),
            '&' => {
                if self.eat('&') {
                    TokenKind::AndAnd
                } else {
                    self.with_assign(TokenKind::Amp, CompoundOp::BitAnd)
                }
            }
            '|' => {
                if self.eat('|') {
                    TokenKind::OrOr
                } else {
                    self.with_assign(TokenKind::Pipe, CompoundOp::BitOr)
                }
            }
            '=' => {
                if self.eat('=') {
                    TokenKind::EqEq
                } else {
                    TokenKind::Assign
                }
            }
            '!' => {
                if self.eat('=') {
                    TokenKind::NotEq
                } else {
                    TokenKind::Bang
                }
            }
            '<' => {
                if self.eat('<') {
                    self.with_assign(TokenKind::Shl, CompoundOp::Shl)
                } else if self.eat('=') {
                    TokenKind::LessEq
                } else {
                    TokenKind::Less
                }
            }
            '>' => {
                if self.eat('>') {
                    self.with_assign(TokenKind::Shr, CompoundOp::Shr)
                } else if self.eat('=') {
                    TokenKind::GreaterEq
                } else {
                    TokenKind::Greater
                }
            }
            _ => {
                return Err(Diagnostic::new(ErrorCode::InvalidCharacter)
                    .at(loc)
                    .with_detail(format!("unexpected character '{ch}'")));
            }
        };
        Ok(kind)
    }

    /// `plain` unless an `=` follows, in which case the compound form.
    fn with_assign(&mut self, plain: TokenKind, compound: CompoundOp) -> TokenKind {
        if self.eat('=') {
            TokenKind::CompoundAssign(compound)
        } else {
            plain
        }
    }

    fn lex_string(&mut self, quote: char, loc: SourceLoc) -> ParseResult<TokenKind> {
        let mut value = String::new();
        loop {
            let Some(ch) = self.advance() else {
                return Err(Diagnostic::new(ErrorCode::UnterminatedString).at(loc));
            };
            if ch == quote {
                break;
            }
            if ch == '\n' {
                return Err(Diagnostic::new(ErrorCode::UnterminatedString)
                    .at(loc)
                    .with_detail("string literals cannot span lines"));
            }
            if ch != '\\' {
                value.push(ch);
                continue;
            }
            let escape_loc = self.loc();
            let escaped = match self.advance() {
                Some('n') => '\n',
                Some('t') => '\t',
                Some('r') => '\r',
                Some('0') => '\0',
                Some('\\') => '\\',
                Some('\'') => '\'',
                Some('"') => '"',
                Some(other) => {
                    return Err(Diagnostic::new(ErrorCode::InvalidEscape)
                        .at(escape_loc)
                        .with_detail(format!("unknown escape '\\{other}'")));
                }
                None => return Err(Diagnostic::new(ErrorCode::UnterminatedString).at(loc)),
            };
            value.push(escaped);
        }
        Ok(TokenKind::StringLit(value))
    }

    fn lex_number(&mut self, first: char) -> TokenKind {
        let mut num = String::from(first);
        self.take_digits(&mut num);

        // A fraction needs a digit after the dot, so `1..2` stays a range of
        // two numbers around `..`.
        if self.peek() == Some('.') && self.peek_ahead(1).is_some_and(|c| c.is_ascii_digit()) {
            num.push('.');
            self.advance();
            self.take_digits(&mut num);
        }

        if self.peek().is_some_and(|c| c == 'e' || c == 'E') {
            let signed = self.peek_ahead(1).is_some_and(|c| c == '+' || c == '-');
            let digit_at = if signed { 2 } else { 1 };
            if self.peek_ahead(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                for _ in 0..digit_at {
                    if let Some(c) = self.advance() {
                        num.push(c);
                    }
                }
                self.take_digits(&mut num);
            }
        }

        TokenKind::Number(num)
    }

    fn take_digits(&mut self, into: &mut String) {
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() || ch == '_' {
                into.push(ch);
                self.advance();
            } else {
                break;
            }
        }
    }

    fn lex_word(&mut self, first: char) -> TokenKind {
        let mut word = String::from(first);
        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '_' {
                word.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        match Keyword::from_word(&word) {
            Some(kw) => TokenKind::Keyword(kw),
            None => TokenKind::Identifier(word),
        }
    }
}

/// Tokenizes `source` in one go.
pub fn tokenize(source: &str) -> ParseResult<Vec<Token>> {
    Lexer::new(source).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn simple_assignment() {
        assert_eq!(
            kinds("x = 1;"),
            vec![
                TokenKind::Identifier("x".into()),
                TokenKind::Assign,
                TokenKind::Number("1".into()),
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn every_compound_operator_lexes_to_its_kind() {
        for op in CompoundOp::ALL {
            let src = format!("a {} b", op.as_str());
            let toks = kinds(&src);
            assert_eq!(toks[1], TokenKind::CompoundAssign(op), "lexing {src}");
            assert_eq!(toks.len(), 4);
        }
    }

    #[test]
    fn compound_operator_table_is_a_bijection() {
        let expected = [
            (CompoundOp::Add, BinaryOp::Add),
            (CompoundOp::Sub, BinaryOp::Sub),
            (CompoundOp::Mul, BinaryOp::Mul),
            (CompoundOp::Div, BinaryOp::Div),
            (CompoundOp::Rem, BinaryOp::Rem),
            (CompoundOp::Pow, BinaryOp::Pow),
            (CompoundOp::BitAnd, BinaryOp::BitAnd),
            (CompoundOp::BitOr, BinaryOp::BitOr),
            (CompoundOp::BitXor, BinaryOp::BitXor),
            (CompoundOp::Shl, BinaryOp::Shl),
            (CompoundOp::Shr, BinaryOp::Shr),
            (CompoundOp::Concat, BinaryOp::Concat),
        ];
        for (compound, binary) in expected {
            assert_eq!(compound.binary_op(), binary, "{}", compound.as_str());
        }
        let images: std::collections::HashSet<BinaryOp> =
            CompoundOp::ALL.iter().map(|op| op.binary_op()).collect();
        assert_eq!(images.len(), CompoundOp::ALL.len());
    }

    #[test]
    fn safe_navigation_brackets() {
        assert_eq!(
            kinds("a?(b)?[c]?.d ?? e"),
            vec![
                TokenKind::Identifier("a".into()),
                TokenKind::Open(Opener::SafeParen),
                TokenKind::Identifier("b".into()),
                TokenKind::Close(Closer::Paren),
                TokenKind::Open(Opener::SafeBracket),
                TokenKind::Identifier("c".into()),
                TokenKind::Close(Closer::Bracket),
                TokenKind::SafeDot,
                TokenKind::Identifier("d".into()),
                TokenKind::Coalesce,
                TokenKind::Identifier("e".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn opener_closer_table() {
        assert_eq!(Opener::Paren.closer(), Closer::Paren);
        assert_eq!(Opener::SafeParen.closer(), Closer::Paren);
        assert_eq!(Opener::Bracket.closer(), Closer::Bracket);
        assert_eq!(Opener::SafeBracket.closer(), Closer::Bracket);
        assert_eq!(Opener::Brace.closer(), Closer::Brace);
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(
            kinds("new this base newer"),
            vec![
                TokenKind::Keyword(Keyword::New),
                TokenKind::Keyword(Keyword::This),
                TokenKind::Keyword(Keyword::Base),
                TokenKind::Identifier("newer".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn range_is_not_a_fraction() {
        assert_eq!(
            kinds("1..2 3.5"),
            vec![
                TokenKind::Number("1".into()),
                TokenKind::DotDot,
                TokenKind::Number("2".into()),
                TokenKind::Number("3.5".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn comments_and_newlines_are_skipped() {
        let toks = tokenize("/* a /* nested */ b */ x // trailing\n+ y").unwrap();
        let ks: Vec<_> = toks.iter().map(|t| t.kind.clone()).collect();
        assert_eq!(
            ks,
            vec![
                TokenKind::Identifier("x".into()),
                TokenKind::Plus,
                TokenKind::Identifier("y".into()),
                TokenKind::Eof,
            ]
        );
        assert_eq!(toks[2].span.start, SourceLoc::new(2, 3));
    }

    #[test]
    fn string_escapes() {
        assert_eq!(
            kinds(r#""a\tb" 'it\'s'"#)[..2],
            [
                TokenKind::StringLit("a\tb".into()),
                TokenKind::StringLit("it's".into()),
            ]
        );
    }

    #[test]
    fn spans_cover_the_lexeme() {
        let toks = tokenize("foo **= 2").unwrap();
        assert_eq!(toks[0].span, Span::new(SourceLoc::new(1, 1), SourceLoc::new(1, 4)));
        assert_eq!(toks[1].span, Span::new(SourceLoc::new(1, 5), SourceLoc::new(1, 8)));
    }

    #[test]
    fn lexical_errors_carry_codes() {
        let err = tokenize("\"open").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnterminatedString);
        let err = tokenize("/* never closed").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnterminatedComment);
        let err = tokenize("a # b").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidCharacter);
        assert_eq!(err.location, Some(SourceLoc::new(1, 3)));
        let err = tokenize(r#""\q""#).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidEscape);
    }
}
