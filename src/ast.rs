//! Syntax tree for shell commands.
//!
//! A [`Command`] is the top-level unit recognized by the shell: a statement,
//! a bare value expression, or one of the assignment forms. Nodes are closed
//! enums so the printer and tests can match on them exhaustively.

use std::fmt;

use crate::error::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Concat,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    Coalesce,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::Pow => "**",
            Self::Concat => "..",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::And => "&&",
            Self::Or => "||",
            Self::Coalesce => "??",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?} ({})", self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
    BitNot,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Plus => "+",
            Self::Not => "!",
            Self::BitNot => "~",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?} ({})", self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Number(String),
    Str(String),
    Bool(bool),
    Null,
    Identifier(String),
    This,
    Base,
    Array(Vec<Expr>),
    Paren(Box<Expr>),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    /// `object.name` or `object?.name`
    Member {
        object: Box<Expr>,
        name: String,
        safe: bool,
    },
    /// `object[index]` or `object?[index]`
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
        safe: bool,
    },
    /// `callee(args)` or `callee?(args)`
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        safe: bool,
    },
    /// `new Type.Path(args)`
    New {
        type_name: String,
        args: Vec<Expr>,
    },
}

impl ExprKind {
    /// Short description for diagnostics, e.g. "a binary expression".
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Number(_) | Self::Str(_) | Self::Bool(_) | Self::Null => "a literal",
            Self::Identifier(_) => "an identifier",
            Self::This | Self::Base => "a receiver",
            Self::Array(_) => "an array literal",
            Self::Paren(_) => "a parenthesized expression",
            Self::Unary { .. } => "a unary expression",
            Self::Binary { .. } => "a binary expression",
            Self::Member { .. } => "a member access",
            Self::Index { .. } => "an index expression",
            Self::Call { .. } => "a call",
            Self::New { .. } => "an object creation",
        }
    }
}

/// The three assignment forms a command or statement can take.
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    /// `target = value;`
    Simple { target: Expr, value: Expr },
    /// `target op= value;`
    Compound {
        target: Expr,
        op: BinaryOp,
        value: Expr,
    },
    /// `a, b = x, y;`
    Parallel { targets: Vec<Expr>, values: Vec<Expr> },
}

impl Assignment {
    pub fn form_name(&self) -> &'static str {
        match self {
            Self::Simple { .. } => "SimpleAssignment",
            Self::Compound { .. } => "CompoundAssignment",
            Self::Parallel { .. } => "ParallelAssignment",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receiver {
    This,
    Base,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub binding: Option<String>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Block(Vec<Stmt>),
    Empty,
    /// Expression used as a statement: `f(x);`
    Expression(Expr),
    Assignment(Assignment),
    VarDecl {
        name: String,
        constant: bool,
        init: Option<Expr>,
    },
    Function {
        name: String,
        params: Vec<String>,
        body: Vec<Stmt>,
    },
    If {
        condition: Expr,
        then_branch: Vec<Stmt>,
        /// Either a block or a chained `if`.
        else_branch: Option<Box<Stmt>>,
    },
    While {
        condition: Expr,
        body: Vec<Stmt>,
    },
    DoWhile {
        body: Vec<Stmt>,
        condition: Expr,
    },
    ForIn {
        variable: String,
        iterable: Expr,
        body: Vec<Stmt>,
    },
    Return(Option<Expr>),
    Break(Option<String>),
    Continue(Option<String>),
    Throw(Expr),
    Try {
        body: Vec<Stmt>,
        catch: Option<CatchClause>,
        finally: Option<Vec<Stmt>>,
    },
    Labeled {
        label: String,
        body: Box<Stmt>,
    },
    /// Constructor forwarding: `new this(args);` / `new base(args);`
    ConstructorCall {
        receiver: Receiver,
        args: Vec<Expr>,
    },
}

/// One top-level unit entered at the shell.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub kind: CommandKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandKind {
    Statement(Stmt),
    /// A value command: a bare expression at the end of the input, with no
    /// terminator.
    Expression(Expr),
    Assignment(Assignment),
}

impl Command {
    pub fn new(kind: CommandKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn form_name(&self) -> &'static str {
        match &self.kind {
            CommandKind::Statement(_) => "Statement",
            CommandKind::Expression(_) => "Expression",
            CommandKind::Assignment(a) => a.form_name(),
        }
    }
}
