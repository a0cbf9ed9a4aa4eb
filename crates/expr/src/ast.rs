//! Defines the Abstract Syntax Tree (AST) for binding expressions.

/// A parsed chunk of template text.
#[derive(Debug, Clone, PartialEq)]
pub enum AstNode {
    /// Literal text outside any placeholder.
    Literal(String),
    /// One `{{...}}` placeholder.
    Expression {
        expression: Expression,
        /// The exact placeholder substring, delimiters included. Substituted
        /// back into the output when resolution comes up absent.
        original_text: String,
    },
}

/// The body of a placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A dotted/indexed address into the data context (e.g. `items[0].name`).
    Path(Vec<PathSegment>),
    /// A direct call to a registered function (e.g. `if(paid, "OK", "DUE")`).
    FunctionCall { name: String, args: Vec<FunctionArg> },
    /// A path or function call threaded through transform stages
    /// (e.g. `total | abs | currency:"USD"`). The parser only ever produces
    /// a `Path` or `FunctionCall` source.
    PipeChain {
        source: Box<Expression>,
        stages: Vec<PipeCall>,
    },
}

/// One step of a path, applied left to right.
#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    /// An object key (e.g. `.name`).
    Property(String),
    /// An array index (e.g. `[0]`).
    Index(usize),
}

/// An argument in direct-call syntax.
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionArg {
    String(String),
    Number(f64),
    /// A path looked up in the data context at call time.
    Path(Vec<PathSegment>),
}

/// An argument in pipe syntax. Pipe arguments are simple formatting
/// parameters, so paths are not allowed here.
#[derive(Debug, Clone, PartialEq)]
pub enum PipeArg {
    String(String),
    Number(f64),
}

/// One `name:arg1:arg2` stage of a pipe chain.
#[derive(Debug, Clone, PartialEq)]
pub struct PipeCall {
    pub name: String,
    pub args: Vec<PipeArg>,
}
