//! AST types for the render script
//!
//! Minimal representation closely following the Pest grammar: a script is a
//! flat sequence of `target.method(args)` calls, nothing else.

#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    pub calls: Vec<Call>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub target: String,
    pub method: String,
    pub args: Vec<Arg>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Positional(ScriptExpr),
    Keyword { name: String, value: ScriptExpr },
}

impl Arg {
    pub fn expr(&self) -> &ScriptExpr {
        match self {
            Arg::Positional(expr) => expr,
            Arg::Keyword { value, .. } => value,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScriptExpr {
    /// `data.values` style access on a capability root
    FieldAccess { target: String, field: String },
    Str(String),
    Number(f64),
    /// Bare identifier; always rejected by the capability check
    Ident(String),
}
