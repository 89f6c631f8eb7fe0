//! Pest-based parser for the render script

use pest::Parser;
use pest_derive::Parser;
use thiserror::Error;

use super::ast::*;

#[derive(Parser)]
#[grammar = "script/plot.pest"]
pub struct PlotParser;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Syntax error: {0}")]
    Syntax(String),

    #[error("Pest error: {0}")]
    Pest(#[from] pest::error::Error<Rule>),
}

/// Parse render-script source into an AST
pub fn parse(source: &str) -> Result<Script, ParseError> {
    let mut pairs = PlotParser::parse(Rule::script, source)?;
    let script_pair = pairs
        .next()
        .ok_or_else(|| ParseError::Syntax("Empty input".to_string()))?;

    let mut calls = Vec::new();
    for pair in script_pair.into_inner() {
        match pair.as_rule() {
            Rule::call => calls.push(parse_call(pair)?),
            Rule::EOI => {}
            _ => {}
        }
    }

    Ok(Script { calls })
}

fn parse_call(pair: pest::iterators::Pair<Rule>) -> Result<Call, ParseError> {
    let mut inner = pair.into_inner();
    let target = next_str(&mut inner)?;
    let method = next_str(&mut inner)?;

    let mut args = Vec::new();
    for arg_pair in inner {
        if arg_pair.as_rule() == Rule::arg {
            args.push(parse_arg(arg_pair)?);
        }
    }

    Ok(Call {
        target,
        method,
        args,
    })
}

fn parse_arg(pair: pest::iterators::Pair<Rule>) -> Result<Arg, ParseError> {
    let inner = pair
        .into_inner()
        .next()
        .ok_or_else(|| ParseError::Syntax("Empty argument".to_string()))?;

    match inner.as_rule() {
        Rule::kwarg => {
            let mut kw = inner.into_inner();
            let name = next_str(&mut kw)?;
            let value_pair = kw
                .next()
                .ok_or_else(|| ParseError::Syntax("Missing keyword value".to_string()))?;
            Ok(Arg::Keyword {
                name,
                value: parse_expr(value_pair)?,
            })
        }
        Rule::expr => Ok(Arg::Positional(parse_expr(inner)?)),
        other => Err(ParseError::Syntax(format!("Invalid argument: {:?}", other))),
    }
}

fn parse_expr(pair: pest::iterators::Pair<Rule>) -> Result<ScriptExpr, ParseError> {
    let inner = match pair.as_rule() {
        Rule::expr => pair
            .into_inner()
            .next()
            .ok_or_else(|| ParseError::Syntax("Empty expression".to_string()))?,
        _ => pair,
    };

    match inner.as_rule() {
        Rule::field_access => {
            let mut parts = inner.into_inner();
            let target = next_str(&mut parts)?;
            let field = next_str(&mut parts)?;
            Ok(ScriptExpr::FieldAccess { target, field })
        }
        Rule::string => {
            let s = inner.as_str();
            Ok(ScriptExpr::Str(s[1..s.len() - 1].to_string()))
        }
        Rule::number => inner
            .as_str()
            .parse()
            .map(ScriptExpr::Number)
            .map_err(|_| ParseError::Syntax(format!("Invalid number: {}", inner.as_str()))),
        Rule::ident => Ok(ScriptExpr::Ident(inner.as_str().to_string())),
        other => Err(ParseError::Syntax(format!("Cannot parse expr: {:?}", other))),
    }
}

fn next_str(
    pairs: &mut pest::iterators::Pairs<Rule>,
) -> Result<String, ParseError> {
    pairs
        .next()
        .map(|p| p.as_str().to_string())
        .ok_or_else(|| ParseError::Syntax("Unexpected end of input".to_string()))
}
