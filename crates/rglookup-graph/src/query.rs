//! Parameterized queries and the single-node pattern subset the memory store understands
//!
//! Supported form (keywords case-insensitive, parameters as `$name` or legacy `{name}`):
//!
//! ```text
//! MATCH (n:label) WHERE n.property = $param RETURN n
//! MATCH (n:label) WHERE n.property =~ $param RETURN n
//! ```

use crate::store::{StoreError, StoreResult};
use crate::value::Value;
use regex::Regex;
use std::collections::BTreeMap;
use std::iter::Peekable;
use std::str::CharIndices;

/// Query text plus named parameters. The text is never built from parameter values.
#[derive(Clone, Debug)]
pub struct Query {
    text: String,
    params: BTreeMap<String, Value>,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn get_param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareOp {
    /// `=`
    Equals,
    /// `=~`, whole-value regular expression match
    Matches,
}

/// Parsed `MATCH ... WHERE ... RETURN ...` pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    pub variable: String,
    pub label: String,
    pub property: String,
    pub op: CompareOp,
    pub parameter: String,
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Ident(String),
    Param(String),
    Punct(char),
    Eq,
    RegexEq,
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn take_ident(chars: &mut Peekable<CharIndices<'_>>) -> String {
    let mut ident = String::new();
    while let Some((_, c)) = chars.next_if(|&(_, c)| is_ident_char(c)) {
        ident.push(c);
    }
    ident
}

fn tokenize(text: &str) -> StoreResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some(&(offset, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' | ')' | ':' | '.' => {
                chars.next();
                tokens.push(Token::Punct(c));
            }
            '=' => {
                chars.next();
                if chars.next_if(|&(_, c)| c == '~').is_some() {
                    tokens.push(Token::RegexEq);
                } else {
                    tokens.push(Token::Eq);
                }
            }
            '$' => {
                chars.next();
                let name = take_ident(&mut chars);
                if name.is_empty() {
                    return Err(StoreError::Syntax(format!("empty parameter name at offset {offset}")));
                }
                tokens.push(Token::Param(name));
            }
            '{' => {
                chars.next();
                let name = take_ident(&mut chars);
                if name.is_empty() || chars.next_if(|&(_, c)| c == '}').is_none() {
                    return Err(StoreError::Syntax(format!("malformed parameter at offset {offset}")));
                }
                tokens.push(Token::Param(name));
            }
            c if is_ident_char(c) => tokens.push(Token::Ident(take_ident(&mut chars))),
            c => {
                return Err(StoreError::Syntax(format!("unexpected `{c}` at offset {offset}")));
            }
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: std::vec::IntoIter<Token>,
}

impl Parser {
    fn next(&mut self, expected: &str) -> StoreResult<Token> {
        self.tokens
            .next()
            .ok_or_else(|| StoreError::Syntax(format!("expected {expected}, found end of query")))
    }

    fn keyword(&mut self, kw: &str) -> StoreResult<()> {
        match self.next(kw)? {
            Token::Ident(word) if word.eq_ignore_ascii_case(kw) => Ok(()),
            other => Err(StoreError::Syntax(format!("expected {kw}, found {other:?}"))),
        }
    }

    fn ident(&mut self, what: &str) -> StoreResult<String> {
        match self.next(what)? {
            Token::Ident(name) => Ok(name),
            other => Err(StoreError::Syntax(format!("expected {what}, found {other:?}"))),
        }
    }

    fn punct(&mut self, p: char) -> StoreResult<()> {
        match self.next(&format!("`{p}`"))? {
            Token::Punct(c) if c == p => Ok(()),
            other => Err(StoreError::Syntax(format!("expected `{p}`, found {other:?}"))),
        }
    }

    fn variable(&mut self, bound: &str) -> StoreResult<()> {
        let name = self.ident("variable")?;
        if name != bound {
            return Err(StoreError::Syntax(format!("unknown variable `{name}`")));
        }
        Ok(())
    }
}

impl Pattern {
    pub fn parse(text: &str) -> StoreResult<Self> {
        let mut p = Parser {
            tokens: tokenize(text)?.into_iter(),
        };

        p.keyword("MATCH")?;
        p.punct('(')?;
        let variable = p.ident("variable")?;
        p.punct(':')?;
        let label = p.ident("label")?;
        p.punct(')')?;

        p.keyword("WHERE")?;
        p.variable(&variable)?;
        p.punct('.')?;
        let property = p.ident("property")?;
        let op = match p.next("comparison")? {
            Token::Eq => CompareOp::Equals,
            Token::RegexEq => CompareOp::Matches,
            other => return Err(StoreError::Syntax(format!("expected = or =~, found {other:?}"))),
        };
        let parameter = match p.next("parameter")? {
            Token::Param(name) => name,
            other => {
                return Err(StoreError::Syntax(format!(
                    "comparisons must use a parameter, found {other:?}"
                )))
            }
        };

        p.keyword("RETURN")?;
        p.variable(&variable)?;
        if let Some(extra) = p.tokens.next() {
            return Err(StoreError::Syntax(format!("unexpected trailing {extra:?}")));
        }

        Ok(Self {
            variable,
            label,
            property,
            op,
            parameter,
        })
    }

    /// Bind the pattern's parameter from `query`, producing a row predicate.
    pub fn bind(&self, query: &Query) -> StoreResult<Matcher> {
        let value = query
            .get_param(&self.parameter)
            .ok_or_else(|| StoreError::MissingParameter(self.parameter.clone()))?;
        match self.op {
            CompareOp::Equals => Ok(Matcher::Equals(value.clone())),
            CompareOp::Matches => {
                let pattern = value.as_str().ok_or_else(|| StoreError::InvalidParameter {
                    name: self.parameter.clone(),
                    reason: "regular expression match needs a string".into(),
                })?;
                let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|e| {
                    StoreError::InvalidParameter {
                        name: self.parameter.clone(),
                        reason: e.to_string(),
                    }
                })?;
                Ok(Matcher::Regex(regex))
            }
        }
    }
}

/// A bound predicate over one property value.
#[derive(Clone, Debug)]
pub enum Matcher {
    Equals(Value),
    Regex(Regex),
}

impl Matcher {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Matcher::Equals(expected) => expected == value,
            Matcher::Regex(regex) => value.as_str().is_some_and(|s| regex.is_match(s)),
        }
    }
}
