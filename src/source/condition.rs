//! Conditions of `if` blocks in package descriptions
//!
//! Grammar (lowest to highest precedence):
//! - `a || b`
//! - `a && b`
//! - `!a`
//! - `true`, `false`, `flag(name)`, `os(name)`, `arch(name)`, `impl(ghc >=9.2)`, `( ... )`

use crate::domain::VersionRange;
use std::fmt;
use thiserror::Error;

/// Error returned when an `if` condition cannot be parsed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid condition '{input}': {message}")]
pub struct ConditionParseError {
    pub input: String,
    pub message: String,
}

/// A boolean condition evaluated during finalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Literal(bool),
    Flag(String),
    Os(String),
    Arch(String),
    Impl { compiler: String, range: VersionRange },
    Not(Box<Condition>),
    And(Box<Condition>, Box<Condition>),
    Or(Box<Condition>, Box<Condition>),
}

impl Condition {
    /// Parses the text following `if` or `elif`
    pub fn parse(input: &str) -> Result<Self, ConditionParseError> {
        let error = |message| ConditionParseError {
            input: input.to_string(),
            message,
        };
        let mut parser = ConditionParser { input, pos: 0 };
        let condition = parser.parse_or().map_err(error)?;
        parser.skip_whitespace();
        if parser.pos < input.len() {
            return Err(error(format!(
                "unexpected input at '{}'",
                &input[parser.pos..]
            )));
        }
        Ok(condition)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Literal(b) => write!(f, "{}", b),
            Condition::Flag(name) => write!(f, "flag({})", name),
            Condition::Os(name) => write!(f, "os({})", name),
            Condition::Arch(name) => write!(f, "arch({})", name),
            Condition::Impl { compiler, range } => {
                if *range == VersionRange::Any {
                    write!(f, "impl({})", compiler)
                } else {
                    write!(f, "impl({} {})", compiler, range)
                }
            }
            Condition::Not(c) => write!(f, "!({})", c),
            Condition::And(a, b) => write!(f, "({} && {})", a, b),
            Condition::Or(a, b) => write!(f, "({} || {})", a, b),
        }
    }
}

struct ConditionParser<'a> {
    input: &'a str,
    pos: usize,
}

impl ConditionParser<'_> {
    fn rest(&self) -> &str {
        &self.input[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.input.len() - trimmed.len();
    }

    fn eat(&mut self, token: &str) -> bool {
        self.skip_whitespace();
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn parse_or(&mut self) -> Result<Condition, String> {
        let mut condition = self.parse_and()?;
        while self.eat("||") {
            let rhs = self.parse_and()?;
            condition = Condition::Or(Box::new(condition), Box::new(rhs));
        }
        Ok(condition)
    }

    fn parse_and(&mut self) -> Result<Condition, String> {
        let mut condition = self.parse_not()?;
        while self.eat("&&") {
            let rhs = self.parse_not()?;
            condition = Condition::And(Box::new(condition), Box::new(rhs));
        }
        Ok(condition)
    }

    fn parse_not(&mut self) -> Result<Condition, String> {
        if self.eat("!") {
            return Ok(Condition::Not(Box::new(self.parse_not()?)));
        }
        self.parse_atom()
    }

    fn parse_atom(&mut self) -> Result<Condition, String> {
        if self.eat("(") {
            let condition = self.parse_or()?;
            if !self.eat(")") {
                return Err("expected ')'".to_string());
            }
            return Ok(condition);
        }

        self.skip_whitespace();
        let ident_len = self
            .rest()
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
            .unwrap_or(self.rest().len());
        if ident_len == 0 {
            return Err(match self.rest().chars().next() {
                Some(c) => format!("unexpected '{}'", c),
                None => "unexpected end of condition".to_string(),
            });
        }
        let ident = self.rest()[..ident_len].to_ascii_lowercase();
        self.pos += ident_len;

        match ident.as_str() {
            "true" => return Ok(Condition::Literal(true)),
            "false" => return Ok(Condition::Literal(false)),
            _ => {}
        }

        if !self.eat("(") {
            return Err(format!("expected '(' after '{}'", ident));
        }
        let argument = self.take_argument()?;
        let argument = argument.trim();

        match ident.as_str() {
            "flag" => Ok(Condition::Flag(single_name(argument)?.to_ascii_lowercase())),
            "os" => Ok(Condition::Os(single_name(argument)?)),
            "arch" => Ok(Condition::Arch(single_name(argument)?)),
            "impl" => parse_impl(argument),
            other => Err(format!("unknown condition '{}'", other)),
        }
    }

    /// Consumes up to the matching `)` and returns the text in between
    fn take_argument(&mut self) -> Result<&str, String> {
        let start = self.pos;
        let mut depth = 0usize;
        for (offset, c) in self.rest().char_indices() {
            match c {
                '(' => depth += 1,
                ')' if depth == 0 => {
                    let end = start + offset;
                    self.pos = end + 1;
                    return Ok(&self.input[start..end]);
                }
                ')' => depth -= 1,
                _ => {}
            }
        }
        Err("expected ')'".to_string())
    }
}

fn single_name(argument: &str) -> Result<String, String> {
    let valid = !argument.is_empty()
        && argument
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(argument.to_string())
    } else {
        Err(format!("invalid name '{}'", argument))
    }
}

fn parse_impl(argument: &str) -> Result<Condition, String> {
    let split = argument
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(argument.len());
    let compiler = single_name(&argument[..split])?.to_ascii_lowercase();
    let range_text = argument[split..].trim();
    let range = if range_text.is_empty() {
        VersionRange::Any
    } else {
        range_text.parse().map_err(|e: crate::domain::RangeParseError| e.message)?
    };
    Ok(Condition::Impl { compiler, range })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_atoms() {
        assert_eq!(Condition::parse("true").unwrap(), Condition::Literal(true));
        assert_eq!(Condition::parse("False").unwrap(), Condition::Literal(false));
        assert_eq!(
            Condition::parse("flag(Dev)").unwrap(),
            Condition::Flag("dev".to_string())
        );
        assert_eq!(
            Condition::parse("os(windows)").unwrap(),
            Condition::Os("windows".to_string())
        );
        assert_eq!(
            Condition::parse("arch( x86_64 )").unwrap(),
            Condition::Arch("x86_64".to_string())
        );
    }

    #[test]
    fn test_parse_impl() {
        let condition = Condition::parse("impl(ghc >= 9.2 && < 9.6)").unwrap();
        match condition {
            Condition::Impl { compiler, range } => {
                assert_eq!(compiler, "ghc");
                assert_eq!(range.to_string(), ">=9.2 && <9.6");
            }
            other => panic!("unexpected condition {:?}", other),
        }

        let bare = Condition::parse("impl(GHC)").unwrap();
        assert_eq!(
            bare,
            Condition::Impl {
                compiler: "ghc".to_string(),
                range: VersionRange::Any
            }
        );
    }

    #[test]
    fn test_parse_impl_nested_parens() {
        let condition = Condition::parse("impl(ghc >=9 && (<9.4 || >=9.8)) && flag(x)").unwrap();
        assert!(matches!(condition, Condition::And(..)));
    }

    #[test]
    fn test_parse_precedence() {
        let condition = Condition::parse("flag(a) || flag(b) && !os(linux)").unwrap();
        assert_eq!(condition.to_string(), "(flag(a) || (flag(b) && !(os(linux))))");
    }

    #[test]
    fn test_parse_errors() {
        assert!(Condition::parse("").is_err());
        assert!(Condition::parse("flag(").is_err());
        assert!(Condition::parse("flag()").is_err());
        assert!(Condition::parse("colour(red)").is_err());
        assert!(Condition::parse("flag(a) flag(b)").is_err());
        assert!(Condition::parse("impl(ghc >=)").is_err());
        assert!(Condition::parse("(flag(a)").is_err());
    }

    #[test]
    fn test_parse_error_keeps_input() {
        let err = Condition::parse("flag(a) && colour(red)").unwrap_err();
        assert_eq!(err.input, "flag(a) && colour(red)");
        assert_eq!(err.message, "unknown condition 'colour'");
        assert_eq!(
            err.to_string(),
            "invalid condition 'flag(a) && colour(red)': unknown condition 'colour'"
        );
    }
}
