//! Version range predicates
//!
//! Handles range syntax like:
//! - Comparisons: `==1.2.3`, `>1.2`, `>=1.2`, `<2`, `<=1.9`
//! - Wildcards: `==1.2.*`
//! - Major bounds: `^>=1.2.3` (same as `>=1.2.3 && <1.3`)
//! - Combinators: `&&`, `||`, `!` and parentheses
//! - Constants: `-any`, `-none`

use super::intervals::VersionIntervals;
use super::version::{Version, VersionParseError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a version range cannot be parsed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid version range '{input}': {message}")]
pub struct RangeParseError {
    pub input: String,
    pub message: String,
}

/// A predicate over versions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionRange {
    /// Every version (`-any`)
    Any,
    /// No version (`-none`)
    None,
    /// `==v`
    This(Version),
    /// `>v`
    Later(Version),
    /// `>=v`
    OrLater(Version),
    /// `<v`
    Earlier(Version),
    /// `<=v`
    OrEarlier(Version),
    /// `==v.*`
    Wildcard(Version),
    /// `^>=v`
    MajorBound(Version),
    /// `a || b`
    Union(Box<VersionRange>, Box<VersionRange>),
    /// `a && b`
    Intersection(Box<VersionRange>, Box<VersionRange>),
    /// `!a`
    Not(Box<VersionRange>),
}

impl VersionRange {
    /// `a || b`
    pub fn union(self, other: VersionRange) -> Self {
        VersionRange::Union(Box::new(self), Box::new(other))
    }

    /// `a && b`
    pub fn intersect(self, other: VersionRange) -> Self {
        VersionRange::Intersection(Box::new(self), Box::new(other))
    }

    /// `!a`
    pub fn complement(self) -> Self {
        VersionRange::Not(Box::new(self))
    }

    /// Returns true if `version` satisfies this range
    pub fn contains(&self, version: &Version) -> bool {
        match self {
            VersionRange::Any => true,
            VersionRange::None => false,
            VersionRange::This(v) => version == v,
            VersionRange::Later(v) => version > v,
            VersionRange::OrLater(v) => version >= v,
            VersionRange::Earlier(v) => version < v,
            VersionRange::OrEarlier(v) => version <= v,
            VersionRange::Wildcard(v) => version >= v && *version < v.wildcard_upper_bound(),
            VersionRange::MajorBound(v) => version >= v && *version < v.major_upper_bound(),
            VersionRange::Union(a, b) => a.contains(version) || b.contains(version),
            VersionRange::Intersection(a, b) => a.contains(version) && b.contains(version),
            VersionRange::Not(a) => !a.contains(version),
        }
    }

    /// Decomposes this range into canonical disjoint intervals
    pub fn intervals(&self) -> VersionIntervals {
        match self {
            VersionRange::Any => VersionIntervals::full(),
            VersionRange::None => VersionIntervals::empty(),
            VersionRange::This(v) => VersionIntervals::exactly(v.clone()),
            VersionRange::Later(v) => VersionIntervals::later(v.clone()),
            VersionRange::OrLater(v) => VersionIntervals::or_later(v.clone()),
            VersionRange::Earlier(v) => VersionIntervals::earlier(v.clone()),
            VersionRange::OrEarlier(v) => VersionIntervals::or_earlier(v.clone()),
            VersionRange::Wildcard(v) => {
                VersionIntervals::between(v.clone(), v.wildcard_upper_bound())
            }
            VersionRange::MajorBound(v) => {
                VersionIntervals::between(v.clone(), v.major_upper_bound())
            }
            VersionRange::Union(a, b) => a.intervals().union(&b.intervals()),
            VersionRange::Intersection(a, b) => a.intervals().intersection(&b.intervals()),
            VersionRange::Not(a) => a.intervals().complement(),
        }
    }

    /// Removes redundant clauses without changing the matched versions
    ///
    /// A range matching nothing is returned as written.
    pub fn simplify(&self) -> VersionRange {
        let intervals = self.intervals();
        if intervals.is_empty() {
            self.clone()
        } else {
            intervals.to_range()
        }
    }

    /// Returns true if this range matches every version
    pub fn is_any(&self) -> bool {
        self.intervals() == VersionIntervals::full()
    }

    fn precedence(&self) -> u8 {
        match self {
            VersionRange::Union(..) => 0,
            VersionRange::Intersection(..) => 1,
            _ => 2,
        }
    }

    fn fmt_child(&self, child: &VersionRange, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if child.precedence() < self.precedence() {
            write!(f, "({})", child)
        } else {
            write!(f, "{}", child)
        }
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionRange::Any => f.write_str("-any"),
            VersionRange::None => f.write_str("-none"),
            VersionRange::This(v) => write!(f, "=={}", v),
            VersionRange::Later(v) => write!(f, ">{}", v),
            VersionRange::OrLater(v) => write!(f, ">={}", v),
            VersionRange::Earlier(v) => write!(f, "<{}", v),
            VersionRange::OrEarlier(v) => write!(f, "<={}", v),
            VersionRange::Wildcard(v) => write!(f, "=={}.*", v),
            VersionRange::MajorBound(v) => write!(f, "^>={}", v),
            VersionRange::Union(a, b) => {
                self.fmt_child(a, f)?;
                f.write_str(" || ")?;
                self.fmt_child(b, f)
            }
            VersionRange::Intersection(a, b) => {
                self.fmt_child(a, f)?;
                f.write_str(" && ")?;
                self.fmt_child(b, f)
            }
            VersionRange::Not(a) => match a.as_ref() {
                VersionRange::Union(..) | VersionRange::Intersection(..) => write!(f, "!({})", a),
                _ => write!(f, "!{}", a),
            },
        }
    }
}

impl FromStr for VersionRange {
    type Err = RangeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens = tokenize(s)?;
        let mut parser = RangeParser {
            input: s,
            tokens,
            pos: 0,
        };
        let range = parser.parse_or()?;
        if parser.pos < parser.tokens.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(range)
    }
}

impl Serialize for VersionRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VersionRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Eq,
    Gt,
    Ge,
    Lt,
    Le,
    Caret,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    LParen,
    RParen,
    And,
    Or,
    Not,
    Op(Op),
    Version { text: String, wildcard: bool },
    AnyVersion,
    NoVersion,
}

fn tokenize(input: &str) -> Result<Vec<Token>, RangeParseError> {
    let err = |message: String| RangeParseError {
        input: input.to_string(),
        message,
    };

    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let rest = &input[i..];
        let c = bytes[i];

        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        let fixed = [
            ("^>=", Token::Op(Op::Caret)),
            ("&&", Token::And),
            ("||", Token::Or),
            ("==", Token::Op(Op::Eq)),
            (">=", Token::Op(Op::Ge)),
            ("<=", Token::Op(Op::Le)),
            (">", Token::Op(Op::Gt)),
            ("<", Token::Op(Op::Lt)),
            ("!", Token::Not),
            ("(", Token::LParen),
            (")", Token::RParen),
            ("-any", Token::AnyVersion),
            ("-none", Token::NoVersion),
        ];
        if let Some((text, token)) = fixed.iter().find(|(text, _)| rest.starts_with(text)) {
            tokens.push(token.clone());
            i += text.len();
            continue;
        }

        if c.is_ascii_digit() {
            let start = i;
            while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                // `1.2.*` stops before the star; the dot belongs to the wildcard
                if bytes[i] == b'.' && bytes.get(i + 1) == Some(&b'*') {
                    break;
                }
                i += 1;
            }
            let text = input[start..i].to_string();
            let wildcard = input[i..].starts_with(".*");
            if wildcard {
                i += 2;
            }
            tokens.push(Token::Version { text, wildcard });
            continue;
        }

        return Err(err(format!(
            "unexpected character '{}'",
            rest.chars().next().unwrap_or_default()
        )));
    }

    if tokens.is_empty() {
        return Err(err("empty range".to_string()));
    }
    Ok(tokens)
}

struct RangeParser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl RangeParser<'_> {
    fn error(&self, message: impl Into<String>) -> RangeParseError {
        RangeParseError {
            input: self.input.to_string(),
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn parse_or(&mut self) -> Result<VersionRange, RangeParseError> {
        let mut range = self.parse_and()?;
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            range = range.union(self.parse_and()?);
        }
        Ok(range)
    }

    fn parse_and(&mut self) -> Result<VersionRange, RangeParseError> {
        let mut range = self.parse_unary()?;
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            range = range.intersect(self.parse_unary()?);
        }
        Ok(range)
    }

    fn parse_unary(&mut self) -> Result<VersionRange, RangeParseError> {
        if self.peek() == Some(&Token::Not) {
            self.pos += 1;
            return Ok(self.parse_unary()?.complement());
        }
        self.parse_atom()
    }

    fn parse_atom(&mut self) -> Result<VersionRange, RangeParseError> {
        match self.next() {
            Some(Token::LParen) => {
                let range = self.parse_or()?;
                match self.next() {
                    Some(Token::RParen) => Ok(range),
                    _ => Err(self.error("expected ')'")),
                }
            }
            Some(Token::AnyVersion) => Ok(VersionRange::Any),
            Some(Token::NoVersion) => Ok(VersionRange::None),
            Some(Token::Op(op)) => {
                let (text, wildcard) = match self.next() {
                    Some(Token::Version { text, wildcard }) => (text, wildcard),
                    _ => return Err(self.error("expected a version after operator")),
                };
                let version: Version = text
                    .parse()
                    .map_err(|e: VersionParseError| self.error(e.message))?;
                match (op, wildcard) {
                    (Op::Eq, true) => Ok(VersionRange::Wildcard(version)),
                    (_, true) => Err(self.error("wildcards are only allowed with '=='")),
                    (Op::Eq, false) => Ok(VersionRange::This(version)),
                    (Op::Gt, false) => Ok(VersionRange::Later(version)),
                    (Op::Ge, false) => Ok(VersionRange::OrLater(version)),
                    (Op::Lt, false) => Ok(VersionRange::Earlier(version)),
                    (Op::Le, false) => Ok(VersionRange::OrEarlier(version)),
                    (Op::Caret, false) => Ok(VersionRange::MajorBound(version)),
                }
            }
            Some(Token::Version { text, .. }) => {
                Err(self.error(format!("version '{}' needs an operator", text)))
            }
            Some(_) => Err(self.error("unexpected token")),
            None => Err(self.error("unexpected end of range")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(s: &str) -> VersionRange {
        s.parse().unwrap()
    }

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_comparisons() {
        assert_eq!(r("==1.2"), VersionRange::This(v("1.2")));
        assert_eq!(r(">1.2"), VersionRange::Later(v("1.2")));
        assert_eq!(r(">= 1.2"), VersionRange::OrLater(v("1.2")));
        assert_eq!(r("<2"), VersionRange::Earlier(v("2")));
        assert_eq!(r("<=2"), VersionRange::OrEarlier(v("2")));
        assert_eq!(r("^>=4.14"), VersionRange::MajorBound(v("4.14")));
        assert_eq!(r("==1.2.*"), VersionRange::Wildcard(v("1.2")));
        assert_eq!(r("-any"), VersionRange::Any);
        assert_eq!(r("-none"), VersionRange::None);
    }

    #[test]
    fn test_parse_precedence() {
        // && binds tighter than ||
        let range = r("==1 || >=2 && <3");
        assert_eq!(
            range,
            VersionRange::This(v("1"))
                .union(VersionRange::OrLater(v("2")).intersect(VersionRange::Earlier(v("3"))))
        );

        let grouped = r("(==1 || >=2) && <3");
        assert!(grouped.contains(&v("1")));
        assert!(grouped.contains(&v("2.5")));
        assert!(!grouped.contains(&v("3")));
    }

    #[test]
    fn test_parse_not() {
        let range = r("!(>=1 && <2)");
        assert!(range.contains(&v("0.9")));
        assert!(!range.contains(&v("1.5")));
        assert!(range.contains(&v("2")));
    }

    #[test]
    fn test_parse_errors() {
        assert!("".parse::<VersionRange>().is_err());
        assert!("1.2".parse::<VersionRange>().is_err());
        assert!(">=".parse::<VersionRange>().is_err());
        assert!(">=1.2 &&".parse::<VersionRange>().is_err());
        assert!("(>=1.2".parse::<VersionRange>().is_err());
        assert!(">=1.2.*".parse::<VersionRange>().is_err());
        assert!(">=1.2 <2".parse::<VersionRange>().is_err());
        assert!("~1.2".parse::<VersionRange>().is_err());
    }

    #[test]
    fn test_contains() {
        let range = r(">=1.2 && <1.3");
        assert!(range.contains(&v("1.2")));
        assert!(range.contains(&v("1.2.5")));
        assert!(!range.contains(&v("1.3")));
        assert!(!range.contains(&v("1.1.9")));

        let caret = r("^>=1.2.3");
        assert!(caret.contains(&v("1.2.3")));
        assert!(caret.contains(&v("1.2.9")));
        assert!(!caret.contains(&v("1.3")));
        assert!(!caret.contains(&v("1.2.2")));

        let wildcard = r("==1.2.*");
        assert!(wildcard.contains(&v("1.2")));
        assert!(wildcard.contains(&v("1.2.7.1")));
        assert!(!wildcard.contains(&v("1.3")));
    }

    #[test]
    fn test_display_roundtrips_structure() {
        for input in [
            ">=1.2 && <1.3",
            "==1 || >=2 && <3",
            "(==1 || >=2) && <3",
            "!(>=1 && <2)",
            "!==1.0",
            "^>=4.14 || ^>=5.0",
            "==1.2.*",
            "-any",
        ] {
            let range = r(input);
            assert_eq!(range.to_string(), input);
            assert_eq!(r(&range.to_string()), range);
        }
    }

    #[test]
    fn test_simplify() {
        assert_eq!(r(">=1 && >=2").simplify().to_string(), ">=2");
        assert_eq!(r("^>=1.2.3").simplify().to_string(), ">=1.2.3 && <1.3");
        assert_eq!(r(">=1 || <3").simplify().to_string(), "-any");
        assert_eq!(r("==1.0 || ==1.0").simplify().to_string(), "==1.0");
        assert_eq!(r("<1 || >=2").simplify().to_string(), "<1 || >=2");
        // An empty range is kept as written
        assert_eq!(r(">=2 && <1").simplify().to_string(), ">=2 && <1");
    }

    #[test]
    fn test_is_any() {
        assert!(r("-any").is_any());
        assert!(r(">=0").is_any());
        assert!(!r(">0").is_any());
    }

    #[test]
    fn test_serde_range() {
        let range = r(">=1.2 && <1.3");
        let json = serde_json::to_string(&range).unwrap();
        assert_eq!(json, "\">=1.2 && <1.3\"");
        let parsed: VersionRange = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, range);
    }
}
