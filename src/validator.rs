//! # Validator Engine
//!
//! A [`Validator`] turns one line of raw text into a typed [`Value`]. Each
//! validator is a closed [`Rule`] plus an error message and a slot holding the
//! last successfully parsed value.
//!
//! [`Validator::validate`] never fails loudly: bad input yields `false` and
//! leaves the held value untouched, good input yields `true` and replaces it.
//! The caller decides where the value goes (see [`crate::prompt`]).
//!
//! All rules except [`Rule::AnyString`] trim surrounding whitespace first.
//!
//! ```
//! use keymenu::{Validator, Value, Number};
//!
//! let mut v = Validator::int_range(1, 10);
//! assert!(!v.validate("11"));
//! assert_eq!(v.error_message(), "Value must be between [1] and [10]");
//! assert!(v.validate("10"));
//! assert_eq!(v.value(), Some(&Value::Number(Number::Int(10))));
//! ```

use crate::error::ValidatorError;
use crate::value::{EnumMember, Enumerated, Number, NumericKind, SemanticType, Value};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::warn;
use regex::Regex;
use rust_decimal::Decimal;
use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Email addresses: `local@domain.tld`.
pub const EMAIL: &str = r"[\w.+%-]+@(?:[\w-]+\.)+\w{2,6}";
/// North American phone numbers, e.g. `(555) 123-4567` or `555-123-4567`.
pub const PHONE_NUMBER: &str = r"\(?\d{3}\)?\s?-?\s?\d{3}\s?-?\s?\d{4}";
/// Printable ASCII, at least six characters. [`Pattern::strong_password`]
/// additionally requires a digit, an upper and lower case letter and a symbol.
pub const STRONG_PASSWORD: &str = r"[\x21-\x7E]{6,}";

const STRONG_PASSWORD_CLASSES: [&str; 4] = [
    r"[0-9]",
    r"[A-Z]",
    r"[a-z]",
    r"[\x21-\x2F\x3A-\x40\x5B-\x60\x7B-\x7E]",
];

static EMAIL_PATTERN: LazyLock<Pattern> =
    LazyLock::new(|| Pattern::new(EMAIL).expect("email pattern compiles"));
static PHONE_PATTERN: LazyLock<Pattern> =
    LazyLock::new(|| Pattern::new(PHONE_NUMBER).expect("phone pattern compiles"));
static STRONG_PASSWORD_PATTERN: LazyLock<Pattern> = LazyLock::new(|| {
    Pattern::new(STRONG_PASSWORD)
        .and_then(|p| p.requiring(&STRONG_PASSWORD_CLASSES))
        .expect("password pattern compiles")
});

/// A whole-input regular expression, optionally combined with character
/// classes that must each appear somewhere in the input.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    full: Regex,
    required: Vec<Regex>,
}

impl Pattern {
    /// Compiles `pattern` so that it must match the entire input.
    pub fn new(pattern: &str) -> Result<Self, ValidatorError> {
        Ok(Self {
            source: pattern.to_string(),
            full: compile(&format!("^(?:{})$", pattern))?,
            required: Vec::new(),
        })
    }

    /// Adds sub-patterns that must each be found somewhere in the input.
    pub fn requiring(mut self, patterns: &[&str]) -> Result<Self, ValidatorError> {
        for p in patterns {
            self.required.push(compile(p)?);
        }
        Ok(self)
    }

    pub fn email() -> Self {
        EMAIL_PATTERN.clone()
    }

    pub fn phone_number() -> Self {
        PHONE_PATTERN.clone()
    }

    pub fn strong_password() -> Self {
        STRONG_PASSWORD_PATTERN.clone()
    }

    pub fn is_match(&self, input: &str) -> bool {
        self.full.is_match(input) && self.required.iter().all(|r| r.is_match(input))
    }

    /// The pattern as it was supplied, without anchors.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

fn compile(pattern: &str) -> Result<Regex, ValidatorError> {
    Regex::new(pattern).map_err(|source| ValidatorError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// What a path must point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    File,
    Directory,
}

/// Filesystem requirements of a path validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathRule {
    pub kind: PathKind,
    pub must_exist: bool,
    /// Directories only: create the directory, succeeding iff creation succeeds.
    pub auto_create: bool,
}

/// How the enum validator reads its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumMode {
    /// Input must exactly equal a member name.
    ByName,
    /// Input must be an integer equal to a member's ordinal.
    ByValue,
}

/// The closed set of validation rules.
#[derive(Debug, Clone)]
pub enum Rule {
    /// Always succeeds with the raw text.
    AnyString,
    NonBlank,
    Pattern(Pattern),
    Numeric {
        kind: NumericKind,
        /// Inclusive bounds, same kind as `kind`.
        range: Option<(Number, Number)>,
    },
    Path(PathRule),
    Ip,
    DateTime,
    Bool,
    Enum {
        members: Vec<EnumMember>,
        mode: EnumMode,
    },
}

impl Rule {
    /// Parses `raw` under this rule without touching any validator state.
    ///
    /// Directory auto-creation happens here, as a side effect of a successful parse.
    pub fn parse(&self, raw: &str) -> Option<Value> {
        let input = raw.trim();
        match self {
            Rule::AnyString => Some(Value::Text(raw.to_string())),
            Rule::NonBlank => non_blank(input).map(|s| Value::Text(s.to_string())),
            Rule::Pattern(pattern) => non_blank(input)
                .filter(|s| pattern.is_match(s))
                .map(|s| Value::Text(s.to_string())),
            Rule::Numeric { kind, range } => {
                let n = kind.parse(input)?;
                match range {
                    Some((min, max)) if !(n >= *min && n <= *max) => None,
                    _ => Some(Value::Number(n)),
                }
            }
            Rule::Path(rule) => {
                let path = Path::new(non_blank(input)?);
                check_path(rule, path).then(|| Value::Path(PathBuf::from(path)))
            }
            Rule::Ip => input.parse::<IpAddr>().ok().map(Value::Ip),
            Rule::DateTime => parse_date_time(input).map(Value::DateTime),
            Rule::Bool => parse_bool(input).map(Value::Bool),
            Rule::Enum { members, mode } => {
                let found = match mode {
                    EnumMode::ByName => members.iter().find(|m| m.name == input),
                    EnumMode::ByValue => {
                        let ordinal = input.parse::<i64>().ok()?;
                        members.iter().find(|m| m.ordinal == ordinal)
                    }
                };
                found.cloned().map(Value::Enum)
            }
        }
    }

    /// Semantic type of the values this rule produces.
    pub fn produces(&self) -> SemanticType {
        match self {
            Rule::AnyString | Rule::NonBlank | Rule::Pattern(_) => SemanticType::String,
            Rule::Numeric { kind, .. } => SemanticType::from(*kind),
            Rule::Path(_) => SemanticType::Path,
            Rule::Ip => SemanticType::IpAddr,
            Rule::DateTime => SemanticType::DateTime,
            Rule::Bool => SemanticType::Bool,
            Rule::Enum { .. } => SemanticType::Enum,
        }
    }
}

fn non_blank(input: &str) -> Option<&str> {
    (!input.is_empty()).then_some(input)
}

fn check_path(rule: &PathRule, path: &Path) -> bool {
    match rule.kind {
        PathKind::File => !rule.must_exist || path.is_file(),
        PathKind::Directory if rule.auto_create => match fs::create_dir_all(path) {
            Ok(()) => true,
            Err(e) => {
                warn!("could not create directory {}: {}", path.display(), e);
                false
            }
        },
        PathKind::Directory => !rule.must_exist || path.is_dir(),
    }
}

fn parse_bool(input: &str) -> Option<bool> {
    let lower = input.to_ascii_lowercase();
    match lower.as_str() {
        "t" | "true" => Some(true),
        "f" | "false" => Some(false),
        _ => None,
    }
}

const DATE_TIME_FORMATS: [&str; 7] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M %p",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// Locale-neutral date-time grammar. Dates without a time mean midnight.
fn parse_date_time(input: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.naive_utc());
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(input, f).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(input, f).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// A rule, its error message and the last value it accepted.
#[derive(Debug, Clone)]
pub struct Validator {
    rule: Rule,
    error_message: String,
    value: Option<Value>,
}

impl Validator {
    pub fn new(rule: Rule, error_message: impl Into<String>) -> Self {
        Self {
            rule,
            error_message: error_message.into(),
            value: None,
        }
    }

    /// Accepts anything, including blank input, unchanged.
    pub fn any_string() -> Self {
        Self::new(Rule::AnyString, "value may be anything")
    }

    pub fn non_blank() -> Self {
        Self::new(Rule::NonBlank, "value may not be blank")
    }

    pub fn pattern(pattern: Pattern) -> Self {
        let message = format!("value must match the pattern {}", pattern.as_str());
        Self::new(Rule::Pattern(pattern), message)
    }

    pub fn email() -> Self {
        Self::new(Rule::Pattern(Pattern::email()), "value must be an email address")
    }

    pub fn phone_number() -> Self {
        Self::new(Rule::Pattern(Pattern::phone_number()), "value must be a phone number")
    }

    pub fn strong_password() -> Self {
        Self::new(
            Rule::Pattern(Pattern::strong_password()),
            "password needs 6+ characters with a digit, upper and lower case letters and a symbol",
        )
    }

    /// Unbounded number of the given kind.
    pub fn numeric(kind: NumericKind) -> Self {
        Self::new(Rule::Numeric { kind, range: None }, "Input must be numeric")
    }

    pub fn int() -> Self {
        Self::numeric(NumericKind::Int)
    }

    pub fn long() -> Self {
        Self::numeric(NumericKind::Long)
    }

    pub fn float() -> Self {
        Self::numeric(NumericKind::Float)
    }

    pub fn double() -> Self {
        Self::numeric(NumericKind::Double)
    }

    pub fn decimal() -> Self {
        Self::numeric(NumericKind::Decimal)
    }

    fn bounded(min: Number, max: Number) -> Self {
        let message = format!("Value must be between [{}] and [{}]", min, max);
        Self::new(
            Rule::Numeric {
                kind: min.kind(),
                range: Some((min, max)),
            },
            message,
        )
    }

    pub fn int_range(min: i32, max: i32) -> Self {
        Self::bounded(Number::Int(min), Number::Int(max))
    }

    pub fn long_range(min: i64, max: i64) -> Self {
        Self::bounded(Number::Long(min), Number::Long(max))
    }

    pub fn float_range(min: f32, max: f32) -> Self {
        Self::bounded(Number::Float(min), Number::Float(max))
    }

    pub fn double_range(min: f64, max: f64) -> Self {
        Self::bounded(Number::Double(min), Number::Double(max))
    }

    pub fn decimal_range(min: Decimal, max: Decimal) -> Self {
        Self::bounded(Number::Decimal(min), Number::Decimal(max))
    }

    pub fn file(must_exist: bool) -> Self {
        let message = if must_exist {
            "File must exist"
        } else {
            "value may not be blank"
        };
        Self::new(
            Rule::Path(PathRule {
                kind: PathKind::File,
                must_exist,
                auto_create: false,
            }),
            message,
        )
    }

    pub fn directory(auto_create: bool, must_exist: bool) -> Self {
        let message = if auto_create {
            "Directory could not be created"
        } else if must_exist {
            "Directory must exist"
        } else {
            "value may not be blank"
        };
        Self::new(
            Rule::Path(PathRule {
                kind: PathKind::Directory,
                must_exist,
                auto_create,
            }),
            message,
        )
    }

    pub fn ip() -> Self {
        Self::new(Rule::Ip, "Value must be a valid IPAddress")
    }

    pub fn date_time() -> Self {
        Self::new(Rule::DateTime, "Value must be a valid Date Time format")
    }

    pub fn boolean() -> Self {
        Self::new(Rule::Bool, "Value must be [true | t | false | f]")
    }

    /// Validator over the members of a host enum.
    pub fn enumeration<T: Enumerated>(mode: EnumMode) -> Self {
        let members = T::members()
            .iter()
            .map(|(name, ordinal)| EnumMember {
                name: name.to_string(),
                ordinal: *ordinal,
            })
            .collect();
        Self::new(
            Rule::Enum { members, mode },
            format!("value must be of type {}", T::type_name()),
        )
    }

    /// Replaces the error message shown on failure.
    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = message.into();
        self
    }

    /// Checks `raw`; on success the parsed value replaces the held one.
    /// On failure the held value is left as it was.
    pub fn validate(&mut self, raw: &str) -> bool {
        match self.rule.parse(raw) {
            Some(value) => {
                self.value = Some(value);
                true
            }
            None => false,
        }
    }

    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    /// The last accepted value; `None` until a `validate` succeeds.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    /// Semantic type of the values this validator assigns.
    pub fn assigns(&self) -> SemanticType {
        self.rule.produces()
    }
}
