//! Typed values produced by validators and the type descriptors used to pick them.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::fmt::{self, Display};
use std::net::IpAddr;
use std::path::PathBuf;

/// The numeric kinds a numeric validator can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericKind {
    Int,
    Long,
    Float,
    Double,
    Decimal,
}

impl NumericKind {
    /// Parses `raw` with this kind's own parse rule.
    pub fn parse(self, raw: &str) -> Option<Number> {
        match self {
            NumericKind::Int => raw.parse().ok().map(Number::Int),
            NumericKind::Long => raw.parse().ok().map(Number::Long),
            NumericKind::Float => raw
                .parse::<f32>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Number::Float),
            NumericKind::Double => raw
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Number::Double),
            NumericKind::Decimal => raw.parse().ok().map(Number::Decimal),
        }
    }
}

/// A parsed number tagged with its kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Decimal(Decimal),
}

impl Number {
    pub fn kind(&self) -> NumericKind {
        match self {
            Number::Int(_) => NumericKind::Int,
            Number::Long(_) => NumericKind::Long,
            Number::Float(_) => NumericKind::Float,
            Number::Double(_) => NumericKind::Double,
            Number::Decimal(_) => NumericKind::Decimal,
        }
    }
}

/// Numbers only compare against numbers of the same kind.
impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a.partial_cmp(b),
            (Number::Long(a), Number::Long(b)) => a.partial_cmp(b),
            (Number::Float(a), Number::Float(b)) => a.partial_cmp(b),
            (Number::Double(a), Number::Double(b)) => a.partial_cmp(b),
            (Number::Decimal(a), Number::Decimal(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(v) => write!(f, "{}", v),
            Number::Long(v) => write!(f, "{}", v),
            Number::Float(v) => write!(f, "{}", v),
            Number::Double(v) => write!(f, "{}", v),
            Number::Decimal(v) => write!(f, "{}", v),
        }
    }
}

/// A member of an enumerated type as seen by the enum validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMember {
    pub name: String,
    pub ordinal: i64,
}

/// Host enums opt into enum validation by listing their members.
///
/// ```
/// use keymenu::Enumerated;
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// enum Color { Red = 1, Green = 2 }
///
/// impl Enumerated for Color {
///     fn members() -> &'static [(&'static str, i64)] {
///         &[("Red", 1), ("Green", 2)]
///     }
///     fn from_ordinal(ordinal: i64) -> Option<Self> {
///         match ordinal { 1 => Some(Color::Red), 2 => Some(Color::Green), _ => None }
///     }
/// }
/// ```
pub trait Enumerated: Sized {
    /// Declared member names with their underlying ordinals, in declaration order.
    fn members() -> &'static [(&'static str, i64)];

    fn from_ordinal(ordinal: i64) -> Option<Self>;

    /// Short type name used in the default error message.
    fn type_name() -> &'static str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }
}

/// Strongly typed result of a successful validation.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Number(Number),
    Bool(bool),
    DateTime(NaiveDateTime),
    Ip(IpAddr),
    Path(PathBuf),
    Enum(EnumMember),
}

impl Value {
    /// Name of the variant, for diagnostics.
    pub fn variant_name(&self) -> &'static str {
        match self {
            Value::Text(_) => "text",
            Value::Number(_) => "number",
            Value::Bool(_) => "bool",
            Value::DateTime(_) => "date-time",
            Value::Ip(_) => "ip address",
            Value::Path(_) => "path",
            Value::Enum(_) => "enum member",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Converts an enum member value back into the host enum.
    pub fn as_enum<T: Enumerated>(&self) -> Option<T> {
        match self {
            Value::Enum(m) => T::from_ordinal(m.ordinal),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{}", s),
            Value::Number(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::DateTime(dt) => write!(f, "{}", dt),
            Value::Ip(ip) => write!(f, "{}", ip),
            Value::Path(p) => write!(f, "{}", p.display()),
            Value::Enum(m) => write!(f, "{}", m.name),
        }
    }
}

/// Descriptor of a destination's declared type, used for validator inference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SemanticType {
    String,
    Int,
    Long,
    Float,
    Double,
    Decimal,
    Bool,
    DateTime,
    IpAddr,
    Path,
    Enum,
    /// Anything the host wants to name itself.
    Other(String),
}

impl From<NumericKind> for SemanticType {
    fn from(kind: NumericKind) -> Self {
        match kind {
            NumericKind::Int => SemanticType::Int,
            NumericKind::Long => SemanticType::Long,
            NumericKind::Float => SemanticType::Float,
            NumericKind::Double => SemanticType::Double,
            NumericKind::Decimal => SemanticType::Decimal,
        }
    }
}
