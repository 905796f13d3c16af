//! Transaction amount
//!
//! Statement exports format money for people, not machines: currency
//! markers, thousands separators, accounting parentheses. A value that
//! can't be read is kept as [`Amount::Unparsed`] instead of aborting the
//! import, so the rest of the batch still goes through.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;

/// Leading sign, optional currency marker, digits with optional thousands
/// separators, optional fraction and exponent, optional accounting parens.
static AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?P<open>\()?\s*",
        r"(?P<sign>[-+])?\s*",
        r"(?:CA\$|C\$|US\$|CAD|USD|\$|€|£)?\s*",
        r"(?P<inner_sign>[-+])?\s*",
        r"(?P<num>(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?|\.\d+)",
        r"(?P<exp>[eE][-+]?\d+)?",
        r"\s*(?P<close>\))?$"
    ))
    .expect("amount pattern is valid")
});

/// A signed monetary amount, or the raw text that couldn't be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Amount {
    Value(Decimal),
    Unparsed(String),
}

impl Amount {
    /// Parse a locale-formatted currency value
    ///
    /// Never fails: unreadable input becomes `Amount::Unparsed`.
    pub fn parse(raw: &str) -> Self {
        match parse_currency(raw.trim()) {
            Some(value) => Amount::Value(value),
            None => Amount::Unparsed(raw.to_string()),
        }
    }

    pub fn value(&self) -> Option<Decimal> {
        match self {
            Amount::Value(v) => Some(*v),
            Amount::Unparsed(_) => None,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, Amount::Value(_))
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::Value(value)
    }
}

/// Shortest decimal form (`-50.00` renders as `-50`), `NaN` when unparsed
impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Value(v) => write!(f, "{}", v.normalize()),
            Amount::Unparsed(_) => write!(f, "NaN"),
        }
    }
}

fn parse_currency(s: &str) -> Option<Decimal> {
    let caps = AMOUNT_RE.captures(s)?;

    // Parens must come in pairs, and only one sign is allowed
    if caps.name("open").is_some() != caps.name("close").is_some() {
        return None;
    }
    let sign = match (caps.name("sign"), caps.name("inner_sign")) {
        (Some(_), Some(_)) => return None,
        (Some(m), None) | (None, Some(m)) => m.as_str(),
        (None, None) => "",
    };

    let digits = caps["num"].replace(',', "");
    let mut value = match caps.name("exp") {
        Some(exp) => Decimal::from_scientific(&format!("{}{}", digits, exp.as_str())).ok()?,
        None => Decimal::from_str(&digits).ok()?,
    };

    if sign == "-" {
        value = -value;
    }
    if caps.name("open").is_some() && value > Decimal::ZERO {
        value = -value;
    }

    Some(value)
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// Serialized as a JSON number; unparsed amounts become `null`
impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.value().and_then(|v| v.to_f64()) {
            Some(v) => serializer.serialize_f64(v),
            None => serializer.serialize_none(),
        }
    }
}

/// Accepts a number, a numeric string, or `null`
impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value: JsonValue = Deserialize::deserialize(deserializer)?;
        Ok(match value {
            JsonValue::Number(n) => {
                let s = n.to_string();
                match parse_decimal(&s) {
                    Some(v) => Amount::Value(v),
                    None => Amount::Unparsed(s),
                }
            }
            JsonValue::String(s) => Amount::parse(&s),
            JsonValue::Null => Amount::Unparsed(String::new()),
            other => Amount::Unparsed(other.to_string()),
        })
    }
}
