use std::fmt;

use serde::{Deserialize, Serialize};

/// A value produced by the parser for one argument.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
}

/// The type a value-taking argument is coerced to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    #[default]
    Str,
    Int,
    Float,
    Bool,
}

impl Value {
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Renders a scalar literal the way clap expects it on the command line,
    /// checking that it would parse as `ty`. Lists and `None` never do.
    pub(crate) fn to_literal(&self, ty: ValueType) -> Option<String> {
        let literal = match self {
            Value::None | Value::List(_) => return None,
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Str(s) => s.clone(),
        };
        let fits = match ty {
            ValueType::Str => true,
            ValueType::Int => literal.parse::<i64>().is_ok(),
            ValueType::Float => literal.parse::<f64>().is_ok(),
            ValueType::Bool => literal.parse::<bool>().is_ok(),
        };
        fits.then_some(literal)
    }

    /// Turns a checked literal back into a value of `ty`.
    pub(crate) fn from_literal(literal: &str, ty: ValueType) -> Value {
        let parsed = match ty {
            ValueType::Str => None,
            ValueType::Int => literal.parse().ok().map(Value::Int),
            ValueType::Float => literal.parse().ok().map(Value::Float),
            ValueType::Bool => literal.parse().ok().map(Value::Bool),
        };
        parsed.unwrap_or_else(|| Value::Str(literal.to_owned()))
    }
}

/// `{:?}` of a float, with `.0` added to the mantissa when it has no decimal point.
fn float_literal(x: f64) -> String {
    let mut s = format!("{:?}", x);
    if x.is_finite() && !s.contains('.') {
        let at = s.find('e').unwrap_or(s.len());
        s.insert_str(at, ".0");
    }
    s
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => f.write_str("None"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => f.write_str(&float_literal(*x)),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Str => "str",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Bool => "bool",
        };
        f.write_str(name)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::None, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_renders_like_a_literal() {
        assert_eq!(Value::None.to_string(), "None");
        assert_eq!(Value::from("utf-8").to_string(), "\"utf-8\"");
        assert_eq!(Value::from(2.0).to_string(), "2.0");
        assert_eq!(Value::from(1e16).to_string(), "1.0e16");
        assert_eq!(Value::from(1e-7).to_string(), "1.0e-7");
        assert_eq!(Value::from(-2.5e-8).to_string(), "-2.5e-8");
        assert_eq!(Value::from(f64::INFINITY).to_string(), "inf");
        assert_eq!(Value::from(vec![1, 2]).to_string(), "[1, 2]");
        assert_eq!(Value::from(Some(true)).to_string(), "true");
    }

    #[test]
    fn literals_are_checked_against_the_type() {
        assert_eq!(Value::from(3).to_literal(ValueType::Str).as_deref(), Some("3"));
        assert_eq!(Value::from("3").to_literal(ValueType::Int).as_deref(), Some("3"));
        assert_eq!(Value::from("three").to_literal(ValueType::Int), None);
        assert_eq!(Value::from(1).to_literal(ValueType::Float).as_deref(), Some("1"));
        assert_eq!(Value::from(true).to_literal(ValueType::Bool).as_deref(), Some("true"));
        assert_eq!(Value::from(vec!["a"]).to_literal(ValueType::Str), None);
        assert_eq!(Value::None.to_literal(ValueType::Str), None);
    }

    #[test]
    fn literals_parse_back_to_their_type() {
        assert_eq!(Value::from_literal("3", ValueType::Int), Value::Int(3));
        assert_eq!(Value::from_literal("3", ValueType::Str), Value::from("3"));
        assert_eq!(Value::from_literal("0.50", ValueType::Float), Value::Float(0.5));
        assert_eq!(Value::from_literal("false", ValueType::Bool), Value::Bool(false));
    }

    #[test]
    fn json_is_untagged() {
        let value: Value = serde_json::from_str(r#"[null, true, 3, 1.5, "x"]"#).unwrap();
        assert_eq!(
            value,
            Value::List(vec![
                Value::None,
                Value::Bool(true),
                Value::Int(3),
                Value::Float(1.5),
                Value::from("x"),
            ])
        );
        assert_eq!(serde_json::to_string(&value).unwrap(), r#"[null,true,3,1.5,"x"]"#);
    }
}
