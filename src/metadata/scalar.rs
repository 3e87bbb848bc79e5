use std::borrow::Cow;
use std::fmt;

use serde_json::Value as JsonValue;

/// A single attribute value of a source, coerced to a scalar.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Coerce a JSON string or number. Other JSON values have no scalar form.
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::String(text) => Some(Scalar::Text(text.clone())),
            JsonValue::Number(number) => match number.as_i64() {
                Some(integer) => Some(Scalar::Integer(integer)),
                None => number.as_f64().map(Scalar::Float),
            },
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Integer(value) => Some(*value as f64),
            Scalar::Float(value) => Some(*value),
            Scalar::Text(value) => value.trim().parse().ok(),
        }
    }

    /// The value as a non-negative whole number; floats must not have a fraction.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Scalar::Integer(value) => u64::try_from(*value).ok(),
            Scalar::Float(value) if *value >= 0.0 && value.fract() == 0.0 => Some(*value as u64),
            Scalar::Float(_) => None,
            Scalar::Text(value) => value.trim().parse().ok(),
        }
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.into())
    }
}

impl<'a> From<Cow<'a, str>> for Scalar {
    fn from(value: Cow<'a, str>) -> Self {
        Scalar::Text(value.into())
    }
}

impl From<&[u8]> for Scalar {
    fn from(value: &[u8]) -> Self {
        String::from_utf8_lossy(value)
            .trim_end_matches('\0')
            .to_string()
            .into()
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Integer(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Scalar::Integer(value) => write!(f, "{}", value),
            Scalar::Float(value) => write!(f, "{}", value),
            Scalar::Text(value) => write!(f, "{}", value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_coercion() {
        assert_eq!(Scalar::from("12345").as_u64(), Some(12345));
        assert_eq!(Scalar::from(" 78.25 ").as_f64(), Some(78.25));
        assert_eq!(Scalar::from(12345.0).as_u64(), Some(12345));
        assert_eq!(Scalar::from(12.5).as_u64(), None);
        assert_eq!(Scalar::from(-3_i64).as_u64(), None);
        assert_eq!(Scalar::from("north").as_f64(), None);
    }

    #[test]
    fn json_values() {
        assert_eq!(
            Scalar::from_json(&serde_json::json!(46583)),
            Some(Scalar::Integer(46583))
        );
        assert_eq!(
            Scalar::from_json(&serde_json::json!(12.5)),
            Some(Scalar::Float(12.5))
        );
        assert_eq!(
            Scalar::from_json(&serde_json::json!("IW")),
            Some(Scalar::Text("IW".into()))
        );
        assert_eq!(Scalar::from_json(&serde_json::Value::Null), None);
    }

    #[test]
    fn byte_strings() {
        let value = Scalar::from(&b"2023-01-01T00:00:00Z\0"[..]);

        assert_eq!(value, Scalar::Text("2023-01-01T00:00:00Z".into()));
        assert_eq!(value.to_string(), "2023-01-01T00:00:00Z");
    }
}
