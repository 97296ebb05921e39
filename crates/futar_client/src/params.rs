//! Query parameter assembly and default resolution

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::FutarError;

/// How a per-call value falls back to its default
///
/// `Falsy` treats `0`, `NaN`, `false` and `""` like an absent value, so an
/// explicit `false` for a flag whose default is `true` is still sent as
/// `true`. `Unset` only falls back when the value is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultingMode {
    /// Replace falsy values with the default
    #[default]
    Falsy,
    /// Replace only absent values with the default
    Unset,
}

/// Values with a notion of falsiness
pub trait Falsy {
    /// Returns true for zero, NaN, `false` and empty strings
    fn is_falsy(&self) -> bool;
}

impl Falsy for bool {
    fn is_falsy(&self) -> bool {
        !*self
    }
}

impl Falsy for i64 {
    fn is_falsy(&self) -> bool {
        *self == 0
    }
}

impl Falsy for u32 {
    fn is_falsy(&self) -> bool {
        *self == 0
    }
}

impl Falsy for f64 {
    fn is_falsy(&self) -> bool {
        *self == 0.0 || self.is_nan()
    }
}

impl Falsy for &str {
    fn is_falsy(&self) -> bool {
        self.is_empty()
    }
}

impl Falsy for String {
    fn is_falsy(&self) -> bool {
        self.is_empty()
    }
}

impl DefaultingMode {
    /// The value if it counts as supplied under this mode
    pub fn supplied<T: Falsy>(self, value: Option<T>) -> Option<T> {
        match self {
            Self::Falsy => value.filter(|v| !v.is_falsy()),
            Self::Unset => value,
        }
    }

    /// The supplied value, or `default`
    pub fn resolve<T: Falsy>(self, value: Option<T>, default: T) -> T {
        self.supplied(value).unwrap_or(default)
    }
}

/// A scalar query parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Text
    Str(String),
    /// Integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// Boolean, sent as `true`/`false`
    Bool(bool),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Query parameters of a single request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestParams(BTreeMap<&'static str, ParamValue>);

impl RequestParams {
    /// Empty parameter set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, replacing any previous value
    pub fn set(&mut self, key: &'static str, value: impl Into<ParamValue>) -> &mut Self {
        self.0.insert(key, value.into());
        self
    }

    /// Set a parameter only when a value is given
    pub fn set_opt<V: Into<ParamValue>>(&mut self, key: &'static str, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            self.set(key, value);
        }
        self
    }

    /// Value of a parameter
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    /// Whether a parameter is present
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no parameter is set
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Key/value pairs as sent on the wire
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        self.0.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }
}

/// Resolve a required identifier, naming `field` when it is missing
pub fn require_id<'a>(
    mode: DefaultingMode,
    field: &str,
    value: Option<&'a str>,
) -> Result<&'a str, FutarError> {
    mode.supplied(value)
        .ok_or_else(|| FutarError::missing(&[field]))
}

/// Resolve the `stopId` of a stop-scoped call
pub fn require_stop_id(mode: DefaultingMode, stop_id: Option<&str>) -> Result<&str, FutarError> {
    require_id(mode, "stopId", stop_id)
}

/// Resolve the `routeId` of a route-scoped call
pub fn require_route_id(mode: DefaultingMode, route_id: Option<&str>) -> Result<&str, FutarError> {
    require_id(mode, "routeId", route_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_falsy_mode_replaces_false() {
        assert!(DefaultingMode::Falsy.resolve(Some(false), true));
        assert!(DefaultingMode::Falsy.resolve(None, true));
        assert!(!DefaultingMode::Falsy.resolve(Some(false), false));
    }

    #[test]
    fn test_falsy_mode_replaces_zero_and_empty() {
        assert_eq!(DefaultingMode::Falsy.resolve(Some(0_i64), 30), 30);
        assert_eq!(DefaultingMode::Falsy.resolve(Some(0.0_f64), 1.0), 1.0);
        assert_eq!(DefaultingMode::Falsy.resolve(Some(f64::NAN), 1.0), 1.0);
        assert_eq!(DefaultingMode::Falsy.resolve(Some(""), "x"), "x");
        assert_eq!(DefaultingMode::Falsy.resolve(Some(15_i64), 30), 15);
    }

    #[test]
    fn test_unset_mode_honors_explicit_values() {
        assert!(!DefaultingMode::Unset.resolve(Some(false), true));
        assert_eq!(DefaultingMode::Unset.resolve(Some(0_i64), 30), 0);
        assert_eq!(DefaultingMode::Unset.resolve(None, 30_i64), 30);
    }

    #[test]
    fn test_param_value_display() {
        assert_eq!(ParamValue::from(47.5).to_string(), "47.5");
        assert_eq!(ParamValue::from(3000.0).to_string(), "3000");
        assert_eq!(ParamValue::from(true).to_string(), "true");
        assert_eq!(ParamValue::from(3_u32).to_string(), "3");
        assert_eq!(ParamValue::from("F01234").to_string(), "F01234");
    }

    #[test]
    fn test_set_opt_skips_none() {
        let mut params = RequestParams::new();
        params.set("a", 1_i64).set_opt::<i64>("b", None).set_opt("c", Some("x"));
        assert_eq!(params.len(), 2);
        assert!(params.contains("a"));
        assert!(!params.contains("b"));
        assert_eq!(params.get("c"), Some(&ParamValue::Str("x".to_string())));
    }

    #[test]
    fn test_to_query_is_sorted() {
        let mut params = RequestParams::new();
        params.set("version", 3_u32).set("includeReferences", true);
        assert_eq!(
            params.to_query(),
            vec![
                ("includeReferences", "true".to_string()),
                ("version", "3".to_string())
            ]
        );
    }

    #[test]
    fn test_require_stop_id() {
        assert_eq!(
            require_stop_id(DefaultingMode::Falsy, Some("F01234")).unwrap(),
            "F01234"
        );
        assert!(require_stop_id(DefaultingMode::Falsy, None).is_err());
        assert!(require_stop_id(DefaultingMode::Falsy, Some("")).is_err());
        assert!(require_stop_id(DefaultingMode::Unset, Some("")).is_ok());
    }

    #[test]
    fn test_require_route_id_names_field() {
        let err = require_route_id(DefaultingMode::Falsy, None).unwrap_err();
        assert!(err.to_string().contains("routeId"));
    }
}
