//! Typed node parameters and their by-name view.
//!
//! Every node kind carries its own parameter struct. Editors and project
//! files, however, address parameters as a flat `name -> value` mapping.
//! [`NodeParams`] bridges the two and is generated by `#[derive(NodeParams)]`.
//!
//! # Example
//!
//! ```ignore
//! let mut line = AddLine::default();
//! line.set("count", &ParamValue::Integer(12))?;
//! assert_eq!(line.get("count"), Some(ParamValue::Integer(12)));
//! ```

use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ParamError;

/// A single parameter value as seen by editors and project files.
///
/// Serialized untagged, so a project file stores plain JSON scalars
/// (`3`, `0.5`, `true`, `"swirl"`) and `[x, y, z]` arrays.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Integer(i64),
    Number(f64),
    Text(String),
    Vec3([f64; 3]),
}

impl ParamValue {
    /// Numeric view; integers widen to floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Number(v) => Some(*v),
            ParamValue::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Integer view; floats are accepted only when they hold a whole number.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Integer(v) => Some(*v),
            ParamValue::Number(v) if v.is_finite() && v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<DVec3> {
        match self {
            ParamValue::Vec3(v) => Some(DVec3::from_array(*v)),
            _ => None,
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Number(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Integer(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<DVec3> for ParamValue {
    fn from(v: DVec3) -> Self {
        ParamValue::Vec3(v.to_array())
    }
}

/// Declared type of a parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamKind {
    Number,
    Integer,
    Bool,
    Text,
    Vec3,
    /// Enum-string parameter with its accepted values.
    Choice(&'static [&'static str]),
}

impl ParamKind {
    /// Whether `value` can be stored in a field of this kind.
    pub fn accepts(&self, value: &ParamValue) -> bool {
        match self {
            ParamKind::Number => value.as_f64().is_some(),
            ParamKind::Integer => value.as_i64().is_some(),
            ParamKind::Bool => value.as_bool().is_some(),
            ParamKind::Text => value.as_str().is_some(),
            ParamKind::Vec3 => value.as_vec3().is_some(),
            ParamKind::Choice(variants) => value.as_str().is_some_and(|s| variants.contains(&s)),
        }
    }
}

impl std::fmt::Display for ParamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamKind::Number => write!(f, "number"),
            ParamKind::Integer => write!(f, "integer"),
            ParamKind::Bool => write!(f, "boolean"),
            ParamKind::Text => write!(f, "string"),
            ParamKind::Vec3 => write!(f, "vec3"),
            ParamKind::Choice(variants) => write!(f, "one of {}", variants.join("|")),
        }
    }
}

/// One declared parameter: its key and type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParamField {
    pub key: &'static str,
    pub kind: ParamKind,
}

/// Flat `key -> value` view of a parameter struct.
pub type ParamMap = BTreeMap<String, ParamValue>;

/// By-name access to a node kind's parameter struct.
///
/// Do not implement by hand; use `#[derive(NodeParams)]`. The struct's
/// `Default` implementation supplies the kind's default parameters.
pub trait NodeParams: Default {
    /// Every declared parameter, in declaration order.
    const FIELDS: &'static [ParamField];

    /// Read a parameter by key.
    fn get(&self, key: &str) -> Option<ParamValue>;

    /// Overwrite a parameter by key.
    ///
    /// Fails for unknown keys and for values of the wrong type; the struct
    /// is left unchanged on failure.
    fn set(&mut self, key: &str, value: &ParamValue) -> Result<(), ParamError>;

    /// Snapshot every declared parameter.
    fn to_map(&self) -> ParamMap {
        Self::FIELDS
            .iter()
            .filter_map(|field| self.get(field.key).map(|v| (field.key.to_string(), v)))
            .collect()
    }

    /// Overlay recognized keys from `map`, returning the keys that were
    /// rejected (unknown or mistyped).
    fn overlay(&mut self, map: &ParamMap) -> Vec<String> {
        map.iter()
            .filter_map(|(key, value)| self.set(key, value).err().map(|_| key.clone()))
            .collect()
    }
}

/// Enum-string parameter.
///
/// Do not implement by hand; use `#[derive(ParamEnum)]`.
pub trait ParamEnum: Sized + Copy {
    /// Accepted strings, in declaration order.
    const VARIANTS: &'static [&'static str];

    fn as_str(&self) -> &'static str;

    fn parse(text: &str) -> Option<Self>;
}
