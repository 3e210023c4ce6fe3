//! PropertyKey parsing and formatting.
//!
//! Grammar (simple, engine-agnostic):
//! - Names starting with the parameter-uniform prefix `u_` address the
//!   globally shared parameter table ("u_dimension", "u_glitchIntensity").
//! - The closed layout field names (`visible`, `x`, `y`, `scale`, `opacity`)
//!   address an entity's tracked layout record.
//! - Anything else is an entity-local custom property ("glow", "label").
//!
//! PropertyKey is a tagged type in memory but serializes as the plain string
//! form, so configuration documents stay readable.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::EntityId;

/// Prefix marking a name as a shared parameter rather than an entity property.
pub const PARAM_PREFIX: &str = "u_";

/// The closed set of per-entity layout fields tracked by states.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutField {
    Visible,
    X,
    Y,
    Scale,
    Opacity,
}

impl LayoutField {
    pub fn name(self) -> &'static str {
        match self {
            LayoutField::Visible => "visible",
            LayoutField::X => "x",
            LayoutField::Y => "y",
            LayoutField::Scale => "scale",
            LayoutField::Opacity => "opacity",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "visible" => Some(LayoutField::Visible),
            "x" => Some(LayoutField::X),
            "y" => Some(LayoutField::Y),
            "scale" => Some(LayoutField::Scale),
            "opacity" => Some(LayoutField::Opacity),
            _ => None,
        }
    }
}

/// Addressable property: shared parameter, closed layout field, or
/// entity-local custom property.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PropertyKey {
    /// Globally shared parameter (uniform convention, `u_*`)
    Param(String),
    /// Tracked entity layout field
    Field(LayoutField),
    /// Free-form entity-local property
    Custom(String),
}

impl PropertyKey {
    /// Parse the string form. Never fails: unknown names become Custom.
    pub fn parse(s: &str) -> Self {
        if s.starts_with(PARAM_PREFIX) {
            PropertyKey::Param(s.to_string())
        } else if let Some(f) = LayoutField::parse(s) {
            PropertyKey::Field(f)
        } else {
            PropertyKey::Custom(s.to_string())
        }
    }

    /// True when writes route through the shared parameter table.
    #[inline]
    pub fn is_param(&self) -> bool {
        matches!(self, PropertyKey::Param(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            PropertyKey::Param(s) | PropertyKey::Custom(s) => s,
            PropertyKey::Field(f) => f.name(),
        }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyKey {
    type Err = core::convert::Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(PropertyKey::parse(s))
    }
}

impl Serialize for PropertyKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PropertyKey {
    fn deserialize<D>(deserializer: D) -> Result<PropertyKey, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if s.is_empty() {
            return Err(de::Error::custom("empty property key"));
        }
        Ok(PropertyKey::parse(&s))
    }
}

/// Resolved write destination: a concrete entity, or the shared parameter
/// table. Replaces the string sentinel `'global'`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TargetRef {
    Entity(EntityId),
    Global,
}

impl fmt::Display for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetRef::Entity(id) => f.write_str(id),
            TargetRef::Global => f.write_str("global"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_routes_by_prefix() {
        assert_eq!(
            PropertyKey::parse("u_dimension"),
            PropertyKey::Param("u_dimension".into())
        );
        assert_eq!(
            PropertyKey::parse("opacity"),
            PropertyKey::Field(LayoutField::Opacity)
        );
        assert_eq!(PropertyKey::parse("glow"), PropertyKey::Custom("glow".into()));
    }

    #[test]
    fn string_serde_roundtrip() {
        for s in ["u_glitchIntensity", "scale", "glow"] {
            let key = PropertyKey::parse(s);
            let json = serde_json::to_string(&key).unwrap();
            assert_eq!(json, format!("\"{s}\""));
            let back: PropertyKey = serde_json::from_str(&json).unwrap();
            assert_eq!(back, key);
        }
    }

    #[test]
    fn empty_key_rejected() {
        let err = serde_json::from_str::<PropertyKey>("\"\"");
        assert!(err.is_err());
    }
}
