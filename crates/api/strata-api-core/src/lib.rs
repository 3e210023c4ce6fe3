//! strata-api-core: shared Value / property-key / error types (engine-agnostic)

pub mod error;
pub mod property;
pub mod value;

pub use error::CoreError;
pub use property::{LayoutField, PropertyKey, TargetRef};
pub use value::{Value, ValueKind};

/// Host-assigned entity identifier (small string key, e.g. "card-1").
pub type EntityId = String;

/// Map alias used across the engine for property tables.
pub type PropertyMap = hashbrown::HashMap<PropertyKey, Value>;
