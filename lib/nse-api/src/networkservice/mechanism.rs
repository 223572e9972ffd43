use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mechanism class for mechanisms local to the node
pub const CLS_LOCAL: &str = "LOCAL";
/// Mechanism type that carries no data-plane configuration
pub const NOOP: &str = "NOOP";

/// Mechanism used to realize a connection
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mechanism {
    /// Mechanism class: LOCAL or REMOTE
    #[serde(default = "default_cls")]
    pub cls: String,

    /// Mechanism type, e.g. NOOP
    #[serde(rename = "type")]
    pub mechanism_type: String,

    /// Mechanism-specific parameters
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

impl Mechanism {
    /// Create a local mechanism of the given type
    pub fn new(mechanism_type: impl Into<String>) -> Self {
        Self {
            cls: default_cls(),
            mechanism_type: mechanism_type.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Local NOOP mechanism
    pub fn noop() -> Self {
        Self::new(NOOP)
    }
}

fn default_cls() -> String {
    CLS_LOCAL.to_string()
}
