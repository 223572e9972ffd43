use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("invalid service descriptor {descriptor:?}: {source}")]
    InvalidDescriptor {
        descriptor: String,
        #[source]
        source: DescriptorError,
    },

    #[error("network service is not supported: {0}")]
    ServiceNotSupported(String),

    #[error("Service not found: {0}")]
    ServiceNotFound(String),

    #[error("Endpoint not found: {0}")]
    EndpointNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Reason a single service descriptor failed to decode
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("invalid format: expected '{0}'")]
    Expected(char),

    #[error("invalid format: unexpected text after closing brace: {0:?}")]
    TrailingText(String),

    #[error("invalid format: unknown field {0:?}")]
    UnknownField(String),

    #[error("invalid MAC address {value:?}: {reason}")]
    InvalidMacAddress { value: String, reason: String },

    #[error("invalid VLAN tag {value:?}: {reason}")]
    InvalidVlanTag { value: String, reason: String },

    #[error("invalid key-value pair: {0}")]
    InvalidKeyValue(String),

    #[error("name is empty")]
    EmptyName,

    #[error("domain is empty")]
    EmptyDomain,

    #[error("MAC address is empty")]
    EmptyMacAddress,
}
