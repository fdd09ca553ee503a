//! The well-known address (bus name plus object path) shared by both ends.

use std::fmt;

use thiserror::Error;
use zbus::names::WellKnownName;
use zbus::zvariant::ObjectPath;

use crate::defaults::{DEFAULT_BUS_NAME, DEFAULT_OBJECT_PATH};

/// Validated service address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceAddress {
    bus_name: String,
    object_path: String,
}

impl ServiceAddress {
    /// Validates and builds an address.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError`] when either component is not valid D-Bus
    /// syntax.
    pub fn new(
        bus_name: impl Into<String>,
        object_path: impl Into<String>,
    ) -> Result<Self, AddressError> {
        let bus_name = bus_name.into();
        let object_path = object_path.into();
        WellKnownName::try_from(bus_name.as_str()).map_err(|source| {
            AddressError::InvalidBusName {
                name: bus_name.clone(),
                message: source.to_string(),
            }
        })?;
        ObjectPath::try_from(object_path.as_str()).map_err(|source| {
            AddressError::InvalidObjectPath {
                path: object_path.clone(),
                message: source.to_string(),
            }
        })?;
        Ok(Self {
            bus_name,
            object_path,
        })
    }

    /// Well-known bus name.
    #[must_use]
    pub fn bus_name(&self) -> &str {
        &self.bus_name
    }

    /// Object path serving the launch interface.
    #[must_use]
    pub fn object_path(&self) -> &str {
        &self.object_path
    }
}

impl Default for ServiceAddress {
    fn default() -> Self {
        Self {
            bus_name: DEFAULT_BUS_NAME.to_owned(),
            object_path: DEFAULT_OBJECT_PATH.to_owned(),
        }
    }
}

impl fmt::Display for ServiceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.bus_name, self.object_path)
    }
}

/// Errors raised while validating a [`ServiceAddress`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// The bus name is not a valid well-known name.
    #[error("invalid bus name '{name}': {message}")]
    InvalidBusName { name: String, message: String },
    /// The object path is not a valid D-Bus object path.
    #[error("invalid object path '{path}': {message}")]
    InvalidObjectPath { path: String, message: String },
}
