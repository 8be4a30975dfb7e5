use crate::constants::{POOL_ADDRESS_LEN, POOL_ADDRESS_PREFIX};
use serde_derive::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolAddressError {
    #[error("invalid address length {0}, expected {POOL_ADDRESS_LEN}")]
    InvalidLength(usize),

    #[error("invalid address prefix, expected '{POOL_ADDRESS_PREFIX}'")]
    InvalidPrefix,
}

/// Account that voters designate as their inflation destination
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PoolAddress(String);

impl PoolAddress {
    pub fn parse(value: &str) -> Result<Self, PoolAddressError> {
        if value.len() != POOL_ADDRESS_LEN {
            return Err(PoolAddressError::InvalidLength(value.len()));
        }
        if !value.starts_with(POOL_ADDRESS_PREFIX) {
            return Err(PoolAddressError::InvalidPrefix);
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PoolAddress {
    type Error = PoolAddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PoolAddress> for String {
    fn from(value: PoolAddress) -> Self {
        value.0
    }
}

impl std::fmt::Display for PoolAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
