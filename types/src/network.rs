//! Network identifier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::TypesError;

/// Identifies which deployment of an external service a client talks to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkId {
    /// The production network.
    Mainnet,
    /// The public test network.
    #[default]
    Testnet,
}

impl NetworkId {
    /// Human-readable name, also used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
        }
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mainnet" | "main" | "live" => Ok(Self::Mainnet),
            "testnet" | "test" => Ok(Self::Testnet),
            other => Err(TypesError::UnknownNetwork(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_aliases() {
        assert_eq!("mainnet".parse::<NetworkId>().unwrap(), NetworkId::Mainnet);
        assert_eq!("TESTNET".parse::<NetworkId>().unwrap(), NetworkId::Testnet);
        assert!("devnet".parse::<NetworkId>().is_err());
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&NetworkId::Mainnet).unwrap();
        assert_eq!(json, "\"mainnet\"");
    }
}
