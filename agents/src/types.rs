use serde::{Deserialize, Serialize};

use attest_types::Timestamp;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Active,
    Inactive,
    Error,
}

/// Addresses controlled by an agent on each supported chain.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentWallets {
    #[serde(default)]
    pub near: String,
    #[serde(default)]
    pub ethereum: String,
    #[serde(default)]
    pub bitcoin: String,
}

/// An agent as recorded by the registry contract.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeployedAgent {
    pub id: String,
    pub contract_address: String,
    #[serde(default)]
    pub wallets: AgentWallets,
    pub status: AgentStatus,
    /// Balance in yoctoNEAR, kept as a decimal string.
    pub balance: String,
    /// Contract reports epoch milliseconds.
    #[serde(with = "millis")]
    pub last_activity: Timestamp,
}

mod millis {
    use attest_types::Timestamp;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &Timestamp, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(ts.as_millis())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Timestamp, D::Error> {
        u64::deserialize(d).map(Timestamp::from_millis)
    }
}
