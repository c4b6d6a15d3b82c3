//! Lotus wire types. Lotus encodes structs in PascalCase and CIDs as `{"/": "..."}`.

use serde::{Deserialize, Serialize};

use attest_types::Timestamp;

/// A content identifier in its IPLD JSON link form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cid {
    #[serde(rename = "/")]
    pub root: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChainHead {
    pub cids: Vec<Cid>,
    pub height: u64,
}

/// Summary of the storage network as seen by the configured node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StorageNetworkStatus {
    pub network_name: String,
    pub height: u64,
    pub head: Vec<Cid>,
    pub observed_at: Timestamp,
}

/// One entry of `Filecoin.ClientListDeals`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StorageDeal {
    pub proposal_cid: Cid,
    #[serde(default)]
    pub state: u64,
    #[serde(default)]
    pub message: String,
    pub provider: String,
    #[serde(default)]
    pub client: String,
    #[serde(default, rename = "DealID")]
    pub deal_id: u64,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub price_per_epoch: String,
    #[serde(default)]
    pub duration: u64,
}
