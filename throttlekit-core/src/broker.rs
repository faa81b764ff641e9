use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Numeric broker identifier. `0` is reserved and never refers to a live broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BrokerId(pub u32);

impl BrokerId {
    pub const RESERVED: BrokerId = BrokerId(0);

    pub fn is_reserved(&self) -> bool {
        *self == Self::RESERVED
    }
}

impl fmt::Display for BrokerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BrokerId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(BrokerId)
    }
}

impl From<u32> for BrokerId {
    fn from(id: u32) -> Self {
        BrokerId(id)
    }
}

/// Broker registration merged with externally collected metrics.
///
/// Registration fields come from `/brokers/ids/<id>`, `storage_free` from the
/// metrics collector. `metrics_incomplete` marks a registered broker without
/// metrics, `missing` marks metrics for a broker that is not registered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrokerMeta {
    /// `None` for a broker registered with secure listeners only.
    #[serde(default)]
    pub host: Option<String>,
    /// `-1` when `host` is unset.
    #[serde(default)]
    pub port: i32,
    #[serde(default)]
    pub rack: Option<String>,
    #[serde(default)]
    pub endpoints: Vec<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub version: i32,
    #[serde(default)]
    pub storage_free: f64,
    #[serde(default)]
    pub metrics_incomplete: bool,
    #[serde(default)]
    pub missing: bool,
}

/// Per-broker record written by the metrics collector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrokerMetrics {
    #[serde(rename = "StorageFree")]
    pub storage_free: f64,
}

pub type BrokerMetaMap = BTreeMap<BrokerId, BrokerMeta>;

/// A broker referenced by an operation, e.g. a planned placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Broker {
    pub id: BrokerId,
    /// The broker is referenced but no longer registered in the cluster.
    #[serde(default)]
    pub missing: bool,
}

impl Broker {
    pub fn new(id: BrokerId) -> Self {
        Broker { id, missing: false }
    }
}

/// Reference set of brokers relevant to the current operation.
pub type BrokerMap = BTreeMap<BrokerId, Broker>;
