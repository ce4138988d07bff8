//! Keeper endpoints for optional replication.
//!
//! Keepers are external redundant-storage nodes an operator may configure;
//! the replication protocol itself lives outside this crate. The gateway
//! only carries the endpoint list and the interface a replicator must
//! implement.

use std::fmt;

use serde::{Deserialize, Serialize};
use stele_core::Hash;

use crate::error::Result;

/// Address of a keeper node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeeperEndpoint {
    /// Host name or IP.
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// Request path, empty by default.
    #[serde(default)]
    pub path: String,
}

impl KeeperEndpoint {
    /// Create an endpoint with an empty path.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            path: String::new(),
        }
    }

    /// Set the request path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }
}

impl fmt::Display for KeeperEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}/{}", self.host, self.port, self.path)
    }
}

/// Replicates anchored data to keeper nodes.
pub trait KeeperReplicator: Send + Sync {
    /// Replicate the anchored bytes under their content identifier.
    fn replicate(&self, content_id: &Hash, data: &[u8]) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_display() {
        let keeper = KeeperEndpoint::new("127.0.0.1", 8080).with_path("store");
        assert_eq!(keeper.to_string(), "127.0.0.1:8080/store");

        let bare = KeeperEndpoint::new("keeper.example.org", 9000);
        assert_eq!(bare.to_string(), "keeper.example.org:9000/");
    }

    #[test]
    fn test_endpoint_serde() {
        let keeper = KeeperEndpoint::new("10.0.0.1", 7000).with_path("data");
        let json = serde_json::to_string(&keeper).unwrap();
        let back: KeeperEndpoint = serde_json::from_str(&json).unwrap();
        assert_eq!(keeper, back);
    }
}
