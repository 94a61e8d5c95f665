//! CLI command implementations.

pub mod demo;
pub mod init;
pub mod inspect;
pub mod lookup;

use anyhow::{Context, Result};
use ringroute::{HashRing, RingConfig};

/// Build a ring from `config` seeded with `nodes`.
pub(crate) fn build_ring(config: &RingConfig, nodes: &[String]) -> Result<HashRing> {
    HashRing::builder()
        .config(*config)
        .nodes(nodes.iter().cloned())
        .build()
        .context("Failed to build hash ring")
}

/// Split a comma-separated node list, dropping blanks.
pub(crate) fn parse_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list("node1, node2,,node3 "), vec!["node1", "node2", "node3"]);
        assert!(parse_list(" , ").is_empty());
    }

    #[test]
    fn test_build_ring() {
        let ring = build_ring(&RingConfig::default(), &parse_list("a,b")).unwrap();
        assert_eq!(ring.node_count(), 2);
        assert!(build_ring(&RingConfig::new(0, 10), &[]).is_err());
    }
}
