//! Show ring layout: virtual node positions and hash-space ownership.

use anyhow::{Context, Result};
use colored::Colorize;
use ringroute::{HashRing, Position};
use serde::Serialize;
use std::collections::BTreeMap;

use super::{build_ring, parse_list};
use crate::config::Config;

/// Serializable view of a ring.
#[derive(Debug, Serialize)]
pub struct RingLayout {
    pub replicas: u32,
    pub modulus: u64,
    pub nodes: Vec<String>,
    pub positions: Vec<(Position, String)>,
    pub ownership: BTreeMap<String, u64>,
}

impl RingLayout {
    pub fn of(ring: &HashRing) -> Self {
        Self {
            replicas: ring.config().replicas,
            modulus: ring.config().modulus,
            nodes: ring.nodes().map(str::to_string).collect(),
            positions: ring
                .iter()
                .map(|(pos, node)| (pos, node.to_string()))
                .collect(),
            ownership: ring.ownership(),
        }
    }
}

pub fn run(config: &Config, nodes: Option<&str>, json: bool) -> Result<()> {
    let nodes = nodes
        .map(parse_list)
        .unwrap_or_else(|| config.cluster.nodes.clone());
    let ring = build_ring(&config.ring, &nodes)?;
    let layout = RingLayout::of(&ring);

    if json {
        let out = serde_json::to_string_pretty(&layout).context("Failed to serialize ring")?;
        println!("{}", out);
        return Ok(());
    }

    println!("{}", "Ring Layout".white().bold());
    println!("{}", "═".repeat(40).dimmed());
    println!();

    println!("{}", "Config".blue().bold());
    println!("  Replicas:          {}", layout.replicas.to_string().cyan());
    println!("  Hash space:        {}", layout.modulus.to_string().cyan());
    println!("  Nodes:             {}", layout.nodes.len().to_string().cyan());
    println!(
        "  Virtual nodes:     {}",
        layout.positions.len().to_string().cyan()
    );
    println!();

    println!("{}", "Positions".blue().bold());
    for (pos, node) in &layout.positions {
        println!("  {:>8}  {}", pos, node.green());
    }
    println!();

    println!("{}", "Ownership".blue().bold());
    for (node, share) in &layout.ownership {
        let pct = *share as f64 / layout.modulus as f64 * 100.0;
        println!("  {:<16} {:>6.2}%", node, pct);
    }

    // Nodes whose virtual nodes were all overwritten by later nodes.
    let unowned: Vec<&String> = layout
        .ownership
        .iter()
        .filter(|(_, share)| **share == 0)
        .map(|(node, _)| node)
        .collect();
    if !unowned.is_empty() {
        println!();
        for node in unowned {
            println!(
                "  {} {} owns no positions (all virtual nodes collided)",
                "!".yellow(),
                node
            );
        }
    }

    println!();
    println!("{}", "═".repeat(40).dimmed());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_of_ring() {
        let ring = HashRing::with_nodes(["node1", "node2"]);
        let layout = RingLayout::of(&ring);

        assert_eq!(layout.replicas, 3);
        assert_eq!(layout.nodes, vec!["node1", "node2"]);
        assert_eq!(layout.positions.len(), ring.vnode_count());
        assert!(layout.positions.windows(2).all(|w| w[0].0 < w[1].0));
        assert_eq!(layout.ownership.values().sum::<u64>(), 1000);
    }

    #[test]
    fn test_layout_of_empty_ring() {
        let layout = RingLayout::of(&HashRing::new());
        assert!(layout.nodes.is_empty());
        assert!(layout.positions.is_empty());
        assert!(layout.ownership.is_empty());
    }
}
