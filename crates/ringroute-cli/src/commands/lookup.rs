//! Route keys to nodes.

use anyhow::{Context, Result};
use colored::Colorize;
use ringroute::{HashRing, Position};
use serde::Serialize;

use super::{build_ring, parse_list};
use crate::config::Config;

/// Routing decision for a single key.
#[derive(Debug, Serialize)]
pub struct Route<'a> {
    pub key: &'a str,
    pub position: Position,
    /// Position of the virtual node that owns the key.
    pub owner_position: Option<Position>,
    pub node: Option<&'a str>,
}

pub fn routes<'a>(ring: &'a HashRing, keys: &'a [String]) -> Vec<Route<'a>> {
    keys.iter()
        .map(|key| {
            let located = ring.locate(key);
            Route {
                key: key.as_str(),
                position: ring.hash(key),
                owner_position: located.map(|(pos, _)| pos),
                node: located.map(|(_, node)| node),
            }
        })
        .collect()
}

pub fn run(config: &Config, keys: &[String], nodes: Option<&str>, json: bool) -> Result<()> {
    let nodes = nodes.map(parse_list).unwrap_or_else(|| config.cluster.nodes.clone());
    let ring = build_ring(&config.ring, &nodes)?;
    let routes = routes(&ring, keys);

    if json {
        let out = serde_json::to_string_pretty(&routes).context("Failed to serialize routes")?;
        println!("{}", out);
        return Ok(());
    }

    if ring.is_empty() {
        println!("{} Ring has no nodes; no key has an owner.", "•".yellow());
        return Ok(());
    }

    println!(
        "{} Routing {} keys over {}:",
        "→".blue(),
        keys.len().to_string().cyan(),
        nodes.join(", ").cyan()
    );
    println!();

    for route in &routes {
        let owner = route.node.unwrap_or("-");
        println!(
            "  {} {} {} {}",
            route.key.white().bold(),
            format!("(hash: {})", route.position).dimmed(),
            "→".blue(),
            owner.green()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes_match_ring() {
        let ring = HashRing::with_nodes(["node1", "node2"]);
        let keys: Vec<String> = vec!["key1".to_string(), "key2".to_string()];

        for route in routes(&ring, &keys) {
            assert_eq!(route.node, ring.get_node(route.key));
            assert_eq!(route.position, ring.hash(route.key));
            assert!(route.owner_position.unwrap() < 1000);
        }
    }

    #[test]
    fn test_routes_on_empty_ring() {
        let ring = HashRing::new();
        let keys = vec!["key1".to_string()];
        let routes = routes(&ring, &keys);
        assert_eq!(routes.len(), 1);
        assert!(routes[0].node.is_none());
        assert!(routes[0].owner_position.is_none());
    }

    #[test]
    fn test_route_json_shape() {
        let ring = HashRing::with_nodes(["node1"]);
        let keys = vec!["key1".to_string()];
        let json = serde_json::to_value(routes(&ring, &keys)).unwrap();
        assert_eq!(json[0]["key"], "key1");
        assert_eq!(json[0]["node"], "node1");
    }
}
