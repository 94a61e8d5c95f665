//! Walk through a ring as one node joins and another leaves.
//!
//! Routes the same keys after each change and marks the keys whose owner
//! moved, which for a consistent hash ring should be only the keys next to
//! the joining or leaving node's virtual nodes.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use ringroute::{HashRing, Position, RingEvent};
use std::collections::BTreeMap;

use super::parse_list;
use crate::config::Config;

/// Key ownership captured after one step of the scenario.
#[derive(Debug, Clone)]
pub struct Stage {
    pub label: String,
    /// Ring position of each key, in key order.
    pub positions: Vec<Position>,
    pub owners: Vec<Option<String>>,
    /// Hash-space share per node.
    pub shares: BTreeMap<String, u64>,
}

impl Stage {
    fn capture(label: String, ring: &HashRing, keys: &[String]) -> Self {
        Self {
            label,
            positions: keys.iter().map(|key| ring.hash(key)).collect(),
            owners: keys
                .iter()
                .map(|key| ring.get_node(key).map(str::to_string))
                .collect(),
            shares: ring.ownership(),
        }
    }

    /// Number of keys whose owner differs from `previous`.
    pub fn moved_since(&self, previous: &Stage) -> usize {
        self.owners
            .iter()
            .zip(&previous.owners)
            .filter(|(now, before)| now != before)
            .count()
    }
}

/// Run the join/leave scenario, reporting each stage as it is reached.
pub fn scenario<F>(
    ring: &mut HashRing,
    keys: &[String],
    join: &str,
    leave: &str,
    mut on_stage: F,
) -> Result<Vec<Stage>>
where
    F: FnMut(&Stage, Option<&Stage>),
{
    let mut stages: Vec<Stage> = Vec::with_capacity(3);

    let initial = Stage::capture("Initial distribution".to_string(), ring, keys);
    on_stage(&initial, None);
    stages.push(initial);

    ring.add_node(join);
    let joined = Stage::capture(format!("After adding '{}'", join), ring, keys);
    on_stage(&joined, stages.last());
    stages.push(joined);

    ring.remove_node(leave)
        .with_context(|| format!("Cannot remove '{}'", leave))?;
    let left = Stage::capture(format!("After removing '{}'", leave), ring, keys);
    on_stage(&left, stages.last());
    stages.push(left);

    Ok(stages)
}

/// Command-line overrides for the demo. `None` falls back to the config.
#[derive(Debug, Default)]
pub struct DemoArgs<'a> {
    pub nodes: Option<&'a str>,
    pub keys: Option<&'a str>,
    pub join: Option<&'a str>,
    pub leave: Option<&'a str>,
    pub trace: bool,
}

/// Nodes, keys and the join/leave pair the scenario will use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoPlan {
    pub nodes: Vec<String>,
    pub keys: Vec<String>,
    pub join: String,
    pub leave: String,
}

impl DemoPlan {
    /// Merge `args` over `config` and check the leaving node will be on the
    /// ring when it is removed.
    ///
    /// With a custom node list and no explicit `--leave`, the configured
    /// leaving node is kept if it is in the list, otherwise the last listed
    /// node leaves.
    pub fn resolve(config: &Config, args: &DemoArgs<'_>) -> Result<Self> {
        let nodes = args
            .nodes
            .map(parse_list)
            .unwrap_or_else(|| config.cluster.nodes.clone());
        let keys = args
            .keys
            .map(parse_list)
            .unwrap_or_else(|| config.demo.keys.clone());
        let join = args
            .join
            .map(str::to_string)
            .unwrap_or_else(|| config.demo.join.clone());

        let leave = match (args.leave, args.nodes) {
            (Some(leave), _) => leave.to_string(),
            (None, Some(_)) if !nodes.contains(&config.demo.leave) => match nodes.last() {
                Some(last) => last.clone(),
                None => bail!("No nodes given; nothing can leave the ring"),
            },
            (None, _) => config.demo.leave.clone(),
        };

        if leave != join && !nodes.contains(&leave) {
            bail!(
                "Node '{}' cannot leave: it is not one of the ring nodes ({}) or the joining node '{}'",
                leave,
                nodes.join(", "),
                join
            );
        }

        Ok(Self {
            nodes,
            keys,
            join,
            leave,
        })
    }
}

pub fn run(config: &Config, args: &DemoArgs<'_>) -> Result<()> {
    let plan = DemoPlan::resolve(config, args)?;

    println!(
        "{} Initializing ring with nodes: {}",
        "→".blue(),
        plan.nodes.join(", ").cyan()
    );

    let mut builder = HashRing::builder().config(config.ring);
    if args.trace {
        builder = builder.observer(print_event);
    }
    let mut ring = builder
        .nodes(plan.nodes.iter().cloned())
        .build()
        .context("Failed to build hash ring")?;

    let modulus = config.ring.modulus;
    scenario(
        &mut ring,
        &plan.keys,
        &plan.join,
        &plan.leave,
        |stage, previous| print_stage(stage, previous, &plan.keys, modulus),
    )?;

    println!("{} Done", "✓".green().bold());
    Ok(())
}

fn print_stage(stage: &Stage, previous: Option<&Stage>, keys: &[String], modulus: u64) {
    println!();
    println!("{}", stage.label.blue().bold());

    for (i, key) in keys.iter().enumerate() {
        let owner = stage.owners[i].as_deref().unwrap_or("-");
        let mut line = format!(
            "  {} {} {} {}",
            key.white().bold(),
            format!("(hash: {})", stage.positions[i]).dimmed(),
            "→".blue(),
            owner.green()
        );
        if let Some(before) = previous.and_then(|p| p.owners[i].as_deref()) {
            if before != owner {
                line.push_str(&format!(" {}", format!("(was {})", before).yellow()));
            }
        }
        println!("{}", line);
    }

    if let Some(previous) = previous {
        println!(
            "  {} of {} keys moved",
            stage.moved_since(previous).to_string().cyan(),
            keys.len()
        );
    }

    for (node, share) in &stage.shares {
        let pct = *share as f64 / modulus as f64 * 100.0;
        println!("  {:<12} {}", node, format!("{:.1}% of hash space", pct).dimmed());
    }
}

fn print_event(event: &RingEvent) {
    match event {
        RingEvent::VirtualNodePlaced {
            node,
            replica,
            position,
            displaced,
        } => {
            let mut line = format!(
                "  {} virtual node {}:{} -> hash {}",
                "+".green(),
                node,
                replica,
                position
            );
            if let Some(prev) = displaced.as_deref().filter(|prev| *prev != node) {
                line.push_str(&format!(" {}", format!("(displaced {})", prev).yellow()));
            }
            println!("{}", line);
        }
        RingEvent::VirtualNodeRemoved {
            node,
            replica,
            position,
            evicted,
        } => {
            let mut line = format!(
                "  {} virtual node {}:{} -> hash {}",
                "-".red(),
                node,
                replica,
                position
            );
            match evicted.as_deref() {
                Some(owner) if owner != node => {
                    line.push_str(&format!(" {}", format!("(evicted {})", owner).yellow()));
                }
                None => line.push_str(&format!(" {}", "(already vacant)".dimmed())),
                _ => {}
            }
            println!("{}", line);
        }
        RingEvent::NodeAdded { node, .. } => {
            println!("  {} node '{}' joined", "✓".green(), node);
        }
        RingEvent::NodeRemoved { node } => {
            println!("  {} node '{}' left", "✓".green(), node);
        }
    }
}
