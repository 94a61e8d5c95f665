//! Write a default ringroute.toml.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

use crate::config::{Config, CONFIG_FILE};

pub fn run(path: Option<String>) -> Result<()> {
    let base_path = match path {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir().context("Failed to read current directory")?,
    };

    println!("{} Initializing ringroute config...", "→".blue());

    std::fs::create_dir_all(&base_path)
        .with_context(|| format!("Failed to create {}", base_path.display()))?;

    let config_path = base_path.join(CONFIG_FILE);
    if config_path.exists() {
        println!("  {} {} already exists", "•".yellow(), config_path.display());
        return Ok(());
    }

    Config::default().save(&config_path)?;
    println!("  {} Created {}", "✓".green(), config_path.display());

    println!();
    println!("Next steps:");
    println!("  {} ringroute demo", "1.".blue());
    println!("  {} ringroute lookup user:42 --nodes a,b,c", "2.".blue());
    println!("  {} ringroute inspect", "3.".blue());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_loadable_config() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("project");

        run(Some(target.display().to_string())).unwrap();

        let config = Config::load(Some(&target.join(CONFIG_FILE))).unwrap();
        assert_eq!(config.ring.replicas, 3);
        assert_eq!(config.cluster.nodes, vec!["node1", "node2"]);
    }

    #[test]
    fn test_init_keeps_existing_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[ring]\nreplicas = 9\n").unwrap();

        run(Some(dir.path().display().to_string())).unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.ring.replicas, 9);
    }
}
