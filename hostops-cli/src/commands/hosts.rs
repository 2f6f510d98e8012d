//! `hostops hosts list|add|remove|default`

use anyhow::{anyhow, Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use hostops_core::{
    registry::{self, NewProfile},
    types::ProfileName,
};

use super::TargetArgs;

/// Manage saved host profiles in `~/.hostops/hosts.yaml`.
#[derive(Subcommand, Debug)]
pub enum HostsCommand {
    /// List saved profiles.
    List,

    /// Save a profile from --host and the other target flags.
    Add(NameArgs),

    /// Delete a profile.
    Remove(NameArgs),

    /// Make a profile the default target.
    Default(NameArgs),
}

#[derive(Args, Debug)]
pub struct NameArgs {
    /// Profile name (e.g. "web1", "staging").
    pub name: String,
}

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "")]
    marker: String,
    #[tabled(rename = "profile")]
    name: String,
    #[tabled(rename = "destination")]
    destination: String,
    #[tabled(rename = "key")]
    key: String,
    #[tabled(rename = "insecure")]
    insecure: String,
    #[tabled(rename = "added")]
    added: String,
}

pub fn run(cmd: HostsCommand, target: &TargetArgs) -> Result<()> {
    match cmd {
        HostsCommand::List => list(),
        HostsCommand::Add(args) => add(args, target),
        HostsCommand::Remove(args) => remove(args),
        HostsCommand::Default(args) => set_default(args),
    }
}

fn list() -> Result<()> {
    let registry = registry::load().context("failed to load host profiles")?;
    if registry.profiles.is_empty() {
        println!("No host profiles saved.");
        println!("Run: hostops hosts add <name> --host <host>");
        return Ok(());
    }

    let rows: Vec<ProfileRow> = registry
        .profiles
        .iter()
        .map(|profile| {
            let is_default = registry.default.as_ref() == Some(&profile.name);
            ProfileRow {
                marker: if is_default {
                    "*".green().bold().to_string()
                } else {
                    String::new()
                },
                name: profile.name.to_string(),
                destination: profile.to_config().to_string(),
                key: profile
                    .key_file
                    .as_ref()
                    .map(|k| k.display().to_string())
                    .unwrap_or_else(|| "-".to_string()),
                insecure: if profile.insecure {
                    "yes".yellow().to_string()
                } else {
                    "no".to_string()
                },
                added: profile.added_at.format("%Y-%m-%d %H:%M").to_string(),
            }
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}

fn add(args: NameArgs, target: &TargetArgs) -> Result<()> {
    let host = target
        .host
        .clone()
        .ok_or_else(|| anyhow!("--host is required to add a profile"))?;
    let name = ProfileName::from(args.name);
    let profile = registry::add_profile(
        name.clone(),
        NewProfile {
            host,
            port: target.port,
            user: target.user.clone(),
            key_file: target.key_file.clone(),
            insecure: target.insecure,
        },
    )
    .with_context(|| format!("failed to add host profile '{name}'"))?;

    println!("{} Added '{}' ({})", "✓".green(), profile.name, profile.to_config());
    Ok(())
}

fn remove(args: NameArgs) -> Result<()> {
    let name = ProfileName::from(args.name);
    let removed = registry::remove_profile(&name)
        .with_context(|| format!("failed to remove host profile '{name}'"))?;
    println!("{} Removed '{}'", "✓".green(), removed.name);
    Ok(())
}

fn set_default(args: NameArgs) -> Result<()> {
    let name = ProfileName::from(args.name);
    registry::set_default(&name)
        .with_context(|| format!("failed to set default host profile '{name}'"))?;
    println!("{} Default profile is now '{name}'", "✓".green());
    Ok(())
}
