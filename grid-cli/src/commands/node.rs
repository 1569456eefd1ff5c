//! Node command handlers
//!
//! Handles all node-related CLI commands.

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use grid_core::domain::node::{Node, NodeStatus};

use crate::config::Config;
use grid_client::HubClient;

/// Node subcommands
#[derive(Subcommand)]
pub enum NodeCommands {
    /// List registered nodes
    List {
        /// Only show nodes that are currently live
        #[arg(long)]
        online: bool,
    },
    /// Get node details
    Get {
        /// Node ID
        id: String,
    },
}

/// Handle node commands
pub async fn handle_node_command(command: NodeCommands, config: &Config) -> Result<()> {
    let client = HubClient::new(&config.hub_url);

    match command {
        NodeCommands::List { online } => list_nodes(&client, online).await,
        NodeCommands::Get { id } => get_node(&client, &id).await,
    }
}

/// List registered nodes
async fn list_nodes(client: &HubClient, online: bool) -> Result<()> {
    let nodes = client.list_nodes(online).await?;

    if nodes.is_empty() {
        println!("{}", "No nodes registered.".yellow());
    } else {
        println!("{}", format!("Found {} node(s):", nodes.len()).bold());
        println!();
        for node in nodes {
            print_node(&node);
        }
    }

    Ok(())
}

async fn get_node(client: &HubClient, id: &str) -> Result<()> {
    let node = client.get_node(id).await?;
    print_node(&node);
    Ok(())
}

/// Print a node summary
fn print_node(node: &Node) {
    println!("  {} Node {} ({})", "▸".cyan(), node.id.bold(), node.name);
    println!("    Status:     {}", colorize_status(node.status));
    println!(
        "    Last Seen:  {}",
        node.last_heartbeat
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .dimmed()
    );

    let mut specs: Vec<_> = node.specs.iter().collect();
    specs.sort_by(|a, b| a.0.cmp(b.0));
    for (key, value) in specs {
        let value = value
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| value.to_string());
        println!("    {:<11} {}", format!("{}:", key), value.dimmed());
    }
    println!();
}

/// Colorize node status for display
fn colorize_status(status: NodeStatus) -> ColoredString {
    let status_str = status.to_string();
    match status {
        NodeStatus::Idle => status_str.green(),
        NodeStatus::Working => status_str.yellow(),
        NodeStatus::Offline => status_str.red(),
    }
}
