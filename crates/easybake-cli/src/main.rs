//! Release tooling for the exchange frontend.
//!
//! Prints the navigation menu, the Multicall deployments and the Multicall
//! function selectors, and checks them before a release.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use easybake::config::{menu_config, multicall_address, multicall_networks};
use easybake::core::multicall_abi;
use easybake::models::{ChainId, MenuEntry};
use easybake::utils::validate_link;

#[derive(Parser)]
#[command(name = "easybake-cli", about = "Inspect and check the exchange frontend config")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the navigation menu
    Menu {
        /// Emit the JSON handed to the menu component
        #[arg(long)]
        json: bool,
    },
    /// Print Multicall deployments
    Contracts {
        /// Only this chain id
        #[arg(long)]
        chain: Option<u64>,
    },
    /// Print Multicall functions with their selectors
    Abi,
    /// Validate menu links, contract table and ABI
    Check,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    match Cli::parse().command {
        Command::Menu { json } => print_menu(json),
        Command::Contracts { chain } => print_contracts(chain),
        Command::Abi => print_abi(),
        Command::Check => check(),
    }
}

fn print_menu(json: bool) -> Result<()> {
    let menu = menu_config();
    if json {
        println!("{}", serde_json::to_string_pretty(&menu)?);
        return Ok(());
    }
    for entry in &menu {
        print_entry(entry, 0);
    }
    Ok(())
}

fn print_entry(entry: &MenuEntry, indent: usize) {
    let pad = "  ".repeat(indent);
    let icon = entry.icon.as_deref().unwrap_or("-");
    match &entry.href {
        Some(href) => println!("{pad}{} [{}] -> {}", entry.label, icon, href),
        None => println!("{pad}{} [{}]", entry.label, icon),
    }
    for item in &entry.items {
        print_entry(item, indent + 1);
    }
}

fn print_contracts(chain: Option<u64>) -> Result<()> {
    match chain {
        Some(id) => {
            let chain = ChainId::try_from(id)
                .map_err(|id| anyhow::anyhow!("no Multicall deployment on chain {id}"))?;
            println!("{}\t{}", chain, multicall_address(chain));
        }
        None => {
            for (chain, address) in multicall_networks() {
                println!("{}\t{}", chain, address);
            }
        }
    }
    Ok(())
}

fn print_abi() -> Result<()> {
    let abi = multicall_abi().context("bundled Multicall ABI is invalid")?;
    for function in abi.functions() {
        let access = if function.is_read_only() { "view" } else { "write" };
        println!("{}\t{}\t{}", function.selector(), access, function.signature());
    }
    Ok(())
}

fn check() -> Result<()> {
    let mut failures = 0usize;

    for entry in menu_config() {
        if entry.depth() > 2 {
            warn!(label = %entry.label, "menu entry nested deeper than two levels");
            failures += 1;
        }
        for (label, href) in entry.links() {
            if let Err(err) = validate_link(href) {
                warn!(label, href, %err, "invalid menu link");
                failures += 1;
            }
        }
    }

    for (chain, address) in multicall_networks() {
        if address.is_zero() {
            warn!(%chain, "Multicall address is unset");
            failures += 1;
        }
    }

    let abi = multicall_abi().context("bundled Multicall ABI is invalid")?;
    if let Err(err) = abi.function("aggregate") {
        warn!(%err, "Multicall ABI is missing aggregate");
        failures += 1;
    }

    if failures > 0 {
        bail!("{failures} check(s) failed");
    }
    info!("menu, contracts and ABI look good");
    Ok(())
}
