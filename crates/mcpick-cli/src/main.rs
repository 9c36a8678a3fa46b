//! mcpick - MCP server configuration manager for Claude Code
//!
//! Usage:
//!   mcpick                        # Interactive menu
//!   mcpick --profile <name>       # Apply a saved profile
//!   mcpick --save-profile <name>  # Save the enabled servers as a profile
//!   mcpick --list-profiles        # List saved profiles

mod interactive;
mod prompt;

use anyhow::Result;
use clap::Parser;
use console::style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mcpick_core::client::ClaudeCli;
use mcpick_core::commands::ProfileCommand;
use mcpick_core::context::AppContext;

use crate::interactive::InteractiveApp;
use crate::prompt::TerminalPrompter;

#[derive(Parser)]
#[command(name = "mcpick")]
#[command(version, about = "MCP server configuration manager for Claude Code", long_about = None)]
struct Cli {
    /// Apply a saved profile and exit
    #[arg(long, short = 'p', value_name = "NAME", conflicts_with_all = ["save_profile", "list_profiles"])]
    profile: Option<String>,

    /// Save the currently enabled servers as a profile and exit
    #[arg(long, short = 's', value_name = "NAME", conflicts_with = "list_profiles")]
    save_profile: Option<String>,

    /// List saved profiles and exit
    #[arg(long, short = 'l')]
    list_profiles: bool,
}

fn main() -> Result<()> {
    // Logs go to stderr so they never mix with command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mcpick=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let ctx = AppContext::from_env()?;
    tracing::debug!(
        host_config = %ctx.paths().host_config().display(),
        data_dir = %ctx.paths().mcpick_dir().display(),
        "Resolved paths"
    );

    if let Some(name) = cli.profile {
        run_apply_profile(&ctx, &name)
    } else if let Some(name) = cli.save_profile {
        run_save_profile(&ctx, &name)
    } else if cli.list_profiles {
        run_list_profiles(&ctx)
    } else {
        run_interactive(&ctx)
    }
}

fn run_interactive(ctx: &AppContext) -> Result<()> {
    println!();
    println!("{}", style("  MCPick - MCP Server Configuration Manager").bold().cyan());
    println!();

    let host = ClaudeCli::new();
    InteractiveApp::new(ctx, &host, TerminalPrompter::new()).run()
}

fn run_apply_profile(ctx: &AppContext, name: &str) -> Result<()> {
    let report = ProfileCommand::new(ctx).apply(name)?;
    println!(
        "{} Loaded profile '{}' ({} servers)",
        style("✓").green(),
        report.name,
        report.servers.len()
    );
    for server in &report.servers {
        println!("  - {server}");
    }
    Ok(())
}

fn run_save_profile(ctx: &AppContext, name: &str) -> Result<()> {
    let info = ProfileCommand::new(ctx).save(name)?;
    println!(
        "{} Saved {} servers to profile '{}'",
        style("✓").green(),
        info.server_count,
        info.name
    );
    println!("  {}", style(info.path.display()).dim());
    Ok(())
}

fn run_list_profiles(ctx: &AppContext) -> Result<()> {
    let profiles = ProfileCommand::new(ctx).list()?;
    if profiles.is_empty() {
        println!(
            "No profiles found in {}",
            ctx.paths().profiles_dir().display()
        );
        return Ok(());
    }

    println!("{}", style("Profiles").bold());
    for profile in &profiles {
        println!(
            "  {:<24} {} servers",
            style(&profile.name).green(),
            profile.server_count
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from(["mcpick", "--profile", "work"]).unwrap();
        assert_eq!(cli.profile.as_deref(), Some("work"));
        assert!(!cli.list_profiles);

        let cli = Cli::try_parse_from(["mcpick", "--list-profiles"]).unwrap();
        assert!(cli.list_profiles);

        let cli = Cli::try_parse_from(["mcpick"]).unwrap();
        assert!(cli.profile.is_none() && cli.save_profile.is_none());
    }

    #[test]
    fn test_profile_flags_conflict() {
        assert!(Cli::try_parse_from(["mcpick", "--profile", "a", "--save-profile", "b"]).is_err());
        assert!(Cli::try_parse_from(["mcpick", "--save-profile", "b", "--list-profiles"]).is_err());
    }
}
