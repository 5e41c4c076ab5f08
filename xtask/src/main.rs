use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for vantage")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run fmt, clippy, tests and docs
    Check,
    /// Check formatting
    Fmt,
    /// Lint every crate with warnings denied
    Clippy,
    /// Run all tests; pass a package name to narrow it down
    Test {
        #[arg(short, long)]
        package: Option<String>,
    },
    /// Build rustdoc for the workspace
    Doc,
    /// Start a headless simulator for a few seconds as a smoke test
    Smoke,
}

/// Run `cargo` with `args`, failing with `what` if it exits non-zero.
fn cargo(what: &str, args: &[&str]) -> Result<()> {
    println!("==> cargo {}", args.join(" "));
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        anyhow::bail!("{what} failed");
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            cargo("fmt check", &["fmt", "--all", "--", "--check"])?;
            cargo(
                "clippy",
                &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
            )?;
            cargo("tests", &["test", "--workspace"])?;
            cargo("doc", &["doc", "--workspace", "--no-deps"])?;
        }
        Commands::Fmt => cargo("fmt check", &["fmt", "--all", "--", "--check"])?,
        Commands::Clippy => cargo(
            "clippy",
            &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
        )?,
        Commands::Test { package: None } => cargo("tests", &["test", "--workspace"])?,
        Commands::Test {
            package: Some(package),
        } => cargo("tests", &["test", "-p", &package])?,
        Commands::Doc => cargo("doc", &["doc", "--workspace", "--no-deps"])?,
        // Binds an ephemeral port so it never collides with a running viewer.
        Commands::Smoke => {
            let status = Command::new("cargo")
                .args(["run", "-p", "vantage-cli", "--", "headless", "--ticks", "120"])
                .env("VANTAGE_BIND_ADDRESS", "127.0.0.1:0")
                .status()?;
            if !status.success() {
                anyhow::bail!("headless smoke run failed");
            }
        }
    }

    Ok(())
}
