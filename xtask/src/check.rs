use anyhow::Result;
use colored::Colorize;
use std::time::Instant;

use crate::cargo::{self, HOST_FEATURES, LIBRARY_CRATES};

const NO_STD_TARGET: &str = "thumbv7em-none-eabihf";

/// How a failing step affects the run.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Gate {
    Required,
    Advisory,
}

pub fn run(host_only: bool) -> Result<()> {
    println!();
    println!("{}", "🔍 Checking workspace...".cyan().bold());
    let total_start = Instant::now();

    step(
        "host build",
        &["check", "--workspace", "--all-targets", "--features", HOST_FEATURES],
        Gate::Required,
    )?;

    if host_only {
        println!("{}", "  ⚠ no_std build skipped (--host-only)".yellow());
    } else {
        for krate in LIBRARY_CRATES {
            step(
                &format!("{krate} for {NO_STD_TARGET}"),
                &["check", "-p", krate, "--target", NO_STD_TARGET, "--no-default-features"],
                Gate::Required,
            )?;
        }
    }

    step(
        "clippy",
        &["clippy", "--workspace", "--all-targets", "--features", HOST_FEATURES, "--", "-D", "warnings"],
        Gate::Advisory,
    )?;
    step("rustfmt", &["fmt", "--all", "--check"], Gate::Advisory)?;

    println!();
    println!(
        "{}",
        format!("✓ Checks done in {:.2}s", total_start.elapsed().as_secs_f64())
            .green()
            .bold()
    );
    Ok(())
}

/// Run one `cargo` step; a required step aborts the run when it fails.
fn step(label: &str, args: &[&str], gate: Gate) -> Result<()> {
    let outcome = cargo::run(args)?;
    if outcome.success {
        println!(
            "{}",
            format!("  ✓ {label} ({:.2}s)", outcome.elapsed.as_secs_f64()).green()
        );
        return Ok(());
    }

    if gate == Gate::Advisory {
        eprintln!("{}", format!("  ⚠ {label} reported problems").yellow().bold());
        eprintln!("{}", outcome.stderr);
        return Ok(());
    }
    eprintln!("{}", format!("  ✗ {label} failed").red().bold());
    eprintln!("{}", outcome.stderr);
    anyhow::bail!("{label} failed")
}
