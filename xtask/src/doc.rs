use anyhow::Result;
use colored::Colorize;

use crate::cargo::{self, HOST_FEATURES, LIBRARY_CRATES};

pub fn run(open: bool) -> Result<()> {
    println!();
    println!("{}", "📚 Documenting platform and controls...".cyan().bold());

    // Host features so that `platform::mocks` is documented too.
    let mut args = vec!["doc", "--no-deps", "--features", HOST_FEATURES];
    for krate in LIBRARY_CRATES {
        args.extend(["-p", krate]);
    }
    if open {
        args.push("--open");
    }

    let outcome = cargo::run(&args)?;
    if !outcome.success {
        eprintln!("{}", "✗ rustdoc failed".red().bold());
        eprintln!("{}", outcome.stderr);
        anyhow::bail!("documentation build failed");
    }

    println!(
        "{}",
        format!("✓ Docs ready after {:.2}s", outcome.elapsed.as_secs_f64()).green()
    );
    if !open {
        for krate in LIBRARY_CRATES {
            println!("   {}", format!("target/doc/{krate}/index.html").dimmed());
        }
    }
    println!();
    Ok(())
}
