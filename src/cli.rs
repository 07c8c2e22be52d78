//! Command-line subcommands

use anyhow::{Context, Result};
use passgate::{digest_hex, Gate, GateConfig, GateStatus};

/// Print the digest of `password` under the configured algorithm.
pub fn hash(config: &GateConfig, password: &str) -> Result<()> {
    let algorithm = config.algorithm()?;
    println!("{}", digest_hex(password, algorithm));
    Ok(())
}

pub fn status(config: &GateConfig) -> Result<()> {
    let gate = Gate::open(config)?;
    let verifier = &gate.verifier;

    println!("Password Gate");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Storage:     {}", config.storage.path.display());
    println!("Algorithm:   {}", verifier.algorithm());
    println!("TTL:         {} days", verifier.ttl().num_days());
    match verifier.status() {
        GateStatus::Unprotected => println!("State:       unprotected"),
        GateStatus::Verified { expires_at } => {
            println!("State:       verified (until {})", expires_at.format("%Y-%m-%d %H:%M UTC"))
        }
        GateStatus::Unverified(reason) => println!("State:       locked ({})", reason.describe()),
    }
    println!();

    let active = gate.active_sources();
    println!("Sources:     {} of {} active", active.len(), gate.sources.len());
    for source in active {
        println!("  {:<16} {}", source.id, source.name);
    }
    Ok(())
}

/// Prompt for the password and run the same check the desktop gate does.
pub fn unlock(config: &GateConfig) -> Result<()> {
    let gate = Gate::open(config)?;
    if !gate.verifier.is_protected() {
        println!("No password is configured; nothing to unlock.");
        return Ok(());
    }
    if gate.verifier.is_verified() {
        println!("Already verified.");
        return Ok(());
    }

    let password = rpassword::prompt_password("Password: ").context("failed to read password")?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;
    if runtime.block_on(gate.verifier.verify(&password))? {
        println!("✓ Password accepted");
        println!("{} sources active", gate.selection.selected().len());
        Ok(())
    } else {
        anyhow::bail!("incorrect password")
    }
}
