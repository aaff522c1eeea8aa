use super::Context;
use crate::manifest::Manifest;
use crate::output;
use colored::Colorize;
use lacework_provider::{Applier, plan_apply};
use std::path::Path;

pub async fn handle(ctx: &Context, manifest_path: &Path, refresh: bool) -> anyhow::Result<()> {
    let registry = ctx.registry();
    let manifest = Manifest::load(manifest_path)?;
    manifest.validate(&registry)?;

    let manager = ctx.state_manager();
    let lock = manager.acquire_lock().await?;
    let mut state = manager.load().await?;

    let client = ctx.connect().await?;
    let applier = Applier::new(&registry, &client);

    if refresh {
        let removed = applier.refresh(&mut state).await?;
        for key in removed {
            println!("  {} {} no longer exists in Lacework", "!".yellow(), key);
        }
    }

    let plan = plan_apply(&manifest.resources, &state);
    output::print_plan(&plan);
    if !plan.has_changes {
        manager.save(&state).await?;
        lock.release().await?;
        return Ok(());
    }

    println!();
    println!("{}", "Applying...".blue());
    let result = applier.apply(&plan, &mut state).await;
    manager.save(&state).await?;
    lock.release().await?;

    output::print_result(&result);
    if !result.is_success() {
        anyhow::bail!("{} action(s) failed", result.failed.len());
    }
    println!("{}", "Apply complete.".green().bold());
    Ok(())
}
