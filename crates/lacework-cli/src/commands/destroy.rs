use super::Context;
use crate::manifest::Manifest;
use crate::output;
use colored::Colorize;
use lacework_provider::{Applier, Plan, plan_destroy};
use std::collections::BTreeSet;
use std::path::Path;

/// Delete tracked integrations; with a manifest, only the ones it declares.
pub async fn handle(ctx: &Context, manifest_path: Option<&Path>) -> anyhow::Result<()> {
    let registry = ctx.registry();
    let manager = ctx.state_manager();
    let lock = manager.acquire_lock().await?;
    let mut state = manager.load().await?;

    let mut plan = plan_destroy(&state);
    if let Some(path) = manifest_path {
        let manifest = Manifest::load(path)?;
        let keys: BTreeSet<String> = manifest.resources.iter().map(|r| r.key()).collect();
        plan = Plan::new(
            plan.actions
                .into_iter()
                .filter(|a| keys.contains(&a.id))
                .collect(),
        );
    }

    if !plan.has_changes {
        println!("{}", "Nothing to destroy.".green());
        lock.release().await?;
        return Ok(());
    }
    output::print_plan(&plan);

    let client = ctx.connect().await?;
    println!();
    println!("{}", "Destroying...".red());
    let result = Applier::new(&registry, &client).apply(&plan, &mut state).await;
    manager.save(&state).await?;
    lock.release().await?;

    output::print_result(&result);
    if !result.is_success() {
        anyhow::bail!("{} action(s) failed", result.failed.len());
    }
    println!("{}", "Destroy complete.".green().bold());
    Ok(())
}
