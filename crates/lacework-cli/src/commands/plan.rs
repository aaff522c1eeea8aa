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

    let mut state = ctx.state_manager().load().await?;

    if refresh && !state.resources.is_empty() {
        let client = ctx.connect().await?;
        let removed = Applier::new(&registry, &client).refresh(&mut state).await?;
        for key in removed {
            println!("  {} {} no longer exists in Lacework", "!".yellow(), key);
        }
    }

    output::print_plan(&plan_apply(&manifest.resources, &state));
    Ok(())
}
