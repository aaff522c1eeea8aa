use super::Context;
use crate::output;
use colored::Colorize;
use lacework_provider::{Applier, state_key};

pub async fn handle(
    ctx: &Context,
    resource_type: &str,
    name: &str,
    guid: &str,
) -> anyhow::Result<()> {
    let registry = ctx.registry();
    registry.get(resource_type)?;

    let manager = ctx.state_manager();
    let lock = manager.acquire_lock().await?;
    let mut state = manager.load().await?;

    let client = ctx.connect().await?;
    Applier::new(&registry, &client)
        .import(resource_type, name, guid, &mut state)
        .await?;
    manager.save(&state).await?;
    lock.release().await?;

    let key = state_key(resource_type, name);
    println!("{} {}", "Imported".green().bold(), guid);
    if let Some(imported) = state.get_resource(&key) {
        output::print_resource(&key, imported);
    }
    println!();
    println!(
        "Add {} to the manifest; the next apply pushes its configuration.",
        key.cyan()
    );
    Ok(())
}
