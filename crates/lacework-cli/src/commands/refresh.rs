use super::Context;
use colored::Colorize;
use lacework_provider::Applier;

pub async fn handle(ctx: &Context) -> anyhow::Result<()> {
    let registry = ctx.registry();
    let manager = ctx.state_manager();
    let lock = manager.acquire_lock().await?;
    let mut state = manager.load().await?;

    if state.resources.is_empty() {
        println!("{}", "No resources in state.".dimmed());
        lock.release().await?;
        return Ok(());
    }

    let client = ctx.connect().await?;
    let removed = Applier::new(&registry, &client).refresh(&mut state).await?;
    manager.save(&state).await?;
    lock.release().await?;

    for key in &removed {
        println!("  {} {} no longer exists in Lacework", "!".yellow(), key);
    }
    println!(
        "{} {} resource(s) refreshed, {} removed",
        "✓".green(),
        state.resources.len(),
        removed.len()
    );
    Ok(())
}
