use super::Context;
use crate::output;
use colored::Colorize;

pub async fn handle(ctx: &Context) -> anyhow::Result<()> {
    let manager = ctx.state_manager();
    let state = manager.load().await?;

    if state.resources.is_empty() {
        println!("{}", "No resources in state.".dimmed());
        return Ok(());
    }

    println!(
        "{} {}",
        "State:".bold(),
        manager.state_path().display().to_string().dimmed()
    );
    for (key, resource) in &state.resources {
        output::print_resource(key, resource);
    }
    Ok(())
}
