use super::Context;
use colored::Colorize;
use lacework_api::IntegrationsApi;

/// List the integrations Lacework holds for one resource type.
pub async fn handle(ctx: &Context, resource_type: &str) -> anyhow::Result<()> {
    let registry = ctx.registry();
    let integration_type = registry.get(resource_type)?.integration_type();
    let state = ctx.state_manager().load().await?;

    let client = ctx.connect().await?;
    let response = client.list(integration_type).await?;

    if response.data.is_empty() {
        println!("No {} integrations.", integration_type);
        return Ok(());
    }

    println!("{}", format!("{} integrations:", integration_type).bold());
    for record in &response.data {
        let tracked = match state.find_by_id(&record.guid) {
            Some((key, _)) => key.cyan().to_string(),
            None => "untracked".dimmed().to_string(),
        };
        let enabled = if record.enabled {
            "enabled".green()
        } else {
            "disabled".dimmed()
        };
        println!(
            "  {} {} [{}] ({})",
            record.guid, record.name, enabled, tracked
        );
    }
    Ok(())
}
