use colored::Colorize;
use lacework_provider::{ActionType, ApplyResult, Plan, ResourceState, ResourceStatus};

pub fn print_plan(plan: &Plan) {
    if !plan.has_changes {
        println!("{}", "No changes. Lacework matches the manifest.".green());
        return;
    }

    println!("{}", "Planned changes:".bold());
    for action in &plan.actions {
        let marker = match action.action_type {
            ActionType::Create => "+".green(),
            ActionType::Update => "~".yellow(),
            ActionType::Replace => "-/+".magenta(),
            ActionType::Delete => "-".red(),
            ActionType::NoOp => continue,
        };
        println!("  {} {}", marker, action.description);
    }
    println!();
    println!("Plan: {}", plan.summary());
}

pub fn print_result(result: &ApplyResult) {
    for ok in &result.succeeded {
        println!("  {} {}: {}", "✓".green(), ok.action_id.cyan(), ok.message);
    }
    for failed in &result.failed {
        eprintln!(
            "  {} {}: {}",
            "✗".red(),
            failed.action_id.cyan(),
            failed.error.as_deref().unwrap_or("unknown error")
        );
    }
    println!();
    println!(
        "{} succeeded, {} failed ({} ms)",
        result.succeeded.len(),
        result.failed.len(),
        result.duration_ms
    );
}

pub fn status(status: &ResourceStatus) -> colored::ColoredString {
    let text = status.to_string();
    match status {
        ResourceStatus::Active => text.green(),
        ResourceStatus::Disabled => text.dimmed(),
        ResourceStatus::Error | ResourceStatus::Tainted => text.red(),
        ResourceStatus::Deleted | ResourceStatus::Unknown => text.yellow(),
    }
}

pub fn print_resource(key: &str, state: &ResourceState) {
    println!(
        "  {} {} [{}]",
        key.cyan(),
        state.id,
        status(&state.status)
    );
    println!("      name: {}", state.name);
    println!("      enabled: {}", state.enabled);
    if !state.type_name.is_empty() {
        println!("      type: {}", state.type_name);
    }
    if !state.created_or_updated_time.is_empty() {
        println!(
            "      updated: {} by {}",
            state.created_or_updated_time, state.created_or_updated_by
        );
    }
}
