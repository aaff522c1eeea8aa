use super::Context;
use colored::Colorize;
use lacework_api::Category;

pub fn handle(ctx: &Context) {
    let registry = ctx.registry();

    for (category, title) in [
        (Category::AlertChannel, "Alert channels"),
        (Category::CloudAccount, "Cloud accounts"),
        (Category::ContainerRegistry, "Container registries"),
    ] {
        println!("{}", title.bold());
        for resource in registry.iter().filter(|r| r.category() == category) {
            println!(
                "  {} {}",
                format!("{:<42}", resource.resource_type()).cyan(),
                resource.integration_type()
            );
        }
    }
}
