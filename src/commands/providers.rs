use anyhow::Result;
use colored::Colorize;

use crate::Context;
use crate::ui;

pub fn run(ctx: &Context) -> Result<()> {
    let engine = ctx.engine()?;
    let catalog = engine.catalog();
    let os = engine.platform().os();

    if catalog.is_empty() {
        ui::info(&format!("No providers available on {os}"));
        return Ok(());
    }

    if !ctx.quiet {
        ui::header(&format!("Providers on {os}"));
    }

    let validator = engine.saidata().validator();
    for doc in catalog.providers() {
        let info = &doc.provider;
        let present = info
            .executable
            .as_deref()
            .is_none_or(|exe| validator.validate_command(exe));
        let health = engine.degradation().provider_health(doc.name());

        println!(
            "  {} {} {} {}",
            ui::mark(present),
            doc.name().bold(),
            format!("priority {}", info.priority).dimmed(),
            ui::health(health.health_score)
        );
        if let Some(description) = &info.description {
            ui::dim(description);
        }
        let actions: Vec<&str> = doc.actions.keys().map(String::as_str).collect();
        ui::kv("actions", &actions.join(", "));
        if !info.platforms.is_empty() {
            ui::kv("platforms", &info.platforms.join(", "));
        }
    }
    Ok(())
}
