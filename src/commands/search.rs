use anyhow::Result;
use colored::Colorize;

use crate::Context;
use crate::ui;

pub fn search(ctx: &Context, query: &str) -> Result<()> {
    let engine = ctx.engine()?;
    let hits = engine.saidata().search_software(query);

    if hits.is_empty() {
        ui::info(&format!("No software matches '{query}'"));
        return Ok(());
    }

    if !ctx.quiet {
        ui::header(&format!("{} matches for '{query}'", hits.len()));
    }
    for hit in hits {
        let title = hit.display_name.as_deref().unwrap_or(&hit.name);
        let category = hit
            .category
            .as_deref()
            .map(|c| format!("[{c}]"))
            .unwrap_or_default();
        println!("  {} {} {}", hit.name.bold(), title, category.dimmed());
        if let Some(description) = &hit.description {
            ui::dim(description);
        }
    }
    Ok(())
}

pub fn list(ctx: &Context) -> Result<()> {
    let engine = ctx.engine()?;
    let names = engine.saidata().get_software_list();

    if names.is_empty() {
        ui::info(&format!(
            "No saidata found in {}",
            engine.saidata().root().display()
        ));
        return Ok(());
    }

    if !ctx.quiet {
        ui::header(&format!("{} software definitions", names.len()));
    }
    for name in names {
        println!("  {name}");
    }
    Ok(())
}
