use anyhow::{Result, bail};

use crate::Context;
use crate::cli::ActionArgs;
use crate::commands::saidata::print_validation;
use crate::engine::Resolution;
use crate::ui;

pub fn run(ctx: &Context, action: &str, args: &ActionArgs) -> Result<()> {
    let engine = ctx.engine()?;
    let resolution = engine.resolve(action, &args.software, args.provider.as_deref())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&resolution)?);
    } else {
        print_resolution(ctx, &resolution);
    }

    if !resolution.is_usable() {
        bail!("No provider can {action} {}", args.software);
    }
    Ok(())
}

fn print_resolution(ctx: &Context, resolution: &Resolution) {
    if !ctx.quiet {
        ui::header(&format!("{} {}", resolution.action, resolution.software));
        if let Some(provider) = &resolution.provider {
            ui::kv("provider", provider);
        }
        if !resolution.tried.is_empty() {
            ui::kv("unavailable", &resolution.tried.join(", "));
        }
        if resolution.generated {
            ui::dim("saidata generated from platform conventions");
        }
    }

    if let Some(outcome) = &resolution.degradation {
        for warning in &outcome.warnings {
            ui::warn(warning);
        }
    }

    let validation = &resolution.validation;
    if !validation.valid && (ctx.verbose > 0 || !validation.can_proceed) {
        print_validation(validation);
    }
    if !validation.can_proceed {
        ui::warn(&format!(
            "{} may fail: required resources are missing",
            resolution.action
        ));
    }

    match &resolution.command {
        Some(command) => {
            println!();
            ui::command(command, resolution.requires_root);
        }
        None => {
            if let Some(outcome) = resolution.degradation.as_ref().filter(|o| o.partial_success) {
                ui::info(&format!(
                    "No command available; supported features: {}",
                    outcome.available_features.join(", ")
                ));
            }
        }
    }
}
