use anyhow::{Context as _, Result, anyhow};
use colored::Colorize;
use saidata::{ResourceKind, SoftwareData, ValidationResult};

use crate::Context;
use crate::ui;

pub fn show(ctx: &Context, software: &str, json: bool) -> Result<()> {
    let engine = ctx.engine()?;
    let data = engine
        .saidata()
        .load_software(software)
        .with_context(|| format!("Failed to load saidata for {software}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&*data)?);
    } else {
        print_document(ctx, &data)?;
    }
    Ok(())
}

pub fn defaults(ctx: &Context, software: &str) -> Result<()> {
    let engine = ctx.engine()?;
    let data = engine
        .saidata()
        .generate_defaults(software)
        .with_context(|| format!("Failed to generate defaults for {software}"))?;
    print_document(ctx, &data)
}

pub fn validate(
    ctx: &Context,
    software: &str,
    action: &str,
    resources: &[String],
) -> Result<()> {
    let engine = ctx.engine()?;
    let requested = resources
        .iter()
        .map(|spec| parse_resource(spec))
        .collect::<Result<Vec<_>>>()?;

    let result = engine
        .saidata()
        .validate_resources(software, action)
        .with_context(|| format!("Failed to validate {software}"))?;

    if !ctx.quiet {
        ui::header(&format!("Resources for {action} {software}"));
    }
    if result.valid {
        ui::success("All declared resources are present");
    } else {
        print_validation(&result);
    }

    if result.can_proceed {
        ui::success(&format!("{action} can proceed"));
    } else {
        ui::error(&format!("{action} cannot proceed"));
    }

    if !requested.is_empty() {
        ui::section("Requested resources");
        let validator = engine.saidata().validator();
        for (kind, name) in requested {
            let present = saidata::validate_resource_exists(validator, kind, name);
            println!("  {} {kind} {name}", ui::mark(present));
        }
    }
    Ok(())
}

/// Split `kind:name` into a resource kind and name
fn parse_resource(spec: &str) -> Result<(ResourceKind, &str)> {
    let (kind, name) = spec
        .split_once(':')
        .ok_or_else(|| anyhow!("Expected KIND:NAME, got '{spec}'"))?;
    let kind = ResourceKind::from_name(kind).ok_or_else(|| {
        anyhow!("Unknown resource kind '{kind}' (file, directory, command, service, port)")
    })?;
    Ok((kind, name))
}

fn print_document(ctx: &Context, data: &SoftwareData) -> Result<()> {
    if data.is_generated && !ctx.quiet {
        ui::dim("generated from platform conventions");
    }
    print!("{}", data.to_yaml()?);
    Ok(())
}

/// Print the missing resources of a validation report
pub fn print_validation(result: &ValidationResult) {
    ui::section("Missing resources");
    let groups = [
        ("files", &result.missing_files),
        ("directories", &result.missing_directories),
        ("commands", &result.missing_commands),
        ("services", &result.missing_services),
    ];
    for (label, missing) in groups {
        if !missing.is_empty() {
            println!("  {} {}", format!("{label}:").dimmed(), missing.join(", "));
        }
    }
    if !result.closed_ports.is_empty() {
        let ports: Vec<String> = result.closed_ports.iter().map(u16::to_string).collect();
        println!("  {} {}", "closed ports:".dimmed(), ports.join(", "));
    }
    for warning in &result.warnings {
        ui::dim(warning);
    }
}
