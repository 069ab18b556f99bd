use colored::Colorize;

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a section header
pub fn section(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Print a shell command the user can run
pub fn command(cmd: &str, requires_root: bool) {
    let prompt = if requires_root { "#" } else { "$" };
    println!("  {} {}", prompt.dimmed(), cmd.bold());
}

/// Format a health score as a colored percentage
pub fn health(score: f64) -> String {
    let pct = format!("{:.0}%", score * 100.0);
    if score >= 0.75 {
        pct.green().to_string()
    } else if score >= 0.5 {
        pct.yellow().to_string()
    } else {
        pct.red().to_string()
    }
}

/// Check mark or cross for a boolean
pub fn mark(ok: bool) -> String {
    if ok {
        "✓".green().to_string()
    } else {
        "✗".red().to_string()
    }
}
