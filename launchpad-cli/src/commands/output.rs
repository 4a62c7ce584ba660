//! Result rendering

use anyhow::Result;
use colored::*;
use launchpad_core::dto::build_run::BuildRunResult;

/// Print a successful run
pub fn print_result(result: &BuildRunResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    println!("{} {}", "✓".green(), result.message.bold());
    println!("  Run:      {}", result.run_id.to_string().dimmed());
    println!("  Image:    {}", result.image_tag.cyan());
    println!("  Job:      {}", result.job_name.cyan());
    println!("  Pod:      {}", result.pod_name.cyan());
    println!(
        "  Duration: {}",
        format!(
            "{:.1}s",
            (result.completed_at - result.started_at).num_milliseconds() as f64 / 1000.0
        )
        .dimmed()
    );
    println!("\n{}", "Output:".bold());
    println!("{}", "─".repeat(80).dimmed());
    print!("{}", result.logs);
    if !result.logs.is_empty() && !result.logs.ends_with('\n') {
        println!();
    }
    println!("{}", "─".repeat(80).dimmed());

    Ok(())
}

/// Print a failed run
pub fn print_failure(origin: &str, message: &str) {
    eprintln!("{} {}", "✗".red(), format!("Failed ({})", origin).bold());
    eprintln!("{}", message.red());
}
