//! Statistics reporting.

use console::style;

use crate::pipeline::RunReport;

/// Print the outcome of a run.
pub fn print_run_report(report: &RunReport) {
    let stats = &report.stats;

    println!();
    println!("{}", style("═".repeat(50)).dim());
    println!(
        "{}",
        style(format!("Run summary for {}:", report.root.display())).bold()
    );
    println!("  State:      {}", report.state);
    println!(
        "  Collected:  {} files ({} bytes)",
        stats.files_collected, stats.bytes_collected
    );
    println!("  Hashed:     {}", stats.files_hashed);
    println!("  Converted:  {} sidecars", stats.sidecars_transcoded);
    if stats.total_failures() > 0 {
        println!(
            "  Failures:   {} (see log)",
            style(stats.total_failures()).red()
        );
    }
    if let Some(ledger) = &report.ledger_path {
        println!("  Ledger:     {}", ledger.display());
    }
    println!("  Log:        {}", report.log_path.display());
    println!("{}", style("═".repeat(50)).dim());
}
