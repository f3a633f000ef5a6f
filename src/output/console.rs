//! Console output utilities.

use console::style;

use crate::config::HashAlgorithm;

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", style("INFO").cyan().bold(), message);
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", style("OK").green().bold(), message);
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    println!("{} {}", style("WARN").yellow().bold(), message);
}

/// Print an error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", style("ERROR").red().bold(), message);
}

/// Print the application banner.
pub fn print_banner() {
    let banner = r#"
╔═══════════════════════════════════════════════════════╗
║     insta-forensic                                    ║
║     Instagram profile archiving with hash ledgers     ║
╚═══════════════════════════════════════════════════════╝
"#;
    println!("{}", style(banner).cyan());
}

/// Print configuration summary.
pub fn print_config_summary(
    profile_dir: &str,
    algorithm: HashAlgorithm,
    extensions: &[String],
    workers: usize,
) {
    println!();
    println!("{}", style("Configuration:").bold());
    println!("  Profile:    {}", profile_dir);
    println!("  Algorithm:  {}", algorithm);
    println!("  Extensions: {}", extensions.join(", "));
    println!("  Workers:    {}", workers);
    println!();
}
