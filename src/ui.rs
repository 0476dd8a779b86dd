use console::style;

pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Prints the version transition a commit produced.
pub fn display_version_change(prev: &str, next: &str) {
    println!(
        "{} {} {}",
        style(prev).red(),
        style("->").dim(),
        style(next).green()
    );
}
