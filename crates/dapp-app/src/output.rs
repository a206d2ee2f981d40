//! Colored terminal output.

use colored::Colorize;

pub struct Display;

impl Display {
	pub fn header(text: &str) {
		println!("\n{}", text.bold().cyan());
		println!("{}", "─".repeat(text.chars().count()).cyan());
	}

	pub fn success(message: &str) {
		println!("{} {}", "✓".green().bold(), message);
	}

	/// Written to stderr.
	pub fn error(message: &str) {
		eprintln!("{} {}", "✗".red().bold(), message.red());
	}

	pub fn warning(message: &str) {
		println!("{} {}", "⚠".yellow().bold(), message.yellow());
	}

	pub fn info(message: &str) {
		println!("{} {}", "ℹ".blue().bold(), message);
	}

	pub fn kv(key: &str, value: &str) {
		println!("  {} {}", format!("{key}:").bold(), value);
	}

	/// A rendered page; the first line is the layout title bar.
	pub fn page(rendered: &str) {
		let mut lines = rendered.lines();
		if let Some(title) = lines.next() {
			println!("\n{}", title.bold().green());
		}
		for line in lines {
			println!("{line}");
		}
	}
}
