pub mod keys;
pub mod ideate;
pub mod research;

use colored::*;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use visual_ideation::LoadingState;

/// Line-oriented stdin reader shared by the interactive commands.
pub struct Console {
    lines: Lines<BufReader<Stdin>>,
}

impl Console {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// `None` on end of input.
    pub async fn prompt(&mut self, label: &str) -> std::io::Result<Option<String>> {
        print!("{}", label.bold());
        std::io::stdout().flush()?;
        Ok(self
            .lines
            .next_line()
            .await?
            .map(|line| line.trim().to_string()))
    }
}

/// Splits `"edit make it blue"` into `("edit", "make it blue")`.
pub fn split_command(line: &str) -> (String, &str) {
    let line = line.trim();
    match line.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd.to_ascii_lowercase(), rest.trim()),
        None => (line.to_ascii_lowercase(), ""),
    }
}

pub fn print_error(message: &str) {
    println!("{} {}", "✗".red().bold(), message.red());
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

pub fn print_progress(loading: &LoadingState) {
    if loading.active {
        println!("  {} {}", "…".cyan(), loading.message.bright_black());
    }
}
