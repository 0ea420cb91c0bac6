//! Console status lines.

use console::style;
use std::fmt::Display;

const RULE_WIDTH: usize = 60;

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// Print a stage heading framed by rules.
pub fn step<D: Display>(message: D) {
    println!("\n{}", rule());
    println!("  {message}");
    println!("{}", rule());
}

pub fn ok<D: Display>(message: D) {
    println!("{}", ok_line(message));
}

pub fn warn<D: Display>(message: D) {
    println!("{}", warn_line(message));
}

pub fn fail<D: Display>(message: D) {
    println!("{} Error: {message}", style("✗").red());
}

pub fn ok_line<D: Display>(message: D) -> String {
    format!("{} {message}", style("✓").green())
}

pub fn warn_line<D: Display>(message: D) -> String {
    format!("{} Warning: {message}", style("⚠").yellow())
}
