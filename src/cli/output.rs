//! Colored output helpers for CLI
//!
//! Provides consistent, colored terminal output for the deep-research CLI,
//! including the rendering of run transcripts.

use crate::swarm::{RunOutcome, RunState};
use crate::types::{Message, MessageKind};
use owo_colors::OwoColorize;

/// Longest tool result shown inline before eliding
const MAX_RESULT_CHARS: usize = 600;

/// Output style configuration
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output helper with colors enabled
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Create a new output helper with colors disabled
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    /// Print the banner
    pub fn banner(&self) {
        if self.colored {
            println!(
                "\n   {} {}\n",
                "deep-research".bright_cyan().bold(),
                format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
            );
        } else {
            println!("\n   deep-research v{}\n", env!("CARGO_PKG_VERSION"));
        }
    }

    /// Print a success message with a checkmark
    pub fn success(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "✓".green().bold(), message.green());
        } else {
            println!("  [OK] {}", message);
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "•".blue(), message);
        } else {
            println!("  [INFO] {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "⚠".yellow().bold(), message.yellow());
        } else {
            println!("  [WARN] {}", message);
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    /// Print a header for a section
    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    /// Print a key-value pair
    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            println!("    {}: {}", key, value);
        }
    }

    /// Print a list item
    pub fn list_item(&self, item: &str) {
        if self.colored {
            println!("    {} {}", "•".blue(), item);
        } else {
            println!("    - {}", item);
        }
    }

    /// Print a hint/tip message
    pub fn hint(&self, message: &str) {
        if self.colored {
            println!("\n  {}", message.dimmed().italic());
        } else {
            println!("\n  [TIP] {}", message);
        }
    }

    /// Print a table header row
    pub fn table_header(&self, columns: &[&str]) {
        let header: String = columns
            .iter()
            .map(|c| format!("{:<15}", c))
            .collect::<Vec<_>>()
            .join(" ");
        if self.colored {
            println!("    {}", header.bright_white().bold());
            println!("    {}", "─".repeat(columns.len() * 16).dimmed());
        } else {
            println!("    {}", header);
            println!("    {}", "-".repeat(columns.len() * 16));
        }
    }

    /// Print a table row
    pub fn table_row(&self, values: &[&str]) {
        let row: String = values
            .iter()
            .map(|v| format!("{:<15}", v))
            .collect::<Vec<_>>()
            .join(" ");
        println!("    {}", row);
    }

    /// Print one transcript entry
    pub fn message(&self, message: &Message) {
        println!("{}", self.format_message(message));
    }

    /// Transcript entry as a single block of text
    pub fn format_message(&self, message: &Message) -> String {
        let label = match (message.kind, &message.target, &message.tool_name) {
            (MessageKind::Handoff, Some(target), _) => {
                format!("{} -> {}", message.sender, target)
            }
            (MessageKind::ToolCall, _, Some(tool)) | (MessageKind::ToolResult, _, Some(tool)) => {
                format!("{} [{}]", message.sender, tool)
            }
            _ => message.sender.to_string(),
        };

        let body = match message.kind {
            MessageKind::ToolCall => format!(
                "{} {}",
                message.content,
                message
                    .tool_args
                    .as_ref()
                    .map(|a| a.to_string())
                    .unwrap_or_default()
            ),
            MessageKind::ToolResult => elide(&message.content, MAX_RESULT_CHARS),
            _ => message.content.clone(),
        };

        if !self.colored {
            return format!("[{}] {}: {}", message.kind.as_str(), label, body);
        }

        let label = match message.kind {
            MessageKind::Text => label.bright_white().bold().to_string(),
            MessageKind::ToolCall => label.cyan().to_string(),
            MessageKind::ToolResult => label.dimmed().to_string(),
            MessageKind::Handoff => label.magenta().bold().to_string(),
            MessageKind::Termination => label.green().bold().to_string(),
        };
        let body = match message.kind {
            MessageKind::ToolResult => body.dimmed().to_string(),
            _ => body,
        };
        format!("{} {}", label, body)
    }

    /// Print the final `done:` / `aborted:` line of a run
    pub fn status(&self, outcome: &RunOutcome) {
        let line = outcome.status_line();
        match &outcome.final_state {
            RunState::Terminated(_) => self.success(&line),
            RunState::Aborted(reason) => {
                self.error(&line);
                self.kv("detail", &reason.to_string());
            }
            RunState::Running(_) => self.warning(&line),
        }
    }

    /// Print newline
    pub fn newline(&self) {
        println!();
    }
}

fn elide(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars).collect();
    format!("{}…", kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_output_constructors() {
        assert!(Output::new().colored);
        assert!(!Output::no_color().colored);
        assert!(Output::default().colored);
    }

    #[test]
    fn test_plain_message_formatting() {
        let output = Output::no_color();

        let handoff = Message::handoff("CriticAgent", "WriterAgent", "Add sources");
        assert_eq!(
            output.format_message(&handoff),
            "[handoff] CriticAgent -> WriterAgent: Add sources"
        );

        let call = Message::tool_call("SearchAgent", "web_search", json!({"query": "x"}));
        assert_eq!(
            output.format_message(&call),
            r#"[tool_call] SearchAgent [web_search]: calling web_search {"query":"x"}"#
        );
    }

    #[test]
    fn test_long_tool_results_are_elided() {
        let output = Output::no_color();
        let result = Message::tool_result("SearchAgent", "web_scrape", "a".repeat(2000));
        let line = output.format_message(&result);
        assert!(line.ends_with('…'));
        assert!(line.len() < 700);
    }

    #[test]
    fn test_output_methods_no_panic() {
        for output in [Output::no_color(), Output::new()] {
            output.banner();
            output.success("test success");
            output.info("test info");
            output.warning("test warning");
            output.error("test error");
            output.header("Test Header");
            output.kv("key", "value");
            output.list_item("item");
            output.hint("hint message");
            output.table_header(&["Name", "Role"]);
            output.table_row(&["PlannerAgent", "planner"]);
            output.message(&Message::termination("PlannerAgent", "FINISHED"));
            output.newline();
        }
    }
}
