//! Pretty output formatting.

use super::{CountOutput, ItemsOutput};

/// Format read results for display.
pub fn format_items(output: &ItemsOutput) -> String {
    if output.items.is_empty() {
        return "No items found.".to_string();
    }
    let mut rendered = format!("ITEMS ({})\n", output.items.len());
    rendered.push_str(&"-".repeat(40));
    for item in &output.items {
        rendered.push('\n');
        rendered.push_str(&serde_json::to_string_pretty(item).unwrap_or_default());
    }
    if let Some(key) = &output.last_evaluated_key {
        let pairs: Vec<String> = key
            .iter()
            .map(|(name, value)| format!("--start-key {name}={value}"))
            .collect();
        rendered.push_str(&format!(
            "\n\nMore items available. Resume with: {}",
            pairs.join(" ")
        ));
    }
    rendered
}

/// Format counts for display.
pub fn format_counts(counts: &CountOutput) -> String {
    format!("Matched: {}\nScanned: {}", counts.filtered, counts.total)
}
