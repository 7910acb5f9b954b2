//! Console summary

use super::ReportLines;
use colored::Colorize;

pub fn render_console(lines: &ReportLines, use_color: bool) -> String {
    let mut output = Vec::with_capacity(7);

    let server = if lines.source.is_auto_selected() {
        format!("{} ({})", lines.server, lines.source.label())
    } else {
        lines.server.clone()
    };

    if use_color {
        output.push("Test Results:".bold().to_string());
        output.push(format!("{} {}", "Timestamp:".bold(), lines.timestamp));
        output.push(format!("{} {}", "Server:".bold(), server.cyan()));
        for (label, value) in lines.fields() {
            output.push(format!("{} {}", format!("{}:", label).bold(), value.green()));
        }
    } else {
        output.push("Test Results:".to_string());
        output.push(format!("Timestamp: {}", lines.timestamp));
        output.push(format!("Server: {}", server));
        for (label, value) in lines.fields() {
            output.push(format!("{}: {}", label, value));
        }
    }

    output.join("\n")
}
