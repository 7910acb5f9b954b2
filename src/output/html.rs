//! Standalone HTML report

use super::ReportLines;

/// Escape text for HTML element content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

pub fn render_html(lines: &ReportLines) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Speedtest Results</title>\n</head>\n<body>\n",
    );

    html.push_str(&format!("<h1>Test Results - {}</h1>\n", escape_html(&lines.timestamp)));
    html.push_str(&format!("<p>Server: {}</p>\n", escape_html(&lines.server)));

    for (label, value) in lines.fields() {
        html.push_str(&format!("<p>{}: {}</p>\n", label, escape_html(value)));
    }

    html.push_str("</body>\n</html>\n");
    html
}
