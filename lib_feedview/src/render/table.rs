//! # Table Layout
//!
//! Column order is fixed: Member Number, Call Probability, Raw Page Tags,
//! Intent, P Value, EVA DQ. Each record becomes one row. Output contains
//! nothing time- or run-dependent, so the same rows always produce the same
//! bytes.

use std::fmt::Write as _;

use serde_json::Value;

use crate::core::record::{CanonicalField, CanonicalRecord};

/// Display text for one cell.
///
/// Empty fields are blank, strings are shown without quotes, numbers and
/// booleans use their JSON spelling and structured values (tag lists) are
/// shown as compact JSON.
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Renders records into the page served to viewers.
#[derive(Debug, Clone)]
pub struct PageRenderer {
    title: String,
}

impl PageRenderer {
    /// Creates a renderer whose page title names the subscribed topic.
    pub fn new(topic: &str) -> Self {
        Self {
            title: format!("Feed Viewer: {}", topic),
        }
    }

    /// The page title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// A complete HTML document containing the table.
    pub fn render_html<'a, I>(&self, records: I) -> String
    where
        I: IntoIterator<Item = &'a CanonicalRecord>,
    {
        let mut out = String::with_capacity(4096);
        out.push_str("<!DOCTYPE html>\n<html>\n  <head>\n    <meta charset=\"UTF-8\" />\n");
        let _ = writeln!(out, "    <title>{}</title>", escape_html(&self.title));
        out.push_str("  </head>\n  <body>\n    <table id=\"feed-table\">\n      <thead>\n        <tr>\n");
        for field in CanonicalField::ALL {
            let _ = writeln!(out, "          <th>{}</th>", field.title());
        }
        out.push_str("        </tr>\n      </thead>\n      <tbody>\n");
        for record in records {
            out.push_str("        <tr>");
            for field in CanonicalField::ALL {
                let _ = write!(out, "<td>{}</td>", escape_html(&cell_text(record.get(field))));
            }
            out.push_str("</tr>\n");
        }
        out.push_str("      </tbody>\n    </table>\n  </body>\n</html>\n");
        out
    }

    /// A pipe-separated plain-text table, header first. Used for logs.
    pub fn render_text<'a, I>(&self, records: I) -> String
    where
        I: IntoIterator<Item = &'a CanonicalRecord>,
    {
        let header: Vec<&str> = CanonicalField::ALL.iter().map(|f| f.title()).collect();
        let mut out = header.join(" | ");
        out.push('\n');
        for record in records {
            let cells: Vec<String> = CanonicalField::ALL
                .iter()
                .map(|f| cell_text(record.get(*f)))
                .collect();
            out.push_str(&cells.join(" | "));
            out.push('\n');
        }
        out
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> CanonicalRecord {
        CanonicalRecord::default()
            .with(CanonicalField::MemberNumber, json!("42"))
            .with(CanonicalField::CallProbability, json!(0.81))
            .with(CanonicalField::Intent, json!("buy"))
    }

    #[test]
    fn cell_text_formats_each_json_shape() {
        assert_eq!(cell_text(None), "");
        assert_eq!(cell_text(Some(&Value::Null)), "");
        assert_eq!(cell_text(Some(&json!("buy"))), "buy");
        assert_eq!(cell_text(Some(&json!(0.81))), "0.81");
        assert_eq!(cell_text(Some(&json!(0))), "0");
        assert_eq!(cell_text(Some(&json!(false))), "false");
        assert_eq!(cell_text(Some(&json!(["a", "b"]))), r#"["a","b"]"#);
    }

    #[test]
    fn text_table_blanks_missing_fields() {
        let renderer = PageRenderer::new("calls");
        let text = renderer.render_text([sample()].iter());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Member Number | Call Probability | Raw Page Tags | Intent | P Value | EVA DQ");
        assert_eq!(lines[1], "42 | 0.81 |  | buy |  | ");
    }

    #[test]
    fn html_has_header_and_one_row_per_record() {
        let renderer = PageRenderer::new("calls");
        let records = vec![sample(), CanonicalRecord::default()];
        let html = renderer.render_html(records.iter());

        assert!(html.contains("<title>Feed Viewer: calls</title>"));
        assert!(html.contains("<th>Member Number</th>"));
        assert!(html.contains("<th>EVA DQ</th>"));
        assert!(html.contains("<tr><td>42</td><td>0.81</td><td></td><td>buy</td><td></td><td></td></tr>"));
        assert!(html.contains("<tr><td></td><td></td><td></td><td></td><td></td><td></td></tr>"));
        assert_eq!(html.matches("<td>").count(), 12);
    }

    #[test]
    fn html_rows_follow_record_order() {
        let renderer = PageRenderer::new("calls");
        let records: Vec<CanonicalRecord> = ["first", "second"]
            .iter()
            .map(|id| CanonicalRecord::default().with(CanonicalField::MemberNumber, json!(id)))
            .collect();
        let html = renderer.render_html(records.iter());

        let first = html.find("<td>first</td>").unwrap();
        let second = html.find("<td>second</td>").unwrap();
        assert!(first < second);
    }

    #[test]
    fn cell_text_is_escaped_in_html() {
        let renderer = PageRenderer::new("<topic>");
        let record = CanonicalRecord::default().with(CanonicalField::Intent, json!("<script>&"));
        let html = renderer.render_html([record].iter());

        assert!(html.contains("<td>&lt;script&gt;&amp;</td>"));
        assert!(html.contains("<title>Feed Viewer: &lt;topic&gt;</title>"));
        assert!(!html.contains("<script>"));
    }
}
