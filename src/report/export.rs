//! CSV and HTML exports.
//!
//! Both exports carry the session information block, the non-zero card
//! placements per category, the co-occurring card pairs and the list of
//! participant-created categories.

use crate::analysis::sorted_cards;
use crate::models::Report;

/// Generate a CSV export.
pub fn generate_csv_report(report: &Report) -> String {
    let mut rows: Vec<String> = Vec::new();
    let meta = &report.metadata;

    rows.push("Session Information".to_string());
    rows.push(csv_row(&["Title", &meta.session_title]));
    rows.push(csv_row(&["Description", &meta.session_description]));
    rows.push(csv_row(&["Type", &meta.session_type.to_string()]));
    rows.push(csv_row(&["Participants", &report.summary.participants.to_string()]));
    if let Some(minutes) = meta.average_completion_minutes {
        rows.push(csv_row(&["Average Time", &format!("{:.1} minutes", minutes)]));
    }
    rows.push(String::new());

    rows.push("Category Results".to_string());
    rows.push(csv_row(&["Category Name", "Card", "Count", "Percentage"]));
    for category in &report.categories {
        for card in sorted_cards(category).into_iter().filter(|c| c.count > 0) {
            rows.push(csv_row(&[
                &category.category_name,
                &card.card_text,
                &card.count.to_string(),
                &format!("{:.1}%", card.percentage),
            ]));
        }
    }
    rows.push(String::new());

    rows.push("Card Relationships".to_string());
    rows.push(csv_row(&["Card 1", "Card 2", "Similarity", "Count"]));
    for pair in &report.similarities {
        rows.push(csv_row(&[
            &pair.card1_text,
            &pair.card2_text,
            &format!("{:.1}%", pair.similarity_percentage),
            &pair.same_group_count.to_string(),
        ]));
    }

    if !report.custom_categories.is_empty() {
        rows.push(String::new());
        rows.push("Custom Categories Created".to_string());
        for name in &report.custom_categories {
            rows.push(csv_field(name));
        }
    }

    let mut output = rows.join("\n");
    output.push('\n');
    output
}

fn csv_row(fields: &[&str]) -> String {
    fields
        .iter()
        .map(|field| csv_field(field))
        .collect::<Vec<_>>()
        .join(",")
}

/// Quote a field if it holds a separator, quote or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

const HTML_STYLE: &str = "body {
  font-family: system-ui, sans-serif;
  max-width: 1200px;
  margin: 0 auto;
  padding: 2rem;
}
table { width: 100%; border-collapse: collapse; margin: 1rem 0; }
th, td { padding: 0.5rem; text-align: left; border: 1px solid #ddd; }
th { background: #f4f4f5; }
h2 { margin-top: 2rem; }
.bar { background: #e4e4e7; height: 8px; border-radius: 4px; overflow: hidden; }
.bar-fill { background: #3b82f6; height: 100%; }";

/// Generate a standalone HTML page.
pub fn generate_html_report(report: &Report) -> String {
    let meta = &report.metadata;
    let title = escape_html(&meta.session_title);
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{} - Results</title>\n", title));
    html.push_str(&format!("<style>\n{}\n</style>\n", HTML_STYLE));
    html.push_str("</head>\n<body>\n");
    html.push_str(&format!("<h1>{}</h1>\n", title));
    html.push_str(&format!("<p>{}</p>\n", escape_html(&meta.session_description)));

    html.push_str("<h2>Session Information</h2>\n<table>\n");
    html.push_str(&format!("<tr><td>Type</td><td>{}</td></tr>\n", meta.session_type));
    html.push_str(&format!(
        "<tr><td>Participants</td><td>{}</td></tr>\n",
        report.summary.participants
    ));
    if let Some(minutes) = meta.average_completion_minutes {
        html.push_str(&format!(
            "<tr><td>Average Time</td><td>{:.1} minutes</td></tr>\n",
            minutes
        ));
    }
    html.push_str("</table>\n");

    html.push_str("<h2>Category Results</h2>\n");
    for category in &report.categories {
        html.push_str(&format!("<h3>{}</h3>\n", escape_html(&category.category_name)));
        html.push_str("<table>\n<thead><tr>");
        html.push_str("<th>Card</th><th>Count</th><th>Percentage</th><th>Distribution</th>");
        html.push_str("</tr></thead>\n<tbody>\n");
        for card in sorted_cards(category).into_iter().filter(|c| c.count > 0) {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{:.0}%</td>\
                 <td><div class=\"bar\">\
                 <div class=\"bar-fill\" style=\"width: {:.1}%\"></div>\
                 </div></td>\
                 </tr>\n",
                escape_html(&card.card_text),
                card.count,
                card.percentage,
                card.percentage
            ));
        }
        html.push_str("</tbody>\n</table>\n");
    }

    html.push_str("<h2>Card Relationships</h2>\n");
    html.push_str("<table>\n<thead><tr>");
    html.push_str("<th>Card 1</th><th>Card 2</th><th>Similarity</th><th>Count</th>");
    html.push_str("</tr></thead>\n<tbody>\n");
    for pair in &report.similarities {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{:.0}%</td><td>{}</td></tr>\n",
            escape_html(&pair.card1_text),
            escape_html(&pair.card2_text),
            pair.similarity_percentage,
            pair.same_group_count
        ));
    }
    html.push_str("</tbody>\n</table>\n");

    if !report.custom_categories.is_empty() {
        html.push_str("<h2>Custom Categories</h2>\n<ul>\n");
        for name in &report.custom_categories {
            html.push_str(&format!("<li>{}</li>\n", escape_html(name)));
        }
        html.push_str("</ul>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::fixture_report;

    #[test]
    fn test_generate_csv_report() {
        let report = fixture_report();
        let csv = generate_csv_report(&report);

        assert!(csv.starts_with("Session Information\nTitle,Grocery store navigation\n"));
        assert!(csv.contains("Participants,4"));
        assert!(csv.contains("Category Name,Card,Count,Percentage"));
        assert!(csv.contains("Produce,Apple,4,100.0%"));
        assert!(csv.contains("Produce,Banana,3,75.0%"));
        assert!(!csv.contains("Produce,Milk"));
        assert!(csv.contains("Apple,Banana,75.0%,3"));
        assert!(csv.contains("Custom Categories Created\nBakery\nDeli\n"));
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_row(&["x", "y,z"]), "x,\"y,z\"");
    }

    #[test]
    fn test_generate_html_report() {
        let report = fixture_report();
        let html = generate_html_report(&report);

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Grocery store navigation - Results</title>"));
        assert!(html.contains("<h3>Produce</h3>"));
        assert!(html.contains("<td>Apple</td><td>4</td><td>100%</td>"));
        assert!(html.contains("<li>Bakery</li>"));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_html_escaping() {
        let mut report = fixture_report();
        report.metadata.session_title = "Fish & <Chips>".to_string();

        let html = generate_html_report(&report);
        assert!(html.contains("<h1>Fish &amp; &lt;Chips&gt;</h1>"));
        assert!(!html.contains("<Chips>"));
    }
}
