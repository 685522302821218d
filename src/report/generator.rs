//! Markdown and JSON report generation.
//!
//! This module renders a results [`Report`] as a readable Markdown document
//! or as pretty-printed JSON.

use crate::analysis::sorted_cards;
use crate::config::ReportConfig;
use crate::models::{
    CardSimilarity, CategoryResult, Report, ReportMetadata, ResultsSummary, TopPlacement,
};
use anyhow::Result;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report, options: &ReportConfig) -> String {
    let mut output = String::new();

    // Title
    let title = if report.metadata.session_title.is_empty() {
        report.metadata.session_id.as_str()
    } else {
        report.metadata.session_title.as_str()
    };
    output.push_str(&format!("# Card Sort Results: {}\n\n", title));

    if !report.metadata.session_description.is_empty() {
        output.push_str(&format!("{}\n\n", report.metadata.session_description));
    }

    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_summary_section(&report.summary));
    output.push_str(&generate_categories_section(
        &report.categories,
        report.summary.participants,
        options,
    ));
    output.push_str(&generate_placements_section(&report.top_placements));
    output.push_str(&generate_strong_section(
        &report.strong_relationships,
        report.metadata.strong_threshold,
    ));
    output.push_str(&generate_similarity_section(
        &report.similarities,
        options.max_similarities,
    ));

    if options.include_custom_categories
        && report.metadata.session_type.allows_custom_categories()
    {
        output.push_str(&generate_custom_categories_section(&report.custom_categories));
    }

    output.push_str(&generate_footer());

    output
}

/// Generate the session metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Session\n\n");
    section.push_str(&format!("- **Session ID:** `{}`\n", metadata.session_id));
    section.push_str(&format!("- **Sort Type:** {}\n", metadata.session_type));
    section.push_str(&format!("- **Cards:** {}\n", metadata.card_count));
    section.push_str(&format!(
        "- **Predefined Categories:** {}\n",
        metadata.predefined_category_count
    ));
    if let Some(minutes) = metadata.average_completion_minutes {
        section.push_str(&format!("- **Average Time:** {:.1} minutes\n", minutes));
    }
    section.push_str(&format!(
        "- **Similarity Mode:** {}\n",
        metadata.similarity_mode
    ));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push('\n');

    section
}

/// Generate the summary section.
fn generate_summary_section(summary: &ResultsSummary) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str(
        "| Participants | Categories | Custom Categories | Related Pairs | Strong Pairs |\n",
    );
    section.push_str("|:---:|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | {} | {} |\n\n",
        summary.participants,
        summary.categories,
        summary.custom_categories,
        summary.related_pairs,
        summary.strong_pairs
    ));

    if summary.participants == 0 {
        section.push_str("No submissions have been recorded for this session yet.\n\n");
    }

    section
}

/// Generate the per-category placement tables.
fn generate_categories_section(
    categories: &[CategoryResult],
    participants: usize,
    options: &ReportConfig,
) -> String {
    let mut section = String::new();

    section.push_str("## Category Results\n\n");

    if categories.is_empty() {
        section.push_str("No categories were defined or used.\n\n");
        return section;
    }

    for category in categories {
        section.push_str(&generate_category_block(category, participants, options));
    }

    section
}

/// Generate the table for a single category.
fn generate_category_block(
    category: &CategoryResult,
    participants: usize,
    options: &ReportConfig,
) -> String {
    let mut block = String::new();

    block.push_str(&format!("### {}\n\n", category.category_name));
    block.push_str(&format!(
        "*Used by {} of {} participants*\n\n",
        category.count, participants
    ));

    let cards: Vec<_> = sorted_cards(category)
        .into_iter()
        .filter(|card| options.include_zero_counts || card.count > 0)
        .collect();

    if cards.is_empty() {
        block.push_str("No cards were placed in this category.\n\n");
        return block;
    }

    block.push_str("| Card | Count | Percentage |\n");
    block.push_str("|:---|:---:|:---:|\n");
    for card in cards {
        block.push_str(&format!(
            "| {} | {} | {:.1}% |\n",
            table_cell(&card.card_text),
            card.count,
            card.percentage
        ));
    }
    block.push('\n');

    block
}

/// Generate the most-common-category table.
fn generate_placements_section(placements: &[TopPlacement]) -> String {
    if placements.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Top Placements\n\n");
    section.push_str("| Card | Most Common Category | Agreement |\n");
    section.push_str("|:---|:---|:---:|\n");

    for placement in placements {
        match placement.category_name {
            Some(ref name) => section.push_str(&format!(
                "| {} | {} | {:.1}% |\n",
                table_cell(&placement.card_text),
                table_cell(name),
                placement.percentage
            )),
            None => section.push_str(&format!(
                "| {} | *(not placed)* | - |\n",
                table_cell(&placement.card_text)
            )),
        }
    }
    section.push('\n');

    section
}

/// Generate the strong relationships list.
fn generate_strong_section(strong: &[CardSimilarity], threshold: f64) -> String {
    let mut section = String::new();

    section.push_str("## Strong Relationships\n\n");
    section.push_str(&format!(
        "Card pairs grouped together by more than {:.0}% of participants.\n\n",
        threshold
    ));

    if strong.is_empty() {
        section.push_str("No strong relationships found.\n\n");
        return section;
    }

    for pair in strong {
        section.push_str(&format!(
            "- **{}** + **{}**: {:.1}%\n",
            pair.card1_text, pair.card2_text, pair.similarity_percentage
        ));
    }
    section.push('\n');

    section
}

/// Generate the co-occurrence table, limited to `max` rows (0 = all).
fn generate_similarity_section(similarities: &[CardSimilarity], max: usize) -> String {
    let mut section = String::new();

    section.push_str("## Card Co-occurrence\n\n");

    if similarities.is_empty() {
        section.push_str("No cards were placed together.\n\n");
        return section;
    }

    let shown = if max == 0 {
        similarities.len()
    } else {
        max.min(similarities.len())
    };

    section.push_str("| Card 1 | Card 2 | Together | Similarity |\n");
    section.push_str("|:---|:---|:---:|:---:|\n");
    for pair in &similarities[..shown] {
        section.push_str(&format!(
            "| {} | {} | {} | {:.1}% |\n",
            table_cell(&pair.card1_text),
            table_cell(&pair.card2_text),
            pair.same_group_count,
            pair.similarity_percentage
        ));
    }

    if shown < similarities.len() {
        section.push_str(&format!(
            "\n*{} more pairs not shown.*\n",
            similarities.len() - shown
        ));
    }
    section.push('\n');

    section
}

/// Generate the participant-created categories list.
fn generate_custom_categories_section(custom: &[String]) -> String {
    if custom.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Custom Categories\n\n");
    for name in custom {
        section.push_str(&format!("- {}\n", name));
    }
    section.push('\n');

    section
}

/// Escape a value for a Markdown table cell.
fn table_cell(value: &str) -> String {
    value.replace('|', "\\|")
}

/// Generate the report footer.
fn generate_footer() -> String {
    format!("---\n\n*Report generated by cardsort v{}*\n", env!("CARGO_PKG_VERSION"))
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
