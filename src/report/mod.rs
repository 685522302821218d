//! Report assembly and rendering.

pub mod export;
pub mod generator;

pub use export::{generate_csv_report, generate_html_report};
pub use generator::{generate_json_report, generate_markdown_report};

use crate::analysis::SessionAnalysis;
use crate::config::AnalysisConfig;
use crate::models::{Report, ReportMetadata, ResultsSummary, Session};
use chrono::Utc;

/// Wrap a session analysis in a report envelope.
pub fn build_report(
    session: &Session,
    analysis: SessionAnalysis,
    settings: &AnalysisConfig,
) -> Report {
    let predefined = session.categories.len();

    let summary = ResultsSummary {
        participants: analysis.participants,
        categories: analysis.categories.len(),
        custom_categories: analysis.custom_categories.len(),
        related_pairs: analysis.similarities.len(),
        strong_pairs: analysis.strong_relationships.len(),
    };

    let metadata = ReportMetadata {
        session_id: session.id.clone(),
        session_title: session.title.clone(),
        session_description: session.description.clone(),
        session_type: session.session_type,
        generated_at: Utc::now(),
        card_count: session.cards.len(),
        predefined_category_count: predefined,
        similarity_mode: settings.similarity_mode,
        strong_threshold: settings.strong_threshold,
        average_completion_minutes: analysis.average_completion_minutes,
    };

    Report {
        metadata,
        summary,
        categories: analysis.categories,
        similarities: analysis.similarities,
        strong_relationships: analysis.strong_relationships,
        top_placements: analysis.top_placements,
        custom_categories: analysis.custom_categories,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::analysis::analyze_session;
    use crate::store::{load_session, FileSubmissionSource, SubmissionSource};
    use std::path::PathBuf;

    /// Report over the grocery fixtures.
    pub(crate) fn fixture_report() -> Report {
        let fixtures = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures");
        let session = load_session(&fixtures.join("session.json")).unwrap();
        let submissions = FileSubmissionSource::new(fixtures.join("submissions"), false)
            .load(&session.id)
            .unwrap();

        let settings = AnalysisConfig::default();
        let analysis = analyze_session(
            &session,
            &submissions,
            settings.similarity_mode,
            settings.strong_threshold,
        );
        build_report(&session, analysis, &settings)
    }

    #[test]
    fn test_build_report_from_fixtures() {
        let report = fixture_report();

        assert_eq!(report.metadata.session_id, "grocery-study");
        assert_eq!(report.metadata.card_count, 5);
        assert_eq!(report.metadata.predefined_category_count, 2);
        assert_eq!(report.metadata.average_completion_minutes, Some(7.0));
        assert_eq!(report.summary.participants, 4);
        // produce, dairy, two bakery ids and one deli id
        assert_eq!(report.summary.categories, 5);
        // two bakery ids share one name
        assert_eq!(report.summary.custom_categories, 2);
        assert_eq!(
            report.custom_categories,
            vec!["Bakery".to_string(), "Deli".to_string()]
        );
        assert_eq!(report.summary.custom_categories, report.custom_categories.len());

        let produce = &report.categories[0];
        assert_eq!(produce.category_id, "produce");
        assert_eq!(produce.count, 4);
        assert_eq!(produce.card_count("apple"), 4);
        assert_eq!(produce.card_count("banana"), 3);
        assert_eq!(produce.card_count("bread"), 1);

        let top = &report.similarities[0];
        assert_eq!((top.card1.as_str(), top.card2.as_str()), ("apple", "banana"));
        assert_eq!(top.same_group_count, 3);
        assert_eq!(top.similarity_percentage, 75.0);
    }
}
