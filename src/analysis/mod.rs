//! Analysis modules.
//!
//! `aggregator` computes per-category placement counts and `similarity`
//! derives pairwise card co-occurrence from them. [`analyze_session`] runs
//! both over one snapshot of submissions.

pub mod aggregator;
pub mod similarity;

pub use aggregator::*;
pub use similarity::*;

use crate::models::{
    CardSimilarity, CategoryResult, Session, SimilarityMode, Submission, TopPlacement,
};

/// Everything computed for one session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionAnalysis {
    pub participants: usize,
    pub categories: Vec<CategoryResult>,
    /// Sorted by descending similarity.
    pub similarities: Vec<CardSimilarity>,
    pub strong_relationships: Vec<CardSimilarity>,
    pub top_placements: Vec<TopPlacement>,
    pub custom_categories: Vec<String>,
    pub average_completion_minutes: Option<f64>,
}

/// Aggregate a session's submissions.
pub fn analyze_session(
    session: &Session,
    submissions: &[Submission],
    mode: SimilarityMode,
    strong_threshold: f64,
) -> SessionAnalysis {
    let categories = compute_category_results(&session.cards, &session.categories, submissions);

    let mut similarities = match mode {
        SimilarityMode::Approximate => {
            compute_card_similarities(&session.cards, &categories, submissions.len())
        }
        SimilarityMode::Exact => compute_exact_card_similarities(&session.cards, submissions),
    };
    sort_similarities(&mut similarities);

    let strong_relationships = strong_relationships(&similarities, strong_threshold);
    let top_placements = top_placements(&session.cards, &categories);
    let custom_categories = custom_category_names(&session.categories, &categories);

    SessionAnalysis {
        participants: submissions.len(),
        categories,
        similarities,
        strong_relationships,
        top_placements,
        custom_categories,
        average_completion_minutes: average_completion_minutes(submissions),
    }
}

#[cfg(test)]
mod tests {
    use super::aggregator::tests::{category, fruit_cards, submission};
    use super::*;

    fn fruit_session() -> Session {
        let mut session: Session = serde_json::from_str(r#"{"id": "s1", "type": "hybrid"}"#)
            .unwrap();
        session.cards = fruit_cards();
        session.categories = vec![category("catA", "Fruit")];
        session
    }

    #[test]
    fn test_analyze_session() {
        let session = fruit_session();
        let submissions = vec![
            submission(&[("catA", "Fruit", &["c1", "c2"])]),
            submission(&[("catA", "Fruit", &["c1"]), ("own", "Mine", &["c2"])]),
        ];

        let analysis = analyze_session(&session, &submissions, SimilarityMode::Approximate, 50.0);

        assert_eq!(analysis.participants, 2);
        assert_eq!(analysis.categories.len(), 2);
        assert_eq!(analysis.custom_categories, vec!["Mine".to_string()]);
        assert_eq!(analysis.similarities.len(), 1);
        assert_eq!(analysis.similarities[0].similarity_percentage, 50.0);
        assert!(analysis.strong_relationships.is_empty());
        assert_eq!(analysis.top_placements[0].category_id.as_deref(), Some("catA"));
        assert_eq!(analysis.average_completion_minutes, None);
    }

    #[test]
    fn test_analyze_session_exact_mode() {
        let session = fruit_session();
        let submissions = vec![
            submission(&[("catA", "Fruit", &["c1", "c2"])]),
            submission(&[("catA", "Fruit", &["c1", "c2"])]),
        ];

        let analysis = analyze_session(&session, &submissions, SimilarityMode::Exact, 50.0);

        assert_eq!(analysis.similarities[0].same_group_count, 2);
        assert_eq!(analysis.strong_relationships.len(), 1);
    }

    #[test]
    fn test_analyze_session_empty() {
        let session = fruit_session();

        let analysis = analyze_session(&session, &[], SimilarityMode::Approximate, 50.0);

        assert_eq!(analysis.participants, 0);
        assert_eq!(analysis.categories.len(), 1);
        assert!(analysis.similarities.is_empty());
        assert!(analysis.custom_categories.is_empty());
        assert!(analysis.top_placements.iter().all(|t| t.category_id.is_none()));
    }

    #[test]
    fn test_analyze_session_idempotent() {
        let session = fruit_session();
        let submissions = vec![submission(&[("catA", "Fruit", &["c1", "c2"])])];

        let first = analyze_session(&session, &submissions, SimilarityMode::Approximate, 50.0);
        let second = analyze_session(&session, &submissions, SimilarityMode::Approximate, 50.0);

        assert_eq!(first, second);
    }
}
