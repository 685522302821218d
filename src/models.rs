//! Data models for card sorting studies.
//!
//! Input records (`Session`, `Submission`) mirror the documents stored by the
//! study backend, using its camelCase field names. Every optional field has
//! exactly one default, applied here at deserialization time. Output records
//! (`CategoryResult`, `CardSimilarity`, `Report`) are produced fresh by each
//! aggregation run.

use crate::error::DefinitionError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A single item participants sort into categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Identifier, unique within a session.
    pub id: String,
    /// Text shown to participants.
    #[serde(default)]
    pub text: String,
}

/// A researcher-defined category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Identifier, unique within a session's predefined categories.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
}

/// Kind of card sort a session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    /// Participants may only use the predefined categories.
    Closed,
    /// Participants create their own categories.
    #[default]
    Open,
    /// Predefined categories plus participant-created ones.
    Hybrid,
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionType::Closed => write!(f, "Closed"),
            SessionType::Open => write!(f, "Open"),
            SessionType::Hybrid => write!(f, "Hybrid"),
        }
    }
}

impl SessionType {
    /// Whether participants can invent categories in this kind of sort.
    pub fn allows_custom_categories(&self) -> bool {
        !matches!(self, SessionType::Closed)
    }
}

/// Lifecycle status of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Draft,
    Active,
    Completed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Draft => write!(f, "Draft"),
            SessionStatus::Active => write!(f, "Active"),
            SessionStatus::Completed => write!(f, "Completed"),
        }
    }
}

/// A card sorting session definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "type")]
    pub session_type: SessionType,
    #[serde(default)]
    pub status: SessionStatus,
    #[serde(default = "default_allow_new_categories")]
    pub allow_new_categories: bool,
    #[serde(default)]
    pub cards: Vec<Card>,
    #[serde(default)]
    pub categories: Vec<Category>,
    /// Short join code handed out to participants.
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub archived: bool,
}

fn default_allow_new_categories() -> bool {
    true
}

impl Session {
    /// Check that the session has an id and that card ids and predefined
    /// category ids are unique.
    ///
    /// The aggregation functions assume these hold and do not re-check.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if self.id.is_empty() {
            return Err(DefinitionError::EmptySessionId);
        }

        let mut seen = HashSet::new();
        for card in &self.cards {
            if !seen.insert(card.id.as_str()) {
                return Err(DefinitionError::DuplicateCardId(card.id.clone()));
            }
        }

        let mut seen = HashSet::new();
        for category in &self.categories {
            if !seen.insert(category.id.as_str()) {
                return Err(DefinitionError::DuplicateCategoryId(category.id.clone()));
            }
        }

        Ok(())
    }
}

/// One category as used in a participant's submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionCategory {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub card_ids: Vec<String>,
}

/// A participant's completed sort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub participant_id: String,
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    pub categories: Vec<SubmissionCategory>,
}

impl Submission {
    /// Time the participant spent sorting, if both timestamps are known.
    pub fn duration_minutes(&self) -> Option<f64> {
        let started = self.started_at?;
        let completed = self.completed_at?;
        let seconds = (completed - started).num_seconds();
        if seconds < 0 {
            return None;
        }
        Some(seconds as f64 / 60.0)
    }
}

/// How card co-occurrence is computed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityMode {
    /// Sum of `min(count_a, count_b)` over category results.
    #[default]
    Approximate,
    /// Number of submissions placing both cards in one category.
    Exact,
}

impl fmt::Display for SimilarityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimilarityMode::Approximate => write!(f, "approximate"),
            SimilarityMode::Exact => write!(f, "exact"),
        }
    }
}

/// Placement statistics for one card within one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardResult {
    pub card_id: String,
    pub card_text: String,
    /// Number of submissions that placed the card in this category.
    pub count: usize,
    /// `count` as a percentage of all submissions.
    pub percentage: f64,
}

/// Placement statistics for one category across all submissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryResult {
    pub category_id: String,
    pub category_name: String,
    /// Number of submissions that used this category at all.
    pub count: usize,
    /// One entry per session card, in session card order.
    pub cards: Vec<CardResult>,
}

impl CategoryResult {
    /// Creates a result with every card seeded at zero.
    pub fn seeded(category_id: &str, category_name: &str, cards: &[Card]) -> Self {
        Self {
            category_id: category_id.to_string(),
            category_name: category_name.to_string(),
            count: 0,
            cards: cards
                .iter()
                .map(|card| CardResult {
                    card_id: card.id.clone(),
                    card_text: card.text.clone(),
                    count: 0,
                    percentage: 0.0,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
impl CategoryResult {
    /// Returns the count recorded for a card, or zero if unknown.
    pub fn card_count(&self, card_id: &str) -> usize {
        self.cards
            .iter()
            .find(|c| c.card_id == card_id)
            .map(|c| c.count)
            .unwrap_or(0)
    }
}

/// How often two distinct cards ended up in the same category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSimilarity {
    pub card1: String,
    pub card1_text: String,
    pub card2: String,
    pub card2_text: String,
    pub same_group_count: usize,
    pub similarity_percentage: f64,
}

/// The category a card was placed in most often.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopPlacement {
    pub card_id: String,
    pub card_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    pub count: usize,
    pub percentage: f64,
}

/// Summary figures for a results report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultsSummary {
    /// Number of submissions aggregated.
    pub participants: usize,
    /// Number of categories in the results, predefined and custom.
    pub categories: usize,
    /// Number of distinct participant-created category names.
    pub custom_categories: usize,
    /// Number of card pairs placed together at least once.
    pub related_pairs: usize,
    /// Number of pairs above the strong relationship threshold.
    pub strong_pairs: usize,
}

/// Metadata about the results report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub session_id: String,
    pub session_title: String,
    pub session_description: String,
    pub session_type: SessionType,
    pub generated_at: DateTime<Utc>,
    pub card_count: usize,
    pub predefined_category_count: usize,
    pub similarity_mode: SimilarityMode,
    pub strong_threshold: f64,
    /// Mean sorting time across submissions with both timestamps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_completion_minutes: Option<f64>,
}

/// The complete results report for one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub summary: ResultsSummary,
    pub categories: Vec<CategoryResult>,
    /// All co-occurring pairs, sorted by descending similarity.
    pub similarities: Vec<CardSimilarity>,
    /// Pairs above `metadata.strong_threshold`.
    pub strong_relationships: Vec<CardSimilarity>,
    pub top_placements: Vec<TopPlacement>,
    pub custom_categories: Vec<String>,
}
