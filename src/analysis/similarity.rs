//! Pairwise card co-occurrence.
//!
//! Two ways of counting how often a pair of cards lands in the same
//! category are provided. The approximate form works from per-category
//! totals alone; the exact form rescans the submissions.

use super::aggregator::percentage;
use crate::models::{Card, CardSimilarity, CategoryResult, Submission};
use std::collections::{HashMap, HashSet};

/// Co-occurrence derived from category totals.
///
/// For each unordered pair of distinct cards the same-group count is the sum
/// over category results of `min(count_a, count_b)`. This can overcount when
/// the two counts in a category come from different submissions. Pairs with
/// a zero count are omitted.
pub fn compute_card_similarities(
    cards: &[Card],
    results: &[CategoryResult],
    total_submissions: usize,
) -> Vec<CardSimilarity> {
    let counts: Vec<HashMap<&str, usize>> = results
        .iter()
        .map(|result| {
            result
                .cards
                .iter()
                .map(|c| (c.card_id.as_str(), c.count))
                .collect()
        })
        .collect();

    let mut similarities = Vec::new();

    for (i, first) in cards.iter().enumerate() {
        for second in &cards[i + 1..] {
            let same_group_count: usize = counts
                .iter()
                .map(|category| {
                    let a = category.get(first.id.as_str()).copied().unwrap_or(0);
                    let b = category.get(second.id.as_str()).copied().unwrap_or(0);
                    a.min(b)
                })
                .sum();

            if same_group_count > 0 {
                similarities.push(pair(first, second, same_group_count, total_submissions));
            }
        }
    }

    similarities
}

/// Co-occurrence counted directly from submissions.
///
/// A pair scores one for every submission that has at least one category
/// containing both cards, so percentages never exceed 100.
pub fn compute_exact_card_similarities(
    cards: &[Card],
    submissions: &[Submission],
) -> Vec<CardSimilarity> {
    let index: HashMap<&str, usize> = cards
        .iter()
        .enumerate()
        .map(|(i, card)| (card.id.as_str(), i))
        .collect();

    let n = cards.len();
    let mut together = vec![0usize; n * n];

    for submission in submissions {
        let mut seen: HashSet<(usize, usize)> = HashSet::new();

        for entry in &submission.categories {
            let mut members: Vec<usize> = entry
                .card_ids
                .iter()
                .filter_map(|id| index.get(id.as_str()).copied())
                .collect();
            members.sort_unstable();
            members.dedup();

            for (a, &first) in members.iter().enumerate() {
                for &second in &members[a + 1..] {
                    if seen.insert((first, second)) {
                        together[first * n + second] += 1;
                    }
                }
            }
        }
    }

    let total = submissions.len();
    let mut similarities = Vec::new();

    for (i, first) in cards.iter().enumerate() {
        for (j, second) in cards.iter().enumerate().skip(i + 1) {
            let count = together[i * n + j];
            if count > 0 {
                similarities.push(pair(first, second, count, total));
            }
        }
    }

    similarities
}

fn pair(first: &Card, second: &Card, count: usize, total: usize) -> CardSimilarity {
    CardSimilarity {
        card1: first.id.clone(),
        card1_text: first.text.clone(),
        card2: second.id.clone(),
        card2_text: second.text.clone(),
        same_group_count: count,
        similarity_percentage: percentage(count, total),
    }
}

/// Sort by descending similarity, keeping input order for ties.
pub fn sort_similarities(similarities: &mut [CardSimilarity]) {
    similarities.sort_by(|a, b| {
        b.similarity_percentage
            .partial_cmp(&a.similarity_percentage)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Pairs whose similarity is strictly above `threshold` percent, strongest first.
pub fn strong_relationships(
    similarities: &[CardSimilarity],
    threshold: f64,
) -> Vec<CardSimilarity> {
    let mut strong: Vec<CardSimilarity> = similarities
        .iter()
        .filter(|s| s.similarity_percentage > threshold)
        .cloned()
        .collect();
    sort_similarities(&mut strong);
    strong
}
