//! Card placement aggregation and statistics.
//!
//! This module turns a session's cards, its predefined categories and the
//! participant submissions into per-category placement counts. Everything
//! here is a pure function over its arguments.

use crate::models::{Card, CardResult, Category, CategoryResult, Submission, TopPlacement};
use std::collections::{HashMap, HashSet};

/// Compute per-category card placement counts and percentages.
///
/// Results start with one entry per predefined category, in the given order,
/// followed by participant-created categories in first-seen order. Card ids
/// that do not match a session card are ignored. A submission counts at most
/// once per category and at most once per card within a category.
///
/// `cards` and `predefined` must have unique ids; see [`Session::validate`].
///
/// [`Session::validate`]: crate::models::Session::validate
pub fn compute_category_results(
    cards: &[Card],
    predefined: &[Category],
    submissions: &[Submission],
) -> Vec<CategoryResult> {
    let card_index: HashMap<&str, usize> = cards
        .iter()
        .enumerate()
        .map(|(i, card)| (card.id.as_str(), i))
        .collect();

    let mut results: Vec<CategoryResult> = predefined
        .iter()
        .map(|category| CategoryResult::seeded(&category.id, &category.name, cards))
        .collect();

    let mut category_index: HashMap<String, usize> = predefined
        .iter()
        .enumerate()
        .map(|(i, category)| (category.id.clone(), i))
        .collect();

    for submission in submissions {
        let mut used: HashSet<usize> = HashSet::new();
        let mut placed: HashSet<(usize, usize)> = HashSet::new();

        for entry in &submission.categories {
            let slot = match category_index.get(&entry.id) {
                Some(&slot) => slot,
                None => {
                    results.push(CategoryResult::seeded(&entry.id, &entry.name, cards));
                    category_index.insert(entry.id.clone(), results.len() - 1);
                    results.len() - 1
                }
            };

            if used.insert(slot) {
                results[slot].count += 1;
            }

            for card_id in &entry.card_ids {
                if let Some(&card) = card_index.get(card_id.as_str()) {
                    if placed.insert((slot, card)) {
                        results[slot].cards[card].count += 1;
                    }
                }
            }
        }
    }

    let total = submissions.len();
    for result in &mut results {
        for card in &mut result.cards {
            card.percentage = percentage(card.count, total);
        }
    }

    results
}

/// `count / total * 100`, or zero when there is nothing to divide by.
pub fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 / total as f64) * 100.0
}

/// Cards of a category result ordered by descending count.
///
/// The sort is stable, so ties keep session card order.
pub fn sorted_cards(result: &CategoryResult) -> Vec<&CardResult> {
    let mut cards: Vec<&CardResult> = result.cards.iter().collect();
    cards.sort_by_key(|card| std::cmp::Reverse(card.count));
    cards
}

/// Names of categories participants created, deduplicated by name.
pub fn custom_category_names(predefined: &[Category], results: &[CategoryResult]) -> Vec<String> {
    let known: HashSet<&str> = predefined.iter().map(|c| c.id.as_str()).collect();
    let mut seen: HashSet<&str> = HashSet::new();

    results
        .iter()
        .filter(|result| !known.contains(result.category_id.as_str()))
        .filter(|result| seen.insert(result.category_name.as_str()))
        .map(|result| result.category_name.clone())
        .collect()
}

/// For each card, the category it was placed in most often.
///
/// Ties go to the category listed first. Cards never placed anywhere get an
/// entry with no category and a zero count.
pub fn top_placements(cards: &[Card], results: &[CategoryResult]) -> Vec<TopPlacement> {
    cards
        .iter()
        .enumerate()
        .map(|(i, card)| {
            let mut best: Option<(&CategoryResult, &CardResult)> = None;

            for result in results {
                let Some(card_result) = result.cards.get(i).filter(|c| c.card_id == card.id)
                else {
                    continue;
                };
                let better = match best {
                    Some((_, current)) => card_result.count > current.count,
                    None => card_result.count > 0,
                };
                if better {
                    best = Some((result, card_result));
                }
            }

            match best {
                Some((result, card_result)) => TopPlacement {
                    card_id: card.id.clone(),
                    card_text: card.text.clone(),
                    category_id: Some(result.category_id.clone()),
                    category_name: Some(result.category_name.clone()),
                    count: card_result.count,
                    percentage: card_result.percentage,
                },
                None => TopPlacement {
                    card_id: card.id.clone(),
                    card_text: card.text.clone(),
                    category_id: None,
                    category_name: None,
                    count: 0,
                    percentage: 0.0,
                },
            }
        })
        .collect()
}

/// Mean sorting time in minutes over submissions with both timestamps.
pub fn average_completion_minutes(submissions: &[Submission]) -> Option<f64> {
    let durations: Vec<f64> = submissions
        .iter()
        .filter_map(Submission::duration_minutes)
        .collect();

    if durations.is_empty() {
        return None;
    }

    Some(durations.iter().sum::<f64>() / durations.len() as f64)
}
