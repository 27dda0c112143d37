// ==========================================
// MUCP Planner - prioritization scorer
// ==========================================
// Weighted multi-criteria score per compartment: each category
// resolves the compartment's raw attribute to a priority rank, and
// the score is the weight-by-rank sum over the selected categories.
// ==========================================
// Input: category setup + raw priority rows
// Output: composite score per compartment, descending traversal order
// ==========================================

use crate::domain::prioritization::{Category, CompartmentPriorityRow};
use crate::domain::types::CategoryType;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::instrument;

// ==========================================
// PrioritizationScorer
// ==========================================
pub struct PrioritizationScorer {
    // stateless engine
}

impl PrioritizationScorer {
    pub fn new() -> Self {
        Self {}
    }

    /// Rank contributed by one category for a raw value. A value that
    /// matches no band / no text entry contributes 0.
    fn resolve_rank(&self, category: &Category, raw_value: &str) -> u32 {
        match category.category_type {
            CategoryType::Numeric => {
                let Ok(value) = raw_value.trim().parse::<f64>() else {
                    return 0;
                };
                // bands never overlap, first match wins
                category
                    .bands
                    .iter()
                    .find(|band| band.contains(value))
                    .map(|band| band.priority)
                    .unwrap_or(0)
            }
            CategoryType::Text => {
                let needle = raw_value.trim().to_lowercase();
                category
                    .text_values
                    .iter()
                    .find(|tv| tv.text_value.to_lowercase() == needle)
                    .map(|tv| tv.priority)
                    .unwrap_or(0)
            }
        }
    }

    /// Composite score for one compartment row.
    ///
    /// score = sum over categories of weight x resolved rank
    pub fn score(&self, categories: &[Category], row: &CompartmentPriorityRow) -> f64 {
        categories
            .iter()
            .map(|category| {
                let rank = row
                    .values
                    .get(&category.name)
                    .map(|raw| self.resolve_rank(category, raw))
                    .unwrap_or(0);
                category.weight * rank as f64
            })
            .sum()
    }

    /// Scores every row; compartments absent from `rows` simply have
    /// no entry (the orchestrator carries them with priority None).
    #[instrument(skip(self, categories, rows), fields(
        categories_count = categories.len(),
        rows_count = rows.len()
    ))]
    pub fn score_all(
        &self,
        categories: &[Category],
        rows: &[CompartmentPriorityRow],
    ) -> HashMap<String, f64> {
        rows.iter()
            .map(|row| (row.compt_id.clone(), self.score(categories, row)))
            .collect()
    }
}

impl Default for PrioritizationScorer {
    fn default() -> Self {
        Self::new()
    }
}

/// Deterministic scheduler traversal order: descending priority,
/// unscored compartments last, ties broken by compartment id.
pub fn compare_priority(
    a_priority: Option<f64>,
    a_compt_id: &str,
    b_priority: Option<f64>,
    b_compt_id: &str,
) -> Ordering {
    match (a_priority, b_priority) {
        (Some(a), Some(b)) => b
            .partial_cmp(&a)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a_compt_id.cmp(b_compt_id)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a_compt_id.cmp(b_compt_id),
    }
}
