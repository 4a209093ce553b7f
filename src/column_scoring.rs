//! Column Pair Scoring - ranks candidate join keys between two tables
//!
//! Every (left column, right column) pair gets a composite score built from
//! four signals:
//! 1. Name similarity: edit-distance ratio between the column names (0-100),
//!    compared case-insensitively, weighted 0.4
//! 2. Type match: +25 when both columns report the same element type
//! 3. Value overlap: Jaccard similarity of the distinct non-null values,
//!    compared by textual representation, weighted 35
//! 4. Uniqueness penalty: -20 when either column is mostly duplicates
//!
//! The score is advisory ranking input, not a probability: no clamping is
//! applied and negative totals still rank.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use strsim::normalized_levenshtein;

/// Weight applied to the 0-100 name similarity ratio.
const NAME_SIMILARITY_WEIGHT: f64 = 0.4;

/// Bonus when the two columns' element types are textually identical.
const TYPE_MATCH_BONUS: f64 = 25.0;

/// Weight applied to the 0-1 Jaccard value overlap.
const VALUE_OVERLAP_WEIGHT: f64 = 35.0;

/// Penalty when either column fails the uniqueness threshold.
const UNIQUENESS_PENALTY: f64 = 20.0;

/// A column counts as unique when distinct-non-null / non-null >= this.
const UNIQUENESS_THRESHOLD: f64 = 0.7;

/// A candidate join key pair and its composite score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPair {
    /// Column name from the first table
    pub left_column: String,

    /// Column name from the second table
    pub right_column: String,

    /// Composite score, rounded to two decimals
    pub score: f64,
}

impl ScoredPair {
    pub fn new(
        left_column: impl Into<String>,
        right_column: impl Into<String>,
        score: f64,
    ) -> Self {
        Self {
            left_column: left_column.into(),
            right_column: right_column.into(),
            score: (score * 100.0).round() / 100.0,
        }
    }
}

/// Score one column pair.
///
/// Deterministic and total: empty columns, all-null columns and
/// single-valued columns all produce a defined score.
pub fn score_column_pair(left: &Series, right: &Series) -> f64 {
    let mut score = name_similarity(left.name(), right.name()) * NAME_SIMILARITY_WEIGHT;

    if format!("{:?}", left.dtype()) == format!("{:?}", right.dtype()) {
        score += TYPE_MATCH_BONUS;
    }

    score += compute_value_overlap(left, right) * VALUE_OVERLAP_WEIGHT;

    if !(is_sufficiently_unique(left) && is_sufficiently_unique(right)) {
        score -= UNIQUENESS_PENALTY;
    }

    score
}

/// Case-insensitive edit-distance ratio between two column names, 0-100.
fn name_similarity(left: &str, right: &str) -> f64 {
    normalized_levenshtein(&left.to_lowercase(), &right.to_lowercase()) * 100.0
}

/// Jaccard similarity of the distinct non-null values of two columns.
///
/// Values are coerced to text before comparison so columns of different
/// element types can still overlap. Returns 0.0 when either column has no
/// non-null values.
pub fn compute_value_overlap(left: &Series, right: &Series) -> f64 {
    let set1 = distinct_text_values(left);
    let set2 = distinct_text_values(right);

    if set1.is_empty() || set2.is_empty() {
        return 0.0;
    }

    let intersection = set1.intersection(&set2).count();
    let union = set1.union(&set2).count();

    intersection as f64 / union as f64
}

/// True when the column's distinct non-null values make up at least
/// `UNIQUENESS_THRESHOLD` of its non-null values. A column with zero
/// non-null values has an undefined ratio and is treated as non-unique.
pub fn is_sufficiently_unique(column: &Series) -> bool {
    let non_null = column.len() - column.null_count();
    if non_null == 0 {
        return false;
    }

    let distinct = match column.n_unique() {
        // n_unique counts null as one distinct value
        Ok(count) => count - usize::from(column.null_count() > 0),
        Err(_) => return false,
    };

    distinct as f64 / non_null as f64 >= UNIQUENESS_THRESHOLD
}

/// Distinct non-null values of a column as text. String values are taken
/// verbatim; other element types use their display form.
fn distinct_text_values(column: &Series) -> HashSet<String> {
    (0..column.len())
        .filter_map(|row_idx| match column.get(row_idx) {
            Ok(AnyValue::Null) | Err(_) => None,
            Ok(AnyValue::String(value)) => Some(value.to_string()),
            Ok(AnyValue::StringOwned(value)) => Some(value.to_string()),
            Ok(value) => Some(value.to_string()),
        })
        .collect()
}
