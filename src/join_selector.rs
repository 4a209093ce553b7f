//! Join Selection - picks the best-scoring column pair and runs the join
//!
//! Scores the full cross-product of columns (first table outer, second
//! table inner), ranks the pairs best first and joins on the top entry.
//! There is deliberately no minimum-score floor: even an all-negative
//! ranking selects a pair and attempts the join. The only failure is an
//! empty cross-product, when either table has zero columns.
//!
//! Scoring cost is O(C1 * C2 * R) because every pair builds both value
//! sets; no caching or early termination is applied. Callers that need a
//! bound must impose a request-level timeout themselves.

use crate::column_scoring::{score_column_pair, ScoredPair};
use crate::error::{JoinerError, Result};
use itertools::iproduct;
use polars::prelude::*;
use tracing::{debug, info};

/// Suffix applied to right-table columns whose names collide with the left
/// table in the join output.
pub const RIGHT_COLLISION_SUFFIX: &str = "_right";

/// Outcome of an automatic join: the merged table plus the ranking that
/// drove it.
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    /// The inner-joined table
    pub joined: DataFrame,

    /// The pair the join ran on
    pub best: ScoredPair,

    /// Full cross-product ranking, best first, for diagnostics
    pub suggestions: Vec<ScoredPair>,
}

/// Score every (left column, right column) pair and rank them best first.
///
/// The result always has exactly |columns(df1)| * |columns(df2)| entries.
/// The sort is stable, so pairs with equal scores keep their cross-product
/// enumeration order.
pub fn suggest_join_columns(df1: &DataFrame, df2: &DataFrame) -> Vec<ScoredPair> {
    let mut scored: Vec<ScoredPair> = iproduct!(df1.get_columns(), df2.get_columns())
        .map(|(left, right)| {
            ScoredPair::new(left.name(), right.name(), score_column_pair(left, right))
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    scored
}

/// Pick the highest-ranked pair unconditionally.
pub fn select_best_pair(df1: &DataFrame, df2: &DataFrame) -> Result<ScoredPair> {
    suggest_join_columns(df1, df2)
        .into_iter()
        .next()
        .ok_or(JoinerError::NoJoinableColumns)
}

/// Inner join the two tables on the selected pair.
///
/// Rows match under the columns' native equality (null keys never match;
/// the textual coercion used for overlap scoring plays no part here).
/// Right-table columns whose names collide with the left table get the
/// `_right` suffix. A zero-row result is a valid join, not an error.
pub fn execute_join(df1: &DataFrame, df2: &DataFrame, pair: &ScoredPair) -> Result<DataFrame> {
    let mut args = JoinArgs::new(JoinType::Inner);
    args.suffix = Some(RIGHT_COLLISION_SUFFIX.to_string());

    let joined = df1
        .clone()
        .lazy()
        .join(
            df2.clone().lazy(),
            [col(&pair.left_column)],
            [col(&pair.right_column)],
            args,
        )
        .collect()?;

    Ok(joined)
}

/// Rank all column pairs, select the best and execute the join.
pub fn join_tables(df1: &DataFrame, df2: &DataFrame) -> Result<JoinOutcome> {
    let suggestions = suggest_join_columns(df1, df2);
    debug!("Join suggestions: {:?}", suggestions);

    let best = suggestions
        .first()
        .cloned()
        .ok_or(JoinerError::NoJoinableColumns)?;

    info!(
        "Joining on ({}, {}) with score {:.2}",
        best.left_column, best.right_column, best.score
    );

    let joined = execute_join(df1, df2, &best)?;

    Ok(JoinOutcome {
        joined,
        best,
        suggestions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross_product_completeness() {
        let df1 = df!("a" => [1i64, 2], "b" => ["x", "y"]).unwrap();
        let df2 = df!(
            "c" => [1i64, 2],
            "d" => ["x", "y"],
            "e" => [0.5f64, 1.5]
        )
        .unwrap();

        let suggestions = suggest_join_columns(&df1, &df2);
        assert_eq!(suggestions.len(), 6);
    }

    #[test]
    fn test_select_fails_on_zero_columns() {
        let empty = DataFrame::empty();
        let df = df!("a" => [1i64, 2]).unwrap();

        assert!(matches!(
            select_best_pair(&empty, &df),
            Err(JoinerError::NoJoinableColumns)
        ));
        assert!(matches!(
            select_best_pair(&df, &empty),
            Err(JoinerError::NoJoinableColumns)
        ));
    }

    #[test]
    fn test_selection_is_deterministic() {
        let df1 = df!("id" => [1i64, 2, 3], "name" => ["a", "b", "c"]).unwrap();
        let df2 = df!("user_id" => [1i64, 2, 3], "email" => ["x", "y", "z"]).unwrap();

        let first = suggest_join_columns(&df1, &df2);
        let second = suggest_join_columns(&df1, &df2);
        assert_eq!(first, second);
    }

    #[test]
    fn test_ties_keep_enumeration_order() {
        // Both pairs score identically (type bonus only), so the
        // first-enumerated right column must win.
        let df1 = df!("x" => [1i64, 2, 3]).unwrap();
        let df2 = df!("aa" => [4i64, 5, 6], "bb" => [7i64, 8, 9]).unwrap();

        let suggestions = suggest_join_columns(&df1, &df2);
        assert_eq!(suggestions[0].score, suggestions[1].score);
        assert_eq!(suggestions[0].right_column, "aa");
        assert_eq!(suggestions[1].right_column, "bb");
    }

    #[test]
    fn test_join_on_differently_named_keys() {
        let df1 = df!("id" => [1i64, 2, 3], "name" => ["a", "b", "c"]).unwrap();
        let df2 = df!("user_id" => [2i64, 3, 4], "email" => ["x", "y", "z"]).unwrap();

        let pair = ScoredPair::new("id", "user_id", 0.0);
        let joined = execute_join(&df1, &df2, &pair).unwrap();
        assert_eq!(joined.height(), 2);
    }

    #[test]
    fn test_collision_suffix_on_non_key_columns() {
        let df1 = df!("id" => [1i64, 2], "value" => ["a", "b"]).unwrap();
        let df2 = df!("id" => [1i64, 2], "value" => ["c", "d"]).unwrap();

        let pair = ScoredPair::new("id", "id", 0.0);
        let joined = execute_join(&df1, &df2, &pair).unwrap();

        let names: Vec<String> = joined
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(names.contains(&"value".to_string()));
        assert!(names.contains(&"value_right".to_string()));
    }

    #[test]
    fn test_null_keys_never_match() {
        let df1 = df!("id" => [Some(1i64), None, Some(3)]).unwrap();
        let df2 = df!("id" => [Some(1i64), None, Some(4)]).unwrap();

        let pair = ScoredPair::new("id", "id", 0.0);
        let joined = execute_join(&df1, &df2, &pair).unwrap();
        assert_eq!(joined.height(), 1);
    }
}
