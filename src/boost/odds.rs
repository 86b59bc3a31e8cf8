use super::model::{MAX_PROB, MIN_PROB};

/// Fair odds for a win probability, as `"{odds:.2}-1"`.
///
/// The numerator is decimal (`0.18` → `"4.56-1"`), not a traditional
/// fraction like `"9/2"`.
pub fn fair_odds(prob: f64) -> String {
    let p = prob.max(MIN_PROB).min(MAX_PROB);
    let odds = 1.0 / p - 1.0;
    format!("{odds:.2}-1")
}
