//! Rating aggregation
//!
//! A title's rating is the arithmetic mean of its review scores,
//! recomputed on read. It is never persisted, so a new review is
//! visible to the very next read without invalidation logic.

/// Mean of review scores; None when there are no reviews (a title with
/// zero reviews has no rating, not a rating of 0)
pub fn mean_score(scores: &[i16]) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }

    let sum: i64 = scores.iter().map(|&s| s as i64).sum();
    Some(sum as f64 / scores.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_of_seven_and_nine_is_eight() {
        assert_eq!(mean_score(&[7, 9]), Some(8.0));
    }

    #[test]
    fn test_empty_has_no_rating() {
        assert_eq!(mean_score(&[]), None);
    }

    #[test]
    fn test_single_score_is_itself() {
        assert_eq!(mean_score(&[3]), Some(3.0));
    }

    #[test]
    fn test_non_integral_mean() {
        assert_eq!(mean_score(&[0, 10, 5]), Some(5.0));
        assert_eq!(mean_score(&[1, 2]), Some(1.5));
    }
}
