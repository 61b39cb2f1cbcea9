//! Title rating aggregation.

/// Mean of `scores` rounded half away from zero, or `None` when empty.
///
/// Matches `ROUND(AVG(score))::INTEGER` in PostgreSQL so both stores report
/// the same rating for the same reviews.
///
/// # Examples
///
/// ```
/// use yamdb_core::rating::average_score;
///
/// assert_eq!(average_score([7, 8]), Some(8));
/// assert_eq!(average_score([7, 7, 8]), Some(7));
/// assert_eq!(average_score(Vec::new()), None);
/// ```
#[must_use]
pub fn average_score<I>(scores: I) -> Option<i32>
where
    I: IntoIterator<Item = i32>,
{
    let (sum, count) = scores
        .into_iter()
        .fold((0_i64, 0_i64), |(sum, count), score| {
            (sum + i64::from(score), count + 1)
        });
    if count == 0 {
        return None;
    }

    let doubled = 2 * sum;
    let rounded = if sum >= 0 {
        (doubled + count) / (2 * count)
    } else {
        (doubled - count) / (2 * count)
    };
    i32::try_from(rounded).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn half_rounds_up() {
        assert_eq!(average_score([1, 2]), Some(2));
        assert_eq!(average_score([9, 10]), Some(10));
        assert_eq!(average_score([5, 6, 6, 5]), Some(6));
    }

    #[test]
    fn below_half_rounds_down() {
        assert_eq!(average_score([1, 1, 2]), Some(1));
    }

    #[test]
    fn single_review_is_its_score() {
        assert_eq!(average_score([3]), Some(3));
    }

    #[test]
    fn negative_half_rounds_away_from_zero() {
        assert_eq!(average_score([-1, -2]), Some(-2));
    }

    proptest! {
        #[test]
        fn matches_rounded_float_mean(scores in prop::collection::vec(1i32..=10, 1..50)) {
            let sum: i32 = scores.iter().sum();
            #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
            let expected = (f64::from(sum) / scores.len() as f64).round() as i32;
            prop_assert_eq!(average_score(scores), Some(expected));
        }

        #[test]
        fn stays_within_score_bounds(scores in prop::collection::vec(1i32..=10, 1..50)) {
            let min = scores.iter().copied().min().unwrap_or(1);
            let max = scores.iter().copied().max().unwrap_or(10);
            let rating = average_score(scores).unwrap_or(0);
            prop_assert!(rating >= min && rating <= max);
        }
    }
}
