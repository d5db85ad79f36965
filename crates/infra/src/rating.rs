/// Review aggregation utility.
///
/// A team's or tournament's displayed rating is the arithmetic mean of its
/// current reviews' overall rating, rounded half-up to one decimal. It is
/// recomputed on every read and never stored.
///
/// # Examples
///
/// ```
/// use infra::rating::average_rating;
///
/// assert_eq!(average_rating(&[]), 0.0);
/// assert_eq!(average_rating(&[4, 5]), 4.5);
/// assert_eq!(average_rating(&[3, 3, 4]), 3.3);
/// ```
pub fn average_rating(ratings: &[i16]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }

    let sum: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
    let mean = sum as f64 / ratings.len() as f64;
    round_one_decimal(mean)
}

/// Round half-up to one decimal place. `f64::round` rounds halves away
/// from zero, which for the non-negative means produced here is half-up.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_zero() {
        assert_eq!(average_rating(&[]), 0.0);
    }

    #[test]
    fn basic_means() {
        assert_eq!(average_rating(&[4, 5]), 4.5);
        assert_eq!(average_rating(&[5, 5, 5]), 5.0);
        assert_eq!(average_rating(&[1]), 1.0);
        assert_eq!(average_rating(&[1, 2, 3, 4, 5]), 3.0);
    }

    #[test]
    fn halves_round_up() {
        // 1+2 / 2 = 1.5 exactly at one decimal, no rounding needed;
        // 10/3 = 3.333… rounds down, 11/3 = 3.666… rounds up.
        assert_eq!(average_rating(&[1, 2]), 1.5);
        assert_eq!(average_rating(&[3, 3, 4]), 3.3);
        assert_eq!(average_rating(&[3, 4, 4]), 3.7);
        // 4.45 at the second decimal: 4+4+5+5+4+5+4+4+5+5 run
        assert_eq!(round_one_decimal(4.45), 4.5);
    }

    #[test]
    fn result_stays_in_range() {
        assert_eq!(average_rating(&[1, 1, 1]), 1.0);
        assert_eq!(average_rating(&[5; 100]), 5.0);
        let avg = average_rating(&[1, 5, 2, 4, 3]);
        assert!((0.0..=5.0).contains(&avg));
    }

    #[test]
    fn result_has_one_decimal() {
        for ratings in [&[1, 2, 2][..], &[4, 5][..], &[2, 3, 5, 5][..]] {
            let avg = average_rating(ratings);
            let scaled = avg * 10.0;
            assert!(
                (scaled - scaled.round()).abs() < 1e-9,
                "{avg} is not rounded to one decimal"
            );
        }
    }
}
