/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Rounds to a fixed number of decimal places, halves to even.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// Rounds to the nearest integer, halves to even.
pub fn round_to_int(value: f64) -> i64 {
    value.round_ties_even() as i64
}

/// Divides, returning 0.0 when the divisor is not strictly positive.
pub fn guarded_div(numerator: f64, divisor: f64) -> f64 {
    if divisor > 0.0 { numerator / divisor } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_empty() {
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_mean_values() {
        assert_eq!(mean(&[2.5, 3.5]), 3.0);
        assert_eq!(mean(&[4.0, 4.0, 7.0]), 5.0);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(2.86851, 4), 2.8685);
        assert_eq!(round_to(10.84, 1), 10.8);
        assert_eq!(round_to(-1.25, 0), -1.0);
    }

    #[test]
    fn test_round_to_ties_even() {
        assert_eq!(round_to(6.25, 1), 6.2);
        assert_eq!(round_to(0.125, 2), 0.12);
        assert_eq!(round_to(6.5, 1), 6.5);
    }

    #[test]
    fn test_round_to_int_ties_even() {
        assert_eq!(round_to_int(2.5), 2);
        assert_eq!(round_to_int(3.5), 4);
        assert_eq!(round_to_int(5.4), 5);
        assert_eq!(round_to_int(21.78), 22);
    }

    #[test]
    fn test_guarded_div() {
        assert_eq!(guarded_div(1.0, 0.0), 0.0);
        assert_eq!(guarded_div(1.0, -2.0), 0.0);
        assert_eq!(guarded_div(1.0, 4.0), 0.25);
    }
}
