//! Progression rules for suggesting the next training load

/// Suggested weight for the next session of an exercise. Successful
/// sessions progress by 2.5 kg on low-rep strength work and 2.0 kg
/// otherwise; failed sessions repeat the load. 20 kg is the starting
/// suggestion when there is no history.
pub fn next_load(current_weight: Option<f64>, success: bool, rep_goal: i32) -> f64 {
    let Some(weight) = current_weight else {
        return 20.0;
    };
    if !success {
        return weight;
    }
    let jump = if rep_goal <= 6 { 2.5 } else { 2.0 };
    ((weight + jump) * 10.0).round() / 10.0
}

/// Two failed sessions in a row call for a deload.
pub fn should_deload(fails_in_row: u32) -> bool {
    fails_in_row >= 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_session_suggestion() {
        assert_eq!(next_load(None, true, 5), 20.0);
        assert_eq!(next_load(None, false, 5), 20.0);
    }

    #[test]
    fn test_successful_low_rep_jump() {
        assert_eq!(next_load(Some(100.0), true, 5), 102.5);
        assert_eq!(next_load(Some(100.0), true, 6), 102.5);
    }

    #[test]
    fn test_successful_high_rep_jump() {
        assert_eq!(next_load(Some(40.0), true, 10), 42.0);
    }

    #[test]
    fn test_failure_repeats_load() {
        assert_eq!(next_load(Some(80.0), false, 5), 80.0);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(next_load(Some(62.3), true, 8), 64.3);
    }

    #[test]
    fn test_should_deload() {
        assert!(!should_deload(0));
        assert!(!should_deload(1));
        assert!(should_deload(2));
        assert!(should_deload(3));
    }
}
