//! Single-bar reversal shapes.
//!
//! Both predicates share the same fixed thresholds: the dominant wick must
//! exceed `LONG_WICK_RATIO` times the body while the opposite wick stays under
//! `SHORT_WICK_RATIO` times the body. A zero body never classifies.

use common::{Bar, PatternKind};

pub const LONG_WICK_RATIO: f64 = 1.8;
pub const SHORT_WICK_RATIO: f64 = 0.6;

/// Long lower wick, small upper wick. Bullish reversal.
pub fn is_hammer(bar: &Bar) -> bool {
    let body = bar.body();
    if body == 0.0 {
        return false;
    }
    bar.lower_wick() > body * LONG_WICK_RATIO && bar.upper_wick() < body * SHORT_WICK_RATIO
}

/// Long upper wick, small lower wick. Bearish reversal.
pub fn is_shooting_star(bar: &Bar) -> bool {
    let body = bar.body();
    if body == 0.0 {
        return false;
    }
    bar.upper_wick() > body * LONG_WICK_RATIO && bar.lower_wick() < body * SHORT_WICK_RATIO
}

/// Classify a bar. Hammer is checked first; Shooting Star only when the
/// bar is not a hammer.
pub fn classify(bar: &Bar) -> Option<PatternKind> {
    if is_hammer(bar) {
        Some(PatternKind::Hammer)
    } else if is_shooting_star(bar) {
        Some(PatternKind::ShootingStar)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn bar(open: f64, high: f64, low: f64, close: f64) -> Bar {
        Bar {
            open_time: Utc::now(),
            open,
            high,
            low,
            close,
            volume: 1.0,
            close_time: Utc::now(),
        }
    }

    #[test]
    fn bullish_hammer_detected() {
        // body 0.2, lower wick 1.0, upper wick 0.05
        let b = bar(10.0, 10.25, 9.0, 10.2);
        assert!(is_hammer(&b));
        assert!(!is_shooting_star(&b));
        assert_eq!(classify(&b), Some(PatternKind::Hammer));
    }

    #[test]
    fn bearish_shooting_star_detected() {
        // body 0.2, upper wick 1.0, lower wick 0.05
        let b = bar(10.0, 11.0, 9.75, 9.8);
        assert!(is_shooting_star(&b));
        assert!(!is_hammer(&b));
        assert_eq!(classify(&b), Some(PatternKind::ShootingStar));
    }

    #[test]
    fn bearish_bodied_hammer_detected() {
        // body 1, lower wick 9, upper wick 0.5
        let b = bar(100.0, 100.5, 90.0, 99.0);
        assert!(is_hammer(&b));
        assert_eq!(classify(&b), Some(PatternKind::Hammer));
    }

    #[test]
    fn upper_wick_too_long_for_hammer() {
        // body 1, lower wick 9, upper wick 1.5 (needs < 0.6)
        let b = bar(100.0, 101.5, 90.0, 99.0);
        assert!(!is_hammer(&b));
        assert_eq!(classify(&b), None);
    }

    #[test]
    fn zero_body_never_classifies() {
        let b = bar(10.0, 12.0, 8.0, 10.0);
        assert!(!is_hammer(&b));
        assert!(!is_shooting_star(&b));
        assert_eq!(classify(&b), None);
    }

    #[test]
    fn thresholds_are_strict() {
        // body 5, lower wick exactly 9 = 1.8 x body: not enough
        let b = bar(20.0, 25.0, 11.0, 25.0);
        assert_eq!(b.lower_wick(), 9.0);
        assert!(!is_hammer(&b));
        // one tick more and it qualifies
        let b = bar(20.0, 25.0, 10.99, 25.0);
        assert!(is_hammer(&b));
    }

    #[test]
    fn plain_bar_has_no_pattern() {
        let b = bar(10.0, 11.5, 9.5, 11.0);
        assert_eq!(classify(&b), None);
    }

    #[test]
    fn classification_is_repeatable() {
        let b = bar(10.0, 10.25, 9.0, 10.2);
        let first = classify(&b);
        for _ in 0..10 {
            assert_eq!(classify(&b), first);
        }
    }
}
