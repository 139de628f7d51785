//! Parsing of the /log set syntax

use once_cell::sync::Lazy;
use regex::Regex;

/// Matches: <exercise> <sets>x<reps> @ <weight>[kg|lb] [RPE<x>]
/// e.g. "Bench 3x5 @ 60kg RPE8"
static SET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?P<ex>.+?)\s+(?P<sets>\d+)x(?P<reps>\d+)\s*@\s*(?P<w>\d+(?:\.\d+)?)\s*(?P<unit>kg|lb)?\s*(?:rpe\s*(?P<rpe>\d+(?:\.\d+)?))?$",
    )
    .unwrap()
});

const LB_PER_KG: f64 = 2.20462;

/// A parsed /log entry. Weight is normalized to kilograms.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedSet {
    pub exercise: String,
    pub sets: i32,
    pub reps: i32,
    pub weight_kg: f64,
    pub rpe: Option<f64>,
}

/// Parse a /log argument string. Returns `None` when the text does not
/// match the expected syntax.
pub fn parse_set(text: &str) -> Option<LoggedSet> {
    let caps = SET_RE.captures(text.trim())?;

    let sets: i32 = caps["sets"].parse().ok()?;
    let reps: i32 = caps["reps"].parse().ok()?;
    let mut weight_kg: f64 = caps["w"].parse().ok()?;
    if sets < 1 || reps < 1 {
        return None;
    }
    if caps.name("unit").is_some_and(|u| u.as_str().eq_ignore_ascii_case("lb")) {
        weight_kg = (weight_kg / LB_PER_KG * 10.0).round() / 10.0;
    }
    let rpe = caps.name("rpe").and_then(|m| m.as_str().parse().ok());

    Some(LoggedSet {
        exercise: title_case(caps["ex"].trim()),
        sets,
        reps,
        weight_kg,
        rpe,
    })
}

/// Capitalize the first letter of each word, lowercasing the rest.
fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_syntax() {
        let set = parse_set("bench press 3x5 @ 60kg RPE8").unwrap();
        assert_eq!(set.exercise, "Bench Press");
        assert_eq!(set.sets, 3);
        assert_eq!(set.reps, 5);
        assert_eq!(set.weight_kg, 60.0);
        assert_eq!(set.rpe, Some(8.0));
    }

    #[test]
    fn test_minimal_syntax() {
        let set = parse_set("Squat 5x5 @ 100").unwrap();
        assert_eq!(set.exercise, "Squat");
        assert_eq!(set.weight_kg, 100.0);
        assert_eq!(set.rpe, None);
    }

    #[test]
    fn test_decimal_weight_and_rpe() {
        let set = parse_set("ohp 3x8 @ 42.5kg rpe7.5").unwrap();
        assert_eq!(set.weight_kg, 42.5);
        assert_eq!(set.rpe, Some(7.5));
    }

    #[test]
    fn test_pounds_are_converted() {
        let set = parse_set("Deadlift 1x5 @ 225lb").unwrap();
        assert_eq!(set.weight_kg, 102.1);
    }

    #[test]
    fn test_invalid_input_rejected() {
        assert!(parse_set("").is_none());
        assert!(parse_set("just some words").is_none());
        assert!(parse_set("bench 3x5").is_none());
        assert!(parse_set("bench 0x5 @ 60").is_none());
    }
}
