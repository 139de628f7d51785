//! Tips module - short coaching advice for reminders and /ask fallback

use rand::seq::SliceRandom;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TipCategory {
    Motivation,
    Nutrition,
    Training,
    Technique,
    Recovery,
}

impl TipCategory {
    pub fn emoji(&self) -> &'static str {
        match self {
            TipCategory::Motivation => "💪",
            TipCategory::Nutrition => "🥗",
            TipCategory::Training => "🏋️",
            TipCategory::Technique => "📐",
            TipCategory::Recovery => "😴",
        }
    }
}

pub struct Tip {
    pub category: TipCategory,
    pub text: &'static str,
}

pub static TIPS: &[Tip] = &[
    Tip {
        category: TipCategory::Motivation,
        text: "Consistency beats intensity. Three average workouts a week outwork one heroic session a month.",
    },
    Tip {
        category: TipCategory::Motivation,
        text: "Short on time? 30 focused minutes still move the needle. Showing up is the hard part.",
    },
    Tip {
        category: TipCategory::Motivation,
        text: "Track your sets. Watching the numbers creep up is the best motivation there is.",
    },
    Tip {
        category: TipCategory::Training,
        text: "Progressive overload: add a rep or a little weight each week, not both at once.",
    },
    Tip {
        category: TipCategory::Training,
        text: "Start sessions with the heaviest compound lift while you are fresh.",
    },
    Tip {
        category: TipCategory::Training,
        text: "Warm up with lighter sets of your first exercise instead of long cardio.",
    },
    Tip {
        category: TipCategory::Training,
        text: "Stalled on a lift for two sessions? Drop the weight 10% and build back up.",
    },
    Tip {
        category: TipCategory::Technique,
        text: "Full range of motion with less weight builds more muscle than half reps with more.",
    },
    Tip {
        category: TipCategory::Technique,
        text: "Brace your core before every heavy pull. A neutral spine is non-negotiable.",
    },
    Tip {
        category: TipCategory::Technique,
        text: "Control the lowering half of every rep. Two seconds down pays off.",
    },
    Tip {
        category: TipCategory::Nutrition,
        text: "Protein with every meal makes hitting your daily target almost automatic.",
    },
    Tip {
        category: TipCategory::Nutrition,
        text: "Hydrate before you feel thirsty. Even mild dehydration costs you reps.",
    },
    Tip {
        category: TipCategory::Nutrition,
        text: "Eat something with carbs and protein within a couple of hours after training.",
    },
    Tip {
        category: TipCategory::Recovery,
        text: "Muscles grow between sessions, not during them. Guard your sleep like a set PR.",
    },
    Tip {
        category: TipCategory::Recovery,
        text: "A rest day is training too. Two hard days in a row for the same muscles rarely helps.",
    },
    Tip {
        category: TipCategory::Recovery,
        text: "Feeling beat up? Swap a heavy day for a light technique session instead of skipping.",
    },
];

/// A random tip for reminders and small talk.
pub fn random_tip() -> &'static Tip {
    let mut rng = rand::thread_rng();
    TIPS.choose(&mut rng).expect("TIPS is non-empty")
}

/// Canned advice used when the AI coach is unavailable.
pub fn fallback_advice() -> &'static str {
    "My quick take: stay consistent, use good form, progressive overload. \
     For specific advice, consider consulting a certified personal trainer."
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tips_are_non_empty() {
        assert!(!TIPS.is_empty());
        for tip in TIPS {
            assert!(!tip.text.is_empty());
        }
    }

    #[test]
    fn test_random_tip_returns_known_tip() {
        let tip = random_tip();
        assert!(TIPS.iter().any(|t| std::ptr::eq(t, tip)));
    }

    #[test]
    fn test_every_category_has_a_tip() {
        for cat in [
            TipCategory::Motivation,
            TipCategory::Nutrition,
            TipCategory::Training,
            TipCategory::Technique,
            TipCategory::Recovery,
        ] {
            assert!(TIPS.iter().any(|t| t.category == cat), "{cat:?} missing");
            assert!(!cat.emoji().is_empty());
        }
    }
}
