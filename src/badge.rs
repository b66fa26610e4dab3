//! Classification of eco badges into display tiers.

/// Display tier for a shopper's eco badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeTier {
    Legend,
    Hero,
    Conscious,
    Beginner,
    /// Unknown badge names and accounts with nothing saved yet.
    Neutral,
}

/// Maps a badge name and lifetime carbon savings onto a display tier.
///
/// Matching is by substring so decorated names ("Certified Eco Legend")
/// still classify. Accounts with non-positive savings are always neutral,
/// whatever their badge says.
///
/// | Badge contains       | Tier      |
/// |----------------------|-----------|
/// | "Eco Legend"         | Legend    |
/// | "Green Hero"         | Hero      |
/// | "Conscious Shopper"  | Conscious |
/// | "Beginner"           | Beginner  |
/// | anything else        | Neutral   |
pub fn classify(badge: &str, carbon_saved: f64) -> BadgeTier {
    if carbon_saved <= 0.0 {
        return BadgeTier::Neutral;
    }

    if badge.contains("Eco Legend") {
        BadgeTier::Legend
    } else if badge.contains("Green Hero") {
        BadgeTier::Hero
    } else if badge.contains("Conscious Shopper") {
        BadgeTier::Conscious
    } else if badge.contains("Beginner") {
        BadgeTier::Beginner
    } else {
        BadgeTier::Neutral
    }
}

impl BadgeTier {
    /// Gradient color stops (`#rrggbb` from/to) the badge chip renders
    /// with.
    pub fn gradient(self) -> (&'static str, &'static str) {
        match self {
            BadgeTier::Legend => ("#eab308", "#f59e0b"),
            BadgeTier::Hero => ("#16a34a", "#22c55e"),
            BadgeTier::Conscious => ("#2563eb", "#3b82f6"),
            BadgeTier::Beginner => ("#65a30d", "#84cc16"),
            BadgeTier::Neutral => ("#4b5563", "#6b7280"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_badges() {
        assert_eq!(classify("Eco Legend", 50.0), BadgeTier::Legend);
        assert_eq!(classify("Green Hero", 20.0), BadgeTier::Hero);
        assert_eq!(classify("Conscious Shopper", 5.0), BadgeTier::Conscious);
        assert_eq!(classify("Beginner", 0.5), BadgeTier::Beginner);
    }

    #[test]
    fn test_classify_matches_substrings() {
        assert_eq!(classify("Certified Eco Legend 2025", 50.0), BadgeTier::Legend);
    }

    #[test]
    fn test_classify_unknown_badge_is_neutral() {
        assert_eq!(classify("Mystery Rank", 10.0), BadgeTier::Neutral);
        assert_eq!(classify("", 10.0), BadgeTier::Neutral);
    }

    #[test]
    fn test_nonpositive_savings_override_badge() {
        assert_eq!(classify("Eco Legend", 0.0), BadgeTier::Neutral);
        assert_eq!(classify("Green Hero", -1.0), BadgeTier::Neutral);
    }

    #[test]
    fn test_each_tier_has_distinct_gradient() {
        let tiers = [
            BadgeTier::Legend,
            BadgeTier::Hero,
            BadgeTier::Conscious,
            BadgeTier::Beginner,
            BadgeTier::Neutral,
        ];

        for (i, a) in tiers.iter().enumerate() {
            for b in &tiers[i + 1..] {
                assert_ne!(a.gradient(), b.gradient());
            }
        }
        assert_eq!(BadgeTier::Hero.gradient(), ("#16a34a", "#22c55e"));
    }
}
