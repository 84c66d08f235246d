//! Password strength heuristic
//!
//! Display only; it never blocks a signup.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StrengthTier {
    Weak,
    Medium,
    Strong,
}

impl StrengthTier {
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=2 => StrengthTier::Weak,
            3..=4 => StrengthTier::Medium,
            _ => StrengthTier::Strong,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StrengthTier::Weak => "Weak",
            StrengthTier::Medium => "Medium",
            StrengthTier::Strong => "Strong",
        }
    }
}

impl fmt::Display for StrengthTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One point each for length >= 6, length >= 10, an uppercase letter, a
/// digit, and a character outside `[A-Za-z0-9]`.
pub fn score(password: &str) -> u8 {
    let len = password.chars().count();
    [
        len >= 6,
        len >= 10,
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| !c.is_ascii_alphanumeric()),
    ]
    .into_iter()
    .filter(|hit| *hit)
    .count() as u8
}

/// Tier for the indicator, `None` for an empty password (indicator hidden)
pub fn evaluate(password: &str) -> Option<StrengthTier> {
    if password.is_empty() {
        return None;
    }
    Some(StrengthTier::from_score(score(password)))
}
