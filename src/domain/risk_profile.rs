//! Risk profiles: volatility tolerance and price-level multipliers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProfileName {
    Aggressive,
    #[default]
    Neutral,
    Conservative,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskProfile {
    pub name: ProfileName,
    pub vol_max: f64,
    pub entry_mult: f64,
    pub target_mult: f64,
    pub stop_mult: f64,
}

const AGGRESSIVE: RiskProfile = RiskProfile {
    name: ProfileName::Aggressive,
    vol_max: 0.08,
    entry_mult: 0.990,
    target_mult: 1.10,
    stop_mult: 0.92,
};

const NEUTRAL: RiskProfile = RiskProfile {
    name: ProfileName::Neutral,
    vol_max: 0.05,
    entry_mult: 0.990,
    target_mult: 1.07,
    stop_mult: 0.95,
};

const CONSERVATIVE: RiskProfile = RiskProfile {
    name: ProfileName::Conservative,
    vol_max: 0.03,
    entry_mult: 0.995,
    target_mult: 1.05,
    stop_mult: 0.97,
};

impl ProfileName {
    pub const ALL: [ProfileName; 3] = [
        ProfileName::Aggressive,
        ProfileName::Neutral,
        ProfileName::Conservative,
    ];

    pub fn params(self) -> RiskProfile {
        match self {
            ProfileName::Aggressive => AGGRESSIVE,
            ProfileName::Neutral => NEUTRAL,
            ProfileName::Conservative => CONSERVATIVE,
        }
    }

    /// Lenient lookup used for persisted and user-supplied names: anything
    /// unrecognised falls back to Neutral.
    pub fn from_name_or_default(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }
}

impl FromStr for ProfileName {
    type Err = String;

    /// Accepts English names and the French labels used by older state files.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "aggressive" | "agressif" => Ok(ProfileName::Aggressive),
            "neutral" | "neutre" => Ok(ProfileName::Neutral),
            "conservative" | "prudent" => Ok(ProfileName::Conservative),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for ProfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProfileName::Aggressive => "Aggressive",
            ProfileName::Neutral => "Neutral",
            ProfileName::Conservative => "Conservative",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_parameters() {
        let p = ProfileName::Neutral.params();
        assert_eq!(p.vol_max, 0.05);
        assert_eq!(p.entry_mult, 0.990);
        assert_eq!(p.target_mult, 1.07);
        assert_eq!(p.stop_mult, 0.95);
    }

    #[test]
    fn all_profiles_bracket_one() {
        for name in ProfileName::ALL {
            let p = name.params();
            assert!(p.stop_mult < 1.0 && 1.0 < p.target_mult, "{}", name);
            assert!(p.stop_mult < p.entry_mult && p.entry_mult < p.target_mult);
            assert!(p.vol_max > 0.0 && p.vol_max < 1.0);
        }
    }

    #[test]
    fn parse_english_and_french() {
        assert_eq!("Aggressive".parse::<ProfileName>(), Ok(ProfileName::Aggressive));
        assert_eq!("prudent".parse::<ProfileName>(), Ok(ProfileName::Conservative));
        assert_eq!(" NEUTRE ".parse::<ProfileName>(), Ok(ProfileName::Neutral));
        assert!("yolo".parse::<ProfileName>().is_err());
    }

    #[test]
    fn unknown_falls_back_to_neutral() {
        assert_eq!(ProfileName::from_name_or_default("yolo"), ProfileName::Neutral);
        assert_eq!(ProfileName::from_name_or_default(""), ProfileName::Neutral);
    }

    #[test]
    fn display_round_trips() {
        for name in ProfileName::ALL {
            assert_eq!(name.to_string().parse::<ProfileName>(), Ok(name));
        }
    }
}
