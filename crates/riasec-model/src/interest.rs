use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the six Holland (RIASEC) interest areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InterestArea {
    Realistic,
    Investigative,
    Artistic,
    Social,
    Enterprising,
    Conventional,
}

impl InterestArea {
    /// All six areas in canonical R-I-A-S-E-C order.
    pub const ALL: [InterestArea; 6] = [
        InterestArea::Realistic,
        InterestArea::Investigative,
        InterestArea::Artistic,
        InterestArea::Social,
        InterestArea::Enterprising,
        InterestArea::Conventional,
    ];

    /// Full name, as used in O*NET OnLine URL path segments.
    pub fn name(self) -> &'static str {
        match self {
            InterestArea::Realistic => "Realistic",
            InterestArea::Investigative => "Investigative",
            InterestArea::Artistic => "Artistic",
            InterestArea::Social => "Social",
            InterestArea::Enterprising => "Enterprising",
            InterestArea::Conventional => "Conventional",
        }
    }

    pub fn letter(self) -> char {
        match self {
            InterestArea::Realistic => 'R',
            InterestArea::Investigative => 'I',
            InterestArea::Artistic => 'A',
            InterestArea::Social => 'S',
            InterestArea::Enterprising => 'E',
            InterestArea::Conventional => 'C',
        }
    }
}

impl fmt::Display for InterestArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown interest area '{0}' (expected a RIASEC name or letter)")]
pub struct UnknownInterestArea(pub String);

impl FromStr for InterestArea {
    type Err = UnknownInterestArea;

    /// Accepts the full name or the single letter, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        InterestArea::ALL
            .into_iter()
            .find(|area| {
                area.name().eq_ignore_ascii_case(trimmed)
                    || (trimmed.len() == 1
                        && trimmed.eq_ignore_ascii_case(&area.letter().to_string()))
            })
            .ok_or_else(|| UnknownInterestArea(trimmed.to_string()))
    }
}

/// Parse a comma-separated list such as `"R,I,A"` or `"Realistic, Social"`.
pub fn parse_interest_areas(list: &str) -> Result<Vec<InterestArea>, UnknownInterestArea> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_name_and_letter() {
        assert_eq!("Realistic".parse(), Ok(InterestArea::Realistic));
        assert_eq!("social".parse(), Ok(InterestArea::Social));
        assert_eq!("c".parse(), Ok(InterestArea::Conventional));
        assert_eq!(" E ".parse(), Ok(InterestArea::Enterprising));
        assert!("Artsy".parse::<InterestArea>().is_err());
    }

    #[test]
    fn test_parse_list() {
        let areas = parse_interest_areas("R, I,Artistic").unwrap();
        assert_eq!(
            areas,
            vec![InterestArea::Realistic, InterestArea::Investigative, InterestArea::Artistic]
        );
        assert_eq!(
            parse_interest_areas("R,X"),
            Err(UnknownInterestArea("X".to_string()))
        );
    }

    #[test]
    fn test_letters_spell_riasec() {
        let letters: String = InterestArea::ALL.iter().map(|a| a.letter()).collect();
        assert_eq!(letters, "RIASEC");
    }
}
