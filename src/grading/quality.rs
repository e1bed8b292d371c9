use anyhow::{bail, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::sections::Section;

/// Categorical mark for sections graded by impression rather than points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Poor,
    Good,
    Excellent,
}

impl Quality {
    pub const ALL: [Quality; 3] = [Quality::Poor, Quality::Good, Quality::Excellent];

    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "poor" | "p" => Ok(Quality::Poor),
            "good" | "g" => Ok(Quality::Good),
            "excellent" | "e" => Ok(Quality::Excellent),
            other => bail!("Quality must be poor, good or excellent: {}", other),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Quality::Poor => "Poor",
            Quality::Good => "Good",
            Quality::Excellent => "Excellent",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Quality::Poor => Quality::Good,
            Quality::Good => Quality::Excellent,
            Quality::Excellent => Quality::Poor,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Quality::Poor => Quality::Excellent,
            Quality::Good => Quality::Poor,
            Quality::Excellent => Quality::Good,
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Sections whose score comes from a quality selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualitySection {
    Presentation,
    Assignment,
}

impl QualitySection {
    pub fn section(self) -> Section {
        match self {
            QualitySection::Presentation => Section::Presentation,
            QualitySection::Assignment => Section::Assignment,
        }
    }

    pub fn from_section(section: Section) -> Option<Self> {
        match section {
            Section::Presentation => Some(QualitySection::Presentation),
            Section::Assignment => Some(QualitySection::Assignment),
            _ => None,
        }
    }

    /// Resolve a quality to a score using the thread-local RNG.
    pub fn resolve(self, quality: Quality) -> f64 {
        self.resolve_with(quality, &mut rand::rng())
    }

    /// Resolve a quality to a score.
    ///
    /// Presentation "excellent" draws 7 or 8 with equal odds on every call;
    /// all other combinations are fixed.
    pub fn resolve_with<R: Rng + ?Sized>(self, quality: Quality, rng: &mut R) -> f64 {
        match (self, quality) {
            (QualitySection::Presentation, Quality::Poor) => 5.0,
            (QualitySection::Presentation, Quality::Good) => 6.0,
            (QualitySection::Presentation, Quality::Excellent) => {
                if rng.random_bool(0.5) {
                    7.0
                } else {
                    8.0
                }
            }
            (QualitySection::Assignment, Quality::Poor) => 3.0,
            (QualitySection::Assignment, Quality::Good) => 4.0,
            (QualitySection::Assignment, Quality::Excellent) => 5.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_parse_quality() {
        assert_eq!(Quality::parse("poor").unwrap(), Quality::Poor);
        assert_eq!(Quality::parse(" Good ").unwrap(), Quality::Good);
        assert_eq!(Quality::parse("E").unwrap(), Quality::Excellent);
        assert!(Quality::parse("great").is_err());
    }

    #[test]
    fn test_cycle_quality() {
        assert_eq!(Quality::Poor.next(), Quality::Good);
        assert_eq!(Quality::Excellent.next(), Quality::Poor);
        assert_eq!(Quality::Poor.previous(), Quality::Excellent);
    }

    #[test]
    fn test_presentation_fixed_scores() {
        let mut rng = StdRng::seed_from_u64(1);
        let section = QualitySection::Presentation;
        assert_eq!(section.resolve_with(Quality::Poor, &mut rng), 5.0);
        assert_eq!(section.resolve_with(Quality::Good, &mut rng), 6.0);
    }

    #[test]
    fn test_assignment_scores_are_deterministic() {
        let section = QualitySection::Assignment;
        assert_eq!(section.resolve(Quality::Poor), 3.0);
        assert_eq!(section.resolve(Quality::Good), 4.0);
        for _ in 0..20 {
            assert_eq!(section.resolve(Quality::Excellent), 5.0);
        }
    }

    #[test]
    fn test_presentation_excellent_draws_seven_or_eight() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen_seven = false;
        let mut seen_eight = false;
        for _ in 0..200 {
            let score = QualitySection::Presentation.resolve_with(Quality::Excellent, &mut rng);
            assert!(score == 7.0 || score == 8.0);
            seen_seven |= score == 7.0;
            seen_eight |= score == 8.0;
        }
        assert!(seen_seven && seen_eight);
    }

    #[test]
    fn test_section_mapping() {
        assert_eq!(QualitySection::Presentation.section(), Section::Presentation);
        assert_eq!(
            QualitySection::from_section(Section::Assignment),
            Some(QualitySection::Assignment)
        );
        assert_eq!(QualitySection::from_section(Section::Final), None);
    }
}
