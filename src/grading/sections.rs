use serde::{Deserialize, Serialize};
use std::fmt;

/// One assessment component of the course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Quiz1,
    Quiz2,
    Quiz3,
    Midterm,
    Attendance,
    Final,
    Presentation,
    Assignment,
}

impl Section {
    /// Form order: numeric inputs first, quality-selected sections last.
    pub const ALL: [Section; 8] = [
        Section::Quiz1,
        Section::Quiz2,
        Section::Quiz3,
        Section::Midterm,
        Section::Attendance,
        Section::Final,
        Section::Presentation,
        Section::Assignment,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Section::Quiz1 => "Quiz 1",
            Section::Quiz2 => "Quiz 2",
            Section::Quiz3 => "Quiz 3",
            Section::Midterm => "Mid-term",
            Section::Attendance => "Attendance %",
            Section::Final => "Final Exam",
            Section::Presentation => "Presentation",
            Section::Assignment => "Assignment",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which side of a range a value fell out of, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClampOutcome {
    InRange,
    AboveMax,
    BelowMin,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clamped {
    pub value: f64,
    pub outcome: ClampOutcome,
}

/// Inclusive input range of a section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionRange {
    pub min: f64,
    pub max: f64,
}

impl SectionRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, value: f64) -> Clamped {
        if value > self.max {
            Clamped {
                value: self.max,
                outcome: ClampOutcome::AboveMax,
            }
        } else if value < self.min {
            Clamped {
                value: self.min,
                outcome: ClampOutcome::BelowMin,
            }
        } else {
            Clamped {
                value,
                outcome: ClampOutcome::InRange,
            }
        }
    }
}

/// Parse a raw form value. Empty or unparseable text counts as absent.
pub fn parse_mark(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Plain snapshot of the eight raw section values handed to the engine.
///
/// Absent or non-finite values contribute 0. Presentation and assignment hold the score
/// already resolved by the quality selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreSheet {
    pub quiz1: Option<f64>,
    pub quiz2: Option<f64>,
    pub quiz3: Option<f64>,
    pub midterm: Option<f64>,
    /// Attendance percentage (0-100), not points.
    pub attendance: Option<f64>,
    pub final_exam: Option<f64>,
    pub presentation: Option<f64>,
    pub assignment: Option<f64>,
}

impl ScoreSheet {
    pub fn get(&self, section: Section) -> Option<f64> {
        match section {
            Section::Quiz1 => self.quiz1,
            Section::Quiz2 => self.quiz2,
            Section::Quiz3 => self.quiz3,
            Section::Midterm => self.midterm,
            Section::Attendance => self.attendance,
            Section::Final => self.final_exam,
            Section::Presentation => self.presentation,
            Section::Assignment => self.assignment,
        }
    }

    pub fn set(&mut self, section: Section, value: Option<f64>) {
        let slot = match section {
            Section::Quiz1 => &mut self.quiz1,
            Section::Quiz2 => &mut self.quiz2,
            Section::Quiz3 => &mut self.quiz3,
            Section::Midterm => &mut self.midterm,
            Section::Attendance => &mut self.attendance,
            Section::Final => &mut self.final_exam,
            Section::Presentation => &mut self.presentation,
            Section::Assignment => &mut self.assignment,
        };
        *slot = value;
    }
}
