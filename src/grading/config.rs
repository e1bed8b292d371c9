use serde::{Deserialize, Serialize};

use super::error::GradeError;
use super::sections::{Section, SectionRange};
use super::validation::validate_grading;

/// Attendance is entered as a percentage and scaled to points afterwards.
pub const ATTENDANCE_PERCENT_RANGE: SectionRange = SectionRange {
    min: 0.0,
    max: 100.0,
};

// Maxima for sections the document may leave out.
const DEFAULT_QUIZ_MAX: f64 = 15.0;
const DEFAULT_MIDTERM_MAX: f64 = 25.0;
const DEFAULT_PRESENTATION_MAX: f64 = 8.0;
const DEFAULT_ASSIGNMENT_MAX: f64 = 5.0;

/// Grading document as fetched from disk or over HTTP.
///
/// Everything is optional at the serde level so that validation can report
/// every missing field in one pass instead of failing on the first.
///
/// Example JSON:
/// ```json
/// {
///   "thresholds": { "pass": 40, "a_plus": 80 },
///   "sections": { "attendance": { "max": 7 }, "final": { "max": 40 } },
///   "gradingScale": [
///     { "name": "A+", "min": 80, "remarks": "Outstanding", "color": "#10b981" },
///     { "name": "D", "min": 40, "remarks": "Pass", "color": "#78350f" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GradingDocument {
    #[serde(default)]
    pub thresholds: Option<Thresholds>,

    #[serde(default)]
    pub sections: Option<SectionsDocument>,

    /// Ordered by `min` descending; first match wins on lookup.
    #[serde(default, rename = "gradingScale", alias = "grading_scale")]
    pub grading_scale: Option<Vec<GradeBand>>,

    /// Replaces the implicit "F (Fail)" band below the scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failing: Option<GradeBand>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Thresholds {
    #[serde(default)]
    pub pass: Option<f64>,
    #[serde(default)]
    pub a_plus: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SectionsDocument {
    /// Applies to each of the three quizzes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz: Option<SectionLimit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub midterm: Option<SectionLimit>,
    /// Attendance points awarded at 100%.
    #[serde(default)]
    pub attendance: Option<SectionLimit>,
    #[serde(default, rename = "final")]
    pub final_exam: Option<SectionLimit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presentation: Option<SectionLimit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment: Option<SectionLimit>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SectionLimit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl SectionLimit {
    pub fn with_max(max: f64) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    fn range_or(&self, default_max: f64) -> SectionRange {
        SectionRange::new(self.min.unwrap_or(0.0), self.max.unwrap_or(default_max))
    }
}

/// One tier of the grading scale.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GradeBand {
    pub name: String,
    pub min: f64,
    #[serde(default)]
    pub remarks: String,
    /// CSS-style `#rrggbb`
    #[serde(default)]
    pub color: String,
}

impl GradeBand {
    pub fn new(name: &str, min: f64, remarks: &str, color: &str) -> Self {
        Self {
            name: name.to_string(),
            min,
            remarks: remarks.to_string(),
            color: color.to_string(),
        }
    }

    /// The band used when no configured band matches.
    pub fn implicit_fail() -> Self {
        Self::new("F", 0.0, "Fail", "#ef4444")
    }

    /// "A+ (Outstanding)", or just the name when there are no remarks.
    pub fn display_label(&self) -> String {
        if self.remarks.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.remarks)
        }
    }

    pub fn rgb(&self) -> Option<(u8, u8, u8)> {
        parse_hex_color(&self.color)
    }
}

pub fn parse_hex_color(s: &str) -> Option<(u8, u8, u8)> {
    let hex = s.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

impl GradingDocument {
    /// The UGC uniform grading scale with a 40-mark final and 7 attendance points.
    pub fn standard() -> Self {
        Self {
            thresholds: Some(Thresholds {
                pass: Some(40.0),
                a_plus: Some(80.0),
            }),
            sections: Some(SectionsDocument {
                quiz: Some(SectionLimit::with_max(DEFAULT_QUIZ_MAX)),
                midterm: Some(SectionLimit::with_max(DEFAULT_MIDTERM_MAX)),
                attendance: Some(SectionLimit::with_max(7.0)),
                final_exam: Some(SectionLimit::with_max(40.0)),
                presentation: Some(SectionLimit::with_max(DEFAULT_PRESENTATION_MAX)),
                assignment: Some(SectionLimit::with_max(DEFAULT_ASSIGNMENT_MAX)),
            }),
            grading_scale: Some(vec![
                GradeBand::new("A+", 80.0, "Outstanding", "#10b981"),
                GradeBand::new("A", 75.0, "Excellent", "#34d399"),
                GradeBand::new("A-", 70.0, "Very Good", "#6ee7b7"),
                GradeBand::new("B+", 65.0, "Good", "#f59e0b"),
                GradeBand::new("B", 60.0, "Satisfactory", "#fbbf24"),
                GradeBand::new("B-", 55.0, "Above Average", "#fcd34d"),
                GradeBand::new("C+", 50.0, "Average", "#d97706"),
                GradeBand::new("C", 45.0, "Below Average", "#b45309"),
                GradeBand::new("D", 40.0, "Pass", "#78350f"),
            ]),
            failing: None,
        }
    }
}

/// Resolved per-section input ranges.
#[derive(Debug, Clone, PartialEq)]
struct SectionLimits {
    quiz: SectionRange,
    midterm: SectionRange,
    attendance_points: f64,
    final_exam: SectionRange,
    presentation: SectionRange,
    assignment: SectionRange,
}

/// Validated, immutable grading configuration.
///
/// Only constructible from a document that passed [`validate_grading`], so the
/// scale is always sorted by `min` descending with unique minimums.
#[derive(Debug, Clone, PartialEq)]
pub struct GradingConfig {
    pass: f64,
    a_plus: f64,
    limits: SectionLimits,
    scale: Vec<GradeBand>,
    failing: GradeBand,
}

impl GradingConfig {
    pub fn from_document(doc: GradingDocument) -> Result<Self, GradeError> {
        validate_grading(&doc).map_err(GradeError::InvalidConfig)?;

        // Presence of every field below was checked by validation.
        let thresholds = doc.thresholds.unwrap_or_default();
        let sections = doc.sections.unwrap_or_default();
        let attendance = sections.attendance.unwrap_or_default();
        let final_exam = sections.final_exam.unwrap_or_default();

        let limits = SectionLimits {
            quiz: sections.quiz.unwrap_or_default().range_or(DEFAULT_QUIZ_MAX),
            midterm: sections
                .midterm
                .unwrap_or_default()
                .range_or(DEFAULT_MIDTERM_MAX),
            attendance_points: attendance.max.unwrap_or_default(),
            final_exam: final_exam.range_or(0.0),
            presentation: sections
                .presentation
                .unwrap_or_default()
                .range_or(DEFAULT_PRESENTATION_MAX),
            assignment: sections
                .assignment
                .unwrap_or_default()
                .range_or(DEFAULT_ASSIGNMENT_MAX),
        };

        Ok(Self {
            pass: thresholds.pass.unwrap_or_default(),
            a_plus: thresholds.a_plus.unwrap_or_default(),
            limits,
            scale: doc.grading_scale.unwrap_or_default(),
            failing: doc.failing.unwrap_or_else(GradeBand::implicit_fail),
        })
    }

    /// Standard scale, already validated.
    pub fn standard() -> Self {
        Self {
            pass: 40.0,
            a_plus: 80.0,
            limits: SectionLimits {
                quiz: SectionRange::new(0.0, DEFAULT_QUIZ_MAX),
                midterm: SectionRange::new(0.0, DEFAULT_MIDTERM_MAX),
                attendance_points: 7.0,
                final_exam: SectionRange::new(0.0, 40.0),
                presentation: SectionRange::new(0.0, DEFAULT_PRESENTATION_MAX),
                assignment: SectionRange::new(0.0, DEFAULT_ASSIGNMENT_MAX),
            },
            scale: GradingDocument::standard().grading_scale.unwrap_or_default(),
            failing: GradeBand::implicit_fail(),
        }
    }

    pub fn pass(&self) -> f64 {
        self.pass
    }

    pub fn a_plus(&self) -> f64 {
        self.a_plus
    }

    pub fn scale(&self) -> &[GradeBand] {
        &self.scale
    }

    pub fn failing(&self) -> &GradeBand {
        &self.failing
    }

    /// Points awarded for full attendance.
    pub fn attendance_max(&self) -> f64 {
        self.limits.attendance_points
    }

    pub fn final_max(&self) -> f64 {
        self.limits.final_exam.max
    }

    /// Accepted range for the raw value typed into a section.
    pub fn input_range(&self, section: Section) -> SectionRange {
        match section {
            Section::Quiz1 | Section::Quiz2 | Section::Quiz3 => self.limits.quiz,
            Section::Midterm => self.limits.midterm,
            Section::Attendance => ATTENDANCE_PERCENT_RANGE,
            Section::Final => self.limits.final_exam,
            Section::Presentation => self.limits.presentation,
            Section::Assignment => self.limits.assignment,
        }
    }

    /// Maximum points a section can contribute to the total.
    pub fn points_max(&self, section: Section) -> f64 {
        match section {
            Section::Attendance => self.limits.attendance_points,
            other => self.input_range(other).max,
        }
    }

    /// First band whose minimum is at or below `total`, else the failing band.
    pub fn lookup(&self, total: f64) -> &GradeBand {
        self.scale
            .iter()
            .find(|band| band.min <= total)
            .unwrap_or(&self.failing)
    }

    /// Bands at or above the pass threshold, in scale order.
    pub fn target_bands(&self) -> impl Iterator<Item = &GradeBand> {
        let pass = self.pass;
        self.scale.iter().filter(move |band| band.min >= pass)
    }
}
