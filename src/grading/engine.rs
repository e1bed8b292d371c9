use serde::Serialize;
use std::fmt;

use super::config::{GradeBand, GradingConfig};
use super::sections::{ScoreSheet, Section};

/// Whether the final exam has been entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Final empty: report marks still needed per band.
    Prediction,
    /// Final entered: report achieved/missed per band.
    Result,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "marks", rename_all = "snake_case")]
pub enum TargetStatus {
    Achieved,
    Missed,
    /// Whole marks still needed in the final.
    Needed(u32),
    /// The final alone cannot close the gap.
    Impossible,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetRow {
    pub band: GradeBand,
    pub status: TargetStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextTarget {
    pub band: String,
    pub amount: u32,
}

/// One-line verdict shown under the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum Summary {
    Need { amount: u32, band: String },
    MaxAchieved,
    GradeLocked,
    RetakeRequired,
    ResultsLocked,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Summary::Need { amount, band } => write!(f, "Need {} for {}", amount, band),
            Summary::MaxAchieved => f.write_str("Max Grade Achieved!"),
            Summary::GradeLocked => f.write_str("Grade Locked"),
            Summary::RetakeRequired => f.write_str("Retake Required"),
            Summary::ResultsLocked => f.write_str("Final Results Locked"),
        }
    }
}

impl From<Summary> for String {
    fn from(summary: Summary) -> Self {
        summary.to_string()
    }
}

/// Points each section contributes after clamping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Breakdown {
    pub quiz_average: f64,
    pub attendance_points: f64,
    pub presentation: f64,
    pub assignment: f64,
    pub midterm: f64,
    pub final_exam: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationResult {
    pub breakdown: Breakdown,
    pub total: f64,
    pub pre_final_total: f64,
    pub mode: Mode,
    pub grade: GradeBand,
    pub targets: Vec<TargetRow>,
    pub next_target: Option<NextTarget>,
    pub summary: Summary,
}

pub fn compute_result(
    scores: &ScoreSheet,
    config: &GradingConfig,
    final_entered: bool,
) -> CalculationResult {
    // Absent or non-finite values contribute 0; only present values are clamped
    let points = |section: Section| -> f64 {
        scores
            .get(section)
            .filter(|v| v.is_finite())
            .map_or(0.0, |v| config.input_range(section).clamp(v).value)
    };

    // The average is used as points as-is, without rescaling to a section max
    let quiz_sum = points(Section::Quiz1) + points(Section::Quiz2) + points(Section::Quiz3);
    let quiz_average = quiz_sum / 3.0;
    let attendance_points = (points(Section::Attendance) / 100.0) * config.attendance_max();

    let breakdown = Breakdown {
        quiz_average,
        attendance_points,
        presentation: points(Section::Presentation),
        assignment: points(Section::Assignment),
        midterm: points(Section::Midterm),
        final_exam: points(Section::Final),
    };

    let total = breakdown.quiz_average
        + breakdown.attendance_points
        + breakdown.presentation
        + breakdown.assignment
        + breakdown.midterm
        + breakdown.final_exam;
    let pre_final_total = total - breakdown.final_exam;

    let grade = config.lookup(total).clone();
    let mode = if final_entered {
        Mode::Result
    } else {
        Mode::Prediction
    };

    let mut next_target: Option<NextTarget> = None;
    let targets: Vec<TargetRow> = config
        .target_bands()
        .map(|band| {
            let status = match mode {
                Mode::Result => {
                    if total >= band.min {
                        TargetStatus::Achieved
                    } else {
                        TargetStatus::Missed
                    }
                }
                Mode::Prediction => {
                    let needed = band.min - pre_final_total;
                    if needed <= 0.0 {
                        TargetStatus::Achieved
                    } else if needed > config.final_max() {
                        TargetStatus::Impossible
                    } else {
                        let amount = needed.ceil() as u32;
                        // Strict less-than keeps the first band on ties
                        if next_target.as_ref().map_or(true, |t| amount < t.amount) {
                            next_target = Some(NextTarget {
                                band: band.name.clone(),
                                amount,
                            });
                        }
                        TargetStatus::Needed(amount)
                    }
                }
            };
            TargetRow {
                band: band.clone(),
                status,
            }
        })
        .collect();

    let summary = match (mode, &next_target) {
        (Mode::Result, _) => Summary::ResultsLocked,
        (Mode::Prediction, Some(target)) => Summary::Need {
            amount: target.amount,
            band: target.band.clone(),
        },
        (Mode::Prediction, None) if pre_final_total >= config.a_plus() => Summary::MaxAchieved,
        (Mode::Prediction, None) if pre_final_total >= config.pass() => Summary::GradeLocked,
        (Mode::Prediction, None) => Summary::RetakeRequired,
    };

    CalculationResult {
        breakdown,
        total,
        pre_final_total,
        mode,
        grade,
        targets,
        next_target,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::config::{GradingDocument, SectionLimit};

    fn scenario_a() -> ScoreSheet {
        ScoreSheet {
            quiz1: Some(10.0),
            quiz2: Some(10.0),
            quiz3: Some(10.0),
            midterm: Some(15.0),
            attendance: Some(100.0),
            final_exam: None,
            presentation: Some(6.0),
            assignment: Some(4.0),
        }
    }

    fn status_of<'a>(result: &'a CalculationResult, name: &str) -> &'a TargetStatus {
        &result
            .targets
            .iter()
            .find(|row| row.band.name == name)
            .unwrap()
            .status
    }

    /// Two-band scale with adjustable final and midterm maxima.
    fn narrow_config(final_max: f64, midterm_max: f64) -> GradingConfig {
        let mut doc = GradingDocument::standard();
        if let Some(sections) = doc.sections.as_mut() {
            sections.final_exam = Some(SectionLimit {
                min: None,
                max: Some(final_max),
            });
            sections.midterm = Some(SectionLimit {
                min: None,
                max: Some(midterm_max),
            });
        }
        if let Some(scale) = doc.grading_scale.as_mut() {
            scale.retain(|b| b.name == "A+" || b.name == "D");
        }
        GradingConfig::from_document(doc).unwrap()
    }

    #[test]
    fn test_scenario_a_prediction() {
        let config = GradingConfig::standard();
        let result = compute_result(&scenario_a(), &config, false);

        assert_eq!(result.mode, Mode::Prediction);
        assert_eq!(result.breakdown.quiz_average, 10.0);
        assert_eq!(result.breakdown.attendance_points, 7.0);
        assert_eq!(result.pre_final_total, 42.0);
        assert_eq!(result.total, 42.0);
        assert_eq!(result.grade.name, "D");
        assert_eq!(status_of(&result, "D"), &TargetStatus::Achieved);
        assert_eq!(status_of(&result, "C"), &TargetStatus::Needed(3));
        assert_eq!(status_of(&result, "A+"), &TargetStatus::Needed(38));
        assert_eq!(
            result.next_target,
            Some(NextTarget {
                band: "C".to_string(),
                amount: 3
            })
        );
        assert_eq!(result.summary.to_string(), "Need 3 for C");
    }

    #[test]
    fn test_scenario_b_result_mode() {
        let config = GradingConfig::standard();
        let mut sheet = scenario_a();
        sheet.final_exam = Some(38.0);
        let result = compute_result(&sheet, &config, true);

        assert_eq!(result.mode, Mode::Result);
        assert_eq!(result.total, 80.0);
        assert_eq!(result.pre_final_total, 42.0);
        assert_eq!(result.grade.name, "A+");
        assert!(result
            .targets
            .iter()
            .all(|row| row.status == TargetStatus::Achieved));
        assert_eq!(result.next_target, None);
        assert_eq!(result.summary, Summary::ResultsLocked);
        assert_eq!(result.summary.to_string(), "Final Results Locked");
    }

    #[test]
    fn test_result_mode_reports_missed() {
        let config = GradingConfig::standard();
        let mut sheet = scenario_a();
        sheet.final_exam = Some(10.0); // total 52
        let result = compute_result(&sheet, &config, true);
        assert_eq!(result.grade.name, "C+");
        assert_eq!(status_of(&result, "C+"), &TargetStatus::Achieved);
        assert_eq!(status_of(&result, "B-"), &TargetStatus::Missed);
        assert!(!result
            .targets
            .iter()
            .any(|row| matches!(row.status, TargetStatus::Needed(_) | TargetStatus::Impossible)));
    }

    #[test]
    fn test_scenario_c_all_zero() {
        let config = GradingConfig::standard();
        let result = compute_result(&ScoreSheet::default(), &config, false);

        assert_eq!(result.total, 0.0);
        assert_eq!(result.pre_final_total, 0.0);
        assert_eq!(result.grade.name, "F");
        // D needs exactly the final's max, which is still reachable
        assert_eq!(status_of(&result, "D"), &TargetStatus::Needed(40));
        assert_eq!(status_of(&result, "C"), &TargetStatus::Impossible);
        assert_eq!(result.summary.to_string(), "Need 40 for D");
    }

    #[test]
    fn test_retake_required_when_nothing_reachable() {
        let config = narrow_config(35.0, 25.0);
        let result = compute_result(&ScoreSheet::default(), &config, false);
        assert!(result
            .targets
            .iter()
            .all(|row| row.status == TargetStatus::Impossible));
        assert_eq!(result.summary, Summary::RetakeRequired);
    }

    #[test]
    fn test_grade_locked_when_passed_but_no_higher_band_reachable() {
        let config = narrow_config(5.0, 25.0);
        let result = compute_result(&scenario_a(), &config, false); // pre-final 42
        assert_eq!(status_of(&result, "D"), &TargetStatus::Achieved);
        assert_eq!(status_of(&result, "A+"), &TargetStatus::Impossible);
        assert_eq!(result.summary, Summary::GradeLocked);
    }

    #[test]
    fn test_max_grade_achieved_before_final() {
        let config = narrow_config(40.0, 100.0);
        let mut sheet = scenario_a();
        sheet.midterm = Some(60.0); // pre-final 87
        let result = compute_result(&sheet, &config, false);
        assert_eq!(result.pre_final_total, 87.0);
        assert_eq!(result.summary, Summary::MaxAchieved);
        assert_eq!(result.summary.to_string(), "Max Grade Achieved!");
    }

    #[test]
    fn test_needed_marks_round_up() {
        let config = GradingConfig::standard();
        let sheet = ScoreSheet {
            quiz1: Some(10.0),
            quiz2: Some(10.0),
            quiz3: Some(11.0), // avg 10.333...
            midterm: Some(15.0),
            attendance: Some(100.0),
            ..Default::default()
        };
        let result = compute_result(&sheet, &config, false);
        // 45 - 32.333... = 12.666... -> 13
        assert_eq!(status_of(&result, "C"), &TargetStatus::Needed(13));
        for row in &result.targets {
            let needed = row.band.min - result.pre_final_total;
            if let TargetStatus::Needed(n) = row.status {
                assert_eq!(n as f64, needed.ceil());
            }
            assert_eq!(row.status == TargetStatus::Achieved, needed <= 0.0);
        }
    }

    #[test]
    fn test_boundary_total_equal_to_minimum_is_achieved() {
        let config = GradingConfig::standard();
        let sheet = ScoreSheet {
            midterm: Some(25.0),
            final_exam: Some(20.0), // total 45 == C
            ..Default::default()
        };
        let result = compute_result(&sheet, &config, true);
        assert_eq!(result.grade.name, "C");
        assert_eq!(status_of(&result, "C"), &TargetStatus::Achieved);
        assert_eq!(status_of(&result, "C+"), &TargetStatus::Missed);

        let prediction = compute_result(
            &ScoreSheet {
                midterm: Some(25.0),
                quiz1: Some(15.0),
                quiz2: Some(15.0),
                quiz3: Some(15.0),
                ..Default::default()
            },
            &config,
            false,
        );
        // pre-final 40 == D
        assert_eq!(status_of(&prediction, "D"), &TargetStatus::Achieved);
    }

    #[test]
    fn test_components_clamped_before_sum() {
        let config = GradingConfig::standard();
        let sheet = ScoreSheet {
            quiz1: Some(30.0),
            quiz2: Some(-5.0),
            quiz3: Some(15.0),
            attendance: Some(120.0),
            midterm: Some(99.0),
            final_exam: Some(41.0),
            presentation: Some(8.0),
            assignment: Some(5.0),
        };
        let result = compute_result(&sheet, &config, true);
        assert_eq!(result.breakdown.quiz_average, 10.0);
        assert_eq!(result.breakdown.attendance_points, 7.0);
        assert_eq!(result.breakdown.midterm, 25.0);
        assert_eq!(result.breakdown.final_exam, 40.0);
        assert_eq!(result.total, 95.0);
    }

    #[test]
    fn test_empty_sections_contribute_zero_despite_section_min() {
        let mut doc = GradingDocument::standard();
        if let Some(sections) = doc.sections.as_mut() {
            sections.quiz = Some(SectionLimit {
                min: Some(3.0),
                max: Some(15.0),
            });
            sections.final_exam = Some(SectionLimit {
                min: Some(5.0),
                max: Some(40.0),
            });
        }
        let config = GradingConfig::from_document(doc).unwrap();

        let result = compute_result(&ScoreSheet::default(), &config, false);
        assert_eq!(result.breakdown.quiz_average, 0.0);
        assert_eq!(result.breakdown.final_exam, 0.0);
        assert_eq!(result.total, 0.0);
        assert_eq!(result.pre_final_total, 0.0);
        assert_eq!(result.grade.name, "F");

        // A present value below the minimum is still raised to it
        let sheet = ScoreSheet {
            quiz1: Some(0.0),
            ..Default::default()
        };
        let result = compute_result(&sheet, &config, false);
        assert_eq!(result.breakdown.quiz_average, 1.0);
    }

    #[test]
    fn test_non_finite_values_count_as_zero() {
        let config = GradingConfig::standard();
        let sheet = ScoreSheet {
            midterm: Some(f64::NAN),
            quiz1: Some(f64::INFINITY),
            attendance: Some(f64::NEG_INFINITY),
            ..Default::default()
        };
        let result = compute_result(&sheet, &config, false);
        assert_eq!(result.breakdown.midterm, 0.0);
        assert_eq!(result.breakdown.quiz_average, 0.0);
        assert_eq!(result.breakdown.attendance_points, 0.0);
        assert_eq!(result.total, 0.0);
        assert_eq!(status_of(&result, "D"), &TargetStatus::Needed(40));
        assert_eq!(status_of(&result, "A+"), &TargetStatus::Impossible);
        assert_eq!(result.summary.to_string(), "Need 40 for D");
        assert!(result
            .targets
            .iter()
            .all(|row| row.status != TargetStatus::Needed(0)));
    }

    #[test]
    fn test_total_is_sum_of_components() {
        let config = GradingConfig::standard();
        let samples = [
            (7.5, 12.0, 3.25, 18.0, 85.0, 22.5, 7.0, 4.0),
            (0.0, 0.0, 0.0, 0.0, 33.3, 0.0, 5.0, 3.0),
            (14.9, 13.1, 9.7, 24.4, 91.0, 39.5, 8.0, 5.0),
        ];
        for (q1, q2, q3, mid, att, fin, pres, asg) in samples {
            let sheet = ScoreSheet {
                quiz1: Some(q1),
                quiz2: Some(q2),
                quiz3: Some(q3),
                midterm: Some(mid),
                attendance: Some(att),
                final_exam: Some(fin),
                presentation: Some(pres),
                assignment: Some(asg),
            };
            let result = compute_result(&sheet, &config, true);
            let expected = (q1 + q2 + q3) / 3.0 + att / 100.0 * 7.0 + pres + asg + mid + fin;
            assert_eq!(
                format!("{:.2}", result.total),
                format!("{:.2}", expected)
            );
        }
    }

    #[test]
    fn test_grade_selection_is_monotonic() {
        let config = GradingConfig::standard();
        let mut last_min = f64::NEG_INFINITY;
        for step in 0..=200 {
            let total = step as f64 * 0.5;
            let band = config.lookup(total);
            assert!(band.min >= last_min, "grade dropped at total {}", total);
            last_min = band.min;
        }
    }

    #[test]
    fn test_same_inputs_same_result() {
        let config = GradingConfig::standard();
        let first = compute_result(&scenario_a(), &config, false);
        let second = compute_result(&scenario_a(), &config, false);
        assert_eq!(first, second);
    }

    #[test]
    fn test_targets_cover_bands_at_or_above_pass() {
        let config = GradingConfig::standard();
        let result = compute_result(&scenario_a(), &config, false);
        let names: Vec<&str> = result.targets.iter().map(|r| r.band.name.as_str()).collect();
        assert_eq!(names, vec!["A+", "A", "A-", "B+", "B", "B-", "C+", "C", "D"]);
    }

    #[test]
    fn test_result_serializes_summary_as_message() {
        let config = GradingConfig::standard();
        let result = compute_result(&scenario_a(), &config, false);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["summary"], "Need 3 for C");
        assert_eq!(json["mode"], "prediction");
        assert_eq!(json["targets"][7]["status"]["status"], "needed");
        assert_eq!(json["targets"][7]["status"]["marks"], 3);
    }
}
