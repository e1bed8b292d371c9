use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::grading::{CalculationResult, GradeBand, GradingConfig, Mode, TargetStatus};

/// Widest rule drawn under headings
const MAX_RULE_WIDTH: usize = 40;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

fn rule() -> String {
    let width = get_terminal_width()
        .map(|w| w.min(MAX_RULE_WIDTH))
        .unwrap_or(MAX_RULE_WIDTH);
    "-".repeat(width)
}

/// Format a mark with two decimals ("42.00")
pub fn format_points(points: f64) -> String {
    format!("{:.2}", points)
}

/// Human text for one row of the targets table
/// "Need 3", "Achieved", "Missed", "Impossible (>40)"
pub fn format_status(status: &TargetStatus, final_max: f64) -> String {
    match status {
        TargetStatus::Achieved => "Achieved".to_string(),
        TargetStatus::Missed => "Missed".to_string(),
        TargetStatus::Needed(marks) => format!("Need {}", marks),
        TargetStatus::Impossible => format!("Impossible (>{})", final_max),
    }
}

fn paint_band(text: &str, band: &GradeBand, use_colors: bool) -> String {
    match band.rgb() {
        Some((r, g, b)) if use_colors => text.truecolor(r, g, b).bold().to_string(),
        _ => text.to_string(),
    }
}

fn paint_status(text: &str, status: &TargetStatus, use_colors: bool) -> String {
    if !use_colors {
        return text.to_string();
    }
    match status {
        TargetStatus::Achieved => text.green().to_string(),
        TargetStatus::Missed | TargetStatus::Impossible => text.red().to_string(),
        TargetStatus::Needed(_) => text.yellow().to_string(),
    }
}

/// Format a full calculation for the terminal:
/// component breakdown, total, grade, per-band targets and the summary line.
pub fn format_result(result: &CalculationResult, config: &GradingConfig, use_colors: bool) -> String {
    let b = &result.breakdown;
    let components = [
        ("Quiz average", b.quiz_average),
        ("Attendance", b.attendance_points),
        ("Presentation", b.presentation),
        ("Assignment", b.assignment),
        ("Mid-term", b.midterm),
        ("Final Exam", b.final_exam),
    ];

    let mut lines: Vec<String> = components
        .iter()
        .map(|(label, points)| format!("{:<14}{:>8}", label, format_points(*points)))
        .collect();

    lines.push(rule());

    let total = format!("{:<14}{:>8}", "Total", format_points(result.total));
    lines.push(if use_colors {
        total.bold().to_string()
    } else {
        total
    });
    if result.mode == Mode::Prediction {
        lines.push(format!(
            "{:<14}{:>8}",
            "Before final",
            format_points(result.pre_final_total)
        ));
    }
    lines.push(format!(
        "{:<14}{}",
        "Grade",
        paint_band(&result.grade.display_label(), &result.grade, use_colors)
    ));

    if !result.targets.is_empty() {
        lines.push(String::new());
        let heading = match result.mode {
            Mode::Prediction => "Targets (final exam needed)",
            Mode::Result => "Targets",
        };
        lines.push(if use_colors {
            heading.bold().to_string()
        } else {
            heading.to_string()
        });

        let name_width = result
            .targets
            .iter()
            .map(|row| row.band.name.chars().count())
            .max()
            .unwrap_or(0)
            .max(2);

        for row in &result.targets {
            let name = format!("{:<width$}", row.band.name, width = name_width);
            let status = format_status(&row.status, config.final_max());
            lines.push(format!(
                "{}  {:>5}  {}",
                paint_band(&name, &row.band, use_colors),
                row.band.min,
                paint_status(&status, &row.status, use_colors)
            ));
        }
    }

    lines.push(String::new());
    let summary = result.summary.to_string();
    lines.push(if use_colors {
        summary.bold().to_string()
    } else {
        summary
    });

    lines.join("\n")
}

/// Format a calculation as tab-separated values for scripting
/// First line: total, grade, summary. Then one line per band: name, min, status.
/// No headers, no colors.
pub fn format_tsv(result: &CalculationResult, config: &GradingConfig) -> String {
    let mut lines = vec![format!(
        "{}\t{}\t{}",
        format_points(result.total),
        result.grade.name,
        result.summary
    )];

    lines.extend(result.targets.iter().map(|row| {
        format!(
            "{}\t{}\t{}",
            row.band.name,
            row.band.min,
            format_status(&row.status, config.final_max())
        )
    }));

    lines.join("\n")
}

/// One line per band of the configured scale, used by `check`
pub fn format_scale(config: &GradingConfig, use_colors: bool) -> String {
    let mut lines: Vec<String> = config
        .scale()
        .iter()
        .map(|band| {
            format!(
                "{:>6}  {}",
                band.min,
                paint_band(&band.display_label(), band, use_colors)
            )
        })
        .collect();
    let failing = config.failing();
    lines.push(format!(
        "{:>6}  {}",
        "<",
        paint_band(&failing.display_label(), failing, use_colors)
    ));
    lines.push(format!(
        "pass {}  a+ {}  attendance {}  final {}",
        config.pass(),
        config.a_plus(),
        config.attendance_max(),
        config.final_max()
    ));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::{compute_result, ScoreSheet};

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

    #[test]
    fn test_format_points() {
        assert_eq!(format_points(42.0), "42.00");
        assert_eq!(format_points(10.0 / 3.0), "3.33");
    }

    #[test]
    fn test_format_status() {
        assert_eq!(format_status(&TargetStatus::Needed(3), 40.0), "Need 3");
        assert_eq!(format_status(&TargetStatus::Achieved, 40.0), "Achieved");
        assert_eq!(format_status(&TargetStatus::Missed, 40.0), "Missed");
        assert_eq!(
            format_status(&TargetStatus::Impossible, 40.0),
            "Impossible (>40)"
        );
    }

    #[test]
    fn test_format_result_prediction() {
        let config = GradingConfig::standard();
        let result = compute_result(&scenario_a(), &config, false);
        let output = format_result(&result, &config, false);

        assert!(output.contains("Total"));
        assert!(output.contains("42.00"));
        assert!(output.contains("Before final"));
        assert!(output.contains("Targets (final exam needed)"));
        assert!(output.contains("Achieved"));
        assert!(output.contains("Need 3"));
        assert!(output.ends_with("Need 3 for C"));
        // Plain output carries no escape codes
        assert!(!output.contains('\u{1b}'));
    }

    #[test]
    fn test_format_result_locked() {
        let config = GradingConfig::standard();
        let mut sheet = scenario_a();
        sheet.final_exam = Some(38.0);
        let result = compute_result(&sheet, &config, true);
        let output = format_result(&result, &config, false);

        assert!(output.contains("80.00"));
        assert!(output.contains("A+ (Outstanding)"));
        assert!(!output.contains("Before final"));
        assert!(output.ends_with("Final Results Locked"));
    }

    #[test]
    fn test_format_result_with_colors() {
        let config = GradingConfig::standard();
        let result = compute_result(&scenario_a(), &config, false);
        let output = format_result(&result, &config, true);
        assert!(output.contains('\u{1b}'));
    }

    #[test]
    fn test_format_tsv() {
        let config = GradingConfig::standard();
        let result = compute_result(&scenario_a(), &config, false);
        let output = format_tsv(&result, &config);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[0], "42.00\tD\tNeed 3 for C");
        assert_eq!(lines.len(), 1 + result.targets.len());
        assert!(lines.iter().skip(1).all(|l| l.split('\t').count() == 3));
        assert!(lines.contains(&"D\t40\tAchieved"));
        assert!(lines.contains(&"C\t45\tNeed 3"));
    }

    #[test]
    fn test_format_scale_lists_every_band() {
        let config = GradingConfig::standard();
        let output = format_scale(&config, false);
        assert_eq!(output.lines().count(), config.scale().len() + 2);
        assert!(output.contains("F (Fail)"));
        assert!(output.contains("final 40"));
    }
}
