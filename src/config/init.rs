use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::config::{get_config_path, get_grading_path, write_atomic, Config};
use crate::grading::{
    parse_hex_color, validate_grading, GradeBand, GradingDocument, SectionLimit,
};

/// Read one trimmed line. Fails on end of input so prompt loops cannot spin.
fn read_answer(reader: &mut impl BufRead) -> Result<String> {
    let mut input = String::new();
    let read = reader
        .read_line(&mut input)
        .context("Failed to read input")?;
    if read == 0 {
        anyhow::bail!("Input closed before setup finished");
    }
    Ok(input.trim().to_string())
}

/// Prompt user with a message and return their trimmed input.
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout().flush().context("Failed to flush stdout")?;
    read_answer(&mut std::io::stdin().lock())
}

/// Prompt user with a message and a default value. Returns default if input is empty.
fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    let input = input.to_lowercase();
    if input.is_empty() {
        Ok(default_yes)
    } else {
        Ok(input == "y" || input == "yes")
    }
}

/// Ask for a non-negative number until one is given.
fn prompt_number(message: &str, default: f64) -> Result<f64> {
    loop {
        let input = prompt_with_default(message, &default.to_string())?;
        match input.parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => return Ok(v),
            _ => println!("  Invalid: must be a non-negative number. Try again."),
        }
    }
}

/// Collect a custom grading scale, highest band first.
fn prompt_scale() -> Result<Vec<GradeBand>> {
    println!("Enter bands from the highest minimum down to the lowest passing band.");
    let mut bands: Vec<GradeBand> = Vec::new();
    loop {
        let name = loop {
            let n = prompt("  Band name (e.g. 'A+'): ")?;
            if !n.is_empty() {
                break n;
            }
            println!("  Band name is required.");
        };
        let min = loop {
            let v = prompt_number("  Minimum total", 0.0)?;
            match bands.last() {
                Some(prev) if v >= prev.min => {
                    println!("  Must be below the previous band ({}). Try again.", prev.min)
                }
                _ => break v,
            }
        };
        let remarks = prompt("  Remarks (optional): ")?;
        let color = loop {
            let c = prompt("  Color as #rrggbb (optional): ")?;
            if c.is_empty() || parse_hex_color(&c).is_some() {
                break c;
            }
            println!("  Invalid color. Try again.");
        };
        bands.push(GradeBand {
            name,
            min,
            remarks,
            color,
        });
        if !prompt_yes_no("  Add another band?", true)? {
            break;
        }
    }
    Ok(bands)
}

/// Answers collected by the wizard that shape the grading document.
#[derive(Debug, Clone, PartialEq)]
pub struct GradingAnswers {
    pub pass: f64,
    pub a_plus: f64,
    pub attendance_max: f64,
    pub final_max: f64,
    /// `None` keeps the standard scale
    pub scale: Option<Vec<GradeBand>>,
}

impl Default for GradingAnswers {
    fn default() -> Self {
        Self {
            pass: 40.0,
            a_plus: 80.0,
            attendance_max: 7.0,
            final_max: 40.0,
            scale: None,
        }
    }
}

/// Build a grading document from the standard one and the wizard answers.
pub fn build_document(answers: &GradingAnswers) -> GradingDocument {
    let mut doc = GradingDocument::standard();
    if let Some(thresholds) = doc.thresholds.as_mut() {
        thresholds.pass = Some(answers.pass);
        thresholds.a_plus = Some(answers.a_plus);
    }
    if let Some(sections) = doc.sections.as_mut() {
        sections.attendance = Some(SectionLimit::with_max(answers.attendance_max));
        sections.final_exam = Some(SectionLimit::with_max(answers.final_max));
    }
    if let Some(ref scale) = answers.scale {
        doc.grading_scale = Some(scale.clone());
    }
    doc
}

/// Run the interactive init wizard to create the grading document and settings.
///
/// If `default_path` is Some, uses that as the settings file path.
pub fn run_init_wizard(default_path: Option<PathBuf>) -> Result<()> {
    println!();
    println!("Grade Calculator Setup");
    println!("======================");
    println!();

    let defaults = GradingAnswers::default();

    // 1. Thresholds and maxima
    println!("Totals are out of 100. Press Enter to keep a default.");
    let pass = prompt_number("Pass mark", defaults.pass)?;
    let a_plus = prompt_number("A+ threshold", defaults.a_plus)?;
    let attendance_max = prompt_number("Attendance points at 100%", defaults.attendance_max)?;
    let final_max = prompt_number("Final exam maximum", defaults.final_max)?;

    // 2. Scale
    println!();
    let scale = if prompt_yes_no("Use the standard grading scale (A+ 80 ... D 40)?", true)? {
        None
    } else {
        Some(prompt_scale()?)
    };

    let doc = build_document(&GradingAnswers {
        pass,
        a_plus,
        attendance_max,
        final_max,
        scale,
    });

    if let Err(errors) = validate_grading(&doc) {
        println!();
        println!("The grading document is not valid:");
        for error in &errors {
            println!("  - {}", error);
        }
        anyhow::bail!("Invalid grading document ({} errors), nothing written", errors.len());
    }

    // 3. Where to put things
    println!();
    let default_grading = get_grading_path()?;
    let grading_path = PathBuf::from(prompt_with_default(
        "Where should the grading document be saved?",
        &default_grading.display().to_string(),
    )?);

    let default_config_path = match default_path {
        Some(p) => p,
        None => get_config_path()?,
    };
    let config_path = PathBuf::from(prompt_with_default(
        "Where should the settings be saved?",
        &default_config_path.display().to_string(),
    )?);

    let theme = loop {
        let t = prompt_with_default("Theme (auto, dark, light)", "auto")?;
        if matches!(t.as_str(), "auto" | "dark" | "light") {
            break t;
        }
        println!("  Invalid theme. Try again.");
    };

    for path in [&grading_path, &config_path] {
        if path.exists() {
            let overwrite = prompt_yes_no(
                &format!("{} already exists. Overwrite?", path.display()),
                false,
            )?;
            if !overwrite {
                println!("Aborted.");
                return Ok(());
            }
        }
    }

    // 4. Write both files
    let json = serde_json::to_string_pretty(&doc).context("Failed to serialize grading document")?;
    write_atomic(&grading_path, &json)?;

    let config = Config {
        source: Some(grading_path.display().to_string()),
        theme: Some(theme),
        ..Default::default()
    };
    let yaml = serde_saphyr::to_string(&config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
    write_atomic(&config_path, &yaml)?;

    println!();
    println!("Grading document written to {}", grading_path.display());
    println!("Settings written to {}", config_path.display());
    println!("Run `grade-calc` to get started.");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::GradingConfig;

    #[test]
    fn test_default_answers_match_standard() {
        let doc = build_document(&GradingAnswers::default());
        assert_eq!(doc, GradingDocument::standard());
    }

    #[test]
    fn test_custom_answers_are_valid() {
        let answers = GradingAnswers {
            pass: 50.0,
            a_plus: 90.0,
            attendance_max: 5.0,
            final_max: 50.0,
            scale: Some(vec![
                GradeBand::new("A", 90.0, "Top", "#10b981"),
                GradeBand::new("B", 70.0, "", ""),
                GradeBand::new("C", 50.0, "Pass", ""),
            ]),
        };
        let config = GradingConfig::from_document(build_document(&answers)).unwrap();
        assert_eq!(config.final_max(), 50.0);
        assert_eq!(config.attendance_max(), 5.0);
        assert_eq!(config.lookup(75.0).name, "B");
        assert_eq!(config.lookup(49.0).name, "F");
    }

    #[test]
    fn test_pass_above_lowest_band_is_rejected() {
        let answers = GradingAnswers {
            pass: 30.0,
            ..Default::default()
        };
        // D (40) sits above the pass mark
        assert!(validate_grading(&build_document(&answers)).is_err());
    }

    #[test]
    fn test_read_answer_trims_lines() {
        let mut input = std::io::Cursor::new("  A+  \n\n");
        assert_eq!(read_answer(&mut input).unwrap(), "A+");
        assert_eq!(read_answer(&mut input).unwrap(), "");
    }

    #[test]
    fn test_read_answer_fails_at_end_of_input() {
        let mut input = std::io::Cursor::new("last\n");
        assert_eq!(read_answer(&mut input).unwrap(), "last");
        let err = read_answer(&mut input).unwrap_err();
        assert!(err.to_string().contains("Input closed"));
    }

    #[test]
    fn test_document_serializes_with_wire_names() {
        let json = serde_json::to_string(&build_document(&GradingAnswers::default())).unwrap();
        assert!(json.contains("\"gradingScale\""));
        assert!(json.contains("\"final\""));
        assert!(!json.contains("failing"));
    }
}
