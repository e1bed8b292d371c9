use super::config::{parse_hex_color, GradeBand, GradingDocument, SectionLimit};

/// Validate a grading document before it is turned into a `GradingConfig`.
/// Returns all validation errors at once (not just the first).
pub fn validate_grading(doc: &GradingDocument) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    // Thresholds
    let mut pass = None;
    match &doc.thresholds {
        None => errors.push("thresholds: required".to_string()),
        Some(thresholds) => {
            match thresholds.pass {
                None => errors.push("thresholds.pass: required".to_string()),
                Some(p) if !p.is_finite() || p < 0.0 => {
                    errors.push(format!("thresholds.pass: must be non-negative (got {})", p))
                }
                Some(p) => pass = Some(p),
            }
            match thresholds.a_plus {
                None => errors.push("thresholds.a_plus: required".to_string()),
                Some(a) if !a.is_finite() || a < 0.0 => {
                    errors.push(format!("thresholds.a_plus: must be non-negative (got {})", a))
                }
                Some(a) => {
                    if let Some(p) = pass {
                        if a < p {
                            errors.push(format!(
                                "thresholds.a_plus: must not be below thresholds.pass ({} < {})",
                                a, p
                            ));
                        }
                    }
                }
            }
        }
    }

    // Sections: attendance and final are mandatory, the rest fall back to defaults
    match &doc.sections {
        None => errors.push("sections: required (attendance and final)".to_string()),
        Some(sections) => {
            validate_limit(&mut errors, "attendance", sections.attendance.as_ref(), true);
            validate_limit(&mut errors, "final", sections.final_exam.as_ref(), true);
            validate_limit(&mut errors, "quiz", sections.quiz.as_ref(), false);
            validate_limit(&mut errors, "midterm", sections.midterm.as_ref(), false);
            validate_limit(&mut errors, "presentation", sections.presentation.as_ref(), false);
            validate_limit(&mut errors, "assignment", sections.assignment.as_ref(), false);
        }
    }

    // Grading scale
    match &doc.grading_scale {
        None => errors.push("gradingScale: required".to_string()),
        Some(scale) if scale.is_empty() => {
            errors.push("gradingScale: must contain at least one band".to_string())
        }
        Some(scale) => {
            for (i, band) in scale.iter().enumerate() {
                validate_band(&mut errors, &format!("gradingScale[{}]", i), band);
            }

            for (i, pair) in scale.windows(2).enumerate() {
                let (prev, next) = (&pair[0], &pair[1]);
                if next.min == prev.min {
                    errors.push(format!(
                        "gradingScale[{}].min: duplicate minimum {} (also used by '{}')",
                        i + 1,
                        next.min,
                        prev.name
                    ));
                } else if next.min > prev.min {
                    errors.push(format!(
                        "gradingScale[{}].min: scale must be sorted by min descending ({} > {})",
                        i + 1,
                        next.min,
                        prev.min
                    ));
                }
            }

            if let (Some(p), Some(last)) = (pass, scale.last()) {
                if last.min > p {
                    errors.push(format!(
                        "gradingScale: lowest band '{}' ({}) must be at or below thresholds.pass ({})",
                        last.name, last.min, p
                    ));
                }
            }
        }
    }

    if let Some(ref failing) = doc.failing {
        validate_band(&mut errors, "failing", failing);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_limit(
    errors: &mut Vec<String>,
    name: &str,
    limit: Option<&SectionLimit>,
    required: bool,
) {
    let Some(limit) = limit else {
        if required {
            errors.push(format!("sections.{}.max: required", name));
        }
        return;
    };

    let max = match limit.max {
        Some(max) => max,
        None if required => {
            errors.push(format!("sections.{}.max: required", name));
            return;
        }
        None => return,
    };

    if !max.is_finite() || max <= 0.0 {
        errors.push(format!("sections.{}.max: must be positive (got {})", name, max));
        return;
    }

    if let Some(min) = limit.min {
        if !min.is_finite() || min < 0.0 {
            errors.push(format!("sections.{}.min: must be non-negative (got {})", name, min));
        } else if min >= max {
            errors.push(format!(
                "sections.{}.min: must be below max ({} >= {})",
                name, min, max
            ));
        }
    }
}

fn validate_band(errors: &mut Vec<String>, path: &str, band: &GradeBand) {
    if band.name.trim().is_empty() {
        errors.push(format!("{}.name: must not be empty", path));
    }
    if !band.min.is_finite() || band.min < 0.0 {
        errors.push(format!("{}.min: must be non-negative (got {})", path, band.min));
    }
    if !band.color.is_empty() && parse_hex_color(&band.color).is_none() {
        errors.push(format!(
            "{}.color: invalid '{}' - expected #rrggbb",
            path, band.color
        ));
    }
}
