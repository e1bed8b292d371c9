//! Adapter between an input surface (TUI form, command line) and the engine.
//!
//! The session owns the raw field text, the active quality selections and the
//! loaded configuration. The engine only ever sees a plain `ScoreSheet`.

use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;

use crate::grading::{
    compute_result, parse_mark, CalculationResult, ClampOutcome, GradeError, GradingConfig,
    Quality, QualitySection, ScoreSheet, Section,
};

/// A quality choice and the score it resolved to when it was made.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    pub quality: Quality,
    pub score: f64,
}

#[derive(Debug, Default)]
pub struct GradeSession {
    config: Option<Arc<GradingConfig>>,
    fields: HashMap<Section, String>,
    selections: HashMap<QualitySection, Selection>,
}

impl GradeSession {
    /// A session with no configuration yet; `compute` returns `None` until
    /// `set_config` is called.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: Arc<GradingConfig>) -> Self {
        let mut session = Self::new();
        session.set_config(config);
        session
    }

    /// Install a freshly loaded configuration and re-apply range checks to
    /// whatever was typed while it was loading.
    pub fn set_config(&mut self, config: Arc<GradingConfig>) -> Vec<GradeError> {
        self.config = Some(config);
        let typed: Vec<(Section, String)> = self
            .fields
            .iter()
            .map(|(section, text)| (*section, text.clone()))
            .collect();
        typed
            .into_iter()
            .filter_map(|(section, text)| self.set_field(section, &text).err())
            .collect()
    }

    pub fn config(&self) -> Option<&Arc<GradingConfig>> {
        self.config.as_ref()
    }

    pub fn is_ready(&self) -> bool {
        self.config.is_some()
    }

    /// Raw text of a numeric field ("" when untouched).
    pub fn field(&self, section: Section) -> &str {
        self.fields.get(&section).map(String::as_str).unwrap_or("")
    }

    /// Store raw input for a numeric section.
    ///
    /// With a configuration loaded, a value above the section maximum is
    /// rewritten to the maximum and `InputOutOfRange` is returned so the
    /// caller can warn; the clamped value is kept either way. Values below
    /// the minimum are clamped silently. Empty or unparseable text is kept
    /// as typed and counts as 0.
    pub fn set_field(&mut self, section: Section, text: &str) -> Result<(), GradeError> {
        if let Some(quality_section) = QualitySection::from_section(section) {
            // Quality sections only change through `select_quality`.
            tracing::debug!(?quality_section, "ignoring raw input for quality section");
            return Ok(());
        }

        let mut stored = text.to_string();
        let mut outcome = Ok(());

        if let (Some(config), Some(value)) = (self.config.as_ref(), parse_mark(text)) {
            let range = config.input_range(section);
            let clamped = range.clamp(value);
            match clamped.outcome {
                ClampOutcome::InRange => {}
                ClampOutcome::AboveMax => {
                    tracing::debug!(%section, value, max = range.max, "clamped to max");
                    stored = format_input(clamped.value);
                    outcome = Err(GradeError::InputOutOfRange {
                        section,
                        max: range.max,
                    });
                }
                ClampOutcome::BelowMin => {
                    stored = format_input(clamped.value);
                }
            }
        }

        self.fields.insert(section, stored);
        outcome
    }

    pub fn clear_field(&mut self, section: Section) {
        self.fields.remove(&section);
    }

    /// Select a quality using the thread-local RNG.
    pub fn select_quality(&mut self, section: QualitySection, quality: Quality) -> f64 {
        self.select_quality_with(section, quality, &mut rand::rng())
    }

    /// Select a quality, resolving its score once. The previous selection for
    /// the section is replaced; its score is never re-drawn on recompute.
    pub fn select_quality_with<R: Rng + ?Sized>(
        &mut self,
        section: QualitySection,
        quality: Quality,
        rng: &mut R,
    ) -> f64 {
        let score = section.resolve_with(quality, rng);
        self.selections.insert(section, Selection { quality, score });
        score
    }

    /// Restore a selection whose score was resolved earlier.
    pub fn restore_selection(&mut self, section: QualitySection, selection: Selection) {
        self.selections.insert(section, selection);
    }

    pub fn selection(&self, section: QualitySection) -> Option<Selection> {
        self.selections.get(&section).copied()
    }

    /// Active quality for display; at most one per section.
    pub fn active_quality(&self, section: QualitySection) -> Option<Quality> {
        self.selection(section).map(|s| s.quality)
    }

    /// The final exam counts as entered once its field holds a number.
    pub fn final_entered(&self) -> bool {
        parse_mark(self.field(Section::Final)).is_some()
    }

    pub fn snapshot(&self) -> ScoreSheet {
        let mut sheet = ScoreSheet::default();
        for section in Section::ALL {
            let value = match QualitySection::from_section(section) {
                Some(q) => self.selection(q).map(|s| s.score),
                None => parse_mark(self.field(section)),
            };
            sheet.set(section, value);
        }
        sheet
    }

    /// Run the engine over the current inputs. `None` while no configuration
    /// is loaded.
    pub fn compute(&self) -> Option<CalculationResult> {
        let config = self.config.as_ref()?;
        Some(compute_result(&self.snapshot(), config, self.final_entered()))
    }

    pub fn reset(&mut self) {
        self.fields.clear();
        self.selections.clear();
    }
}

/// Render a clamped value back into a form field ("100", "7.5").
fn format_input(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        value.to_string()
    }
}
