use std::sync::Arc;
use std::time::Instant;

use crate::grading::{
    CalculationResult, GradeError, GradingConfig, Quality, QualitySection, Section,
};
use crate::session::GradeSession;
use crate::tui::theme::ThemeColors;

/// How long a toast stays in the status bar
const FLASH_SECS: u64 = 3;

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    Help,
}

/// How a status bar toast is colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Info,
    Warning,
}

/// Progress of the grading configuration load.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Loading,
    Ready,
    Unavailable(String),
}

/// One row of the input form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormRow {
    Field(Section),
    Quality(QualitySection),
}

impl FormRow {
    pub fn label(self) -> &'static str {
        match self {
            FormRow::Field(section) => section.label(),
            FormRow::Quality(kind) => kind.section().label(),
        }
    }
}

/// Form order: quizzes, mid-term, attendance, the two quality rows, then the final.
pub const FORM_ROWS: [FormRow; 8] = [
    FormRow::Field(Section::Quiz1),
    FormRow::Field(Section::Quiz2),
    FormRow::Field(Section::Quiz3),
    FormRow::Field(Section::Midterm),
    FormRow::Field(Section::Attendance),
    FormRow::Quality(QualitySection::Presentation),
    FormRow::Quality(QualitySection::Assignment),
    FormRow::Field(Section::Final),
];

pub struct App {
    pub session: GradeSession,
    pub result: Option<CalculationResult>,
    pub load_state: LoadState,
    pub source_label: String,
    pub focus: usize,
    pub input_mode: InputMode,
    pub flash_message: Option<(String, FlashLevel, Instant)>,
    pub needs_reload: bool,
    pub should_quit: bool,
    pub spinner_frame: usize,
    pub theme: ThemeColors,
}

impl App {
    /// Create an App in loading state; the form accepts input right away
    /// but nothing is computed until a configuration arrives.
    pub fn new_loading(source_label: String, theme: ThemeColors) -> Self {
        Self {
            session: GradeSession::new(),
            result: None,
            load_state: LoadState::Loading,
            source_label,
            focus: 0,
            input_mode: InputMode::Normal,
            flash_message: None,
            needs_reload: false,
            should_quit: false,
            spinner_frame: 0,
            theme,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.load_state == LoadState::Loading
    }

    pub fn focused_row(&self) -> FormRow {
        FORM_ROWS[self.focus % FORM_ROWS.len()]
    }

    pub fn next_row(&mut self) {
        self.focus = (self.focus + 1) % FORM_ROWS.len();
    }

    pub fn previous_row(&mut self) {
        self.focus = if self.focus == 0 {
            FORM_ROWS.len() - 1
        } else {
            self.focus - 1
        };
    }

    /// Append a character to the focused numeric field.
    pub fn type_char(&mut self, c: char) {
        if let FormRow::Field(section) = self.focused_row() {
            let mut text = self.session.field(section).to_string();
            text.push(c);
            self.update_field(section, &text);
        }
    }

    pub fn backspace(&mut self) {
        if let FormRow::Field(section) = self.focused_row() {
            let mut text = self.session.field(section).to_string();
            text.pop();
            self.update_field(section, &text);
        }
    }

    pub fn clear_focused(&mut self) {
        if let FormRow::Field(section) = self.focused_row() {
            self.session.clear_field(section);
            self.recompute();
        }
    }

    fn update_field(&mut self, section: Section, text: &str) {
        if let Err(e) = self.session.set_field(section, text) {
            self.show_warning(e.to_string());
        }
        self.recompute();
    }

    /// Select a quality on the focused row.
    pub fn set_quality(&mut self, quality: Quality) {
        if let FormRow::Quality(kind) = self.focused_row() {
            self.session.select_quality(kind, quality);
            self.recompute();
        }
    }

    /// Move the focused quality row one step; an empty row starts at Good.
    pub fn cycle_quality(&mut self, forward: bool) {
        if let FormRow::Quality(kind) = self.focused_row() {
            let next = match self.session.active_quality(kind) {
                Some(q) if forward => q.next(),
                Some(q) => q.previous(),
                None => Quality::Good,
            };
            self.set_quality(next);
        }
    }

    /// Clear every input, keeping the loaded configuration.
    pub fn reset_form(&mut self) {
        self.session.reset();
        self.recompute();
        self.show_flash("Form cleared".to_string());
    }

    pub fn recompute(&mut self) {
        self.result = self.session.compute();
    }

    /// Apply the outcome of a background configuration load.
    pub fn config_loaded(&mut self, loaded: Result<GradingConfig, GradeError>) {
        match loaded {
            Ok(config) => {
                let warnings = self.session.set_config(Arc::new(config));
                self.load_state = LoadState::Ready;
                self.recompute();
                match warnings.first() {
                    Some(w) => self.show_warning(w.to_string()),
                    None => self.show_flash("Grading configuration loaded".to_string()),
                }
            }
            Err(e) => {
                // A previously loaded configuration stays in use
                if self.session.is_ready() {
                    self.load_state = LoadState::Ready;
                    self.show_warning(format!("Reload failed: {}", e));
                } else {
                    self.load_state = LoadState::Unavailable(e.to_string());
                    self.result = None;
                }
            }
        }
    }

    pub fn request_reload(&mut self) {
        if !self.is_loading() {
            self.needs_reload = true;
        }
    }

    pub fn update_flash(&mut self) {
        if let Some((_, _, timestamp)) = self.flash_message {
            if timestamp.elapsed().as_secs() >= FLASH_SECS {
                self.flash_message = None;
            }
        }
    }

    pub fn show_flash(&mut self, msg: String) {
        self.flash_message = Some((msg, FlashLevel::Info, Instant::now()));
    }

    pub fn show_warning(&mut self, msg: String) {
        self.flash_message = Some((msg, FlashLevel::Warning, Instant::now()));
    }

    pub fn show_help(&mut self) {
        self.input_mode = InputMode::Help;
    }

    pub fn dismiss_help(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Advance the loading spinner animation frame
    pub fn advance_spinner(&mut self) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
    }
}
