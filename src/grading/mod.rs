pub mod config;
pub mod engine;
pub mod error;
pub mod quality;
pub mod sections;
pub mod validation;

pub use config::*;
pub use engine::{
    compute_result, Breakdown, CalculationResult, Mode, NextTarget, Summary, TargetRow,
    TargetStatus,
};
pub use error::GradeError;
pub use quality::{Quality, QualitySection};
pub use sections::{parse_mark, ClampOutcome, Clamped, ScoreSheet, Section, SectionRange};
pub use validation::validate_grading;
