pub mod config;
pub mod grading;
pub mod output;
pub mod provider;
pub mod session;
pub mod stderr_buffer;
pub mod telemetry;
pub mod tui;
