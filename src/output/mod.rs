pub mod formatter;

pub use formatter::{
    format_points, format_result, format_scale, format_status, format_tsv, should_use_colors,
};
