//! Utility functions for string formatting and value normalisation.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{
    cmp_ignore_case, contains_ignore_case, normalize_price, normalize_visit_date, parse_price,
    parse_visit_date, sanitize_file_name, truncate_with_ellipsis,
};
