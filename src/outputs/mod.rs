//! Report writers for a finished refresh cycle.
//!
//! # Submodules
//!
//! - [`json`]: writes the [`DashboardSnapshot`](crate::models::DashboardSnapshot)
//!   as JSON for other tools
//! - [`markdown`]: renders the comparison tables and news lists
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! ├── 2025-05-06/
//! │   ├── 083000.json
//! │   └── 093000.json
//! └── latest.json
//!
//! markdown_output_dir/
//! ├── 2025-05-06_083000.md
//! └── latest.md
//! ```

pub mod json;
pub mod markdown;

/// `HH:MM:SS` → `HHMMSS`, used in output file names.
pub(crate) fn compact_time(local_time: &str) -> String {
    local_time.chars().filter(char::is_ascii_digit).take(6).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_time() {
        assert_eq!(compact_time("08:30:05"), "083005");
        assert_eq!(compact_time("08:30:05.123456"), "083005");
    }
}
