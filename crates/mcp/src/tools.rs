//! MCP tool catalogue for Marquee
//!
//! - Query: natural-language business questions
//! - Diagnostics: connectivity check and dataset summary

/// Tool names the server registers, in listing order.
pub const BUSINESS_QUERY: &str = "business_query";
pub const TEST_QUERY: &str = "test_query";
pub const DATASET_INFO: &str = "dataset_info";

/// Tool category trait
pub trait ToolCategory {
    /// Category name
    fn category_name() -> &'static str
    where
        Self: Sized;
    /// List of tool names in this category
    fn tool_names() -> &'static [&'static str]
    where
        Self: Sized;
}

/// Query tools category
pub struct QueryTools;

/// Diagnostics tools category
pub struct DiagnosticTools;

impl ToolCategory for QueryTools {
    fn category_name() -> &'static str {
        "query"
    }
    fn tool_names() -> &'static [&'static str] {
        &[BUSINESS_QUERY]
    }
}

impl ToolCategory for DiagnosticTools {
    fn category_name() -> &'static str {
        "diagnostics"
    }
    fn tool_names() -> &'static [&'static str] {
        &[TEST_QUERY, DATASET_INFO]
    }
}

/// All tool names
pub const ALL_TOOL_NAMES: &[&str] = &[BUSINESS_QUERY, TEST_QUERY, DATASET_INFO];

/// Total number of tools
pub const TOTAL_TOOLS: usize = ALL_TOOL_NAMES.len();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_counts() {
        assert_eq!(QueryTools::tool_names().len(), 1);
        assert_eq!(DiagnosticTools::tool_names().len(), 2);
        assert_eq!(TOTAL_TOOLS, 3);
    }

    #[test]
    fn categories_cover_every_tool_once() {
        let mut names: Vec<&str> =
            QueryTools::tool_names().iter().chain(DiagnosticTools::tool_names()).copied().collect();
        names.sort_unstable();
        let mut all = ALL_TOOL_NAMES.to_vec();
        all.sort_unstable();

        assert_eq!(names, all);
    }
}
