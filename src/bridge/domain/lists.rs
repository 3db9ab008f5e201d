//! Comma-separated list parsing for tool inputs.

/// Splits `raw` on commas, trimming entries and dropping blanks.
///
/// # Examples
///
/// ```
/// use conclave::bridge::domain::split_comma_list;
///
/// assert_eq!(split_comma_list(" ls, cat ,,"), vec!["ls", "cat"]);
/// assert!(split_comma_list("").is_empty());
/// ```
#[must_use]
pub fn split_comma_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_owned)
        .collect()
}
