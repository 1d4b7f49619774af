use regex::{Regex, RegexBuilder};

use crate::search::normalize_query;

/// Case-insensitive matcher for the search query, `None` for a blank query.
pub fn build_highlight_regex(query: &str) -> Option<Regex> {
    let normalized = normalize_query(query)?;
    RegexBuilder::new(&regex::escape(&normalized))
        .case_insensitive(true)
        .build()
        .ok()
}

/// Wraps every match in `[` `]`, keeping the original casing.
pub fn mark_matches(text: &str, regex: &Regex) -> String {
    regex.replace_all(text, "[$0]").into_owned()
}
