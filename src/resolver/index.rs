//! Release folder lookup in the update index listing.
//!
//! The index is an Apache-style directory listing sorted newest first
//! (`?C=M;O=D`). It is scanned one line at a time and the first line linking
//! to an `update_<n>...` folder wins. There is no notion of "latest" beyond the
//! order the server lists folders in.

use regex::Regex;
use std::sync::LazyLock;

use crate::constants::UPDATE_PATH_PATTERN;

static UPDATE_PATH_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(UPDATE_PATH_PATTERN).ok());

/// Return the first capture group of `re` on the first matching line.
pub fn find_match_in_lines<'a>(text: &'a str, re: &Regex) -> Option<&'a str> {
    text.lines().find_map(|line| re.captures(line).and_then(|c| c.get(1)).map(|m| m.as_str()))
}

/// The release folder named by the newest entry of the index, for example
/// `update_3/`.
///
/// ```rust
/// use tor_browser_launcher::resolver::find_update_path;
///
/// let html = "<a href=\"update_9z\">downloads.json</a>";
/// assert_eq!(find_update_path(html), Some("update_9z"));
/// ```
pub fn find_update_path(html: &str) -> Option<&str> {
    find_match_in_lines(html, UPDATE_PATH_RE.as_ref()?)
}
