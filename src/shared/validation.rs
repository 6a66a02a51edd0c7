use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for GitHub repository identifiers in `owner/repo` form
    /// - Valid: "octocat/hello-world", "my-org/app.feedback", "a/b"
    /// - Invalid: "hello-world", "a/b/c", "/repo", "owner/", "own er/repo"
    pub static ref REPO_REGEX: Regex =
        Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?/[A-Za-z0-9._-]+$").unwrap();

    /// C0 and C1 control characters, DEL included
    pub static ref CONTROL_CHARS_REGEX: Regex = Regex::new(r"[\x{0000}-\x{001F}\x{007F}-\x{009F}]").unwrap();
}

/// Remove every control character (U+0000-U+001F, U+007F-U+009F).
///
/// Newlines and tabs are control characters too and are removed with the rest.
pub fn strip_control_chars(input: &str) -> String {
    CONTROL_CHARS_REGEX.replace_all(input, "").into_owned()
}

/// Keep at most `max` characters (not bytes) of `input`
pub fn truncate_chars(input: &str, max: usize) -> &str {
    match input.char_indices().nth(max) {
        Some((idx, _)) => &input[..idx],
        None => input,
    }
}
