//! Title sanitisation for URLs and file names.

use std::sync::LazyLock;

use regex::Regex;

static NON_SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("static slug pattern"));
static NON_FILENAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9_-]").expect("static filename pattern"));

/// Lowercases `title`, collapses every run of characters outside `[a-z0-9]`
/// into a single hyphen and trims hyphens from both ends.
///
/// `"My Doc!"` becomes `"my-doc"`.
pub fn slugify(title: &str) -> String {
    let lower = title.to_lowercase();
    NON_SLUG
        .replace_all(&lower, "-")
        .trim_matches('-')
        .to_string()
}

/// Replaces spaces with underscores and drops anything outside
/// `[A-Za-z0-9_-]`. Used for file stems and collection directory names.
///
/// `"HR Team"` becomes `"HR_Team"`, `"My Doc!"` becomes `"My_Doc"`.
pub fn filename_safe(title: &str) -> String {
    let underscored = title.replace(' ', "_");
    NON_FILENAME.replace_all(&underscored, "").into_owned()
}
