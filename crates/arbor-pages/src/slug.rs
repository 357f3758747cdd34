//! URL slug generation.

/// Slug used when a name has no alphanumeric characters.
const EMPTY_SLUG: &str = "n-a";

/// Convert a display name into a URL segment.
///
/// Transliterates to ASCII, lowercases, collapses every run of characters
/// outside `[a-z0-9]` into a single `-` and trims dashes from both ends.
/// Returns `"n-a"` when nothing is left.
#[must_use]
pub fn slugify(name: &str) -> String {
    let slug = slug::slugify(name);

    if slug.is_empty() {
        EMPTY_SLUG.to_owned()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_name() {
        assert_eq!(slugify("About"), "about");
    }

    #[test]
    fn test_spaces_and_punctuation_collapse() {
        assert_eq!(slugify("About us -- the Team!"), "about-us-the-team");
    }

    #[test]
    fn test_leading_and_trailing_separators_trimmed() {
        assert_eq!(slugify("  ...News 2024...  "), "news-2024");
    }

    #[test]
    fn test_non_ascii_letters_transliterated() {
        assert_eq!(slugify("Café Menü"), "cafe-menu");
    }

    #[test]
    fn test_accented_name_differs_from_truncated_name() {
        assert_ne!(slugify("Café"), slugify("Caf"));
    }

    #[test]
    fn test_empty_name() {
        assert_eq!(slugify(""), "n-a");
        assert_eq!(slugify("!!!"), "n-a");
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(slugify("Contact Form"), slugify("Contact Form"));
    }
}
