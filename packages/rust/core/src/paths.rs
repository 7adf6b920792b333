//! URL path and absolute URL derivation for topic labels.

use std::sync::LazyLock;

use regex::Regex;

use contentfactory_shared::{ContentFactoryError, Result};

/// Turn a free-text label into a URL path such as `/content-marketing`.
///
/// Lower-cases the label, drops everything except ASCII letters, digits and
/// spaces, then joins the remaining words with single hyphens. Fails when no
/// slug characters survive.
pub fn slugify(label: &str) -> Result<String> {
    static NON_SLUG_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[^a-z0-9 ]").expect("valid regex"));

    let lowered = label.to_lowercase();
    let stripped = NON_SLUG_RE.replace_all(&lowered, "");
    let slug = stripped
        .split(' ')
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if slug.is_empty() {
        return Err(ContentFactoryError::validation(format!(
            "label '{label}' has no letters or digits to build a URL path from"
        )));
    }

    Ok(format!("/{slug}"))
}

/// `https://` + domain + path, with no validation or escaping.
pub fn full_url(domain: &str, path: &str) -> String {
    format!("https://{domain}{path}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_basic_labels() {
        assert_eq!(slugify("Content Marketing").unwrap(), "/content-marketing");
        assert_eq!(slugify("SEO").unwrap(), "/seo");
        assert_eq!(slugify("Web 3.0 Basics").unwrap(), "/web-30-basics");
    }

    #[test]
    fn slugify_strips_punctuation_and_trailing_hyphen() {
        assert_eq!(slugify("What is B2B?").unwrap(), "/what-is-b2b");
        assert_eq!(slugify("Marketing: ").unwrap(), "/marketing");
        assert_eq!(slugify("  -- Growth --  ").unwrap(), "/growth");
    }

    #[test]
    fn slugify_collapses_space_runs() {
        assert_eq!(slugify("Pay  Per   Click").unwrap(), "/pay-per-click");
        assert_eq!(slugify("A & B").unwrap(), "/a-b");
    }

    #[test]
    fn slugify_drops_non_ascii_letters() {
        assert_eq!(slugify("Café Culture").unwrap(), "/caf-culture");
    }

    #[test]
    fn slugify_rejects_labels_without_slug_characters() {
        assert!(slugify("").is_err());
        assert!(slugify("   ").is_err());
        let err = slugify("?!").unwrap_err();
        assert!(matches!(err, ContentFactoryError::Validation { .. }));
    }

    #[test]
    fn slug_output_is_clean_for_mixed_labels() {
        let labels = [
            "Hello, World!",
            "  leading and trailing  ",
            "multi---dash -- words",
            "Numbers 123 and 456",
            "Tabs\tand\nnewlines",
            "UPPER lower MiXeD",
            "e-mail / SMS marketing (2024)",
        ];
        for label in labels {
            let path = slugify(label).unwrap();
            let slug = path.strip_prefix('/').expect("leading slash");
            assert!(
                slug.chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
                "{label:?} -> {path}"
            );
            assert!(!slug.starts_with('-') && !slug.ends_with('-'), "{label:?} -> {path}");
            assert!(!slug.contains("--"), "{label:?} -> {path}");
        }
    }

    #[test]
    fn full_url_prefixes_domain() {
        let path = slugify("Email Marketing").unwrap();
        let url = full_url("example.com", &path);
        assert_eq!(url, "https://example.com/email-marketing");
        assert!(url.starts_with("https://example.com/"));
    }
}
