//! Same-category link suggestions for a topic.

use contentfactory_shared::{RelatedLink, TopicRow};

/// Every row in `target`'s category whose full URL differs from the
/// target's, as (label, URL) pairs in table order.
///
/// An unknown target yields no links.
pub fn related_links(rows: &[TopicRow], target: &str) -> Vec<RelatedLink> {
    let Some(current) = rows.iter().find(|r| r.topic == target) else {
        return Vec::new();
    };

    rows.iter()
        .filter(|r| r.category == current.category && r.full_url != current.full_url)
        .map(|r| RelatedLink {
            label: r.topic.clone(),
            url: r.full_url.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(topic: &str, category: &str, url: &str) -> TopicRow {
        TopicRow {
            topic: topic.into(),
            h1_keyword: topic.into(),
            category: category.into(),
            url_path: String::new(),
            full_url: url.into(),
            sections: vec!["Intro".into()],
            definition: None,
            article: None,
            record: Vec::new(),
        }
    }

    #[test]
    fn returns_peers_in_table_order() {
        let rows = vec![
            row("SEO", "Marketing", "https://x.com/seo"),
            row("Rust", "Programming", "https://x.com/rust"),
            row("PPC", "Marketing", "https://x.com/ppc"),
            row("Email", "Marketing", "https://x.com/email"),
        ];
        let links = related_links(&rows, "PPC");
        let labels: Vec<_> = links.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, vec!["SEO", "Email"]);
        assert_eq!(links[0].url, "https://x.com/seo");
    }

    #[test]
    fn empty_without_peers() {
        let rows = vec![
            row("SEO", "Marketing", "https://x.com/seo"),
            row("Rust", "Programming", "https://x.com/rust"),
        ];
        assert!(related_links(&rows, "Rust").is_empty());
    }

    #[test]
    fn peers_sharing_the_target_url_are_excluded() {
        let rows = vec![
            row("SEO", "Marketing", "https://x.com/seo"),
            row("Search Optimization", "Marketing", "https://x.com/seo"),
            row("PPC", "Marketing", "https://x.com/ppc"),
        ];
        let links = related_links(&rows, "SEO");
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].label, "PPC");
    }

    #[test]
    fn unknown_target_has_no_links() {
        let rows = vec![row("SEO", "Marketing", "https://x.com/seo")];
        assert!(related_links(&rows, "Nope").is_empty());
    }
}
