//! HTML-to-styled-block conversion for generated articles.
//!
//! Tokenizes article markup with html5ever and runs the literal tag stream
//! through [`BlockScanner`]. Only `h2`, `h3`, `h4`, `p`, `ul`, `ol` and `li`
//! are recognized; every other tag, attribute and inline style is ignored.

mod events;
mod scanner;

use tracing::{debug, instrument};

use contentfactory_shared::{ContentFactoryError, Result, StyledBlock};

pub use events::{MarkupEvent, markup_events};
pub use scanner::BlockScanner;

/// Tags the converter gives meaning to.
const RECOGNIZED_TAGS: [&str; 7] = ["h2", "h3", "h4", "p", "ul", "ol", "li"];

/// Tags whose content is inline text only.
const TEXT_ONLY_TAGS: [&str; 4] = ["h2", "h3", "h4", "p"];

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Options for the conversion.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Reject markup whose recognized tags are unbalanced or misnested instead
    /// of converting whatever the scanner picks up.
    pub strict: bool,
}

// ---------------------------------------------------------------------------
// Converter
// ---------------------------------------------------------------------------

/// Convert article HTML into styled blocks, in document order.
///
/// In the default mode this never fails: unknown tags produce nothing and
/// stray end tags only reset scanner state.
#[instrument(skip(html), fields(len = html.len(), strict = opts.strict))]
pub fn convert(html: &str, opts: &ConvertOptions) -> Result<Vec<StyledBlock>> {
    let events = markup_events(html);

    if opts.strict {
        let problems = balance_problems(&events);
        if !problems.is_empty() {
            return Err(ContentFactoryError::Conversion(format!(
                "malformed markup ({} problem(s)): {}",
                problems.len(),
                problems.join("; ")
            )));
        }
    }

    let mut scanner = BlockScanner::new();
    for event in &events {
        match event {
            MarkupEvent::Start(tag) => scanner.start_tag(tag),
            MarkupEvent::End(tag) => scanner.end_tag(tag),
            MarkupEvent::Text(text) => scanner.text(text),
        }
    }

    let blocks = scanner.into_blocks();
    debug!(blocks = blocks.len(), events = events.len(), "conversion complete");
    Ok(blocks)
}

/// Check the recognized tags for balance and nesting.
///
/// Every end tag must close the innermost open recognized tag, nothing may
/// open inside `h2`/`h3`/`h4`/`p`, and nothing may be left open at the end.
/// Unrecognized tags are not checked.
fn balance_problems(events: &[MarkupEvent]) -> Vec<String> {
    let mut open: Vec<&str> = Vec::new();
    let mut problems = Vec::new();

    for event in events {
        match event {
            MarkupEvent::Start(tag) if RECOGNIZED_TAGS.contains(&tag.as_str()) => {
                if let Some(parent) = open.last().filter(|p| TEXT_ONLY_TAGS.contains(*p)) {
                    problems.push(format!("<{tag}> opened inside <{parent}>"));
                }
                open.push(tag);
            }
            MarkupEvent::End(tag) if RECOGNIZED_TAGS.contains(&tag.as_str()) => {
                match open.last() {
                    Some(top) if *top == tag.as_str() => {
                        open.pop();
                    }
                    Some(top) => problems.push(format!("</{tag}> while <{top}> is open")),
                    None => problems.push(format!("</{tag}> without a matching <{tag}>")),
                }
            }
            _ => {}
        }
    }

    for tag in open.iter().rev() {
        problems.push(format!("<{tag}> is never closed"));
    }
    problems
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use contentfactory_shared::BlockKind;

    fn lenient(html: &str) -> Vec<(BlockKind, String)> {
        convert(html, &ConvertOptions::default())
            .unwrap()
            .into_iter()
            .map(|b| (b.kind, b.text))
            .collect()
    }

    fn strict() -> ConvertOptions {
        ConvertOptions { strict: true }
    }

    #[test]
    fn converts_headings_paragraphs_and_bullets() {
        let blocks = lenient("<h2>A</h2><p>B</p><ul><li>C</li><li>D</li></ul>");
        assert_eq!(
            blocks,
            vec![
                (BlockKind::Heading2, "A".to_string()),
                (BlockKind::Paragraph, "B".to_string()),
                (BlockKind::BulletItem, "C".to_string()),
                (BlockKind::BulletItem, "D".to_string()),
            ]
        );
    }

    #[test]
    fn heading_levels_follow_tag() {
        let blocks = lenient("<h2>Two</h2><h3>Three</h3><h4>Four</h4>");
        let kinds: Vec<BlockKind> = blocks.into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            kinds,
            vec![BlockKind::Heading2, BlockKind::Heading3, BlockKind::Heading4]
        );
    }

    #[test]
    fn ordered_list_items_are_numbered() {
        let blocks = lenient("<ol><li>First</li><li>Second</li></ol>");
        assert_eq!(
            blocks,
            vec![
                (BlockKind::NumberedItem, "First".to_string()),
                (BlockKind::NumberedItem, "Second".to_string()),
            ]
        );
    }

    #[test]
    fn orphan_list_item_defaults_to_numbered() {
        let blocks = lenient("<li>Loose</li>");
        assert_eq!(blocks, vec![(BlockKind::NumberedItem, "Loose".to_string())]);
    }

    #[test]
    fn nested_paragraphs_yield_both_texts() {
        let blocks = lenient("<p>outer<p>inner</p></p>");
        assert_eq!(
            blocks,
            vec![
                (BlockKind::Paragraph, "outer".to_string()),
                (BlockKind::Paragraph, "inner".to_string()),
            ]
        );
    }

    #[test]
    fn inline_emphasis_truncates_paragraph() {
        let blocks = lenient("<p>Read <strong>this</strong> carefully.</p>");
        assert_eq!(
            blocks,
            vec![
                (BlockKind::Paragraph, "Read".to_string()),
                (BlockKind::Paragraph, "this".to_string()),
            ]
        );
    }

    #[test]
    fn pretty_printed_markup_skips_whitespace() {
        let html = r#"
            <h2>Overview</h2>
            <ul>
                <li>One</li>
                <li>Two</li>
            </ul>
        "#;
        let blocks = lenient(html);
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0], (BlockKind::Heading2, "Overview".to_string()));
        assert_eq!(blocks[2], (BlockKind::BulletItem, "Two".to_string()));
    }

    #[test]
    fn entities_are_decoded_and_attributes_ignored() {
        let blocks = lenient(r#"<p class="lead" id="x">Fish &amp; Chips</p>"#);
        assert_eq!(blocks, vec![(BlockKind::Paragraph, "Fish & Chips".to_string())]);
    }

    #[test]
    fn unknown_tags_produce_nothing() {
        let html = r#"<h1>Title</h1><table><tr><td>cell</td></tr></table><img src="a.png"><div>loose</div>"#;
        assert!(lenient(html).is_empty());
    }

    #[test]
    fn empty_input_yields_no_blocks() {
        assert!(lenient("").is_empty());
    }

    #[test]
    fn strict_accepts_balanced_markup() {
        let blocks = convert("<h2>A</h2><p>B</p><ol><li>C</li></ol>", &strict()).unwrap();
        assert_eq!(blocks.len(), 3);
    }

    #[test]
    fn line_break_does_not_end_paragraph() {
        assert_eq!(
            lenient("<p>line one<br>line two</p>"),
            vec![
                (BlockKind::Paragraph, "line one".to_string()),
                (BlockKind::Paragraph, "line two".to_string()),
            ]
        );
    }

    #[test]
    fn void_tag_inside_list_item_keeps_item_open() {
        assert_eq!(
            lenient("<li>first<img src=x>second</li>"),
            vec![
                (BlockKind::NumberedItem, "first".to_string()),
                (BlockKind::NumberedItem, "second".to_string()),
            ]
        );
        assert_eq!(
            lenient("<ul><li>a<br>b</li></ul>"),
            vec![
                (BlockKind::BulletItem, "a".to_string()),
                (BlockKind::BulletItem, "b".to_string()),
            ]
        );
    }

    #[test]
    fn self_closing_break_ends_the_leaf() {
        assert_eq!(
            lenient("<p>a<br/>b</p>"),
            vec![(BlockKind::Paragraph, "a".to_string())]
        );
    }

    #[test]
    fn unclosed_items_are_not_closed_implicitly() {
        assert_eq!(
            lenient("<ul><li>A<li>B</ul><li>C"),
            vec![
                (BlockKind::BulletItem, "A".to_string()),
                (BlockKind::BulletItem, "B".to_string()),
                (BlockKind::NumberedItem, "C".to_string()),
            ]
        );
    }

    #[test]
    fn strict_rejects_nested_paragraphs() {
        let err = convert("<p>outer<p>inner</p></p>", &strict()).unwrap_err();
        assert!(matches!(err, ContentFactoryError::Conversion(_)));
        assert!(err.to_string().contains("malformed markup"));
        assert!(err.to_string().contains("<p> opened inside <p>"));
    }

    #[test]
    fn strict_rejects_unclosed_paragraph() {
        let err = convert("<p>never closed", &strict()).unwrap_err();
        assert!(err.to_string().contains("<p> is never closed"));
    }

    #[test]
    fn strict_rejects_unclosed_list_items() {
        let err = convert("<ul><li>A<li>B</ul>", &strict()).unwrap_err();
        assert!(err.to_string().contains("</ul> while <li> is open"));
    }

    #[test]
    fn strict_rejects_sibling_paragraphs_without_end_tags() {
        assert!(convert("<p>a<p>b", &strict()).is_err());
    }

    #[test]
    fn strict_rejects_stray_end_tag() {
        let err = convert("<p>a</p></li>", &strict()).unwrap_err();
        assert!(err.to_string().contains("</li> without a matching <li>"));
    }

    #[test]
    fn strict_ignores_unrecognized_tags() {
        let blocks = convert(
            "<div><p>a<br>b <em>c</em></p><ul><li>x<img src=y></li></ul></div>",
            &strict(),
        )
        .unwrap();
        assert_eq!(blocks.len(), 4);
    }

    #[test]
    fn strict_rejects_unclosed_heading() {
        assert!(convert("<h2>Never closed", &strict()).is_err());
        // Lenient mode still recovers the text.
        assert_eq!(
            lenient("<h2>Never closed"),
            vec![(BlockKind::Heading2, "Never closed".to_string())]
        );
    }
}
