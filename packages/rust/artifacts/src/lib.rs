//! Output artifacts: per-topic documents, the summary table, and the archive.

pub mod archive;
pub mod docx;
pub mod summary;

pub use archive::package;
pub use docx::{ArticleDocument, DocumentWriter, DocxWriter, write_docx};
pub use summary::SummaryTable;

/// File name of the document produced for `topic`.
///
/// Whitespace and path separators become underscores, e.g.
/// `"Content Marketing"` → `Content_Marketing_article.docx`.
pub fn document_file_name(topic: &str, extension: &str) -> String {
    let stem: String = topic
        .chars()
        .map(|c| {
            if c.is_whitespace() || c == '/' || c == '\\' {
                '_'
            } else {
                c
            }
        })
        .collect();
    format!("{stem}_article.{extension}")
}
