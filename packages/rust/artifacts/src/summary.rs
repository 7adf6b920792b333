//! Summary table: every input column plus the generated text.

use std::path::Path;

use tracing::{debug, instrument};

use contentfactory_shared::{ContentFactoryError, Result, TopicRow};

pub const URL_PATH_COLUMN: &str = "url path";
pub const FULL_PATH_COLUMN: &str = "full path";
pub const DEFINITION_COLUMN: &str = "definition";
pub const ARTICLE_COLUMN: &str = "article";

/// Rectangular table ready to be written as CSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SummaryTable {
    /// Build the summary from the input headers and the processed rows.
    ///
    /// Derived and generated columns overwrite same-named input columns, and
    /// are appended in `url path`, `full path`, `definition`, `article` order
    /// otherwise.
    pub fn build(input_headers: &[String], rows: &[TopicRow]) -> Self {
        let mut headers = input_headers.to_vec();
        let mut column = |name: &str| -> usize {
            match headers.iter().position(|h| h == name) {
                Some(idx) => idx,
                None => {
                    headers.push(name.to_string());
                    headers.len() - 1
                }
            }
        };
        let url_idx = column(URL_PATH_COLUMN);
        let full_idx = column(FULL_PATH_COLUMN);
        let def_idx = column(DEFINITION_COLUMN);
        let article_idx = column(ARTICLE_COLUMN);

        let width = headers.len();
        let rows = rows
            .iter()
            .map(|row| {
                let mut cells = row.record.clone();
                cells.resize(width, String::new());
                cells[url_idx] = row.url_path.clone();
                cells[full_idx] = row.full_url.clone();
                cells[def_idx] = row.definition.clone().unwrap_or_default();
                cells[article_idx] = row.article.clone().unwrap_or_default();
                cells
            })
            .collect();

        Self { headers, rows }
    }

    /// Write the table as CSV to `path`.
    #[instrument(skip(self), fields(rows = self.rows.len()))]
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path).map_err(|e| csv_err(path, e))?;
        writer
            .write_record(&self.headers)
            .map_err(|e| csv_err(path, e))?;
        for row in &self.rows {
            writer.write_record(row).map_err(|e| csv_err(path, e))?;
        }
        writer
            .flush()
            .map_err(|e| ContentFactoryError::io(path, e))?;
        debug!(path = %path.display(), "summary table written");
        Ok(())
    }
}

fn csv_err(path: &Path, e: csv::Error) -> ContentFactoryError {
    ContentFactoryError::Csv(format!("{}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(topic: &str, record: &[&str]) -> TopicRow {
        TopicRow {
            topic: topic.into(),
            h1_keyword: topic.into(),
            category: "Marketing".into(),
            url_path: format!("/{}", topic.to_lowercase()),
            full_url: format!("https://example.com/{}", topic.to_lowercase()),
            sections: vec!["Intro".into()],
            definition: Some(format!("{topic} defined")),
            article: Some(format!("<p>{topic}</p>")),
            record: record.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn appends_derived_and_generated_columns() {
        let table = SummaryTable::build(
            &headers(&["topic", "keyword / h1", "category", "section 1"]),
            &[row("SEO", &["SEO", "SEO", "Marketing", "Intro"])],
        );
        assert_eq!(
            table.headers,
            headers(&[
                "topic",
                "keyword / h1",
                "category",
                "section 1",
                "url path",
                "full path",
                "definition",
                "article"
            ])
        );
        assert_eq!(table.rows[0][4], "/seo");
        assert_eq!(table.rows[0][6], "SEO defined");
        assert_eq!(table.rows[0][7], "<p>SEO</p>");
    }

    #[test]
    fn overwrites_existing_path_columns() {
        let table = SummaryTable::build(
            &headers(&["topic", "url path", "full path"]),
            &[row("SEO", &["SEO", "stale", "stale"])],
        );
        assert_eq!(table.headers.len(), 5);
        assert_eq!(table.rows[0][1], "/seo");
        assert_eq!(table.rows[0][2], "https://example.com/seo");
    }

    #[test]
    fn short_records_are_padded() {
        let table = SummaryTable::build(
            &headers(&["topic", "a", "b", "c"]),
            &[row("SEO", &["SEO"])],
        );
        assert!(table.rows.iter().all(|r| r.len() == table.headers.len()));
        assert_eq!(table.rows[0][2], "");
    }

    #[test]
    fn writes_quoted_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.csv");
        let mut r = row("SEO", &["SEO"]);
        r.article = Some("<p>a, \"b\"\nc</p>".into());
        SummaryTable::build(&headers(&["topic"]), &[r])
            .write_csv(&path)
            .unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let header_row = reader.headers().unwrap().clone();
        assert_eq!(header_row.len(), 5);
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(&record[4], "<p>a, \"b\"\nc</p>");
    }
}
