//! Input topic table: schema descriptor and CSV loading.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info, instrument};

use contentfactory_artifacts::document_file_name;
use contentfactory_shared::{ContentFactoryError, Result, TopicRow};

use crate::paths::{full_url, slugify};

pub const TOPIC_COLUMN: &str = "topic";
pub const KEYWORD_COLUMN: &str = "keyword / h1";
pub const CATEGORY_COLUMN: &str = "category";

/// Default 1-based column where the outline sections begin.
pub const DEFAULT_OUTLINE_START: usize = 8;

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// Describes where the fields of a topic row live in the input table.
///
/// The required columns are found by (lower-cased) name; outline sections are
/// every cell from `outline_start` (1-based) to the end of the row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub outline_start: usize,
    /// Extension used to check for document file name collisions.
    pub document_extension: String,
}

impl Default for TableSchema {
    fn default() -> Self {
        Self {
            outline_start: DEFAULT_OUTLINE_START,
            document_extension: "docx".into(),
        }
    }
}

/// Zero-based positions resolved against a concrete header row.
#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    topic: usize,
    keyword: usize,
    category: usize,
    outline_start: usize,
}

impl TableSchema {
    pub fn with_outline_start(outline_start: usize) -> Self {
        Self {
            outline_start,
            ..Self::default()
        }
    }

    fn resolve(&self, headers: &[String]) -> Result<ColumnMap> {
        if self.outline_start == 0 || self.outline_start > headers.len() {
            return Err(ContentFactoryError::malformed_schema(format!(
                "outline start column {} is outside the table's {} columns",
                self.outline_start,
                headers.len()
            )));
        }
        let outline_start = self.outline_start - 1;

        let find = |name: &str| -> Result<usize> {
            let idx = headers.iter().position(|h| h == name).ok_or_else(|| {
                ContentFactoryError::malformed_schema(format!(
                    "required column '{name}' is missing"
                ))
            })?;
            if idx >= outline_start {
                return Err(ContentFactoryError::malformed_schema(format!(
                    "required column '{name}' (column {}) overlaps the outline columns starting at column {}",
                    idx + 1,
                    self.outline_start
                )));
            }
            Ok(idx)
        };

        Ok(ColumnMap {
            topic: find(TOPIC_COLUMN)?,
            keyword: find(KEYWORD_COLUMN)?,
            category: find(CATEGORY_COLUMN)?,
            outline_start,
        })
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// A validated topic table.
#[derive(Debug, Clone)]
pub struct TopicTable {
    /// Lower-cased header names in input order.
    pub headers: Vec<String>,
    pub rows: Vec<TopicRow>,
}

impl TopicTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Load and validate the topic table at `path`.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_table(path: &Path, schema: &TableSchema, domain: &str) -> Result<TopicTable> {
    let file = std::fs::File::open(path).map_err(|e| ContentFactoryError::io(path, e))?;
    let table = parse_table(file, schema, domain)?;
    info!(rows = table.len(), "topic table loaded");
    Ok(table)
}

/// Parse and validate a topic table from any CSV source.
pub fn parse_table<R: Read>(source: R, schema: &TableSchema, domain: &str) -> Result<TopicTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(source);

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    let columns = schema.resolve(&headers)?;

    let mut rows = Vec::new();
    let mut seen_topics = HashSet::new();
    let mut seen_files = HashSet::new();

    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(csv_err)?;
        let line = idx + 2;

        if record.len() > headers.len() {
            return Err(ContentFactoryError::malformed_schema(format!(
                "line {line}: {} cells but the header has {}",
                record.len(),
                headers.len()
            )));
        }
        let cell = |i: usize| record.get(i).unwrap_or("").trim().to_string();

        let topic = cell(columns.topic);
        if topic.is_empty() {
            return Err(ContentFactoryError::malformed_schema(format!(
                "line {line}: empty topic"
            )));
        }
        if !seen_topics.insert(topic.clone()) {
            return Err(ContentFactoryError::malformed_schema(format!(
                "line {line}: duplicate topic '{topic}'"
            )));
        }
        let file_name = document_file_name(&topic, &schema.document_extension);
        if !seen_files.insert(file_name.clone()) {
            return Err(ContentFactoryError::malformed_schema(format!(
                "line {line}: topic '{topic}' maps to document {file_name}, already used by another row"
            )));
        }

        let sections: Vec<String> = record
            .iter()
            .skip(columns.outline_start)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if sections.is_empty() {
            return Err(ContentFactoryError::malformed_schema(format!(
                "line {line}: topic '{topic}' has no outline sections"
            )));
        }

        let h1_keyword = cell(columns.keyword);
        let url_path = slugify(&h1_keyword).map_err(|e| {
            ContentFactoryError::validation(format!("line {line}: topic '{topic}': {e}"))
        })?;
        let full = full_url(domain, &url_path);

        debug!(%topic, %url_path, sections = sections.len(), "row accepted");
        rows.push(TopicRow {
            topic,
            h1_keyword,
            category: cell(columns.category),
            url_path,
            full_url: full,
            sections,
            definition: None,
            article: None,
            record: record.iter().map(str::to_string).collect(),
        });
    }

    Ok(TopicTable { headers, rows })
}

fn csv_err(e: csv::Error) -> ContentFactoryError {
    ContentFactoryError::Csv(e.to_string())
}
