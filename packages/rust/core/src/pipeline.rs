//! End-to-end batch pipeline: topic table → prompts → generation → documents → archive.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use contentfactory_artifacts::{
    ArticleDocument, DocumentWriter, SummaryTable, document_file_name, package,
};
use contentfactory_document::{ConvertOptions, convert};
use contentfactory_generation::{PromptMode, RateLimiter, TextGenerator, build_prompt};
use contentfactory_shared::{
    BatchId, ContentFactoryError, GenerationSettings, RelatedLink, Result, TopicRow,
};

use crate::related::related_links;
use crate::table::TopicTable;

/// Immutable settings for one batch run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Sampling parameters sent with every generation request.
    pub settings: GenerationSettings,
    /// Directory receiving the documents and the summary table.
    pub output_dir: PathBuf,
    /// File name of the summary table inside `output_dir`.
    pub summary_file_name: String,
    /// Where the archive is written.
    pub archive_path: PathBuf,
    /// Markup conversion options.
    pub convert: ConvertOptions,
}

/// Result of a batch run.
#[derive(Debug)]
pub struct BatchResult {
    pub batch_id: BatchId,
    pub started_at: DateTime<Utc>,
    /// Processed rows, each carrying its definition and article.
    pub rows: Vec<TopicRow>,
    /// Documents in input order.
    pub documents: Vec<PathBuf>,
    pub summary_path: PathBuf,
    pub archive_path: PathBuf,
    pub elapsed: Duration,
}

impl BatchResult {
    pub fn topic_count(&self) -> usize {
        self.rows.len()
    }
}

/// Progress callback for reporting batch status.
pub trait BatchProgress: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called before generation starts for a topic.
    fn topic_started(&self, topic: &str, current: usize, total: usize);
    /// Called after a topic's document has been written.
    fn document_written(&self, path: &str, current: usize, total: usize);
    /// Called when the batch completes.
    fn done(&self, result: &BatchResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl BatchProgress for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn topic_started(&self, _topic: &str, _current: usize, _total: usize) {}
    fn document_written(&self, _path: &str, _current: usize, _total: usize) {}
    fn done(&self, _result: &BatchResult) {}
}

/// Run the full batch.
///
/// 1. For each row in order: definition prompt, article prompt, conversion,
///    document
/// 2. Summary table
/// 3. Archive of the documents plus the summary
///
/// The first failure aborts the run; files already written stay in place.
#[instrument(skip_all, fields(rows = table.len(), out = %config.output_dir.display()))]
pub async fn run_batch<G, L, W>(
    config: &BatchConfig,
    table: TopicTable,
    generator: &G,
    limiter: &L,
    writer: &W,
    progress: &dyn BatchProgress,
) -> Result<BatchResult>
where
    G: TextGenerator,
    L: RateLimiter,
    W: DocumentWriter,
{
    let start = Instant::now();
    let started_at = Utc::now();
    let batch_id = BatchId::new();

    config.settings.validate()?;
    info!(%batch_id, model = %config.settings.model, "starting batch");

    progress.phase("Preparing output directory");
    std::fs::create_dir_all(&config.output_dir)
        .map_err(|e| ContentFactoryError::io(&config.output_dir, e))?;

    let TopicTable { headers, mut rows } = table;
    let total = rows.len();
    let mut documents = Vec::with_capacity(total);

    // --- Phase 1: Generation ---
    progress.phase("Generating articles");
    for idx in 0..total {
        let related = related_links(&rows, &rows[idx].topic);
        let row = &mut rows[idx];
        progress.topic_started(&row.topic, idx + 1, total);
        debug!(topic = %row.topic, related = related.len(), "processing topic");

        let definition = request(
            PromptMode::Definition,
            row,
            &related,
            generator,
            limiter,
            &config.settings,
        )
        .await?;
        let article = request(
            PromptMode::Article,
            row,
            &related,
            generator,
            limiter,
            &config.settings,
        )
        .await?;

        let blocks = convert(&article, &config.convert)?;
        let doc = ArticleDocument {
            title: row.h1_keyword.clone(),
            lead: definition.clone(),
            blocks,
        };
        let dest = config
            .output_dir
            .join(document_file_name(&row.topic, writer.extension()));
        writer.write(&doc, &dest)?;

        row.definition = Some(definition);
        row.article = Some(article);
        progress.document_written(&dest.display().to_string(), idx + 1, total);
        info!(topic = %row.topic, blocks = doc.blocks.len(), "topic done");
        documents.push(dest);
    }

    // --- Phase 2: Summary ---
    progress.phase("Writing summary table");
    let summary_path = config.output_dir.join(&config.summary_file_name);
    SummaryTable::build(&headers, &rows).write_csv(&summary_path)?;

    // --- Phase 3: Archive ---
    progress.phase("Packaging archive");
    let mut archived = documents.clone();
    archived.push(summary_path.clone());
    let archive_path = package(&config.archive_path, &archived)?;

    let result = BatchResult {
        batch_id,
        started_at,
        rows,
        documents,
        summary_path,
        archive_path,
        elapsed: start.elapsed(),
    };

    info!(
        batch_id = %result.batch_id,
        topics = result.topic_count(),
        archive = %result.archive_path.display(),
        elapsed_ms = result.elapsed.as_millis() as u64,
        "batch complete"
    );
    progress.done(&result);

    Ok(result)
}

/// Build the `mode` prompt for `row`, wait for the limiter, then request it.
async fn request<G, L>(
    mode: PromptMode,
    row: &TopicRow,
    related: &[RelatedLink],
    generator: &G,
    limiter: &L,
    settings: &GenerationSettings,
) -> Result<String>
where
    G: TextGenerator,
    L: RateLimiter,
{
    let prompt = build_prompt(mode, &row.topic, &row.sections, related);
    limiter.acquire().await;
    debug!(topic = %row.topic, mode = mode.as_str(), prompt_len = prompt.len(), "requesting completion");
    generator.complete(&prompt, settings).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use contentfactory_artifacts::DocxWriter;
    use contentfactory_generation::FixedIntervalGate;

    use crate::table::{TableSchema, parse_table};

    const TABLE: &str = "\
topic,keyword / h1,category,url path,full path,notes,status,section 1,section 2
Content Marketing,content marketing,Marketing,,,,draft,Intro,Benefits
Email Marketing,email marketing,Marketing,,,,draft,Intro,
";

    /// Answers definition prompts with a sentence and article prompts with HTML.
    #[derive(Default)]
    struct ScriptedGenerator {
        prompts: Mutex<Vec<String>>,
    }

    impl TextGenerator for ScriptedGenerator {
        async fn complete(&self, prompt: &str, _settings: &GenerationSettings) -> Result<String> {
            let reply = if prompt.contains("short, clear and concise definition") {
                "A short definition.".to_string()
            } else {
                "<h2>Intro</h2><p>Body text.</p><ul><li>One</li><li>Two</li></ul>".to_string()
            };
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(reply)
        }
    }

    /// Fails on the n-th call (1-based).
    struct FailingGenerator {
        calls: AtomicUsize,
        fail_on: usize,
    }

    impl TextGenerator for FailingGenerator {
        async fn complete(&self, _prompt: &str, _settings: &GenerationSettings) -> Result<String> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n == self.fail_on {
                Err(ContentFactoryError::Generation("status 500".into()))
            } else {
                Ok("<p>ok</p>".into())
            }
        }
    }

    fn config(dir: &std::path::Path) -> BatchConfig {
        BatchConfig {
            settings: GenerationSettings::default(),
            output_dir: dir.join("generated_articles"),
            summary_file_name: "generated_articles.csv".into(),
            archive_path: dir.join("generated_articles.zip"),
            convert: ConvertOptions::default(),
        }
    }

    fn table() -> TopicTable {
        parse_table(TABLE.as_bytes(), &TableSchema::default(), "example.com").unwrap()
    }

    #[tokio::test]
    async fn two_marketing_rows_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let generator = ScriptedGenerator::default();

        let result = run_batch(
            &config,
            table(),
            &generator,
            &FixedIntervalGate::disabled(),
            &DocxWriter,
            &SilentProgress,
        )
        .await
        .unwrap();

        assert_eq!(result.topic_count(), 2);
        for row in &result.rows {
            assert_eq!(row.definition.as_deref(), Some("A short definition."));
            assert!(row.article.as_deref().unwrap().starts_with("<h2>"));
        }

        let names: Vec<_> = result
            .documents
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["Content_Marketing_article.docx", "Email_Marketing_article.docx"]
        );
        assert!(result.documents.iter().all(|p| p.exists()));

        // Each article prompt links to the other row only.
        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 4);
        assert!(prompts[1].contains("- Email Marketing: https://example.com/email-marketing"));
        assert!(!prompts[1].contains("https://example.com/content-marketing"));
        assert!(prompts[3].contains("- Content Marketing: https://example.com/content-marketing"));
        assert!(!prompts[3].contains("https://example.com/email-marketing"));

        let mut reader = csv::Reader::from_path(&result.summary_path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.len(), 11);
        assert_eq!(&headers[9], "definition");
        assert_eq!(&headers[10], "article");
        let records: Vec<_> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(&records[0][0], "Content Marketing");
        assert_eq!(&records[0][3], "/content-marketing");
        assert_eq!(&records[1][4], "https://example.com/email-marketing");
        assert_eq!(&records[1][9], "A short definition.");

        let archive = zip::ZipArchive::new(File::open(&result.archive_path).unwrap()).unwrap();
        assert_eq!(archive.len(), 3);
        let mut entries: Vec<_> = archive.file_names().map(str::to_string).collect();
        entries.sort();
        assert_eq!(
            entries,
            vec![
                "Content_Marketing_article.docx",
                "Email_Marketing_article.docx",
                "generated_articles.csv"
            ]
        );
    }

    #[tokio::test]
    async fn generation_failure_aborts_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let generator = FailingGenerator {
            calls: AtomicUsize::new(0),
            fail_on: 3,
        };

        let err = run_batch(
            &config,
            table(),
            &generator,
            &FixedIntervalGate::disabled(),
            &DocxWriter,
            &SilentProgress,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ContentFactoryError::Generation(_)));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 3);
        // The first topic's document stays; nothing else is produced.
        assert!(config.output_dir.join("Content_Marketing_article.docx").exists());
        assert!(!config.output_dir.join("generated_articles.csv").exists());
        assert!(!config.archive_path.exists());
    }

    #[tokio::test]
    async fn strict_mode_rejects_malformed_articles() {
        struct Sloppy;
        impl TextGenerator for Sloppy {
            async fn complete(&self, _p: &str, _s: &GenerationSettings) -> Result<String> {
                Ok("<p>outer<p>inner</p></p>".into())
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path());
        config.convert = ConvertOptions { strict: true };

        let err = run_batch(
            &config,
            table(),
            &Sloppy,
            &FixedIntervalGate::disabled(),
            &DocxWriter,
            &SilentProgress,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ContentFactoryError::Conversion(_)));
    }

    #[tokio::test]
    async fn invalid_settings_fail_before_any_output() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path());
        config.settings.temperature = 3.5;

        let err = run_batch(
            &config,
            table(),
            &ScriptedGenerator::default(),
            &FixedIntervalGate::disabled(),
            &DocxWriter,
            &SilentProgress,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ContentFactoryError::Config { .. }));
        assert!(!config.output_dir.exists());
    }
}
