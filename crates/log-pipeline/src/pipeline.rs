//! Pipeline orchestration -- reads lines, classifies them, filters and renders.
//!
//! # Architecture
//! ```text
//! reader -> producer (classify) -> mpsc(1) -> consumer (filter, render) -> writer
//! ```
//!
//! The producer runs in its own task; the consumer runs in the caller's task.
//! At most one entry is in flight between them, so output order equals input
//! order and a slow writer holds the reader back. Both stages stop when the
//! [`CancellationToken`] fires; lines not yet read are skipped.

use std::fmt;

use bytes::Bytes;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use prettylog_core::config::{KeywordConfig, PrettylogConfig};
use prettylog_core::style::StyleTables;
use prettylog_core::types::{LogEntry, SeverityTable};

use crate::classifier::KeywordClassifier;
use crate::error::LogPipelineError;
use crate::filter::{FilterEngine, FilterSpec, Verdict};
use crate::render::{LineRenderer, RenderOptions};
use crate::style::StyleResolver;

/// Entries buffered between producer and consumer.
const HANDOFF_CAPACITY: usize = 1;

/// Counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Lines read from the input
    pub lines_read: u64,
    /// Lines that were not JSON objects
    pub unparsed: u64,
    /// Parsed lines dropped by the filter
    pub filtered: u64,
    /// Lines written to the output
    pub rendered: u64,
}

impl fmt::Display for PipelineStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "read={} unparsed={} filtered={} rendered={}",
            self.lines_read, self.unparsed, self.filtered, self.rendered
        )
    }
}

/// Two-stage log prettifying pipeline.
///
/// # Example
/// ```ignore
/// use prettylog_pipeline::{LogPipeline, FilterSpec};
/// use tokio_util::sync::CancellationToken;
///
/// let pipeline = LogPipeline::builder().filter_spec(spec).build();
/// let stats = pipeline
///     .run(tokio::io::BufReader::new(tokio::io::stdin()), &mut tokio::io::stdout(), CancellationToken::new())
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct LogPipeline {
    classifier: KeywordClassifier,
    renderer: LineRenderer,
}

impl LogPipeline {
    pub fn builder() -> LogPipelineBuilder {
        LogPipelineBuilder::new()
    }

    pub fn classifier(&self) -> &KeywordClassifier {
        &self.classifier
    }

    pub fn renderer(&self) -> &LineRenderer {
        &self.renderer
    }

    /// Runs until `reader` is exhausted, `writer` is closed, or `cancel` fires.
    ///
    /// A closed output (broken pipe) ends the run without an error.
    pub async fn run<R, W>(
        &self,
        reader: R,
        writer: &mut W,
        cancel: CancellationToken,
    ) -> Result<PipelineStats, LogPipelineError>
    where
        R: AsyncBufRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + ?Sized,
    {
        // child token: stopping this run must not cancel the caller's token
        let cancel = cancel.child_token();
        let (tx, rx) = mpsc::channel(HANDOFF_CAPACITY);

        let producer = tokio::spawn(produce(
            self.classifier.clone(),
            reader,
            tx,
            cancel.clone(),
        ));

        let consumed = self.consume(rx, writer, &cancel).await;

        // the producer may be parked on a read that never completes
        cancel.cancel();
        let produced = producer
            .await
            .map_err(|e| LogPipelineError::Channel(format!("producer task failed: {e}")))?;

        let mut stats = consumed?;
        stats.lines_read = produced?;
        debug!(%stats, "pipeline finished");
        Ok(stats)
    }

    async fn consume<W>(
        &self,
        mut rx: mpsc::Receiver<LogEntry>,
        writer: &mut W,
        cancel: &CancellationToken,
    ) -> Result<PipelineStats, LogPipelineError>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let mut stats = PipelineStats::default();

        loop {
            let entry = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("consumer cancelled");
                    break;
                }
                entry = rx.recv() => match entry {
                    Some(entry) => entry,
                    None => break,
                },
            };

            if !entry.is_parsed {
                stats.unparsed += 1;
            }

            let verdict = self.renderer.filter().check(&entry);
            if verdict != Verdict::Show {
                stats.filtered += 1;
                trace!(line = entry.line_number, ?verdict, "line hidden");
                continue;
            }

            let line = self.renderer.output(&entry);
            match write_line(writer, &line).await {
                Ok(()) => stats.rendered += 1,
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                    debug!("output closed, stopping");
                    return Ok(stats);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(stats)
    }
}

async fn write_line<W>(writer: &mut W, line: &[u8]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    writer.write_all(line).await?;
    writer.flush().await
}

/// Reads one line of at most `limit` content bytes plus its `\n` into `buf`.
/// The rest of an over-long line is picked up by the next call.
async fn read_line_bounded<R>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    limit: usize,
) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut limited = (&mut *reader).take(limit.saturating_add(1) as u64);
    limited.read_until(b'\n', buf).await
}

/// Reads and classifies lines until EOF, cancellation, or the consumer going away.
/// Lines longer than the classifier's input limit are passed on in chunks of at
/// most that size. Returns the number of lines read.
async fn produce<R>(
    classifier: KeywordClassifier,
    mut reader: R,
    tx: mpsc::Sender<LogEntry>,
    cancel: CancellationToken,
) -> Result<u64, LogPipelineError>
where
    R: AsyncBufRead + Unpin,
{
    let mut line_number = 0u64;
    let limit = classifier.max_input_size();

    loop {
        let mut buf = Vec::new();
        let read = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(line_number, "producer cancelled");
                break;
            }
            read = read_line_bounded(&mut reader, &mut buf, limit) => read?,
        };
        if read == 0 {
            debug!(line_number, "input exhausted");
            break;
        }

        if buf.len() > limit && !buf.ends_with(b"\n") {
            warn!(line_number = line_number + 1, limit, "line exceeds max size, splitting");
        }

        line_number += 1;
        let entry = classifier.classify(line_number, Bytes::from(buf));
        trace!(%entry, "classified");

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            sent = tx.send(entry) => {
                if sent.is_err() {
                    debug!("consumer gone, stopping producer");
                    break;
                }
            }
        }
    }

    Ok(line_number)
}

/// Assembles a [`LogPipeline`] from configuration and a validated [`FilterSpec`].
pub struct LogPipelineBuilder {
    keywords: KeywordConfig,
    severities: SeverityTable,
    styles: StyleTables,
    spec: FilterSpec,
    options: RenderOptions,
    max_line_size: Option<usize>,
}

impl LogPipelineBuilder {
    /// Built-in keywords, severities and styles; no filtering.
    pub fn new() -> Self {
        Self {
            keywords: KeywordConfig::default(),
            severities: SeverityTable::default(),
            styles: StyleTables::builtin(),
            spec: FilterSpec::default(),
            options: RenderOptions::default(),
            max_line_size: None,
        }
    }

    /// Takes keywords, severities and effective styles from a loaded config.
    pub fn config(mut self, config: &PrettylogConfig) -> Self {
        self.keywords = config.keywords.clone();
        self.severities = config.severity.clone();
        self.styles = config.effective_styles();
        self
    }

    pub fn keywords(mut self, keywords: KeywordConfig) -> Self {
        self.keywords = keywords;
        self
    }

    /// Severity table used by level filters. Must be the table the filter spec was built with.
    pub fn severities(mut self, severities: SeverityTable) -> Self {
        self.severities = severities;
        self
    }

    /// Complete style tables, used as given.
    pub fn styles(mut self, styles: StyleTables) -> Self {
        self.styles = styles;
        self
    }

    pub fn filter_spec(mut self, spec: FilterSpec) -> Self {
        self.spec = spec;
        self
    }

    pub fn options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Lines longer than this are passed through undecoded.
    pub fn max_line_size(mut self, size: usize) -> Self {
        self.max_line_size = Some(size);
        self
    }

    pub fn build(self) -> LogPipeline {
        let mut classifier = KeywordClassifier::new(self.keywords);
        if let Some(size) = self.max_line_size {
            classifier = classifier.with_max_input_size(size);
        }

        let styles = StyleResolver::new(self.styles).with_highlights(
            self.spec.highlight_key.clone(),
            self.spec.highlight_value.clone(),
        );
        let filter = FilterEngine::new(self.spec, self.severities);

        LogPipeline {
            classifier,
            renderer: LineRenderer::new(filter, styles, self.options),
        }
    }
}

impl Default for LogPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
