// Pipeline orchestration: ingest -> extract -> per-symbol fetch/render/write.

pub mod context;
pub mod report;
pub mod validator;

pub use context::PipelineContext;
pub use report::{RunReport, SymbolFailure};
pub use validator::{AcceptAll, AllowList, SymbolValidator};

use crate::analyzer::{MentionIndex, aggregate};
use crate::chart::artifact_path;
use crate::model::{FetchWindow, RenderError, SourceError, SymbolError};
use crate::parser::extract_tickers;
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Stages a run moves through. `Fetching` repeats once per symbol that gets fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Ingesting,
    Extracting,
    Fetching(String),
    Done,
}

enum SymbolOutcome {
    Rendered,
    Skipped,
    Failed(SymbolError),
}

pub struct Pipeline {
    ctx: PipelineContext,
    transitions: Mutex<Vec<Stage>>,
}

impl Pipeline {
    pub fn new(ctx: PipelineContext) -> Self {
        Self {
            ctx,
            transitions: Mutex::new(Vec::new()),
        }
    }

    /// Stages entered by the most recent run, in order.
    pub async fn transitions(&self) -> Vec<Stage> {
        self.transitions.lock().await.clone()
    }

    pub async fn stage(&self) -> Stage {
        self.transitions
            .lock()
            .await
            .last()
            .cloned()
            .unwrap_or(Stage::Idle)
    }

    async fn enter(&self, stage: Stage) {
        debug!("Pipeline stage: {:?}", stage);
        self.transitions.lock().await.push(stage);
    }

    /// Runs over the trailing 30-day window ending today.
    pub async fn run(&self, limit: usize, output_dir: &Path) -> Result<RunReport, SourceError> {
        self.run_with_window(limit, output_dir, FetchWindow::last_30_days())
            .await
    }

    /// Runs with a fixed window shared by every symbol.
    ///
    /// Only a failure to obtain posts is returned as an error; anything that goes
    /// wrong for a single symbol is recorded in the report and the run moves on.
    pub async fn run_with_window(
        &self,
        limit: usize,
        output_dir: &Path,
        window: FetchWindow,
    ) -> Result<RunReport, SourceError> {
        self.transitions.lock().await.clear();

        self.enter(Stage::Ingesting).await;
        let posts = match self.ctx.posts.fetch_posts(limit).await {
            Ok(posts) => posts,
            Err(e) => {
                error!("Failed to retrieve posts: {}", e);
                return Err(e);
            }
        };
        info!("Retrieved {} posts", posts.len());

        self.enter(Stage::Extracting).await;
        let index = aggregate(&posts, self.ctx.include_comments, extract_tickers);
        drop(posts);
        log_mentions(&index);

        let mut report = RunReport {
            symbols_found: index.len(),
            ..RunReport::default()
        };

        let outcomes: Vec<(String, SymbolOutcome)> = stream::iter(index.symbols())
            .map(|symbol| async move {
                let outcome = self.process_symbol(symbol, &window, output_dir).await;
                (symbol.to_string(), outcome)
            })
            .buffered(self.ctx.fetch_concurrency)
            .collect()
            .await;

        for (symbol, outcome) in outcomes {
            match outcome {
                SymbolOutcome::Rendered => report.symbols_rendered += 1,
                SymbolOutcome::Skipped => report.symbols_skipped += 1,
                SymbolOutcome::Failed(e) => report.failures.push(SymbolFailure {
                    symbol,
                    reason: e.to_string(),
                }),
            }
        }

        self.enter(Stage::Done).await;
        info!(
            "Run finished: {} found, {} rendered, {} skipped, {} failed",
            report.symbols_found,
            report.symbols_rendered,
            report.symbols_skipped,
            report.failures.len()
        );
        Ok(report)
    }

    async fn process_symbol(&self, symbol: &str, window: &FetchWindow, output_dir: &Path) -> SymbolOutcome {
        if !self.ctx.validator.accept(symbol) {
            debug!("Skipping {}: rejected by validator", symbol);
            return SymbolOutcome::Skipped;
        }

        self.enter(Stage::Fetching(symbol.to_string())).await;
        match self.fetch_and_render(symbol, window, output_dir).await {
            Ok(path) => {
                info!("Plot saved for {}: {}", symbol, path.display());
                SymbolOutcome::Rendered
            }
            Err(e) => {
                warn!("Failed to retrieve or plot data for {}: {}", symbol, e);
                SymbolOutcome::Failed(e)
            }
        }
    }

    async fn fetch_and_render(
        &self,
        symbol: &str,
        window: &FetchWindow,
        output_dir: &Path,
    ) -> Result<PathBuf, SymbolError> {
        let series = self.ctx.fetcher.fetch(symbol, window).await?;
        info!("Successfully retrieved {} closes for {}", series.len(), symbol);

        // Drawing and PNG encoding are CPU-bound; keep them off the fetch tasks.
        let renderer = Arc::clone(&self.ctx.renderer);
        let owned_symbol = symbol.to_string();
        let window = *window;
        let artifact = tokio::task::spawn_blocking(move || {
            renderer.render(&owned_symbol, &series, &window)
        })
        .await
        .map_err(|e| RenderError::Backend(format!("render task failed: {e}")))??;
        let path = artifact_path(output_dir, symbol, artifact.extension);
        self.ctx.sink.write(&path, &artifact).await?;
        Ok(path)
    }
}

fn log_mentions(index: &MentionIndex) {
    info!("Found {} unique stock tickers mentioned", index.len());
    let top: Vec<String> = index
        .ranked()
        .into_iter()
        .take(5)
        .map(|(symbol, count)| format!("{symbol}({count})"))
        .collect();
    if !top.is_empty() {
        info!("Most mentioned: {}", top.join(", "));
    }
}
