use crate::chart::{ArtifactSink, ChartRenderer, FsArtifactSink, PlottersRenderer};
use crate::config::AppConfig;
use crate::market::{MarketDataFetcher, MarketDataSource, YahooSource};
use crate::pipeline::validator::{AcceptAll, AllowList, SymbolValidator};
use crate::source::{PostSource, RedditSource};
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything one pipeline run talks to, built once and handed to the orchestrator.
pub struct PipelineContext {
    pub posts: Arc<dyn PostSource>,
    pub fetcher: MarketDataFetcher,
    pub renderer: Arc<dyn ChartRenderer>,
    pub sink: Arc<dyn ArtifactSink>,
    pub validator: Arc<dyn SymbolValidator>,
    pub include_comments: bool,
    pub fetch_concurrency: usize,
}

impl PipelineContext {
    pub fn new(
        posts: Arc<dyn PostSource>,
        market: Arc<dyn MarketDataSource>,
        renderer: Arc<dyn ChartRenderer>,
        sink: Arc<dyn ArtifactSink>,
    ) -> Self {
        Self {
            posts,
            fetcher: MarketDataFetcher::new(market, DEFAULT_FETCH_TIMEOUT),
            renderer,
            sink,
            validator: Arc::new(AcceptAll),
            include_comments: false,
            fetch_concurrency: 1,
        }
    }

    /// Wires the production collaborators: Reddit, Yahoo, plotters and the local filesystem.
    pub fn from_config(config: &AppConfig) -> Self {
        let posts = Arc::new(RedditSource::new(config.reddit.clone(), config.include_comments));
        let validator: Arc<dyn SymbolValidator> = match &config.symbol_allow_list {
            Some(symbols) => Arc::new(AllowList::new(symbols.iter().cloned())),
            None => Arc::new(AcceptAll),
        };

        Self::new(
            posts,
            Arc::new(YahooSource::new()),
            Arc::new(PlottersRenderer::new()),
            Arc::new(FsArtifactSink),
        )
        .with_validator(validator)
        .with_fetch_timeout(Duration::from_secs(config.fetch_timeout_seconds))
        .with_fetch_concurrency(config.fetch_concurrency)
        .with_comments(config.include_comments)
    }

    pub fn with_validator(mut self, validator: Arc<dyn SymbolValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetcher = self.fetcher.with_timeout(timeout);
        self
    }

    pub fn with_fetch_concurrency(mut self, concurrency: usize) -> Self {
        self.fetch_concurrency = concurrency.max(1);
        self
    }

    pub fn with_comments(mut self, include_comments: bool) -> Self {
        self.include_comments = include_comments;
        self
    }
}
