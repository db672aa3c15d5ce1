// Chart rendering and artifact output.
pub mod renderer;
pub mod sink;

pub use renderer::{ChartRenderer, PlottersRenderer, validate_series};
pub use sink::{ArtifactSink, FsArtifactSink, artifact_path};
