use crate::model::ChartArtifact;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

#[async_trait::async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Writes the artifact to `path`, replacing whatever is there.
    async fn write(&self, path: &Path, artifact: &ChartArtifact) -> io::Result<()>;
}

/// `{output_dir}/{symbol}_historical_data_last_30_days.{extension}`
pub fn artifact_path(output_dir: &Path, symbol: &str, extension: &str) -> PathBuf {
    output_dir.join(format!("{}_historical_data_last_30_days.{}", symbol, extension))
}

/// Writes artifacts to the local filesystem, creating parent directories on demand.
pub struct FsArtifactSink;

#[async_trait::async_trait]
impl ArtifactSink for FsArtifactSink {
    async fn write(&self, path: &Path, artifact: &ChartArtifact) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, &artifact.bytes).await?;
        debug!("Wrote {} bytes to {}", artifact.bytes.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FetchWindow;
    use chrono::NaiveDate;

    fn artifact(bytes: &[u8]) -> ChartArtifact {
        ChartArtifact {
            symbol: "GME".into(),
            window: FetchWindow::trailing(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()),
            extension: "png",
            bytes: bytes.to_vec(),
        }
    }

    #[test]
    fn path_is_derived_from_symbol() {
        let path = artifact_path(Path::new("graphs"), "GME", "png");
        assert_eq!(path, PathBuf::from("graphs/GME_historical_data_last_30_days.png"));
    }

    #[tokio::test]
    async fn creates_directory_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = artifact_path(&dir.path().join("nested"), "GME", "png");

        FsArtifactSink.write(&path, &artifact(b"first")).await.unwrap();
        FsArtifactSink.write(&path, &artifact(b"second")).await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"second");
    }
}
