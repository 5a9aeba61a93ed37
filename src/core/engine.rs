use crate::domain::model::BuildReport;
use crate::domain::ports::Pipeline;
use crate::utils::error::Result;

pub struct BuildEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> BuildEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Page-level failures end up in the report; only I/O and setup errors abort.
    pub async fn run(&self) -> Result<BuildReport> {
        tracing::info!("🔨 Building site...");

        let sources = self.pipeline.extract().await?;
        tracing::debug!(
            "Extracted {} pages, {} includes, {} assets",
            sources.pages.len(),
            sources.includes.len(),
            sources.assets.len()
        );

        let composition = self.pipeline.transform(sources).await?;
        tracing::debug!(
            "Composed {} pages ({} raw, {} failed)",
            composition.rendered.len(),
            composition.raw.len(),
            composition.failures.len()
        );

        let report = self.pipeline.load(composition).await?;

        if report.is_success() {
            tracing::info!(
                "🎉 Build complete: {} pages in {}/",
                report.pages_built.len() + report.raw_copied,
                report.output_dir
            );
        } else {
            tracing::warn!(
                "⚠️  Build finished with {} failed pages",
                report.failures.len()
            );
        }

        Ok(report)
    }
}
