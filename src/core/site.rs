use crate::adapters::storage::LocalStorage;
use crate::core::compose::Compositor;
use crate::core::frontmatter;
use crate::domain::model::{BuildReport, Composition, IncludeSet, SiteSources, StaticAsset};
use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
use crate::utils::error::{Result, SiteError};

/// Reads the source tree, composes pages, writes the output tree.
pub struct SitePipeline<S: Storage, C: ConfigProvider> {
    source: S,
    output: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> SitePipeline<S, C> {
    pub fn new(source: S, output: S, config: C) -> Self {
        Self {
            source,
            output,
            config,
        }
    }

    async fn read_text(&self, path: &str) -> Result<String> {
        let bytes = self.source.read_file(path).await?;
        String::from_utf8(bytes).map_err(|e| {
            SiteError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("{} is not valid UTF-8: {}", path, e),
            ))
        })
    }

    /// `*.html` files below `dir`, as `(path relative to dir, full path)`.
    async fn html_files(&self, dir: &str) -> Result<Vec<(String, String)>> {
        let prefix = format!("{}/", dir.trim_end_matches('/'));
        let files = self.source.list_files(dir).await?;

        Ok(files
            .into_iter()
            .filter(|path| path.ends_with(".html"))
            .filter_map(|path| {
                let relative = path.strip_prefix(&prefix)?.to_string();
                Some((relative, path))
            })
            .collect())
    }

    async fn read_assets(&self) -> Result<Vec<StaticAsset>> {
        let mut assets = Vec::new();

        for dir in self.config.asset_dirs() {
            let files = self.source.list_files(dir).await?;
            if files.is_empty() {
                continue;
            }
            for path in files {
                let data = self.source.read_file(&path).await?;
                assets.push(StaticAsset { path, data });
            }
            tracing::info!("  📁 Copying {}/", dir);
        }

        for file in self.config.asset_files() {
            if !self.source.exists(file).await {
                continue;
            }
            let data = self.source.read_file(file).await?;
            assets.push(StaticAsset {
                path: file.clone(),
                data,
            });
            tracing::info!("  📄 Copying {}", file);
        }

        Ok(assets)
    }
}

impl<C: ConfigProvider> SitePipeline<LocalStorage, C> {
    pub fn local(config: C) -> Self {
        let source = LocalStorage::new(config.src_dir());
        let output = LocalStorage::new(config.output_dir());
        Self::new(source, output, config)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for SitePipeline<S, C> {
    async fn extract(&self) -> Result<SiteSources> {
        let mut includes = IncludeSet::new();
        for (relative, path) in self.html_files(self.config.includes_dir()).await? {
            let name = relative.trim_end_matches(".html");
            includes.insert(name, self.read_text(&path).await?);
        }

        let mut pages = Vec::new();
        for (relative, path) in self.html_files(self.config.pages_dir()).await? {
            let content = self.read_text(&path).await?;
            pages.push(frontmatter::parse_page(&relative, &content));
        }

        if pages.is_empty() {
            tracing::warn!(
                "No pages found under {}/{}",
                self.config.src_dir(),
                self.config.pages_dir()
            );
        }

        let assets = self.read_assets().await?;

        Ok(SiteSources {
            pages,
            includes,
            assets,
        })
    }

    async fn transform(&self, sources: SiteSources) -> Result<Composition> {
        let compositor = Compositor::new(&sources.includes, self.config.globals());
        let mut composition = compositor.compose(&sources.pages);
        composition.assets = sources.assets;
        Ok(composition)
    }

    async fn load(&self, composition: Composition) -> Result<BuildReport> {
        self.output.clear().await?;

        for asset in &composition.assets {
            self.output.write_file(&asset.path, &asset.data).await?;
        }

        for page in &composition.raw {
            self.output
                .write_file(&page.output_path, page.content.as_bytes())
                .await?;
            tracing::info!("  📄 {} → {} (raw)", page.source_path, page.output_path);
        }

        let mut pages_built = Vec::with_capacity(composition.rendered.len());
        for (canonical_path, page) in &composition.rendered {
            self.output
                .write_file(&page.output_path, page.html.as_bytes())
                .await?;
            tracing::info!("  ✅ {} → {}", page.source_path, page.output_path);
            pages_built.push(canonical_path.clone());
        }

        for failure in &composition.failures {
            let error = SiteError::from(failure.clone());
            tracing::warn!(
                "💡 {} ('{}'): {}",
                failure.page,
                failure.error.reference(),
                error.recovery_suggestion()
            );
        }

        Ok(BuildReport {
            output_dir: self.config.output_dir().to_string(),
            pages_built,
            raw_copied: composition.raw.len(),
            assets_copied: composition.assets.len(),
            failures: composition.failures.iter().map(ToString::to_string).collect(),
        })
    }
}
