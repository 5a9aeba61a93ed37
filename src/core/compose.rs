use crate::core::layout::Layout;
use crate::core::template::{RenderContext, TemplateEngine};
use crate::domain::model::{
    Composition, IncludeSet, PageDocument, PageFailure, RawPage, RenderedPage,
};
use crate::utils::error::ComposeError;
use std::collections::BTreeMap;

/// Maps a page path under `_pages/` to `(output_path, canonical_path)`.
///
/// ```text
/// index.html          -> index.html                  /
/// conversor.html      -> conversor/index.html        /conversor/
/// blog/index.html     -> blog/index.html             /blog/
/// blog/que-es-dca.html-> blog/que-es-dca/index.html  /blog/que-es-dca/
/// ```
pub fn output_paths(source_path: &str) -> (String, String) {
    let (parent, file) = match source_path.rsplit_once('/') {
        Some((parent, file)) => (parent, file),
        None => ("", source_path),
    };
    let stem = file.strip_suffix(".html").unwrap_or(file);

    let dir = match (parent.is_empty(), stem == "index") {
        (true, true) => String::new(),
        (true, false) => stem.to_string(),
        (false, true) => parent.to_string(),
        (false, false) => format!("{}/{}", parent, stem),
    };

    if dir.is_empty() {
        ("index.html".to_string(), "/".to_string())
    } else {
        (format!("{}/index.html", dir), format!("/{}/", dir))
    }
}

pub struct Compositor<'a> {
    engine: TemplateEngine<'a>,
    globals: &'a BTreeMap<String, String>,
}

impl<'a> Compositor<'a> {
    pub fn new(includes: &'a IncludeSet, globals: &'a BTreeMap<String, String>) -> Self {
        Self {
            engine: TemplateEngine::new(includes),
            globals,
        }
    }

    /// Renders one page with front-matter. Body first, then the layout around it.
    pub fn compose_page(&self, page: &PageDocument) -> Result<RenderedPage, ComposeError> {
        let (output_path, canonical_path) = output_paths(&page.source_path);

        let mut context = RenderContext::from(self.globals);
        if let Some(front_matter) = &page.front_matter {
            context.extend(front_matter);
        }
        context.insert("page_path", canonical_path.as_str());

        let layout = Layout::resolve(
            page.front_matter
                .as_ref()
                .and_then(|fm| fm.get("layout"))
                .map(String::as_str),
        )?;

        let body = self.engine.render(&page.body, &context)?;
        context.insert("content", body);
        let html = self.engine.render(layout.template(), &context)?;

        Ok(RenderedPage {
            source_path: page.source_path.clone(),
            output_path,
            canonical_path,
            html,
        })
    }

    /// Best effort: a failing page is recorded and skipped, the rest still build.
    pub fn compose(&self, pages: &[PageDocument]) -> Composition {
        let mut composition = Composition::default();
        let mut claimed: BTreeMap<String, String> = BTreeMap::new();

        for page in pages {
            let (output_path, canonical_path) = output_paths(&page.source_path);

            if let Some(first) = claimed.get(&canonical_path) {
                let error = ComposeError::DuplicateOutput {
                    path: canonical_path.clone(),
                    first: first.clone(),
                };
                tracing::error!("❌ {}: {}", page.source_path, error);
                composition.failures.push(PageFailure {
                    page: page.source_path.clone(),
                    error,
                });
                continue;
            }

            if page.front_matter.is_none() {
                tracing::debug!("{} has no front-matter, copying as-is", page.source_path);
                claimed.insert(canonical_path, page.source_path.clone());
                composition.raw.push(RawPage {
                    source_path: page.source_path.clone(),
                    output_path,
                    content: page.body.clone(),
                });
                continue;
            }

            match self.compose_page(page) {
                Ok(rendered) => {
                    claimed.insert(canonical_path.clone(), page.source_path.clone());
                    composition.rendered.insert(canonical_path, rendered);
                }
                Err(error) => {
                    tracing::error!("❌ {}: {}", page.source_path, error);
                    composition.failures.push(PageFailure {
                        page: page.source_path.clone(),
                        error,
                    });
                }
            }
        }

        composition
    }
}

pub fn compose(
    pages: &[PageDocument],
    includes: &IncludeSet,
    globals: &BTreeMap<String, String>,
) -> Composition {
    Compositor::new(includes, globals).compose(pages)
}
