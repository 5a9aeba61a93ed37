//! Mustache-like template engine used for page assembly.
//!
//! | Marker | Effect |
//! |--------|--------|
//! | `{{>name}}` | include `name`, rendered with the same context |
//! | `{{#key}}...{{/key}}` | keep the block only when `key` is truthy |
//! | `{{key\|default}}` | value of `key`, or `default` when empty |
//! | `{{key}}` | value of `key`, or nothing |
//!
//! Passes run in that order over the whole template.

use crate::domain::model::IncludeSet;
use crate::utils::error::ComposeError;
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::LazyLock;

pub const MAX_INCLUDE_DEPTH: usize = 16;

static INCLUDE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{>\s*([\w./-]+)\s*\}\}").expect("valid include pattern"));
static SECTION_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{#(\w+)\}\}").expect("valid section pattern"));
static DEFAULT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{(\w+)\|((?:[^{}]|\{\{\w+\}\})+?)\}\}").expect("valid default pattern")
});
static VAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("valid variable pattern"));

/// String variables visible to a template. Missing keys read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderContext {
    values: BTreeMap<String, String>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Later values win.
    pub fn extend<'a, I>(&mut self, values: I)
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        for (key, value) in values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    pub fn get(&self, key: &str) -> &str {
        self.values.get(key).map(String::as_str).unwrap_or("")
    }

    /// Empty, `false` and `0` are falsy.
    pub fn is_truthy(&self, key: &str) -> bool {
        !matches!(self.get(key), "" | "false" | "0")
    }
}

impl From<&BTreeMap<String, String>> for RenderContext {
    fn from(values: &BTreeMap<String, String>) -> Self {
        Self {
            values: values.clone(),
        }
    }
}

pub struct TemplateEngine<'a> {
    includes: &'a IncludeSet,
    max_depth: usize,
}

impl<'a> TemplateEngine<'a> {
    pub fn new(includes: &'a IncludeSet) -> Self {
        Self {
            includes,
            max_depth: MAX_INCLUDE_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn render(&self, template: &str, context: &RenderContext) -> Result<String, ComposeError> {
        let mut chain = Vec::new();
        self.render_nested(template, context, &mut chain)
    }

    fn render_nested(
        &self,
        template: &str,
        context: &RenderContext,
        chain: &mut Vec<String>,
    ) -> Result<String, ComposeError> {
        let expanded = self.resolve_includes(template, context, chain)?;
        let sectioned = resolve_sections(&expanded, context);
        let defaulted = resolve_defaults(&sectioned, context);
        Ok(resolve_variables(&defaulted, context))
    }

    fn resolve_includes(
        &self,
        template: &str,
        context: &RenderContext,
        chain: &mut Vec<String>,
    ) -> Result<String, ComposeError> {
        let mut output = String::with_capacity(template.len());
        let mut last = 0;

        for caps in INCLUDE_RE.captures_iter(template) {
            let (Some(marker), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let name = name.as_str();
            output.push_str(&template[last..marker.start()]);

            if chain.iter().any(|seen| seen == name) {
                let mut cycle = chain.clone();
                cycle.push(name.to_string());
                return Err(ComposeError::IncludeCycle { chain: cycle });
            }
            if chain.len() >= self.max_depth {
                let mut too_deep = chain.clone();
                too_deep.push(name.to_string());
                return Err(ComposeError::IncludeDepthExceeded {
                    limit: self.max_depth,
                    chain: too_deep,
                });
            }

            let fragment = self
                .includes
                .get(name)
                .ok_or_else(|| ComposeError::MissingInclude {
                    name: name.to_string(),
                })?;

            chain.push(name.to_string());
            let rendered = self.render_nested(fragment, context, chain)?;
            chain.pop();

            output.push_str(&rendered);
            last = marker.end();
        }

        output.push_str(&template[last..]);
        Ok(output)
    }
}

fn resolve_sections(template: &str, context: &RenderContext) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(caps) = SECTION_OPEN_RE.captures(rest) {
        let (Some(opening), Some(key)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let closing = format!("{{{{/{}}}}}", key.as_str());
        let after = &rest[opening.end()..];

        match after.find(&closing) {
            Some(end) => {
                output.push_str(&rest[..opening.start()]);
                if context.is_truthy(key.as_str()) {
                    output.push_str(&resolve_sections(&after[..end], context));
                }
                rest = &after[end + closing.len()..];
            }
            None => {
                // 沒有結尾標記，原樣保留
                output.push_str(&rest[..opening.end()]);
                rest = after;
            }
        }
    }

    output.push_str(rest);
    output
}

fn resolve_defaults(template: &str, context: &RenderContext) -> String {
    DEFAULT_RE
        .replace_all(template, |caps: &Captures| {
            let value = context.get(&caps[1]);
            if value.is_empty() {
                resolve_variables(caps[2].trim(), context)
            } else {
                value.to_string()
            }
        })
        .into_owned()
}

fn resolve_variables(template: &str, context: &RenderContext) -> String {
    VAR_RE
        .replace_all(template, |caps: &Captures| context.get(&caps[1]).to_string())
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(pairs: &[(&str, &str)]) -> RenderContext {
        let mut ctx = RenderContext::new();
        for (key, value) in pairs {
            ctx.insert(*key, *value);
        }
        ctx
    }

    #[test]
    fn test_variables_and_missing_keys() {
        let includes = IncludeSet::new();
        let engine = TemplateEngine::new(&includes);
        let ctx = context(&[("title", "Conversor")]);

        let html = engine.render("<h1>{{title}}</h1><p>{{missing}}</p>", &ctx).unwrap();
        assert_eq!(html, "<h1>Conversor</h1><p></p>");
    }

    #[test]
    fn test_defaults() {
        let includes = IncludeSet::new();
        let engine = TemplateEngine::new(&includes);
        let ctx = context(&[("site_name", "Bitcoin Calculadora"), ("empty", "")]);

        assert_eq!(
            engine.render("{{og_title|Calculadora BTC}}", &ctx).unwrap(),
            "Calculadora BTC"
        );
        assert_eq!(
            engine.render("{{og_title|{{site_name}} - Inicio}}", &ctx).unwrap(),
            "Bitcoin Calculadora - Inicio"
        );
        assert_eq!(engine.render("{{empty|fallback}}", &ctx).unwrap(), "fallback");
        assert_eq!(
            engine.render("{{site_name|ignored}}", &ctx).unwrap(),
            "Bitcoin Calculadora"
        );
    }

    #[test]
    fn test_sections_truthiness() {
        let includes = IncludeSet::new();
        let engine = TemplateEngine::new(&includes);
        let ctx = context(&[("yes", "1"), ("no", "false"), ("zero", "0")]);

        let template = "[{{#yes}}a{{/yes}}][{{#no}}b{{/no}}][{{#zero}}c{{/zero}}][{{#unset}}d{{/unset}}]";
        assert_eq!(engine.render(template, &ctx).unwrap(), "[a][][][]");
    }

    #[test]
    fn test_nested_sections_and_unclosed_opening() {
        let includes = IncludeSet::new();
        let engine = TemplateEngine::new(&includes);
        let ctx = context(&[("outer", "x"), ("inner", "")]);

        assert_eq!(
            engine
                .render("{{#outer}}A{{#inner}}B{{/inner}}C{{/outer}}", &ctx)
                .unwrap(),
            "AC"
        );
        assert_eq!(engine.render("{{#open}}tail", &ctx).unwrap(), "{{#open}}tail");
    }

    #[test]
    fn test_includes_render_with_same_context() {
        let includes: IncludeSet = [
            ("header", "<header>{{site_name}}</header>{{>nav}}"),
            ("nav", "<nav>{{#show_blog}}<a href=\"/blog/\">Blog</a>{{/show_blog}}</nav>"),
        ]
        .into_iter()
        .collect();
        let engine = TemplateEngine::new(&includes);
        let ctx = context(&[("site_name", "BTC"), ("show_blog", "true")]);

        assert_eq!(
            engine.render("{{> header }}", &ctx).unwrap(),
            "<header>BTC</header><nav><a href=\"/blog/\">Blog</a></nav>"
        );
    }

    #[test]
    fn test_same_include_twice_is_not_a_cycle() {
        let includes: IncludeSet = [("sep", "<hr>")].into_iter().collect();
        let engine = TemplateEngine::new(&includes);

        assert_eq!(
            engine.render("a{{>sep}}b{{>sep}}c", &RenderContext::new()).unwrap(),
            "a<hr>b<hr>c"
        );
    }

    #[test]
    fn test_missing_include() {
        let includes = IncludeSet::new();
        let engine = TemplateEngine::new(&includes);

        let err = engine.render("{{>footer}}", &RenderContext::new()).unwrap_err();
        assert_eq!(
            err,
            ComposeError::MissingInclude {
                name: "footer".to_string()
            }
        );
    }

    #[test]
    fn test_include_cycle_is_rejected() {
        let includes: IncludeSet = [("X", "x{{>Y}}"), ("Y", "y{{>X}}")].into_iter().collect();
        let engine = TemplateEngine::new(&includes);

        let err = engine.render("{{>X}}", &RenderContext::new()).unwrap_err();
        assert_eq!(
            err,
            ComposeError::IncludeCycle {
                chain: vec!["X".to_string(), "Y".to_string(), "X".to_string()]
            }
        );
    }

    #[test]
    fn test_self_include_is_a_cycle() {
        let includes: IncludeSet = [("loop", "{{>loop}}")].into_iter().collect();
        let engine = TemplateEngine::new(&includes);

        assert!(matches!(
            engine.render("{{>loop}}", &RenderContext::new()),
            Err(ComposeError::IncludeCycle { .. })
        ));
    }

    #[test]
    fn test_depth_limit() {
        let includes: IncludeSet = [("a", "{{>b}}"), ("b", "{{>c}}"), ("c", "end")]
            .into_iter()
            .collect();
        let engine = TemplateEngine::new(&includes).with_max_depth(2);

        let err = engine.render("{{>a}}", &RenderContext::new()).unwrap_err();
        assert_eq!(
            err,
            ComposeError::IncludeDepthExceeded {
                limit: 2,
                chain: vec!["a".to_string(), "b".to_string(), "c".to_string()]
            }
        );

        let engine = TemplateEngine::new(&includes).with_max_depth(3);
        assert_eq!(engine.render("{{>a}}", &RenderContext::new()).unwrap(), "end");
    }
}
