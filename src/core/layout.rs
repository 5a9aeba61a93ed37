use crate::utils::error::ComposeError;
use std::fmt;
use std::str::FromStr;

const TOOL_LAYOUT: &str = r#"<!DOCTYPE html>
<html lang="{{lang|es}}">
<head>
{{>head}}
{{#extra_styles}}
  <style>
{{extra_styles}}
  </style>
{{/extra_styles}}
</head>
<body>
  <main class="container">
{{>header}}
{{>nav}}

{{content}}

  </main>

  <script src="/js/main.js"></script>
{{#extra_scripts}}
{{extra_scripts}}
{{/extra_scripts}}
</body>
</html>"#;

const BLOG_LAYOUT: &str = r#"<!DOCTYPE html>
<html lang="{{lang|es}}">
<head>
{{>head}}
</head>
<body>
  <main class="container">
{{>header}}
{{>nav}}

{{content}}

{{>footer-blog}}
  </main>
</body>
</html>"#;

const BLOG_ARTICLE_LAYOUT: &str = r#"<!DOCTYPE html>
<html lang="{{lang|es}}">
<head>
{{>head}}
</head>
<body>
  <main class="container">
{{>header}}
{{>nav}}

{{content}}

{{>affiliates}}

{{>footer-blog}}
  </main>
</body>
</html>"#;

/// Page skeletons. Selected with the `layout` front-matter key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    #[default]
    Tool,
    Blog,
    BlogArticle,
}

impl Layout {
    pub const ALL: [Layout; 3] = [Layout::Tool, Layout::Blog, Layout::BlogArticle];

    pub fn name(self) -> &'static str {
        match self {
            Layout::Tool => "tool",
            Layout::Blog => "blog",
            Layout::BlogArticle => "blog-article",
        }
    }

    pub fn template(self) -> &'static str {
        match self {
            Layout::Tool => TOOL_LAYOUT,
            Layout::Blog => BLOG_LAYOUT,
            Layout::BlogArticle => BLOG_ARTICLE_LAYOUT,
        }
    }

    /// Includes the skeleton pulls in, in document order.
    pub fn includes(self) -> &'static [&'static str] {
        match self {
            Layout::Tool => &["head", "header", "nav"],
            Layout::Blog => &["head", "header", "nav", "footer-blog"],
            Layout::BlogArticle => &["head", "header", "nav", "affiliates", "footer-blog"],
        }
    }

    /// A missing `layout` key means [`Layout::Tool`].
    pub fn resolve(name: Option<&str>) -> Result<Self, ComposeError> {
        match name.map(str::trim) {
            None | Some("") => Ok(Layout::default()),
            Some(name) => name.parse(),
        }
    }
}

impl FromStr for Layout {
    type Err = ComposeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Layout::ALL
            .into_iter()
            .find(|layout| layout.name() == s)
            .ok_or_else(|| ComposeError::UnknownLayout {
                name: s.to_string(),
            })
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
