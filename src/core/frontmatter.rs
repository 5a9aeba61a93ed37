//! Front-matter block at the top of a page:
//!
//! ```text
//! ---
//! title: Conversor BTC a EUR
//! layout: tool
//! extra_scripts: |
//!   <script src="/js/conversor.js"></script>
//! ---
//! <section>...</section>
//! ```
//!
//! Keys are `[a-z_]+`. `key: |` starts a multi-line value that runs until the next key.

use crate::domain::model::{FrontMatter, PageDocument};
use regex::Regex;
use std::sync::LazyLock;

const DELIMITER: &str = "---";

static KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z_]+:").expect("valid front-matter key pattern"));

/// Splits front-matter from body. `None` when the document has no complete block.
pub fn split(content: &str) -> Option<(FrontMatter, &str)> {
    let rest = content.strip_prefix(DELIMITER)?;

    // 結束標記必須獨佔一行，值裡面的 "---" 不算
    let mut offset = 0;
    let mut closing = None;
    for (index, line) in rest.split_inclusive('\n').enumerate() {
        if index > 0 && line.trim() == DELIMITER {
            closing = Some((offset, offset + line.len()));
            break;
        }
        offset += line.len();
    }
    let (block_end, body_start) = closing?;

    let meta = parse_block(rest[..block_end].trim());
    Some((meta, rest[body_start..].trim()))
}

fn parse_block(block: &str) -> FrontMatter {
    let mut meta = FrontMatter::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in block.lines() {
        if KEY_RE.is_match(line) {
            if let Some((key, lines)) = current.take() {
                meta.insert(key, lines.join("\n").trim().to_string());
            }

            let (key, value) = line.split_once(':').unwrap_or((line, ""));
            let value = value.trim();
            let lines = if value == "|" { Vec::new() } else { vec![value] };
            current = Some((key.trim().to_string(), lines));
        } else if let Some((_, lines)) = current.as_mut() {
            lines.push(line);
        }
    }

    if let Some((key, lines)) = current {
        meta.insert(key, lines.join("\n").trim().to_string());
    }

    meta
}

/// Pages without usable front-matter keep their full original content and are copied verbatim.
pub fn parse_page(source_path: &str, content: &str) -> PageDocument {
    match split(content) {
        Some((meta, body)) if !meta.is_empty() => PageDocument {
            source_path: source_path.to_string(),
            front_matter: Some(meta),
            body: body.to_string(),
        },
        _ => PageDocument {
            source_path: source_path.to_string(),
            front_matter: None,
            body: content.to_string(),
        },
    }
}
