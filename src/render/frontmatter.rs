//! Front matter extraction for pages.
//!
//! Two delimiters are recognized at the very start of a page:
//!
//! ```text
//! ---                 +++
//! layout: Blog        layout = "Blog"
//! title: Hello        title = "Hello"
//! ---                 +++
//! ```
//!
//! Only `layout` drives the build; other keys are accepted and ignored.

use anyhow::{Result, anyhow};
use serde::Deserialize;

/// Metadata declared at the top of a page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    /// Declared layout name, with or without the template extension.
    pub layout: Option<String>,
}

impl FrontMatter {
    /// Declared layout name without extension (`blog.html` → `blog`).
    pub fn layout_name(&self) -> Option<&str> {
        let name = self.layout.as_deref()?.trim();
        if name.is_empty() {
            return None;
        }
        Some(match name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => name,
        })
    }
}

/// Split front matter from a page.
///
/// Returns `Ok(None)` when the page has no front matter block, so the caller
/// keeps the full content as the body.
pub fn extract(content: &str) -> Result<Option<(FrontMatter, &str)>> {
    match detect(content) {
        Some((block, body, true)) => {
            let meta = toml::from_str(block)
                .map_err(|e| anyhow!("invalid TOML front matter: {}", e))?;
            Ok(Some((meta, body)))
        }
        Some((block, body, false)) => Ok(Some((parse_yaml_like(block), body))),
        None => Ok(None),
    }
}

/// Split front matter, treating a malformed block as absent metadata.
///
/// The block is still removed from the body so delimiter lines never reach
/// the output.
pub fn split(content: &str) -> (FrontMatter, &str) {
    match extract(content) {
        Ok(Some((meta, body))) => (meta, body),
        Ok(None) => (FrontMatter::default(), content),
        Err(e) => {
            crate::debug!("render"; "{}", e);
            let body = detect(content).map_or(content, |(_, body, _)| body);
            (FrontMatter::default(), body)
        }
    }
}

/// Parse simple YAML-like front matter (key: value).
fn parse_yaml_like(block: &str) -> FrontMatter {
    let mut meta = FrontMatter::default();

    for line in block.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some((key, value)) = line.split_once(':')
            && key.trim().eq_ignore_ascii_case("layout")
        {
            meta.layout = Some(unquote(value.trim()).to_string());
        }
    }

    meta
}

fn unquote(value: &str) -> &str {
    ['"', '\'']
        .iter()
        .find_map(|q| value.strip_prefix(*q).and_then(|v| v.strip_suffix(*q)))
        .unwrap_or(value)
}

/// Returns `(front_matter, body, is_toml)` if a block is found.
fn detect(content: &str) -> Option<(&str, &str, bool)> {
    let trimmed = content.trim_start();

    for (fence, is_toml) in [("---", false), ("+++", true)] {
        if trimmed.starts_with(fence)
            && let Some(end) = trimmed[3..].find(&format!("\n{fence}"))
        {
            let block = trimmed[3..3 + end].trim();
            let body = trimmed[3 + end + 4..].trim_start_matches(['\r', '\n']);
            return Some((block, body, is_toml));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_front_matter() {
        let content = "---\nlayout: Blog\ntitle: Hello\ndate: 2024-01-01\n---\n# Body";
        let (meta, body) = extract(content).unwrap().unwrap();

        assert_eq!(meta.layout.as_deref(), Some("Blog"));
        assert_eq!(body, "# Body");
    }

    #[test]
    fn test_toml_front_matter() {
        let content = "+++\nlayout = \"Blog\"\ntags = [\"a\"]\n+++\n\n# Body";
        let (meta, body) = extract(content).unwrap().unwrap();

        assert_eq!(meta.layout.as_deref(), Some("Blog"));
        assert_eq!(body, "# Body");
    }

    #[test]
    fn test_no_front_matter() {
        assert!(extract("# Just content").unwrap().is_none());
        let (meta, body) = split("<p>hi</p>");
        assert_eq!(meta, FrontMatter::default());
        assert_eq!(body, "<p>hi</p>");
    }

    #[test]
    fn test_invalid_toml_is_stripped() {
        let (meta, body) = split("+++\nlayout = \n+++\nbody");
        assert!(meta.layout.is_none());
        assert_eq!(body, "body");
    }

    #[test]
    fn test_layout_name() {
        let meta = |layout: &str| FrontMatter {
            layout: Some(layout.to_string()),
            ..FrontMatter::default()
        };
        assert_eq!(meta("blog.html").layout_name(), Some("blog"));
        assert_eq!(meta("Blog").layout_name(), Some("Blog"));
        assert_eq!(meta("  ").layout_name(), None);
        assert_eq!(meta("\"Quoted\"").layout_name(), Some("\"Quoted\""));
        assert_eq!(parse_yaml_like("layout: \"Quoted\"").layout_name(), Some("Quoted"));
    }
}
