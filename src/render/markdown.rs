//! Markdown to HTML conversion using pulldown-cmark.

use pulldown_cmark::{Options, Parser, html};

/// Options for markdown conversion
#[derive(Debug, Clone, Default)]
pub struct MarkdownOptions {
    /// Enable tables extension
    pub tables: bool,
    /// Enable footnotes extension
    pub footnotes: bool,
    /// Enable strikethrough extension
    pub strikethrough: bool,
    /// Enable task lists extension
    pub task_lists: bool,
    /// Enable heading attributes extension (e.g., `# Heading {#custom-id}`)
    pub heading_attributes: bool,
}

impl MarkdownOptions {
    /// Create options with all extensions enabled
    pub fn all() -> Self {
        Self {
            tables: true,
            footnotes: true,
            strikethrough: true,
            task_lists: true,
            heading_attributes: true,
        }
    }

    /// Convert to pulldown-cmark Options
    fn to_pulldown_options(&self) -> Options {
        let mut opts = Options::empty();
        if self.tables {
            opts.insert(Options::ENABLE_TABLES);
        }
        if self.footnotes {
            opts.insert(Options::ENABLE_FOOTNOTES);
        }
        if self.strikethrough {
            opts.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.task_lists {
            opts.insert(Options::ENABLE_TASKLISTS);
        }
        if self.heading_attributes {
            opts.insert(Options::ENABLE_HEADING_ATTRIBUTES);
        }
        opts
    }
}

/// Convert markdown to an HTML fragment.
///
/// The trailing newline pulldown-cmark emits after the last block is dropped
/// so the fragment sits flush inside a layout.
pub fn to_html(markdown: &str, options: &MarkdownOptions) -> String {
    let parser = Parser::new_ext(markdown, options.to_pulldown_options());
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);

    let trimmed = out.trim_end_matches('\n').len();
    out.truncate(trimmed);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading() {
        assert_eq!(to_html("# Hi", &MarkdownOptions::all()), "<h1>Hi</h1>");
    }

    #[test]
    fn test_inline_html_passes_through() {
        let html = to_html("<Footer></Footer>\n\ntext", &MarkdownOptions::all());
        assert!(html.contains("<Footer></Footer>"));
        assert!(html.contains("<p>text</p>"));
    }

    #[test]
    fn test_extensions() {
        let html = to_html("~~gone~~\n\n| a |\n|---|\n| b |", &MarkdownOptions::all());
        assert!(html.contains("<del>gone</del>"));
        assert!(html.contains("<table>"));

        let plain = to_html("~~gone~~", &MarkdownOptions::default());
        assert!(!plain.contains("<del>"));
    }
}
