//! Inline snippet substitution.
//!
//! Every `<Name></Name>` whose `Name` is a known snippet is replaced by the
//! snippet's raw contents. Substitution is a single scan over the page body,
//! so markers inside inserted snippets are never expanded.

use std::borrow::Cow;
use std::fs;

use rustc_hash::FxHashMap;

use crate::registry::SnippetTable;

/// Substitute known snippet markers in `body`.
///
/// Unreadable snippets leave their markers in place and push a warning.
pub fn substitute<'a>(
    body: &'a str,
    snippets: &SnippetTable,
    warnings: &mut Vec<String>,
) -> Cow<'a, str> {
    let mut contents: FxHashMap<&str, String> = FxHashMap::default();
    for snippet in snippets.values().filter(|s| body.contains(&s.marker)) {
        match fs::read_to_string(&snippet.path) {
            Ok(text) => {
                contents.insert(snippet.name.as_str(), text);
            }
            Err(e) => warnings.push(format!(
                "snippet `{}` ({}): {}",
                snippet.name,
                snippet.path.display(),
                e
            )),
        }
    }

    if contents.is_empty() {
        return Cow::Borrowed(body);
    }

    let mut out = String::with_capacity(body.len());
    let mut rest = body;
    while let Some(pos) = rest.find('<') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match match_marker(tail, &contents) {
            Some((len, text)) => {
                out.push_str(text);
                rest = &tail[len..];
            }
            None => {
                out.push('<');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);

    Cow::Owned(out)
}

/// Match `<Name></Name>` at the start of `tail`, returning its length.
fn match_marker<'c>(tail: &str, contents: &'c FxHashMap<&str, String>) -> Option<(usize, &'c str)> {
    let close = tail.find('>')?;
    let name = &tail[1..close];
    let text = contents.get(name)?;

    let after = &tail[close + 1..];
    let end_tag_len = name.len() + 3;
    let end_tag = after.get(..end_tag_len)?;
    if end_tag.starts_with("</") && end_tag.ends_with('>') && &end_tag[2..end_tag_len - 1] == name {
        Some((close + 1 + end_tag_len, text.as_str()))
    } else {
        None
    }
}
