//! Reload script injection.

/// Inline client for the reload stream at `reload_path`.
pub fn reload_script(reload_path: &str) -> String {
    format!(
        "<script>new EventSource(\"{reload_path}\").onmessage = () => location.reload();</script>"
    )
}

/// Inject `script` into HTML bodies; other content types pass through.
pub fn maybe_inject_reload(body: Vec<u8>, content_type: &str, script: Option<&str>) -> Vec<u8> {
    match (crate::utils::mime::is_html(content_type), script) {
        (true, Some(script)) => inject_before_body_end(&body, script.as_bytes()),
        _ => body,
    }
}

/// Insert `script` before the last `</body>`, or append it when there is none.
fn inject_before_body_end(content: &[u8], script: &[u8]) -> Vec<u8> {
    const PATTERN: &[u8] = b"</body>";

    let pos = content
        .windows(PATTERN.len())
        .rposition(|w| w.eq_ignore_ascii_case(PATTERN))
        .unwrap_or(content.len());

    let mut result = Vec::with_capacity(content.len() + script.len());
    result.extend_from_slice(&content[..pos]);
    result.extend_from_slice(script);
    result.extend_from_slice(&content[pos..]);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::mime::types::{CSS, HTML};

    const SCRIPT: &str = "<script>r()</script>";

    #[test]
    fn test_injects_before_last_body_end() {
        let body = b"<html><body><pre></body></pre></BODY></html>".to_vec();
        let out = maybe_inject_reload(body, HTML, Some(SCRIPT));
        assert_eq!(
            out,
            b"<html><body><pre></body></pre><script>r()</script></BODY></html>"
        );
    }

    #[test]
    fn test_appends_without_body_end() {
        let out = maybe_inject_reload(b"<p>x</p>".to_vec(), HTML, Some(SCRIPT));
        assert_eq!(out, b"<p>x</p><script>r()</script>");
    }

    #[test]
    fn test_non_html_untouched() {
        let css = b"body{}</body>".to_vec();
        assert_eq!(maybe_inject_reload(css.clone(), CSS, Some(SCRIPT)), css);
    }

    #[test]
    fn test_no_script_without_watch() {
        let html = b"<body></body>".to_vec();
        assert_eq!(maybe_inject_reload(html.clone(), HTML, None), html);
    }

    #[test]
    fn test_reload_script_uses_path() {
        let script = reload_script("/__kiln/reload");
        assert!(script.contains("new EventSource(\"/__kiln/reload\")"));
        assert!(script.contains("location.reload()"));
    }
}
