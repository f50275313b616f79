//! Layout wrapping.

use std::fs;

use crate::registry::Layout;

/// Replace every `placeholder` in the layout template with `body`.
///
/// Without a layout, or when the template cannot be read, the body is
/// returned unwrapped and a warning is pushed.
pub fn wrap(
    body: &str,
    layout: Option<&Layout>,
    placeholder: &str,
    warnings: &mut Vec<String>,
) -> String {
    let Some(layout) = layout else {
        warnings.push("no layout available, emitting unwrapped body".to_string());
        return body.to_string();
    };

    match fs::read_to_string(&layout.path) {
        Ok(template) => template.replace(placeholder, body),
        Err(e) => {
            warnings.push(format!(
                "layout `{}` ({}): {}",
                layout.name,
                layout.path.display(),
                e
            ));
            body.to_string()
        }
    }
}
