use anyhow::Context;
use serde_json::{json, Map, Value};

use crate::session::PageState;

/// Turns a template name and its bindings into a page body.
pub(crate) trait ViewRenderer: Send + Sync {
    fn render(
        &self,
        template: &str,
        bindings: &Map<String, Value>,
        page: &PageState,
    ) -> anyhow::Result<String>;
}

/// Renders the document shell the client bundle hydrates from.
///
/// The template name, its bindings, pending flash messages and old input are
/// embedded as one JSON payload; flash messages are also printed so they show
/// without scripts.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct HtmlShellRenderer;

impl ViewRenderer for HtmlShellRenderer {
    fn render(
        &self,
        template: &str,
        bindings: &Map<String, Value>,
        page: &PageState,
    ) -> anyhow::Result<String> {
        let payload = json!({
            "template": template,
            "bindings": bindings,
            "flash": page.flash,
            "old": page.old_input,
        });
        let payload = serde_json::to_string(&payload)
            .with_context(|| format!("failed to encode page data for `{template}`"))?;

        let mut flash_html = String::new();
        for (key, message) in &page.flash {
            flash_html.push_str(&format!(
                "<p class=\"flash flash-{}\" role=\"alert\">{}</p>",
                escape_html(key),
                escape_html(message)
            ));
        }

        let template = escape_html(template);
        Ok(format!(
            "<!doctype html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{template}</title></head>\n<body data-template=\"{template}\">\n{flash_html}<div id=\"app\"></div>\n<script type=\"application/json\" id=\"page-data\">{}</script>\n</body>\n</html>\n",
            escape_script_json(&payload)
        ))
    }
}

pub(crate) fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// `<` only occurs inside JSON strings, where `<` decodes to the same
/// character and cannot close the script element.
fn escape_script_json(json: &str) -> String {
    json.replace('<', "\\u003c")
}
