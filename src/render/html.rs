use crate::render::fragment::Fragment;

// ============================================================================
// HTML binding — fragments to markup
// ============================================================================

/// Markup for a single fragment. All text is escaped.
pub fn fragment_to_html(fragment: &Fragment) -> String {
    match fragment {
        Fragment::Row { key, cells } => {
            let mut out = format!("<div class=\"tag\" id=\"tag-{}\">", escape_html(key));
            for cell in cells {
                out.push_str(&format!(
                    "<span class=\"{}\">{}</span>",
                    cell.class,
                    escape_html(&cell.text)
                ));
            }
            out.push_str("</div>");
            out
        }
        Fragment::Choice {
            value,
            label,
            selected,
        } => format!(
            "<option value=\"{}\"{}>{}</option>",
            escape_html(value),
            if *selected { " selected" } else { "" },
            escape_html(label)
        ),
        Fragment::Notice { text } => format!("<p class=\"notice\">{}</p>", escape_html(text)),
        Fragment::Error { text } => format!("<p class=\"error\">{}</p>", escape_html(text)),
    }
}

/// Self-contained page with the registry rows and the action selector.
pub fn generate_registry_page(rows: &[Fragment], options: &[Fragment], error: Option<&str>) -> String {
    let rows_html = rows
        .iter()
        .map(fragment_to_html)
        .collect::<Vec<_>>()
        .join("\n");

    let options_html = options
        .iter()
        .map(fragment_to_html)
        .collect::<Vec<_>>()
        .join("\n");

    let error_html = error
        .map(|e| fragment_to_html(&Fragment::Error { text: e.to_string() }))
        .unwrap_or_default();

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Pummeluff Registry</title>
<style>
body {{ font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; margin: 0; padding: 20px 30px; background: #f5f5f5; }}
.tag {{ background: white; border-radius: 6px; padding: 8px 16px; margin-bottom: 6px; display: flex; gap: 16px; }}
.tag span {{ flex: 1; font-size: 14px; }}
.tag .uid {{ font-family: monospace; color: #666; }}
.error {{ color: #f44336; font-weight: bold; }}
</style>
</head>
<body>
<h1>Registered Tags ({count})</h1>
{error}
<select id="action-class" name="action_class">
{options}
</select>
<div id="tags">
{rows}
</div>
</body>
</html>"##,
        count = rows.len(),
        error = error_html,
        options = options_html,
        rows = rows_html,
    )
}

/// Escape HTML special characters.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
