use crate::{
    console::console_state::ScanState,
    form::controller::FormController,
    render::{fragment::Fragment, renderer::ROW_COLUMNS},
};

// ============================================================================
// Console binding — fragments to terminal text
// ============================================================================

/// Replace control characters so tag data cannot drive the terminal.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { '\u{FFFD}' } else { c })
        .collect()
}

pub fn fragment_to_text(fragment: &Fragment) -> String {
    match fragment {
        Fragment::Row { cells, .. } => cells
            .iter()
            .map(|c| sanitize(&c.text))
            .collect::<Vec<_>>()
            .join("  "),
        Fragment::Choice {
            label, selected, ..
        } => {
            let marker = if *selected { "*" } else { " " };
            format!("{} {}", marker, sanitize(label))
        }
        Fragment::Notice { text } => sanitize(text),
        Fragment::Error { text } => format!("[ERROR] {}", sanitize(text)),
    }
}

/// Numbered registry table, columns padded to their widest cell.
///
/// ```text
/// #  alias    uid       action-class  parameter
/// 0  Kitchen  04a1b2c3  Volume        40
/// ```
pub fn format_registry(rows: &[Fragment]) -> String {
    if rows.is_empty() {
        return "No tags registered.\n".to_string();
    }

    let headers: Vec<&str> = ROW_COLUMNS.iter().map(|(_, class)| *class).collect();
    let table: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            headers
                .iter()
                .map(|class| sanitize(row.cell(class).unwrap_or_default()))
                .collect()
        })
        .collect();

    let index_width = (rows.len() - 1).to_string().len().max(1);
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            table
                .iter()
                .map(|cells| cells[i].chars().count())
                .chain(std::iter::once(header.len()))
                .max()
                .unwrap_or_default()
        })
        .collect();

    let mut out = String::new();
    out.push_str(&format_line("#", index_width, &headers, &widths));
    for (index, cells) in table.iter().enumerate() {
        let cells: Vec<&str> = cells.iter().map(String::as_str).collect();
        out.push_str(&format_line(&index.to_string(), index_width, &cells, &widths));
    }
    out
}

fn format_line(index: &str, index_width: usize, cells: &[&str], widths: &[usize]) -> String {
    let mut line = format!("{:<width$}", index, width = index_width);
    for (cell, width) in cells.iter().zip(widths) {
        line.push_str("  ");
        line.push_str(&format!("{:<width$}", cell, width = *width));
    }
    format!("{}\n", line.trim_end())
}

/// One selector option per line, `*` marking the selected one.
pub fn format_options(options: &[Fragment]) -> String {
    if options.is_empty() {
        return "No actions available.\n".to_string();
    }

    options
        .iter()
        .map(|o| format!("{}\n", fragment_to_text(o)))
        .collect()
}

/// Current draft, form state and scan indicator.
pub fn format_status(scan_state: ScanState, form: &FormController) -> String {
    let draft = form.draft();
    let mut out = format!("Reader: {}  Form: {:?}\n", scan_state.label(), form.state());

    out.push_str(&format!("  uid:       {}\n", sanitize(&draft.uid)));
    out.push_str(&format!("  alias:     {}\n", sanitize(&draft.alias)));
    out.push_str(&format!("  parameter: {}\n", sanitize(&draft.parameter)));
    out.push_str(&format!(
        "  action:    {}\n",
        draft.action.as_deref().map(sanitize).unwrap_or_else(|| "(default)".into())
    ));

    if let Some(error) = form.error() {
        out.push_str(&format!("  [ERROR] {}\n", sanitize(error)));
    }
    out
}
