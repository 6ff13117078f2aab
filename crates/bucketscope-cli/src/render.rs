//! Plain-text rendering of explorer views.

use std::fmt::Write;

use bucketscope_core::listing::{Listing, breadcrumbs, folder_label};
use bucketscope_core::loader::LoadState;
use bucketscope_core::navigation::NavigationState;
use bucketscope_core::scenes::{
    ColumnPolicy, SceneRecord, SceneSet, derive_image_reference, format_cell, format_value,
};

/// Widest a table cell may grow before it is clipped.
const MAX_CELL_WIDTH: usize = 32;

/// Path trail with the current location in brackets.
pub fn breadcrumb_line(bucket: &str, path: &str) -> String {
    breadcrumbs(bucket, path)
        .iter()
        .map(|crumb| {
            if crumb.is_current {
                format!("[{}]", crumb.label)
            } else {
                crumb.label.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" / ")
}

/// Folders and images of one listing level.
pub fn listing(listing: &Listing) -> String {
    let mut out = String::new();

    if !listing.prefixes.is_empty() {
        out.push_str("Folders:\n");
        for prefix in &listing.prefixes {
            let _ = writeln!(out, "  {}/", folder_label(prefix));
        }
    }

    let images: Vec<_> = listing.images().collect();
    if !images.is_empty() {
        out.push_str("Media:\n");
        let width = images
            .iter()
            .map(|item| item.display_name().chars().count())
            .max()
            .unwrap_or_default();
        for item in images {
            let size = item.size_kb_label().unwrap_or_default();
            let _ = writeln!(out, "  {:<width$}  {size}", item.display_name());
        }
    }

    if out.is_empty() {
        out.push_str("No folders or media here.\n");
    }
    if listing.is_truncated() {
        out.push_str("(more objects exist; only the first page is shown)\n");
    }
    out
}

fn clip(text: &str, width: usize) -> String {
    let flat = text.replace(['\n', '\r'], " ");
    if flat.chars().count() <= width {
        return flat;
    }
    let kept: String = flat.chars().take(width.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// Scene table with a leading row index column.
pub fn scene_table(scenes: &SceneSet, policy: ColumnPolicy) -> String {
    if scenes.is_empty() {
        return String::new();
    }

    let columns = scenes.columns(policy);
    let mut header = vec!["#".to_owned()];
    header.extend(columns.iter().map(|column| clip(column, MAX_CELL_WIDTH)));

    let rows: Vec<Vec<String>> = scenes
        .records()
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let mut row = vec![index.to_string()];
            row.extend(
                columns
                    .iter()
                    .map(|column| clip(&format_cell(record, column), MAX_CELL_WIDTH)),
            );
            row
        })
        .collect();

    let widths: Vec<usize> = (0..header.len())
        .map(|i| {
            rows.iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(header[i].chars().count()))
                .max()
                .unwrap_or_default()
        })
        .collect();

    let format_row = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_owned()
    };

    let mut out = String::new();
    let _ = writeln!(out, "Scenes ({}):", scenes.len());
    let _ = writeln!(out, "{}", format_row(&header));
    let _ = writeln!(
        out,
        "{}",
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("-+-")
    );
    for row in &rows {
        let _ = writeln!(out, "{}", format_row(row));
    }
    out
}

/// Every field of one record, structured values pretty-printed.
pub fn scene_detail(index: usize, record: &SceneRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Scene #{index}");
    for (key, value) in record {
        let text = format_value(value);
        if text.contains('\n') {
            let _ = writeln!(out, "  {key}:");
            for line in text.lines() {
                let _ = writeln!(out, "    {line}");
            }
        } else {
            let _ = writeln!(out, "  {key}: {text}");
        }
    }
    if let Some(reference) = derive_image_reference(record) {
        let _ = writeln!(out, "  (image: {reference})");
    }
    out
}

/// One status line for a navigation state, if it needs one.
pub fn navigation_state(state: &NavigationState) -> Option<String> {
    match state {
        NavigationState::Unauthenticated => Some("Not connected.".to_owned()),
        NavigationState::Loading => Some("Loading...".to_owned()),
        NavigationState::Ready => None,
        NavigationState::Error(message) => Some(format!("Error: {message} (type `retry`)")),
    }
}

/// One line describing what an image slot shows.
pub fn load_state(name: &str, state: &LoadState) -> String {
    match state {
        LoadState::Idle => format!("{name}: -"),
        LoadState::Loading => format!("{name}: loading"),
        LoadState::Ready(handle) => format!(
            "{name}: {} ({} bytes{})",
            handle.url(),
            handle.size(),
            handle
                .content_type()
                .map(|content_type| format!(", {content_type}"))
                .unwrap_or_default()
        ),
        LoadState::Failed(error) => format!("{name}: unavailable ({})", error.display_message()),
    }
}
