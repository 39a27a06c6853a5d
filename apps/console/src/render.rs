use std::fmt::Display;

use client_core::view::ListFields;
use shared::domain::Identifiable;

const MAX_CELL: usize = 40;

fn clip(value: &str) -> String {
    if value.chars().count() <= MAX_CELL {
        return value.to_string();
    }
    let mut clipped: String = value.chars().take(MAX_CELL - 1).collect();
    clipped.push('…');
    clipped
}

/// Renders rows as a plain-text table: an `id` column followed by `columns`.
pub fn table<T>(rows: &[&T], columns: &[T::Filter]) -> String
where
    T: ListFields + Identifiable,
    T::Filter: Display,
{
    let mut header = vec!["id".to_string()];
    header.extend(columns.iter().map(ToString::to_string));

    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            let mut cells = vec![row.id().to_string()];
            cells.extend(columns.iter().map(|field| clip(&row.filter_value(*field))));
            cells
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for cells in &body {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = line(&header);
    out.push('\n');
    out.push_str(&line(
        &widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>(),
    ));
    for cells in &body {
        out.push('\n');
        out.push_str(&line(cells));
    }
    out
}

pub fn footer(shown: usize, total: usize) -> String {
    if shown == total {
        format!("{total} record(s)")
    } else {
        format!("{shown} of {total} record(s) match")
    }
}
