//! Cell-level table diff.

use super::inline::inline_diff;
use crate::model::{CellDiff, Table, TableDiff};

/// Compare two tables cell by cell.
///
/// The result has one row per row of the longer table and, in each row,
/// one cell per cell of the longer row. Missing rows and cells compare as
/// empty strings.
pub fn table_diff(old: &Table, new: &Table) -> TableDiff {
    let row_count = old.row_count().max(new.row_count());
    let rows = (0..row_count)
        .map(|r| {
            let old_row = old.rows.get(r).map(Vec::as_slice).unwrap_or_default();
            let new_row = new.rows.get(r).map(Vec::as_slice).unwrap_or_default();
            let cols = old_row.len().max(new_row.len());
            (0..cols)
                .map(|c| {
                    let old_cell = old_row.get(c).map(String::as_str).unwrap_or_default();
                    let new_cell = new_row.get(c).map(String::as_str).unwrap_or_default();
                    cell_diff(old_cell, new_cell)
                })
                .collect()
        })
        .collect();

    TableDiff { rows }
}

/// Compare a single cell.
pub fn cell_diff(old: &str, new: &str) -> CellDiff {
    if old == new {
        return CellDiff::Same {
            text: old.to_string(),
        };
    }
    CellDiff::Changed {
        old: old.to_string(),
        new: new.to_string(),
        inline: inline_diff(old, new),
    }
}
