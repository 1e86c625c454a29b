// src/services/workbook.rs
//! Workbook loading and raw row extraction for the exam import format.
//!
//! The import format is positional: the first two rows carry instructions
//! and a human-readable header, data rows follow with a fixed column layout.
//! Only the first worksheet is read; additional worksheets are ignored.

use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use std::path::Path;
use thiserror::Error;

/// Rows reserved for instructional text and the header labels
pub const SKIP_ROWS: u32 = 2;

// 0-based column positions of the fixed import layout. Columns between the
// options and the answer, and past the difficulty, are unused by this
// format version.
const COL_STEM: u32 = 0;
const COL_TYPE: u32 = 1;
const COL_OPTION_A: u32 = 2;
const COL_ANSWER: u32 = 10;
const COL_ANALYSIS: u32 = 11;
const COL_DIFFICULTY: u32 = 13;

#[derive(Debug, Error)]
pub enum WorkbookError {
    #[error("Spreadsheet file not found: {0}")]
    FileMissing(String),

    #[error("Spreadsheet file is empty: {0}")]
    EmptyFile(String),

    #[error("File could not be read as a workbook: {0}")]
    CorruptWorkbook(String),

    #[error("Workbook contains no worksheets")]
    NoWorksheet,

    #[error("Worksheet is missing the header row")]
    NoHeaderRow,

    #[error("Worksheet contains no data rows")]
    NoDataRows,
}

/// One data row read by fixed column position, untyped
#[derive(Debug, Clone)]
pub struct RawRow {
    /// 1-based position among data rows (spreadsheet row minus the skipped rows)
    pub display_order: i64,
    pub stem: String,
    pub type_text: String,
    pub options: [String; 4],
    pub answer: String,
    pub analysis: String,
    pub difficulty_text: String,
}

/// Open the file at `path` as an xlsx workbook and return its first
/// worksheet's cell range.
pub fn load_first_sheet(path: &Path) -> Result<Range<Data>, WorkbookError> {
    let metadata = std::fs::metadata(path)
        .map_err(|_| WorkbookError::FileMissing(path.display().to_string()))?;
    if metadata.len() == 0 {
        return Err(WorkbookError::EmptyFile(path.display().to_string()));
    }

    let mut workbook: Xlsx<std::io::BufReader<std::fs::File>> =
        open_workbook(path)
            .map_err(|e: calamine::XlsxError| WorkbookError::CorruptWorkbook(e.to_string()))?;

    workbook
        .worksheet_range_at(0)
        .ok_or(WorkbookError::NoWorksheet)?
        .map_err(|e| WorkbookError::CorruptWorkbook(e.to_string()))
}

/// Walk the worksheet's data rows as a lazy, finite sequence of raw cell
/// tuples. Restarting the sequence means reopening the workbook.
///
/// Structural checks (header present, at least one data row) run up front;
/// rows with zero populated cells are then skipped silently and still
/// consume their position, so `display_order` always reflects the
/// spreadsheet row.
pub fn extract_rows(
    range: &Range<Data>,
) -> Result<impl Iterator<Item = RawRow> + '_, WorkbookError> {
    let (last_row, last_col) = match range.end() {
        Some(end) => end,
        // A sheet with no populated cells has no header row either
        None => return Err(WorkbookError::NoHeaderRow),
    };

    if last_row < SKIP_ROWS - 1 {
        return Err(WorkbookError::NoHeaderRow);
    }

    let header_populated =
        (0..=last_col).any(|col| !cell_text(range, SKIP_ROWS - 1, col).is_empty());
    if !header_populated {
        return Err(WorkbookError::NoHeaderRow);
    }

    if last_row < SKIP_ROWS {
        return Err(WorkbookError::NoDataRows);
    }

    let rows = (SKIP_ROWS..=last_row).filter_map(move |row| {
        let populated = (0..=last_col).any(|col| {
            !matches!(range.get_value((row, col)), None | Some(Data::Empty))
        });
        if !populated {
            return None;
        }

        Some(RawRow {
            display_order: i64::from(row - SKIP_ROWS) + 1,
            stem: cell_text(range, row, COL_STEM),
            type_text: cell_text(range, row, COL_TYPE),
            options: [
                cell_text(range, row, COL_OPTION_A),
                cell_text(range, row, COL_OPTION_A + 1),
                cell_text(range, row, COL_OPTION_A + 2),
                cell_text(range, row, COL_OPTION_A + 3),
            ],
            answer: cell_text(range, row, COL_ANSWER),
            analysis: cell_text(range, row, COL_ANALYSIS),
            difficulty_text: cell_text(range, row, COL_DIFFICULTY),
        })
    });

    Ok(rows)
}

/// Render a cell as trimmed text; empty cells become the empty string
fn cell_text(range: &Range<Data>, row: u32, col: u32) -> String {
    match range.get_value((row, col)) {
        None | Some(Data::Empty) => String::new(),
        Some(Data::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string().trim().to_string(),
    }
}
