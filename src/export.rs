use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook, XlsxError};
use thiserror::Error;

use crate::{types::TrackRow, utils};

pub const HEADERS: [&str; 4] = ["Artist", "Title", "Album", "Playlist Name"];
const SHEET_NAME: &str = "Tracks";
const COLUMN_WIDTH: f64 = 36.0;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("There is nothing to export yet.")]
    Empty,

    #[error("Failed to export: {0}")]
    Xlsx(#[from] XlsxError),
}

/// Writes `rows` to an `.xlsx` workbook at `path`, in the given order, with a
/// header row. Returns the path actually written (`.xlsx` is appended when
/// `path` has no extension).
pub fn export_xlsx(rows: &[TrackRow], path: &Path) -> Result<PathBuf, ExportError> {
    if rows.is_empty() {
        return Err(ExportError::Empty);
    }

    let path = utils::with_xlsx_extension(path);
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, header) in HEADERS.iter().enumerate() {
        let col = col as u16;
        worksheet.write_string_with_format(0, col, *header, &header_format)?;
        worksheet.set_column_width(col, COLUMN_WIDTH)?;
    }

    for (idx, row) in rows.iter().enumerate() {
        let line = idx as u32 + 1;
        worksheet.write_string(line, 0, row.artist.as_str())?;
        worksheet.write_string(line, 1, row.title.as_str())?;
        worksheet.write_string(line, 2, row.album.as_str())?;
        worksheet.write_string(line, 3, row.playlist.as_str())?;
    }

    workbook.save(&path)?;
    log::debug!("exported {} rows to {}", rows.len(), path.display());
    Ok(path)
}
