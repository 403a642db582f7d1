// ==========================================
// Kitchen AI - Spreadsheet File Parser
// ==========================================
// Excel (.xlsx/.xlsm/.xls) via calamine, CSV via csv.
// Output: one RawRow per data row, keyed by the trimmed header row.
// ==========================================

use crate::domain::types::RawRow;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::FileParser;
use calamine::{open_workbook_auto, Reader};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;
use tracing::debug;

const EXCEL_EXTENSIONS: [&str; 3] = ["xlsx", "xlsm", "xls"];

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn ensure_exists(path: &Path) -> ImportResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(ImportError::FileNotFound(path.display().to_string()))
    }
}

/// Zip one data row onto the header row; None for fully blank rows
fn to_raw_row<I, V>(headers: &[String], cells: I) -> Option<RawRow>
where
    I: IntoIterator<Item = V>,
    V: ToString,
{
    let mut row = RawRow::new();
    for (header, cell) in headers.iter().zip(cells) {
        if header.is_empty() {
            continue;
        }
        row.insert(header.clone(), cell.to_string().trim().to_string());
    }

    if row.values().all(|v| v.is_empty()) {
        None
    } else {
        Some(row)
    }
}

// ==========================================
// CSV Parser
// ==========================================
// A CSV file is a single sheet named after the file stem.
pub struct CsvParser;

impl FileParser for CsvParser {
    fn sheet_names(&self, file_path: &Path) -> ImportResult<Vec<String>> {
        ensure_exists(file_path)?;
        let stem = file_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(vec![stem])
    }

    fn parse_to_raw_records(
        &self,
        file_path: &Path,
        _sheet: Option<&str>,
    ) -> ImportResult<Vec<RawRow>> {
        ensure_exists(file_path)?;
        let ext = extension(file_path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result?;
            if let Some(row) = to_raw_row(&headers, record.iter()) {
                records.push(row);
            }
        }

        debug!(file = %file_path.display(), rows = records.len(), "csv parsed");
        Ok(records)
    }
}

// ==========================================
// Excel Parser
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn sheet_names(&self, file_path: &Path) -> ImportResult<Vec<String>> {
        ensure_exists(file_path)?;
        let workbook = open_workbook_auto(file_path)?;
        Ok(workbook.sheet_names())
    }

    fn parse_to_raw_records(
        &self,
        file_path: &Path,
        sheet: Option<&str>,
    ) -> ImportResult<Vec<RawRow>> {
        ensure_exists(file_path)?;
        let ext = extension(file_path);
        if !EXCEL_EXTENSIONS.contains(&ext.as_str()) {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(file_path)?;
        let sheet_names = workbook.sheet_names();
        let sheet_name = match sheet {
            Some(name) => sheet_names
                .iter()
                .find(|s| s.as_str() == name)
                .cloned()
                .ok_or_else(|| ImportError::SheetNotFound(name.to_string()))?,
            None => sheet_names.first().cloned().ok_or_else(|| {
                ImportError::ExcelParseError("workbook has no sheets".to_string())
            })?,
        };

        let range = workbook.worksheet_range(&sheet_name)?;
        let mut rows = range.rows();
        let headers: Vec<String> = match rows.next() {
            Some(header_row) => header_row
                .iter()
                .map(|cell| cell.to_string().trim().to_string())
                .collect(),
            None => return Ok(Vec::new()),
        };

        let records: Vec<RawRow> = rows
            .filter_map(|data_row| to_raw_row(&headers, data_row.iter()))
            .collect();

        debug!(
            file = %file_path.display(),
            sheet = %sheet_name,
            rows = records.len(),
            "workbook sheet parsed"
        );
        Ok(records)
    }
}

// ==========================================
// Universal parser (picks by extension)
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    fn parser_for(path: &Path) -> ImportResult<&'static dyn FileParser> {
        let ext = extension(path);
        match ext.as_str() {
            "csv" => Ok(&CsvParser as &dyn FileParser),
            e if EXCEL_EXTENSIONS.contains(&e) => Ok(&ExcelParser as &dyn FileParser),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }

    pub fn sheet_names<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<Vec<String>> {
        let path = file_path.as_ref();
        Self::parser_for(path)?.sheet_names(path)
    }

    pub fn parse<P: AsRef<Path>>(
        &self,
        file_path: P,
        sheet: Option<&str>,
    ) -> ImportResult<Vec<RawRow>> {
        let path = file_path.as_ref();
        Self::parser_for(path)?.parse_to_raw_records(path, sheet)
    }
}
