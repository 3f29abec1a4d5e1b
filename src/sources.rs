// 📂 Table Sources - CSV / spreadsheet readers
//
// Every input file is reduced to the same shape: rows of trimmed strings,
// indexed by absolute sheet position (row 0 = spreadsheet row 1, column 0 =
// column A). Roster loading, export reading and prior-report reading are
// thin views over that shape.
//
// NOTE: the csv crate drops blank lines, so for CSV exports `skip_rows`
// counts non-blank lines.

use crate::config::ReconcileConfig;
use crate::error::{SourceError, SourceResult};
use calamine::{open_workbook_auto, Data, Range, Reader};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info, warn};

pub type Row = Vec<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Spreadsheet,
}

impl TableFormat {
    /// Pick a reader from the file extension (case-insensitive)
    pub fn detect(path: &Path) -> SourceResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => Ok(TableFormat::Csv),
            "xlsx" | "xls" | "xlsm" | "ods" => Ok(TableFormat::Spreadsheet),
            _ => Err(SourceError::UnsupportedFormat(ext)),
        }
    }
}

/// Read every row of a CSV file or of the first worksheet of a spreadsheet.
pub fn read_table(path: &Path) -> SourceResult<Vec<Row>> {
    if !path.exists() {
        return Err(SourceError::FileNotFound(path.to_path_buf()));
    }

    let rows = match TableFormat::detect(path)? {
        TableFormat::Csv => read_csv_rows(path)?,
        TableFormat::Spreadsheet => read_spreadsheet_rows(path)?,
    };

    debug!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

fn read_csv_rows(path: &Path) -> SourceResult<Vec<Row>> {
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let row: Row = record.iter().map(clean_cell).collect();
        rows.push(row);
    }

    Ok(rows)
}

fn read_spreadsheet_rows(path: &Path) -> SourceResult<Vec<Row>> {
    let mut workbook = open_workbook_auto(path).map_err(|e| SourceError::Spreadsheet {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let first_sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| SourceError::EmptySheet(path.to_path_buf()))?;

    let range = workbook
        .worksheet_range(&first_sheet)
        .map_err(|e| SourceError::Spreadsheet {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    Ok(range_to_rows(&range))
}

/// Lay a calamine range out on absolute sheet coordinates.
///
/// calamine trims leading empty rows/columns from a range; padding them back
/// keeps `skip_rows` and `input_column` meaning "spreadsheet row/column".
fn range_to_rows(range: &Range<Data>) -> Vec<Row> {
    let (start_row, start_col) = match range.start() {
        Some(start) => start,
        None => return Vec::new(),
    };

    let mut rows: Vec<Row> = (0..start_row).map(|_| Vec::new()).collect();

    for data_row in range.rows() {
        let mut row: Row = vec![String::new(); start_col as usize];
        row.extend(data_row.iter().map(|cell| clean_cell(&cell.to_string())));
        rows.push(row);
    }

    rows
}

fn clean_cell(value: &str) -> String {
    value.trim_start_matches('\u{feff}').trim().to_string()
}

/// Raw candidate tokens from a quiz export.
///
/// Skips `config.skip_rows` leading rows, reads `config.input_column`, and
/// drops empty cells. Tokens come back verbatim (trimmed only).
pub fn read_export(path: &Path, config: &ReconcileConfig) -> SourceResult<Vec<String>> {
    let inputs = export_inputs(read_table(path)?, config);

    info!("Loaded {} responses from {}", inputs.len(), path.display());
    Ok(inputs)
}

fn export_inputs(rows: Vec<Row>, config: &ReconcileConfig) -> Vec<String> {
    rows.into_iter()
        .skip(config.skip_rows)
        .filter_map(|row| row.into_iter().nth(config.input_column))
        .filter(|cell| !cell.is_empty())
        .collect()
}

/// IDs from a previously written resolution report.
///
/// Short rows are kept (missing fields read as empty); rows with more fields
/// than the header and unparseable lines are skipped. A missing ID column is
/// an error so the caller can decide to skip the whole source.
pub fn read_resolved_ids(path: &Path, id_column: &str) -> SourceResult<Vec<String>> {
    if !path.exists() {
        return Err(SourceError::FileNotFound(path.to_path_buf()));
    }

    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let headers = reader.headers()?.clone();
    let column = headers
        .iter()
        .position(|h| clean_cell(h) == id_column)
        .ok_or_else(|| SourceError::MissingColumn {
            column: id_column.to_string(),
            path: path.to_path_buf(),
        })?;

    let mut ids = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping bad line {} in {}: {}", line + 2, path.display(), e);
                continue;
            }
        };

        if record.len() > headers.len() {
            warn!(
                "Skipping line {} in {}: {} fields, header has {}",
                line + 2,
                path.display(),
                record.len(),
                headers.len()
            );
            continue;
        }

        if let Some(id) = record.get(column).map(clean_cell) {
            if !id.is_empty() {
                ids.push(id);
            }
        }
    }

    debug!("Read {} resolved IDs from {}", ids.len(), path.display());
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn csv_file(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(TableFormat::detect(Path::new("a.CSV")).unwrap(), TableFormat::Csv);
        assert_eq!(
            TableFormat::detect(Path::new("quiz.xlsx")).unwrap(),
            TableFormat::Spreadsheet
        );
        assert!(matches!(
            TableFormat::detect(Path::new("notes.txt")),
            Err(SourceError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_read_table_flexible_rows() {
        let file = csv_file(&["ID,Nome", "1002013, Ana Pereira ", "1002099"]);
        let rows = read_table(file.path()).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], vec!["1002013", "Ana Pereira"]);
        assert_eq!(rows[2], vec!["1002099"]);
    }

    #[test]
    fn test_read_table_missing_file() {
        let result = read_table(Path::new("missing-roster.csv"));
        assert!(matches!(result, Err(SourceError::FileNotFound(_))));
    }

    #[test]
    fn test_read_export_skips_metadata_rows() {
        let file = csv_file(&[
            "Quiz report",
            "Date,2024-03-01",
            "Room,ABC",
            "Score,",
            "Total,4",
            "Student Names,Q1",
            "1002013,A",
            ",B",
            "Bruno Costa 🙂,C",
        ]);

        let config = ReconcileConfig::default();
        let inputs = read_export(file.path(), &config).unwrap();

        assert_eq!(inputs, vec!["1002013", "Bruno Costa 🙂"]);
    }

    #[test]
    fn test_read_export_other_column() {
        let file = csv_file(&["name,id", "x,1002013", "y,"]);
        let config = ReconcileConfig {
            skip_rows: 1,
            input_column: 1,
            ..ReconcileConfig::default()
        };

        let inputs = read_export(file.path(), &config).unwrap();
        assert_eq!(inputs, vec!["1002013"]);
    }

    #[test]
    fn test_read_resolved_ids() {
        let file = csv_file(&[
            "Student Number,Student Name,Original Input",
            "1002013,Ana Pereira,ana",
            ",,",
            "1002099,Bruno Costa,bruno",
        ]);

        let ids = read_resolved_ids(file.path(), "Student Number").unwrap();
        assert_eq!(ids, vec!["1002013", "1002099"]);
    }

    #[test]
    fn test_read_resolved_ids_keeps_short_rows() {
        let file = csv_file(&[
            "Student Number,Student Name,Original Input",
            "1002013,Ana Pereira,ana",
            "1002100",
            "1002099,Bruno Costa",
        ]);

        let ids = read_resolved_ids(file.path(), "Student Number").unwrap();
        assert_eq!(ids, vec!["1002013", "1002100", "1002099"]);
    }

    #[test]
    fn test_read_resolved_ids_skips_long_rows() {
        let file = csv_file(&[
            "Student Number,Student Name",
            "1002013,Ana Pereira",
            "1002100,Too,Many,Fields",
            "1002099,Bruno Costa",
        ]);

        let ids = read_resolved_ids(file.path(), "Student Number").unwrap();
        assert_eq!(ids, vec!["1002013", "1002099"]);
    }

    #[test]
    fn test_range_to_rows_pads_trimmed_sheet() {
        // Sheet data starts at B3: calamine trims rows 1-2 and column A
        let mut range: Range<Data> = Range::new((2, 1), (3, 1));
        range.set_value((2, 1), Data::String("Student Names".to_string()));
        range.set_value((3, 1), Data::Float(1002013.0));

        let rows = range_to_rows(&range);
        assert_eq!(rows.len(), 4);
        assert!(rows[0].is_empty());
        assert_eq!(rows[2], vec!["", "Student Names"]);
        assert_eq!(rows[3], vec!["", "1002013"]);

        let config = ReconcileConfig {
            skip_rows: 3,
            input_column: 1,
            ..ReconcileConfig::default()
        };
        assert_eq!(export_inputs(rows, &config), vec!["1002013"]);
    }

    #[test]
    fn test_range_to_rows_empty_sheet() {
        let range: Range<Data> = Range::empty();
        assert!(range_to_rows(&range).is_empty());
    }

    #[test]
    fn test_read_resolved_ids_missing_column() {
        let file = csv_file(&["Number,Name", "1002013,Ana"]);

        let result = read_resolved_ids(file.path(), "Student Number");
        assert!(matches!(result, Err(SourceError::MissingColumn { .. })));
    }
}
