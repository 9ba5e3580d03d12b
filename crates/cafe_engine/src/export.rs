use std::io;
use std::path::{Path, PathBuf};

use cafe_core::{CafeRecord, FailureRecord};
use engine_logging::{engine_error, engine_info};
use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::persist::{append_lines, ensure_output_dir, AtomicFileWriter, PersistError};

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub csv_filename: String,
    pub xlsx_filename: String,
    pub error_log_filename: String,
    pub sheet_name: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            csv_filename: "timeout_london_cafes.csv".to_string(),
            xlsx_filename: "timeout_london_cafes.xlsx".to_string(),
            error_log_filename: "timeout_errors.log".to_string(),
            sheet_name: "Cafes".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub row_count: usize,
    pub csv_path: PathBuf,
    pub xlsx_path: PathBuf,
    pub error_log_path: PathBuf,
    pub failures_logged: usize,
}

/// Why a single output format could not be produced.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("xlsx error: {0}")]
    Xlsx(#[from] XlsxError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, thiserror::Error)]
#[error("{}: {}", .path.display(), .message)]
pub struct TargetFailure {
    pub path: PathBuf,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// `unflushed` holds the error log lines that could not be saved either.
    #[error("output directory unavailable: {source}")]
    OutputDir {
        #[source]
        source: PersistError,
        unflushed: Vec<String>,
    },
    #[error("failed to write {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    Targets(Vec<TargetFailure>),
}

/// Writes the record table as CSV and XLSX and appends failures to the error log.
pub struct Exporter {
    dir: PathBuf,
    options: ExportOptions,
}

impl Exporter {
    pub fn new(dir: PathBuf, options: ExportOptions) -> Self {
        Self { dir, options }
    }

    /// Every target is attempted; failures are reported together afterwards.
    pub fn export(
        &self,
        records: &[CafeRecord],
        failures: &[FailureRecord],
    ) -> Result<ExportSummary, ExportError> {
        if let Err(source) = ensure_output_dir(&self.dir) {
            engine_error!("Output directory {} unavailable: {}", self.dir.display(), source);
            let unflushed = match self.write_error_log(failures) {
                Ok(()) => Vec::new(),
                Err(err) => {
                    engine_error!("Error log could not be flushed: {}", err);
                    surface_unflushed(failures)
                }
            };
            return Err(ExportError::OutputDir { source, unflushed });
        }

        let writer = AtomicFileWriter::new(self.dir.clone());
        let csv_path = self.dir.join(&self.options.csv_filename);
        let xlsx_path = self.dir.join(&self.options.xlsx_filename);
        let log_path = self.dir.join(&self.options.error_log_filename);
        let mut failed = Vec::new();

        let csv_result = render_csv(records)
            .and_then(|bytes| Ok(writer.write(&self.options.csv_filename, &bytes)?));
        note_result(&csv_path, csv_result.map(|_| ()), &mut failed);

        let xlsx_result = render_xlsx(records, &self.options.sheet_name)
            .and_then(|bytes| Ok(writer.write(&self.options.xlsx_filename, &bytes)?));
        note_result(&xlsx_path, xlsx_result.map(|_| ()), &mut failed);

        let log_result = self.write_error_log(failures);
        note_result(&log_path, log_result, &mut failed);

        if !failed.is_empty() {
            return Err(ExportError::Targets(failed));
        }

        engine_info!(
            "Exported {} records to {} and {}",
            records.len(),
            csv_path.display(),
            xlsx_path.display()
        );
        Ok(ExportSummary {
            row_count: records.len(),
            csv_path,
            xlsx_path,
            error_log_path: log_path,
            failures_logged: failures.len(),
        })
    }

    /// Flush failures without touching the data files.
    pub fn append_error_log(&self, failures: &[FailureRecord]) -> Result<PathBuf, ExportError> {
        let path = self.dir.join(&self.options.error_log_filename);
        if let Err(err) = self.write_error_log(failures) {
            engine_error!("Error log could not be flushed: {}", err);
            surface_unflushed(failures);
            return Err(ExportError::Targets(vec![TargetFailure {
                path,
                message: err.to_string(),
            }]));
        }
        Ok(path)
    }

    fn write_error_log(&self, failures: &[FailureRecord]) -> Result<(), FormatError> {
        append_lines(
            &self.dir,
            &self.options.error_log_filename,
            failures.iter().map(FailureRecord::log_line),
        )?;
        Ok(())
    }
}

/// Last resort for failures that never reached the log file.
fn surface_unflushed(failures: &[FailureRecord]) -> Vec<String> {
    failures
        .iter()
        .map(|failure| {
            let line = failure.log_line();
            engine_error!("Unsaved failure: {}", line);
            line
        })
        .collect()
}

fn note_result(path: &Path, result: Result<(), FormatError>, failed: &mut Vec<TargetFailure>) {
    if let Err(err) = result {
        engine_error!("Failed to write {}: {}", path.display(), err);
        failed.push(TargetFailure {
            path: path.to_path_buf(),
            message: err.to_string(),
        });
    }
}

/// UTF-8 CSV with a header row, `\n` line endings.
pub fn render_csv(records: &[CafeRecord]) -> Result<Vec<u8>, FormatError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(CafeRecord::COLUMNS)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer
        .into_inner()
        .map_err(|err| FormatError::Io(err.into_error()))
}

/// Single-sheet workbook: bold header row, one row per record, empty cells left blank.
pub fn render_xlsx(records: &[CafeRecord], sheet_name: &str) -> Result<Vec<u8>, FormatError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    for (col, name) in CafeRecord::COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *name, &header)?;
    }
    for (row, record) in records.iter().enumerate() {
        let row = (row + 1) as u32;
        for (col, value) in record.row().into_iter().enumerate() {
            if !value.is_empty() {
                worksheet.write_string(row, col as u16, value)?;
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}
