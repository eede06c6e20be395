use std::ffi::OsString;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::error::SimError;
use crate::util::csv_files;

/// Label appended when none is given
pub const DEFAULT_LABEL: &str = "0";

/// Suffix added to the input file name to name the output
pub const OUTPUT_SUFFIX: &str = "_out";

/// One relabelled file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelabelReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub lines: u64,
}

/// Appends `,label` to every line of every `.csv` file in `dir`
///
/// Each `name.csv` is written to `name.csv_out` next to it. Files which fail are logged and left
/// out of the returned reports, the rest of the directory is still processed
pub fn relabel_directory(dir: &Path, label: &str) -> Result<Vec<RelabelReport>, SimError> {
    let mut reports = Vec::new();
    for input in csv_files(dir)? {
        let output = output_path(&input);
        info!("Processing file: {}", input.display());
        match relabel_file(&input, &output, label) {
            Ok(lines) => reports.push(RelabelReport { input, output, lines }),
            Err(e) => error!("Skipping {}: {e}", input.display()),
        }
    }
    Ok(reports)
}

/// Copies `input` to `output` with `,label` appended to every line, returning the line count
pub fn relabel_file(input: &Path, output: &Path, label: &str) -> Result<u64, SimError> {
    let reader = BufReader::new(File::open(input).map_err(|e| SimError::io(input, e))?);
    let mut writer = BufWriter::new(File::create(output).map_err(|e| SimError::io(output, e))?);
    let mut lines = 0;
    for line in reader.split(b'\n') {
        let line = line.map_err(|e| SimError::io(input, e))?;
        let line = line.strip_suffix(b"\r").unwrap_or(&line[..]);
        writer
            .write_all(line)
            .and_then(|_| writeln!(writer, ",{label}"))
            .map_err(|e| SimError::io(output, e))?;
        lines += 1;
    }
    writer.flush().map_err(|e| SimError::io(output, e))?;
    Ok(lines)
}

fn output_path(input: &Path) -> PathBuf {
    let mut name = input.file_name().map(OsString::from).unwrap_or_default();
    name.push(OUTPUT_SUFFIX);
    input.with_file_name(name)
}
