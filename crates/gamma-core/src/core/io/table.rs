use nalgebra::{DMatrix, DVector};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("I/O error on '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid number '{token}' at {path}:{line}", path = path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        token: String,
    },

    #[error(
        "Ragged table '{path}': line {line} has {found} column(s), expected {expected}",
        path = path.display()
    )]
    Ragged {
        path: PathBuf,
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Table '{path}' contains no rows", path = path.display())]
    Empty { path: PathBuf },
}

/// Number of decimal places used for all written artifacts, matching the
/// `%1.5f` fixed-point convention of the wider training pipeline.
pub const OUTPUT_PRECISION: usize = 5;

/// Reads every whitespace-separated float in the file into a single vector,
/// regardless of line structure. Native phi files are one long line; solver
/// vector dumps are one value per line. Both parse identically here.
pub fn read_vector(path: &Path) -> Result<DVector<f64>, TableError> {
    let contents = read_contents(path)?;
    let mut values = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        for token in line.split_whitespace() {
            values.push(parse_token(path, index + 1, token)?);
        }
    }
    if values.is_empty() {
        return Err(TableError::Empty {
            path: path.to_path_buf(),
        });
    }
    Ok(DVector::from_vec(values))
}

/// Reads a rectangular matrix, one row per non-empty line. Every row must
/// have the same number of columns as the first.
pub fn read_matrix(path: &Path) -> Result<DMatrix<f64>, TableError> {
    let contents = read_contents(path)?;
    let mut rows: Vec<Vec<f64>> = Vec::new();
    let mut width = 0usize;

    for (index, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let mut row = Vec::with_capacity(width);
        for token in line.split_whitespace() {
            row.push(parse_token(path, index + 1, token)?);
        }
        if rows.is_empty() {
            width = row.len();
        } else if row.len() != width {
            return Err(TableError::Ragged {
                path: path.to_path_buf(),
                line: index + 1,
                expected: width,
                found: row.len(),
            });
        }
        rows.push(row);
    }

    if rows.is_empty() || width == 0 {
        return Err(TableError::Empty {
            path: path.to_path_buf(),
        });
    }

    let num_rows = rows.len();
    Ok(DMatrix::from_fn(num_rows, width, |i, j| rows[i][j]))
}

/// Writes a vector, one fixed-point value per line.
pub fn write_vector(path: &Path, vector: &DVector<f64>) -> Result<(), TableError> {
    write_atomic(path, |out| {
        for value in vector.iter() {
            writeln!(out, "{value:.prec$}", prec = OUTPUT_PRECISION)?;
        }
        Ok(())
    })
}

/// Writes a matrix, one row per line with space-separated fixed-point values.
pub fn write_matrix(path: &Path, matrix: &DMatrix<f64>) -> Result<(), TableError> {
    write_atomic(path, |out| {
        for i in 0..matrix.nrows() {
            let mut first = true;
            for j in 0..matrix.ncols() {
                if !first {
                    write!(out, " ")?;
                }
                write!(out, "{:.prec$}", matrix[(i, j)], prec = OUTPUT_PRECISION)?;
                first = false;
            }
            writeln!(out)?;
        }
        Ok(())
    })
}

fn read_contents(path: &Path) -> Result<String, TableError> {
    fs::read_to_string(path).map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_token(path: &Path, line: usize, token: &str) -> Result<f64, TableError> {
    token.parse::<f64>().map_err(|_| TableError::Parse {
        path: path.to_path_buf(),
        line,
        token: token.to_string(),
    })
}

// Temp-then-rename so a failed run never leaves a truncated artifact behind
// under the final name.
fn write_atomic(
    path: &Path,
    write_body: impl FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
) -> Result<(), TableError> {
    let io_err = |source: std::io::Error| TableError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    let file = File::create(&tmp_path).map_err(io_err)?;
    let mut out = BufWriter::new(file);
    write_body(&mut out).map_err(io_err)?;
    out.flush().map_err(io_err)?;
    drop(out);

    fs::rename(&tmp_path, path).map_err(io_err)
}
