//! `.cube` text parser.
//!
//! Only the 3D form is understood. Keyword lines other than `LUT_3D_SIZE`
//! (`TITLE`, `DOMAIN_MIN`, `DOMAIN_MAX`, ...) are ignored.

use std::io::BufRead;

use crate::error::LutError;
use crate::table::{LutTable, Rgb, MAX_LATTICE_SIZE};

const SIZE_KEYWORD: &str = "LUT_3D_SIZE";

pub(crate) fn parse_cube<R: BufRead>(reader: R) -> Result<LutTable, LutError> {
    let mut size: usize = 0;
    let mut samples: Vec<Rgb> = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        let line = line.trim_end();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.contains(SIZE_KEYWORD) {
            size = parse_size(line, line_no)?;
            let expected = size * size * size;
            samples.reserve(expected.saturating_sub(samples.len()));
            continue;
        }

        if is_data_line(line) {
            samples.push(parse_rgb(line, line_no)?);
        }
    }

    if size == 0 {
        return Err(LutError::malformed(format!("missing {}", SIZE_KEYWORD)));
    }

    LutTable::from_samples(size, samples)
}

fn parse_size(line: &str, line_no: usize) -> Result<usize, LutError> {
    let mut tokens = line.split_whitespace();
    let _keyword = tokens.next();
    let value = tokens
        .next()
        .ok_or_else(|| LutError::at_line(line_no, format!("{} without a value", SIZE_KEYWORD)))?;
    let size: usize = value.parse().map_err(|_| {
        LutError::at_line(line_no, format!("invalid {} value '{}'", SIZE_KEYWORD, value))
    })?;
    if !(2..=MAX_LATTICE_SIZE).contains(&size) {
        return Err(LutError::at_line(
            line_no,
            format!("{} must be between 2 and {}, got {}", SIZE_KEYWORD, MAX_LATTICE_SIZE, size),
        ));
    }
    Ok(size)
}

/// Data rows start (after leading blanks) with a digit, a sign or a decimal point.
fn is_data_line(line: &str) -> bool {
    line.trim_start()
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || c == '-' || c == '.')
}

fn parse_rgb(line: &str, line_no: usize) -> Result<Rgb, LutError> {
    let mut values = [0.0_f32; 3];
    let mut tokens = line.split_whitespace();
    for value in values.iter_mut() {
        let token = tokens
            .next()
            .ok_or_else(|| LutError::at_line(line_no, "expected three values"))?;
        *value = token
            .parse()
            .map_err(|_| LutError::at_line(line_no, format!("invalid number '{}'", token)))?;
    }
    Ok(Rgb::new(values[0], values[1], values[2]))
}
