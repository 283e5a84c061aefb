//! NIS (Nomor Induk Santri) codec.
//!
//! Format: `YYYY.MM.SSSSS` — calendar year and month of registration plus a
//! zero-padded sequence that restarts at 1 each month. Zero padding keeps
//! lexicographic order equal to numeric order within a month, so the
//! greatest existing code for a month prefix carries the last sequence.

use thiserror::Error;

/// Width of the sequence part.
pub const SEQUENCE_WIDTH: usize = 5;

/// Highest sequence representable in a month.
pub const MAX_SEQUENCE: u32 = 99_999;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum NisError {
    #[error("invalid nis format: {0:?}")]
    InvalidFormat(String),

    #[error("nis sequence exhausted for this month")]
    SequenceExhausted,
}

/// Format a NIS from its parts: `generate_nis(1, 2025, 10)` → `"2025.10.00001"`.
pub fn generate_nis(sequence: u32, year: i32, month: u32) -> Result<String, NisError> {
    if sequence == 0 || sequence > MAX_SEQUENCE {
        return Err(NisError::SequenceExhausted);
    }
    Ok(format!(
        "{:04}.{:02}.{:0width$}",
        year,
        month,
        sequence,
        width = SEQUENCE_WIDTH
    ))
}

/// The `YYYY.MM.` prefix shared by every NIS issued in a month.
pub fn month_prefix(year: i32, month: u32) -> String {
    format!("{:04}.{:02}.", year, month)
}

/// Extract the sequence number from a NIS.
pub fn extract_sequence(nis: &str) -> Result<u32, NisError> {
    let (_, _, seq) = split(nis)?;
    Ok(seq)
}

/// Extract the registration year and month from a NIS.
pub fn extract_year_month(nis: &str) -> Result<(i32, u32), NisError> {
    let (year, month, _) = split(nis)?;
    Ok((year, month))
}

/// Check whether a string is a well-formed NIS.
pub fn is_valid_nis(nis: &str) -> bool {
    split(nis).is_ok()
}

fn split(nis: &str) -> Result<(i32, u32, u32), NisError> {
    let invalid = || NisError::InvalidFormat(nis.to_string());

    let mut parts = nis.split('.');
    let (year, month, seq) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(y), Some(m), Some(s), None) => (y, m, s),
        _ => return Err(invalid()),
    };

    if year.len() != 4 || month.len() != 2 || seq.len() != SEQUENCE_WIDTH {
        return Err(invalid());
    }
    for part in [year, month, seq] {
        if !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
    }

    let year = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    let seq = seq.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok((year, month, seq))
}
