//! Positional parsing of University Seat Numbers.
//!
//! A USN such as `1MS22CS023` carries the admission year at byte offsets 3..5
//! and the department code at 5..7. The format is plain ASCII, so parsing is
//! purely positional.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Shortest identifier accepted as a well-formed USN.
pub const MIN_USN_LEN: usize = 10;

const YEAR: std::ops::Range<usize> = 3..5;
const DEPARTMENT: std::ops::Range<usize> = 5..7;

static DEPARTMENT_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2}$").expect("department pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsnError {
    #[error("invalid USN format: USN must be at least {required} characters long (got {actual})")]
    TooShort { required: usize, actual: usize },

    #[error("invalid USN format: '{0}' is not positionally parseable")]
    Malformed(String),
}

/// Extracts the two-digit admission year, e.g. `"22"` from `1MS22CS023`.
pub fn parse_year(usn: &str) -> Result<&str, UsnError> {
    let year = slice(usn, YEAR)?;
    tracing::debug!("Parsed year from USN {}: {}", usn, year);
    Ok(year)
}

/// Extracts the two-letter department code, e.g. `"CS"` from `1MS22CS023`.
pub fn parse_department(usn: &str) -> Result<&str, UsnError> {
    let department = slice(usn, DEPARTMENT)?;
    tracing::debug!("Parsed department from USN {}: {}", usn, department);
    Ok(department)
}

/// True when the USN is long enough, its year slice is numeric and its
/// department slice is exactly two upper-case letters. Never fails.
pub fn is_valid(usn: &str) -> bool {
    if usn.len() < MIN_USN_LEN {
        return false;
    }
    let (Some(year), Some(department)) = (usn.get(YEAR), usn.get(DEPARTMENT)) else {
        return false;
    };
    year.parse::<i32>().is_ok() && DEPARTMENT_CODE.is_match(department)
}

fn slice(usn: &str, range: std::ops::Range<usize>) -> Result<&str, UsnError> {
    if usn.len() < range.end {
        return Err(UsnError::TooShort {
            required: range.end,
            actual: usn.len(),
        });
    }
    usn.get(range)
        .ok_or_else(|| UsnError::Malformed(usn.to_string()))
}
