// Primitives shared by the survey file readers.

use std::path::Path;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
        .to_string()
}

pub fn make_default_id(path: &String) -> impl Fn(usize) -> String {
    let simplified_file_name = simplify_file_name(path.as_str());
    move |lineno| format!("{}-{:08}", simplified_file_name, lineno)
}

/// Finds the position of a column in the header row, if present.
pub fn header_index(header: &[String], column: &str) -> Option<usize> {
    header.iter().position(|c| c == column)
}

/// Parses a survey cell into an integer code.
///
/// Survey exports are loose about the cell types: the same column may carry
/// "3", "3.0" or an empty string. Anything that is not a whole number is a
/// null.
pub fn parse_code(cell: &str) -> Option<i64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(v) = trimmed.parse::<i64>() {
        return Some(v);
    }
    match trimmed.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 => Some(f as i64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_code_accepts_integer_shaped_cells() {
        assert_eq!(parse_code("3"), Some(3));
        assert_eq!(parse_code(" 3 "), Some(3));
        assert_eq!(parse_code("3.0"), Some(3));
        assert_eq!(parse_code("-1"), Some(-1));
    }

    #[test]
    fn parse_code_rejects_non_codes() {
        assert_eq!(parse_code(""), None);
        assert_eq!(parse_code("  "), None);
        assert_eq!(parse_code("3.5"), None);
        assert_eq!(parse_code("often"), None);
        assert_eq!(parse_code("NaN"), None);
    }
}
