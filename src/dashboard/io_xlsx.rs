// Primitives for reading Excel survey exports.

use calamine::{open_workbook, DataType, Reader, Xlsx};

use crate::dashboard::{
    io_common::{header_index, make_default_id, parse_code},
    *,
};

pub fn read_xlsx_respondents(path: String, cfs: &FileSource) -> DashResult<Vec<ParsedRespondent>> {
    let default_id = make_default_id(&path);

    let wrange = get_range(&path, cfs)?;
    let header_row = wrange.rows().next().context(EmptyExcelSnafu {})?;
    debug!("read_xlsx_respondents: header: {:?}", header_row);

    let header: Vec<String> = header_row
        .iter()
        .map(|dt| match dt {
            DataType::String(s) => s.clone(),
            x => format!("{}", x),
        })
        .collect();

    let id_idx_o = header_index(&header, cfs.id_column_name());
    let source_idx = header_index(&header, cfs.source_column_name()).context(
        MissingColumnSnafu {
            column: cfs.source_column_name(),
        },
    )?;

    let mut iter = wrange.rows();
    iter.next();
    let mut res: Vec<ParsedRespondent> = Vec::new();
    for (idx, row) in iter.enumerate() {
        let lineno = idx + 2;
        debug!("read_xlsx_respondents: lineno: {:?} row: {:?}", lineno, row);

        let source_label = match row.get(source_idx) {
            Some(DataType::String(s)) => s.trim().to_string(),
            _ => String::new(),
        };

        let id = match id_idx_o.and_then(|id_idx| row.get(id_idx)) {
            Some(DataType::String(s)) => s.clone(),
            Some(DataType::Int(v)) => format!("{}", v),
            Some(DataType::Float(f)) => format!("{}", f),
            _ => default_id(lineno),
        };

        let mut answers: Vec<(String, i64)> = Vec::new();
        for (col_idx, cell) in row.iter().enumerate() {
            if Some(col_idx) == id_idx_o || col_idx == source_idx {
                continue;
            }
            let column = match header.get(col_idx) {
                Some(c) => c.clone(),
                None => continue,
            };
            if let Some(code) = read_code(cell) {
                answers.push((column, code));
            }
        }

        res.push(ParsedRespondent {
            id: Some(id),
            source_label,
            answers,
            lineno,
        });
    }
    Ok(res)
}

/// Reads one cell as an integer code. Cells that are not whole numbers are
/// nulls, the same policy as the CSV reader.
fn read_code(cell: &DataType) -> Option<i64> {
    match cell {
        DataType::Int(v) => Some(*v),
        DataType::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(*f as i64),
        DataType::String(s) => parse_code(s.as_str()),
        DataType::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

fn get_range(path: &String, cfs: &FileSource) -> DashResult<calamine::Range<DataType>> {
    let worksheet_name_o = cfs.excel_worksheet_name.clone();
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        &path, &worksheet_name_o
    );
    let mut workbook: Xlsx<_> =
        open_workbook(path.clone()).context(OpeningExcelSnafu { path: path.clone() })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = worksheet_name_o {
        let wrange = workbook
            .worksheet_range(&worksheet_name)
            .context(EmptyExcelSnafu {})?
            .context(OpeningExcelSnafu { path: path.clone() })?;
        Ok(wrange)
    } else {
        let all_worksheets = workbook.worksheets();
        match all_worksheets.as_slice() {
            [] => EmptyExcelSnafu {}.fail(),
            [(worksheet_name, wrange)] => {
                debug!(
                    "get_range: path: {:?} worksheet: {:?}",
                    &path, &worksheet_name
                );
                Ok(wrange.clone())
            }
            _ => whatever!("get_range: too many worksheets, the worksheet name must be provided"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_code_matches_cell_types() {
        assert_eq!(read_code(&DataType::Int(3)), Some(3));
        assert_eq!(read_code(&DataType::Float(3.0)), Some(3));
        assert_eq!(read_code(&DataType::Float(3.5)), None);
        assert_eq!(read_code(&DataType::String("4".to_string())), Some(4));
        assert_eq!(read_code(&DataType::String("often".to_string())), None);
        assert_eq!(read_code(&DataType::Bool(true)), Some(1));
        assert_eq!(read_code(&DataType::Empty), None);
    }
}
