// Primitives for reading CSV survey exports.

use std::io;

use crate::dashboard::{
    io_common::{header_index, make_default_id, parse_code},
    *,
};

pub fn read_csv_respondents(path: String, cfs: &FileSource) -> DashResult<Vec<ParsedRespondent>> {
    let default_id = make_default_id(&path);
    let rdr = csv::Reader::from_path(path.clone()).context(CsvOpenSnafu { path })?;
    parse_respondents(rdr, cfs, default_id)
}

/// Parses the rows of an already-open CSV reader.
///
/// The first row is the header. The id column is optional: rows without one
/// get a synthetic id derived from the file name and line number.
pub fn parse_respondents<R: io::Read>(
    mut rdr: csv::Reader<R>,
    cfs: &FileSource,
    default_id: impl Fn(usize) -> String,
) -> DashResult<Vec<ParsedRespondent>> {
    let header: Vec<String> = rdr
        .headers()
        .context(CsvHeaderSnafu {})?
        .iter()
        .map(|s| s.to_string())
        .collect();
    debug!("parse_respondents: header: {:?}", header);

    let id_idx_o = header_index(&header, cfs.id_column_name());
    let source_idx = header_index(&header, cfs.source_column_name()).context(
        MissingColumnSnafu {
            column: cfs.source_column_name(),
        },
    )?;

    let mut res: Vec<ParsedRespondent> = Vec::new();
    for (idx, line_r) in rdr.into_records().enumerate() {
        // The header is line 1
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        debug!("parse_respondents: {:?} {:?}", lineno, line);

        let source_label = line
            .get(source_idx)
            .context(CsvLineTooShortSnafu { lineno })?
            .trim()
            .to_string();

        let id = match id_idx_o {
            Some(id_idx) => line
                .get(id_idx)
                .context(CsvLineTooShortSnafu { lineno })?
                .to_string(),
            None => default_id(lineno),
        };

        let mut answers: Vec<(String, i64)> = Vec::new();
        for (col_idx, cell) in line.iter().enumerate() {
            if Some(col_idx) == id_idx_o || col_idx == source_idx {
                continue;
            }
            if let Some(code) = parse_code(cell) {
                answers.push((header[col_idx].clone(), code));
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

#[cfg(test)]
mod tests {
    use super::*;

    fn default_source() -> FileSource {
        FileSource {
            provider: "csv".to_string(),
            file_path: "data_full_app.csv".to_string(),
            id_column: None,
            source_column: None,
            excel_worksheet_name: None,
        }
    }

    fn parse(data: &str, cfs: &FileSource) -> DashResult<Vec<ParsedRespondent>> {
        let rdr = csv::Reader::from_reader(data.as_bytes());
        parse_respondents(rdr, cfs, |lineno| format!("row-{}", lineno))
    }

    #[test]
    fn parses_codes_and_nulls() {
        let data = "\
id,source,turnover_priorities_1,decision_tools_cost
r1,Fleet managers,1,3.0
r2,Owner-Operators,,often
";
        let rows = parse(data, &default_source()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id.as_deref(), Some("r1"));
        assert_eq!(
            rows[0].answers,
            vec![
                ("turnover_priorities_1".to_string(), 1),
                ("decision_tools_cost".to_string(), 3)
            ]
        );
        // The empty cell and the non-numeric cell are both nulls
        assert!(rows[1].answers.is_empty());
    }

    #[test]
    fn missing_id_column_gets_synthetic_ids() {
        let data = "\
source,expand_fleet
Other,2
";
        let rows = parse(data, &default_source()).unwrap();
        assert_eq!(rows[0].id.as_deref(), Some("row-2"));
        assert_eq!(rows[0].lineno, 2);
    }

    #[test]
    fn missing_source_column_is_an_error() {
        let data = "id,expand_fleet\nr1,2\n";
        let res = parse(data, &default_source());
        assert!(matches!(res, Err(DashboardError::MissingColumn { .. })));
    }

    #[test]
    fn custom_column_names_are_honored() {
        let data = "\
respondent,group,replace_pre2010
a,Fleet managers,4
";
        let cfs = FileSource {
            id_column: Some("respondent".to_string()),
            source_column: Some("group".to_string()),
            ..default_source()
        };
        let rows = parse(data, &cfs).unwrap();
        assert_eq!(rows[0].id.as_deref(), Some("a"));
        assert_eq!(rows[0].source_label, "Fleet managers");
        assert_eq!(rows[0].answers, vec![("replace_pre2010".to_string(), 4)]);
    }
}
