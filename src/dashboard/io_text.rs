// Pass-through reader for the free-text tables (comments and keyword counts).
// These are not aggregated: each row is forwarded to the summary as a JSON
// object keyed by column name.

use std::io;

use serde_json::Map as JSMap;

use crate::dashboard::*;

pub fn read_table_json(path: String) -> DashResult<Vec<JSValue>> {
    info!("Attempting to read text table {:?}", path);
    let rdr = csv::Reader::from_path(path.clone()).context(CsvOpenSnafu { path })?;
    parse_table_json(rdr)
}

pub fn parse_table_json<R: io::Read>(mut rdr: csv::Reader<R>) -> DashResult<Vec<JSValue>> {
    let header: Vec<String> = rdr
        .headers()
        .context(CsvHeaderSnafu {})?
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut res: Vec<JSValue> = Vec::new();
    for (idx, line_r) in rdr.into_records().enumerate() {
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        let mut obj: JSMap<String, JSValue> = JSMap::new();
        for (col_idx, column) in header.iter().enumerate() {
            let cell = line
                .get(col_idx)
                .context(CsvLineTooShortSnafu { lineno })?;
            obj.insert(column.clone(), JSValue::String(cell.to_string()));
        }
        res.push(JSValue::Object(obj));
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_become_objects_keyed_by_column() {
        let data = "\
source,comment,category1
Fleet managers,Parts availability is the issue,maintenance
Other,,
";
        let rdr = csv::Reader::from_reader(data.as_bytes());
        let res = parse_table_json(rdr).unwrap();
        assert_eq!(res.len(), 2);
        assert_eq!(
            res[0]["source"],
            JSValue::String("Fleet managers".to_string())
        );
        assert_eq!(
            res[0]["category1"],
            JSValue::String("maintenance".to_string())
        );
        assert_eq!(res[1]["comment"], JSValue::String("".to_string()));
    }
}
