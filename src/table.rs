use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::{VolcanoError, VolcanoResult};

/// Cell tokens read as "missing" rather than as malformed numbers.
const MISSING_TOKENS: [&str; 6] = ["", "na", "nan", "n/a", "null", "none"];

/// A delimited table held in memory: one header and string cells per row.
#[derive(Debug, Clone)]
pub struct Table {
    source: PathBuf,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn column_index(&self, name: &str) -> VolcanoResult<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| VolcanoError::ColumnNotFound {
                column: name.to_string(),
                available: self.headers.clone(),
            })
    }

    /// Identifier strings for `name`, trimmed.
    pub fn text_column(&self, name: &str) -> VolcanoResult<Vec<String>> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|r| r[idx].trim().to_string()).collect())
    }

    /// Parse `name` as floats. Missing tokens become `None`; anything else
    /// that does not parse is an `InvalidValue` error.
    pub fn numeric_column(&self, name: &str) -> VolcanoResult<Vec<Option<f64>>> {
        let idx = self.column_index(name)?;
        self.rows
            .iter()
            .enumerate()
            .map(|(i, r)| parse_cell(&r[idx], name, i + 1))
            .collect()
    }
}

fn parse_cell(raw: &str, column: &str, row: usize) -> VolcanoResult<Option<f64>> {
    let s = raw.trim();
    if MISSING_TOKENS.iter().any(|t| s.eq_ignore_ascii_case(t)) {
        return Ok(None);
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_nan() => Ok(None),
        Ok(v) => Ok(Some(v)),
        Err(_) => Err(VolcanoError::InvalidValue {
            column: column.to_string(),
            row,
            value: s.to_string(),
            reason: "not a number".to_string(),
        }),
    }
}

/// Pick a delimiter from the extension, falling back to sniffing the header line.
fn detect_delimiter(path: &Path) -> VolcanoResult<u8> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "tsv" | "tab" | "txt" => return Ok(b'\t'),
        "csv" => return Ok(b','),
        _ => {}
    }

    let file = File::open(path).map_err(|e| VolcanoError::data_load(path, e))?;
    let mut reader = BufReader::new(file);
    let mut line = String::new();
    // Peek first non-empty, non-comment line
    loop {
        line.clear();
        let n = reader
            .read_line(&mut line)
            .map_err(|e| VolcanoError::data_load(path, e))?;
        if n == 0 {
            return Err(VolcanoError::data_load(path, "file is empty"));
        }
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        break;
    }
    Ok(sniff_delimiter(&line))
}

fn sniff_delimiter(header_line: &str) -> u8 {
    if header_line.contains('\t') && !header_line.contains(',') {
        b'\t'
    } else {
        b','
    }
}

/// Read `path` into a [`Table`]. `delimiter` overrides detection.
pub fn load_table(path: &Path, delimiter: Option<u8>) -> VolcanoResult<Table> {
    let delim = match delimiter {
        Some(d) => d,
        None => detect_delimiter(path)?,
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delim)
        .comment(Some(b'#'))
        .has_headers(true)
        .from_path(path)
        .map_err(|e| VolcanoError::data_load(path, e))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| VolcanoError::data_load(path, e))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(VolcanoError::data_load(path, "missing header row"));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| VolcanoError::data_load(path, e))?;
        rows.push(record.iter().map(|c| c.to_string()).collect());
    }

    log::info!(
        "Loaded {} rows x {} columns from {} (delimiter={:?})",
        rows.len(),
        headers.len(),
        path.display(),
        delim as char
    );

    Ok(Table {
        source: path.to_path_buf(),
        headers,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tmp(suffix: &str, body: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        f.write_all(body.as_bytes()).unwrap();
        f
    }

    #[test]
    fn loads_csv_with_header() {
        let f = write_tmp(".csv", "gene_name,log2FoldChange,padj\ng1,3,0.01\ng2,-2,0.2\n");
        let t = load_table(f.path(), None).unwrap();
        assert_eq!(t.headers(), &["gene_name", "log2FoldChange", "padj"]);
        assert_eq!(t.len(), 2);
        assert_eq!(t.text_column("gene_name").unwrap(), vec!["g1", "g2"]);
        assert_eq!(
            t.numeric_column("padj").unwrap(),
            vec![Some(0.01), Some(0.2)]
        );
    }

    #[test]
    fn sniffs_tab_delimiter_without_known_extension() {
        let f = write_tmp(".dat", "# DESeq2 export\ngene_name\tlog2FoldChange\tpadj\ng1\t1.5\t0.001\n");
        let t = load_table(f.path(), None).unwrap();
        assert_eq!(t.headers().len(), 3);
        assert_eq!(t.numeric_column("log2FoldChange").unwrap(), vec![Some(1.5)]);
    }

    #[test]
    fn explicit_delimiter_wins() {
        let f = write_tmp(".csv", "a;b\n1;2\n");
        let t = load_table(f.path(), Some(b';')).unwrap();
        assert_eq!(t.headers(), &["a", "b"]);
    }

    #[test]
    fn missing_tokens_are_none() {
        let f = write_tmp(".csv", "id,padj\na,NA\nb,\nc,nan\nd,0.5\n");
        let t = load_table(f.path(), None).unwrap();
        assert_eq!(
            t.numeric_column("padj").unwrap(),
            vec![None, None, None, Some(0.5)]
        );
    }

    #[test]
    fn non_numeric_cell_is_invalid_value() {
        let f = write_tmp(".csv", "id,padj\na,0.1\nb,high\n");
        let t = load_table(f.path(), None).unwrap();
        match t.numeric_column("padj") {
            Err(VolcanoError::InvalidValue { column, row, value, .. }) => {
                assert_eq!(column, "padj");
                assert_eq!(row, 2);
                assert_eq!(value, "high");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn missing_column_is_reported() {
        let f = write_tmp(".csv", "id,padj\na,0.1\n");
        let t = load_table(f.path(), None).unwrap();
        assert!(matches!(
            t.numeric_column("nonexistent"),
            Err(VolcanoError::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn unreadable_path_is_data_load_error() {
        let err = load_table(Path::new("/definitely/not/here.csv"), None).unwrap_err();
        assert!(matches!(err, VolcanoError::DataLoad { .. }));
    }

    #[test]
    fn ragged_rows_are_data_load_error() {
        let f = write_tmp(".csv", "a,b,c\n1,2,3\n4,5\n");
        let err = load_table(f.path(), None).unwrap_err();
        assert!(matches!(err, VolcanoError::DataLoad { .. }));
    }

    #[test]
    fn empty_file_is_data_load_error() {
        let f = write_tmp(".dat", "");
        assert!(matches!(
            load_table(f.path(), None),
            Err(VolcanoError::DataLoad { .. })
        ));
        let f = write_tmp(".csv", "");
        assert!(matches!(
            load_table(f.path(), None),
            Err(VolcanoError::DataLoad { .. })
        ));
    }
}
