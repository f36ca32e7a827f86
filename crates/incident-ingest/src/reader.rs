//! Quote-aware parsing into a [`RawTable`].

use csv::ReaderBuilder;

use incident_model::{RaggedRow, RawTable};

use crate::error::Result;

/// Cleans a header cell: trims whitespace and drops stray quote characters.
pub fn clean_header(raw: &str) -> String {
    raw.trim().replace(['"', '\''], "")
}

fn normalize_cell(raw: &str) -> String {
    raw.trim_matches('\u{feff}').to_string()
}

/// Parses decoded text with a known delimiter and header setting.
///
/// Blank lines are skipped. Rows are padded or truncated to the header width
/// and every mismatch is recorded in [`RawTable::ragged`]. Headerless files get
/// `column_1..column_n` names, `n` being the width of the first record.
pub fn read_table(text: &str, delimiter: char, has_headers: bool) -> Result<RawTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(u8::try_from(delimiter).unwrap_or(b','))
        .from_reader(text.as_bytes());

    let mut headers: Option<Vec<String>> = None;
    let mut rows = Vec::new();
    let mut lines = Vec::new();
    let mut ragged = Vec::new();

    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, csv::Position::line);

        let width = match &headers {
            Some(headers) => headers.len(),
            None if has_headers => {
                headers = Some(record.iter().map(clean_header).collect());
                continue;
            }
            None => {
                let names = (1..=record.len()).map(|idx| format!("column_{idx}")).collect();
                headers = Some(names);
                record.len()
            }
        };

        if record.len() != width {
            ragged.push(RaggedRow {
                line,
                fields: record.len(),
            });
        }
        let mut row: Vec<String> = record.iter().take(width).map(normalize_cell).collect();
        row.resize(width, String::new());
        rows.push(row);
        lines.push(line);
    }

    Ok(RawTable::new(
        headers.unwrap_or_default(),
        rows,
        lines,
        delimiter,
        has_headers,
    )
    .with_ragged(ragged))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_fields_keep_delimiters_and_newlines() {
        let table = read_table(
            "type,description\nVol,\"sac, portefeuille\"\nRixe,\"deux\nlignes\"\nFraude,x\n",
            ',',
            true,
        )
        .unwrap();
        assert_eq!(table.headers, vec!["type", "description"]);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.cell(0, 1), Some("sac, portefeuille"));
        assert_eq!(table.cell(1, 1), Some("deux\nlignes"));
        assert_eq!(table.lines, vec![2, 3, 5]);
    }

    #[test]
    fn short_and_long_rows_are_aligned() {
        let table = read_table("a;b;c\n1;2\n1;2;3;4\n", ';', true).unwrap();
        assert_eq!(table.rows[0], vec!["1", "2", ""]);
        assert_eq!(table.rows[1], vec!["1", "2", "3"]);
        assert_eq!(
            table.ragged,
            vec![
                RaggedRow { line: 2, fields: 2 },
                RaggedRow { line: 3, fields: 4 }
            ]
        );
    }

    #[test]
    fn headerless_files_get_positional_names() {
        let table = read_table("Vol,Dakar\n\nRixe,Thies\n", ',', false).unwrap();
        assert_eq!(table.headers, vec!["column_1", "column_2"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.lines, vec![1, 3]);
    }

    #[test]
    fn header_cells_are_cleaned() {
        assert_eq!(clean_header("  'Lieu' "), "Lieu");
        assert_eq!(clean_header("\"date\""), "date");
    }
}
