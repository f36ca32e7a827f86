//! Delimiter and header-row sniffing on the raw text.

/// Candidate delimiters, in tie-break order.
pub const DELIMITER_CANDIDATES: [char; 4] = [',', ';', '\t', '|'];

/// Lines inspected when choosing a delimiter.
pub const SNIFF_LINES: usize = 5;

/// Picks the delimiter with the highest average field count over the first lines.
///
/// Fields are counted with a plain split; quoting is ignored here.
pub fn detect_delimiter(text: &str) -> char {
    let lines: Vec<&str> = text.split('\n').take(SNIFF_LINES).collect();
    let mut best = DELIMITER_CANDIDATES[0];
    let mut best_avg = 0.0_f64;
    for delimiter in DELIMITER_CANDIDATES {
        let fields: usize = lines
            .iter()
            .map(|line| line.split(delimiter).count())
            .sum();
        let avg = fields as f64 / lines.len().max(1) as f64;
        if avg > best_avg {
            best_avg = avg;
            best = delimiter;
        }
    }
    best
}

fn is_label(value: &str) -> bool {
    value.trim().chars().any(char::is_alphabetic)
}

/// True when more than half of the first line's fields look like labels.
pub fn detect_headers(first_line: &str, delimiter: char) -> bool {
    let values: Vec<&str> = first_line.split(delimiter).collect();
    let labels = values.iter().filter(|value| is_label(value)).count();
    labels as f64 / values.len() as f64 > 0.5
}

/// First line with content, used for header detection.
pub fn first_line(text: &str) -> &str {
    text.lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_the_widest_split() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3\n"), ';');
        assert_eq!(detect_delimiter("a\tb\n1\t2\n"), '\t');
        assert_eq!(detect_delimiter("a|b|c|d\n"), '|');
    }

    #[test]
    fn ties_keep_listed_order() {
        assert_eq!(detect_delimiter("a,b;c\n"), ',');
        assert_eq!(detect_delimiter("single"), ',');
    }

    #[test]
    fn header_needs_a_majority_of_labels() {
        assert!(detect_headers("type,lieu,date", ','));
        assert!(detect_headers("Gravité;Zone;2024", ';'));
        assert!(!detect_headers("Vol,12,2024-01-05", ','));
        assert!(!detect_headers("1,2,3", ','));
        assert!(!detect_headers("a,1", ','));
    }
}
