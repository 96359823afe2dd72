//! Minimal left-aligned table rendering for report output.

/// Render rows under a header line, columns padded to their widest cell.
pub fn tabulate(rows: &[Vec<String>], headers: &[&str]) -> String {
    let columns = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(columns) {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let mut out = String::new();
    render_row(&mut out, &widths, headers.iter().copied());
    let dividers: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    render_row(&mut out, &widths, dividers.iter().map(|s| s.as_str()));
    for row in rows {
        render_row(&mut out, &widths, row.iter().map(|c| c.as_str()));
    }
    out
}

fn render_row<'a>(out: &mut String, widths: &[usize], cells: impl Iterator<Item = &'a str>) {
    let mut line = String::new();
    for (i, cell) in cells.enumerate() {
        if i > 0 {
            line.push(' ');
        }
        line.push_str(&format!("{:<width$}", cell, width = widths[i]));
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_columns_to_widest_cell() {
        let rows = vec![
            vec!["squad".to_string(), "dataset".to_string(), "35.0K".to_string()],
            vec!["acme/widget".to_string(), "model".to_string(), "100.0".to_string()],
        ];
        let out = tabulate(&rows, &["REPO ID", "REPO TYPE", "SIZE"]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "REPO ID     REPO TYPE SIZE");
        assert_eq!(lines[1], "----------- --------- -----");
        assert!(lines[2].starts_with("squad"));
        assert!(lines[3].starts_with("acme/widget model"));
    }

    #[test]
    fn empty_rows_still_print_headers() {
        let out = tabulate(&[], &["A", "B"]);
        assert_eq!(out, "A B\n- -\n");
    }
}
