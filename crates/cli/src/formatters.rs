//! Plain-text table rendering for command output.

/// Renders `rows` under `headers` with space-padded columns.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let line = |cells: Vec<&str>| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        padded.join("  ").trim_end().to_string()
    };

    let mut out = Vec::with_capacity(rows.len() + 2);
    out.push(line(headers.to_vec()));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push(line(rule.iter().map(String::as_str).collect()));
    for row in rows {
        out.push(line(row.iter().map(String::as_str).collect()));
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_are_aligned() {
        let table = render_table(
            &["NAME", "PERIOD"],
            &[
                vec!["weekly_sales".to_string(), "last-weeks (1)".to_string()],
                vec!["q".to_string(), "last-quarter".to_string()],
            ],
        );
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "NAME          PERIOD");
        assert_eq!(lines[1], "------------  --------------");
        assert_eq!(lines[2], "weekly_sales  last-weeks (1)");
        assert_eq!(lines[3], "q             last-quarter");
    }

    #[test]
    fn test_empty_rows_render_header_only() {
        let table = render_table(&["WEEK"], &[]);
        assert_eq!(table, "WEEK\n----");
    }
}
