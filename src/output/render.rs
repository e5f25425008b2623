//! Plain text renderers for tables and CSV rows

/// Render rows as a boxed table with a header row
///
/// Cells may span several lines; every line of a row is padded to the
/// widest line in its column.
pub fn render_table(header: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            let widest = cell.lines().map(|l| l.chars().count()).max().unwrap_or(0);
            widths[i] = widths[i].max(widest);
        }
    }

    let separator = {
        let mut line = String::from("+");
        for width in &widths {
            line.push_str(&"-".repeat(width + 2));
            line.push('+');
        }
        line.push('\n');
        line
    };

    let mut out = separator.clone();
    let header: Vec<String> = header.iter().map(|h| (*h).to_string()).collect();
    push_row(&mut out, &header, &widths);
    out.push_str(&separator);
    for row in rows {
        push_row(&mut out, row, &widths);
    }
    if !rows.is_empty() {
        out.push_str(&separator);
    }
    out
}

fn push_row(out: &mut String, row: &[String], widths: &[usize]) {
    let cells: Vec<Vec<&str>> = widths
        .iter()
        .enumerate()
        .map(|(i, _)| {
            let cell = row.get(i).map_or("", String::as_str);
            let lines: Vec<&str> = cell.lines().collect();
            if lines.is_empty() {
                vec![""]
            } else {
                lines
            }
        })
        .collect();
    let height = cells.iter().map(Vec::len).max().unwrap_or(1);

    for line in 0..height {
        out.push('|');
        for (cell, width) in cells.iter().zip(widths) {
            let text = cell.get(line).copied().unwrap_or("");
            let pad = width - text.chars().count();
            out.push(' ');
            out.push_str(text);
            out.push_str(&" ".repeat(pad + 1));
            out.push('|');
        }
        out.push('\n');
    }
}

/// Render one CSV record terminated by a newline
pub fn csv_record<S: AsRef<str>>(fields: &[S]) -> String {
    let mut line = fields
        .iter()
        .map(|f| csv_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    line
}

/// Quote a CSV field when it contains a delimiter, quote or line break
pub fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) || field.starts_with(' ') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
