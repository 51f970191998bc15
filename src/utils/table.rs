/// Horizontal placement of a column's cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

struct Column {
    header: String,
    align: Align,
    width: usize,
}

/// Plain-text table for terminal output. Columns size to their widest cell.
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Left-aligned columns with the given headers
    pub fn new(headers: &[&str]) -> Self {
        Table {
            columns: headers
                .iter()
                .map(|h| Column {
                    header: h.to_string(),
                    align: Align::Left,
                    width: h.chars().count(),
                })
                .collect(),
            rows: Vec::new(),
        }
    }

    /// Set the alignment of column `index`; out of range is ignored
    pub fn align(mut self, index: usize, align: Align) -> Self {
        if let Some(column) = self.columns.get_mut(index) {
            column.align = align;
        }
        self
    }

    /// Cells past the last column are dropped, missing cells render blank
    pub fn add_row<S: AsRef<str>>(&mut self, cells: &[S]) {
        let row: Vec<String> = cells
            .iter()
            .take(self.columns.len())
            .map(|c| c.as_ref().to_string())
            .collect();
        for (column, cell) in self.columns.iter_mut().zip(&row) {
            column.width = column.width.max(cell.chars().count());
        }
        self.rows.push(row);
    }

    pub fn render(&self) -> String {
        let headers: Vec<&str> = self.columns.iter().map(|c| c.header.as_str()).collect();
        let separator = self
            .columns
            .iter()
            .map(|c| "-".repeat(c.width))
            .collect::<Vec<_>>()
            .join("-+-");

        let mut lines = vec![self.render_row(&headers), separator];
        lines.extend(self.rows.iter().map(|row| {
            let cells: Vec<&str> = row.iter().map(String::as_str).collect();
            self.render_row(&cells)
        }));

        let mut output = lines.join("\n");
        output.push('\n');
        output
    }

    fn render_row(&self, cells: &[&str]) -> String {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let cell = cells.get(i).copied().unwrap_or("");
                match column.align {
                    Align::Left => format!("{:<width$}", cell, width = column.width),
                    Align::Right => format!("{:>width$}", cell, width = column.width),
                }
            })
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    }
}
