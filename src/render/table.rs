use super::Shape;

/// A fully materialized grid: header row plus numbered data rows.
///
/// Construction is purely presentational. Source rows are never reordered,
/// and rows shorter than the column count are padded with empty cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RenderedTable {
    /// Builds the grid for a [`Shape::MultiColumnTable`]: a "SNo." column
    /// followed by generically labeled columns, rows numbered from 1.
    pub fn multi_column(rows: &[Vec<String>], column_count: usize) -> Self {
        let mut header = Vec::with_capacity(column_count + 1);
        header.push("SNo.".to_string());
        for idx in 0..column_count {
            header.push(format!("Column {}", idx + 1));
        }

        let rows = rows
            .iter()
            .enumerate()
            .map(|(idx, cols)| {
                let mut row = Vec::with_capacity(column_count + 1);
                row.push((idx + 1).to_string());
                for cidx in 0..column_count {
                    row.push(cols.get(cidx).cloned().unwrap_or_default());
                }
                row
            })
            .collect();

        Self { header, rows }
    }

    /// Builds the grid for a [`Shape::SingleColumnTable`]: "SNo." and
    /// "Details", one split segment per row.
    pub fn single_column(rows: &[String]) -> Self {
        let header = vec!["SNo.".to_string(), "Details".to_string()];
        let rows = rows
            .iter()
            .enumerate()
            .map(|(idx, cell)| vec![(idx + 1).to_string(), cell.clone()])
            .collect();

        Self { header, rows }
    }

    /// Builds a grid from a classified shape, or `None` for the bubble
    /// shapes, which have no tabular rendering.
    pub fn from_shape(shape: &Shape) -> Option<Self> {
        match shape {
            Shape::MultiColumnTable { rows, column_count } => {
                Some(Self::multi_column(rows, *column_count))
            }
            Shape::SingleColumnTable { rows } => Some(Self::single_column(rows)),
            Shape::DelimitedParagraph(_) | Shape::PlainBubble(_) => None,
        }
    }

    /// Formats the grid as monospace text, columns sized to their widest
    /// cell.
    pub fn to_text(&self) -> String {
        let columns = self.header.len();
        let mut widths = vec![0usize; columns];
        for row in std::iter::once(&self.header).chain(self.rows.iter()) {
            for (idx, cell) in row.iter().enumerate() {
                widths[idx] = widths[idx].max(cell.chars().count());
            }
        }

        let rule: String = {
            let mut line = String::from("+");
            for width in &widths {
                line.push_str(&"-".repeat(width + 2));
                line.push('+');
            }
            line
        };

        let format_row = |row: &[String]| {
            let mut line = String::from("|");
            for (idx, cell) in row.iter().enumerate() {
                let pad = widths[idx] - cell.chars().count();
                line.push(' ');
                line.push_str(cell);
                line.push_str(&" ".repeat(pad + 1));
                line.push('|');
            }
            line
        };

        let mut out = String::new();
        out.push_str(&rule);
        out.push('\n');
        out.push_str(&format_row(&self.header));
        out.push('\n');
        out.push_str(&rule);
        for row in &self.rows {
            out.push('\n');
            out.push_str(&format_row(row));
        }
        out.push('\n');
        out.push_str(&rule);
        out
    }
}
