//! Sample rows shown by the demo table, and sorting them by the table's
//! sort specs.

use std::cmp::Ordering;

use tabula::{SortDirection, TableColumnSortSpec};

/// User ids handed to `table_setup_column`, so sorting does not depend on
/// where the user dragged the columns.
pub const COLUMN_NAME: u32 = 1;
pub const COLUMN_SIZE: u32 = 2;
pub const COLUMN_KIND: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRow {
    pub name: String,
    pub size: u64,
    pub kind: &'static str,
}

impl FileRow {
    fn new(name: &str, size: u64, kind: &'static str) -> Self {
        Self {
            name: name.to_string(),
            size,
            kind,
        }
    }

    pub fn size_label(&self) -> String {
        match self.size {
            s if s >= 1 << 20 => format!("{:.1} MiB", s as f64 / (1 << 20) as f64),
            s if s >= 1 << 10 => format!("{:.1} KiB", s as f64 / (1 << 10) as f64),
            s => format!("{s} B"),
        }
    }
}

pub fn sample_rows() -> Vec<FileRow> {
    vec![
        FileRow::new("Cargo.toml", 412, "toml"),
        FileRow::new("README.md", 3_210, "markdown"),
        FileRow::new("src/lib.rs", 1_024, "rust"),
        FileRow::new("src/table/layout.rs", 24_500, "rust"),
        FileRow::new("assets/font.ttf", 2_400_000, "font"),
        FileRow::new("tabula.ini", 96, "ini"),
        FileRow::new("screenshot.png", 184_320, "image"),
    ]
}

fn compare(a: &FileRow, b: &FileRow, spec: &TableColumnSortSpec) -> Ordering {
    let ordering = match spec.column_user_id {
        COLUMN_NAME => a.name.cmp(&b.name),
        COLUMN_SIZE => a.size.cmp(&b.size),
        COLUMN_KIND => a.kind.cmp(b.kind),
        _ => Ordering::Equal,
    };
    match spec.sort_direction {
        SortDirection::Descending => ordering.reverse(),
        _ => ordering,
    }
}

/// Stable sort by every spec in order, later specs breaking ties.
pub fn sort_rows(rows: &mut [FileRow], specs: &[TableColumnSortSpec]) {
    rows.sort_by(|a, b| {
        specs
            .iter()
            .map(|spec| compare(a, b, spec))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn spec(user_id: u32, sort_order: usize, sort_direction: SortDirection) -> TableColumnSortSpec {
        TableColumnSortSpec {
            column_user_id: user_id,
            column_index: user_id as usize - 1,
            sort_order,
            sort_direction,
        }
    }

    fn names(rows: &[FileRow]) -> Vec<&str> {
        rows.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_sort_by_size_descending() {
        let mut rows = sample_rows();
        sort_rows(&mut rows, &[spec(COLUMN_SIZE, 0, SortDirection::Descending)]);
        assert_eq!(&names(&rows)[..2], &["assets/font.ttf", "screenshot.png"]);
        assert_eq!(rows.last().map(|r| r.size), Some(96));
    }

    #[test]
    fn test_second_spec_breaks_ties() {
        let mut rows = sample_rows();
        sort_rows(
            &mut rows,
            &[
                spec(COLUMN_KIND, 0, SortDirection::Ascending),
                spec(COLUMN_SIZE, 1, SortDirection::Descending),
            ],
        );
        let rust: Vec<&str> = rows
            .iter()
            .filter(|r| r.kind == "rust")
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(rust, vec!["src/table/layout.rs", "src/lib.rs"]);
        assert_eq!(rows[0].kind, "font");
    }

    #[test]
    fn test_no_specs_keeps_order() {
        let mut rows = sample_rows();
        sort_rows(&mut rows, &[]);
        assert_eq!(rows, sample_rows());
    }

    #[test]
    fn test_size_label_units() {
        assert_eq!(FileRow::new("a", 96, "x").size_label(), "96 B");
        assert_eq!(FileRow::new("a", 3_210, "x").size_label(), "3.1 KiB");
        assert_eq!(FileRow::new("a", 2_400_000, "x").size_label(), "2.3 MiB");
    }
}
