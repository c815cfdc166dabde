use devicemon_shared::{Reading, SortDirection, TableColumn, TableSort};
use std::fmt::Write;

const COLUMN_WIDTHS: [usize; 4] = [10, 9, 9, 13];

fn header(column: TableColumn, sort: TableSort) -> String {
    if column != sort.column {
        return column.header().to_string();
    }
    let arrow = match sort.direction {
        SortDirection::Ascending => '^',
        SortDirection::Descending => 'v',
    };
    format!("{} {arrow}", column.header())
}

fn cell(reading: &Reading, column: TableColumn) -> String {
    match column {
        TableColumn::Time => reading.time_label(),
        TableColumn::Voltage => reading.voltage.to_string(),
        TableColumn::Current => reading.current.to_string(),
        TableColumn::Temperature => reading.temperature.to_string(),
    }
}

/// Number of pages needed for `total` rows; an empty table still has one page.
pub fn page_count(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1)).max(1)
}

/// One page (zero-based, clamped to the last page) of the already sorted table view.
pub fn render_table(
    rows: &[&Reading],
    page: usize,
    page_size: usize,
    sort: TableSort,
) -> String {
    let mut out = String::new();

    for (column, width) in TableColumn::ALL.into_iter().zip(COLUMN_WIDTHS) {
        let _ = write!(out, "{:<width$} ", header(column, sort));
    }
    out.push('\n');
    let rule: usize = COLUMN_WIDTHS.iter().map(|w| w + 1).sum();
    out.push_str(&"-".repeat(rule));
    out.push('\n');

    let pages = page_count(rows.len(), page_size);
    let page = page.min(pages - 1);
    let start = (page * page_size).min(rows.len());
    let end = (start + page_size).min(rows.len());

    for reading in &rows[start..end] {
        for (column, width) in TableColumn::ALL.into_iter().zip(COLUMN_WIDTHS) {
            let _ = write!(out, "{:<width$} ", cell(reading, column));
        }
        out.push('\n');
    }

    if rows.is_empty() {
        out.push_str("rows 0 of 0 (page 1/1)\n");
    } else {
        let _ = writeln!(
            out,
            "rows {}-{end} of {} (page {}/{pages})",
            start + 1,
            rows.len(),
            page + 1
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use devicemon_shared::{DeviceId, SeriesStore};

    fn store_with(n: u32) -> SeriesStore {
        let mut store = SeriesStore::new();
        for v in 0..n {
            store.on_message(&format!("D1V{v}C{v}T{v}"));
        }
        store
    }

    fn voltage_column(table: &str) -> Vec<String> {
        table
            .lines()
            .skip(2)
            .take_while(|l| !l.starts_with("rows "))
            .map(|l| l.split_whitespace().nth(1).unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn newest_rows_come_first() {
        let store = store_with(3);
        let rows = store.table(&DeviceId::from_index(1));
        let table = render_table(&rows, 0, 100, TableSort::default());
        assert!(table.lines().next().unwrap().contains("Time v"));
        assert_eq!(voltage_column(&table), vec!["2", "1", "0"]);
        assert!(table.ends_with("rows 1-3 of 3 (page 1/1)\n"));
    }

    #[test]
    fn only_one_page_is_rendered() {
        let store = store_with(30);
        let rows = store.table(&DeviceId::from_index(1));
        let table = render_table(&rows, 0, 25, TableSort::default());
        assert_eq!(voltage_column(&table).len(), 25);
        assert!(table.contains("rows 1-25 of 30 (page 1/2)"));
    }

    #[test]
    fn later_pages_show_the_remaining_rows() {
        let store = store_with(250);
        let rows = store.table(&DeviceId::from_index(1));

        let second = render_table(&rows, 1, 100, TableSort::default());
        let voltages = voltage_column(&second);
        assert_eq!(voltages.len(), 100);
        assert_eq!(voltages.first().map(String::as_str), Some("149"));
        assert_eq!(voltages.last().map(String::as_str), Some("50"));
        assert!(second.contains("rows 101-200 of 250 (page 2/3)"));

        let third = render_table(&rows, 2, 100, TableSort::default());
        assert_eq!(voltage_column(&third).len(), 50);
        assert!(third.contains("rows 201-250 of 250 (page 3/3)"));
    }

    #[test]
    fn every_row_is_reachable_through_some_page() {
        let store = store_with(250);
        let rows = store.table(&DeviceId::from_index(1));
        let mut seen: Vec<String> = (0..page_count(rows.len(), 100))
            .map(|page| render_table(&rows, page, 100, TableSort::default()))
            .flat_map(|table| voltage_column(&table))
            .collect();
        seen.sort_by_key(|v| v.parse::<u32>().unwrap());
        let expected: Vec<String> = (0..250).map(|v| v.to_string()).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn page_past_the_end_is_clamped_to_the_last_page() {
        let store = store_with(30);
        let rows = store.table(&DeviceId::from_index(1));
        let table = render_table(&rows, 9, 25, TableSort::default());
        assert_eq!(voltage_column(&table).len(), 5);
        assert!(table.contains("rows 26-30 of 30 (page 2/2)"));
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(0, 25), 1);
        assert_eq!(page_count(25, 25), 1);
        assert_eq!(page_count(26, 25), 2);
        assert_eq!(page_count(250, 100), 3);
    }

    #[test]
    fn sort_indicator_follows_the_sorted_column() {
        let store = store_with(2);
        let sort = TableSort::new(TableColumn::Voltage, SortDirection::Ascending);
        let rows = store.table_sorted(&DeviceId::from_index(1), sort);
        let table = render_table(&rows, 0, 100, sort);
        let head = table.lines().next().unwrap();
        assert!(head.contains("Voltage ^"));
        assert!(!head.contains("Time v"));
        assert_eq!(voltage_column(&table), vec!["0", "1"]);
    }

    #[test]
    fn empty_table_renders_header_and_footer() {
        let table = render_table(&[], 0, 100, TableSort::default());
        assert!(table.contains("Temperature"));
        assert!(table.contains("rows 0 of 0 (page 1/1)"));
    }
}
