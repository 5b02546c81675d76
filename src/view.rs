//! Text rendering of the item table.
//!
//! Sorting happens here, on borrowed rows, and never reorders the
//! controller's collection.
//!
//! Example output (sorted by price, ascending):
//! ```text
//! ID | Name   | Image | Category | Label | Price ↑ | Description
//! ---+--------+-------+----------+-------+---------+------------
//! 1  | Lamp   |       | Home     | new   |      10 |
//! 2  | Kettle |       | Kitchen  |       |      25 | Steel
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Item;
use crate::sync::TableState;

const LOADING: &str = "Loading...";
const SAVING: &str = "Saving...";
const ASCENDING: &str = " ↑";
const DESCENDING: &str = " ↓";
/// Longest cell before truncation.
const MAX_CELL_WIDTH: usize = 40;

/// A table column, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    Id,
    Name,
    Image,
    Category,
    Label,
    Price,
    Description,
}

impl Column {
    pub const ALL: [Column; 7] = [
        Column::Id,
        Column::Name,
        Column::Image,
        Column::Category,
        Column::Label,
        Column::Price,
        Column::Description,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            Self::Id => "ID",
            Self::Name => "Name",
            Self::Image => "Image",
            Self::Category => "Category",
            Self::Label => "Label",
            Self::Price => "Price",
            Self::Description => "Description",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Image => "image",
            Self::Category => "category",
            Self::Label => "label",
            Self::Price => "price",
            Self::Description => "description",
        }
    }

    fn text<'a>(&self, item: &'a Item) -> Option<&'a str> {
        match self {
            Self::Name => item.name.as_deref(),
            Self::Image => item.image.as_deref(),
            Self::Category => item.category.as_deref(),
            Self::Label => item.label.as_deref(),
            Self::Description => item.description.as_deref(),
            Self::Id | Self::Price => None,
        }
    }

    /// The cell text for `item`.
    pub fn cell(&self, item: &Item) -> String {
        match self {
            Self::Id => item.id.to_string(),
            Self::Price => item.price.to_string(),
            _ => self.text(item).unwrap_or_default().to_string(),
        }
    }

    fn compare(&self, a: &Item, b: &Item) -> Ordering {
        match self {
            Self::Id => a.id.sort_cmp(&b.id),
            Self::Price => a.price.sort_cmp(&b.price),
            // None sorts before Some
            _ => self.text(a).cmp(&self.text(b)),
        }
    }

    fn right_aligned(&self) -> bool {
        matches!(self, Self::Price)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown column {0:?} (expected one of: id, name, image, category, label, price, description)")]
pub struct UnknownColumn(pub String);

impl FromStr for Column {
    type Err = UnknownColumn;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| UnknownColumn(s.to_string()))
    }
}

/// Active sort of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortBy {
    pub column: Column,
    #[serde(default)]
    pub descending: bool,
}

impl SortBy {
    pub fn ascending(column: Column) -> Self {
        Self {
            column,
            descending: false,
        }
    }

    pub fn descending(column: Column) -> Self {
        Self {
            column,
            descending: true,
        }
    }

    fn indicator(&self) -> &'static str {
        if self.descending {
            DESCENDING
        } else {
            ASCENDING
        }
    }
}

impl Default for SortBy {
    fn default() -> Self {
        Self::ascending(Column::Price)
    }
}

/// Borrow `items` in sorted order. The sort is stable.
pub fn sort_rows<'a>(items: &'a [Item], sort: SortBy) -> Vec<&'a Item> {
    let mut rows: Vec<&Item> = items.iter().collect();
    if sort.descending {
        rows.sort_by(|a, b| sort.column.compare(b, a));
    } else {
        rows.sort_by(|a, b| sort.column.compare(a, b));
    }
    rows
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_CELL_WIDTH {
        return text.to_string();
    }
    let mut out: String = text.chars().take(MAX_CELL_WIDTH - 1).collect();
    out.push('…');
    out
}

fn pad(text: &str, width: usize, right: bool) -> String {
    let fill = width.saturating_sub(text.chars().count());
    if right {
        format!("{}{}", " ".repeat(fill), text)
    } else {
        format!("{}{}", text, " ".repeat(fill))
    }
}

/// Render `items` as a table sorted by `sort`.
pub fn render_table(items: &[Item], sort: SortBy) -> String {
    let headers: Vec<String> = Column::ALL
        .iter()
        .map(|c| {
            if *c == sort.column {
                format!("{}{}", c.header(), sort.indicator())
            } else {
                c.header().to_string()
            }
        })
        .collect();

    let rows: Vec<Vec<String>> = sort_rows(items, sort)
        .into_iter()
        .map(|item| Column::ALL.iter().map(|c| truncate(&c.cell(item))).collect())
        .collect();

    let widths: Vec<usize> = (0..Column::ALL.len())
        .map(|i| {
            rows.iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(headers[i].chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut output = String::new();
    push_line(&mut output, &headers, &widths, |_| false);

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    output.push_str(&rule.join("-+-"));
    output.push('\n');

    for row in &rows {
        push_line(&mut output, row, &widths, |i| Column::ALL[i].right_aligned());
    }
    output
}

fn push_line(output: &mut String, cells: &[String], widths: &[usize], right: impl Fn(usize) -> bool) {
    let padded: Vec<String> = cells
        .iter()
        .enumerate()
        .map(|(i, cell)| pad(cell, widths[i], right(i)))
        .collect();
    output.push_str(padded.join(" | ").trim_end());
    output.push('\n');
}

/// Render the whole view: a busy message while loading or saving, the table otherwise.
pub fn render_view(state: &TableState, sort: SortBy) -> String {
    if state.is_loading() {
        format!("{}\n", LOADING)
    } else if state.is_saving() {
        format!("{}\n", SAVING)
    } else {
        render_table(state.items(), sort)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<Item> {
        vec![
            Item::new(1, 30).with_name("Lamp").with_category("Home"),
            Item::new(2, 10).with_name("Kettle").with_category("Kitchen"),
            Item::new(3, 20).with_name("Chair"),
        ]
    }

    fn ids(rows: &[&Item]) -> Vec<String> {
        rows.iter().map(|i| i.id.to_string()).collect()
    }

    #[test]
    fn default_sort_is_price_ascending() {
        let items = items();
        let rows = sort_rows(&items, SortBy::default());
        assert_eq!(ids(&rows), ["2", "3", "1"]);
    }

    #[test]
    fn descending_sort_reverses_order() {
        let items = items();
        let rows = sort_rows(&items, SortBy::descending(Column::Price));
        assert_eq!(ids(&rows), ["1", "3", "2"]);
    }

    #[test]
    fn missing_text_sorts_first() {
        let items = items();
        let rows = sort_rows(&items, SortBy::ascending(Column::Category));
        assert_eq!(ids(&rows), ["3", "1", "2"]);
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        let items = vec![Item::new(1, 5), Item::new(2, 5), Item::new(3, 1)];
        let rows = sort_rows(&items, SortBy::default());
        assert_eq!(ids(&rows), ["3", "1", "2"]);
        let rows = sort_rows(&items, SortBy::descending(Column::Price));
        assert_eq!(ids(&rows), ["1", "2", "3"]);
    }

    #[test]
    fn sorting_leaves_collection_order_alone() {
        let items = items();
        let _ = sort_rows(&items, SortBy::default());
        assert_eq!(items[0].id.to_string(), "1");
    }

    #[test]
    fn column_parses_case_insensitively() {
        assert_eq!("Price".parse::<Column>().unwrap(), Column::Price);
        assert_eq!(" id ".parse::<Column>().unwrap(), Column::Id);
        assert!("cost".parse::<Column>().is_err());
    }

    #[test]
    fn table_marks_sorted_column() {
        let output = render_table(&items(), SortBy::default());
        let header = output.lines().next().unwrap();
        assert!(header.contains("Price ↑"));
        assert!(!header.contains("ID ↑"));

        let output = render_table(&items(), SortBy::descending(Column::Name));
        assert!(output.lines().next().unwrap().contains("Name ↓"));
    }

    #[test]
    fn table_lists_rows_in_sorted_order() {
        let output = render_table(&items(), SortBy::default());
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[1].starts_with("---"));
        assert!(lines[2].starts_with("2 "));
        assert!(lines[2].contains("Kettle"));
        assert!(lines[4].starts_with("1 "));
    }

    #[test]
    fn long_cells_are_truncated() {
        let long = "x".repeat(60);
        let items = vec![Item::new(1, 1).with_description(long)];
        let output = render_table(&items, SortBy::default());
        let row = output.lines().nth(2).unwrap();
        assert!(row.ends_with('…'));
        assert!(!row.contains(&"x".repeat(MAX_CELL_WIDTH)));
    }

    #[test]
    fn empty_collection_renders_headers_only() {
        let output = render_table(&[], SortBy::default());
        assert_eq!(output.lines().count(), 2);
    }

    #[test]
    fn view_shows_busy_states() {
        let state = TableState::default();
        assert_eq!(render_view(&state, SortBy::default()), "Loading...\n");

        let mut state = TableState::with_items(items());
        state.saving = true;
        assert_eq!(render_view(&state, SortBy::default()), "Saving...\n");

        state.saving = false;
        assert!(render_view(&state, SortBy::default()).contains("Kettle"));
    }
}
