//! Sparse cell grid model.
//!
//! A [`CellGrid`] holds one sheet as a sparse map from [`CellAddress`] to
//! [`CellValue`]. Addresses order by `(row, column)`, so iterating the grid
//! visits every cell of a row before the next row starts. The scanners rely
//! on that order to reconstruct records from row blocks.

use std::collections::BTreeMap;
use std::fmt::{self, Write};
use std::str::FromStr;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::GridError;

/// Largest column number a spreadsheet can address (`XFD`).
pub const MAX_COLUMN: u32 = 16_384;

/// A cell position, 1-based in both axes.
///
/// Field order matters: the derived `Ord` sorts row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellAddress {
    pub row: u32,
    pub column: u32,
}

impl CellAddress {
    pub const fn new(column: u32, row: u32) -> Self {
        Self { row, column }
    }

    /// Parse an A1-style address such as `"B7"` or `"AA120"`.
    pub fn parse(s: &str) -> Result<Self, GridError> {
        let split = s
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(s.len());
        let (letters, digits) = s.split_at(split);

        if letters.is_empty() {
            return Err(GridError::MissingColumn(s.to_string()));
        }
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(GridError::InvalidRow(s.to_string()));
        }

        let column = column_number(letters)
            .ok_or_else(|| GridError::ColumnOutOfRange(s.to_string()))?;
        let row: u32 = digits
            .parse()
            .map_err(|_| GridError::InvalidRow(s.to_string()))?;
        if row == 0 {
            return Err(GridError::InvalidRow(s.to_string()));
        }

        Ok(Self { row, column })
    }

    /// The column letters of this address (`1` → `"A"`, `27` → `"AA"`).
    pub fn column_letters(&self) -> String {
        column_letters(self.column)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_letters(self.column), self.row)
    }
}

impl FromStr for CellAddress {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Decode column letters (case-insensitive) into a 1-based column number.
pub fn column_number(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }
    let mut n: u32 = 0;
    for b in letters.bytes() {
        if !b.is_ascii_alphabetic() {
            return None;
        }
        let digit = u32::from(b.to_ascii_uppercase() - b'A') + 1;
        n = n.checked_mul(26)?.checked_add(digit)?;
        if n > MAX_COLUMN {
            return None;
        }
    }
    Some(n)
}

/// Encode a 1-based column number as letters. Column 0 renders as an empty string.
pub fn column_letters(mut column: u32) -> String {
    let mut out = Vec::new();
    while column > 0 {
        let rem = (column - 1) % 26;
        out.push(b'A' + rem as u8);
        column = (column - 1) / 26;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// A typed scalar held by a cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    /// A spreadsheet date serial (days since 1899-12-30).
    DateTime(f64),
    Error(String),
}

impl CellValue {
    /// The "looks like a number" test used for boundary columns.
    ///
    /// Text counts when its trimmed form parses as a finite number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) | CellValue::DateTime(n) => Some(*n).filter(|n| n.is_finite()),
            CellValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return None;
                }
                trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
            }
            CellValue::Empty | CellValue::Bool(_) | CellValue::Error(_) => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.as_number().is_some()
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Render the value as report text, without type coercion.
    ///
    /// Date serials render as their serial number unless a chrono format
    /// string is given.
    pub fn render(&self, date_format: Option<&str>) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Text(s) => s.clone(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::DateTime(serial) => date_format
                .and_then(|fmt| format_serial(*serial, fmt))
                .unwrap_or_else(|| format_number(*serial)),
            CellValue::Error(e) => e.clone(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(None))
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(f64::from(n))
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

/// Format a number the way a spreadsheet shows a general-format value:
/// integral values without a fractional part.
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        // Avoid "-0".
        return "0".to_string();
    }
    format!("{n}")
}

/// Convert a spreadsheet date serial into a calendar date-time.
pub fn serial_to_datetime(serial: f64) -> Option<chrono::NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round();
    if millis.abs() > i64::MAX as f64 {
        return None;
    }
    epoch.checked_add_signed(Duration::milliseconds(millis as i64))
}

fn format_serial(serial: f64, fmt: &str) -> Option<String> {
    let dt = serial_to_datetime(serial)?;
    let mut out = String::new();
    // Invalid format items surface as fmt::Error.
    write!(out, "{}", dt.format(fmt)).ok()?;
    Some(out)
}

/// One sheet as a sparse grid of typed cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellGrid {
    cells: BTreeMap<CellAddress, CellValue>,
}

impl CellGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dense grid from rows starting at `A1`. `Empty` cells are left out.
    pub fn from_rows<R, V>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        let mut grid = Self::new();
        for (r, row) in rows.into_iter().enumerate() {
            for (c, value) in row.into_iter().enumerate() {
                grid.insert(CellAddress::new(c as u32 + 1, r as u32 + 1), value.into());
            }
        }
        grid
    }

    /// Store a value. Empty values are not stored, which keeps the grid sparse.
    pub fn insert(&mut self, address: CellAddress, value: CellValue) {
        if matches!(value, CellValue::Empty) {
            self.cells.remove(&address);
        } else {
            self.cells.insert(address, value);
        }
    }

    pub fn get(&self, address: CellAddress) -> Option<&CellValue> {
        self.cells.get(&address)
    }

    /// The row-1 header label of a column, if one is declared.
    pub fn header(&self, column: u32) -> Option<String> {
        self.get(CellAddress::new(column, 1))
            .filter(|v| !v.is_empty())
            .map(|v| v.render(None))
    }

    /// All cells in scan order: row by row, left to right within a row.
    pub fn cells(&self) -> impl Iterator<Item = (CellAddress, &CellValue)> {
        self.cells.iter().map(|(addr, value)| (*addr, value))
    }

    /// Cells of a single column, top to bottom.
    pub fn column(&self, column: u32) -> impl Iterator<Item = (CellAddress, &CellValue)> {
        self.cells().filter(move |(addr, _)| addr.column == column)
    }

    /// The highest column number holding a value.
    pub fn max_column(&self) -> u32 {
        self.cells.keys().map(|a| a.column).max().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl FromIterator<(CellAddress, CellValue)> for CellGrid {
    fn from_iter<T: IntoIterator<Item = (CellAddress, CellValue)>>(iter: T) -> Self {
        let mut grid = Self::new();
        for (address, value) in iter {
            grid.insert(address, value);
        }
        grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display_addresses() {
        let a = CellAddress::parse("B7").unwrap();
        assert_eq!(a, CellAddress::new(2, 7));
        assert_eq!(a.to_string(), "B7");

        let aa = CellAddress::parse("AA120").unwrap();
        assert_eq!(aa.column, 27);
        assert_eq!(aa.row, 120);
        assert_eq!(aa.column_letters(), "AA");

        assert_eq!(CellAddress::parse("xfd1").unwrap().column, MAX_COLUMN);
    }

    #[test]
    fn parse_rejects_malformed_addresses() {
        assert!(matches!(
            CellAddress::parse("12"),
            Err(GridError::MissingColumn(_))
        ));
        assert!(matches!(
            CellAddress::parse("A"),
            Err(GridError::InvalidRow(_))
        ));
        assert!(matches!(
            CellAddress::parse("A0"),
            Err(GridError::InvalidRow(_))
        ));
        assert!(matches!(
            CellAddress::parse("A1B"),
            Err(GridError::InvalidRow(_))
        ));
        assert!(matches!(
            CellAddress::parse("XFE1"),
            Err(GridError::ColumnOutOfRange(_))
        ));
    }

    #[test]
    fn column_letters_roundtrip_boundaries() {
        for (n, letters) in [(1, "A"), (26, "Z"), (27, "AA"), (52, "AZ"), (703, "AAA")] {
            assert_eq!(column_letters(n), letters);
            assert_eq!(column_number(letters), Some(n));
        }
    }

    #[test]
    fn addresses_order_row_major() {
        let mut addrs: Vec<CellAddress> = ["B1", "A2", "A1", "C1", "A10", "B2"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        addrs.sort();
        let rendered: Vec<String> = addrs.iter().map(|a| a.to_string()).collect();
        assert_eq!(rendered, vec!["A1", "B1", "C1", "A2", "B2", "A10"]);
    }

    #[test]
    fn numeric_test_follows_spreadsheet_leniency() {
        assert_eq!(CellValue::Number(3.0).as_number(), Some(3.0));
        assert_eq!(CellValue::from(" 42 ").as_number(), Some(42.0));
        assert_eq!(CellValue::from("2.5").as_number(), Some(2.5));
        assert_eq!(CellValue::from("").as_number(), None);
        assert_eq!(CellValue::from("   ").as_number(), None);
        assert_eq!(CellValue::from("abc").as_number(), None);
        assert_eq!(CellValue::from("NaN").as_number(), None);
        assert_eq!(CellValue::Bool(true).as_number(), None);
        assert_eq!(CellValue::Empty.as_number(), None);
    }

    #[test]
    fn typed_equality_distinguishes_text_from_number() {
        assert_ne!(CellValue::Number(2.0), CellValue::from("2"));
        assert_eq!(CellValue::Number(2.0), CellValue::from(2));
    }

    #[test]
    fn render_is_verbatim() {
        assert_eq!(CellValue::Number(7.0).render(None), "7");
        assert_eq!(CellValue::Number(2.5).render(None), "2.5");
        assert_eq!(CellValue::Number(-0.0).render(None), "0");
        assert_eq!(CellValue::from("010-1234").render(None), "010-1234");
        assert_eq!(CellValue::Empty.render(None), "");
    }

    #[test]
    fn date_serial_renders_with_format() {
        // 2021-03-04 12:00
        let v = CellValue::DateTime(44259.5);
        assert_eq!(v.render(None), "44259.5");
        assert_eq!(v.render(Some("%Y-%m-%d %H:%M")), "2021-03-04 12:00");
    }

    #[test]
    fn grid_iterates_in_scan_order() {
        let mut grid = CellGrid::new();
        grid.insert("B2".parse().unwrap(), CellValue::from("b2"));
        grid.insert("A2".parse().unwrap(), CellValue::from("a2"));
        grid.insert("B1".parse().unwrap(), CellValue::from("b1"));
        grid.insert("A1".parse().unwrap(), CellValue::from("a1"));
        grid.insert("C1".parse().unwrap(), CellValue::Empty);

        let seen: Vec<String> = grid.cells().map(|(_, v)| v.render(None)).collect();
        assert_eq!(seen, vec!["a1", "b1", "a2", "b2"]);
        assert_eq!(grid.len(), 4);
        assert_eq!(grid.header(2).as_deref(), Some("b1"));
        assert_eq!(grid.header(3), None);
    }

    #[test]
    fn from_rows_builds_dense_grid() {
        let grid = CellGrid::from_rows(vec![
            vec![CellValue::from("id"), CellValue::from("name")],
            vec![CellValue::from(1), CellValue::Empty],
        ]);
        assert_eq!(grid.len(), 3);
        assert_eq!(grid.max_column(), 2);
        assert_eq!(grid.column(1).count(), 2);
    }
}
