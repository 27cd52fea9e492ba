//! Workbook reading.

use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Range, Reader};

use quizmark_core::config::SheetNames;
use quizmark_core::grid::{CellAddress, CellGrid, CellValue};
use quizmark_core::pipeline::ExamSheets;

use crate::error::WorkbookError;

/// Every sheet of a workbook, decoded into cell grids.
#[derive(Debug, Clone)]
pub struct WorkbookSheets {
    path: PathBuf,
    sheets: Vec<(String, CellGrid)>,
}

impl WorkbookSheets {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sheet names in workbook order.
    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|(name, _)| name.as_str())
    }

    /// Look a sheet up by name. An exact match wins; otherwise the first sheet
    /// whose trimmed name matches case-insensitively.
    pub fn sheet(&self, name: &str) -> Result<&CellGrid, WorkbookError> {
        let idx = self.index_of(name)?;
        Ok(&self.sheets[idx].1)
    }


    fn index_of(&self, name: &str) -> Result<usize, WorkbookError> {
        if let Some(idx) = self.sheets.iter().position(|(n, _)| n == name) {
            return Ok(idx);
        }
        if let Some(idx) = self
            .sheets
            .iter()
            .position(|(n, _)| n.trim().eq_ignore_ascii_case(name.trim()))
        {
            tracing::debug!(
                requested = name,
                actual = self.sheets[idx].0.as_str(),
                "matched sheet name loosely"
            );
            return Ok(idx);
        }
        Err(WorkbookError::MissingSheet {
            name: name.to_string(),
            available: self.sheet_names().collect::<Vec<_>>().join(", "),
        })
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

/// Open a workbook and decode all of its sheets.
pub fn open_workbook(path: impl AsRef<Path>) -> Result<WorkbookSheets, WorkbookError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(WorkbookError::NotFound(path.to_path_buf()));
    }

    let mut workbook = open_workbook_auto(path).map_err(|source| WorkbookError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let names = workbook.sheet_names().to_owned();
    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|source| WorkbookError::Sheet {
                name: name.clone(),
                source,
            })?;
        let grid = range_to_grid(&range);
        tracing::debug!(sheet = name.as_str(), cells = grid.len(), "decoded sheet");
        sheets.push((name, grid));
    }

    Ok(WorkbookSheets {
        path: path.to_path_buf(),
        sheets,
    })
}

/// Convert a calamine range into a sparse grid with absolute addresses.
pub fn range_to_grid(range: &Range<Data>) -> CellGrid {
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    range
        .used_cells()
        .filter_map(|(row, col, data)| {
            let value = convert_value(data)?;
            let address = CellAddress::new(start_col + col as u32 + 1, start_row + row as u32 + 1);
            Some((address, value))
        })
        .collect()
}

/// Map a calamine cell to a [`CellValue`]. Empty cells map to `None`.
pub fn convert_value(data: &Data) -> Option<CellValue> {
    match data {
        Data::Empty => None,
        Data::Int(v) => Some(CellValue::Number(*v as f64)),
        Data::Float(v) => Some(CellValue::Number(*v)),
        Data::String(s) => Some(CellValue::Text(s.clone())),
        Data::Bool(b) => Some(CellValue::Bool(*b)),
        Data::DateTime(dt) => Some(CellValue::DateTime(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(CellValue::Text(s.clone())),
        Data::Error(e) => Some(CellValue::Error(e.to_string())),
    }
}

/// The three sheets a scoring run needs, owned.
#[derive(Debug, Clone)]
pub struct ExamWorkbook {
    pub responses: CellGrid,
    pub participants: CellGrid,
    pub answer_key: CellGrid,
}

impl ExamWorkbook {
    pub fn sheets(&self) -> ExamSheets<'_> {
        ExamSheets {
            responses: &self.responses,
            participants: &self.participants,
            answer_key: &self.answer_key,
        }
    }
}

/// Open a workbook and pull out the response, participant and answer-key sheets.
pub fn load_exam_workbook(
    path: impl AsRef<Path>,
    names: &SheetNames,
) -> Result<ExamWorkbook, WorkbookError> {
    let workbook = open_workbook(path)?;
    tracing::info!(
        path = %workbook.path().display(),
        sheets = workbook.len(),
        "opened workbook"
    );

    Ok(ExamWorkbook {
        responses: workbook.sheet(&names.responses)?.clone(),
        participants: workbook.sheet(&names.participants)?.clone(),
        answer_key: workbook.sheet(&names.answer_key)?.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{Cell, CellErrorType};

    #[test]
    fn converts_calamine_values() {
        assert_eq!(convert_value(&Data::Empty), None);
        assert_eq!(convert_value(&Data::Int(3)), Some(CellValue::Number(3.0)));
        assert_eq!(convert_value(&Data::Float(2.5)), Some(CellValue::Number(2.5)));
        assert_eq!(
            convert_value(&Data::String("Kim".into())),
            Some(CellValue::from("Kim"))
        );
        assert_eq!(convert_value(&Data::Bool(true)), Some(CellValue::Bool(true)));
        assert_eq!(
            convert_value(&Data::DateTimeIso("2021-03-04T09:00:00".into())),
            Some(CellValue::from("2021-03-04T09:00:00"))
        );
        assert!(matches!(
            convert_value(&Data::Error(CellErrorType::NA)),
            Some(CellValue::Error(_))
        ));
    }

    #[test]
    fn sparse_range_keeps_absolute_addresses() {
        let range = Range::from_sparse(vec![
            Cell::new((1, 1), Data::Int(7)),
            Cell::new((1, 2), Data::String("x".into())),
            Cell::new((3, 1), Data::Float(1.5)),
        ]);
        let grid = range_to_grid(&range);
        assert_eq!(grid.len(), 3);
        assert_eq!(
            grid.get("B2".parse().unwrap()),
            Some(&CellValue::Number(7.0))
        );
        assert_eq!(grid.get("C2".parse().unwrap()), Some(&CellValue::from("x")));
        assert_eq!(
            grid.get("B4".parse().unwrap()),
            Some(&CellValue::Number(1.5))
        );
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = open_workbook("/no/such/input.xlsx").unwrap_err();
        assert!(matches!(err, WorkbookError::NotFound(_)));
    }
}
