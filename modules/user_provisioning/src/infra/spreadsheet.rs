//! Workbook decoding for bulk uploads.
//!
//! Only the first worksheet is read. Its first non-blank row is the header;
//! columns are recognized by alias, case and accents ignored.

use std::collections::HashMap;
use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Reader};
use thiserror::Error;

use crate::domain::bulk::BulkRow;
use crate::domain::form::{AccountForm, NameForm};
use crate::domain::naming::normalize;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SheetError {
    #[error("Unreadable workbook: {0}")]
    Unreadable(String),

    #[error("Workbook has no worksheets")]
    NoWorksheet,

    #[error("Worksheet has no header row")]
    MissingHeader,

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<&'static str>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Column {
    GivenName,
    SecondGivenName,
    Surname1,
    Surname2,
    JobTitle,
    Department,
}

impl Column {
    const ALL: [Column; 6] = [
        Column::GivenName,
        Column::SecondGivenName,
        Column::Surname1,
        Column::Surname2,
        Column::JobTitle,
        Column::Department,
    ];

    /// Canonical header name, as reported when the column is missing.
    fn name(self) -> &'static str {
        match self {
            Column::GivenName => "givenName",
            Column::SecondGivenName => "secondGivenName",
            Column::Surname1 => "surname1",
            Column::Surname2 => "surname2",
            Column::JobTitle => "jobTitle",
            Column::Department => "department",
        }
    }

    // Already in normalized form.
    fn aliases(self) -> &'static [&'static str] {
        match self {
            Column::GivenName => &["givenname", "primernombre", "nombre"],
            Column::SecondGivenName => &["secondgivenname", "segundonombre"],
            Column::Surname1 => &["surname1", "apellido1", "primerapellido"],
            Column::Surname2 => &["surname2", "apellido2", "segundoapellido"],
            Column::JobTitle => &["jobtitle", "puesto", "cargo"],
            Column::Department => &["department", "departamento", "area"],
        }
    }

    fn required(self) -> bool {
        !matches!(self, Column::SecondGivenName | Column::Surname2)
    }

    fn from_header(header: &str) -> Option<Column> {
        let key = normalize(header);
        Column::ALL
            .into_iter()
            .find(|column| column.aliases().contains(&key.as_str()))
    }
}

/// Decode the first worksheet of an `.xlsx`/`.xls`/`.ods` workbook.
pub fn decode_workbook(bytes: Vec<u8>) -> Result<Vec<BulkRow>, SheetError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| SheetError::Unreadable(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(SheetError::NoWorksheet)?
        .map_err(|e| SheetError::Unreadable(e.to_string()))?;

    // The range starts at the first used cell, not necessarily at A1.
    let first_row = range.start().map(|(row, _)| row).unwrap_or(0);
    let cells = range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect();

    rows_from_cells(first_row, cells)
}

/// Map raw cell text to bulk rows.
///
/// `first_row` is the zero-based sheet index of `cells[0]`; reported row
/// numbers are one-based, as a spreadsheet shows them.
pub fn rows_from_cells(first_row: u32, cells: Vec<Vec<String>>) -> Result<Vec<BulkRow>, SheetError> {
    let mut rows = cells
        .into_iter()
        .enumerate()
        .map(|(idx, row)| (first_row + idx as u32 + 1, row))
        .filter(|(_, row)| !is_blank(row));

    let (_, header) = rows.next().ok_or(SheetError::MissingHeader)?;
    let columns = map_columns(&header)?;

    Ok(rows
        .map(|(number, row)| {
            let cell = |column: Column| {
                columns
                    .get(&column)
                    .and_then(|idx| row.get(*idx))
                    .map(|value| value.trim().to_string())
                    .unwrap_or_default()
            };
            let optional = |column: Column| Some(cell(column)).filter(|v| !v.is_empty());

            BulkRow {
                row: number,
                form: AccountForm {
                    name: NameForm {
                        given_name: cell(Column::GivenName),
                        second_given_name: optional(Column::SecondGivenName),
                        surname1: cell(Column::Surname1),
                        surname2: optional(Column::Surname2),
                    },
                    job_title: cell(Column::JobTitle),
                    department: cell(Column::Department),
                },
            }
        })
        .collect())
}

fn map_columns(header: &[String]) -> Result<HashMap<Column, usize>, SheetError> {
    let mut columns = HashMap::new();
    for (idx, title) in header.iter().enumerate() {
        if let Some(column) = Column::from_header(title) {
            columns.entry(column).or_insert(idx);
        }
    }

    let missing: Vec<&'static str> = Column::ALL
        .into_iter()
        .filter(|c| c.required() && !columns.contains_key(c))
        .map(Column::name)
        .collect();
    if !missing.is_empty() {
        return Err(SheetError::MissingColumns(missing));
    }
    Ok(columns)
}

fn is_blank(row: &[String]) -> bool {
    row.iter().all(|cell| cell.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn canonical_headers_map_rows() {
        let rows = rows_from_cells(
            0,
            vec![
                row(&["givenName", "surname1", "surname2", "jobTitle", "department"]),
                row(&["María", "González", "López", "Operador", "Mina"]),
            ],
        )
        .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].row, 2);
        assert_eq!(rows[0].form.name.given_name, "María");
        assert_eq!(rows[0].form.name.second_given_name, None);
        assert_eq!(rows[0].form.name.surname2.as_deref(), Some("López"));
        assert_eq!(rows[0].form.job_title, "Operador");
    }

    #[test]
    fn spanish_aliases_ignore_case_and_accents() {
        let rows = rows_from_cells(
            0,
            vec![
                row(&["Nombre", "Segundo Nombre", "Primer Apellido", "PUESTO", "Área"]),
                row(&["Ana", "Lucía", "Soto", "Chofer", "Logística"]),
            ],
        )
        .unwrap();

        let form = &rows[0].form;
        assert_eq!(form.name.given_name, "Ana");
        assert_eq!(form.name.second_given_name.as_deref(), Some("Lucía"));
        assert_eq!(form.name.surname1, "Soto");
        assert_eq!(form.department, "Logística");
    }

    #[test]
    fn blank_rows_are_skipped_and_numbers_follow_the_sheet() {
        let rows = rows_from_cells(
            2,
            vec![
                row(&["", ""]),
                row(&["givenName", "surname1", "jobTitle", "department"]),
                row(&["Ana", "Soto", "Chofer", "Mina"]),
                row(&["  ", "", "", ""]),
                row(&["Eva", "Ruiz", "Chofer", "Mina"]),
            ],
        )
        .unwrap();

        assert_eq!(rows.iter().map(|r| r.row).collect::<Vec<_>>(), vec![5, 7]);
    }

    #[test]
    fn short_rows_yield_empty_fields() {
        let rows = rows_from_cells(
            0,
            vec![
                row(&["givenName", "surname1", "jobTitle", "department"]),
                row(&["Ana", "Soto"]),
            ],
        )
        .unwrap();

        assert_eq!(rows[0].form.job_title, "");
        assert_eq!(rows[0].form.department, "");
    }

    #[test]
    fn missing_required_columns_reject_the_sheet() {
        let err = rows_from_cells(0, vec![row(&["givenName", "surname2", "jobTitle"])]).unwrap_err();
        assert_eq!(err, SheetError::MissingColumns(vec!["surname1", "department"]));
        assert_eq!(err.to_string(), "Missing required columns: surname1, department");
    }

    #[test]
    fn empty_sheet_has_no_header() {
        assert_eq!(
            rows_from_cells(0, vec![row(&["", " "])]).unwrap_err(),
            SheetError::MissingHeader
        );
    }

    #[test]
    fn workbook_rows_keep_sheet_numbering() {
        // Header on row 2, blank row 4: the used range starts below A1.
        let bytes = include_bytes!("../../tests/fixtures/operators.xlsx").to_vec();
        let rows = decode_workbook(bytes).unwrap();

        assert_eq!(rows.iter().map(|r| r.row).collect::<Vec<_>>(), vec![3, 5]);
        let first = &rows[0].form;
        assert_eq!(first.name.given_name, "María");
        assert_eq!(first.name.surname1, "González");
        assert_eq!(first.name.surname2.as_deref(), Some("López"));
        assert_eq!(first.job_title, "Operador de camión");
        assert_eq!(rows[1].form.name.given_name, "Bo");
        assert_eq!(rows[1].form.name.surname2, None);
        assert_eq!(rows[1].form.department, "Logística");
    }

    #[test]
    fn garbage_bytes_are_unreadable() {
        assert!(matches!(
            decode_workbook(b"name,surname\nAna,Soto\n".to_vec()),
            Err(SheetError::Unreadable(_))
        ));
    }
}
