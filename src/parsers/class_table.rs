use crate::error::{Result, ScraperError};
use crate::models::{Class, ScheduleTime};
use crate::parsers::schedule::parse_schedule;
use crate::parsers::text::{element_text, normalize_label};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;

pub const COL_SUBJECT_ID: &str = "código da disciplina";
pub const COL_SUBJECT_NAME: &str = "nome da disciplina";
pub const COL_CLASS_ID: &str = "turma";
pub const COL_INSTRUCTION_HOURS: &str = "horas aula";
pub const COL_OFFERED: &str = "vagas ofertadas";
pub const COL_AVAILABLE: &str = "saldo vagas";
pub const COL_ORDERS_WITHOUT_VACANCY: &str = "pedidos sem vaga";
pub const COL_SPECIAL_STUDENTS: &str = "alunos especiais";
pub const COL_TEACHERS: &str = "professor";
pub const COL_SCHEDULE: &str = "horários";

/// Marker the registry puts in the "saldo vagas" cell of a full class.
const FULL_CLASS: &str = "LOTADA";

/// Maps normalized header labels to cell positions.
#[derive(Debug, Clone, Default)]
pub struct ColumnIndex {
    positions: HashMap<String, usize>,
}

impl ColumnIndex {
    /// Builds the index from header labels in column order. When a label repeats,
    /// the first occurrence wins.
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut positions = HashMap::new();
        for (i, header) in headers.into_iter().enumerate() {
            positions.entry(normalize_label(header.as_ref())).or_insert(i);
        }
        Self { positions }
    }

    pub fn position(&self, column: &str) -> Result<usize> {
        self.positions
            .get(&normalize_label(column))
            .copied()
            .ok_or_else(|| ScraperError::MissingColumn(column.to_string()))
    }
}

/// One row of the class table: a class plus the subject fields repeated on every row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassRow {
    pub subject_id: String,
    pub subject_name: String,
    pub instruction_hours: u32,
    pub class: Class,
}

/// Converts the text of one data row into a `ClassRow`, locating each field by header.
pub fn parse_class_row(columns: &ColumnIndex, cells: &[String]) -> Result<ClassRow> {
    let cell = |column: &str| cell_text(columns, cells, column);

    let available = cell(COL_AVAILABLE)?;
    let available_vacancies = if available == FULL_CLASS {
        0
    } else {
        parse_count(COL_AVAILABLE, available)?
    };

    let orders = cell(COL_ORDERS_WITHOUT_VACANCY)?;
    let orders_without_vacancy = if orders.is_empty() {
        0
    } else {
        parse_count(COL_ORDERS_WITHOUT_VACANCY, orders)?
    };

    let schedule = lines(cell(COL_SCHEDULE)?)
        .map(parse_schedule)
        .collect::<Result<Vec<ScheduleTime>>>()?;

    Ok(ClassRow {
        subject_id: cell(COL_SUBJECT_ID)?.to_uppercase(),
        subject_name: cell(COL_SUBJECT_NAME)?.to_string(),
        instruction_hours: parse_count(COL_INSTRUCTION_HOURS, cell(COL_INSTRUCTION_HOURS)?)?,
        class: Class {
            class_id: cell(COL_CLASS_ID)?.to_string(),
            offered_vacancies: parse_count(COL_OFFERED, cell(COL_OFFERED)?)?,
            available_vacancies,
            orders_without_vacancy,
            special_students: parse_count(COL_SPECIAL_STUDENTS, cell(COL_SPECIAL_STUDENTS)?)?,
            teachers: lines(cell(COL_TEACHERS)?).map(str::to_string).collect(),
            schedule,
        },
    })
}

/// Extracts every data row of a class table, in document order.
pub fn extract_class_rows(table: ElementRef) -> Result<Vec<ClassRow>> {
    let header_selector = Selector::parse("th.rich-table-subheadercell").unwrap();
    let row_selector = Selector::parse("tr.rich-table-row").unwrap();

    let rows: Vec<ElementRef> = table.select(&row_selector).collect();
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let columns = ColumnIndex::new(table.select(&header_selector).map(|th| element_text(th, " ")));

    rows.into_iter()
        .map(|row| parse_class_row(&columns, &row_cells(row)))
        .collect()
}

/// Extracts the classes of a class table, in document order.
pub fn extract_class_list(table: ElementRef) -> Result<Vec<Class>> {
    Ok(extract_class_rows(table)?
        .into_iter()
        .map(|row| row.class)
        .collect())
}

/// Finds the class table in a search result page and extracts its rows.
/// A page without a class table has no rows.
pub fn parse_class_rows_from_html(html: &str) -> Result<Vec<ClassRow>> {
    let document = Html::parse_document(html);
    let table_selector = Selector::parse("table").unwrap();
    let header_selector = Selector::parse("th.rich-table-subheadercell").unwrap();

    let table = document
        .select(&table_selector)
        .find(|t| t.select(&header_selector).next().is_some())
        .or_else(|| document.select(&table_selector).next());

    match table {
        Some(table) => extract_class_rows(table),
        None => Ok(Vec::new()),
    }
}

/// The row's own `td` cells; tables nested inside a cell do not contribute cells.
fn row_cells(row: ElementRef) -> Vec<String> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|e| e.value().name() == "td")
        .map(|td| element_text(td, "\n"))
        .collect()
}

fn cell_text<'a>(columns: &ColumnIndex, cells: &'a [String], column: &str) -> Result<&'a str> {
    let i = columns.position(column)?;
    cells.get(i).map(|s| s.trim()).ok_or_else(|| {
        ScraperError::ParsingError(format!(
            "row has {} cells, column {:?} is at {}",
            cells.len(),
            column,
            i
        ))
    })
}

fn lines(cell: &str) -> impl Iterator<Item = &str> {
    cell.lines().map(str::trim).filter(|l| !l.is_empty())
}

fn parse_count(column: &str, value: &str) -> Result<u32> {
    value.parse::<u32>().map_err(|_| {
        ScraperError::ParsingError(format!("column {:?} is not a count: {:?}", column, value))
    })
}
