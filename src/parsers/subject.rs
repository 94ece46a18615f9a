use crate::error::{Result, ScraperError};
use crate::models::{Subject, Syllabus};
use crate::parsers::class_table::ClassRow;
use crate::parsers::text::element_text;
use scraper::{Html, Selector};

/// Folds the rows of one subject's class table into a `Subject`.
///
/// Subject id, name and instruction hours are read from the first row and must
/// agree on every other row. Classes keep the row order.
pub fn aggregate_subject(rows: Vec<ClassRow>, syllabus: String) -> Result<Subject> {
    let first = rows.first().ok_or(ScraperError::EmptyClassList)?;
    let subject_id = first.subject_id.clone();
    let name = first.subject_name.clone();
    let instruction_hours = first.instruction_hours;

    for row in &rows[1..] {
        if row.subject_id != subject_id {
            return Err(inconsistent("subject id", &subject_id, &row.subject_id));
        }
        if row.subject_name != name {
            return Err(inconsistent("subject name", &name, &row.subject_name));
        }
        if row.instruction_hours != instruction_hours {
            return Err(inconsistent(
                "instruction hours",
                &instruction_hours.to_string(),
                &row.instruction_hours.to_string(),
            ));
        }
    }

    Ok(Subject {
        subject_id,
        name,
        syllabus,
        instruction_hours,
        classes: rows.into_iter().map(|row| row.class).collect(),
    })
}

fn inconsistent(field: &'static str, expected: &str, found: &str) -> ScraperError {
    ScraperError::InconsistentSubject {
        field,
        expected: expected.to_string(),
        found: found.to_string(),
    }
}

/// Parses the syllabus page ("ementa") of a subject.
///
/// The page title span reads `"<CODE> - <Name>"` and the first cell holds the syllabus text.
pub fn parse_syllabus_from_html(html: &str, subject_id: &str) -> Result<Syllabus> {
    let document = Html::parse_document(html);
    let span_selector = Selector::parse("span").unwrap();
    let td_selector = Selector::parse("td").unwrap();

    let title = document
        .select(&span_selector)
        .next()
        .map(|span| element_text(span, "\n"))
        .ok_or_else(|| ScraperError::ElementNotFound("syllabus title span".to_string()))?;

    let name = title
        .split_once(" - ")
        .map(|(_, name)| name.trim().to_string())
        .ok_or_else(|| {
            ScraperError::ParsingError(format!("syllabus title has no subject name: {:?}", title))
        })?;

    let text = document
        .select(&td_selector)
        .next()
        .map(|td| element_text(td, "\n"))
        .ok_or_else(|| ScraperError::ElementNotFound("syllabus text cell".to_string()))?;

    Ok(Syllabus {
        subject_id: subject_id.to_uppercase(),
        name,
        text,
    })
}
