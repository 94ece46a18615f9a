use crate::error::{Result, ScraperError};
use crate::models::{Student, StudentClass};
use crate::parsers::text::{element_text, title_case};
use scraper::{Html, Selector};

/// Course names carrying this marker are teaching-assistant rooms, not enrollments.
const MONITOR_MARKER: &str = "[MONITOR]";
/// Placeholder the profile uses for rows without a real course.
const PLACEHOLDER: &str = "-";

/// Parses a student's forum profile page.
///
/// The enrolled classes are laid out as four parallel columns (course name,
/// subject id, class id, semester). All four must have the same length.
pub fn parse_student_profile(html: &str, student_id: &str) -> Result<Student> {
    let document = Html::parse_document(html);

    let columns = (1..=4)
        .map(|i| {
            let selector = Selector::parse(&format!("td.coluna{}_listar_salas", i)).unwrap();
            document
                .select(&selector)
                .map(|td| element_text(td, ""))
                .collect::<Vec<String>>()
        })
        .collect::<Vec<_>>();

    let len = columns[0].len();
    if let Some((i, column)) = columns.iter().enumerate().find(|(_, c)| c.len() != len) {
        return Err(ScraperError::MalformedProfile(format!(
            "enrollment column {} has {} cells, column 1 has {}",
            i + 1,
            column.len(),
            len
        )));
    }

    let classes = (0..len)
        .map(|row| StudentClass {
            name: columns[0][row].clone(),
            subject_id: columns[1][row].clone(),
            class_id: columns[2][row].clone(),
            semester: Some(columns[3][row].clone()).filter(|s| !s.is_empty()),
        })
        .filter(is_enrollment)
        .collect();

    let name_selector = Selector::parse("strong").unwrap();
    let name = document
        .select(&name_selector)
        .next()
        .map(|strong| element_text(strong, " "))
        .ok_or_else(|| ScraperError::ElementNotFound("student name".to_string()))?;

    let program_selector = Selector::parse("span.texto_negrito_pequeno2").unwrap();
    let program_label = document
        .select(&program_selector)
        .next()
        .map(|span| element_text(span, ""))
        .ok_or_else(|| ScraperError::ElementNotFound("student program label".to_string()))?;

    Ok(Student {
        student_id: student_id.to_string(),
        name,
        program: program_name(&program_label),
        classes,
    })
}

/// Whether a profile row is a real enrollment rather than an administrative placeholder.
pub fn is_enrollment(class: &StudentClass) -> bool {
    !class.name.contains(MONITOR_MARKER)
        && class.name != PLACEHOLDER
        && class.subject_id != PLACEHOLDER
}

/// `"Curso: CIÊNCIAS DA COMPUTAÇÃO"` becomes `"Ciências Da Computação"`.
fn program_name(label: &str) -> String {
    let name = label.rsplit(':').next().unwrap_or(label);
    title_case(name.trim())
}

/// Reads the logged-in student's program code from their academic history page:
/// the first three characters of the fifth info cell.
pub fn parse_program_id_from_html(html: &str) -> Result<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("td.aluno_info_col2").unwrap();

    let cell = document
        .select(&selector)
        .nth(4)
        .map(|td| element_text(td, ""))
        .ok_or_else(|| ScraperError::ElementNotFound("program cell in student history".to_string()))?;

    let program_id: String = cell.chars().take(3).collect();
    if program_id.is_empty() {
        return Err(ScraperError::ParsingError(
            "program cell in student history is empty".to_string(),
        ));
    }

    Ok(program_id)
}
