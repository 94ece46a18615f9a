use crate::error::{Result, ScraperError};
use crate::models::ForumMember;
use crate::parsers::text::element_text;
use scraper::{ElementRef, Html, Selector};

/// The member list of a forum room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberList {
    /// The room's title, which for program rooms is the program name.
    pub room_name: String,
    pub members: Vec<ForumMember>,
}

/// Forum room id of a program's room.
pub fn forum_program_id(program_id: &str) -> String {
    format!("100000{}", program_id)
}

/// Entry semester encoded in a registration number: `"16100719"` → `"16.1"`.
pub fn entry_semester(user_id: &str) -> Option<String> {
    match user_id.trim().as_bytes() {
        [y1, y2, term, ..] if [y1, y2, term].iter().all(|b| b.is_ascii_digit()) => Some(format!(
            "{}{}.{}",
            *y1 as char, *y2 as char, *term as char
        )),
        _ => None,
    }
}

/// Parses a room's `listarMembros.jsf` page. Member rows alternate between two
/// row classes and are returned in document order.
pub fn parse_member_list(html: &str) -> Result<MemberList> {
    let document = Html::parse_document(html);
    let title_selector = Selector::parse("span.texto_pequeno3").unwrap();
    let row_selector = Selector::parse("tr.cor1_celula_forum, tr.cor2_celula_forum").unwrap();

    let room_name = document
        .select(&title_selector)
        .nth(3)
        .map(|span| element_text(span, " "))
        .ok_or_else(|| ScraperError::ElementNotFound("forum room title".to_string()))?;

    let members = document
        .select(&row_selector)
        .map(parse_member_row)
        .collect::<Result<Vec<_>>>()?;

    Ok(MemberList { room_name, members })
}

fn parse_member_row(row: ElementRef) -> Result<ForumMember> {
    let column = |i: usize| -> Result<String> {
        let selector = Selector::parse(&format!("td.coluna{}_listar_membros", i)).unwrap();
        row.select(&selector)
            .next()
            .map(|td| element_text(td, " "))
            .ok_or_else(|| ScraperError::ElementNotFound(format!("member list column {}", i)))
    };

    Ok(ForumMember {
        user_id: column(2)?,
        kind: column(3)?,
        name: column(4)?,
    })
}

/// Finds the room id linked from the first result of a room search.
pub fn parse_room_id_from_search(html: &str) -> Result<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("td.coluna1_listar_salas a[href]").unwrap();

    let href = document
        .select(&selector)
        .next()
        .and_then(|a| a.value().attr("href"))
        .ok_or_else(|| ScraperError::ElementNotFound("room search result link".to_string()))?;

    href.split_once("salaId=")
        .map(|(_, id)| id.split('&').next().unwrap_or(id).to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ScraperError::ParsingError(format!("room link has no salaId: {:?}", href)))
}

/// Whether a profile page marks the student's enrollment as suspended ("trancado").
pub fn parse_is_suspended(html: &str) -> Result<bool> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("span.texto_pequeno1").unwrap();

    let status = document
        .select(&selector)
        .nth(1)
        .ok_or_else(|| ScraperError::ElementNotFound("enrollment status".to_string()))?;

    Ok(status.html().contains("trancado"))
}
