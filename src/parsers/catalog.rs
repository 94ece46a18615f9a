use crate::error::{Result, ScraperError};
use crate::models::Semester;
use scraper::{Html, Selector};

/// The semesters offered by the class search's semester dropdown, in page order.
pub fn parse_semesters_from_html(html: &str) -> Result<Vec<Semester>> {
    let document = Html::parse_document(html);
    let select_selector = Selector::parse(r#"select[id="formBusca:selectSemestre"]"#).unwrap();
    let option_selector = Selector::parse("option[value]").unwrap();

    let select = document
        .select(&select_selector)
        .next()
        .ok_or_else(|| ScraperError::ElementNotFound("semester dropdown".to_string()))?;

    select
        .select(&option_selector)
        .filter_map(|option| option.value().attr("value"))
        .map(Semester::parse)
        .collect()
}

/// The generated id of the class search's "Buscar" button, which the server
/// expects to see echoed back in the search POST.
pub fn parse_search_button_id(html: &str) -> Result<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(r#"[value="Buscar"][id]"#).unwrap();

    document
        .select(&selector)
        .next()
        .and_then(|button| button.value().attr("id"))
        .map(str::to_string)
        .ok_or_else(|| ScraperError::ElementNotFound("search button".to_string()))
}
