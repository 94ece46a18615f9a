use crate::error::{Result, ScraperError};
use crate::parsers::text::element_text;
use scraper::{Html, Selector};

/// An HTML form with the values a browser would submit for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    /// The `action` attribute, possibly relative to the page URL.
    pub action: String,
    pub fields: Vec<(String, String)>,
}

impl Form {
    /// Sets a field, replacing any values it already had.
    pub fn set(&mut self, name: &str, value: &str) -> &mut Self {
        match self.fields.iter().position(|(n, _)| n == name) {
            Some(first) => {
                self.fields[first].1 = value.to_string();
                let mut i = 0;
                self.fields.retain(|(n, _)| {
                    let keep = n != name || i == first;
                    i += 1;
                    keep
                });
            }
            None => self.fields.push((name.to_string(), value.to_string())),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Finds the form matching `selector` and collects its successful controls:
/// text-like inputs, checked checkboxes and radios, selects and textareas.
/// Buttons are left out; the caller adds the one it "clicks" if the server needs it.
pub fn parse_form(html: &str, selector: &str) -> Result<Form> {
    let document = Html::parse_document(html);
    let form_selector = Selector::parse(selector)
        .map_err(|e| ScraperError::ParsingError(format!("bad form selector {:?}: {}", selector, e)))?;
    let control_selector = Selector::parse("input[name], select[name], textarea[name]").unwrap();
    let option_selector = Selector::parse("option").unwrap();

    let form = document
        .select(&form_selector)
        .next()
        .ok_or_else(|| ScraperError::ElementNotFound(format!("form {}", selector)))?;

    let mut fields = Vec::new();
    for control in form.select(&control_selector) {
        let element = control.value();
        let Some(name) = element.attr("name") else {
            continue;
        };

        let value = match element.name() {
            "input" => {
                let kind = element.attr("type").unwrap_or("text").to_ascii_lowercase();
                match kind.as_str() {
                    "submit" | "button" | "image" | "reset" | "file" => continue,
                    "checkbox" | "radio" if element.attr("checked").is_none() => continue,
                    "checkbox" | "radio" => element.attr("value").unwrap_or("on").to_string(),
                    _ => element.attr("value").unwrap_or_default().to_string(),
                }
            }
            "select" => {
                let options: Vec<_> = control.select(&option_selector).collect();
                let chosen = options
                    .iter()
                    .find(|o| o.value().attr("selected").is_some())
                    .or_else(|| options.first());
                match chosen {
                    Some(option) => option
                        .value()
                        .attr("value")
                        .map(str::to_string)
                        .unwrap_or_else(|| element_text(*option, " ")),
                    None => continue,
                }
            }
            _ => control.text().collect::<String>(),
        };

        fields.push((name.to_string(), value));
    }

    Ok(Form {
        action: form.value().attr("action").unwrap_or_default().to_string(),
        fields,
    })
}
