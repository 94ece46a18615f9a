use scraper::ElementRef;

/// Collects the text nodes under `element`, trims each one, drops the empty
/// ones and joins the rest with `separator`.
///
/// Cells that stack several values with `<br>` come out one value per line
/// when `separator` is `"\n"`.
pub fn element_text(element: ElementRef, separator: &str) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Collapses runs of whitespace and lower-cases, for comparing header labels.
pub fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Upper-cases the first letter of every word and lower-cases the rest.
/// A word is any run of alphabetic characters.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;

    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }

    out
}
