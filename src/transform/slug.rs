/// URL-safe slug: transliterated to ASCII, lowercased, non-alphanumeric runs
/// collapsed to one hyphen, no leading or trailing hyphen.
pub fn slugify(text: &str) -> String {
    deunicode::deunicode(text)
        .to_ascii_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
