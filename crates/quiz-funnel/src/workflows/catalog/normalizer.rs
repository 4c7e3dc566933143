/// Clean a tag cell: drop BOM/zero-width characters and collapse inner whitespace.
pub(crate) fn normalize_tag(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split a `|`-separated tag list, dropping blanks.
pub(crate) fn split_tags(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split('|')
        .map(normalize_tag)
        .filter(|tag| !tag.is_empty())
}
