use serde::Deserialize;

/// Archive listings accept `?page=N`. Page 1 is the first page; anything
/// unparseable or non-positive falls back to it.
#[derive(Deserialize, Debug, Default)]
pub struct PageParams {
    pub page: Option<String>,
}

impl PageParams {
    pub fn page(&self) -> u32 {
        self.page
            .as_ref()
            .and_then(|s| s.parse::<u32>().ok())
            .filter(|page| *page >= 1)
            .unwrap_or(1)
    }
}

const MONTH_TOKENS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Month path segments come in numeric ("7") or three-letter ("jul") form.
pub fn parse_month(token: &str) -> Option<u32> {
    if let Ok(n) = token.parse::<u32>() {
        return (1..=12).contains(&n).then_some(n);
    }
    MONTH_TOKENS
        .iter()
        .position(|name| token.eq_ignore_ascii_case(name))
        .map(|index| index as u32 + 1)
}
