//! Static country code to display name table.
//!
//! Used only as a fallback label when a record carries no name of its own.
//! Unknown codes fall back to the code itself.

use serde::{Deserialize, Serialize};

/// Display language for fallback labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Zh,
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "zh" => Ok(Locale::Zh),
            other => Err(format!("unsupported locale: {}", other)),
        }
    }
}

/// (code, English, Chinese)
const COUNTRY_NAMES: &[(&str, &str, &str)] = &[
    ("AU", "Australia", "澳大利亚"),
    ("BR", "Brazil", "巴西"),
    ("CA", "Canada", "加拿大"),
    ("CN", "China", "中国"),
    ("DE", "Germany", "德国"),
    ("ES", "Spain", "西班牙"),
    ("FR", "France", "法国"),
    ("GB", "United Kingdom", "英国"),
    ("IN", "India", "印度"),
    ("IT", "Italy", "意大利"),
    ("JP", "Japan", "日本"),
    ("KR", "South Korea", "韩国"),
    ("RU", "Russia", "俄罗斯"),
    ("US", "United States", "美国"),
];

/// Look up a display name, if the code is in the table.
pub fn lookup(code: &str, locale: Locale) -> Option<&'static str> {
    COUNTRY_NAMES
        .iter()
        .find(|(c, _, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, en, zh)| match locale {
            Locale::En => *en,
            Locale::Zh => *zh,
        })
}

/// Display name for a code, falling back to the code as given.
pub fn country_name(code: &str, locale: Locale) -> String {
    lookup(code, locale)
        .map(str::to_string)
        .unwrap_or_else(|| code.to_string())
}

/// Whether a normalized code has the ISO 3166-1 alpha-2 shape.
///
/// Only two upper-case ASCII letters pass. The map's `--` placeholder,
/// blanks, and anything that could act as a path segment do not.
pub fn is_valid_code(code: &str) -> bool {
    code.len() == 2 && code.bytes().all(|b| b.is_ascii_uppercase())
}

/// Every code in the table, in table order
pub fn known_codes() -> impl Iterator<Item = &'static str> {
    COUNTRY_NAMES.iter().map(|(code, _, _)| *code)
}
