use deunicode::deunicode;

use crate::login;

/// Normalize a string for search indexing and querying.
/// Applies transliteration and lowercase (e.g., "Иван" -> "ivan", "José" -> "jose").
pub fn normalize(s: &str) -> String {
    transliterate(s).to_lowercase()
}

/// Transliterate to ASCII and collapse runs of whitespace.
fn transliterate(s: &str) -> String {
    let result = if s.is_ascii() {
        s.to_string()
    } else {
        deunicode(s)
    };
    result.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn normalize_query(query: &str) -> Option<String> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(normalize(trimmed))
    }
}

/// One unit of a parsed query. A candidate matches the word when any of its
/// search terms contains any of the word's variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchWord {
    pub variants: Vec<String>,
}

impl SearchWord {
    fn single(value: String) -> Self {
        Self {
            variants: vec![value],
        }
    }

    fn with_variant(mut self, variant: Option<String>) -> Self {
        if let Some(variant) = variant {
            if !variant.is_empty() && !self.variants.contains(&variant) {
                self.variants.push(variant);
            }
        }
        self
    }
}

/// A trimmed, folded search input and the words derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// Normalized input used for exact-match checks; a phone number in E.164.
    pub normalized: String,
    pub words: Vec<SearchWord>,
}

impl Query {
    /// Parse raw search input. Returns `None` for blank input.
    pub fn parse(input: &str, phone_region: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }

        if !trimmed.contains('@') {
            if let Some(phone) = login::canonicalize_phone(trimmed, phone_region) {
                let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
                let word = SearchWord::single(phone.clone()).with_variant(Some(digits));
                return Some(Self {
                    normalized: phone,
                    words: vec![word],
                });
            }
        }

        let normalized = normalize(trimmed);
        let words = normalized
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|word| !word.is_empty())
            .map(|word| {
                let dotless = if word.contains('@') {
                    login::email_without_local_dots(word)
                } else {
                    None
                };
                SearchWord::single(word.to_string()).with_variant(dotless)
            })
            .collect();

        Some(Self { normalized, words })
    }

    /// True when every word of the query hits at least one term.
    pub fn matches(&self, terms: &SearchTerms) -> bool {
        self.words.iter().all(|word| {
            word.variants
                .iter()
                .any(|variant| terms.0.iter().any(|term| term.contains(variant.as_str())))
        })
    }
}

/// Normalized strings a candidate can be found by.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchTerms(Vec<String>);

impl SearchTerms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a display string (name, room title).
    pub fn push_text(&mut self, text: &str) {
        let folded = normalize(text);
        self.push_normalized(folded);
    }

    /// Add a login. Emails are indexed with and without local-part dots;
    /// phones by their E.164 form and bare digits.
    pub fn push_login(&mut self, raw_login: &str, sms_domain: &str, phone_region: &str) {
        let bare = login::strip_sms_domain(raw_login.trim(), sms_domain);
        if bare.is_empty() {
            return;
        }
        let lowered = bare.to_lowercase();
        if lowered.contains('@') {
            let dotless = login::email_without_local_dots(&lowered);
            self.push_normalized(lowered);
            if let Some(dotless) = dotless {
                self.push_normalized(dotless);
            }
            return;
        }
        if let Some(phone) = login::canonicalize_phone(bare, phone_region) {
            let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
            self.push_normalized(phone);
            self.push_normalized(digits);
        }
        self.push_normalized(lowered);
    }

    fn push_normalized(&mut self, value: String) {
        if !value.is_empty() && !self.0.contains(&value) {
            self.0.push(value);
        }
    }

    /// Terms joined into one string, as carried on a `ListOption`.
    pub fn joined(&self) -> String {
        self.0.join(" ")
    }
}
