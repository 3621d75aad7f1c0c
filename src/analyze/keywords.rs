//! Keyword lists consulted by the scorer.
//!
//! Three lists, enumerated once at startup (from config or the built-in seed):
//! - `domain`: ESG / sector vocabulary (+0.08 each)
//! - `high_value`: core business entities (+0.15 each)
//! - `secondary`: competitors and peers (+0.12 each)
//!
//! Entries are stored lowercased and matched by substring on lowercased text,
//! so short entries like "total" also hit inside longer words.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KeywordLists {
    #[serde(default = "seed_domain")]
    pub domain: Vec<String>,
    #[serde(default = "seed_high_value")]
    pub high_value: Vec<String>,
    #[serde(default = "seed_secondary")]
    pub secondary: Vec<String>,
}

impl Default for KeywordLists {
    fn default() -> Self {
        Self {
            domain: seed_domain(),
            high_value: seed_high_value(),
            secondary: seed_secondary(),
        }
    }
}

impl KeywordLists {
    /// Lowercase, trim, drop blanks and duplicates (first occurrence wins).
    pub fn normalized(self) -> Self {
        Self {
            domain: clean_list(self.domain),
            high_value: clean_list(self.high_value),
            secondary: clean_list(self.secondary),
        }
    }
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim().to_lowercase();
        if !t.is_empty() && !out.contains(&t) {
            out.push(t);
        }
    }
    out
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn seed_domain() -> Vec<String> {
    owned(&[
        "sustainability",
        "esg",
        "carbon",
        "emissions",
        "climate",
        "environmental",
        "governance",
        "compliance",
        "regulation",
        "circular economy",
        "renewable",
        "petrochemical",
        "chemical industry",
        "polymer",
        "polyethylene",
        "cbam",
        "carbon border",
        "net zero",
        "decarbonization",
        "green transition",
    ])
}

fn seed_high_value() -> Vec<String> {
    owned(&[
        "borouge",
        "petrochemical",
        "polyethylene",
        "polypropylene",
        "polymer",
        "chemical industry",
    ])
}

fn seed_secondary() -> Vec<String> {
    owned(&[
        "sabic",
        "dow chemical",
        "exxonmobil",
        "basf",
        "shell",
        "total",
    ])
}
