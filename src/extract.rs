//! Role, level and salary-range extraction from job postings.
//!
//! A tagger labels spans of text (BIO-style labels such as `B-ROLE`); the
//! reduction step turns those spans into one record per posting. Nothing
//! here feeds the projection.

use std::sync::OnceLock;

use itertools::Itertools;
use regex::Regex;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedSpan {
    pub entity: String,
    pub word: String,
}

impl TaggedSpan {
    pub fn new(entity: &str, word: &str) -> Self {
        TaggedSpan {
            entity: entity.to_string(),
            word: word.to_string(),
        }
    }
}

/// Anything that can label spans of a posting, e.g. a model-backed NER.
pub trait EntityTagger {
    fn tag(&self, text: &str) -> Vec<TaggedSpan>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extraction {
    #[serde(rename = "Role")]
    pub role: String,
    #[serde(rename = "Level")]
    pub level: String,
    #[serde(rename = "SalaryRange")]
    pub salary_range: Option<String>,
}

/// ROLE spans are space-joined, LEVEL spans likewise; any other span whose
/// word contains `$` is appended to the salary range without a separator.
pub fn reduce_spans(spans: &[TaggedSpan]) -> Extraction {
    let mut role = Vec::new();
    let mut level = Vec::new();
    let mut salary_range: Option<String> = None;

    for span in spans {
        if span.entity.contains("ROLE") {
            role.push(span.word.as_str());
        } else if span.entity.contains("LEVEL") {
            level.push(span.word.as_str());
        } else if span.word.contains('$') {
            salary_range
                .get_or_insert_with(String::new)
                .push_str(&span.word);
        }
    }

    Extraction {
        role: role.iter().join(" "),
        level: level.iter().join(" "),
        salary_range,
    }
}

pub fn extract(tagger: &dyn EntityTagger, text: &str) -> Extraction {
    reduce_spans(&tagger.tag(text))
}

pub const DEFAULT_ROLES: &[&str] = &[
    "Data Analyst",
    "Data Scientist",
    "Data Engineer",
    "Machine Learning Engineer",
    "Software Engineer",
    "Product Manager",
];

/// Dictionary and pattern based tagger; works without a model.
#[derive(Debug, Clone)]
pub struct KeywordTagger {
    roles: Regex,
}

impl KeywordTagger {
    pub fn new(roles: &[&str]) -> Result<Self, regex::Error> {
        let alternation = roles
            .iter()
            .sorted_by_key(|r| std::cmp::Reverse(r.len()))
            .map(|r| regex::escape(r))
            .join("|");
        let roles = Regex::new(&format!(r"(?i)\b(?:{})\b", alternation))?;
        Ok(KeywordTagger { roles })
    }
}

impl Default for KeywordTagger {
    fn default() -> Self {
        KeywordTagger::new(DEFAULT_ROLES).expect("escaped role titles always compile")
    }
}

fn level_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(?:entry[- ]level|junior|mid[- ]level|senior|staff|principal|lead)\b")
            .unwrap()
    })
}

fn money_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\$\d[\d,]*(?:\.\d+)?[kK]?(?:\s*[-–—]\s*\$\d[\d,]*(?:\.\d+)?[kK]?)?").unwrap()
    })
}

impl EntityTagger for KeywordTagger {
    fn tag(&self, text: &str) -> Vec<TaggedSpan> {
        let mut spans: Vec<(usize, TaggedSpan)> = Vec::new();

        for m in self.roles.find_iter(text) {
            let mut offset = m.start();
            for (i, word) in m.as_str().split_whitespace().enumerate() {
                let label = if i == 0 { "B-ROLE" } else { "I-ROLE" };
                spans.push((offset, TaggedSpan::new(label, word)));
                offset += word.len() + 1;
            }
        }
        for m in level_re().find_iter(text) {
            spans.push((m.start(), TaggedSpan::new("B-LEVEL", m.as_str())));
        }
        for m in money_re().find_iter(text) {
            spans.push((m.start(), TaggedSpan::new("B-MONEY", m.as_str())));
        }

        spans.sort_by_key(|(start, _)| *start);
        spans.into_iter().map(|(_, span)| span).collect()
    }
}
