use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Ids at or above this value are millisecond timestamps assigned on publish.
pub const USER_POST_ID_FLOOR: u64 = 1_000_000_000_000;

/// Display language. English fields are always present; Chinese ones are optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Zh,
}

impl Language {
    pub fn toggle(self) -> Self {
        match self {
            Self::En => Self::Zh,
            Self::Zh => Self::En,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Zh => "zh",
        }
    }

    /// Pick the string for this language.
    pub fn pick<'a>(self, en: &'a str, zh: &'a str) -> &'a str {
        match self {
            Self::En => en,
            Self::Zh => zh,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "zh" => Ok(Self::Zh),
            other => Err(format!("unknown language '{other}' (expected en or zh)")),
        }
    }
}

/// A blog post as stored in `posts.json` and the saved-posts file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: u64,
    pub title: String,
    #[serde(default, alias = "titleLocalized", skip_serializing_if = "Option::is_none")]
    pub title_zh: Option<String>,
    pub content: String,
    #[serde(default, alias = "contentLocalized", skip_serializing_if = "Option::is_none")]
    pub content_zh: Option<String>,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default, alias = "excerptLocalized", skip_serializing_if = "Option::is_none")]
    pub excerpt_zh: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub date: NaiveDate,
}

// Empty localized text counts as missing.
fn localized<'a>(lang: Language, en: &'a str, zh: Option<&'a str>) -> &'a str {
    match (lang, zh) {
        (Language::Zh, Some(zh)) if !zh.is_empty() => zh,
        _ => en,
    }
}

impl Post {
    pub fn title_in(&self, lang: Language) -> &str {
        localized(lang, &self.title, self.title_zh.as_deref())
    }

    pub fn content_in(&self, lang: Language) -> &str {
        localized(lang, &self.content, self.content_zh.as_deref())
    }

    pub fn excerpt_in(&self, lang: Language) -> &str {
        localized(lang, &self.excerpt, self.excerpt_zh.as_deref())
    }

    pub fn is_user_created(&self) -> bool {
        self.id >= USER_POST_ID_FLOOR
    }
}

/// Form fields for a new post, before an id and date are assigned.
#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    pub title: String,
    pub title_zh: String,
    pub content: String,
    pub content_zh: String,
    pub excerpt: String,
    pub excerpt_zh: String,
    /// Comma-separated.
    pub tags: String,
}

impl PostDraft {
    /// Localized fields left empty fall back to their English counterparts.
    pub fn into_post(self, id: u64, date: NaiveDate) -> Post {
        let or_english = |zh: String, en: &str| {
            if zh.is_empty() { en.to_string() } else { zh }
        };

        Post {
            id,
            title_zh: Some(or_english(self.title_zh, &self.title)),
            content_zh: Some(or_english(self.content_zh, &self.content)),
            excerpt_zh: Some(or_english(self.excerpt_zh, &self.excerpt)),
            tags: split_tags(&self.tags),
            title: self.title,
            content: self.content,
            excerpt: self.excerpt,
            date,
        }
    }
}

fn split_tags(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
