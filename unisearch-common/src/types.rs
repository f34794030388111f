use serde::{Deserialize, Deserializer, Serialize};

/// Prefix stripped from a record's remote path to obtain its detail-page id.
pub const WIKI_PREFIX: &str = "/wiki/";

/// One row of the directory: what every acquisition mode yields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct University {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub abbreviation: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub country: String,
    /// Remote-site path such as `/wiki/Keio_University`
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub path: Option<String>,
}

impl University {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_abbreviation(mut self, abbreviation: impl Into<String>) -> Self {
        self.abbreviation = abbreviation.into();
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.path = if path.is_empty() { None } else { Some(path) };
        self
    }

    /// Detail-page identifier: the path with a leading `/wiki/` removed.
    pub fn detail_id(&self) -> Option<&str> {
        self.path
            .as_deref()
            .map(|path| path.strip_prefix(WIKI_PREFIX).unwrap_or(path))
    }

    /// Route of the detail page. Records without a path fall back to their name.
    pub fn detail_link(&self) -> String {
        match self.detail_id() {
            Some(id) => format!("/detail/{}", id),
            None => format!("/detail/{}", self.name),
        }
    }

    /// Location query that lists every university of this record's country.
    pub fn country_link(&self) -> String {
        format!("?country={}", urlencoding::encode(&self.country))
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.is_empty()))
}

/// Body of `POST /search/suggest`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestRequest {
    pub q: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rebuild: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_units: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countries: Option<Vec<String>>,
}

impl SuggestRequest {
    /// Plain lookup used by the result table: only `q` is sent.
    pub fn query(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            ..Self::default()
        }
    }

    /// Tuned lookup used for type-ahead candidates.
    pub fn autocomplete(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            k: Some(4),
            rebuild: Some(false),
            limit_units: Some(0),
            countries: Some(Vec::new()),
        }
    }
}

/// A suggestion is usually a record, but bare names are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SuggestionEntry {
    Name(String),
    Record(University),
}

impl SuggestionEntry {
    pub fn name(&self) -> &str {
        match self {
            SuggestionEntry::Name(name) => name,
            SuggestionEntry::Record(record) => &record.name,
        }
    }

    pub fn into_university(self) -> University {
        match self {
            SuggestionEntry::Name(name) => University::new(name),
            SuggestionEntry::Record(record) => record,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestResponse {
    #[serde(default)]
    pub suggestions: Option<Vec<SuggestionEntry>>,
}

impl SuggestResponse {
    /// A missing `suggestions` field means no results.
    pub fn into_universities(self) -> Vec<University> {
        self.suggestions
            .unwrap_or_default()
            .into_iter()
            .map(SuggestionEntry::into_university)
            .collect()
    }
}

/// Body of `POST /crawl/universities`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryRequest {
    pub countries: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryResponse {
    #[serde(default)]
    pub universities: Option<Vec<University>>,
}

impl CountryResponse {
    pub fn into_universities(self) -> Vec<University> {
        self.universities.unwrap_or_default()
    }
}
