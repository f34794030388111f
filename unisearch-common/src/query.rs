use std::borrow::Cow;

/// `search` value that selects the full paginated dump instead of a lookup.
pub const ALL_SENTINEL: &str = "All";

/// Display label shown while the full dump is listed.
pub const ALL_LABEL: &str = "All Universities";

/// Acquisition mode derived from the location's query string.
///
/// Every downstream decision (which fetch to issue, which label to show,
/// which export strategy to use) matches on this value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryMode {
    /// `?country=<name>`
    Country(String),
    /// `?search=All`
    All,
    /// `?search=<term>`
    Search(String),
    /// Neither parameter present
    Inactive,
}

impl QueryMode {
    /// Parse a raw query string such as `?country=Japan&search=All`.
    ///
    /// Precedence, first match wins:
    /// 1. `country` present
    /// 2. `search` equal to `All` (exact, case-sensitive)
    /// 3. `search` present
    ///
    /// Empty values count as absent.
    pub fn from_query(raw: &str) -> Self {
        let pairs = query_pairs(raw);
        let get = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
                .filter(|v| !v.is_empty())
        };

        if let Some(country) = get("country") {
            return QueryMode::Country(country.to_string());
        }

        match get("search") {
            Some(ALL_SENTINEL) => QueryMode::All,
            Some(term) => QueryMode::Search(term.to_string()),
            None => QueryMode::Inactive,
        }
    }

    /// Label shown next to "Result :"; `None` when no mode is active.
    pub fn label(&self) -> Option<&str> {
        match self {
            QueryMode::Country(country) => Some(country),
            QueryMode::All => Some(ALL_LABEL),
            QueryMode::Search(term) => Some(term),
            QueryMode::Inactive => None,
        }
    }

    /// The export control is hidden for country listings.
    pub fn export_visible(&self) -> bool {
        !matches!(self, QueryMode::Country(_))
    }

    pub fn is_all(&self) -> bool {
        matches!(self, QueryMode::All)
    }

    /// Query string that navigates to this mode.
    pub fn to_query(&self) -> String {
        match self {
            QueryMode::Country(country) => format!("?country={}", urlencoding::encode(country)),
            QueryMode::All => format!("?search={}", ALL_SENTINEL),
            QueryMode::Search(term) => format!("?search={}", urlencoding::encode(term)),
            QueryMode::Inactive => String::new(),
        }
    }
}

impl std::fmt::Display for QueryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryMode::Country(country) => write!(f, "country({})", country),
            QueryMode::All => write!(f, "all"),
            QueryMode::Search(term) => write!(f, "search({})", term),
            QueryMode::Inactive => write!(f, "inactive"),
        }
    }
}

/// Split `a=1&b=x+y` into decoded key/value pairs, keeping their order.
fn query_pairs(raw: &str) -> Vec<(String, String)> {
    raw.trim_start_matches('?')
        .split('&')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (key, value) = part.split_once('=').unwrap_or((part, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    let spaced: Cow<str> = if raw.contains('+') {
        Cow::Owned(raw.replace('+', " "))
    } else {
        Cow::Borrowed(raw)
    };
    let bytes = urlencoding::decode_binary(spaced.as_bytes());
    String::from_utf8_lossy(&bytes).into_owned()
}
