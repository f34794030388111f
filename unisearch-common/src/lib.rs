pub mod query;
pub mod types;

pub use query::QueryMode;
pub use types::{
    CountryRequest, CountryResponse, SuggestRequest, SuggestResponse, SuggestionEntry, University,
};
