mod cache;
mod paginator;

pub use cache::{CachedPage, PageCache};
pub use paginator::{FIRST_PAGE, Paginator};
