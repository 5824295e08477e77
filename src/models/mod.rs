//! Core data models for search requests and decoded feeds.

mod feed;
mod search;

pub use feed::{Author, Category, Entry, Feed, Link};
pub use search::{
    with_and, with_and_not, with_max_results, with_or, with_sort_by, with_sort_order,
    FieldPrefix, SearchOp, SearchOperator, SortBy, SortOrder,
};
