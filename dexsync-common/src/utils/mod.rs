pub mod completeness;
pub mod filter;
pub mod merge;
pub mod sanitize;
pub mod series;
