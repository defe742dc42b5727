pub mod clean;
pub mod fetch;
pub mod report;
