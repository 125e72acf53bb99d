pub mod diff;
pub mod explanation;
pub mod page;
