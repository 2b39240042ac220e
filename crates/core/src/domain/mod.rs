pub mod establishment;
pub mod search;
