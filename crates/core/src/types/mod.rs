pub mod geo;
pub mod schedule;
pub mod tag;
pub mod text;
