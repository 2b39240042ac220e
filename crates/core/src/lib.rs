pub mod clock;
pub mod domain;
pub mod error;
pub mod ranking;
pub mod types;
