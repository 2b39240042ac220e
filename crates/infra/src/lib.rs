pub mod db;
pub mod geocode;
pub mod store;
