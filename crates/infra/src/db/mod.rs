pub mod establishments_repo;
pub mod migrations;
pub mod pool;

pub use establishments_repo::EstablishmentsRepoError;
pub use migrations::run_migrations;
pub use pool::{connect_lazy, DbPool, DbPoolError};
