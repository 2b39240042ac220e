use clap::Parser;

use crate::config::StoreKind;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Overrides ENVIE_STORE.
    #[arg(long)]
    pub store: Option<StoreKind>,
    /// Applies the SQL migrations before serving (postgres store only).
    #[arg(long, default_value_t = false)]
    pub migrate: bool,
}
