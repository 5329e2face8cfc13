use std::sync::Arc;

use crate::{
    config::Config,
    db::{DbPool, init_pool},
    errors::Result,
    ledger::{Ledger, LedgerPolicy},
};

#[derive(Debug, Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Arc<Config>,
    pub ledger: Ledger,
}

impl AppState {
    pub async fn init(config: Config) -> Result<Self> {
        let db = init_pool(&config.database_url).await?;
        Ok(Self::new(db, config))
    }

    pub fn new(db: DbPool, config: Config) -> Self {
        let ledger = Ledger::new(
            db.clone(),
            LedgerPolicy {
                require_ngo_approval: config.require_ngo_approval,
            },
        );
        Self {
            db,
            config: Arc::new(config),
            ledger,
        }
    }
}
