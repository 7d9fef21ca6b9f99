pub mod api;
pub mod catalog;
pub mod config;
pub mod db;
pub mod token;

pub use db::DbPool;

use config::Config;
use token::TokenService;

pub struct AppState {
    pub config: Config,
    pub db: DbPool,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(config: Config, db: DbPool, tokens: TokenService) -> Self {
        Self { config, db, tokens }
    }
}
