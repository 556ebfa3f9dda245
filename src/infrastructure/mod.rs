pub mod auth;
pub mod config;
pub mod logging;
pub mod memory_store;
pub mod pg_store;
pub mod repository;

pub use auth::{JwtTokenIssuer, TokenConfig, TokenError, TokenIssuer};
pub use config::AppConfig;
pub use memory_store::MemoryStore;
pub use pg_store::PgStore;
pub use repository::{AccountStore, DepartmentStore, ProfessionStore, StoreError};
