pub mod application;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use application::AccountService;
pub use domain::{Account, AccountError, Credentials, NewAccount, NewMember, Token};
pub use infrastructure::repository::{AccountStore, DepartmentStore, ProfessionStore, StoreError};
pub use infrastructure::{JwtTokenIssuer, MemoryStore, PgStore, TokenConfig, TokenError, TokenIssuer};
