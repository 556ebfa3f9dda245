pub mod services;
pub mod validation;

pub use services::*;

pub use services::AccountService;
