// Core domain layer
pub mod entry;
pub mod interfaces;
pub mod models;
pub mod outcome;
pub mod request;
pub mod runtime;
pub mod services;

pub use interfaces::*;
pub use models::*;
pub use runtime::Runtime;
pub use services::*;
