mod models;
pub mod validation;

pub use models::*;
