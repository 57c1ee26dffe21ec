pub mod care;
pub mod environment;
pub mod error;
pub mod health;
pub mod openapi;
