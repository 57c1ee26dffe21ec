pub mod care;
pub mod config;
pub mod disease;
pub mod environment;
pub mod facility;
pub mod outbreak;

pub use care::*;
pub use config::Config;
pub use disease::*;
pub use environment::*;
pub use facility::*;
pub use outbreak::*;
