pub mod action;
pub mod config;
pub mod family;
pub mod oracle;
pub mod serdable;
pub mod style;
pub mod testing;

pub use crate::config::Config;
pub use crate::family::Family;
