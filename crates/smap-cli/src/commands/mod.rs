//! Command implementations for the smap CLI

mod generate;
mod validate;

pub use generate::{execute as generate, load_settings};
pub use validate::execute as validate;
