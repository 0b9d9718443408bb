mod client;
mod error;
mod exec;
mod types;

#[cfg(test)]
pub mod mock;

pub use client::*;
pub use error::*;
pub use exec::*;
pub use types::*;
