pub mod backend;
pub mod config;
pub mod error;
pub mod message;
pub mod metrics;
pub mod notice;
pub mod suggestion;

#[cfg(test)]
mod tests;
