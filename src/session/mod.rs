mod controller;
pub mod event;
pub mod state;

pub use controller::Controller;
pub use event::{Completion, Flow};
pub use state::SessionState;

#[cfg(test)]
mod tests;
