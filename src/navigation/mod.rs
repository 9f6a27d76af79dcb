pub mod debouncer;
pub mod input;
pub mod orchestrator;

#[cfg(test)]
mod tests;

pub use input::{Bounds, InputEvent, Point, ScopedInput};
pub use orchestrator::{ItemView, NavigationOrchestrator};
