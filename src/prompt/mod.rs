mod builder;
mod engine;

pub use builder::{ContextEntry, PromptBuilder};
pub use engine::TeraEngine;
