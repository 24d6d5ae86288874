pub mod settings;

pub use settings::{BlingSettings, ServerSettings, Settings};
