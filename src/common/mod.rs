// Shared constants and helpers
pub mod constants;
pub mod utils;
