//! Helper functions for templates and rendering

mod date;
mod html;

pub use date::*;
pub use html::*;
