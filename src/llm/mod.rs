pub mod client;
pub mod history;
pub mod prompts;

pub use client::*;
pub use history::*;
pub use prompts::*;
