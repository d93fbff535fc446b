pub mod analyze;
pub mod personalize;
pub mod prepare;

pub use analyze::*;
pub use personalize::*;
pub use prepare::*;
