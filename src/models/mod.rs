pub mod phone;
pub mod raw;
pub mod record;
pub mod score;

pub use phone::*;
pub use raw::*;
pub use record::*;
pub use score::*;
