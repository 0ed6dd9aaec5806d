pub use lottery::*;
pub use treasury::*;

pub mod lottery;
pub mod treasury;
