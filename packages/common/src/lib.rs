pub mod dom;
pub mod error;
pub mod result;

pub use dom::*;
pub use error::*;
pub use result::*;
