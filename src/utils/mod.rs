pub mod rdbfile;
pub mod error;
pub mod remap;

pub use rdbfile::*;
pub use error::*;
pub use remap::*;
