pub mod metadata;
pub mod token;
pub mod transfer;

pub use metadata::*;
pub use token::*;
pub use transfer::*;
