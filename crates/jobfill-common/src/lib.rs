pub mod dom;
pub mod error;
pub mod protocol;
pub mod site;

pub use error::PageError;
