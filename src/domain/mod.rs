pub mod book;
pub mod commands;
pub mod errors;
pub mod value_objects;

pub use book::*;
pub use commands::*;
pub use errors::*;
pub use value_objects::*;
