pub mod ast;
pub mod errors;
pub mod names;
pub mod parser;
pub mod registry;
pub mod signature;
pub mod span;
pub mod types;
