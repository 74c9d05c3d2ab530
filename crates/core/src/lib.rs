pub mod colors;
pub mod export;
pub mod human;
pub mod model;
pub mod scanner;
pub mod search;
pub mod treemap;
pub mod worker;

pub use model::*;
pub use scanner::*;
pub use worker::*;
