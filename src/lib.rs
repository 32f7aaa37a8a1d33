pub mod engine;
pub mod connectors;
pub mod server;
pub mod cli;
pub mod utils;

pub use engine::*;
pub use connectors::*;
pub use server::*;
pub use cli::*;
pub use utils::*;
