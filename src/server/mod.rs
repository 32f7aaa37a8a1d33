// HTTP surface
pub mod routes;
pub mod server;

pub use routes::*;
pub use server::*;
