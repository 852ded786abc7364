pub mod assets;
pub mod handler;
pub mod protocol;
pub mod server;

pub use handler::{calculate, ApiOptions};
pub use protocol::{CalculateRequest, CalculateResponse};
pub use server::{router, run_server, serve, ServerSettings};
