pub mod dto;
pub mod error;
pub mod handlers;
pub mod resolver;
pub mod response;
pub mod server;
pub mod state;


pub use resolver::{VirtualEnvironment, VirtualResolver, WorkflowEnvironment};
pub use server::{router, serve, start_server};
pub use state::AppState;
