//! JSON-RPC 2.0 over WebSocket for the node's control surface

pub mod dispatch;
pub mod server;

pub use dispatch::{dispatch, JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use server::WrpcServer;
