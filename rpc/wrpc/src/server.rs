//! WebSocket RPC server

use futures_util::{SinkExt, StreamExt};
use rpc_core::RpcApi;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info};

use crate::dispatch::dispatch;

pub struct WrpcServer {
    api: Arc<dyn RpcApi>,
    listener: TcpListener,
}

impl WrpcServer {
    /// Binds the listening socket; port 0 picks a free port
    pub async fn bind(api: Arc<dyn RpcApi>, bind_address: &str, port: u16) -> Result<Self, String> {
        let addr = format!("{}:{}", bind_address, port);
        let listener = TcpListener::bind(&addr).await.map_err(|e| format!("Failed to bind {}: {}", addr, e))?;
        Ok(Self { api, listener })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, String> {
        self.listener.local_addr().map_err(|e| format!("Failed to read local address: {}", e))
    }

    /// Accepts connections until the listener fails
    pub async fn run(self) -> Result<(), String> {
        if let Ok(addr) = self.listener.local_addr() {
            info!("wRPC server listening on {}", addr);
        }

        loop {
            let (stream, peer) = self.listener.accept().await.map_err(|e| format!("Accept error: {}", e))?;
            let api = self.api.clone();

            tokio::spawn(async move {
                if let Err(e) = Self::handle_connection(stream, peer, api).await {
                    error!("WebSocket error: {}", e);
                }
            });
        }
    }

    async fn handle_connection(stream: tokio::net::TcpStream, peer: SocketAddr, api: Arc<dyn RpcApi>) -> Result<(), String> {
        let ws_stream = accept_async(stream).await.map_err(|e| format!("WebSocket handshake error: {}", e))?;
        let (mut write, mut read) = ws_stream.split();
        debug!("WebSocket client {} connected", peer);

        while let Some(item) = read.next().await {
            match item {
                Ok(Message::Text(text)) => {
                    debug!("Received {} byte request from {}", text.len(), peer);
                    let response = dispatch(api.as_ref(), &text).await;
                    if let Err(e) = write.send(Message::Text(response)).await {
                        error!("Write error: {}", e);
                        break;
                    }
                }
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    // Client disconnected or protocol error; normal when clients close connections
                    debug!("WebSocket client {} disconnected: {}", peer, e);
                    break;
                }
            }
        }

        Ok(())
    }
}
