//! JSON-RPC envelope handling and method routing

use rpc_core::{RpcApi, RpcError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    pub params: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), data: None }
    }
}

impl From<RpcError> for JsonRpcError {
    fn from(e: RpcError) -> Self {
        Self::new(e.code(), e.message())
    }
}

impl JsonRpcResponse {
    fn success(id: Option<Value>, result: Value) -> Self {
        Self { jsonrpc: "2.0".to_string(), id, result: Some(result), error: None }
    }

    fn failure(id: Option<Value>, error: JsonRpcError) -> Self {
        Self { jsonrpc: "2.0".to_string(), id, result: None, error: Some(error) }
    }
}

/// Parses one request, routes it to `api` and serializes the response
pub async fn dispatch(api: &dyn RpcApi, request: &str) -> String {
    let response = match serde_json::from_str::<JsonRpcRequest>(request) {
        Ok(rpc_req) if rpc_req.jsonrpc != "2.0" => {
            JsonRpcResponse::failure(rpc_req.id, JsonRpcError::new(INVALID_REQUEST, "jsonrpc must be \"2.0\""))
        }
        Ok(rpc_req) => {
            debug!("Dispatching {}", rpc_req.method);
            match route(api, &rpc_req.method, rpc_req.params.as_ref()).await {
                Ok(result) => JsonRpcResponse::success(rpc_req.id, result),
                Err(error) => JsonRpcResponse::failure(rpc_req.id, error),
            }
        }
        Err(e) => JsonRpcResponse::failure(None, JsonRpcError::new(PARSE_ERROR, format!("Invalid JSON-RPC request: {}", e))),
    };

    serde_json::to_string(&response).unwrap_or_else(|e| {
        format!(r#"{{"jsonrpc":"2.0","id":null,"error":{{"code":{},"message":"Serialization error: {}"}}}}"#, INTERNAL_ERROR, e)
    })
}

async fn route(api: &dyn RpcApi, method: &str, params: Option<&Value>) -> Result<Value, JsonRpcError> {
    match method {
        "generate" => {
            let count = param(params, 0, "blockCount")
                .and_then(Value::as_i64)
                .ok_or_else(|| JsonRpcError::new(INVALID_PARAMS, "blockCount must be an integer"))?;
            to_value(api.generate(count).await?)
        }
        "getmininginfo" => to_value(api.get_mining_info().await?),
        "startstaking" => {
            let wallet_name = string_param(params, 0, "walletName")?;
            let password = string_param(params, 1, "password")?;
            to_value(api.start_staking(wallet_name, password).await?)
        }
        "stopstaking" => {
            let wallet_name = string_param(params, 0, "walletName")?;
            to_value(api.stop_staking(wallet_name).await?)
        }
        "getstakinginfo" => {
            let is_json = match param(params, 0, "isJsonFormat") {
                None | Some(Value::Null) => true,
                Some(value) => value.as_bool().ok_or_else(|| JsonRpcError::new(INVALID_PARAMS, "isJsonFormat must be a boolean"))?,
            };
            to_value(api.get_staking_info(is_json).await?)
        }
        _ => Err(JsonRpcError::new(METHOD_NOT_FOUND, format!("Unknown method: {}", method))),
    }
}

/// Positional (`[a, b]`) or named (`{"name": a}`) parameter lookup
fn param<'a>(params: Option<&'a Value>, index: usize, name: &str) -> Option<&'a Value> {
    match params? {
        Value::Array(values) => values.get(index),
        Value::Object(fields) => fields.get(name),
        _ => None,
    }
}

fn string_param(params: Option<&Value>, index: usize, name: &str) -> Result<String, JsonRpcError> {
    param(params, index, name)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| JsonRpcError::new(INVALID_PARAMS, format!("{} must be a string", name)))
}

fn to_value<T: Serialize>(result: T) -> Result<Value, JsonRpcError> {
    serde_json::to_value(result).map_err(|e| JsonRpcError::new(INTERNAL_ERROR, format!("Serialization error: {}", e)))
}
