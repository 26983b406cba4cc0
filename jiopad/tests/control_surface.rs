use std::path::Path;
use std::time::Duration;

use consensus_core::BlockKind;
use futures_util::{SinkExt, StreamExt};
use jiopad::{Config, Daemon};
use rpc_core::{RpcError, StakingInfo};
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use wallet::{Address, KdfParams, WalletManager};

fn seed_wallets(dir: &Path) {
    let registry = WalletManager::open_dir(dir).unwrap().with_kdf(KdfParams::insecure());
    registry.create_wallet("alpha", "alpha-pw", 1).unwrap();
    registry.create_wallet("beta", "beta-pw", 1).unwrap();
}

fn test_config(dir: &Path, staking: bool) -> Config {
    let mut config = Config::default();
    config.wallet.wallet_dir = dir.to_path_buf();
    config.rpc.port = 0;
    config.mining.num_workers = 2;
    config.staking.enabled = staking;
    config.staking.search_interval_ms = 5;
    config.staking.bits = 0x207fffff;
    config
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_generate_pays_first_wallet() {
    let tmp = TempDir::new().unwrap();
    seed_wallets(tmp.path());
    let daemon = Daemon::new(test_config(tmp.path(), false)).await.unwrap();
    let api = daemon.api();

    let hashes = api.generate(3).await.unwrap();
    assert_eq!(hashes.len(), 3);
    assert_eq!(daemon.chain().height(), 3);

    let alpha = WalletManager::open_dir(tmp.path()).unwrap().get_wallet("alpha").unwrap();
    let issued: Vec<String> = alpha.accounts()[0].addresses.iter().filter(|a| a.used).map(|a| a.address.clone()).collect();
    assert_eq!(issued.len(), 3);
    for hash in &hashes {
        let header = daemon.chain().get(hash).unwrap();
        assert_eq!(header.kind, BlockKind::ProofOfWork);
        assert!(issued.contains(&Address::from_script_pub_key(&header.coinbase).unwrap()));
    }

    let info = api.get_mining_info().await.unwrap();
    assert_eq!(info.blocks, 3);
    assert_eq!(info.workers, 2);
    assert!(!info.generating);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_staking_lifecycle() {
    let tmp = TempDir::new().unwrap();
    seed_wallets(tmp.path());
    let daemon = Daemon::new(test_config(tmp.path(), true)).await.unwrap();
    let api = daemon.api();

    assert_eq!(api.get_staking_info(true).await.unwrap(), StakingInfo::default());
    assert!(!api.stop_staking("beta".to_string()).await.unwrap());

    let rejected = api.start_staking("beta".to_string(), "alpha-pw".to_string()).await;
    assert!(matches!(rejected, Err(RpcError::Unauthorized(_))));
    let missing = api.start_staking("gamma".to_string(), "pw".to_string()).await;
    assert!(matches!(missing, Err(RpcError::NotFound(_))));

    assert!(api.start_staking("beta".to_string(), "beta-pw".to_string()).await.unwrap());
    for _ in 0..400 {
        if daemon.chain().count_of_kind(BlockKind::ProofOfStake) > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(daemon.chain().count_of_kind(BlockKind::ProofOfStake) > 0);

    assert!(api.stop_staking("beta".to_string()).await.unwrap());
    let info = api.get_staking_info(true).await.unwrap();
    assert!(info.enabled);
    assert!(!info.staking);
    assert!(info.blocks_staked >= 1);
}

#[tokio::test]
async fn test_invalid_staking_config_rejected() {
    let tmp = TempDir::new().unwrap();
    let mut config = test_config(tmp.path(), true);
    config.staking.weight = 0;
    assert!(Daemon::new(config).await.is_err());
}

async fn request(
    socket: &mut tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>,
    body: Value,
) -> Value {
    socket.send(Message::Text(body.to_string())).await.unwrap();
    loop {
        match socket.next().await.unwrap().unwrap() {
            Message::Text(text) => return serde_json::from_str(&text).unwrap(),
            _ => continue,
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_websocket_round_trip_and_shutdown() {
    let tmp = TempDir::new().unwrap();
    seed_wallets(tmp.path());
    let daemon = Daemon::new(test_config(tmp.path(), false)).await.unwrap();
    let addr = daemon.rpc_addr().unwrap();
    let shutdown = daemon.shutdown_handle();
    let running = tokio::spawn(daemon.run());

    let (mut socket, _) = connect_async(format!("ws://{}", addr)).await.unwrap();

    let generated = request(&mut socket, json!({"jsonrpc": "2.0", "id": 1, "method": "generate", "params": [2]})).await;
    assert_eq!(generated["id"], 1);
    assert_eq!(generated["result"].as_array().unwrap().len(), 2);

    let info = request(&mut socket, json!({"jsonrpc": "2.0", "id": 2, "method": "getmininginfo"})).await;
    assert_eq!(info["result"]["blocks"], 2);

    let unsupported =
        request(&mut socket, json!({"jsonrpc": "2.0", "id": 3, "method": "startstaking", "params": ["alpha", "alpha-pw"]})).await;
    assert_eq!(unsupported["error"]["code"], -32601);

    let invalid = request(&mut socket, json!({"jsonrpc": "2.0", "id": 4, "method": "generate", "params": [-1]})).await;
    assert_eq!(invalid["error"]["code"], -8);

    shutdown.send(()).unwrap();
    running.await.unwrap().unwrap();
}
