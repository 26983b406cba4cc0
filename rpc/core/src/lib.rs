pub mod adapters;
pub mod api;
pub mod coordinator;
pub mod interfaces;
pub mod model;

pub use api::RpcApi;
pub use coordinator::{CoordinatorSettings, RpcCoordinator};
pub use interfaces::{BlockGenerator, StakingEngine, StakingProvider, WalletRegistry};
pub use model::*;
