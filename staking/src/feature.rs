//! Lifecycle of the staking subsystem: `Uninitialized -> Active`, one way.

use std::sync::Arc;

use consensus_core::Chain;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tracing::info;
use wallet::WalletManager;

use crate::engine::PosMinting;
use crate::error::StakingError;
use crate::settings::StakingSettings;

/// Holds what the PoS engine is built from and builds it on first use
pub struct StakingFeature {
    settings: StakingSettings,
    registry: Arc<WalletManager>,
    chain: Arc<Chain>,
    engine: Mutex<Option<Arc<PosMinting>>>,
}

impl StakingFeature {
    pub fn new(settings: StakingSettings, registry: Arc<WalletManager>, chain: Arc<Chain>) -> Self {
        Self { settings, registry, chain, engine: Mutex::new(None) }
    }

    /// The engine, once activated
    pub fn active(&self) -> Option<Arc<PosMinting>> {
        self.engine.lock().clone()
    }

    pub fn is_active(&self) -> bool {
        self.engine.lock().is_some()
    }

    /// Returns the engine, building it on the ambient tokio runtime first if
    /// needed. Concurrent first calls build a single engine.
    pub fn get_or_activate(&self) -> Result<Arc<PosMinting>, StakingError> {
        let mut slot = self.engine.lock();
        if let Some(engine) = slot.as_ref() {
            return Ok(Arc::clone(engine));
        }

        let runtime = Handle::try_current().map_err(|_| StakingError::NoRuntime)?;
        let engine = Arc::new(PosMinting::new(self.settings.clone(), self.registry.clone(), self.chain.clone(), runtime)?);
        info!(
            "Staking activated (search interval {}ms, weight {})",
            self.settings.search_interval.as_millis(),
            self.settings.weight
        );
        *slot = Some(Arc::clone(&engine));
        Ok(engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn feature() -> StakingFeature {
        StakingFeature::new(StakingSettings::default(), Arc::new(WalletManager::in_memory()), Arc::new(Chain::new()))
    }

    #[test]
    fn test_activation_requires_runtime() {
        let feature = feature();
        assert!(matches!(feature.get_or_activate(), Err(StakingError::NoRuntime)));
        assert!(!feature.is_active());
        assert!(feature.active().is_none());
    }

    #[tokio::test]
    async fn test_activation_is_one_way_and_shared() {
        let feature = feature();
        assert!(feature.active().is_none());

        let first = feature.get_or_activate().unwrap();
        let second = feature.get_or_activate().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&first, &feature.active().unwrap()));
    }

    #[test]
    fn test_concurrent_activation_builds_one_engine() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let feature = Arc::new(feature());

        let threads: Vec<_> = (0..8)
            .map(|_| {
                let feature = Arc::clone(&feature);
                let handle = runtime.handle().clone();
                thread::spawn(move || {
                    let _guard = handle.enter();
                    feature.get_or_activate().unwrap()
                })
            })
            .collect();
        let engines: Vec<_> = threads.into_iter().map(|t| t.join().unwrap()).collect();

        assert!(engines.iter().all(|e| Arc::ptr_eq(e, &engines[0])));
    }

    #[test]
    fn test_invalid_settings_fail_activation() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let _guard = runtime.enter();
        let settings = StakingSettings { weight: 0, ..Default::default() };
        let feature = StakingFeature::new(settings, Arc::new(WalletManager::in_memory()), Arc::new(Chain::new()));
        assert!(matches!(feature.get_or_activate(), Err(StakingError::InvalidSettings(_))));
        assert!(!feature.is_active());
    }
}
