//! Memoized write handles.
//!
//! A write handle is bound to one account on one chain. The cache keeps the
//! most recent handle and rebuilds it whenever the account or the chain
//! changes, so a signer from a previous account is never reused.

use crate::SignerFactory;
use alloy_primitives::Address;
use client::WalletError;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Identity of a write handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignerKey {
    pub chain_id: Option<u64>,
    pub account: Address,
}

pub struct SignerCache<F: SignerFactory> {
    factory: F,
    current: Mutex<Option<(SignerKey, Arc<F::Writer>)>>,
}

impl<F> SignerCache<F>
where
    F: SignerFactory,
{
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            current: Mutex::new(None),
        }
    }

    pub const fn factory(&self) -> &F {
        &self.factory
    }

    /// Writer for `key`, reusing the cached one when the key is unchanged.
    pub async fn get(&self, key: SignerKey) -> Result<Arc<F::Writer>, WalletError> {
        let mut current = self.current.lock().await;

        if let Some((cached, writer)) = current.as_ref() {
            if *cached == key {
                return Ok(Arc::clone(writer));
            }
        }

        // Drop the stale writer before trying to build the new one.
        *current = None;

        let writer = Arc::new(self.factory.create(key.account).await?);
        debug!(account = %key.account, chain_id = ?key.chain_id, "Built write handle");

        *current = Some((key, Arc::clone(&writer)));
        Ok(writer)
    }

    /// Forget the cached writer.
    pub async fn clear(&self) {
        self.current.lock().await.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Confirmation, PendingWrite, TokenWriter};
    use alloy_primitives::{TxHash, U256};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct NoopPending;

    impl PendingWrite for NoopPending {
        fn tx_hash(&self) -> TxHash {
            TxHash::ZERO
        }

        async fn confirm(self) -> eyre::Result<Confirmation> {
            eyre::bail!("not used")
        }
    }

    struct NoopWriter(Address);

    impl TokenWriter for NoopWriter {
        type Pending = NoopPending;

        fn account(&self) -> Address {
            self.0
        }

        async fn transfer(&self, _to: Address, _amount: U256) -> eyre::Result<NoopPending> {
            Ok(NoopPending)
        }

        async fn mint(&self, _to: Address, _amount: U256) -> eyre::Result<NoopPending> {
            Ok(NoopPending)
        }

        async fn burn(&self, _amount: U256) -> eyre::Result<NoopPending> {
            Ok(NoopPending)
        }
    }

    #[derive(Default)]
    struct CountingFactory {
        built: AtomicUsize,
    }

    impl SignerFactory for CountingFactory {
        type Writer = NoopWriter;

        async fn create(&self, account: Address) -> Result<NoopWriter, WalletError> {
            if account == Address::ZERO {
                return Err(WalletError::NoSigner);
            }
            self.built.fetch_add(1, Ordering::SeqCst);
            Ok(NoopWriter(account))
        }
    }

    fn key(account: u8, chain_id: u64) -> SignerKey {
        SignerKey {
            chain_id: Some(chain_id),
            account: Address::repeat_byte(account),
        }
    }

    #[tokio::test]
    async fn test_same_key_reuses_writer() {
        let cache = SignerCache::new(CountingFactory::default());

        let first = cache.get(key(1, 1)).await.unwrap();
        let second = cache.get(key(1, 1)).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.factory().built.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_account_switch_rebuilds_writer() {
        let cache = SignerCache::new(CountingFactory::default());

        let first = cache.get(key(1, 1)).await.unwrap();
        let second = cache.get(key(2, 1)).await.unwrap();

        assert_eq!(first.account(), Address::repeat_byte(1));
        assert_eq!(second.account(), Address::repeat_byte(2));
        assert_eq!(cache.factory().built.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_chain_switch_rebuilds_writer() {
        let cache = SignerCache::new(CountingFactory::default());

        cache.get(key(1, 1)).await.unwrap();
        cache.get(key(1, 2)).await.unwrap();
        cache.get(key(1, 2)).await.unwrap();

        assert_eq!(cache.factory().built.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_build_drops_stale_writer() {
        let cache = SignerCache::new(CountingFactory::default());
        cache.get(key(1, 1)).await.unwrap();

        let failed = SignerKey {
            chain_id: Some(1),
            account: Address::ZERO,
        };
        assert!(matches!(cache.get(failed).await, Err(WalletError::NoSigner)));

        // The old writer is gone, so asking for it again rebuilds it.
        cache.get(key(1, 1)).await.unwrap();
        assert_eq!(cache.factory().built.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = SignerCache::new(CountingFactory::default());
        cache.get(key(1, 1)).await.unwrap();
        cache.clear().await;
        cache.get(key(1, 1)).await.unwrap();

        assert_eq!(cache.factory().built.load(Ordering::SeqCst), 2);
    }
}
