//! Chain validation against the expected network.

use crate::gateway::WalletGateway;
use crate::traits::WalletError;
use crate::types::{ChainCheck, ChainId};

/// Validates the provider's active chain against the expected one.
///
/// A mismatch is reported, never enforced: chain switching is under the
/// user's control, and a transaction against the wrong chain surfaces its
/// own failure through the contract layer.
#[derive(Debug, Clone, Copy)]
pub struct NetworkGuard {
    expected: ChainId,
}

impl NetworkGuard {
    pub const fn new(expected: ChainId) -> Self {
        Self { expected }
    }

    pub fn expected(&self) -> ChainId {
        self.expected
    }

    /// Compare the provider's active chain with the expected one.
    pub async fn validate(&self, gateway: &WalletGateway) -> Result<ChainCheck, WalletError> {
        let actual = gateway.chain_id().await?;
        if actual == self.expected {
            Ok(ChainCheck::Ok)
        } else {
            tracing::warn!(%actual, expected = %self.expected, "connected to unexpected chain");
            Ok(ChainCheck::Mismatch {
                actual,
                expected: self.expected,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::mock::MockChain;

    #[tokio::test]
    async fn matching_chain_validates_ok() {
        let chain = MockChain::new(ChainId(4));
        let gateway = WalletGateway::detect(Some(Arc::new(chain)));

        let guard = NetworkGuard::new(ChainId(4));
        assert_eq!(guard.validate(&gateway).await.unwrap(), ChainCheck::Ok);
    }

    #[tokio::test]
    async fn mismatched_chain_reports_both_ids() {
        let chain = MockChain::new(ChainId(1));
        let gateway = WalletGateway::detect(Some(Arc::new(chain)));

        let guard = NetworkGuard::new(ChainId(4));
        assert_eq!(
            guard.validate(&gateway).await.unwrap(),
            ChainCheck::Mismatch {
                actual: ChainId(1),
                expected: ChainId(4),
            }
        );
    }

    #[tokio::test]
    async fn missing_provider_propagates_wallet_error() {
        let gateway = WalletGateway::detect(None);
        let guard = NetworkGuard::new(ChainId(4));
        assert!(matches!(
            guard.validate(&gateway).await,
            Err(WalletError::NoProvider)
        ));
    }
}
