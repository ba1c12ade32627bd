//! Wallet gateway: detection wrapper over a maybe-absent provider.

use std::sync::Arc;

use crate::traits::{WalletError, WalletProvider};
use crate::types::{Account, ChainId};

/// Wraps the injected wallet provider, which may be absent.
///
/// Every call borrows the provider for its duration; the gateway owns no
/// session state of its own. When no provider was detected, all operations
/// fail with [`WalletError::NoProvider`] instead of silently returning empty
/// results.
#[derive(Clone)]
pub struct WalletGateway {
    provider: Option<Arc<dyn WalletProvider>>,
}

impl WalletGateway {
    /// Wrap the detected provider, or record its absence.
    pub fn detect(provider: Option<Arc<dyn WalletProvider>>) -> Self {
        if provider.is_none() {
            tracing::warn!("no wallet provider detected");
        }
        Self { provider }
    }

    pub fn is_detected(&self) -> bool {
        self.provider.is_some()
    }

    fn provider(&self) -> Result<&Arc<dyn WalletProvider>, WalletError> {
        self.provider.as_ref().ok_or(WalletError::NoProvider)
    }

    /// Accounts the user has already authorized, without prompting.
    pub async fn authorized_accounts(&self) -> Result<Vec<Account>, WalletError> {
        self.provider()?.authorized_accounts().await
    }

    /// Prompt the user for authorization and return the active account.
    ///
    /// A prompt that yields no accounts is treated as a rejection.
    pub async fn request_authorization(&self) -> Result<Account, WalletError> {
        let accounts = self.provider()?.request_accounts().await?;
        match accounts.into_iter().next() {
            Some(account) => {
                tracing::info!(account = %account.short(), "wallet authorization granted");
                Ok(account)
            }
            None => Err(WalletError::UserRejected),
        }
    }

    /// The chain the provider is currently connected to.
    pub async fn chain_id(&self) -> Result<ChainId, WalletError> {
        self.provider()?.chain_id().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockChain;

    #[tokio::test]
    async fn absent_provider_fails_every_operation() {
        let gateway = WalletGateway::detect(None);
        assert!(!gateway.is_detected());

        assert!(matches!(
            gateway.authorized_accounts().await,
            Err(WalletError::NoProvider)
        ));
        assert!(matches!(
            gateway.request_authorization().await,
            Err(WalletError::NoProvider)
        ));
        assert!(matches!(
            gateway.chain_id().await,
            Err(WalletError::NoProvider)
        ));
    }

    #[tokio::test]
    async fn authorization_returns_first_account() {
        let chain = MockChain::new(ChainId(4));
        chain.grant_on_request(Account::new("0xAAaa000000000000000000000000000000000001"));

        let gateway = WalletGateway::detect(Some(Arc::new(chain)));
        let account = gateway.request_authorization().await.unwrap();
        assert_eq!(
            account.as_str(),
            "0xaaaa000000000000000000000000000000000001"
        );
    }

    #[tokio::test]
    async fn rejected_prompt_surfaces_user_rejected() {
        let chain = MockChain::new(ChainId(4));
        chain.reject_authorization();

        let gateway = WalletGateway::detect(Some(Arc::new(chain)));
        assert!(matches!(
            gateway.request_authorization().await,
            Err(WalletError::UserRejected)
        ));
    }
}
