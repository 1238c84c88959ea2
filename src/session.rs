//! Connected wallet state, passed explicitly to whoever needs it.

use tracing::{info, warn};

use crate::{
    address::format_address,
    error::{WalletError, WalletResult},
    provider::WalletProvider,
};

struct Connection<P> {
    provider: P,
    account: String,
}

/// The provider handle and the active account, held together so that one is
/// never present without the other.
pub struct WalletSession<P> {
    connection: Option<Connection<P>>,
    last_error: Option<WalletError>,
}

impl<P> Default for WalletSession<P> {
    fn default() -> Self {
        WalletSession {
            connection: None,
            last_error: None,
        }
    }
}

impl<P: WalletProvider> WalletSession<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests account access from `provider`; `None` means no provider exists
    /// in this environment.
    ///
    /// On failure the session keeps whatever it held before and remembers the
    /// error in [`WalletSession::last_error`].
    pub async fn connect(&mut self, provider: Option<P>) -> WalletResult<String> {
        let Some(provider) = provider else {
            return Err(self.fail(WalletError::ProviderUnavailable(
                "no wallet provider found, configure an RPC url".to_string(),
            )));
        };

        let accounts = match provider.request_accounts().await {
            Ok(accounts) => accounts,
            Err(e) => return Err(self.fail(e)),
        };
        let Some(account) = accounts.into_iter().next() else {
            return Err(self.fail(WalletError::call_failure(
                "eth_requestAccounts",
                "provider returned no accounts",
            )));
        };

        info!("👛 Wallet connected as {}", format_address(&account));
        self.connection = Some(Connection {
            provider,
            account: account.clone(),
        });
        self.last_error = None;
        Ok(account)
    }

    fn fail(&mut self, error: WalletError) -> WalletError {
        warn!("Wallet connection failed: {}", error);
        self.last_error = Some(error.clone());
        error
    }
}

impl<P> WalletSession<P> {
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn account(&self) -> Option<&str> {
        self.connection.as_ref().map(|c| c.account.as_str())
    }

    pub fn provider(&self) -> Option<&P> {
        self.connection.as_ref().map(|c| &c.provider)
    }

    /// Provider and account together, for calls made on behalf of the account.
    pub fn connection(&self) -> Option<(&P, &str)> {
        self.connection
            .as_ref()
            .map(|c| (&c.provider, c.account.as_str()))
    }

    pub fn formatted_account(&self) -> Option<String> {
        self.account().map(format_address)
    }

    pub fn last_error(&self) -> Option<&WalletError> {
        self.last_error.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::mock_provider::MockProvider;
    use assertables::assert_ok;

    const ACCOUNT: &str = "0xABCDEF0123456789ABCDEF0123456789ABCDEF01";

    #[test_log::test(tokio::test)]
    async fn connect_stores_first_account() {
        let mut session = WalletSession::new();
        let provider = MockProvider::with_accounts(&[
            ACCOUNT,
            "0x0000000000000000000000000000000000000002",
        ]);

        assert_ok!(session.connect(Some(provider)).await);
        assert!(session.is_connected());
        assert_eq!(session.account(), Some(ACCOUNT));
        assert!(session.provider().is_some());
        assert_eq!(
            session.formatted_account().as_deref(),
            Some("0xABCDE...EF01")
        );
        assert!(session.last_error().is_none());
    }

    #[test_log::test(tokio::test)]
    async fn missing_provider_is_reported() {
        let mut session = WalletSession::<MockProvider>::new();

        let err = session.connect(None).await.unwrap_err();
        assert!(matches!(err, WalletError::ProviderUnavailable(_)));
        assert!(!session.is_connected());
        assert_eq!(session.last_error(), Some(&err));
    }

    #[test_log::test(tokio::test)]
    async fn rejection_leaves_session_untouched() {
        let mut session = WalletSession::new();
        let rejected = WalletError::UserRejected("User rejected the request.".into());

        let err = session
            .connect(Some(MockProvider::rejecting(rejected.clone())))
            .await
            .unwrap_err();
        assert_eq!(err, rejected);
        assert!(session.account().is_none());
        assert!(session.provider().is_none());

        session
            .connect(Some(MockProvider::with_accounts(&[ACCOUNT])))
            .await
            .unwrap();
        let err = session
            .connect(Some(MockProvider::rejecting(rejected.clone())))
            .await
            .unwrap_err();
        assert_eq!(err, rejected);
        assert_eq!(session.account(), Some(ACCOUNT));
        assert_eq!(session.last_error(), Some(&rejected));
    }

    #[test_log::test(tokio::test)]
    async fn empty_account_list_is_a_call_failure() {
        let mut session = WalletSession::new();

        let err = session
            .connect(Some(MockProvider::with_accounts(&[])))
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::CallFailure { .. }));
        assert!(!session.is_connected());
    }
}
