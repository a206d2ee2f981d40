use crate::state::SessionState;
use alloy_primitives::Address;
use dapp_provider::{ProviderError, TokenProvider};
use dapp_types::{Session, UserInfo};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct ContextInner {
	state: SessionState,
	session: Session,
	provider: Option<TokenProvider>,
	user_info: Option<UserInfo>,
}

/// Read-only view of the current session, shared with every page.
///
/// Clones share the same underlying data. Only [`crate::SessionManager`]
/// can change it.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
	inner: Arc<RwLock<ContextInner>>,
}

impl SessionContext {
	pub async fn state(&self) -> SessionState {
		self.inner.read().await.state.clone()
	}

	pub async fn session(&self) -> Session {
		self.inner.read().await.session.clone()
	}

	/// Logged-in account, if any.
	pub async fn account(&self) -> Option<Address> {
		self.inner.read().await.session.account
	}

	pub async fn is_loading(&self) -> bool {
		self.inner.read().await.state.is_loading()
	}

	pub async fn user_info(&self) -> Option<UserInfo> {
		self.inner.read().await.user_info.clone()
	}

	/// The facade bound to the current login.
	///
	/// # Errors
	///
	/// Returns [`ProviderError::ProviderNotReady`] when nobody is logged in.
	pub async fn provider(&self) -> Result<TokenProvider, ProviderError> {
		self.inner
			.read()
			.await
			.provider
			.clone()
			.ok_or(ProviderError::ProviderNotReady)
	}

	pub(crate) async fn set_state(&self, state: SessionState) {
		self.inner.write().await.state = state;
	}

	pub(crate) async fn publish_login(
		&self,
		session: Session,
		provider: TokenProvider,
		user_info: Option<UserInfo>,
	) {
		let mut inner = self.inner.write().await;
		inner.session = session;
		inner.provider = Some(provider);
		inner.user_info = user_info;
	}

	pub(crate) async fn clear_login(&self, chain_id: u64) -> Option<TokenProvider> {
		let mut inner = self.inner.write().await;
		inner.session = Session::signed_out(chain_id);
		inner.user_info = None;
		inner.provider.take()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use dapp_provider::{Contracts, MockChainClient};

	fn provider() -> TokenProvider {
		TokenProvider::new(
			Arc::new(MockChainClient::new()),
			Contracts::new(Address::repeat_byte(1), Address::repeat_byte(2)),
		)
	}

	#[tokio::test]
	async fn test_default_context_has_no_provider() {
		let context = SessionContext::default();
		assert_eq!(context.state().await, SessionState::Uninitialized);
		assert!(!context.session().await.is_authenticated);
		assert!(matches!(
			context.provider().await,
			Err(ProviderError::ProviderNotReady)
		));
	}

	#[tokio::test]
	async fn test_clones_observe_writes() {
		let context = SessionContext::default();
		let reader = context.clone();
		let account = Address::repeat_byte(0xaa);

		context
			.publish_login(Session::authenticated(account, 1337), provider(), None)
			.await;
		context.set_state(SessionState::Connected(account)).await;

		assert_eq!(reader.account().await, Some(account));
		assert_eq!(reader.state().await, SessionState::Connected(account));
		assert!(reader.provider().await.is_ok());

		let dropped = context.clear_login(1337).await;
		assert!(dropped.is_some());
		assert!(reader.account().await.is_none());
		assert!(reader.provider().await.is_err());
	}
}
