//! Terminal views of the sample token dApp.
//!
//! Three pages read the shared [`SessionContext`] and call the
//! [`dapp_provider::TokenProvider`] it publishes. Page actions never return
//! errors: every failure is logged and written to the [`DebugConsole`], and
//! the page keeps the state it had before the action.

use alloy_primitives::Address;
use dapp_provider::{ProviderError, TokenProvider};
use dapp_session::SessionContext;
use serde_json::json;
use thiserror::Error;
use tracing::{error, info, warn};

/// Sample cards and price rendering.
pub mod card;
/// The on-page debug console.
pub mod console;
pub mod guard;
/// Header and page frame.
pub mod layout;
pub mod pages;
pub mod route;
/// Current route plus one instance of every page.
pub mod router;

#[cfg(test)]
pub(crate) mod test_support;

pub use card::SampleCard;
pub use console::DebugConsole;
pub use guard::RefetchGuard;
pub use pages::{InventoryPage, MarketplacePage, MintPage};
pub use route::Route;
pub use router::ViewRouter;

/// Why a page action did not complete.
#[derive(Debug, Error)]
pub enum ViewError {
	#[error(transparent)]
	Provider(#[from] ProviderError),
	#[error("No account is logged in")]
	NotLoggedIn,
	/// The page refused the action before calling the chain.
	#[error("{0}")]
	Rejected(String),
}

/// Provider and account of the active session.
pub(crate) async fn signed_in(
	context: &SessionContext,
) -> Result<(TokenProvider, Address), ViewError> {
	let provider = context.provider().await?;
	let account = context.account().await.ok_or(ViewError::NotLoggedIn)?;
	Ok((provider, account))
}

/// Logs a failed action and shows it in the console.
pub(crate) fn report(console: &mut DebugConsole, action: &str, err: &ViewError) {
	match err {
		ViewError::Provider(ProviderError::ProviderNotReady) | ViewError::NotLoggedIn => {
			info!(action, "Skipped, log in first");
		},
		ViewError::Provider(ProviderError::Transport(_)) => {
			error!(action, error = %err, "Node request failed");
		},
		_ => warn!(action, error = %err, "Action failed"),
	}
	console.log(action, json!({ "error": err.to_string() }));
}
