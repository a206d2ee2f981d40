//! Interactive session: one manager, one router, one command at a time.

use crate::commands::Command;
use crate::output::Display;
use dapp_config::{ChainConfig, Config};
use dapp_session::{SessionContext, SessionError, SessionManager};
use dapp_types::{format_address, parse_address, to_display_units};
use dapp_views::{DebugConsole, Route, ViewError, ViewRouter};
use serde_json::json;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

/// Whether the prompt loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
	Continue,
	Quit,
}

pub struct App {
	manager: SessionManager,
	context: SessionContext,
	router: ViewRouter,
	chain: ChainConfig,
}

impl App {
	pub fn new(config: &Config) -> Result<Self, SessionError> {
		let manager = SessionManager::from_config(config)?;
		Ok(Self::with_manager(
			manager,
			DebugConsole::new(config.app.debug_console),
			config.chain.clone(),
		))
	}

	pub fn with_manager(manager: SessionManager, console: DebugConsole, chain: ChainConfig) -> Self {
		let context = manager.context();
		Self {
			router: ViewRouter::new(context.clone(), console),
			manager,
			context,
			chain,
		}
	}

	/// Initialises the auth adapter and shows the first page.
	pub async fn start(&mut self, route: Route) {
		self.manager.initialize().await;
		self.router.navigate(route).await;
		self.show().await;
	}

	pub async fn show(&self) {
		Display::page(&self.router.render().await);
	}

	/// Runs one command. Failures are reported, never returned.
	pub async fn handle(&mut self, command: Command) -> Flow {
		self.manager.process_events().await;

		match command {
			Command::Goto { route } => {
				let route: Route = match route.parse() {
					Ok(route) => route,
					Err(never) => match never {},
				};
				self.router.navigate(route).await;
			},
			Command::Login => self.login().await,
			Command::Logout => self.logout().await,
			Command::Whoami => {
				self.whoami().await;
				return Flow::Continue;
			},
			Command::Mint => {
				self.router.mint().await;
			},
			Command::Refresh => {
				self.router.refresh().await;
			},
			Command::Balance => self.balance().await,
			Command::Sign { message } => self.sign(&message.join(" ")).await,
			Command::Send { to, ether } => self.send(&to, &ether).await,
			Command::Buy { token_id } => {
				self.router.buy(&token_id).await;
			},
			Command::Rent { token_id, seconds } => {
				let expires = now().saturating_add(seconds);
				self.router.rent(&token_id, expires).await;
			},
			Command::Approve => {
				self.router.toggle_approval().await;
			},
			Command::Sell { token_id, ether } => {
				self.router.sell(&token_id, &ether).await;
			},
			Command::Console => {
				Display::header("Console");
				println!("{}", self.router.console().last().unwrap_or("(empty)"));
				return Flow::Continue;
			},
			Command::Quit => {
				info!("Bye");
				return Flow::Quit;
			},
		}

		self.show().await;
		Flow::Continue
	}

	async fn login(&mut self) {
		match self.manager.login().await {
			Ok(account) => Display::success(&format!("Logged in as {}", format_address(&account))),
			Err(e) => {
				Display::error(&e.to_string());
				self.router.log("login", json!({ "error": e.to_string() }));
			},
		}
		self.router.sync().await;
	}

	async fn logout(&mut self) {
		match self.manager.logout().await {
			Ok(()) => Display::success("Logged out"),
			Err(e) => Display::warning(&e.to_string()),
		}
		self.router.sync().await;
	}

	async fn whoami(&self) {
		Display::header("Session");
		let session = self.context.session().await;
		Display::kv("State", &self.context.state().await.to_string());
		Display::kv("Chain", &session.chain_id.to_string());
		match session.account {
			Some(account) => Display::kv("Account", &format_address(&account)),
			None => Display::kv("Account", "-"),
		}

		match self.manager.get_user_info().await {
			Ok(info) => {
				for (key, value) in [
					("Name", info.name),
					("Email", info.email),
					("Verifier", info.verifier),
					("Login", info.typed_login),
				] {
					if let Some(value) = value {
						Display::kv(key, &value);
					}
				}
			},
			Err(e) => warn!(error = %e, "No user info"),
		}
	}

	async fn balance(&mut self) {
		let result = async {
			let provider = self.context.provider().await?;
			let account = self.context.account().await.ok_or(ViewError::NotLoggedIn)?;
			Ok::<_, ViewError>(provider.native_balance(account).await?)
		}
		.await;

		match result {
			Ok(wei) => {
				let amount = format!("{} {}", to_display_units(wei), self.chain.ticker);
				Display::kv("Balance", &amount);
				self.router.log("getBalance", json!({ "wei": wei.to_string(), "display": amount }));
			},
			Err(e) => self.failed("getBalance", e),
		}
	}

	async fn sign(&mut self, message: &str) {
		let result = async {
			let provider = self.context.provider().await?;
			let account = self.context.account().await.ok_or(ViewError::NotLoggedIn)?;
			Ok::<_, ViewError>(provider.sign_message(account, message.as_bytes().to_vec()).await?)
		}
		.await;

		match result {
			Ok(signature) => {
				Display::kv("Signature", &signature.to_string());
				self.router.log("signMessage", json!({ "message": message, "signature": signature }));
			},
			Err(e) => self.failed("signMessage", e),
		}
	}

	async fn send(&mut self, to: &str, ether: &str) {
		let result = async {
			let to = parse_address(to).map_err(ViewError::Rejected)?;
			let provider = self.context.provider().await?;
			let account = self.context.account().await.ok_or(ViewError::NotLoggedIn)?;
			Ok::<_, ViewError>(provider.transfer_native(account, to, ether).await?)
		}
		.await;

		match result {
			Ok(receipt) => {
				Display::success(&format!("Sent {ether} {}", self.chain.ticker));
				let explorer = self.chain.explorer_tx_url(&receipt.transaction_hash);
				if let Some(url) = &explorer {
					Display::kv("Explorer", url);
				}
				self.router.log(
					"sendTransaction",
					json!({ "receipt": receipt, "explorer": explorer }),
				);
			},
			Err(e) => self.failed("sendTransaction", e),
		}
	}

	fn failed(&mut self, action: &str, err: ViewError) {
		warn!(action, error = %err, "Wallet command failed");
		Display::error(&err.to_string());
		self.router.log(action, json!({ "error": err.to_string() }));
	}
}

fn now() -> u64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map(|d| d.as_secs())
		.unwrap_or_default()
}
