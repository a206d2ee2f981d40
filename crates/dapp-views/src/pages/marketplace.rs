//! `/sale-sample`: tokens listed for sale.

use crate::card::{price_label, SampleCard};
use crate::console::DebugConsole;
use crate::guard::RefetchGuard;
use crate::{report, signed_in, ViewError};
use alloy_primitives::Address;
use dapp_provider::TokenProvider;
use dapp_session::SessionContext;
use dapp_types::{is_buyable, is_rentable, short_address, TokenRecord};
use futures::future::join_all;
use serde_json::json;
use tracing::{debug, info, instrument, warn};

/// A listed token with its ownership and rental status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleCard {
	pub record: TokenRecord,
	pub owner: Option<Address>,
	pub user: Option<Address>,
	/// Everyone but the owner can buy.
	pub is_buyable: bool,
	pub is_rentable: bool,
}

impl SaleCard {
	fn new(record: TokenRecord) -> Self {
		Self {
			record,
			owner: None,
			user: None,
			is_buyable: false,
			is_rentable: false,
		}
	}

	fn render(&self) -> String {
		let card = SampleCard::new(&self.record.token_type);
		let owner = self
			.owner
			.as_ref()
			.map(short_address)
			.unwrap_or_else(|| "?".to_string());
		let buy = if self.is_buyable { "[ Buy! ]" } else { "[ Buy! ] (disabled)" };
		let rented = if self.is_rentable { "rented" } else { "not rented" };
		format!(
			"#{} {}\n    {}  {}  owner {}  {}",
			self.record.token_id,
			card.render(),
			price_label(&self.record),
			buy,
			owner,
			rented
		)
	}
}

pub struct MarketplacePage {
	context: SessionContext,
	guard: RefetchGuard<Option<Address>>,
	cards: Vec<SaleCard>,
}

impl MarketplacePage {
	pub fn new(context: SessionContext) -> Self {
		Self {
			context,
			guard: RefetchGuard::default(),
			cards: Vec::new(),
		}
	}

	pub fn cards(&self) -> &[SaleCard] {
		&self.cards
	}

	fn card(&self, token_id: &str) -> Option<&SaleCard> {
		self.cards.iter().find(|c| c.record.token_id == token_id)
	}

	/// Refreshes when the account changed since the last fetch.
	pub async fn enter(&mut self, console: &mut DebugConsole) {
		let account = self.context.account().await;
		if self.guard.should_fetch(&account) {
			self.refresh(console).await;
		}
	}

	/// Makes the next [`Self::enter`] fetch even if the account is unchanged.
	pub fn invalidate(&mut self) {
		self.guard.reset();
	}

	/// Reloads the listings and the status of every card.
	#[instrument(skip_all)]
	pub async fn refresh(&mut self, console: &mut DebugConsole) -> bool {
		match self.load().await {
			Ok(cards) => {
				debug!(count = cards.len(), "Loaded listings");
				let records: Vec<_> = cards.iter().map(|c| &c.record).collect();
				console.log("getOnSaleTokens", &records);
				self.cards = cards;
				true
			},
			Err(e) => {
				report(console, "getOnSaleTokens", &e);
				false
			},
		}
	}

	async fn load(&self) -> Result<Vec<SaleCard>, ViewError> {
		let provider = self.context.provider().await?;
		let account = self.context.account().await;
		let records = provider.get_on_sale_tokens().await?;

		let cards = join_all(
			records
				.into_iter()
				.map(|record| card_status(&provider, account, record)),
		)
		.await;
		Ok(cards)
	}

	/// Buys a listed token at its listed price.
	///
	/// Listings are reloaded only when the purchase went through.
	#[instrument(skip(self, console))]
	pub async fn buy(&mut self, token_id: &str, console: &mut DebugConsole) -> bool {
		match self.try_buy(token_id).await {
			Ok(()) => {
				info!(token_id, "Purchased token");
				self.refresh(console).await
			},
			Err(e) => {
				report(console, "purchaseToken", &e);
				false
			},
		}
	}

	async fn try_buy(&self, token_id: &str) -> Result<(), ViewError> {
		let card = self
			.card(token_id)
			.ok_or_else(|| ViewError::Rejected(format!("Token {token_id} is not listed")))?;
		if !card.is_buyable {
			return Err(ViewError::Rejected(format!(
				"Token {token_id} cannot be bought by its owner"
			)));
		}

		let (provider, account) = signed_in(&self.context).await?;
		provider
			.purchase_token(account, token_id, &card.record.token_price)
			.await?;
		Ok(())
	}

	/// Rents a token until `expires` (unix seconds), then re-reads its user.
	#[instrument(skip(self, console))]
	pub async fn rent(&mut self, token_id: &str, expires: u64, console: &mut DebugConsole) -> bool {
		match self.try_rent(token_id, expires).await {
			Ok(user) => {
				info!(token_id, %user, "Rented token");
				if let Some(card) = self.cards.iter_mut().find(|c| c.record.token_id == token_id) {
					card.user = Some(user);
					card.is_rentable = is_rentable(&user);
				}
				console.log("setUser", json!({ "tokenId": token_id, "user": user }));
				true
			},
			Err(e) => {
				report(console, "setUser", &e);
				false
			},
		}
	}

	async fn try_rent(&self, token_id: &str, expires: u64) -> Result<Address, ViewError> {
		if self.card(token_id).is_none() {
			return Err(ViewError::Rejected(format!("Token {token_id} is not listed")));
		}
		let (provider, account) = signed_in(&self.context).await?;
		provider.set_user(account, token_id, expires).await?;
		Ok(provider.user_of(token_id).await?)
	}

	pub fn render(&self) -> String {
		if self.cards.is_empty() {
			return "No tokens on sale.".to_string();
		}
		self.cards
			.iter()
			.map(SaleCard::render)
			.collect::<Vec<_>>()
			.join("\n")
	}
}

/// Reads owner and user of one listing concurrently.
///
/// A failed lookup leaves the matching status at its default.
async fn card_status(
	provider: &TokenProvider,
	account: Option<Address>,
	record: TokenRecord,
) -> SaleCard {
	let token_id = record.token_id.clone();
	let (owner, user) = futures::join!(provider.owner_of(&token_id), provider.user_of(&token_id));

	let mut card = SaleCard::new(record);
	match owner {
		Ok(owner) => {
			card.is_buyable = account.is_some_and(|account| is_buyable(&owner, &account));
			card.owner = Some(owner);
		},
		Err(e) => warn!(%token_id, error = %e, "ownerOf failed"),
	}
	match user {
		Ok(user) => {
			card.is_rentable = is_rentable(&user);
			card.user = Some(user);
		},
		Err(e) => warn!(%token_id, error = %e, "userOf failed"),
	}
	card
}
