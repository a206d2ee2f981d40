use crate::console::DebugConsole;
use crate::layout;
use crate::pages::{InventoryPage, MarketplacePage, MintPage};
use crate::route::Route;
use dapp_session::SessionContext;
use tracing::{debug, info};

/// Owns the pages and the shared console, and remembers the current route.
///
/// Actions switch to the page they belong to before running. A successful
/// transaction marks the other pages it affects for refetch on their next visit.
pub struct ViewRouter {
	context: SessionContext,
	console: DebugConsole,
	route: Route,
	mint: MintPage,
	marketplace: MarketplacePage,
	inventory: InventoryPage,
}

impl ViewRouter {
	pub fn new(context: SessionContext, console: DebugConsole) -> Self {
		Self {
			mint: MintPage::new(context.clone()),
			marketplace: MarketplacePage::new(context.clone()),
			inventory: InventoryPage::new(context.clone()),
			context,
			console,
			route: Route::default(),
		}
	}

	pub fn route(&self) -> &Route {
		&self.route
	}

	pub fn console(&self) -> &DebugConsole {
		&self.console
	}

	pub fn mint_page(&self) -> &MintPage {
		&self.mint
	}

	pub fn marketplace_page(&self) -> &MarketplacePage {
		&self.marketplace
	}

	pub fn inventory_page(&self) -> &InventoryPage {
		&self.inventory
	}

	/// Shows `route`, fetching its data if the account changed since its last visit.
	pub async fn navigate(&mut self, route: Route) {
		if route != self.route {
			info!(from = %self.route, to = %route, "Navigating");
			self.route = route;
		}
		self.sync().await;
	}

	/// Lets the current page catch up with the session.
	pub async fn sync(&mut self) {
		match self.route {
			Route::Marketplace => self.marketplace.enter(&mut self.console).await,
			Route::Inventory => self.inventory.enter(&mut self.console).await,
			Route::Mint | Route::NotFound(_) => {},
		}
	}

	/// Reloads the current page unconditionally.
	pub async fn refresh(&mut self) -> bool {
		debug!(route = %self.route, "Explicit refresh");
		match self.route {
			Route::Marketplace => self.marketplace.refresh(&mut self.console).await,
			Route::Inventory => self.inventory.refresh(&mut self.console).await,
			Route::Mint | Route::NotFound(_) => false,
		}
	}

	pub async fn mint(&mut self) -> bool {
		self.navigate(Route::Mint).await;
		let minted = self.mint.mint(&mut self.console).await;
		if minted {
			self.inventory.invalidate();
		}
		minted
	}

	pub async fn buy(&mut self, token_id: &str) -> bool {
		self.navigate(Route::Marketplace).await;
		let bought = self.marketplace.buy(token_id, &mut self.console).await;
		if bought {
			self.inventory.invalidate();
		}
		bought
	}

	pub async fn rent(&mut self, token_id: &str, expires: u64) -> bool {
		self.navigate(Route::Marketplace).await;
		self.marketplace
			.rent(token_id, expires, &mut self.console)
			.await
	}

	pub async fn toggle_approval(&mut self) -> bool {
		self.navigate(Route::Inventory).await;
		self.inventory.toggle_approval(&mut self.console).await
	}

	pub async fn sell(&mut self, token_id: &str, price_in_ether: &str) -> bool {
		self.navigate(Route::Inventory).await;
		let listed = self
			.inventory
			.sell(token_id, price_in_ether, &mut self.console)
			.await;
		if listed {
			self.marketplace.invalidate();
		}
		listed
	}

	/// Records a message from outside the pages, such as wallet commands.
	pub fn log<T: serde::Serialize>(&mut self, label: &str, payload: T) {
		self.console.log(label, payload);
	}

	pub async fn render(&self) -> String {
		let session = self.context.session().await;
		let body = match &self.route {
			Route::Mint => self.mint.render(),
			Route::Marketplace => self.marketplace.render(),
			Route::Inventory => self.inventory.render(),
			Route::NotFound(path) => format!("404: no page at {path}"),
		};
		let console = self.console.render();
		layout::render(&self.route, &session, &body, console.as_deref())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_support::*;
	use alloy_dyn_abi::DynSolValue;
	use alloy_primitives::Address;
	use dapp_types::TokenRecord;

	const SALE: Address = Address::repeat_byte(0x02);

	#[tokio::test]
	async fn test_not_found_route() {
		let mut router = ViewRouter::new(SessionContext::default(), DebugConsole::default());
		router.navigate("/nowhere".parse().unwrap()).await;

		let page = router.render().await;
		assert!(page.contains("404: no page at /nowhere"));
		assert!(page.contains("not logged in"));
	}

	#[tokio::test]
	async fn test_actions_without_session_are_reported() {
		let mut router = ViewRouter::new(SessionContext::default(), DebugConsole::default());
		assert!(!router.mint().await);
		assert!(!router.toggle_approval().await);
		assert_eq!(router.route(), &Route::Inventory);
		assert!(router.console().last().is_some());
	}

	#[tokio::test]
	async fn test_navigation_is_guarded_until_logout() {
		let (client, log) = Script::new(ALICE)
			.sale(
				"getOnSaleTokens",
				&[],
				&[records(&[TokenRecord::new("1", "dragon", "1")])],
			)
			.mint("ownerOf", &[uint(1)], &[DynSolValue::Address(BOB)])
			.mint("userOf", &[uint(1)], &[DynSolValue::Address(BOB)])
			.build(confirm);
		let (mut manager, context) = session(client).await;
		let mut router = ViewRouter::new(context, DebugConsole::default());

		router.navigate(Route::Marketplace).await;
		router.navigate(Route::Mint).await;
		router.navigate(Route::Marketplace).await;
		assert_eq!(log.count("getOnSaleTokens"), 1);
		assert!(router.render().await.contains("[*MarketPlace]"));

		assert!(router.refresh().await);
		assert_eq!(log.count("getOnSaleTokens"), 2);

		manager.logout().await.unwrap();
		router.sync().await;
		// Account changed to none: the page refetches and reports the missing provider.
		assert_eq!(log.count("getOnSaleTokens"), 2);
		assert!(router
			.console()
			.last()
			.unwrap()
			.contains("Provider not initialized yet"));
	}

	#[tokio::test]
	async fn test_sale_shows_up_when_returning_to_marketplace() {
		let listed = TokenRecord::new("3", "dragon", "1500000000000000000");
		let (client, log) = Script::new(ALICE)
			.sale("getOnSaleTokens", &[], &[records(&[])])
			.sale("getOnSaleTokens", &[], &[records(&[listed])])
			.mint("ownerOf", &[uint(3)], &[DynSolValue::Address(ALICE)])
			.mint("userOf", &[uint(3)], &[DynSolValue::Address(Address::ZERO)])
			.mint(
				"isApprovedForAll",
				&[DynSolValue::Address(ALICE), DynSolValue::Address(SALE)],
				&[DynSolValue::Bool(true)],
			)
			.mint("balanceOf", &[DynSolValue::Address(ALICE)], &[uint(1)])
			.mint(
				"getTokens",
				&[DynSolValue::Address(ALICE)],
				&[records(&[TokenRecord::new("3", "dragon", "0")])],
			)
			.build(confirm);
		let (_manager, context) = session(client).await;
		let mut router = ViewRouter::new(context, DebugConsole::default());

		router.navigate(Route::Marketplace).await;
		assert!(router.marketplace_page().cards().is_empty());

		assert!(router.sell("3", "1.5").await);
		router.navigate(Route::Marketplace).await;
		assert_eq!(log.count("getOnSaleTokens"), 2);
		assert_eq!(router.marketplace_page().cards().len(), 1);
		assert_eq!(router.marketplace_page().cards()[0].record.token_id, "3");
	}

	#[tokio::test]
	async fn test_purchase_shows_up_when_returning_to_inventory() {
		let (client, log) = Script::new(ALICE)
			.mint(
				"isApprovedForAll",
				&[DynSolValue::Address(ALICE), DynSolValue::Address(SALE)],
				&[DynSolValue::Bool(false)],
			)
			.mint("balanceOf", &[DynSolValue::Address(ALICE)], &[uint(0)])
			.mint("balanceOf", &[DynSolValue::Address(ALICE)], &[uint(1)])
			.mint(
				"getTokens",
				&[DynSolValue::Address(ALICE)],
				&[records(&[TokenRecord::new("1", "dragon", "0")])],
			)
			.sale(
				"getOnSaleTokens",
				&[],
				&[records(&[TokenRecord::new("1", "dragon", "1")])],
			)
			.sale("getOnSaleTokens", &[], &[records(&[])])
			.mint("ownerOf", &[uint(1)], &[DynSolValue::Address(BOB)])
			.mint("userOf", &[uint(1)], &[DynSolValue::Address(Address::ZERO)])
			.build(confirm);
		let (_manager, context) = session(client).await;
		let mut router = ViewRouter::new(context, DebugConsole::default());

		router.navigate(Route::Inventory).await;
		assert!(router.inventory_page().cards().is_empty());

		assert!(router.buy("1").await);
		router.navigate(Route::Inventory).await;
		assert_eq!(log.count("balanceOf"), 2);
		assert_eq!(router.inventory_page().cards().len(), 1);
	}

	#[tokio::test]
	async fn test_failed_sale_keeps_marketplace_guarded() {
		let (client, log) = Script::new(ALICE)
			.sale("getOnSaleTokens", &[], &[records(&[])])
			.mint(
				"isApprovedForAll",
				&[DynSolValue::Address(ALICE), DynSolValue::Address(SALE)],
				&[DynSolValue::Bool(false)],
			)
			.mint("balanceOf", &[DynSolValue::Address(ALICE)], &[uint(0)])
			.build(confirm);
		let (_manager, context) = session(client).await;
		let mut router = ViewRouter::new(context, DebugConsole::default());

		router.navigate(Route::Marketplace).await;
		assert!(!router.sell("3", "1").await);
		router.navigate(Route::Marketplace).await;
		assert_eq!(log.count("getOnSaleTokens"), 1);
	}
}
