//! One module per route.

pub mod inventory;
pub mod marketplace;
pub mod mint;

pub use inventory::InventoryPage;
pub use marketplace::MarketplacePage;
pub use mint::MintPage;
