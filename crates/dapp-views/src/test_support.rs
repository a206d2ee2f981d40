//! Scripted chain and session for page tests.

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, Bytes, B256, U256};
use dapp_config::{AuthNetwork, ChainConfig};
use dapp_provider::{ChainClient, Contract, Contracts, MockChainClient, ProviderError};
use dapp_session::{AuthOptions, MockAuthAdapter, SessionContext, SessionManager};
use dapp_types::{TokenRecord, TransactionReceipt, UserInfo};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

pub const ALICE: Address = Address::repeat_byte(0xaa);
pub const BOB: Address = Address::repeat_byte(0xbb);

const MINT_METHODS: &[&str] = &[
	"balanceOf",
	"ownerOf",
	"userOf",
	"tokenOfOwnerByIndex",
	"tokenTypes",
	"mintToken",
	"getTokens",
	"isApprovedForAll",
	"setApprovalForAll",
	"setUser",
];
const SALE_METHODS: &[&str] = &["setForSaleToken", "purchaseToken", "getOnSaleTokens"];

pub fn contracts() -> Contracts {
	Contracts::new(Address::repeat_byte(0x01), Address::repeat_byte(0x02))
}

pub fn receipt(status: bool) -> TransactionReceipt {
	TransactionReceipt::new(B256::repeat_byte(0x11), 7, status)
}

pub fn uint(value: u64) -> DynSolValue {
	DynSolValue::Uint(U256::from(value), 256)
}

pub fn records(items: &[TokenRecord]) -> DynSolValue {
	DynSolValue::Array(
		items
			.iter()
			.map(|r| {
				DynSolValue::Tuple(vec![
					DynSolValue::Uint(r.token_id.parse().unwrap(), 256),
					DynSolValue::String(r.token_type.clone()),
					DynSolValue::Uint(r.token_price.parse().unwrap(), 256),
				])
			})
			.collect(),
	)
}

/// Names of every contract method called, in call order.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
	fn push(&self, method: String) {
		self.0.lock().unwrap().push(method);
	}

	pub fn calls(&self) -> Vec<String> {
		self.0.lock().unwrap().clone()
	}

	pub fn count(&self, method: &str) -> usize {
		self.calls().iter().filter(|m| *m == method).count()
	}
}

type Responses = HashMap<Bytes, VecDeque<Result<Bytes, ProviderError>>>;

fn method_name(contracts: &Contracts, calldata: &[u8]) -> String {
	let lookup = |contract: &Contract, methods: &[&str]| {
		methods
			.iter()
			.find(|m| {
				contract
					.selector(m)
					.is_ok_and(|s| calldata.get(..4) == Some(s.as_slice()))
			})
			.map(|m| m.to_string())
	};
	lookup(&contracts.mint, MINT_METHODS)
		.or_else(|| lookup(&contracts.sale, SALE_METHODS))
		.unwrap_or_else(|| "unknown".to_string())
}

/// Query responses keyed by exact calldata.
///
/// Several responses for the same call are served in order; the last one
/// repeats.
pub struct Script {
	contracts: Contracts,
	account: Address,
	responses: Responses,
}

impl Script {
	pub fn new(account: Address) -> Self {
		Self {
			contracts: contracts(),
			account,
			responses: HashMap::new(),
		}
	}

	fn push(
		mut self,
		contract: &Contract,
		method: &str,
		args: &[DynSolValue],
		out: Result<Bytes, ProviderError>,
	) -> Self {
		let calldata = contract.encode(method, args).unwrap();
		self.responses.entry(calldata).or_default().push_back(out);
		self
	}

	pub fn mint(self, method: &str, args: &[DynSolValue], outputs: &[DynSolValue]) -> Self {
		let contract = self.contracts.mint.clone();
		let out = contract.encode_output(method, outputs).unwrap();
		self.push(&contract, method, args, Ok(out))
	}

	pub fn sale(self, method: &str, args: &[DynSolValue], outputs: &[DynSolValue]) -> Self {
		let contract = self.contracts.sale.clone();
		let out = contract.encode_output(method, outputs).unwrap();
		self.push(&contract, method, args, Ok(out))
	}

	pub fn mint_error(self, method: &str, args: &[DynSolValue], err: ProviderError) -> Self {
		let contract = self.contracts.mint.clone();
		self.push(&contract, method, args, Err(err))
	}

	/// Builds the client. `transact` decides the outcome of every transaction.
	pub fn build<F>(self, mut transact: F) -> (MockChainClient, CallLog)
	where
		F: FnMut(&str, Address, U256) -> Result<TransactionReceipt, ProviderError> + Send + 'static,
	{
		let log = CallLog::default();
		let mut client = MockChainClient::new();
		let account = self.account;

		client.expect_chain_id().return_const(1337u64);
		client
			.expect_accounts()
			.returning(move || Box::pin(async move { Ok(vec![account]) }));

		let responses = Arc::new(Mutex::new(self.responses));
		let query_contracts = self.contracts.clone();
		let query_log = log.clone();
		client.expect_query().returning(move |_, calldata| {
			let method = method_name(&query_contracts, &calldata);
			query_log.push(method.clone());
			let mut responses = responses.lock().unwrap();
			let out = match responses.get_mut(&calldata) {
				Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
				Some(queue) => queue.front().cloned().unwrap(),
				None => Err(ProviderError::ContractRevert(format!("unscripted {method}"))),
			};
			Box::pin(async move { out })
		});

		let tx_contracts = self.contracts;
		let tx_log = log.clone();
		client
			.expect_transact()
			.returning(move |from, _, calldata, value| {
				let method = method_name(&tx_contracts, &calldata);
				tx_log.push(method.clone());
				let out = transact(&method, from, value);
				Box::pin(async move { out })
			});

		(client, log)
	}
}

/// Transactions all succeed.
pub fn confirm(_: &str, _: Address, _: U256) -> Result<TransactionReceipt, ProviderError> {
	Ok(receipt(true))
}

/// Logs `client` in through a scripted adapter and returns the live session.
pub async fn session(client: MockChainClient) -> (SessionManager, SessionContext) {
	let (tx, _) = broadcast::channel(8);
	let client: Arc<dyn ChainClient> = Arc::new(client);

	let mut adapter = MockAuthAdapter::new();
	adapter
		.expect_subscribe()
		.returning(move || tx.subscribe());
	adapter
		.expect_init()
		.returning(|_| Box::pin(async { Ok(()) }));
	adapter.expect_connect().returning(move || {
		let client = client.clone();
		Box::pin(async move { Ok(client) })
	});
	adapter
		.expect_user_info()
		.returning(|| Box::pin(async { Ok(UserInfo::default()) }));
	adapter
		.expect_logout()
		.returning(|| Box::pin(async { Ok(()) }));

	let options = AuthOptions {
		chain: ChainConfig {
			chain_id: 1337,
			rpc_url: "http://127.0.0.1:8545".into(),
			display_name: "Local".into(),
			ticker: "ETH".into(),
			block_explorer: None,
		},
		client_id: "test".into(),
		network: AuthNetwork::Testnet,
	};

	let mut manager = SessionManager::new(Box::new(adapter), options, contracts());
	manager.initialize().await;
	manager.login().await.unwrap();
	let context = manager.context();
	(manager, context)
}
