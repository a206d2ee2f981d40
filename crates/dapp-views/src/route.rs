use std::fmt;
use std::str::FromStr;

/// The pages the application can show.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Route {
	/// `/`: mint a new sample.
	#[default]
	Mint,
	/// `/sale-sample`: tokens listed for sale.
	Marketplace,
	/// `/my-sample`: tokens owned by the current account.
	Inventory,
	/// Any other path.
	NotFound(String),
}

impl Route {
	pub fn path(&self) -> &str {
		match self {
			Route::Mint => "/",
			Route::Marketplace => "/sale-sample",
			Route::Inventory => "/my-sample",
			Route::NotFound(path) => path,
		}
	}

	/// Layout links as `(label, route)`, in header order.
	pub fn links() -> [(&'static str, Route); 3] {
		[
			("Main", Route::Mint),
			("MarketPlace", Route::Marketplace),
			("My Samples", Route::Inventory),
		]
	}
}

impl FromStr for Route {
	type Err = std::convert::Infallible;

	/// Accepts paths with or without the leading slash.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let trimmed = s.trim();
		let route = match trimmed.trim_start_matches('/') {
			"" => Route::Mint,
			"sale-sample" => Route::Marketplace,
			"my-sample" => Route::Inventory,
			_ => Route::NotFound(trimmed.to_string()),
		};
		Ok(route)
	}
}

impl fmt::Display for Route {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.path())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_known_routes() {
		assert_eq!("/".parse::<Route>().unwrap(), Route::Mint);
		assert_eq!("".parse::<Route>().unwrap(), Route::Mint);
		assert_eq!("/sale-sample".parse::<Route>().unwrap(), Route::Marketplace);
		assert_eq!("sale-sample".parse::<Route>().unwrap(), Route::Marketplace);
		assert_eq!("/my-sample".parse::<Route>().unwrap(), Route::Inventory);
	}

	#[test]
	fn test_unknown_route() {
		let route: Route = "/admin".parse().unwrap();
		assert_eq!(route, Route::NotFound("/admin".into()));
		assert_eq!(route.path(), "/admin");
	}

	#[test]
	fn test_paths_round_trip() {
		for (_, route) in Route::links() {
			assert_eq!(route.path().parse::<Route>().unwrap(), route);
		}
	}
}
