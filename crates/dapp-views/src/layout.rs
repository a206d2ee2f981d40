use crate::route::Route;
use dapp_types::{short_address, Session};

pub const TITLE: &str = "Smart Contract Practice";

/// Title bar with the navigation links; the active page is starred.
pub fn header(route: &Route, session: &Session) -> String {
	let links = Route::links()
		.iter()
		.map(|(label, target)| {
			if target == route {
				format!("[*{label}]")
			} else {
				format!("[{label}]")
			}
		})
		.collect::<Vec<_>>()
		.join(" ");

	let account = match session.account.as_ref() {
		Some(account) if session.is_authenticated => {
			format!("{} on chain {}", short_address(account), session.chain_id)
		},
		_ => "not logged in".to_string(),
	};

	format!("{TITLE}  {links}\n{account}")
}

/// Frames a page body under the header, with the console block last.
pub fn render(route: &Route, session: &Session, body: &str, console: Option<&str>) -> String {
	let mut out = header(route, session);
	out.push_str("\n\n");
	out.push_str(body);
	if let Some(console) = console {
		out.push_str("\n\n-- console --\n");
		out.push_str(console);
	}
	out
}
