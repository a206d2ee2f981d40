//! Commands accepted at the interactive prompt.

use clap::{Parser, Subcommand};

/// One prompt line, parsed without a binary name.
#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_version_flag = true)]
#[command(help_template = "{subcommands}")]
pub struct Line {
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
	/// Show a page: /, /sale-sample or /my-sample
	Goto { route: String },
	/// Connect the configured wallet
	Login,
	/// End the session
	Logout,
	/// Show the session and the wallet profile
	Whoami,
	/// Mint a new sample
	Mint,
	/// Reload the current page
	Refresh,
	/// Show the native balance of the account
	Balance,
	/// Sign a message with the account key
	Sign {
		#[arg(required = true, num_args = 1.., trailing_var_arg = true)]
		message: Vec<String>,
	},
	/// Send ether from the account
	Send { to: String, ether: String },
	/// Buy a listed token at its listed price
	Buy { token_id: String },
	/// Rent a listed token for the given number of seconds
	Rent { token_id: String, seconds: u64 },
	/// Grant or revoke the marketplace approval
	Approve,
	/// List an owned token for sale
	Sell { token_id: String, ether: String },
	/// Print the debug console
	Console,
	/// Leave the program
	#[command(alias = "exit")]
	Quit,
}

/// Parses one prompt line.
///
/// Returns `Ok(None)` for blank lines. Errors carry clap's rendered message,
/// which includes the help text when it was requested.
pub fn parse(line: &str) -> Result<Option<Command>, clap::Error> {
	let words: Vec<&str> = line.split_whitespace().collect();
	if words.is_empty() {
		return Ok(None);
	}
	Line::try_parse_from(words).map(|line| Some(line.command))
}
