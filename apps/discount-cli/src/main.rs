//! # Discount CLI Entry Point
//!
//! ```text
//! discount company set --currency USD --discount-account 7600
//! discount po create --partner "Acme" --line "Widgets,4,25.00,10" --rate 10
//! discount po bill PO0001
//! discount bill discount BILL/2026/0001 --type amount --rate 20
//! discount bill refund BILL/2026/0001
//! ```
//!
//! The actual setup is in lib.rs for better testability.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    discount_cli::run().await
}
