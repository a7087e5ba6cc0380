//! # Till Register Console
//!
//! ## Usage
//! ```bash
//! cargo run -p till-terminal --bin till
//! TILL_DB_PATH=./till_dev.db RUST_LOG=debug cargo run -p till-terminal --bin till
//! ```

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match till_terminal::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("till: {}", err);
            ExitCode::FAILURE
        }
    }
}
