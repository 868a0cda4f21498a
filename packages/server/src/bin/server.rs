//! Huddle project messaging gateway.
//!
//! Run with:
//! ```not_rust
//! HUDDLE_JWT_SECRET=... cargo run --bin huddle-server -- --directory-file directory.json
//! ```

use clap::Parser;
use huddle_server::Config;
use huddle_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    let config = Config::parse();

    // Initialize tracing
    setup_logger(
        env!("CARGO_BIN_NAME"),
        &config.log_level,
        config.log_format(),
    );

    // Run the server
    if let Err(e) = huddle_server::run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
