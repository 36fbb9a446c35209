//! Logging context example
//!
//! Nested contexts name the default logger and may override its level.
//! MDC entries show up wherever the pattern has `%X`.
//!
//! Run with: cargo run --example context_logging

use rust_hierarchical_logger::prelude::*;
use rust_hierarchical_logger::{configure_with, default_logger_name, flush, mdc};

fn handle_request(id: u32) -> Result<()> {
    let _ctx = LogContext::new("request")?;
    let _id = mdc::put_scoped("id", id);
    info!("handling");
    {
        let _db = LogContext::with_level("db", LogLevel::Trace)?;
        trace!("query plan for request {}", id);
        debug!("logger is {}", default_logger_name());
    }
    debug!("done");
    Ok(())
}

fn main() -> Result<()> {
    println!("=== Rust Hierarchical Logger - Context Logging Example ===\n");

    let config = Configuration::builder()
        .root_level(LogLevel::Debug)
        .root_appender("console")
        .appender(
            "console",
            AppenderConfig::console()
                .with_color(true)
                .with_layout(LayoutConfig::pattern("%-5p %-20c %X - %m%n")),
        )
        .build()?;
    configure_with(&config)?;

    info!("at the root");
    {
        let server = LogContext::new("server")?;
        info!("server context");
        server.set_level(LogLevel::Info);
        debug!("hidden: server is at INFO now");
        for id in 1..=2 {
            handle_request(id)?;
        }
    }
    info!("back at the root");

    println!("\n=== Example completed successfully ===");
    flush()
}
