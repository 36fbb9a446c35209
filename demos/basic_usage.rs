//! Basic logger usage example
//!
//! Demonstrates the default configuration, log levels and printf-style
//! formatting through the global registry.
//!
//! Run with: cargo run --example basic_usage

use rust_hierarchical_logger::prelude::*;
use rust_hierarchical_logger::{configure_default, flush, get_logger, set_level};

fn main() -> Result<()> {
    println!("=== Rust Hierarchical Logger - Basic Usage Example ===\n");

    // Root at DEBUG with a console appender
    configure_default()?;

    println!("1. Logging at different levels (TRACE is below the root level):");
    trace!("This is a trace message");
    debug!("This is a debug message");
    info!("This is an info message");
    warn!("This is a warning message");
    error!("This is an error message");
    fatal!("This is a fatal message");

    println!("\n2. Formatting:");
    info!("{} + {} = {}", 2, 3, 2 + 3);
    infof!("Format %d %g %s", 3, 2.71828, "foo");
    warnf!("%-8s|%5.1f%%", "cpu", 93.25);

    println!("\n3. Named loggers inherit their parent's level:");
    set_level("app", LogLevel::Warn);
    let db = get_logger("app.db");
    db.info("hidden: app.db inherits WARN from app");
    db.warn("shown: app.db is at WARN");
    db.set_level(LogLevel::Trace);
    db.trace("shown: app.db now has its own level");

    println!("\n=== Example completed successfully ===");
    flush()
}
