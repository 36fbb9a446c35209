//! File logging example
//!
//! Configures the global registry from log4j-style properties with a
//! console appender on the root and a file appender for one subtree.
//!
//! Run with: cargo run --example file_logging

use rust_hierarchical_logger::prelude::*;
use rust_hierarchical_logger::{configure_prop, flush, get_logger, mdc};

fn main() -> Result<()> {
    println!("=== Rust Hierarchical Logger - File Logging Example ===\n");

    let log_path = std::env::temp_dir().join("hierarchical_logger_demo.log");
    let properties = format!(
        "log4j.rootLogger=INFO, CA\n\
         log4j.logger.audit=DEBUG, FA\n\
         \n\
         log4j.appender.CA=ConsoleAppender\n\
         log4j.appender.CA.layout=PatternLayout\n\
         log4j.appender.CA.layout.ConversionPattern=%-4r [%t] %-5p %c - %m%n\n\
         \n\
         log4j.appender.FA=FileAppender\n\
         log4j.appender.FA.file={}\n\
         log4j.appender.FA.append=false\n\
         log4j.appender.FA.layout=PatternLayout\n\
         log4j.appender.FA.layout.ConversionPattern=%d{{ISO8601}} %-5p %c %X - %m%n\n",
        log_path.display()
    );
    configure_prop(&properties)?;

    info!("This goes to the console");

    let audit = get_logger("audit.login");
    mdc::put("user", "alice");
    audit.debug("Login attempt");
    audit.info("Login succeeded");
    mdc::clear();

    flush()?;
    println!("\nContents of {}:", log_path.display());
    let content = std::fs::read_to_string(&log_path)?;
    print!("{}", content);

    println!("\n=== Example completed successfully ===");
    Ok(())
}
