//! Check a single proxy against the default echo endpoint.
//!
//! ```text
//! cargo run --example check_one -- 198.51.100.4:8080
//! ```

use proxy_validator::{resolve_caller_ip, ProxyTester, ValidatorConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let candidate = std::env::args()
        .nth(1)
        .ok_or("usage: check_one <host:port>")?;

    let config = Arc::new(ValidatorConfig::default());
    println!("Resolving caller IP...");
    let caller_ip = resolve_caller_ip(&config).await?;
    println!("Current IP: {}", caller_ip);

    let tester = ProxyTester::new(config, caller_ip);
    match tester.test(&candidate).await {
        Ok(()) => println!("{} is an anonymous proxy", candidate),
        Err(e) => println!("{} rejected: {}", candidate, e),
    }

    Ok(())
}
