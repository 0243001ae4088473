use std::time::Duration;

use clap::Parser;
use stratum_link::mem::MemDriver;
use tracing_subscriber::EnvFilter;

use stratum_bench::client::BenchClient;
use stratum_bench::config::Config;
use stratum_bench::{repl, report, runner};

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::parse();

    println!("stratum-bench");
    println!("  Endpoint:  {}", config.endpoint);
    println!("  Database:  {}", config.database);
    println!("  Path:      {}", config.path);
    println!("  Table:     {}", config.table_name);
    println!("  Profile:   {}", config.profile_label());
    println!("  Store:     {}", config.store_label());
    println!("  Rows:      {}", config.rows);
    println!();

    // The in-process backend; a network transport would be wired here by
    // implementing the stratum-link traits.
    let driver = match MemDriver::connect(
        &config.endpoint,
        &config.database,
        Duration::from_secs(config.connect_timeout_secs),
    ) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Connection failed: {}", e);
            std::process::exit(1);
        }
    };

    let client = BenchClient::new(
        driver.scheme_client(),
        driver.session_pool(),
        driver.table_client(),
        &config.database,
        &config.path,
    );

    // Provision the namespace prefix once, before either mode runs.
    if let Err(e) = client.ensure_namespace() {
        eprintln!("Provisioning {} failed: {}", client.prefix(), e);
        std::process::exit(1);
    }

    if config.interactive {
        if let Err(e) = repl::run_loop(&client, &config) {
            eprintln!("Interactive loop failed: {}", e);
            std::process::exit(1);
        }
        return;
    }

    // One-shot batch mode: terminal failures are fatal.
    let record = match runner::run_once(&client, &config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Benchmark run failed: {}", e);
            std::process::exit(1);
        }
    };

    match report::write_report(&record, &config.output_dir) {
        Ok(path) => println!("Report written to {}", path),
        Err(e) => eprintln!("Failed to write report: {}", e),
    }
}
