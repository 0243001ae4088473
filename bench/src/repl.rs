//! Interactive command dispatcher.
//!
//! A blocking read loop with a `> ` prompt. Each line is trimmed and mapped
//! to a handler by exact name; anything else prints `Unsupported command` and
//! re-prompts without touching state. Handler failures print with operation
//! context and the loop continues; only `exit` (or end of input) ends it.

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use stratum_link::{Result, SchemeClient, SessionPool, TableClient};

use crate::client::BenchClient;
use crate::config::Config;
use crate::generator::{generate_rows, KeySpec, ValueSpec};
use crate::schema::TableSchema;

/// Commands understood by the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Create,
    Describe,
    Upsert,
    Stats,
    Drop,
    Exit,
}

impl Command {
    /// Exact-match mapping from a trimmed input line.
    pub fn parse(line: &str) -> Option<Self> {
        match line {
            "create" => Some(Command::Create),
            "describe" => Some(Command::Describe),
            "upsert" => Some(Command::Upsert),
            "stats" => Some(Command::Stats),
            "drop" => Some(Command::Drop),
            "exit" => Some(Command::Exit),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Command::Create => "create",
            Command::Describe => "describe",
            Command::Upsert => "upsert",
            Command::Stats => "stats",
            Command::Drop => "drop",
            Command::Exit => "exit",
        }
    }
}

/// Whether the loop keeps running after a dispatched line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Dispatcher state: the collaborators plus the running stats accumulator,
/// which lives here — in the caller of the aggregator — and nowhere else.
pub struct Repl<'a, S, P, T> {
    client: &'a BenchClient<S, P, T>,
    config: &'a Config,
    schema: TableSchema,
    keys: KeySpec,
    values: ValueSpec,
    total_data_size: u64,
}

impl<'a, S, P, T> Repl<'a, S, P, T>
where
    S: SchemeClient,
    P: SessionPool,
    T: TableClient,
{
    pub fn new(client: &'a BenchClient<S, P, T>, config: &'a Config) -> Result<Self> {
        Ok(Self {
            client,
            config,
            schema: config.table_schema()?,
            keys: config.key_spec(),
            values: config.value_spec(),
            total_data_size: 0,
        })
    }

    /// Dispatch one input line. Failures are printed, never propagated: the
    /// loop must survive them.
    pub fn dispatch(&mut self, line: &str) -> Flow {
        let line = line.trim();
        if line.is_empty() {
            return Flow::Continue;
        }
        let Some(command) = Command::parse(line) else {
            println!("Unsupported command");
            return Flow::Continue;
        };
        if command == Command::Exit {
            return Flow::Exit;
        }
        if let Err(e) = self.run(command) {
            println!(
                "{} failed for table {} under {}: {}",
                command.name(),
                self.schema.name,
                self.client.prefix(),
                e
            );
        }
        Flow::Continue
    }

    fn run(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Create => self.client.create_table(&self.schema, self.config.create_mode()),
            Command::Describe => self.describe(),
            Command::Upsert => self.upsert(),
            Command::Stats => self.stats().map(|_| ()),
            Command::Drop => self.client.drop_table(&self.schema.name, false),
            Command::Exit => Ok(()),
        }
    }

    fn describe(&self) -> Result<()> {
        let desc = self.client.describe_table(&self.schema.name)?;
        println!("> describe table: {}", desc.name);
        for column in &desc.columns {
            println!("column, name: {}, type: {}", column.name, column.ty);
        }
        Ok(())
    }

    fn upsert(&self) -> Result<()> {
        let rows = generate_rows(self.config.rows, &self.keys, &self.values);
        self.client.bulk_load(&self.schema, &rows)?;
        Ok(())
    }

    /// Print per-partition stats and the running total, then reset the
    /// accumulator. Returns the total that was printed.
    fn stats(&mut self) -> Result<u64> {
        let (partitions, total) = self.client.partition_stats(&self.schema.name)?;
        for stat in &partitions {
            println!(
                "part_idx: {}, row_count: {}, data_size: {}",
                stat.partition_index, stat.row_count, stat.data_size
            );
        }
        self.total_data_size += total;
        let printed = self.total_data_size;
        println!("Total data size is: {}", printed);
        self.total_data_size = 0;
        Ok(printed)
    }
}

/// Blocking readline loop. Terminates on `exit`, end of input, or an
/// unrecoverable readline failure.
pub fn run_loop<S, P, T>(client: &BenchClient<S, P, T>, config: &Config) -> anyhow::Result<()>
where
    S: SchemeClient,
    P: SessionPool,
    T: TableClient,
{
    let mut repl = Repl::new(client, config)?;
    let mut rl = DefaultEditor::new()?;
    println!("Commands: create, describe, upsert, stats, drop, exit");

    loop {
        match rl.readline("> ") {
            Ok(line) => {
                let _ = rl.add_history_entry(line.as_str());
                if repl.dispatch(&line) == Flow::Exit {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use stratum_link::mem::{MemDriver, MemSchemeClient, MemSessionPool, MemTableClient};

    use super::*;
    use crate::client::BenchClient;
    use crate::config::Config;
    use clap::Parser;

    type MemBenchClient = BenchClient<MemSchemeClient, MemSessionPool, MemTableClient>;

    fn test_config() -> Config {
        Config::parse_from([
            "stratum-bench",
            "--rows",
            "100",
            "--payload-size",
            "32",
            "--settle-ms",
            "0",
        ])
    }

    fn test_client(config: &Config) -> MemBenchClient {
        let driver = MemDriver::connect(
            &config.endpoint,
            &config.database,
            Duration::from_secs(config.connect_timeout_secs),
        )
        .unwrap();
        let client = BenchClient::new(
            driver.scheme_client(),
            driver.session_pool(),
            driver.table_client(),
            &config.database,
            &config.path,
        );
        client.ensure_namespace().unwrap();
        client
    }

    #[test]
    fn unknown_command_changes_nothing() {
        let config = test_config();
        let client = test_client(&config);
        let mut repl = Repl::new(&client, &config).unwrap();

        assert_eq!(repl.dispatch("frobnicate"), Flow::Continue);
        assert_eq!(repl.total_data_size, 0);
        // Loop still accepts commands afterwards.
        assert_eq!(repl.dispatch("create"), Flow::Continue);
        assert!(client.describe_table(&config.table_name).is_ok());
    }

    #[test]
    fn exit_terminates_the_loop() {
        let config = test_config();
        let client = test_client(&config);
        let mut repl = Repl::new(&client, &config).unwrap();
        assert_eq!(repl.dispatch("  exit  "), Flow::Exit);
    }

    #[test]
    fn stats_resets_the_accumulator() {
        let config = test_config();
        let client = test_client(&config);
        let mut repl = Repl::new(&client, &config).unwrap();

        assert_eq!(repl.dispatch("create"), Flow::Continue);
        assert_eq!(repl.dispatch("upsert"), Flow::Continue);

        let first = repl.stats().unwrap();
        let second = repl.stats().unwrap();
        assert!(first > 0);
        // Same total both times, not double: nothing carried over.
        assert_eq!(first, second);
        assert_eq!(repl.total_data_size, 0);
    }

    #[test]
    fn failures_keep_the_loop_alive() {
        let config = test_config();
        let client = test_client(&config);
        let mut repl = Repl::new(&client, &config).unwrap();

        // Drop before create: reportable error, loop continues.
        assert_eq!(repl.dispatch("drop"), Flow::Continue);
        assert_eq!(repl.dispatch("create"), Flow::Continue);
        assert_eq!(repl.dispatch("drop"), Flow::Continue);
    }
}
