//! nvs-emu CLI
//!
//! Command-line interface for inspecting and editing an NVS backing file.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use nvs_emu::record::VALUE_FIELD_SIZE;
use nvs_emu::{Config, NvsStore, Result, Value};
use tracing_subscriber::{fmt, EnvFilter};

/// nvs-emu CLI
#[derive(Parser, Debug)]
#[command(name = "nvs-cli")]
#[command(about = "CLI for the file-backed NVS emulator")]
#[command(version)]
struct Args {
    /// Backing file
    #[arg(short, long, default_value = nvs_emu::config::DEFAULT_DATA_FILE)]
    file: PathBuf,

    /// Record table capacity
    #[arg(short, long, default_value_t = nvs_emu::table::DEFAULT_CAPACITY)]
    capacity: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Store an unsigned 32-bit value
    SetU32 {
        /// The key to set
        key: String,

        /// The value to set
        value: u32,
    },

    /// Store a string value
    SetStr {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Read an unsigned 32-bit value
    GetU32 {
        /// The key to get
        key: String,
    },

    /// Read a string value
    GetStr {
        /// The key to get
        key: String,

        /// Destination buffer size in bytes
        #[arg(long, default_value_t = VALUE_FIELD_SIZE)]
        buf_len: usize,
    },

    /// Delete a key
    Delete {
        /// The key to delete
        key: String,
    },

    /// List every record in the backing file
    List,

    /// Run the reference walkthrough against the backing file
    Demo,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,nvs_emu=debug"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    let config = Config::builder()
        .data_file(&args.file)
        .capacity(args.capacity)
        .build();

    if let Err(e) = run(config, args.command) {
        tracing::error!("{}", e);
        process::exit(1);
    }
}

fn run(config: Config, command: Commands) -> Result<()> {
    let mut store = NvsStore::open(config)?;

    match command {
        Commands::SetU32 { key, value } => {
            store.set_uint32(&key, value)?;
            store.commit()?;
        }
        Commands::SetStr { key, value } => {
            store.set_string(&key, &value)?;
            store.commit()?;
        }
        Commands::GetU32 { key } => {
            println!("{}", store.get_uint32(&key)?);
        }
        Commands::GetStr { key, buf_len } => {
            println!("{}", store.get_string(&key, buf_len)?);
        }
        Commands::Delete { key } => {
            store.delete(&key)?;
            store.commit()?;
        }
        Commands::List => {
            for record in store.records() {
                let value = match record.value() {
                    Value::Uint32(v) => v.to_string(),
                    Value::Text(t) => format!("{:?}", t.as_str()),
                };
                println!("{:<31} {:<6} {}", record.key(), record.kind(), value);
            }
        }
        Commands::Demo => demo(&mut store)?,
    }

    Ok(())
}

/// Set, read back, delete and commit a few keys, then reload
fn demo(store: &mut NvsStore) -> Result<()> {
    let rule = "=".repeat(80);

    println!("set_uint32 sample_rate = 44100");
    store.set_uint32("sample_rate", 44100)?;
    println!("get_uint32 sample_rate -> {}", store.get_uint32("sample_rate")?);
    println!("{}", rule);

    println!("set_string name = Paul-M");
    store.set_string("name", "Paul-M")?;
    println!("get_string name -> {}", store.get_string("name", VALUE_FIELD_SIZE)?);
    println!("{}", rule);

    println!("set_uint32 baud_rate = 115200");
    store.set_uint32("baud_rate", 115200)?;
    println!("{}", rule);

    println!("delete sample_rate");
    store.delete("sample_rate")?;
    println!("{}", rule);

    let report = store.commit()?;
    println!(
        "commit: {} records in {} pages ({} tombstones skipped)",
        report.records_written, report.pages_written, report.tombstones_skipped
    );
    println!("{}", rule);

    store.deinit();

    let report = reload(store)?;
    println!(
        "init: {} loaded, {} corrupted",
        report.loaded, report.corrupted
    );

    Ok(())
}

#[cfg(feature = "fault-injection")]
fn reload(store: &mut NvsStore) -> Result<nvs_emu::LoadReport> {
    println!("init with simulated corruption");
    store.init_simulating_corruption()
}

#[cfg(not(feature = "fault-injection"))]
fn reload(store: &mut NvsStore) -> Result<nvs_emu::LoadReport> {
    println!("init");
    store.init()
}
