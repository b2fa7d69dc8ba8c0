// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed List Property demo CLI
//!
//! Logs requests into an object-list field backed by SQLite.
//!
//! # Usage
//!
//! ```bash
//! # Log a request and print everything stored so far
//! typed-list-demo --db demo.db visit --user-agent curl/8.0 --email me@example.com
//!
//! # Show stored records without adding one
//! typed-list-demo --db demo.db show
//!
//! # Strict policy: fails, request records rely on the field dump
//! typed-list-demo --strict visit --user-agent curl/8.0
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use typed_list_property::demo::{RequestRecord, Requesters};
use typed_list_property::{Config, Record, RecordStore, SqliteStore, ValueKind};

#[derive(Parser, Debug)]
#[command(name = "typed-list-demo")]
#[command(about = "Object-list property demo - typed lists over string storage", long_about = None)]
struct Args {
    /// Database path (SQLite file)
    #[arg(short, long, default_value = "typed_list.db")]
    db: String,

    /// Require element types to provide custom serialization
    #[arg(long)]
    strict: bool,

    /// Store values as unbounded text instead of 500-character strings
    #[arg(long)]
    text: bool,

    /// Index stored values
    #[arg(long)]
    indexed: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Record a request, then print the stored lists
    Visit {
        /// Requesting user agent
        #[arg(short, long)]
        user_agent: String,

        /// Requester email
        #[arg(short, long)]
        email: Option<String>,

        /// Referring page
        #[arg(short, long)]
        referer: Option<String>,
    },
    /// Print the stored lists
    Show,
    /// Show statistics
    Stats,
    /// Clear all stored records
    Clear {
        /// Confirm deletion
        #[arg(long)]
        confirm: bool,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    let config = Config::builder()
        .db_path(&args.db)
        .require_custom_serialization(args.strict)
        .value_kind(if args.text {
            ValueKind::Text
        } else {
            ValueKind::ShortString
        })
        .indexed(args.indexed)
        .build();

    tracing::debug!("Configuration: {:?}", config);

    let store = SqliteStore::new(&config.db_path)?;
    let model = Requesters::define(&config)?;
    model.register(&store)?;

    match args.command {
        Commands::Visit {
            user_agent,
            email,
            referer,
        } => {
            let request = RequestRecord::new(user_agent)
                .with_email(email)
                .with_referer(referer);
            let record = model.visit(&store, request)?;
            print_record(&model, &record)?;
        }
        Commands::Show => {
            let record = model.load(&store)?;
            print_record(&model, &record)?;
        }
        Commands::Stats => {
            let record = model.load(&store)?;
            println!("Records stored: {}", store.count()?);
            for (field, values) in record.slots() {
                let longest = values.iter().map(|v| v.chars().count()).max().unwrap_or(0);
                println!(
                    "  {}: {} items, longest {} chars",
                    field,
                    values.len(),
                    longest
                );
            }
        }
        Commands::Clear { confirm } => {
            if confirm {
                store.clear()?;
                println!("All records cleared.");
            } else {
                println!("Use --confirm to actually delete records.");
            }
        }
    }

    Ok(())
}

fn print_record(model: &Requesters, record: &Record) -> Result<()> {
    let requests = model.records.get(record)?;
    println!("Requests received ({}):", requests.len());
    for (i, r) in requests.iter().enumerate() {
        println!(
            "  {}. {} {} {} {:.3}",
            i + 1,
            r.email.as_deref().unwrap_or("-"),
            r.user_agent,
            r.referer.as_deref().unwrap_or("-"),
            r.timestamp
        );
    }

    let salts = model.salts.get(record)?;
    println!("Salts stored:");
    for salt in &salts {
        println!("  {}", salt);
    }

    Ok(())
}
