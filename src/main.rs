use std::error::Error;
use std::process;

use clap::{Parser, Subcommand};
use log::{error, info};

use decode_lod::api::DecodeClient;
use decode_lod::config::Config;
use decode_lod::onto;
use decode_lod::record;

/// Linked Open Data export of the DECODE database.
#[derive(Parser)]
#[command(name = "decode-lod", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Harvest record summaries and details from the DECODE API into JSON files.
    Fetch,
    /// Map harvested detail records onto the DECRYPT ontology and write Turtle.
    Populate,
}

fn fetch(config: &Config) -> Result<(), Box<dyn Error>> {
    let client = DecodeClient::new(config);
    info!("fetching all records from the '{}' table", config.table);
    let summaries = client.fetch_all_summaries(&config.table)?;
    info!("fetched {} record summaries", summaries.len());
    record::save_json(&summaries, &config.summary_file)?;
    info!("saved record summaries to {}", config.summary_file);
    info!("fetching detailed information for each record");
    let details = client.fetch_all_details(&config.table, &summaries);
    info!("fetched details for {} records", details.len());
    record::save_json(&details, &config.detail_file)?;
    info!("saved detailed records to {}", config.detail_file);
    info!("done");
    Ok(())
}

fn populate(config: &Config) -> Result<(), Box<dyn Error>> {
    let mut graph = onto::load_schema(&config.schema_file)?;
    let records = record::load_details(&config.detail_file)?;
    info!("loaded {} detail records from {}", records.len(), config.detail_file);
    let asserted = onto::populate(&mut graph, &config.namespace, &records)?;
    info!("asserted {asserted} triples for {} records", records.len());
    onto::serialize(&graph, &config.prefix, &config.namespace, &config.output_file)?;
    info!("wrote populated ontology to {}", config.output_file);
    Ok(())
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = Config::load()?;
    match cli.command {
        Command::Fetch => fetch(&config),
        Command::Populate => populate(&config),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(e) = run(Cli::parse()) {
        error!("{e}");
        process::exit(1);
    }
}
