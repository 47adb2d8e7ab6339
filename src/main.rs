use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use pricegrid_rs::api;
use pricegrid_rs::client::GridClient;
use pricegrid_rs::config::AppConfig;
use pricegrid_rs::engine::view::{render_table, AxisFilter, GridView};
use pricegrid_rs::engine::Grid;
use pricegrid_rs::{seed, telemetry};

#[derive(Debug, Parser)]
#[command(name = "pricegrid", version, about = "Height x width price grid service")]
struct Cli {
    /// Configuration file (TOML); missing file means defaults
    #[arg(short, long, global = true, default_value = "pricegrid.toml")]
    config: String,

    /// Server base URL for client commands
    #[arg(long, global = true, default_value = "http://127.0.0.1:5000")]
    server: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve {
        #[arg(long)]
        port: Option<u16>,
        #[arg(long)]
        seed: Option<PathBuf>,
    },
    /// Print the grid, optionally narrowed to one height and/or width
    Show {
        #[arg(long, default_value = "all")]
        height: AxisFilter,
        #[arg(long, default_value = "all")]
        width: AxisFilter,
    },
    /// Set the price at a row/column position
    SetCell {
        row: usize,
        col: usize,
        #[arg(allow_negative_numbers = true)]
        value: f64,
    },
    /// Append a width column filled with the default price
    AddColumn { width: f64 },
    /// Append a height row with one price per width
    AddRow {
        height: f64,
        #[arg(required = true, num_args = 1.., allow_negative_numbers = true)]
        prices: Vec<f64>,
    },
    /// Print the seed the server would start from, as JSON
    Dump {
        #[arg(long)]
        seed: Option<PathBuf>,
    },
    /// Print available HTTP routes
    Routes,
}

fn print_grid(grid: &Grid, height: AxisFilter, width: AxisFilter) {
    let view = GridView::build(grid, height, width);
    if view.is_empty() {
        println!("(nothing to show)");
        return;
    }
    print!("{}", render_table(&view));
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // load .env

    let cli = Cli::parse();
    let mut config = AppConfig::load(&cli.config)?;
    telemetry::init_tracing(&config.telemetry.log_filter);

    let client = GridClient::new(&cli.server);

    match cli.command.unwrap_or(Command::Serve { port: None, seed: None }) {
        Command::Serve { port, seed: seed_path } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if seed_path.is_some() {
                config.grid.seed_path = seed_path;
            }
            telemetry::init_metrics(config.telemetry.metrics_port)?;

            let store = seed::bootstrap(&config).context("failed to load seed grid")?;
            let (heights, widths) = store.dimensions();
            let policy = store.policy();
            info!(
                heights,
                widths,
                default_fill = policy.default_fill,
                unique_labels = policy.unique_labels,
                "Starting price grid server on {}",
                config.server_address()
            );
            api::serve(&config, Arc::new(store)).await?;
        }
        Command::Show { height, width } => {
            let grid = client.fetch().await?;
            print_grid(&grid, height, width);
        }
        Command::SetCell { row, col, value } => {
            let grid = client.set_cell(row, col, value).await?;
            print_grid(&grid, AxisFilter::All, AxisFilter::All);
        }
        Command::AddColumn { width } => {
            let grid = client.add_column(width).await?;
            print_grid(&grid, AxisFilter::All, AxisFilter::All);
        }
        Command::AddRow { height, prices } => {
            let grid = client.fetch().await?;
            if prices.len() != grid.widths.len() {
                bail!(
                    "expected {} prices (one per width), got {}",
                    grid.widths.len(),
                    prices.len()
                );
            }
            let grid = client.add_row(height, &prices).await?;
            print_grid(&grid, AxisFilter::All, AxisFilter::All);
        }
        Command::Dump { seed: seed_path } => {
            if seed_path.is_some() {
                config.grid.seed_path = seed_path;
            }
            let store = seed::bootstrap(&config)?;
            let data = seed::from_grid(&store.read());
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        Command::Routes => api::server::print_routes(),
    }

    Ok(())
}
