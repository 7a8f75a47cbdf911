use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use serde_json::json;

#[derive(Parser)]
#[command(name = "shoalctl")]
#[command(about = "CLI client for a shoald server", long_about = None)]
struct Cli {
    /// Server host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port
    #[arg(long, default_value_t = 8080)]
    port: u16,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print server and index status
    Status,
    /// Run a query
    Search {
        #[arg(long)]
        q: String,
        #[arg(long)]
        topk: Option<usize>,
    },
    /// Start a build or incremental update
    Build {
        #[arg(long)]
        dataset: String,
        #[arg(long, default_value_t = 4)]
        threads: i64,
        #[arg(long, default_value = "true")]
        incremental: String,
    },
    /// Configure the periodic scheduler
    Scheduler {
        #[arg(long)]
        enabled: String,
        #[arg(long, default_value_t = 30)]
        interval_s: i64,
    },
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let base = format!("http://{}:{}", cli.host, cli.port);
    let client = reqwest::blocking::Client::new();

    let response = match cli.command {
        Command::Status => client.get(format!("{base}/status")).send()?,
        Command::Search { q, topk } => {
            let mut req = client.get(format!("{base}/search")).query(&[("q", q)]);
            if let Some(topk) = topk {
                req = req.query(&[("topk", topk.to_string())]);
            }
            req.send()?
        }
        Command::Build {
            dataset,
            threads,
            incremental,
        } => client
            .post(format!("{base}/build"))
            .json(&json!({
                "dataset_path": dataset,
                "threads": threads,
                "incremental": incremental,
            }))
            .send()?,
        Command::Scheduler { enabled, interval_s } => client
            .post(format!("{base}/scheduler"))
            .json(&json!({
                "enabled": enabled,
                "interval_s": interval_s,
            }))
            .send()?,
    };

    println!("{}", response.text()?);
    Ok(())
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                ErrorKind::MissingRequiredArgument => 2,
                _ => 1,
            };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(10);
    }
}
