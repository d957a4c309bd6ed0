use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "devserver-cli")]
#[command(about = "Inspect the routing policy of a running spa-devserver", long_about = None)]
struct Cli {
    /// Base URL of the inspection endpoints
    #[arg(short, long, default_value = "http://localhost:8080/__devserver")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show server version, environment and public path
    Status,
    /// List the compiled rewrite rules in evaluation order
    Rules,
    /// Ask the server how it would classify paths
    Resolve {
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Status => {
            let res = client.get(format!("{}/status", base)).send().await?;
            print_response(res).await?;
        }
        Commands::Rules => {
            let res = client.get(format!("{}/rules", base)).send().await?;
            print_response(res).await?;
        }
        Commands::Resolve { paths } => {
            for path in paths {
                let res = client
                    .get(format!("{}/resolve", base))
                    .query(&[("path", path.as_str())])
                    .send()
                    .await?;
                print_response(res).await?;
            }
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
