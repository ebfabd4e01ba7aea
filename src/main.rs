use clap::Parser;
use salescope::cli::commands::{Cli, Commands};
use salescope::SaleScope;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let db_path = std::env::var("SALESCOPE_DB").unwrap_or_else(|_| "./salescope.db".into());
    let model_path =
        std::env::var("SALESCOPE_MODEL").unwrap_or_else(|_| "./salescope-model.json".into());

    let scope = match SaleScope::new(&db_path, &model_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error initializing salescope: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_command(scope, cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run_command(scope: SaleScope, cmd: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Commands::Restaurants => {
            let restaurants = scope.restaurants()?;
            println!("{}", serde_json::to_string_pretty(&restaurants)?);
        }
        Commands::Detect {
            restaurant,
            from,
            to,
        } => {
            let (start, end) = parse_range(&from, &to)?;
            let problems = scope.detect(restaurant, start, end)?;
            println!("{}", serde_json::to_string_pretty(&problems)?);
        }
        Commands::Analyze {
            restaurant,
            from,
            to,
        } => {
            let (start, end) = parse_range(&from, &to)?;
            let report = scope.analyze(restaurant, start, end).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Batch { from, to } => {
            let (start, end) = parse_range(&from, &to)?;
            let outcome = scope.analyze_batch(start, end).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::Train { from, to } => {
            let (start, end) = parse_range(&from, &to)?;
            let report = scope.train(start, end).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

fn parse_range(
    from: &str,
    to: &str,
) -> Result<(chrono::NaiveDate, chrono::NaiveDate), String> {
    let parse = |s: &str| {
        chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| format!("Invalid date '{s}'. Use YYYY-MM-DD"))
    };
    Ok((parse(from)?, parse(to)?))
}
