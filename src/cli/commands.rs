use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "salescope", about = "Delivery-platform sales anomaly detection and attribution")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List known restaurants
    Restaurants,
    /// Flag problem days for one restaurant (no cause attribution)
    Detect {
        /// Restaurant id
        restaurant: i64,
        /// Start of date range (YYYY-MM-DD)
        #[arg(long)]
        from: String,
        /// End of date range (YYYY-MM-DD), inclusive
        #[arg(long)]
        to: String,
    },
    /// Full diagnosis for one restaurant: detection, rule attribution and
    /// the model's explanation side by side
    Analyze {
        /// Restaurant id
        restaurant: i64,
        /// Start of date range (YYYY-MM-DD)
        #[arg(long)]
        from: String,
        /// End of date range (YYYY-MM-DD), inclusive
        #[arg(long)]
        to: String,
    },
    /// Diagnose every restaurant over a range
    Batch {
        /// Start of date range (YYYY-MM-DD)
        #[arg(long)]
        from: String,
        /// End of date range (YYYY-MM-DD), inclusive
        #[arg(long)]
        to: String,
    },
    /// Train the global sales model on pooled history and persist it
    Train {
        /// Start of training range (YYYY-MM-DD)
        #[arg(long)]
        from: String,
        /// End of training range (YYYY-MM-DD), inclusive
        #[arg(long)]
        to: String,
    },
}
