pub mod commands;
pub mod seed;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "bepviet")]
#[command(about = "Bếp Việt - community recipes and pantry matching", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the API server
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long, env = "HOST")]
        host: Option<String>,
    },

    /// Run database migrations
    Migrate,

    /// Load recipes from a JSON file into the database
    Seed {
        /// JSON file containing an array of recipes
        #[arg(short, long)]
        file: String,
    },

    /// Find recipes that use the ingredients you have
    Pantry {
        /// Ingredients on hand, e.g. "thịt bò" "cà chua"
        #[arg(required = true)]
        ingredients: Vec<String>,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Search published recipes
    Search {
        /// Search query
        query: String,

        /// Filter by difficulty (easy, medium, hard)
        #[arg(long)]
        difficulty: Option<String>,

        /// Maximum total time in minutes
        #[arg(long)]
        max_time: Option<i64>,

        /// Filter by category name
        #[arg(long)]
        category: Option<String>,
    },
}
