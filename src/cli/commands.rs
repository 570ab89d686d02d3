use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "display-feeds")]
#[command(about = "Normalize external provider feeds for digital signage slides")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List configured feed sources
    Sources,

    /// Print the admin form fields for a feed source
    Form {
        /// Feed source id
        source_id: String,
    },

    /// List selectable options for a feed source config field
    Options {
        /// Feed source id
        source_id: String,

        /// Config field name (e.g. recipients, publishers, resources)
        name: String,
    },

    /// Fetch a feed and print its normalized payload as JSON
    Fetch {
        /// Feed id
        feed_id: String,
    },
}
