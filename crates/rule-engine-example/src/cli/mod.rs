mod error;
mod place_order;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rule_engine_example::RuleType;

pub(crate) use self::error::CliError;
use self::error::Result;

#[derive(Parser)]
#[command(name = "rule-engine-example")]
#[command(about = "Place customer orders through the rule engine", long_about = None)]
pub(crate) struct Cli {
    /// Log every step of the run (overridden by RUST_LOG)
    #[arg(long, short = 'v', global = true)]
    pub(crate) verbose: bool,

    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Place a customer order read from a JSON file
    PlaceOrder {
        /// Customer order JSON file
        #[arg(long, short = 'i')]
        input: PathBuf,

        /// TOML file with an [engine] table
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Make the given rule fail to exercise compensation
        #[arg(long, value_enum)]
        fail_at: Option<RuleType>,
    },
}

impl Commands {
    pub(crate) fn execute(self) -> Result<()> {
        match self {
            Self::PlaceOrder {
                input,
                config,
                fail_at,
            } => place_order::run(&place_order::PlaceOrderArgs {
                input,
                config,
                fail_at,
            }),
        }
    }
}
