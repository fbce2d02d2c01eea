use std::path::PathBuf;

use clap::Args;
use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(name = "datagrid")]
#[command(about = "Query and export JSON datasets through a table config", long_about = None)]
#[command(version)]
pub struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print one page of the table
    View {
        #[command(flatten)]
        table: TableArgs,
    },

    /// Write the filtered rows (or the given ids) to a file
    Export {
        #[command(flatten)]
        table: TableArgs,

        #[arg(long, default_value = "csv")]
        format: String,

        /// Export only these row ids
        #[arg(long, value_delimiter = ',')]
        select: Option<Vec<String>>,

        /// Output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

#[derive(Args)]
pub struct TableArgs {
    /// Table config (JSON)
    #[arg(long)]
    pub config: PathBuf,

    /// Rows (JSON array of objects)
    #[arg(long)]
    pub rows: PathBuf,

    #[arg(long)]
    pub search: Option<String>,

    /// Filter value as id=value; repeatable
    #[arg(long = "filter", value_name = "ID=VALUE")]
    pub filters: Vec<String>,

    /// Sort as column or column:desc
    #[arg(long)]
    pub sort: Option<String>,

    #[arg(long)]
    pub page: Option<usize>,

    #[arg(long)]
    pub per_page: Option<usize>,

    /// Caller role; repeatable
    #[arg(long = "role")]
    pub roles: Vec<String>,
}
