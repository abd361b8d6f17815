use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use handlerkit::Operation;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "glue-trigger")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Reconcile Glue triggers against a local trigger store", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run an operation against the local store
    Reconcile(ReconcileArgs),

    /// Inspect or clear the local store
    #[command(subcommand)]
    State(StateCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Reconcile
// ============================================================================

#[derive(Args)]
pub struct ReconcileArgs {
    /// Operation to run
    #[arg(value_enum)]
    pub operation: OperationArg,

    /// Request JSON file (`desiredResourceState`, `previousResourceState`, ...)
    #[arg(short, long)]
    pub request: Option<PathBuf>,

    /// Trigger name, when no request file names one
    #[arg(short, long)]
    pub name: Option<String>,

    /// Client request token
    #[arg(long, env = "GLUE_TRIGGER_REQUEST_TOKEN")]
    pub token: Option<String>,

    /// Pagination token for list
    #[arg(long)]
    pub next_token: Option<String>,

    /// Run a single invocation and stop
    #[arg(long)]
    pub once: bool,

    /// Continuation file read before and written after `--once`
    #[arg(long, requires = "once")]
    pub context: Option<PathBuf>,

    /// Do not sleep between invocations
    #[arg(long)]
    pub no_wait: bool,

    /// Give up after this many invocations
    #[arg(long, default_value = "100")]
    pub max_invocations: u32,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OperationArg {
    Create,
    Read,
    Update,
    Delete,
    List,
}

impl From<OperationArg> for Operation {
    fn from(arg: OperationArg) -> Self {
        match arg {
            OperationArg::Create => Self::Create,
            OperationArg::Read => Self::Read,
            OperationArg::Update => Self::Update,
            OperationArg::Delete => Self::Delete,
            OperationArg::List => Self::List,
        }
    }
}

// ============================================================================
// State
// ============================================================================

#[derive(Subcommand)]
pub enum StateCommand {
    /// Show stored triggers
    Show {
        /// Print the raw TOML
        #[arg(long)]
        raw: bool,
    },

    /// Remove every stored trigger
    Reset,
}
