mod secret;

pub use secret::run;

use std::path::PathBuf;

use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "worker-secrets",
    author = "The Wrangler Team <wrangler@cloudflare.com>",
    rename_all = "lower"
)]
pub struct Cli {
    /// Environment to use
    #[structopt(long = "env", short = "e", global = true, value_name = "ENVIRONMENT NAME")]
    pub environment: Option<String>,

    /// Path to configuration file. Defaults to `./wrangler.toml`
    #[structopt(long, short = "c", global = true, default_value = "wrangler.toml")]
    pub config: PathBuf,

    /// Name of the Worker; overrides any name in the configuration file
    #[structopt(long, global = true, value_name = "WORKER NAME")]
    pub name: Option<String>,

    #[structopt(subcommand)]
    pub command: Command,
}

#[derive(Debug, StructOpt)]
#[structopt(rename_all = "lower")]
pub enum Command {
    /// Create or update a secret variable on a new version of a Worker
    Put {
        /// Name of the secret variable
        #[structopt(index = 1, value_name = "VAR_NAME")]
        key: String,

        /// Description of this version
        #[structopt(long, value_name = "MESSAGE")]
        message: Option<String>,

        /// Identifier tag for this version
        #[structopt(long, value_name = "TAG")]
        tag: Option<String>,
    },
    /// Delete a secret variable from a Worker
    Delete {
        /// Name of the secret variable
        #[structopt(index = 1, value_name = "VAR_NAME")]
        key: String,
    },
    /// List all secrets for a Worker
    List,
}
