#![cfg_attr(feature = "strict", deny(warnings))]

use std::process::exit;

use structopt::StructOpt;

use worker_secrets::cli::{self, Cli};
use worker_secrets::errors::{FatalError, UserError};
use worker_secrets::terminal::message;

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::from_args();

    if let Err(error) = cli::run(cli).await {
        report_error(&error);
        exit(1);
    }
}

/// Render an error according to its class: user mistakes get a plain
/// actionable line, API contract violations are flagged as internal, and
/// anything else prints the full cause chain.
fn report_error(error: &anyhow::Error) {
    if let Some(user_error) = error.downcast_ref::<UserError>() {
        message::user_error(&user_error.to_string());
    } else if let Some(fatal) = error.downcast_ref::<FatalError>() {
        message::user_error(&format!(
            "An internal error occurred. Please file a report with the output below!\n{}",
            fatal
        ));
    } else {
        message::user_error(&format!("{:?}", error));
    }
}
