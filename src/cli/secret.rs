use anyhow::Result;

use super::{Cli, Command};
use crate::commands;
use crate::http::ApiClient;
use crate::settings::{global_user::GlobalUser, toml::Manifest};

pub async fn run(cli: Cli) -> Result<()> {
    log::info!("Getting User settings");
    let user = GlobalUser::new()?;

    log::info!("Getting project settings");
    let manifest = Manifest::new(&cli.config)?;
    let target = manifest.get_target(cli.environment.as_deref(), cli.name.as_deref())?;

    let client = ApiClient::new(&user)?;

    match cli.command {
        Command::Put { key, message, tag } => {
            commands::secret::put(&client, &target, &key, message, tag).await
        }
        Command::Delete { key } => commands::secret::delete(&client, &target, &key).await,
        Command::List => commands::secret::list(&client, &target).await,
    }
}
