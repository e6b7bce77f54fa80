use std::path::PathBuf;

use anyhow::Result;
use config::{Config, File};
use serde::{Deserialize, Serialize};

use crate::errors::UserError;
use crate::settings::{get_global_config_path, Environment, QueryEnvironment};

const CF_API_TOKEN: &str = "CF_API_TOKEN";
const CF_API_KEY: &str = "CF_API_KEY";
const CF_EMAIL: &str = "CF_EMAIL";

/// Credentials for the Cloudflare v4 API. A scoped API token is preferred;
/// the email + global key pair is the legacy auth scheme and kept for parity
/// with wrangler's config file.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GlobalUser {
    TokenAuth { api_token: String },
    GlobalKeyAuth { email: String, api_key: String },
}

impl GlobalUser {
    pub fn new() -> Result<Self> {
        let environment = Environment::with_whitelist(vec![CF_API_TOKEN, CF_EMAIL, CF_API_KEY]);
        let config_path = get_global_config_path();
        GlobalUser::build(environment, config_path)
    }

    fn build<T: 'static + QueryEnvironment + config::Source + Send + Sync>(
        environment: T,
        config_path: PathBuf,
    ) -> Result<Self> {
        if environment.empty()? && !config_path.exists() {
            return Err(UserError(format!(
                "No authentication credentials found. Set {} (or {} and {}), or add them to {}",
                CF_API_TOKEN,
                CF_EMAIL,
                CF_API_KEY,
                config_path.display()
            ))
            .into());
        }

        let mut s = Config::new();
        if config_path.exists() {
            s.merge(File::from(config_path))?;
        }
        // Environment variables win over the config file.
        s.merge(environment)?;

        s.try_into().map_err(|e| {
            anyhow::Error::new(UserError(format!(
                "Your authentication config is incomplete: {}. Provide an api_token, or an email and api_key pair",
                e
            )))
        })
    }
}
