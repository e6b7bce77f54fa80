use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::{Environment, Target};
use crate::errors::UserError;
use crate::terminal::emoji;

const CF_ACCOUNT_ID: &str = "CF_ACCOUNT_ID";

/// Trimmed view of a project's wrangler.toml: just enough to resolve which
/// Worker the secret commands target. Unknown keys parse cleanly so a full
/// project manifest can be pointed at directly.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Manifest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub account_id: String,
    /// When false, `--env` selects a service environment instead of a
    /// `<name>-<env>` sibling script.
    pub legacy_env: Option<bool>,
    pub env: Option<HashMap<String, Environment>>,
}

impl Manifest {
    pub fn new(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            // A missing manifest is fine as long as --name and CF_ACCOUNT_ID
            // cover the identity; resolution errors happen in get_target.
            log::info!("No config file found at {}", config_path.display());
            return Ok(Manifest::default());
        }

        let config = fs::read_to_string(config_path)?;
        let manifest: Manifest = toml::from_str(&config)?;
        Ok(manifest)
    }

    pub fn worker_name(&self, env_arg: Option<&str>) -> String {
        if let Some(environment) = self.get_environment(env_arg).unwrap_or_default() {
            if let Some(name) = &environment.name {
                return name.clone();
            }
            if self.is_legacy_env() {
                if let Some(env) = env_arg {
                    return format!("{}-{}", self.name, env);
                }
            }
        }

        self.name.clone()
    }

    fn is_legacy_env(&self) -> bool {
        self.legacy_env.unwrap_or(true)
    }

    pub fn get_environment(&self, environment_name: Option<&str>) -> Result<Option<&Environment>> {
        // check for user-specified environment name
        if let Some(environment_name) = environment_name {
            if let Some(environment_table) = &self.env {
                if let Some(environment) = environment_table.get(environment_name) {
                    Ok(Some(environment))
                } else {
                    anyhow::bail!(
                        "{} Could not find environment with name \"{}\"",
                        emoji::WARN,
                        environment_name
                    )
                }
            } else {
                anyhow::bail!(
                    "{} There are no environments specified in your configuration file",
                    emoji::WARN
                )
            }
        } else {
            Ok(None)
        }
    }

    pub fn get_target(
        &self,
        environment_name: Option<&str>,
        name_override: Option<&str>,
    ) -> Result<Target> {
        let environment = self.get_environment(environment_name)?;

        let name = match name_override {
            Some(name) => name.to_string(),
            None => self.worker_name(environment_name),
        };
        if name.is_empty() {
            return Err(UserError(
                "Required Worker name missing. Please specify the Worker name in wrangler.toml, \
                 or pass it as an argument with `--name <worker-name>`"
                    .to_string(),
            )
            .into());
        }

        let mut account_id = self.account_id.clone();
        if let Some(environment) = environment {
            if let Some(id) = &environment.account_id {
                account_id = id.clone();
            }
        }
        if account_id.is_empty() {
            account_id = env::var(CF_ACCOUNT_ID).unwrap_or_default();
        }
        if account_id.is_empty() {
            return Err(UserError(format!(
                "Required account_id missing. Add it to your wrangler.toml or set {}",
                CF_ACCOUNT_ID
            ))
            .into());
        }

        // Non-legacy environments keep the base script name and address
        // secrets through the service environment instead.
        let environment = match (self.is_legacy_env(), environment_name) {
            (false, Some(env)) => Some(env.to_string()),
            _ => None,
        };

        Ok(Target {
            account_id,
            name,
            environment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(config: &str) -> Manifest {
        toml::from_str(config).unwrap()
    }

    #[test]
    fn it_ignores_unrelated_manifest_keys() {
        let manifest = manifest(
            r#"
            name = "zork"
            account_id = "fakeaccountid"
            compatibility_date = "2024-01-01"
            [vars]
            FOO = "bar"
            "#,
        );

        assert_eq!(manifest.name, "zork");
        assert_eq!(manifest.account_id, "fakeaccountid");
    }

    #[test]
    fn it_appends_the_environment_to_legacy_worker_names() {
        let manifest = manifest(
            r#"
            name = "zork"
            account_id = "fakeaccountid"
            [env.staging]
            "#,
        );

        assert_eq!(manifest.worker_name(Some("staging")), "zork-staging");

        let target = manifest.get_target(Some("staging"), None).unwrap();
        assert_eq!(target.name, "zork-staging");
        assert_eq!(target.environment, None);
    }

    #[test]
    fn it_prefers_an_explicit_environment_name() {
        let manifest = manifest(
            r#"
            name = "zork"
            account_id = "fakeaccountid"
            [env.staging]
            name = "zork-the-sequel"
            "#,
        );

        assert_eq!(manifest.worker_name(Some("staging")), "zork-the-sequel");
    }

    #[test]
    fn it_keeps_the_base_name_for_service_environments() {
        let manifest = manifest(
            r#"
            name = "zork"
            account_id = "fakeaccountid"
            legacy_env = false
            [env.staging]
            "#,
        );

        let target = manifest.get_target(Some("staging"), None).unwrap();
        assert_eq!(target.name, "zork");
        assert_eq!(target.environment.as_deref(), Some("staging"));
    }

    #[test]
    fn it_inherits_the_environment_account_id() {
        let manifest = manifest(
            r#"
            name = "zork"
            account_id = "fakeaccountid"
            [env.staging]
            account_id = "otheraccountid"
            "#,
        );

        let target = manifest.get_target(Some("staging"), None).unwrap();
        assert_eq!(target.account_id, "otheraccountid");
    }

    #[test]
    fn it_requires_a_worker_name() {
        let manifest = manifest(r#"account_id = "fakeaccountid""#);

        let err = manifest.get_target(None, None).unwrap_err();
        assert!(err.downcast_ref::<UserError>().is_some());
    }

    #[test]
    fn it_accepts_a_name_override() {
        let manifest = manifest(r#"account_id = "fakeaccountid""#);

        let target = manifest.get_target(None, Some("grue")).unwrap();
        assert_eq!(target.name, "grue");
    }

    #[test]
    fn it_rejects_an_unknown_environment() {
        let manifest = manifest(
            r#"
            name = "zork"
            account_id = "fakeaccountid"
            [env.staging]
            "#,
        );

        assert!(manifest.get_target(Some("production"), None).is_err());
    }

    #[test]
    fn it_defaults_when_the_config_file_is_missing() {
        let manifest = Manifest::new(Path::new("/definitely/not/a/wrangler.toml")).unwrap();
        assert_eq!(manifest, Manifest::default());
    }
}
