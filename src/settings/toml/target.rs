use serde::{Deserialize, Serialize};

/// The remote resource every API call addresses: an account, a script name,
/// and (for non-legacy configurations) a service environment.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Target {
    pub account_id: String,
    pub name: String,
    pub environment: Option<String>,
}

impl Target {
    // Secrets are addressed per service environment when one is selected;
    // every other resource this tool touches is addressed per script.
    pub fn secrets_route(&self) -> String {
        match &self.environment {
            Some(env) => format!(
                "accounts/{}/workers/services/{}/environments/{}/secrets",
                self.account_id, self.name, env
            ),
            None => format!(
                "accounts/{}/workers/scripts/{}/secrets",
                self.account_id, self.name
            ),
        }
    }

    pub fn script_route(&self, resource: &str) -> String {
        format!(
            "accounts/{}/workers/scripts/{}/{}",
            self.account_id, self.name, resource
        )
    }

    /// Worker name plus environment qualifier, for status messages.
    pub fn display_name(&self) -> String {
        match &self.environment {
            Some(env) => format!("{} ({})", self.name, env),
            None => self.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(environment: Option<&str>) -> Target {
        Target {
            account_id: "fakeaccountid".to_string(),
            name: "zork".to_string(),
            environment: environment.map(String::from),
        }
    }

    #[test]
    fn it_routes_secrets_per_script_by_default() {
        assert_eq!(
            target(None).secrets_route(),
            "accounts/fakeaccountid/workers/scripts/zork/secrets"
        );
    }

    #[test]
    fn it_routes_secrets_per_environment_when_one_is_selected() {
        assert_eq!(
            target(Some("staging")).secrets_route(),
            "accounts/fakeaccountid/workers/services/zork/environments/staging/secrets"
        );
    }

    #[test]
    fn it_routes_version_resources_per_script() {
        assert_eq!(
            target(Some("staging")).script_route("versions"),
            "accounts/fakeaccountid/workers/scripts/zork/versions"
        );
    }
}
