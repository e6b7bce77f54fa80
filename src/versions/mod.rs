//! Read-side types and calls for the Workers versions API. Everything here
//! is fetched fresh at the start of a command and discarded at the end; the
//! only thing ever written back is a whole new version (see `upload`).

pub mod content;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::errors::UserError;
use crate::http::ApiClient;
use crate::settings::binding::Binding;
use crate::settings::toml::Target;

/// Summary entry from the versions listing. The API returns these newest
/// first; this tool trusts that ordering and performs no sort of its own.
#[derive(Clone, Debug, Deserialize)]
pub struct WorkerVersion {
    pub id: String,
    #[serde(default)]
    pub number: u64,
}

#[derive(Debug, Deserialize)]
struct VersionList {
    items: Vec<WorkerVersion>,
}

/// Human annotations carried on a version.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Annotations {
    #[serde(rename = "workers/message", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(rename = "workers/tag", skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(
        rename = "workers/triggered_by",
        skip_serializing_if = "Option::is_none"
    )]
    pub triggered_by: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct VersionDetails {
    pub id: String,
    #[serde(default)]
    pub annotations: Option<Annotations>,
    pub resources: VersionResources,
}

#[derive(Clone, Debug, Deserialize)]
pub struct VersionResources {
    pub bindings: Vec<Binding>,
    pub script: ScriptDetails,
    pub script_runtime: ScriptRuntime,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ScriptDetails {
    #[serde(default)]
    pub etag: Option<String>,
    #[serde(default)]
    pub handlers: Vec<String>,
    #[serde(default)]
    pub placement_mode: Option<String>,
    #[serde(default)]
    pub last_deployed_from: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ScriptRuntime {
    #[serde(default)]
    pub compatibility_date: Option<String>,
    #[serde(default)]
    pub compatibility_flags: Vec<String>,
    #[serde(default)]
    pub usage_model: Option<UsageModel>,
    /// Account/script limits, copied into the new version verbatim.
    #[serde(default)]
    pub limits: Option<serde_json::Value>,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageModel {
    Bundled,
    Unbound,
    Standard,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct TailConsumer {
    pub service: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
}

/// Cross-version script settings; not part of a version's own definition but
/// carried forward into any version created from an old one.
#[derive(Clone, Debug, Deserialize)]
pub struct ScriptSettings {
    pub logpush: bool,
    pub tail_consumers: Option<Vec<TailConsumer>>,
}

#[derive(Debug, Deserialize)]
struct DeploymentList {
    #[serde(default)]
    deployments: Vec<Deployment>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Deployment {
    pub id: String,
    #[serde(default)]
    pub versions: Vec<DeploymentVersion>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DeploymentVersion {
    pub version_id: String,
    pub percentage: f64,
}

pub async fn fetch_versions(client: &ApiClient, target: &Target) -> Result<Vec<WorkerVersion>> {
    let list: VersionList = client.fetch(&target.script_route("versions")).await?;
    Ok(list.items)
}

/// First entry of the listing, by the API's newest-first contract.
pub fn latest_version(versions: Vec<WorkerVersion>) -> Result<WorkerVersion> {
    versions.into_iter().next().ok_or_else(|| {
        anyhow::Error::new(UserError(
            "There are currently no uploaded versions of this Worker - please upload a version \
             before uploading a secret."
                .to_string(),
        ))
    })
}

pub async fn fetch_version_details(
    client: &ApiClient,
    target: &Target,
    version_id: &str,
) -> Result<VersionDetails> {
    client
        .fetch(&target.script_route(&format!("versions/{}", version_id)))
        .await
}

pub async fn fetch_deployments(client: &ApiClient, target: &Target) -> Result<Vec<Deployment>> {
    let list: DeploymentList = client.fetch(&target.script_route("deployments")).await?;
    Ok(list.deployments)
}

pub async fn fetch_script_settings(client: &ApiClient, target: &Target) -> Result<ScriptSettings> {
    client.fetch(&target.script_route("script-settings")).await
}

/// Traffic share the given version receives under the newest deployment.
/// `None` means the version is not currently deployed (or there are no
/// deployments at all); callers treat that as informational, not an error.
pub fn deployed_percentage(deployments: &[Deployment], version_id: &str) -> Option<f64> {
    let latest = deployments.first()?;
    latest
        .versions
        .iter()
        .find(|v| v.version_id == version_id)
        .map(|v| v.percentage)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(id: &str) -> WorkerVersion {
        WorkerVersion {
            id: id.to_string(),
            number: 0,
        }
    }

    #[test]
    fn it_takes_the_first_version_as_latest() {
        let latest = latest_version(vec![version("newest"), version("older")]).unwrap();
        assert_eq!(latest.id, "newest");
    }

    #[test]
    fn it_fails_with_a_user_error_when_there_are_no_versions() {
        let err = latest_version(Vec::new()).unwrap_err();
        let user = err.downcast_ref::<UserError>().unwrap();
        assert!(user.to_string().contains("no uploaded versions"));
    }

    #[test]
    fn it_finds_the_deployed_percentage_for_a_version() {
        let deployments: DeploymentList = serde_json::from_str(
            r#"{ "deployments": [
                { "id": "dep-1", "versions": [
                    { "version_id": "v1", "percentage": 90.0 },
                    { "version_id": "v2", "percentage": 10.0 }
                ]},
                { "id": "dep-0", "versions": [
                    { "version_id": "v0", "percentage": 100.0 }
                ]}
            ]}"#,
        )
        .unwrap();

        assert_eq!(
            deployed_percentage(&deployments.deployments, "v2"),
            Some(10.0)
        );
        // older deployments don't count
        assert_eq!(deployed_percentage(&deployments.deployments, "v0"), None);
        assert_eq!(deployed_percentage(&[], "v1"), None);
    }

    #[test]
    fn it_deserializes_version_details() {
        let details: VersionDetails = serde_json::from_str(
            r#"{
                "id": "ce15c78b-cc43-4f60-b5a9-15ce4f298c2a",
                "number": 2,
                "annotations": { "workers/tag": "v2" },
                "resources": {
                    "bindings": [
                        { "type": "plain_text", "name": "GREETING", "text": "hello" },
                        { "type": "secret_text", "name": "TOKEN" }
                    ],
                    "script": {
                        "etag": "13a3240e8fb414561b0366813b0b8f42b3e6cfa0d9e70e99835dae83d0d8a794",
                        "handlers": ["fetch"],
                        "placement_mode": "smart",
                        "last_deployed_from": "api"
                    },
                    "script_runtime": {
                        "compatibility_date": "2024-01-01",
                        "compatibility_flags": ["nodejs_compat"],
                        "usage_model": "standard",
                        "limits": { "cpu_ms": 50 }
                    }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(details.annotations.unwrap().tag.as_deref(), Some("v2"));
        assert_eq!(details.resources.bindings.len(), 2);
        assert!(details.resources.bindings[1].is_secret_text());
        assert_eq!(
            details.resources.script.placement_mode.as_deref(),
            Some("smart")
        );
        assert_eq!(
            details.resources.script_runtime.usage_model,
            Some(UsageModel::Standard)
        );
    }
}
