use anyhow::Result;

use crate::errors::UserError;
use crate::http::ApiClient;
use crate::metrics;
use crate::settings::toml::Target;
use crate::terminal::{interactive, message, styles};
use crate::upload;
use crate::upload::form::{merge_secret_binding, Placement, VersionUpload};
use crate::versions::{self, content, Annotations};

/// Create or update a secret by branching a new version off the latest one.
///
/// The platform treats versions as immutable bundles, so "update a secret"
/// means: pull the latest version's full definition, splice in the new
/// binding, and upload a fresh version that otherwise duplicates the old
/// one.
pub async fn put(
    client: &ApiClient,
    target: &Target,
    key: &str,
    message_arg: Option<String>,
    tag: Option<String>,
) -> Result<()> {
    if key.is_empty() {
        return Err(UserError("Enter a non-empty secret variable name".to_string()).into());
    }

    // Resolve the branch point before prompting, so a Worker with no
    // uploaded versions fails before anyone types in a value.
    let versions = versions::fetch_versions(client, target).await?;
    let latest = versions::latest_version(versions)?;

    let secret_value = interactive::get_secret_value("Enter a secret value")?;

    message::working(&format!(
        "Creating the secret for the Worker \"{}\"",
        target.display_name()
    ));

    let details = versions::fetch_version_details(client, target, &latest.id).await?;

    // Deployment info feeds a friendlier status line; a version that isn't
    // deployed (or an account with no deployments) is not an error.
    let deployments = versions::fetch_deployments(client, target).await?;
    let version_tag = details
        .annotations
        .as_ref()
        .and_then(|annotations| annotations.tag.as_deref())
        .map(|tag| format!(" ({})", tag))
        .unwrap_or_default();
    let traffic = match versions::deployed_percentage(&deployments, &details.id) {
        Some(percentage) => format!("deployed to {}%", percentage),
        None => "not currently deployed".to_string(),
    };
    message::info(&format!(
        "Branching off version {}{} which is {}",
        styles::highlight(&details.id),
        version_tag,
        traffic
    ));

    let content = content::fetch_version_content(client, target, &latest.id).await?;
    let script_settings = versions::fetch_script_settings(client, target).await?;

    let bindings = merge_secret_binding(details.resources.bindings, key, secret_value);

    let upload_payload = VersionUpload {
        main: content.main,
        modules: content.modules,
        bindings,
        compatibility_date: details.resources.script_runtime.compatibility_date,
        compatibility_flags: details.resources.script_runtime.compatibility_flags,
        usage_model: details.resources.script_runtime.usage_model,
        keep_vars: false,   // vars are re-specified in full above
        keep_secrets: true, // inherit the rest from the previous version
        logpush: script_settings.logpush,
        placement: Placement::from_mode(details.resources.script.placement_mode.as_deref()),
        tail_consumers: script_settings.tail_consumers,
        limits: details.resources.script_runtime.limits,
        annotations: version_annotations(key, message_arg, tag),
    };

    let result = upload::upload_version(client, target, &upload_payload).await?;

    metrics::send_event("create encrypted variable (versioned)");
    message::success(&format!("Success! Uploaded secret {}", key));
    if let Some(id) = result.id {
        message::info(&format!("Worker Version ID: {}", styles::bold(&id)));
    }

    Ok(())
}

fn version_annotations(key: &str, message: Option<String>, tag: Option<String>) -> Annotations {
    Annotations {
        message: Some(message.unwrap_or_else(|| format!("Updated secret {}", key))),
        tag,
        triggered_by: None,
    }
}

pub async fn delete(client: &ApiClient, target: &Target, key: &str) -> Result<()> {
    match interactive::confirm(&format!(
        "Are you sure you want to permanently delete the secret {} on the Worker {}?",
        key,
        target.display_name()
    )) {
        Ok(true) => (),
        Ok(false) => {
            message::info(&format!("Not deleting secret {}", key));
            return Ok(());
        }
        Err(e) => anyhow::bail!(e),
    }

    message::working(&format!(
        "Deleting the secret {} on the Worker {}",
        key,
        target.display_name()
    ));

    client
        .delete(&format!("{}/{}", target.secrets_route(), key))
        .await?;

    metrics::send_event("delete encrypted variable");
    message::success(&format!("Success! Deleted secret {}", key));
    Ok(())
}

pub async fn list(client: &ApiClient, target: &Target) -> Result<()> {
    let secrets: serde_json::Value = client.fetch(&target.secrets_route()).await?;
    println!("{}", serde_json::to_string_pretty(&secrets)?);

    metrics::send_event("list encrypted variables");
    Ok(())
}
