pub mod form;

use anyhow::Result;
use serde::Deserialize;

use crate::http::ApiClient;
use crate::settings::toml::Target;

use form::VersionUpload;

#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    pub id: Option<String>,
    pub etag: Option<String>,
    pub pipeline_hash: Option<String>,
    pub mutable_pipeline_id: Option<String>,
    pub deployment_id: Option<String>,
    #[serde(default)]
    pub available_on_subdomain: bool,
}

/// POST the assembled version as a multipart form. The query flags ask the
/// API to report subdomain availability and to leave the script body out of
/// the response.
pub async fn upload_version(
    client: &ApiClient,
    target: &Target,
    upload: &VersionUpload,
) -> Result<UploadResponse> {
    let upload_form = form::build(upload)?;

    client
        .post_form(
            &target.script_route("versions"),
            &[
                ("include_subdomain_availability", "true"),
                ("excludeScript", "true"),
            ],
            upload_form,
        )
        .await
}
