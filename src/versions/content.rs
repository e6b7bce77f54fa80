//! Reconstruction of a version's deployed source from the content endpoint.
//!
//! The endpoint answers in one of two shapes: a multipart bundle (module
//! workers, with the entrypoint named by the `cf-entrypoint` response
//! header) or a single script body (legacy service workers, typed by the
//! `content-type` header). The shape assumption lives entirely behind
//! [`fetch_version_content`] so it can be swapped without touching callers.

use anyhow::Result;
use bytes::Bytes;
use futures_util::stream;
use multer::Multipart;

use crate::errors::{FatalError, UserError};
use crate::http::ApiClient;
use crate::settings::toml::Target;
use crate::upload::form::{Module, ModuleType};

/// Response header naming the multipart part that is the entrypoint.
const ENTRYPOINT_HEADER: &str = "cf-entrypoint";
/// Part injected into Workers Sites uploads; its presence marks a version
/// this tool refuses to rebuild.
const STATIC_CONTENT_MANIFEST: &str = "__STATIC_CONTENT_MANIFEST";
/// Name given to the main module of a legacy single-script version.
const DEFAULT_MAIN_NAME: &str = "index.js";

/// A version's source: exactly one main module plus zero or more auxiliary
/// modules, kept in response-part order.
#[derive(Debug, PartialEq)]
pub struct VersionContent {
    pub main: Module,
    pub modules: Vec<Module>,
}

pub async fn fetch_version_content(
    client: &ApiClient,
    target: &Target,
    version_id: &str,
) -> Result<VersionContent> {
    let response = client
        .fetch_raw(&target.script_route(&format!("content/v2?version={}", version_id)))
        .await?;

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let entrypoint = response
        .headers()
        .get(ENTRYPOINT_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let body = response.bytes().await?;

    parse_content(content_type.as_deref(), entrypoint.as_deref(), body).await
}

async fn parse_content(
    content_type: Option<&str>,
    entrypoint: Option<&str>,
    body: Bytes,
) -> Result<VersionContent> {
    match content_type {
        Some(content_type) if content_type.starts_with("multipart/form-data") => {
            parse_module_bundle(content_type, entrypoint, body).await
        }
        Some(content_type) => {
            // good old service worker with no additional modules
            let main = Module {
                name: DEFAULT_MAIN_NAME.to_string(),
                content: body.to_vec(),
                module_type: ModuleType::from_mime(content_type)?,
            };

            Ok(VersionContent {
                main,
                modules: Vec::new(),
            })
        }
        None => Err(FatalError(
            "No content-type header was provided for non-module Worker content".to_string(),
        )
        .into()),
    }
}

async fn parse_module_bundle(
    content_type: &str,
    entrypoint: Option<&str>,
    body: Bytes,
) -> Result<VersionContent> {
    let boundary = multer::parse_boundary(content_type)
        .map_err(|e| FatalError(format!("Could not parse the multipart boundary: {}", e)))?;
    let body_stream = stream::once(async move { Ok::<Bytes, std::convert::Infallible>(body) });
    let mut multipart = Multipart::new(body_stream, boundary);

    let mut parts: Vec<Module> = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        let name = field
            .name()
            .map(str::to_owned)
            .ok_or_else(|| FatalError("Version content contained an unnamed part".to_string()))?;
        let mime = field
            .content_type()
            .map(|mime| mime.essence_str().to_owned())
            .ok_or_else(|| FatalError(format!("Module part \"{}\" has no content type", name)))?;
        let content = field.bytes().await?.to_vec();

        parts.push(Module {
            module_type: ModuleType::from_mime(&mime)?,
            name,
            content,
        });
    }

    // Workers Sites is not supported
    if parts.iter().any(|part| part.name == STATIC_CONTENT_MANIFEST) {
        return Err(UserError(
            "Workers Sites versions are not supported for secret updates".to_string(),
        )
        .into());
    }

    let entrypoint = entrypoint.ok_or_else(|| {
        FatalError("Got a module bundle without the cf-entrypoint header".to_string())
    })?;
    let position = parts
        .iter()
        .position(|part| part.name == entrypoint)
        .ok_or_else(|| {
            FatalError(format!(
                "Could not find entrypoint \"{}\" in the version content",
                entrypoint
            ))
        })?;
    let main = parts.remove(position);

    Ok(VersionContent {
        main,
        modules: parts,
    })
}
