use anyhow::Result;
use reqwest::multipart::Form;
use serde::Serialize;
use serde_json::Value;

use crate::settings::binding::Binding;
use crate::versions::{Annotations, TailConsumer, UsageModel};

use super::{keep_bindings, Placement, VersionUpload};

// Identical to the modules-format metadata except the entrypoint is named by
// `body_part` rather than `main_module`.
#[derive(Serialize, Debug)]
struct Metadata {
    body_part: String,
    bindings: Vec<Binding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    compatibility_date: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    compatibility_flags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    usage_model: Option<UsageModel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    keep_bindings: Option<Vec<&'static str>>,
    logpush: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    placement: Option<Placement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tail_consumers: Option<Vec<TailConsumer>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limits: Option<Value>,
    annotations: Annotations,
}

pub(super) fn metadata_json(upload: &VersionUpload) -> Result<String> {
    let metadata = Metadata {
        body_part: upload.main.name.clone(),
        bindings: upload.bindings.clone(),
        compatibility_date: upload.compatibility_date.clone(),
        compatibility_flags: upload.compatibility_flags.clone(),
        usage_model: upload.usage_model,
        keep_bindings: keep_bindings(upload),
        logpush: upload.logpush,
        placement: upload.placement,
        tail_consumers: upload.tail_consumers.clone(),
        limits: upload.limits.clone(),
        annotations: upload.annotations.clone(),
    };

    Ok(serde_json::to_string(&metadata)?)
}

pub(super) fn build_form(upload: &VersionUpload) -> Result<Form> {
    let mut form = Form::new();

    form = form.part("metadata", super::metadata_part(metadata_json(upload)?)?);
    form = super::add_module_parts(form, upload)?;

    log::info!("building service-worker-format form");
    log::debug!("{:#?}", &form);

    Ok(form)
}
