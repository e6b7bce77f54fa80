mod modules_worker;
mod service_worker;

use anyhow::Result;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

use crate::settings::binding::Binding;
use crate::versions::{Annotations, TailConsumer, UsageModel};

/// A named unit of source content with a MIME-derived type tag.
#[derive(Clone, Debug, PartialEq)]
pub struct Module {
    pub name: String,
    pub content: Vec<u8>,
    pub module_type: ModuleType,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum ModuleType {
    ESModule,
    CommonJS,
    CompiledWasm,
    Text,
    Data,
}

impl ModuleType {
    pub fn content_type(&self) -> &'static str {
        match self {
            ModuleType::ESModule => "application/javascript+module",
            ModuleType::CommonJS => "application/javascript",
            ModuleType::CompiledWasm => "application/wasm",
            ModuleType::Text => "text/plain",
            ModuleType::Data => "application/octet-stream",
        }
    }

    pub fn from_mime(mime: &str) -> Result<ModuleType> {
        // content-type headers may carry parameters, e.g. "; charset=utf-8"
        let essence = mime.split(';').next().unwrap_or_default().trim();
        let module_type = match essence {
            "application/javascript+module" | "text/javascript+module" => ModuleType::ESModule,
            "application/javascript" | "text/javascript" => ModuleType::CommonJS,
            "application/wasm" => ModuleType::CompiledWasm,
            "text/plain" => ModuleType::Text,
            "application/octet-stream" => ModuleType::Data,
            other => anyhow::bail!("Unsupported module content type: {}", other),
        };
        Ok(module_type)
    }
}

/// Structured placement configuration. The version details endpoint reports
/// placement as a bare string; only the "smart" sentinel maps to a value on
/// upload, anything else is omitted.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Placement {
    pub mode: PlacementMode,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacementMode {
    Smart,
}

impl Placement {
    pub fn from_mode(placement_mode: Option<&str>) -> Option<Placement> {
        match placement_mode {
            Some("smart") => Some(Placement {
                mode: PlacementMode::Smart,
            }),
            _ => None,
        }
    }
}

/// Everything that goes into the new version's multipart body. Fields copied
/// verbatim from the source version keep their fetched representation.
#[derive(Debug)]
pub struct VersionUpload {
    pub main: Module,
    pub modules: Vec<Module>,
    pub bindings: Vec<Binding>,
    pub compatibility_date: Option<String>,
    pub compatibility_flags: Vec<String>,
    pub usage_model: Option<UsageModel>,
    /// False: vars are re-specified in full by `bindings`.
    pub keep_vars: bool,
    /// True: secrets omitted from `bindings` are expected to be re-merged
    /// from the previous version server-side. Assumed, not verified; see
    /// DESIGN.md.
    pub keep_secrets: bool,
    pub logpush: bool,
    pub placement: Option<Placement>,
    pub tail_consumers: Option<Vec<TailConsumer>>,
    pub limits: Option<serde_json::Value>,
    pub annotations: Annotations,
}

/// Drops every existing secret binding and appends a single one carrying the
/// new value; non-secret bindings pass through untouched. Dropped secrets
/// ride on the `keep_secrets` inheritance flag instead of being re-sent.
pub fn merge_secret_binding(bindings: Vec<Binding>, key: &str, value: String) -> Vec<Binding> {
    let mut merged: Vec<Binding> = bindings
        .into_iter()
        .filter(|binding| !binding.is_secret_text())
        .collect();
    merged.push(Binding::new_secret_text(key.to_string(), value));
    merged
}

pub fn build(upload: &VersionUpload) -> Result<Form> {
    // Legacy single-script versions go back up in service-worker format;
    // everything else is a module worker.
    match upload.main.module_type {
        ModuleType::CommonJS => service_worker::build_form(upload),
        _ => modules_worker::build_form(upload),
    }
}

fn keep_bindings(upload: &VersionUpload) -> Option<Vec<&'static str>> {
    let mut keep = Vec::new();
    if upload.keep_vars {
        keep.push("plain_text");
        keep.push("json");
    }
    if upload.keep_secrets {
        keep.push("secret_text");
        keep.push("secret_key");
    }

    if keep.is_empty() {
        None
    } else {
        Some(keep)
    }
}

fn metadata_part(metadata_json: String) -> Result<Part> {
    Ok(Part::text(metadata_json)
        .file_name("metadata.json")
        .mime_str("application/json")?)
}

fn add_module_parts(mut form: Form, upload: &VersionUpload) -> Result<Form> {
    for module in std::iter::once(&upload.main).chain(upload.modules.iter()) {
        let part = Part::bytes(module.content.clone())
            .file_name(module.name.clone())
            .mime_str(module.module_type.content_type())?;
        form = form.part(module.name.clone(), part);
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn fixture_bindings() -> Vec<Binding> {
        serde_json::from_value(json!([
            { "type": "plain_text", "name": "GREETING", "text": "hello" },
            { "type": "kv_namespace", "name": "CACHE", "namespace_id": "0f2ac74b" },
            { "type": "secret_text", "name": "OLD_SECRET" },
            { "type": "secret_text", "name": "OTHER_SECRET" }
        ]))
        .unwrap()
    }

    fn fixture_upload() -> VersionUpload {
        VersionUpload {
            main: Module {
                name: "index.mjs".to_string(),
                content: b"export default {}".to_vec(),
                module_type: ModuleType::ESModule,
            },
            modules: Vec::new(),
            bindings: merge_secret_binding(fixture_bindings(), "TOKEN", "hunter2".to_string()),
            compatibility_date: Some("2024-01-01".to_string()),
            compatibility_flags: Vec::new(),
            usage_model: Some(UsageModel::Standard),
            keep_vars: false,
            keep_secrets: true,
            logpush: true,
            placement: Placement::from_mode(Some("smart")),
            tail_consumers: None,
            limits: Some(json!({ "cpu_ms": 50 })),
            annotations: Annotations {
                message: Some("Updated secret TOKEN".to_string()),
                tag: None,
                triggered_by: None,
            },
        }
    }

    #[test]
    fn it_passes_non_secret_bindings_through_unchanged() {
        let merged = merge_secret_binding(fixture_bindings(), "TOKEN", "hunter2".to_string());

        let merged_json = serde_json::to_value(&merged).unwrap();
        assert_eq!(
            merged_json[0],
            json!({ "type": "plain_text", "name": "GREETING", "text": "hello" })
        );
        assert_eq!(
            merged_json[1],
            json!({ "type": "kv_namespace", "name": "CACHE", "namespace_id": "0f2ac74b" })
        );
    }

    #[test]
    fn it_keeps_exactly_one_secret_binding() {
        let merged = merge_secret_binding(fixture_bindings(), "TOKEN", "hunter2".to_string());

        let secrets: Vec<&Binding> = merged.iter().filter(|b| b.is_secret_text()).collect();
        assert_eq!(secrets.len(), 1);
        assert_eq!(
            serde_json::to_value(secrets[0]).unwrap(),
            json!({ "type": "secret_text", "name": "TOKEN", "text": "hunter2" })
        );
    }

    #[test]
    fn it_replaces_a_secret_that_shares_the_target_name() {
        let merged = merge_secret_binding(fixture_bindings(), "OLD_SECRET", "newvalue".to_string());

        let secrets: Vec<Value> = merged
            .iter()
            .filter(|b| b.is_secret_text())
            .map(|b| serde_json::to_value(b).unwrap())
            .collect();
        assert_eq!(
            secrets,
            vec![json!({ "type": "secret_text", "name": "OLD_SECRET", "text": "newvalue" })]
        );
    }

    #[test]
    fn it_asks_the_api_to_inherit_secrets_but_not_vars() {
        let upload = fixture_upload();
        assert_eq!(
            keep_bindings(&upload),
            Some(vec!["secret_text", "secret_key"])
        );
    }

    #[test]
    fn it_omits_keep_bindings_when_nothing_is_inherited() {
        let mut upload = fixture_upload();
        upload.keep_secrets = false;
        assert_eq!(keep_bindings(&upload), None);
    }

    #[test]
    fn it_only_recognizes_the_smart_placement_sentinel() {
        assert!(Placement::from_mode(Some("smart")).is_some());
        assert!(Placement::from_mode(Some("off")).is_none());
        assert!(Placement::from_mode(None).is_none());
    }

    #[test]
    fn it_builds_modules_metadata() {
        let metadata: Value =
            serde_json::from_str(&modules_worker::metadata_json(&fixture_upload()).unwrap())
                .unwrap();

        assert_eq!(metadata["main_module"], "index.mjs");
        assert_eq!(metadata["compatibility_date"], "2024-01-01");
        // empty flag list is omitted entirely
        assert!(metadata.get("compatibility_flags").is_none());
        assert_eq!(metadata["usage_model"], "standard");
        assert_eq!(metadata["keep_bindings"], json!(["secret_text", "secret_key"]));
        assert_eq!(metadata["logpush"], true);
        assert_eq!(metadata["placement"], json!({ "mode": "smart" }));
        assert_eq!(metadata["limits"], json!({ "cpu_ms": 50 }));
        assert_eq!(
            metadata["annotations"],
            json!({ "workers/message": "Updated secret TOKEN" })
        );
        assert_eq!(metadata["bindings"].as_array().unwrap().len(), 3);
        assert!(metadata.get("body_part").is_none());
    }

    #[test]
    fn it_builds_service_worker_metadata_for_legacy_scripts() {
        let mut upload = fixture_upload();
        upload.main = Module {
            name: "index.js".to_string(),
            content: b"addEventListener('fetch', () => {})".to_vec(),
            module_type: ModuleType::CommonJS,
        };

        let metadata: Value =
            serde_json::from_str(&service_worker::metadata_json(&upload).unwrap()).unwrap();

        assert_eq!(metadata["body_part"], "index.js");
        assert!(metadata.get("main_module").is_none());
    }
}
