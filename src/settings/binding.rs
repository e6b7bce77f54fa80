use serde::{Deserialize, Serialize};

/// Serialized tag for the one binding kind this tool rewrites. A
/// single-variant enum keeps the `type` field closed during deserialization:
/// anything that is not exactly `secret_text` fails this variant and falls
/// through to the opaque one.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum SecretTextTag {
    #[serde(rename = "secret_text")]
    SecretText,
}

/// A named resource attached to a Worker version.
///
/// Only secret bindings are understood structurally. Every other kind is
/// carried as raw JSON, so fields this tool has never heard of survive the
/// re-upload untouched.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Binding {
    SecretText {
        #[serde(rename = "type")]
        kind: SecretTextTag,
        name: String,
        // The API redacts secret values in version details, so `text` may be
        // absent on the way in.
        #[serde(default, skip_serializing_if = "String::is_empty")]
        text: String,
    },
    Other(serde_json::Value),
}

impl Binding {
    pub fn new_secret_text(name: String, text: String) -> Binding {
        Binding::SecretText {
            kind: SecretTextTag::SecretText,
            name,
            text,
        }
    }

    pub fn is_secret_text(&self) -> bool {
        matches!(self, Binding::SecretText { .. })
    }
}
