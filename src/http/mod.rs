use std::time::Duration;

use anyhow::{anyhow, Result};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::multipart::Form;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::settings::global_user::GlobalUser;
use crate::terminal::{emoji, message};

const API_BASE_URL: &str = "https://api.cloudflare.com/client/v4";
const HTTP_TIMEOUT_SECONDS: u64 = 30;

/// Authenticated client for the Cloudflare v4 API. JSON endpoints are
/// unwrapped from the `{success, errors, result}` envelope; the version
/// content endpoint goes through [`ApiClient::fetch_raw`] since it answers
/// with multipart or a bare script body.
pub struct ApiClient {
    http: Client,
}

impl ApiClient {
    pub fn new(user: &GlobalUser) -> Result<ApiClient> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_str(&user_agent())?);
        add_auth_headers(&mut headers, user)?;

        let http = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECONDS))
            .default_headers(headers)
            .build()?;

        Ok(ApiClient { http })
    }

    pub async fn fetch<T: DeserializeOwned>(&self, route: &str) -> Result<T> {
        self.request(self.http.get(self.url(route)))
            .await?
            .ok_or_else(|| anyhow!("the API responded without a result for GET {}", route))
    }

    pub async fn delete(&self, route: &str) -> Result<()> {
        let _: Option<serde_json::Value> = self.request(self.http.delete(self.url(route))).await?;
        Ok(())
    }

    pub async fn post_form<T: DeserializeOwned>(
        &self,
        route: &str,
        query: &[(&str, &str)],
        form: Form,
    ) -> Result<T> {
        self.request(self.http.post(self.url(route)).query(query).multipart(form))
            .await?
            .ok_or_else(|| anyhow!("the API responded without a result for POST {}", route))
    }

    /// GET an endpoint outside the JSON envelope, failing on non-2xx status.
    pub async fn fetch_raw(&self, route: &str) -> Result<Response> {
        let response = self.http.get(self.url(route)).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "{} Request returned status {}: {}",
                emoji::WARN,
                status,
                body
            );
        }
        Ok(response)
    }

    fn url(&self, route: &str) -> String {
        format!("{}/{}", API_BASE_URL, route)
    }

    async fn request<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Option<T>> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        let envelope: ApiEnvelope<T> = serde_json::from_str(&body).map_err(|_| {
            anyhow!(
                "{} The API returned a response this tool could not parse (status {})",
                emoji::WARN,
                status
            )
        })?;

        if envelope.success {
            Ok(envelope.result)
        } else {
            print_status_code_context(status);
            Err(anyhow!("{}", format_api_errors(&envelope.errors)))
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiError>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub code: u16,
    pub message: String,
}

fn user_agent() -> String {
    format!("worker-secrets/{}", env!("CARGO_PKG_VERSION"))
}

fn add_auth_headers(headers: &mut HeaderMap, user: &GlobalUser) -> Result<()> {
    match user {
        GlobalUser::TokenAuth { api_token } => {
            headers.insert(
                "Authorization",
                HeaderValue::from_str(&format!("Bearer {}", api_token))?,
            );
        }
        GlobalUser::GlobalKeyAuth { email, api_key } => {
            headers.insert("X-Auth-Email", HeaderValue::from_str(email)?);
            headers.insert("X-Auth-Key", HeaderValue::from_str(api_key)?);
        }
    }
    Ok(())
}

// Format errors from the v4 API for printing, with more detailed
// explanations appended for error codes this tool is known to trip over.
fn format_api_errors(errors: &[ApiError]) -> String {
    let mut complete_err = String::new();
    for error in errors {
        complete_err.push_str(&format!(
            "{} Code {}: {}\n",
            emoji::WARN,
            error.code,
            error.message
        ));
        if let Some(help) = error_help(error.code) {
            complete_err.push_str(&format!("{} {}\n", emoji::SLEUTH, help));
        }
    }
    complete_err.trim_end().to_string()
}

fn error_help(error_code: u16) -> Option<&'static str> {
    match error_code {
        7000 | 7003 => {
            Some("Your wrangler.toml is likely missing the field \"account_id\", which is required for this request")
        }
        10000 => Some(
            "Your authentication might be expired or invalid; log in again or issue a new API token",
        ),
        10007 => Some(
            "The Worker does not exist on this account. Are you sure you entered the correct environment and account id?",
        ),
        _ => None,
    }
}

// For handling cases where the API gateway returns errors via HTTP status codes
// (no API-specific, more granular error code is given).
fn print_status_code_context(status_code: StatusCode) {
    match status_code {
        StatusCode::PAYLOAD_TOO_LARGE => message::warn(
            "Returned status code 413, Payload Too Large. Please make sure your upload is less than 100MB in size",
        ),
        StatusCode::GATEWAY_TIMEOUT => message::warn(
            "Returned status code 504, Gateway Timeout. Please try again in a few seconds",
        ),
        _ => (),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_unwraps_a_successful_envelope() {
        let body = r#"{ "success": true, "errors": [], "messages": [], "result": { "id": "abc" } }"#;
        let envelope: ApiEnvelope<serde_json::Value> = serde_json::from_str(body).unwrap();

        assert!(envelope.success);
        assert_eq!(envelope.result.unwrap()["id"], "abc");
    }

    #[test]
    fn it_tolerates_a_null_result() {
        let body = r#"{ "success": true, "errors": [], "messages": [], "result": null }"#;
        let envelope: ApiEnvelope<serde_json::Value> = serde_json::from_str(body).unwrap();

        assert!(envelope.result.is_none());
    }

    #[test]
    fn it_formats_api_errors_with_help_text() {
        let errors = vec![ApiError {
            code: 10007,
            message: "workers.api.error.script_not_found".to_string(),
        }];

        let formatted = format_api_errors(&errors);
        assert!(formatted.contains("Code 10007"));
        assert!(formatted.contains("correct environment"));
    }
}
