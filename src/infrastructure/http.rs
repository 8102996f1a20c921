use gloo::net::http::{Request, Response};
use serde_json::Value;
use web_sys::FormData;

use crate::domain::{
    errors::{AppResult, NetworkError},
    logging::LogComponent,
    repositories::{FetchRequest, SnapshotSource, WalletControl},
    snapshot::{Snapshot, value_text},
    view::{HEARTBEAT_PATH, HttpMethod, SHUTDOWN_PATH},
};
use crate::log_trace;

/// HTTP client for the wallet's GUI endpoints.
#[derive(Debug, Clone, Default)]
pub struct WalletHttpClient {
    base_url: String,
}

impl WalletHttpClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into() }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json(&self, path: &str) -> Result<Value, NetworkError> {
        let url = self.url(path);
        log_trace!(LogComponent::Infrastructure("WalletHttpClient"), "GET {url}");
        let response = Request::get(&url).send().await.map_err(transport_error)?;
        read_json(response).await
    }

    /// Form-encoded POST; an empty field list sends no body.
    async fn post_form(&self, path: &str, fields: &[(&str, String)]) -> Result<Value, NetworkError> {
        let url = self.url(path);
        log_trace!(LogComponent::Infrastructure("WalletHttpClient"), "POST {url}");
        let response = if fields.is_empty() {
            Request::post(&url).send().await
        } else {
            Request::post(&url)
                .body(form_data(fields)?)
                .map_err(transport_error)?
                .send()
                .await
        }
        .map_err(transport_error)?;
        read_json(response).await
    }
}

fn transport_error(error: gloo_net::Error) -> NetworkError {
    NetworkError::HttpRequestFailed(error.to_string())
}

fn form_data(fields: &[(&str, String)]) -> Result<FormData, NetworkError> {
    let form = FormData::new()
        .map_err(|e| NetworkError::HttpRequestFailed(format!("FormData unavailable: {e:?}")))?;
    for (name, value) in fields {
        form.append_with_str(name, value)
            .map_err(|e| NetworkError::HttpRequestFailed(format!("Failed to append {name}: {e:?}")))?;
    }
    Ok(form)
}

async fn read_json(response: Response) -> Result<Value, NetworkError> {
    if !response.ok() {
        return Err(NetworkError::HttpStatus {
            status: response.status(),
            text: response.status_text(),
        });
    }
    response
        .json::<Value>()
        .await
        .map_err(|e| NetworkError::InvalidBody(e.to_string()))
}

/// The shutdown endpoint answers with a one-element tuple, `["true"]`.
pub fn is_acknowledged(payload: &Value) -> bool {
    let first = match payload {
        Value::Array(items) => items.first(),
        other => Some(other),
    };
    first.is_some_and(|value| value_text(value).trim().eq_ignore_ascii_case("true"))
}

impl SnapshotSource for WalletHttpClient {
    async fn fetch(&self, request: &FetchRequest) -> AppResult<Option<Snapshot>> {
        let endpoint = request.view.endpoint();
        let payload = match endpoint.method {
            HttpMethod::Get => self.get_json(endpoint.path).await?,
            HttpMethod::PostForm => {
                let mut fields = vec![("session_id", request.session.value().to_string())];
                if let Some(page) = request.page {
                    fields.push(("page", page.to_string()));
                }
                self.post_form(endpoint.path, &fields).await?
            }
        };
        Ok(Snapshot::decode(request.view, payload)?)
    }
}

impl WalletControl for WalletHttpClient {
    async fn shutdown(&self) -> AppResult<bool> {
        let payload = self.post_form(SHUTDOWN_PATH, &[]).await?;
        Ok(is_acknowledged(&payload))
    }

    async fn heartbeat(&self) -> AppResult<()> {
        let url = self.url(HEARTBEAT_PATH);
        let response = Request::post(&url).send().await.map_err(transport_error)?;
        if !response.ok() {
            return Err(NetworkError::HttpStatus {
                status: response.status(),
                text: response.status_text(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn shutdown_acknowledgement_accepts_string_or_bool() {
        assert!(is_acknowledged(&json!(["true"])));
        assert!(is_acknowledged(&json!([true])));
        assert!(!is_acknowledged(&json!(["false"])));
        assert!(!is_acknowledged(&json!([])));
        assert!(!is_acknowledged(&Value::Null));
    }

    #[test]
    fn urls_are_joined_onto_the_base() {
        let client = WalletHttpClient::new("http://127.0.0.1:4300");
        assert_eq!(client.url("/gui/balance"), "http://127.0.0.1:4300/gui/balance");
        assert_eq!(WalletHttpClient::default().url(SHUTDOWN_PATH), "/shutdownServer");
    }
}
