//! Typed client for the finance backend.
//!
//! All URL building, bearer auth and envelope unwrapping happen here;
//! callers only see typed results or an [`ApiError`].

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{Account, BalanceEntry, ItemKind, ItemRef, Loan, NewBalanceEntry};
use crate::settings::{Session, Settings};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("{0}")]
    Rejected(String),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

pub struct ApiClient {
    http: Client,
    base: String,
    session: Session,
}

impl ApiClient {
    pub fn new(settings: &Settings, session: Session) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(concat!("hearth/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base: join_url(&settings.api_url, &settings.api_prefix, ""),
            session,
        })
    }

    pub fn url(&self, path: &str) -> String {
        join_url(&self.base, "", path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        debug!(%method, %url, "api request");
        let builder = self.http.request(method, url);
        match self.session.token.as_deref().filter(|t| !t.is_empty()) {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn fetch<T: DeserializeOwned>(&self, builder: RequestBuilder, key: &str) -> Result<T, ApiError> {
        let body = read_body(builder.send()?)?;
        let value: Value = serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))?;
        unwrap_envelope(value, key)
    }

    fn get<T: DeserializeOwned>(&self, path: &str, key: &str) -> Result<T, ApiError> {
        self.fetch(self.request(Method::GET, path), key)
    }

    fn send<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        key: &str,
    ) -> Result<T, ApiError> {
        self.fetch(self.request(method, path).json(body), key)
    }

    pub fn accounts(&self) -> Result<Vec<Account>, ApiError> {
        self.get("/accounts", "accounts")
    }

    pub fn loans(&self) -> Result<Vec<Loan>, ApiError> {
        self.get("/loans", "loans")
    }

    /// Every balance snapshot of the given kind owned by the session's user.
    pub fn balances(&self, kind: ItemKind) -> Result<Vec<BalanceEntry>, ApiError> {
        self.get(&format!("/{}/balances", kind.collection()), "balances")
    }

    pub fn add_balance(&self, item: ItemRef, entry: &NewBalanceEntry) -> Result<BalanceEntry, ApiError> {
        let path = format!("/{}/{}/balances", item.kind().collection(), item.id());
        self.send(Method::POST, &path, entry, "balance")
    }

    pub fn update_balance(
        &self,
        kind: ItemKind,
        entry_id: i64,
        entry: &NewBalanceEntry,
    ) -> Result<BalanceEntry, ApiError> {
        let path = format!("/{}/balances/{entry_id}", kind.collection());
        self.send(Method::PUT, &path, entry, "balance")
    }

    pub fn delete_balance(&self, kind: ItemKind, entry_id: i64) -> Result<(), ApiError> {
        let path = format!("/{}/balances/{entry_id}", kind.collection());
        let body = read_body(self.request(Method::DELETE, &path).send()?)?;
        check_ack(&body)
    }
}

fn read_body(resp: Response) -> Result<String, ApiError> {
    let status = resp.status();
    let body = resp.text()?;
    if status.is_success() {
        return Ok(body);
    }
    let fallback = status.canonical_reason().unwrap_or("request failed");
    Err(ApiError::Status {
        status: status.as_u16(),
        message: error_message(&body, fallback),
    })
}

/// Join base, prefix and path with exactly one slash between each part.
pub fn join_url(base: &str, prefix: &str, path: &str) -> String {
    let mut url = base.trim_end_matches('/').to_string();
    for part in [prefix, path] {
        let part = part.trim_matches('/');
        if !part.is_empty() {
            url.push('/');
            url.push_str(part);
        }
    }
    url
}

/// Pull a human-readable message out of an error body: `message`, then
/// `error`, then `detail`, else `fallback`.
pub fn error_message(body: &str, fallback: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| message_in(&v))
        .unwrap_or_else(|| fallback.to_string())
}

fn message_in(value: &Value) -> Option<String> {
    ["message", "error", "detail"]
        .iter()
        .find_map(|k| value.get(*k).and_then(Value::as_str).map(str::to_string))
}

fn envelope_success(value: &Value) -> Option<bool> {
    value.as_object()?.get("success")?.as_bool()
}

fn rejection(value: &Value) -> ApiError {
    let message = message_in(value).unwrap_or_else(|| "Request was not successful".to_string());
    warn!(%message, "backend rejected request");
    ApiError::Rejected(message)
}

/// Decode either a bare payload or a `{ success, <key>: ... }` envelope.
pub fn unwrap_envelope<T: DeserializeOwned>(value: Value, key: &str) -> Result<T, ApiError> {
    let payload = match envelope_success(&value) {
        None => value,
        Some(false) => return Err(rejection(&value)),
        Some(true) => {
            let Value::Object(mut map) = value else {
                return Err(ApiError::Decode("envelope is not an object".to_string()));
            };
            map.remove(key)
                .or_else(|| map.remove("data"))
                .ok_or_else(|| ApiError::Decode(format!("missing '{key}' in response")))?
        }
    };
    serde_json::from_value(payload).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Accept an empty body, a bare acknowledgement, or a successful envelope.
pub fn check_ack(body: &str) -> Result<(), ApiError> {
    if body.trim().is_empty() {
        return Ok(());
    }
    match serde_json::from_str::<Value>(body) {
        Ok(value) if envelope_success(&value) == Some(false) => Err(rejection(&value)),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc::{self, Receiver};
    use std::thread;

    /// Reads one HTTP/1.1 request: head plus `content-length` body.
    fn read_request(stream: &mut impl Read) -> String {
        let mut raw = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&raw).to_string();
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .find_map(|l| {
                        let (name, value) = l.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length").then(|| value.trim().parse::<usize>().ok())?
                    })
                    .unwrap_or(0);
                if raw.len() >= end + 4 + length {
                    return text;
                }
            }
        }
        String::from_utf8_lossy(&raw).to_string()
    }

    /// Answers each connection with the next canned `(status, body)` and
    /// reports the raw request text.
    fn serve(responses: Vec<(u16, &'static str)>) -> (Settings, Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            for (status, body) in responses {
                let (mut stream, _) = listener.accept().unwrap();
                tx.send(read_request(&mut stream)).unwrap();
                let reply = format!(
                    "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                stream.write_all(reply.as_bytes()).unwrap();
            }
        });
        let settings = Settings {
            api_url: format!("http://127.0.0.1:{port}"),
            ..Settings::default()
        };
        (settings, rx)
    }

    fn new_entry() -> NewBalanceEntry {
        NewBalanceEntry {
            balance: 120.5,
            date_entered: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            currency: None,
            notes: None,
        }
    }

    const ENTRY: &str = r#"{"id": 8, "account_id": 3, "balance": 120.5, "date_entered": "2024-07-01"}"#;

    #[test]
    fn test_bearer_header_only_with_token() {
        let settings = Settings::default();
        let authed = ApiClient::new(&settings, Session::with_token("abc")).unwrap();
        let req = authed.request(Method::GET, "/accounts").build().unwrap();
        let auth = req.headers().get(reqwest::header::AUTHORIZATION).unwrap();
        assert_eq!(auth.to_str().unwrap(), "Bearer abc");

        let anonymous = ApiClient::new(&settings, Session::default()).unwrap();
        let req = anonymous.request(Method::GET, "/accounts").build().unwrap();
        assert!(req.headers().get(reqwest::header::AUTHORIZATION).is_none());
    }

    #[test]
    fn test_endpoints_use_expected_method_and_path() {
        let (settings, requests) = serve(vec![
            (201, ENTRY),
            (200, ENTRY),
            (200, r#"{"success": true}"#),
            (200, "[]"),
        ]);
        let api = ApiClient::new(&settings, Session::with_token("tok")).unwrap();

        let created = api.add_balance(ItemRef::Account(3), &new_entry()).unwrap();
        assert_eq!(created.id, 8);
        let head = requests.recv().unwrap();
        assert!(head.starts_with("POST /api/accounts/3/balances HTTP/1.1"), "{head}");
        assert!(head.to_ascii_lowercase().contains("authorization: bearer tok"));
        assert!(head.contains(r#""date_entered":"2024-07-01""#));

        api.update_balance(ItemKind::Loan, 8, &new_entry()).unwrap();
        assert!(requests.recv().unwrap().starts_with("PUT /api/loans/balances/8 HTTP/1.1"));

        api.delete_balance(ItemKind::Account, 8).unwrap();
        assert!(requests.recv().unwrap().starts_with("DELETE /api/accounts/balances/8 HTTP/1.1"));

        assert!(api.balances(ItemKind::Loan).unwrap().is_empty());
        assert!(requests.recv().unwrap().starts_with("GET /api/loans/balances HTTP/1.1"));
    }

    #[test]
    fn test_error_status_carries_server_message() {
        let (settings, _requests) = serve(vec![(404, r#"{"detail": "Not found."}"#)]);
        let api = ApiClient::new(&settings, Session::default()).unwrap();
        match api.accounts().unwrap_err() {
            ApiError::Status { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Not found.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_rejected_delete_is_an_error() {
        let (settings, _requests) = serve(vec![(200, r#"{"success": false, "message": "Entry not found"}"#)]);
        let api = ApiClient::new(&settings, Session::with_token("tok")).unwrap();
        let err = api.delete_balance(ItemKind::Loan, 99).unwrap_err();
        assert_eq!(err.to_string(), "Entry not found");
    }

    #[test]
    fn test_join_url_normalizes_slashes() {
        assert_eq!(join_url("http://h:8000/", "/api/", "/accounts"), "http://h:8000/api/accounts");
        assert_eq!(join_url("http://h:8000", "", "accounts"), "http://h:8000/accounts");
        assert_eq!(join_url("http://h:8000", "api", ""), "http://h:8000/api");
    }

    #[test]
    fn test_client_url_uses_prefix() {
        let settings = Settings {
            api_url: "https://money.example.org/".to_string(),
            ..Settings::default()
        };
        let client = ApiClient::new(&settings, Session::default()).unwrap();
        assert_eq!(client.url("/loans/balances"), "https://money.example.org/api/loans/balances");
    }

    #[test]
    fn test_unwrap_bare_array() {
        let accounts: Vec<Account> = unwrap_envelope(json!([{"id": 1, "name": "Current"}]), "accounts").unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].name, "Current");
    }

    #[test]
    fn test_unwrap_success_envelope() {
        let v = json!({"success": true, "accounts": [{"id": 2, "name": "Savings"}]});
        let accounts: Vec<Account> = unwrap_envelope(v, "accounts").unwrap();
        assert_eq!(accounts[0].id, 2);
    }

    #[test]
    fn test_unwrap_envelope_falls_back_to_data() {
        let v = json!({"success": true, "data": []});
        let loans: Vec<Loan> = unwrap_envelope(v, "loans").unwrap();
        assert!(loans.is_empty());
    }

    #[test]
    fn test_unwrap_envelope_missing_key() {
        let v = json!({"success": true, "other": []});
        let err = unwrap_envelope::<Vec<Loan>>(v, "loans").unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn test_unwrap_rejected_envelope() {
        let v = json!({"success": false, "message": "Session expired"});
        let err = unwrap_envelope::<Vec<Loan>>(v, "loans").unwrap_err();
        match err {
            ApiError::Rejected(msg) => assert_eq!(msg, "Session expired"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unwrap_wrong_shape_is_decode_error() {
        let err = unwrap_envelope::<Vec<Loan>>(json!({"id": 1}), "loans").unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(error_message(r#"{"message": "Bad token"}"#, "Unauthorized"), "Bad token");
        assert_eq!(error_message(r#"{"error": "Nope"}"#, "Unauthorized"), "Nope");
        assert_eq!(error_message(r#"{"detail": "Not found."}"#, "Not Found"), "Not found.");
        assert_eq!(error_message("<html>502</html>", "Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn test_check_ack() {
        assert!(check_ack("").is_ok());
        assert!(check_ack(r#"{"success": true}"#).is_ok());
        assert!(check_ack(r#"{"deleted": 4}"#).is_ok());
        assert!(check_ack(r#"{"success": false, "message": "Entry not found"}"#).is_err());
    }
}
