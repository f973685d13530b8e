//! Remote libSQL database reached over its HTTP pipeline endpoint.
//!
//! Each statement is sent as its own pipeline: an `execute` request followed
//! by a `close`, so no stream state (baton) is kept between calls.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::{STANDARD as B64, STANDARD_NO_PAD as B64_NO_PAD};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::DbError;
use crate::store::{Rows, Statement, Store, Value};

pub struct RemoteStore {
    client: reqwest::Client,
    pipeline_url: String,
    auth_token: Option<String>,
}

impl RemoteStore {
    pub fn new(url: &str, auth_token: Option<String>) -> Result<Self, DbError> {
        let base = http_base(url).ok_or_else(|| DbError::InvalidUrl(url.to_string()))?;
        let pipeline_url = format!("{}/v2/pipeline", base.trim_end_matches('/'));

        info!("Remote database at {}", base);
        Ok(Self {
            client: reqwest::Client::new(),
            pipeline_url,
            auth_token,
        })
    }
}

/// `libsql://` is the scheme handed out for remote databases; it speaks HTTPS.
fn http_base(url: &str) -> Option<String> {
    if let Some(rest) = url.strip_prefix("libsql://") {
        Some(format!("https://{}", rest))
    } else if url.starts_with("https://") || url.starts_with("http://") {
        Some(url.to_string())
    } else {
        None
    }
}

#[async_trait]
impl Store for RemoteStore {
    async fn execute(&self, statement: Statement) -> Result<Rows, DbError> {
        let body = PipelineRequest {
            baton: None,
            requests: vec![
                StreamRequest::Execute {
                    stmt: WireStmt::from(&statement),
                },
                StreamRequest::Close,
            ],
        };

        let mut req = self.client.post(&self.pipeline_url).json(&body);
        if let Some(token) = &self.auth_token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(DbError::Remote(format!("HTTP {}: {}", status, text)));
        }

        let parsed: PipelineResponse = resp.json().await?;
        debug!("Pipeline returned {} results", parsed.results.len());
        decode_execute_result(parsed)
    }
}

fn decode_execute_result(resp: PipelineResponse) -> Result<Rows, DbError> {
    let first = resp
        .results
        .into_iter()
        .next()
        .ok_or_else(|| DbError::Protocol("empty pipeline result".into()))?;

    let result = match first {
        StreamResult::Ok {
            response: StreamResponse::Execute { result },
        } => result,
        StreamResult::Ok { response } => {
            return Err(DbError::Protocol(format!(
                "expected execute response, got {:?}",
                response
            )));
        }
        StreamResult::Error { error } => {
            let is_constraint = error
                .code
                .as_deref()
                .is_some_and(|c| c.starts_with("SQLITE_CONSTRAINT"));
            return Err(if is_constraint {
                DbError::Constraint(error.message)
            } else {
                DbError::Remote(error.message)
            });
        }
    };

    let rows = result
        .rows
        .into_iter()
        .map(|row| row.into_iter().map(Value::try_from).collect::<Result<Vec<_>, _>>())
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Rows {
        rows,
        affected_row_count: result.affected_row_count,
    })
}

// -- Wire format --

#[derive(Debug, Serialize)]
struct PipelineRequest {
    baton: Option<String>,
    requests: Vec<StreamRequest>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StreamRequest {
    Execute { stmt: WireStmt },
    Close,
}

#[derive(Debug, Serialize)]
struct WireStmt {
    sql: String,
    args: Vec<WireValue>,
    want_rows: bool,
}

impl From<&Statement> for WireStmt {
    fn from(s: &Statement) -> Self {
        Self {
            sql: s.sql.clone(),
            args: s.args.iter().map(WireValue::from).collect(),
            want_rows: true,
        }
    }
}

/// Integers travel as decimal strings so 64-bit values survive JSON.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireValue {
    Null,
    Integer { value: String },
    Float { value: f64 },
    Text { value: String },
    Blob { base64: String },
}

impl From<&Value> for WireValue {
    fn from(v: &Value) -> Self {
        match v {
            Value::Null => WireValue::Null,
            Value::Integer(i) => WireValue::Integer {
                value: i.to_string(),
            },
            Value::Real(f) => WireValue::Float { value: *f },
            Value::Text(s) => WireValue::Text { value: s.clone() },
            Value::Blob(b) => WireValue::Blob {
                base64: B64.encode(b),
            },
        }
    }
}

impl TryFrom<WireValue> for Value {
    type Error = DbError;

    fn try_from(v: WireValue) -> Result<Self, Self::Error> {
        Ok(match v {
            WireValue::Null => Value::Null,
            WireValue::Integer { value } => Value::Integer(
                value
                    .parse()
                    .map_err(|_| DbError::Protocol(format!("bad integer '{}'", value)))?,
            ),
            WireValue::Float { value } => Value::Real(value),
            WireValue::Text { value } => Value::Text(value),
            WireValue::Blob { base64: encoded } => Value::Blob(
                // some servers omit padding
                B64.decode(&encoded)
                    .or_else(|_| B64_NO_PAD.decode(&encoded))
                    .map_err(|e| DbError::Protocol(format!("bad blob: {}", e)))?,
            ),
        })
    }
}

#[derive(Debug, Deserialize)]
struct PipelineResponse {
    results: Vec<StreamResult>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StreamResult {
    Ok { response: StreamResponse },
    Error { error: WireError },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StreamResponse {
    Execute { result: StmtResult },
    Close,
}

#[derive(Debug, Deserialize)]
struct StmtResult {
    rows: Vec<Vec<WireValue>>,
    affected_row_count: u64,
}

#[derive(Debug, Deserialize)]
struct WireError {
    message: String,
    code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(v: serde_json::Value) -> Result<Rows, DbError> {
        decode_execute_result(serde_json::from_value(v).unwrap())
    }

    #[test]
    fn rewrites_libsql_scheme() {
        assert_eq!(
            http_base("libsql://db-org.turso.io").as_deref(),
            Some("https://db-org.turso.io")
        );
        assert_eq!(
            http_base("http://127.0.0.1:8080").as_deref(),
            Some("http://127.0.0.1:8080")
        );
        assert_eq!(http_base("file:progress.db"), None);
        assert!(matches!(
            RemoteStore::new("progress.db", None),
            Err(DbError::InvalidUrl(_))
        ));
    }

    #[test]
    fn encodes_execute_then_close() {
        let stmt = Statement::with_args(
            "SELECT completed FROM sequentialUser WHERE username = ?1",
            [Value::from("alice"), Value::Integer(683), Value::Null],
        );
        let body = PipelineRequest {
            baton: None,
            requests: vec![
                StreamRequest::Execute {
                    stmt: WireStmt::from(&stmt),
                },
                StreamRequest::Close,
            ],
        };

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "baton": null,
                "requests": [
                    {
                        "type": "execute",
                        "stmt": {
                            "sql": "SELECT completed FROM sequentialUser WHERE username = ?1",
                            "args": [
                                {"type": "text", "value": "alice"},
                                {"type": "integer", "value": "683"},
                                {"type": "null"}
                            ],
                            "want_rows": true
                        }
                    },
                    {"type": "close"}
                ]
            })
        );
    }

    #[test]
    fn decodes_rows_and_counts() {
        let rows = decode(json!({
            "baton": null,
            "base_url": null,
            "results": [
                {"type": "ok", "response": {"type": "execute", "result": {
                    "cols": [{"name": "completed", "decltype": "INT"}, {"name": "b"}],
                    "rows": [[{"type": "integer", "value": "42"}, {"type": "blob", "base64": "AQI="}]],
                    "affected_row_count": 0,
                    "last_insert_rowid": null
                }}},
                {"type": "ok", "response": {"type": "close"}}
            ]
        }))
        .unwrap();

        assert_eq!(rows.first_value(), Some(&Value::Integer(42)));
        assert_eq!(rows.rows[0][1], Value::Blob(vec![1, 2]));
    }

    #[test]
    fn constraint_errors_are_classified() {
        let err = decode(json!({
            "results": [
                {"type": "error", "error": {
                    "message": "UNIQUE constraint failed: sequentialUser.username",
                    "code": "SQLITE_CONSTRAINT_PRIMARYKEY"
                }},
                {"type": "error", "error": {"message": "stream closed"}}
            ]
        }))
        .unwrap_err();
        assert!(matches!(err, DbError::Constraint(_)), "got {err:?}");

        let err = decode(json!({
            "results": [{"type": "error", "error": {"message": "no such table: nope", "code": "SQLITE_ERROR"}}]
        }))
        .unwrap_err();
        assert!(matches!(err, DbError::Remote(_)), "got {err:?}");
    }

    #[test]
    fn rejects_malformed_integers() {
        let err = decode(json!({
            "results": [{"type": "ok", "response": {"type": "execute", "result": {
                "cols": [{"name": "n"}],
                "rows": [[{"type": "integer", "value": "forty"}]],
                "affected_row_count": 0
            }}}]
        }))
        .unwrap_err();
        assert!(matches!(err, DbError::Protocol(_)));
    }
}
