#![forbid(unsafe_code)]

use crate::config::RemoteConfig;
use crate::remote::{RemoteError, RemoteHealth, RemoteSheet, RowPosition};
use dispatch_core::SheetRow;
use serde::Deserialize;

const MAX_ERROR_BODY_CHARS: usize = 512;

/// Blocking JSON client for a SheetsDB-style row API, scoped to one sheet.
#[derive(Clone, Debug)]
pub struct SheetsDbClient {
    agent: ureq::Agent,
    health_url: String,
    rows_url: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RowsEnvelope {
    Bare(Vec<SheetRow>),
    Wrapped { rows: Vec<SheetRow> },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedRow {
    row_position: u32,
}

#[derive(Deserialize)]
struct HealthBody {
    status: String,
}

impl SheetsDbClient {
    pub fn new(config: &RemoteConfig) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(config.timeout()).build();
        let base = config.base_url();
        Self {
            agent,
            health_url: format!("{base}/health"),
            rows_url: format!(
                "{base}/spreadsheets/{}/sheets/{}/rows",
                encode_segment(config.spreadsheet_id()),
                encode_segment(config.sheet_name())
            ),
        }
    }

    pub fn rows_url(&self) -> &str {
        &self.rows_url
    }

    fn row_url(&self, position: RowPosition) -> String {
        format!("{}/{}", self.rows_url, position.get())
    }
}

impl RemoteSheet for SheetsDbClient {
    fn list_rows(&self) -> Result<Vec<SheetRow>, RemoteError> {
        let response = self.agent.get(&self.rows_url).call().map_err(map_error)?;
        let envelope = response
            .into_json::<RowsEnvelope>()
            .map_err(|err| RemoteError::Decode(err.to_string()))?;
        Ok(match envelope {
            RowsEnvelope::Bare(rows) => rows,
            RowsEnvelope::Wrapped { rows } => rows,
        })
    }

    fn create_row(&self, row: &SheetRow) -> Result<RowPosition, RemoteError> {
        let response = self
            .agent
            .post(&self.rows_url)
            .send_json(row)
            .map_err(map_error)?;
        let created = response
            .into_json::<CreatedRow>()
            .map_err(|err| RemoteError::Decode(err.to_string()))?;
        RowPosition::new(created.row_position)
            .ok_or_else(|| RemoteError::Decode("rowPosition must be 1-based".to_string()))
    }

    fn update_row(&self, position: RowPosition, row: &SheetRow) -> Result<(), RemoteError> {
        self.agent
            .put(&self.row_url(position))
            .send_json(row)
            .map_err(map_error)?;
        Ok(())
    }

    fn delete_row(&self, position: RowPosition) -> Result<(), RemoteError> {
        self.agent
            .delete(&self.row_url(position))
            .call()
            .map_err(map_error)?;
        Ok(())
    }

    fn health_check(&self) -> Result<RemoteHealth, RemoteError> {
        let response = self.agent.get(&self.health_url).call().map_err(map_error)?;
        let body = response
            .into_json::<HealthBody>()
            .map_err(|err| RemoteError::Decode(err.to_string()))?;
        Ok(RemoteHealth {
            status: body.status,
        })
    }
}

fn map_error(err: ureq::Error) -> RemoteError {
    match err {
        ureq::Error::Status(code, response) => {
            let mut message = response.into_string().unwrap_or_default();
            if let Some((cut, _)) = message.char_indices().nth(MAX_ERROR_BODY_CHARS) {
                message.truncate(cut);
            }
            RemoteError::Status { code, message }
        }
        ureq::Error::Transport(transport) => {
            if is_timeout(&transport) {
                RemoteError::Timeout
            } else {
                RemoteError::Transport(transport.to_string())
            }
        }
    }
}

fn is_timeout(transport: &ureq::Transport) -> bool {
    let mut source = std::error::Error::source(transport);
    while let Some(err) = source {
        if let Some(io) = err.downcast_ref::<std::io::Error>() {
            if matches!(
                io.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
            ) {
                return true;
            }
        }
        source = err.source();
    }
    false
}

/// Percent-encodes everything outside RFC 3986 unreserved characters.
fn encode_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~') {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}
