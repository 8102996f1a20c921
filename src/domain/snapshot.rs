//! Snapshots returned by the wallet endpoints, one shape per view.
//!
//! The backend answers most views with a positional JSON array of strings
//! (`["100", "5", ...]`) and the transaction history with an object. Numbers
//! and strings are accepted interchangeably since the backend has emitted
//! both over time.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::errors::ValidationError;
use crate::domain::view::ViewKind;

pub const SYNCHRONIZED_STATUS: &str = "Synchronized";
pub const COMPLETE_PROGRESS: &str = "100%";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub confirmed: String,
    pub unconfirmed: String,
    pub fund_a: String,
    pub fund_b: String,
    pub whale_size: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeight {
    pub height: String,
    pub status: String,
    pub color: String,
}

impl BlockHeight {
    pub fn is_synchronized(&self) -> bool {
        self.status == SYNCHRONIZED_STATUS
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub percentage: String,
}

impl Progress {
    pub fn is_complete(&self) -> bool {
        self.percentage.trim() == COMPLETE_PROGRESS
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxLine {
    #[serde(default, deserialize_with = "lenient_string")]
    pub transaction_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub short_transaction_id: String,
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub amount: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub fee: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub time: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub confirmed: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxHistoryPage {
    #[serde(default, deserialize_with = "nullable_lines")]
    pub lines: Vec<TxLine>,
    /// Number of pages
    #[serde(default, deserialize_with = "lenient_u32")]
    pub total: u32,
    /// 1-based page the lines belong to
    #[serde(default, deserialize_with = "lenient_u32")]
    pub current: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "view", content = "data", rename_all = "snake_case")]
pub enum Snapshot {
    Balance(Balance),
    BlockHeight(BlockHeight),
    TxHistory(TxHistoryPage),
    Progress(Progress),
}

impl Snapshot {
    /// Decodes an endpoint payload for `view`.
    ///
    /// `Ok(None)` means the server had nothing to report (`null`, `[]`, `{}`).
    pub fn decode(view: ViewKind, payload: Value) -> Result<Option<Snapshot>, ValidationError> {
        if is_empty_payload(&payload) {
            return Ok(None);
        }
        let snapshot = match view {
            ViewKind::Balance => {
                let fields = positional(view, &payload, 5)?;
                Snapshot::Balance(Balance {
                    confirmed: fields[0].clone(),
                    unconfirmed: fields[1].clone(),
                    fund_a: fields[2].clone(),
                    fund_b: fields[3].clone(),
                    // The label trails the tuple; older servers send five fields.
                    whale_size: fields[fields.len() - 1].clone(),
                })
            }
            ViewKind::BlockHeight => {
                let fields = positional(view, &payload, 3)?;
                Snapshot::BlockHeight(BlockHeight {
                    height: fields[0].clone(),
                    status: fields[1].clone(),
                    color: fields[2].clone(),
                })
            }
            ViewKind::BootstrapperProgress | ViewKind::ConsensusBuilderProgress => {
                let fields = positional(view, &payload, 1)?;
                Snapshot::Progress(Progress { percentage: fields[0].clone() })
            }
            ViewKind::TxHistory => {
                if !payload.is_object() {
                    return Err(malformed(view, "expected an object"));
                }
                let page: TxHistoryPage = serde_json::from_value(payload)
                    .map_err(|e| malformed(view, &e.to_string()))?;
                Snapshot::TxHistory(page)
            }
        };
        Ok(Some(snapshot))
    }

    /// Whether this snapshot may be stored for `view`.
    pub fn matches_view(&self, view: ViewKind) -> bool {
        match self {
            Snapshot::Balance(_) => view == ViewKind::Balance,
            Snapshot::BlockHeight(_) => view == ViewKind::BlockHeight,
            Snapshot::TxHistory(_) => view == ViewKind::TxHistory,
            Snapshot::Progress(_) => view.is_progress(),
        }
    }

    /// Terminal states hand control back to the page (form submit).
    pub fn is_terminal(&self) -> bool {
        match self {
            Snapshot::BlockHeight(height) => height.is_synchronized(),
            Snapshot::Progress(progress) => progress.is_complete(),
            Snapshot::Balance(_) | Snapshot::TxHistory(_) => false,
        }
    }
}

fn malformed(view: ViewKind, reason: &str) -> ValidationError {
    ValidationError::MalformedSnapshot { view: view.into(), reason: reason.to_string() }
}

fn is_empty_payload(payload: &Value) -> bool {
    match payload {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn positional(view: ViewKind, payload: &Value, min_len: usize) -> Result<Vec<String>, ValidationError> {
    let items = payload.as_array().ok_or_else(|| malformed(view, "expected an array"))?;
    if items.len() < min_len {
        return Err(malformed(
            view,
            &format!("expected at least {min_len} fields, got {}", items.len()),
        ));
    }
    Ok(items.iter().map(value_text).collect())
}

/// Text form of a scalar JSON value as it should appear on the page.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        other => other.to_string(),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_text(&value))
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let number = match &value {
        Value::Number(number) => number.as_u64().unwrap_or(0),
        Value::String(text) => text.trim().parse::<u64>().unwrap_or(0),
        _ => 0,
    };
    Ok(u32::try_from(number).unwrap_or(u32::MAX))
}

fn nullable_lines<'de, D>(deserializer: D) -> Result<Vec<TxLine>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<TxLine>>::deserialize(deserializer)?.unwrap_or_default())
}
