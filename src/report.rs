use serde::Serialize;
use serde_json::json;

use crate::core::manager::{Action, RecordSet};
use crate::core::record::DNSRecord;
use crate::error::Error;

/// The JSON object printed at the end of every run.
#[derive(Debug, Default, Serialize)]
pub struct Report {
    pub changed: bool,
    pub failed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<serde_json::Value>,
    /// `get`: the record set, `{}` when there is none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<Vec<DNSRecord>>,
    /// `change-ip` / `change-ttl`: number of records the API changed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl Report {
    pub fn action(action: Action, record: impl Serialize) -> Self {
        Report {
            changed: action.changed(),
            action: Some(action),
            record: serde_json::to_value(record).ok(),
            ..Report::default()
        }
    }

    pub fn record_set(set: Option<RecordSet>) -> Self {
        let set = set
            .and_then(|s| serde_json::to_value(s).ok())
            .unwrap_or_else(|| json!({}));
        Report {
            set: Some(set),
            ..Report::default()
        }
    }

    pub fn records(records: Vec<DNSRecord>) -> Self {
        Report {
            records: Some(records),
            ..Report::default()
        }
    }

    pub fn count(count: i64) -> Self {
        Report {
            changed: count > 0,
            count: Some(count),
            ..Report::default()
        }
    }

    pub fn failure(error: &Error) -> Self {
        Report {
            failed: true,
            msg: Some(format!("{}: {error}", error.summary())),
            ..Report::default()
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            json!({ "failed": true, "msg": format!("cannot render result: {e}") }).to_string()
        })
    }
}
