use tracing::warn;

use crate::core::record::{DEFAULT_RECORD_TTL, DEFAULT_ZONE_TTL, DNSRecord, DNSRecordType, DNSZone};
use crate::providers::hosttech::error::HosttechProviderError;
use crate::soap::Value;

fn field<'a>(data: &'a Value, key: &str) -> Result<&'a Value, HosttechProviderError> {
    data.get(key)
        .filter(|v| !v.is_nil())
        .ok_or_else(|| HosttechProviderError::InvalidData(format!("missing {key}")))
}

fn int_field(data: &Value, key: &str) -> Result<i64, HosttechProviderError> {
    field(data, key)?
        .as_int()
        .ok_or_else(|| HosttechProviderError::InvalidData(format!("{key} is not an integer")))
}

fn u32_field(data: &Value, key: &str) -> Result<Option<u32>, HosttechProviderError> {
    match data.get(key).and_then(Value::as_int) {
        Some(n) => u32::try_from(n)
            .map(Some)
            .map_err(|_| HosttechProviderError::InvalidData(format!("{key} out of range: {n}"))),
        None => Ok(None),
    }
}

fn text_field(data: &Value, key: &str) -> Result<String, HosttechProviderError> {
    field(data, key)?
        .to_text()
        .ok_or_else(|| HosttechProviderError::InvalidData(format!("{key} is not a scalar")))
}

fn optional_text(data: &Value, key: &str) -> Option<String> {
    data.get(key)
        .and_then(Value::to_text)
        .filter(|s| !s.is_empty())
}

/// Decodes one record map. Records of types this crate does not manage are
/// skipped with `Ok(None)`.
pub fn to_dns_record(data: &Value) -> Result<Option<DNSRecord>, HosttechProviderError> {
    let type_name = text_field(data, "type")?;
    let Ok(record_type) = type_name.parse::<DNSRecordType>() else {
        warn!(record_type = %type_name, "skipping record of unsupported type");
        return Ok(None);
    };
    Ok(Some(DNSRecord {
        id: Some(int_field(data, "id")?),
        zone: optional_text(data, "zone"),
        record_type,
        name: optional_text(data, "prefix"),
        value: text_field(data, "target")?,
        ttl: u32_field(data, "ttl")?.unwrap_or(DEFAULT_RECORD_TTL),
        priority: u32_field(data, "priority")?,
    }))
}

pub fn to_dns_zone(data: &Value) -> Result<DNSZone, HosttechProviderError> {
    let entries: Vec<&Value> = match data.get("records") {
        None | Some(Value::Nil) => Vec::new(),
        Some(Value::Array(items)) => items.iter().collect(),
        // PHP arrays with non-sequential keys arrive as maps
        Some(Value::Map(items)) => items.iter().map(|(_, v)| v).collect(),
        Some(other) => {
            return Err(HosttechProviderError::InvalidData(format!(
                "records is a {}",
                other.kind()
            )));
        }
    };
    let records = entries
        .into_iter()
        .map(to_dns_record)
        .filter_map(Result::transpose)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DNSZone {
        id: int_field(data, "id")?,
        user: optional_text(data, "user"),
        name: text_field(data, "name")?,
        email: optional_text(data, "email"),
        ttl: u32_field(data, "ttl")?.unwrap_or(DEFAULT_ZONE_TTL),
        nameserver: optional_text(data, "nameserver"),
        serial: optional_text(data, "serial"),
        serial_last_update: optional_text(data, "serialLastUpdate"),
        refresh: optional_text(data, "refresh"),
        retry: optional_text(data, "retry"),
        expire: optional_text(data, "expire"),
        template: optional_text(data, "template"),
        ns3: optional_text(data, "ns3"),
        records,
    })
}

/// The `recorddata` map sent on add and update. Ids travel as separate
/// parameters.
pub fn to_record_data(record: &DNSRecord) -> Value {
    Value::Map(vec![
        ("type".into(), record.record_type.as_str().into()),
        ("prefix".into(), record.name.clone().into()),
        ("target".into(), record.value.as_str().into()),
        ("ttl".into(), record.ttl.into()),
        ("priority".into(), record.priority.into()),
    ])
}
