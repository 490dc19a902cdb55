use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::Error;

/// TTL the provider assigns to records created without one.
pub const DEFAULT_RECORD_TTL: u32 = 86400;
/// TTL the provider assigns to new zones.
pub const DEFAULT_ZONE_TTL: u32 = 10800;

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DNSRecordType {
    A,
    AAAA,
    CNAME,
    MX,
    TXT,
    PTR,
    SRV,
    SPF,
    NS,
    CAA,
}

impl DNSRecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DNSRecordType::A => "A",
            DNSRecordType::AAAA => "AAAA",
            DNSRecordType::CNAME => "CNAME",
            DNSRecordType::MX => "MX",
            DNSRecordType::TXT => "TXT",
            DNSRecordType::PTR => "PTR",
            DNSRecordType::SRV => "SRV",
            DNSRecordType::SPF => "SPF",
            DNSRecordType::NS => "NS",
            DNSRecordType::CAA => "CAA",
        }
    }

    /// Types where several records with the same name are the normal case,
    /// so a record is only identified by its value.
    pub fn is_multi_value(&self) -> bool {
        matches!(
            self,
            DNSRecordType::MX
                | DNSRecordType::TXT
                | DNSRecordType::SRV
                | DNSRecordType::SPF
                | DNSRecordType::NS
                | DNSRecordType::CAA
        )
    }

    /// Types whose values are written as `<priority> <target>`.
    pub fn has_priority(&self) -> bool {
        matches!(self, DNSRecordType::MX | DNSRecordType::PTR)
    }
}

impl fmt::Display for DNSRecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DNSRecordType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "A" => Ok(DNSRecordType::A),
            "AAAA" => Ok(DNSRecordType::AAAA),
            "CNAME" => Ok(DNSRecordType::CNAME),
            "MX" => Ok(DNSRecordType::MX),
            "TXT" => Ok(DNSRecordType::TXT),
            "PTR" => Ok(DNSRecordType::PTR),
            "SRV" => Ok(DNSRecordType::SRV),
            "SPF" => Ok(DNSRecordType::SPF),
            "NS" => Ok(DNSRecordType::NS),
            "CAA" => Ok(DNSRecordType::CAA),
            other => Err(Error::InvalidInput(format!(
                "unsupported record type: {other}"
            ))),
        }
    }
}

/// A record as held by the provider. `name` is the prefix relative to the
/// zone, `None` for the zone apex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DNSRecord {
    pub id: Option<i64>,
    pub zone: Option<String>,
    #[serde(rename = "type")]
    pub record_type: DNSRecordType,
    pub name: Option<String>,
    pub value: String,
    pub ttl: u32,
    pub priority: Option<u32>,
}

impl DNSRecord {
    pub fn new(record_type: DNSRecordType, name: Option<&str>, value: impl Into<String>) -> Self {
        Self {
            id: None,
            zone: None,
            record_type,
            name: name.map(str::to_string),
            value: value.into(),
            ttl: DEFAULT_RECORD_TTL,
            priority: None,
        }
    }

    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_priority(mut self, priority: Option<u32>) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }
}

impl fmt::Display for DNSRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut data = Vec::new();
        if let Some(id) = self.id {
            data.push(format!("id: {id}"));
        }
        if let Some(zone) = &self.zone {
            data.push(format!("zone: {zone}"));
        }
        data.push(format!("type: {}", self.record_type));
        match &self.name {
            Some(name) => data.push(format!("prefix: \"{name}\"")),
            None => data.push("prefix: (none)".to_string()),
        }
        data.push(format!("target: \"{}\"", self.value));
        data.push(format!("ttl: {}", format_ttl(self.ttl)));
        if let Some(priority) = self.priority {
            data.push(format!("priority: {priority}"));
        }
        write!(f, "DNSRecord({})", data.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DNSZone {
    pub id: i64,
    pub user: Option<String>,
    pub name: String,
    pub email: Option<String>,
    pub ttl: u32,
    pub nameserver: Option<String>,
    pub serial: Option<String>,
    pub serial_last_update: Option<String>,
    pub refresh: Option<String>,
    pub retry: Option<String>,
    pub expire: Option<String>,
    pub template: Option<String>,
    pub ns3: Option<String>,
    pub records: Vec<DNSRecord>,
}

impl fmt::Display for DNSZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut data = vec![format!("id: {}", self.id)];
        if let Some(user) = &self.user {
            data.push(format!("user: {user}"));
        }
        data.push(format!("name: {}", self.name));
        if let Some(email) = &self.email {
            data.push(format!("email: {email}"));
        }
        data.push(format!("ttl: {}", format_ttl(self.ttl)));
        let optional = [
            ("nameserver", &self.nameserver),
            ("serial", &self.serial),
            ("serialLastUpdate", &self.serial_last_update),
            ("refresh", &self.refresh),
            ("retry", &self.retry),
            ("expire", &self.expire),
            ("template", &self.template),
            ("ns3", &self.ns3),
        ];
        for (label, value) in optional {
            if let Some(value) = value {
                data.push(format!("{label}: {value}"));
            }
        }
        for record in &self.records {
            data.push(format!("record: {record}"));
        }
        let lines: Vec<String> = data.into_iter().map(|line| format!("  {line}")).collect();
        write!(f, "DNSZone(\n{}\n)", lines.join(",\n"))
    }
}

/// Renders a TTL as `1h 2m 3s`, omitting zero components.
pub fn format_ttl(ttl: u32) -> String {
    let sec = ttl % 60;
    let min = (ttl / 60) % 60;
    let hours = ttl / 3600;
    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if min > 0 {
        parts.push(format!("{min}m"));
    }
    if sec > 0 {
        parts.push(format!("{sec}s"));
    }
    parts.join(" ")
}

/// Lowercases and strips a trailing dot.
pub fn normalize_zone(zone: &str) -> String {
    zone.trim().trim_end_matches('.').to_lowercase()
}

/// Converts a record name to its prefix within `zone`.
///
/// `@`, the empty string and the zone name itself are the apex. Names with a
/// trailing dot are absolute and must lie inside the zone; names ending in
/// `.{zone}` are stripped; anything else is taken as already relative.
pub fn record_prefix(zone: &str, name: &str) -> Result<Option<String>, Error> {
    let zone = normalize_zone(zone);
    let name = name.trim().to_lowercase();
    let absolute = name.ends_with('.');
    let name = name.trim_end_matches('.');

    if name.is_empty() || name == "@" || name == zone {
        return Ok(None);
    }
    if let Some(prefix) = name.strip_suffix(&format!(".{zone}")) {
        return Ok(Some(prefix.to_string()));
    }
    if absolute {
        return Err(Error::InvalidInput(format!(
            "record {name} is not in zone {zone}"
        )));
    }
    Ok(Some(name.to_string()))
}

/// Inverse of [`record_prefix`].
pub fn full_name(zone: &str, prefix: Option<&str>) -> String {
    let zone = normalize_zone(zone);
    match prefix {
        Some(prefix) => format!("{prefix}.{zone}"),
        None => zone,
    }
}

/// Splits `"10 mail.example.ch"` into priority and target for types that
/// carry a priority. Values without a leading number are returned unchanged.
pub fn split_priority(record_type: DNSRecordType, value: &str) -> (Option<u32>, String) {
    if record_type.has_priority() {
        if let Some((priority, target)) = value.trim().split_once(' ') {
            if let Ok(priority) = priority.parse() {
                return (Some(priority), target.trim().to_string());
            }
        }
    }
    (None, value.to_string())
}
