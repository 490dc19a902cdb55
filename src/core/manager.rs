use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::core::provider::DNSProvider;
use crate::core::record::{
    DNSRecord, DNSRecordType, full_name, normalize_zone, record_prefix, split_priority,
};
use crate::error::Error;

pub const DEFAULT_TTL: u32 = 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Created,
    Updated,
    Unchanged,
    Deleted,
    Absent,
}

impl Action {
    pub fn changed(&self) -> bool {
        matches!(self, Action::Created | Action::Updated | Action::Deleted)
    }
}

/// Record configuration the caller wants to exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DesiredRecord {
    pub zone: String,
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: DNSRecordType,
    pub value: Option<String>,
    pub ttl: u32,
    pub priority: Option<u32>,
}

impl DesiredRecord {
    pub fn new(zone: impl Into<String>, name: impl Into<String>, record_type: DNSRecordType) -> Self {
        Self {
            zone: zone.into(),
            name: name.into(),
            record_type,
            value: None,
            ttl: DEFAULT_TTL,
            priority: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// Records to delete: every record with this name and type, narrowed to one
/// value when given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordSelector {
    pub zone: String,
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: DNSRecordType,
    pub value: Option<String>,
}

impl RecordSelector {
    pub fn new(zone: impl Into<String>, name: impl Into<String>, record_type: DNSRecordType) -> Self {
        Self {
            zone: zone.into(),
            name: name.into(),
            record_type,
            value: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// Every record with this name and type, described by its full list of
/// values. MX and PTR values take the `"<priority> <target>"` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DesiredRecordSet {
    pub zone: String,
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: DNSRecordType,
    pub values: Vec<String>,
    pub ttl: u32,
    /// Replace a set that differs instead of failing.
    pub overwrite: bool,
}

impl DesiredRecordSet {
    pub fn new(zone: impl Into<String>, name: impl Into<String>, record_type: DNSRecordType) -> Self {
        Self {
            zone: zone.into(),
            name: name.into(),
            record_type,
            values: Vec::new(),
            ttl: DEFAULT_TTL,
            overwrite: false,
        }
    }

    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn overwrite(mut self, enabled: bool) -> Self {
        self.overwrite = enabled;
        self
    }

    /// `(priority, target)` pairs, duplicates dropped.
    fn targets(&self) -> Result<Vec<(Option<u32>, String)>, Error> {
        if self.values.is_empty() {
            return Err(Error::InvalidInput(format!(
                "no values given for the {} record set {}",
                self.record_type, self.name
            )));
        }
        let mut targets = Vec::with_capacity(self.values.len());
        for value in &self.values {
            let target = split_priority(self.record_type, value);
            if !targets.contains(&target) {
                targets.push(target);
            }
        }
        Ok(targets)
    }
}

/// All records sharing a name and type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordSet {
    pub record: String,
    #[serde(rename = "type")]
    pub record_type: DNSRecordType,
    /// Lowest TTL of the set.
    pub ttl: u32,
    pub value: Vec<String>,
    /// Distinct TTLs, only when the records disagree.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttls: Option<Vec<u32>>,
}

pub struct RecordManager {
    provider: Arc<dyn DNSProvider>,
    check_mode: bool,
}

impl RecordManager {
    pub fn new(provider: Arc<dyn DNSProvider>) -> Self {
        Self {
            provider,
            check_mode: false,
        }
    }

    /// In check mode every action is computed but nothing is written.
    pub fn check_mode(mut self, enabled: bool) -> Self {
        self.check_mode = enabled;
        self
    }

    pub async fn list_records(&self, zone: &str) -> Result<Vec<DNSRecord>, Error> {
        let zone = normalize_zone(zone);
        debug!(provider = self.provider.name(), zone, "listing records");
        self.provider.list_records(&zone).await
    }

    pub async fn ensure_record(&self, desired: &DesiredRecord) -> Result<Action, Error> {
        let zone = normalize_zone(&desired.zone);
        let prefix = record_prefix(&zone, &desired.name)?;
        let (priority, value) = match (&desired.value, desired.priority) {
            (Some(value), None) => {
                let (priority, value) = split_priority(desired.record_type, value);
                (priority, Some(value))
            }
            (value, priority) => (priority, value.clone()),
        };

        let records = self.provider.list_records(&zone).await?;
        let candidates: Vec<&DNSRecord> = records
            .iter()
            .filter(|r| r.name == prefix && r.record_type == desired.record_type)
            .collect();
        let describe = || {
            format!(
                "{} {} records named {}",
                candidates.len(),
                desired.record_type,
                full_name(&zone, prefix.as_deref())
            )
        };

        let existing = match &value {
            Some(value) => {
                let exact: Vec<&DNSRecord> = candidates
                    .iter()
                    .copied()
                    .filter(|r| r.value == *value)
                    .collect();
                match exact.len() {
                    1 => exact[0],
                    0 if candidates.is_empty() || desired.record_type.is_multi_value() => {
                        let record = DNSRecord {
                            id: None,
                            zone: None,
                            record_type: desired.record_type,
                            name: prefix.clone(),
                            value: value.clone(),
                            ttl: desired.ttl,
                            priority,
                        };
                        return self.create(&zone, record).await;
                    }
                    0 if candidates.len() == 1 => candidates[0],
                    0 => {
                        return Err(Error::AmbiguousMatch(format!(
                            "{}, none with value {value}",
                            describe()
                        )));
                    }
                    n => {
                        return Err(Error::AmbiguousMatch(format!(
                            "{n} identical {} records with value {value}",
                            desired.record_type
                        )));
                    }
                }
            }
            None => match candidates.len() {
                0 => {
                    return Err(Error::InvalidInput(format!(
                        "no {} record named {} to update and no value to create one",
                        desired.record_type,
                        full_name(&zone, prefix.as_deref())
                    )));
                }
                1 => candidates[0],
                _ => {
                    return Err(Error::AmbiguousMatch(format!(
                        "{}; give a value to pick one",
                        describe()
                    )));
                }
            },
        };

        let mut wanted = existing.clone();
        if let Some(value) = value {
            wanted.value = value;
        }
        wanted.ttl = desired.ttl;
        if priority.is_some() {
            wanted.priority = priority;
        }
        if wanted == *existing {
            debug!(record = %existing, "record unchanged");
            return Ok(Action::Unchanged);
        }

        info!(from = %existing, to = %wanted, check_mode = self.check_mode, "updating record");
        if !self.check_mode {
            self.provider.update_record(&wanted).await?;
        }
        Ok(Action::Updated)
    }

    async fn create(&self, zone: &str, record: DNSRecord) -> Result<Action, Error> {
        info!(zone, record = %record, check_mode = self.check_mode, "creating record");
        if !self.check_mode {
            self.provider.add_record(zone, &record).await?;
        }
        Ok(Action::Created)
    }

    pub async fn remove_record(&self, selector: &RecordSelector) -> Result<Action, Error> {
        let zone = normalize_zone(&selector.zone);
        let prefix = record_prefix(&zone, &selector.name)?;
        let target = selector
            .value
            .as_deref()
            .map(|v| split_priority(selector.record_type, v));

        let records = self.provider.list_records(&zone).await?;
        let matches: Vec<&DNSRecord> = records
            .iter()
            .filter(|r| r.name == prefix && r.record_type == selector.record_type)
            .filter(|r| match &target {
                Some((priority, value)) => {
                    r.value == *value && priority.is_none_or(|p| r.priority == Some(p))
                }
                None => true,
            })
            .collect();

        if matches.is_empty() {
            debug!(zone, name = %selector.name, "no record to remove");
            return Ok(Action::Absent);
        }
        for record in matches {
            info!(record = %record, check_mode = self.check_mode, "deleting record");
            if !self.check_mode {
                self.provider.delete_record(record).await?;
            }
        }
        Ok(Action::Deleted)
    }

    /// Brings the records with this name and type to exactly the listed
    /// values and TTL. An existing set that differs is an error unless
    /// `overwrite` is set, in which case differing records are rewritten in
    /// place, surplus ones deleted and missing values created.
    pub async fn ensure_record_set(&self, desired: &DesiredRecordSet) -> Result<Action, Error> {
        let zone = normalize_zone(&desired.zone);
        let prefix = record_prefix(&zone, &desired.name)?;
        let mut missing = desired.targets()?;

        let records = self.provider.list_records(&zone).await?;
        let mut found = 0;
        let mut stale: Vec<&DNSRecord> = Vec::new();
        for record in records
            .iter()
            .filter(|r| r.name == prefix && r.record_type == desired.record_type)
        {
            found += 1;
            let position = missing
                .iter()
                .position(|(priority, value)| *priority == record.priority && *value == record.value);
            match position {
                Some(i) if record.ttl == desired.ttl => {
                    missing.remove(i);
                }
                _ => stale.push(record),
            }
        }

        if stale.is_empty() && missing.is_empty() {
            debug!(zone, name = %desired.name, "record set unchanged");
            return Ok(Action::Unchanged);
        }
        if found > 0 && !desired.overwrite {
            return Err(Error::RecordSetMismatch(format!(
                "{found} {} records named {} differ from the {} requested values",
                desired.record_type,
                full_name(&zone, prefix.as_deref()),
                desired.values.len()
            )));
        }

        let mut to_update = Vec::new();
        let mut to_create = Vec::new();
        for (priority, value) in missing {
            match stale.pop() {
                Some(record) => {
                    let mut record = record.clone();
                    record.value = value;
                    record.ttl = desired.ttl;
                    record.priority = priority;
                    to_update.push(record);
                }
                None => to_create.push(DNSRecord {
                    id: None,
                    zone: None,
                    record_type: desired.record_type,
                    name: prefix.clone(),
                    value,
                    ttl: desired.ttl,
                    priority,
                }),
            }
        }
        let action = if stale.is_empty() && to_update.is_empty() {
            Action::Created
        } else {
            Action::Updated
        };

        for record in stale {
            info!(record = %record, check_mode = self.check_mode, "deleting surplus record");
            if !self.check_mode {
                self.provider.delete_record(record).await?;
            }
        }
        for record in &to_update {
            info!(to = %record, check_mode = self.check_mode, "rewriting record");
            if !self.check_mode {
                self.provider.update_record(record).await?;
            }
        }
        for record in to_create {
            self.create(&zone, record).await?;
        }
        Ok(action)
    }

    /// Deletes the records with this name and type only when they carry
    /// exactly the listed values. A set that differs is left alone.
    pub async fn remove_record_set(&self, set: &DesiredRecordSet) -> Result<Action, Error> {
        let zone = normalize_zone(&set.zone);
        let prefix = record_prefix(&zone, &set.name)?;
        let mut listed = set.targets()?;

        let records = self.provider.list_records(&zone).await?;
        let matches: Vec<&DNSRecord> = records
            .iter()
            .filter(|r| r.name == prefix && r.record_type == set.record_type)
            .collect();
        if matches.is_empty() {
            debug!(zone, name = %set.name, "no record set to remove");
            return Ok(Action::Absent);
        }

        for record in &matches {
            let position = listed.iter().position(|(priority, value)| {
                *value == record.value && priority.is_none_or(|p| record.priority == Some(p))
            });
            match position {
                Some(i) => {
                    listed.remove(i);
                }
                None => {
                    debug!(record = %record, "record not listed; leaving the set in place");
                    return Ok(Action::Unchanged);
                }
            }
        }
        if !listed.is_empty() {
            debug!(zone, name = %set.name, "listed values missing; leaving the set in place");
            return Ok(Action::Unchanged);
        }

        for record in matches {
            info!(record = %record, check_mode = self.check_mode, "deleting record");
            if !self.check_mode {
                self.provider.delete_record(record).await?;
            }
        }
        Ok(Action::Deleted)
    }

    /// Summary of the records with this name and type, `None` if there are none.
    pub async fn get_record_set(
        &self,
        zone: &str,
        name: &str,
        record_type: DNSRecordType,
    ) -> Result<Option<RecordSet>, Error> {
        let zone = normalize_zone(zone);
        let prefix = record_prefix(&zone, name)?;
        let records = self.provider.list_records(&zone).await?;
        let matches: Vec<&DNSRecord> = records
            .iter()
            .filter(|r| r.name == prefix && r.record_type == record_type)
            .collect();

        let ttls: BTreeSet<u32> = matches.iter().map(|r| r.ttl).collect();
        let Some(&ttl) = ttls.first() else {
            return Ok(None);
        };
        Ok(Some(RecordSet {
            record: full_name(&zone, prefix.as_deref()),
            record_type,
            ttl,
            value: matches.iter().map(|r| r.value.clone()).collect(),
            ttls: (ttls.len() > 1).then(|| ttls.into_iter().collect()),
        }))
    }
}
