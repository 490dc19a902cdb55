use std::sync::Arc;

use tracing::{debug, info};

use crate::auth::credentials::CredentialManager;
use crate::config::Config;
use crate::core::record::{DNSRecord, DNSZone};
use crate::providers::hosttech::error::HosttechProviderError;
use crate::providers::hosttech::operations::*;
use crate::providers::hosttech::types::{to_dns_record, to_dns_zone, to_record_data};
use crate::soap::{Credentials, Operation, ReqwestTransport, SoapClient, SoapError, Transport, Value};

/// Fault message `getZone` answers with for an unknown zone.
const ZONE_NOT_FOUND: &str = "zone not found";

pub struct HosttechProvider {
    client: SoapClient,
    credentials: Arc<dyn CredentialManager>,
}

impl HosttechProvider {
    pub fn new(
        config: &Config,
        credentials: Arc<dyn CredentialManager>,
    ) -> Result<Self, HosttechProviderError> {
        let transport = ReqwestTransport::new(config.timeout).map_err(SoapError::from)?;
        Ok(Self::with_transport(config, credentials, Arc::new(transport)))
    }

    pub fn with_transport(
        config: &Config,
        credentials: Arc<dyn CredentialManager>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            client: SoapClient::new(config.soap_config(), transport),
            credentials,
        }
    }

    fn credentials(&self) -> Result<Credentials, HosttechProviderError> {
        self.credentials
            .credentials()
            .map_err(|e| HosttechProviderError::Credential(e.to_string()))
    }

    async fn call(&self, operation: &Operation, args: Vec<Value>) -> Result<Value, HosttechProviderError> {
        let credentials = self.credentials()?;
        debug!(operation = operation.name, "calling Hosttech API");
        Ok(self.client.invoke(operation, args, &credentials).await?)
    }

    fn record_id(record: &DNSRecord) -> Result<i64, HosttechProviderError> {
        record.id.ok_or_else(|| {
            HosttechProviderError::InvalidInput(format!("record has no id: {record}"))
        })
    }

    fn record(value: &Value) -> Result<DNSRecord, HosttechProviderError> {
        to_dns_record(value)?.ok_or_else(|| {
            HosttechProviderError::InvalidData("API returned a record of unsupported type".into())
        })
    }

    pub async fn get_number_of_zones(&self) -> Result<i64, HosttechProviderError> {
        let count = self.call(&GET_NUMBER_OF_ZONES, vec![]).await?;
        count
            .as_int()
            .ok_or_else(|| HosttechProviderError::InvalidData(format!("zone count is {}", count.kind())))
    }

    /// Looks a zone up by name or id. `None` if the API does not know it.
    pub async fn get_zone(&self, search: &str) -> Result<Option<DNSZone>, HosttechProviderError> {
        match self.call(&GET_ZONE, vec![search.into()]).await {
            Ok(zone) => to_dns_zone(&zone).map(Some),
            Err(HosttechProviderError::Soap(SoapError::Fault(fault)))
                if fault.origin == "server" && fault.message == ZONE_NOT_FOUND =>
            {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn add_record(
        &self,
        search: &str,
        record: &DNSRecord,
    ) -> Result<DNSRecord, HosttechProviderError> {
        debug!(zone = search, record = %record, "adding record");
        let created = self
            .call(&ADD_RECORD, vec![search.into(), to_record_data(record)])
            .await?;
        Self::record(&created)
    }

    pub async fn get_record(&self, record_id: i64) -> Result<DNSRecord, HosttechProviderError> {
        let record = self.call(&GET_RECORD, vec![record_id.into()]).await?;
        Self::record(&record)
    }

    pub async fn update_record(&self, record: &DNSRecord) -> Result<DNSRecord, HosttechProviderError> {
        let id = Self::record_id(record)?;
        debug!(record = %record, "updating record");
        let updated = self
            .call(&UPDATE_RECORD, vec![id.into(), to_record_data(record)])
            .await?;
        Self::record(&updated)
    }

    /// Returns what the API reports, `true` if the record was removed.
    pub async fn delete_record(&self, record: &DNSRecord) -> Result<bool, HosttechProviderError> {
        let id = Self::record_id(record)?;
        debug!(record = %record, "deleting record");
        let deleted = self.call(&DELETE_RECORD, vec![id.into()]).await?;
        Ok(deleted.as_bool().unwrap_or(false))
    }

    /// Points every record targeting `current_ip` at `new_ip`. Returns the
    /// number of records changed.
    pub async fn change_ip(&self, current_ip: &str, new_ip: &str) -> Result<i64, HosttechProviderError> {
        info!(current_ip, new_ip, "changing IP");
        let count = self
            .call(&CHANGE_IP, vec![current_ip.into(), new_ip.into()])
            .await?;
        count
            .as_int()
            .ok_or_else(|| HosttechProviderError::InvalidData(format!("change count is {}", count.kind())))
    }

    /// Sets the TTL of every record targeting `ip`. Returns the number of
    /// records changed.
    pub async fn change_ttl(&self, ip: &str, ttl: u32) -> Result<i64, HosttechProviderError> {
        info!(ip, ttl, "changing TTL");
        let count = self
            .call(&CHANGE_TTL, vec![ip.into(), ttl.to_string().into()])
            .await?;
        count
            .as_int()
            .ok_or_else(|| HosttechProviderError::InvalidData(format!("change count is {}", count.kind())))
    }
}
