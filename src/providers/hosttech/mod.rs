//! Hosttech DNS provider, backed by the public SOAP API.

pub mod client;
pub mod error;
pub mod operations;
pub mod types;

#[cfg(test)]
mod tests;

pub use client::HosttechProvider;
pub use error::{HosttechProviderError, map_error};

use crate::core::provider::DNSProvider;
use crate::core::record::DNSRecord;
use crate::error::Error;
use async_trait::async_trait;

#[async_trait]
impl DNSProvider for HosttechProvider {
    fn name(&self) -> &'static str {
        "hosttech"
    }

    async fn list_records(&self, zone: &str) -> Result<Vec<DNSRecord>, Error> {
        match self.get_zone(zone).await.map_err(map_error)? {
            Some(found) => Ok(found.records),
            None => Err(Error::ZoneNotFound(zone.to_string())),
        }
    }

    async fn add_record(&self, zone: &str, record: &DNSRecord) -> Result<DNSRecord, Error> {
        HosttechProvider::add_record(self, zone, record)
            .await
            .map_err(map_error)
    }

    async fn update_record(&self, record: &DNSRecord) -> Result<DNSRecord, Error> {
        HosttechProvider::update_record(self, record)
            .await
            .map_err(map_error)
    }

    async fn delete_record(&self, record: &DNSRecord) -> Result<(), Error> {
        if HosttechProvider::delete_record(self, record)
            .await
            .map_err(map_error)?
        {
            Ok(())
        } else {
            Err(Error::Provider(format!("API refused to delete {record}")))
        }
    }
}
