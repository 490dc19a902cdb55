use crate::core::record::DNSRecord;
use crate::error::Error;
use async_trait::async_trait;

/// Record-level access to a hosted zone.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DNSProvider: Send + Sync {
    fn name(&self) -> &'static str;
    async fn list_records(&self, zone: &str) -> Result<Vec<DNSRecord>, Error>;
    /// Creates `record` in `zone` and returns it as stored, id included.
    async fn add_record(&self, zone: &str, record: &DNSRecord) -> Result<DNSRecord, Error>;
    /// Replaces the record carrying `record.id`.
    async fn update_record(&self, record: &DNSRecord) -> Result<DNSRecord, Error>;
    async fn delete_record(&self, record: &DNSRecord) -> Result<(), Error>;
}
