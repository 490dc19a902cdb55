//! Command line surface: argument parsing and the dispatch from a parsed
//! command to the record manager or the provider.

use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing::warn;

use crate::auth::credentials::{CredentialManager, EnvCredentialManager, StaticCredentialManager};
use crate::config::Config;
use crate::core::manager::{
    DEFAULT_TTL, DesiredRecord, DesiredRecordSet, RecordManager, RecordSelector,
};
use crate::core::record::DNSRecordType;
use crate::error::Error;
use crate::providers::hosttech::{HosttechProvider, map_error};
use crate::report::Report;

#[derive(Parser)]
#[command(name = "hosttech-dns")]
#[command(about = "Manage DNS records hosted by Hosttech", long_about = None)]
#[command(version)]
pub struct Cli {
    /// API username (falls back to HOSTTECH_USERNAME)
    #[arg(long, requires = "password")]
    username: Option<String>,

    /// API password (falls back to HOSTTECH_PASSWORD)
    #[arg(long, requires = "username")]
    password: Option<String>,

    /// SOAP endpoint, overrides HOSTTECH_API_URL
    #[arg(long)]
    api_url: Option<String>,

    /// Request timeout in seconds, overrides HOSTTECH_TIMEOUT
    #[arg(long)]
    timeout: Option<u64>,

    /// Report what would change without changing anything
    #[arg(long)]
    check: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct RecordArgs {
    /// Zone name (e.g. example.ch)
    #[arg(long)]
    zone: String,

    /// Record name: a prefix, a fully-qualified name, or @ for the apex
    #[arg(long)]
    record: String,

    /// Record type (A, AAAA, CNAME, MX, TXT, PTR, SRV, SPF, NS, CAA)
    #[arg(long = "type")]
    record_type: DNSRecordType,
}

#[derive(Subcommand)]
enum Commands {
    /// Ensure a record exists with the given value and TTL
    Present {
        #[command(flatten)]
        target: RecordArgs,

        /// Record value, repeat for a record set; MX and PTR accept "<priority> <target>"
        #[arg(long)]
        value: Vec<String>,

        /// TTL in seconds
        #[arg(long, default_value_t = DEFAULT_TTL)]
        ttl: u32,

        #[arg(long, conflicts_with = "overwrite")]
        priority: Option<u32>,

        /// Replace an existing record set whose values or TTL differ
        #[arg(long)]
        overwrite: bool,
    },

    /// Ensure matching records do not exist
    Absent {
        #[command(flatten)]
        target: RecordArgs,

        /// Only remove records with this value; repeated values must match the whole set
        #[arg(long)]
        value: Vec<String>,
    },

    /// Show the values and TTL of a record set
    Get {
        #[command(flatten)]
        target: RecordArgs,
    },

    /// List all records of a zone
    List {
        #[arg(long)]
        zone: String,
    },

    /// Repoint every record targeting one IP to another
    ChangeIp {
        #[arg(long)]
        from: String,

        #[arg(long)]
        to: String,
    },

    /// Set the TTL of every record targeting an IP
    ChangeTtl {
        #[arg(long)]
        ip: String,

        #[arg(long)]
        ttl: u32,
    },
}

/// Explicit flags win; otherwise credentials come from the environment.
fn credential_manager(
    username: Option<String>,
    password: Option<String>,
) -> Arc<dyn CredentialManager> {
    match (username, password) {
        (Some(username), Some(password)) => {
            Arc::new(StaticCredentialManager::new(username, password))
        }
        _ => Arc::new(EnvCredentialManager),
    }
}

pub async fn run(cli: Cli) -> Result<Report, Error> {
    let mut config = Config::from_env();
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }
    if let Some(secs) = cli.timeout {
        config.timeout = Duration::from_secs(secs);
    }

    let credentials = credential_manager(cli.username, cli.password);
    let provider = Arc::new(HosttechProvider::new(&config, credentials).map_err(map_error)?);
    let manager = RecordManager::new(provider.clone()).check_mode(cli.check);

    match cli.command {
        Commands::Present {
            target,
            value,
            ttl,
            priority,
            overwrite,
        } => {
            if overwrite || value.len() > 1 {
                if priority.is_some() {
                    return Err(Error::InvalidInput(
                        "--priority takes a single value; write \"<priority> <target>\" per value"
                            .into(),
                    ));
                }
                let desired =
                    DesiredRecordSet::new(target.zone, target.record, target.record_type)
                        .with_values(value)
                        .with_ttl(ttl)
                        .overwrite(overwrite);
                let action = manager.ensure_record_set(&desired).await?;
                return Ok(Report::action(action, &desired));
            }
            let mut desired =
                DesiredRecord::new(target.zone, target.record, target.record_type).with_ttl(ttl);
            desired.value = value.into_iter().next();
            desired.priority = priority;
            let action = manager.ensure_record(&desired).await?;
            Ok(Report::action(action, &desired))
        }
        Commands::Absent { target, value } => {
            if value.len() > 1 {
                let set = DesiredRecordSet::new(target.zone, target.record, target.record_type)
                    .with_values(value);
                let action = manager.remove_record_set(&set).await?;
                return Ok(Report::action(action, &set));
            }
            let mut selector = RecordSelector::new(target.zone, target.record, target.record_type);
            selector.value = value.into_iter().next();
            let action = manager.remove_record(&selector).await?;
            Ok(Report::action(action, &selector))
        }
        Commands::Get { target } => {
            let set = manager
                .get_record_set(&target.zone, &target.record, target.record_type)
                .await?;
            Ok(Report::record_set(set))
        }
        Commands::List { zone } => Ok(Report::records(manager.list_records(&zone).await?)),
        Commands::ChangeIp { from, to } => {
            if cli.check {
                warn!("change-ip cannot be previewed; nothing sent in check mode");
                return Ok(Report::default());
            }
            let count = provider.change_ip(&from, &to).await.map_err(map_error)?;
            Ok(Report::count(count))
        }
        Commands::ChangeTtl { ip, ttl } => {
            if cli.check {
                warn!("change-ttl cannot be previewed; nothing sent in check mode");
                return Ok(Report::default());
            }
            let count = provider.change_ttl(&ip, ttl).await.map_err(map_error)?;
            Ok(Report::count(count))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::manager::Action;
    use crate::soap::Value;
    use crate::soap::envelope::mock::response_xml;
    use assert_matches::assert_matches;
    use httpmock::prelude::*;

    const PATH: &str = "/public/api";

    fn parse(server: &MockServer, args: &[&str]) -> Cli {
        let api_url = server.url(PATH);
        let mut argv = vec!["hosttech-dns", "--api-url", api_url.as_str()];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    fn www_zone() -> Value {
        Value::Map(vec![
            ("id".into(), Value::Int(42)),
            ("name".into(), "example.ch".into()),
            ("ttl".into(), Value::Int(10800)),
            (
                "records".into(),
                Value::Array(vec![Value::Map(vec![
                    ("id".into(), Value::Int(100)),
                    ("zone".into(), Value::Int(42)),
                    ("type".into(), "A".into()),
                    ("prefix".into(), "www".into()),
                    ("target".into(), "203.0.113.5".into()),
                    ("ttl".into(), Value::Int(3600)),
                    ("priority".into(), Value::Nil),
                ])]),
            ),
        ])
    }

    #[tokio::test]
    async fn test_check_mode_sends_no_bulk_change() {
        let server = MockServer::start_async().await;
        let any = server
            .mock_async(|when, then| {
                when.method(POST).path(PATH);
                then.status(500);
            })
            .await;

        let change_ip = parse(
            &server,
            &["--username", "user", "--password", "secret", "--check", "change-ip", "--from", "192.0.2.1", "--to", "192.0.2.2"],
        );
        let report = run(change_ip).await.unwrap();
        assert!(!report.changed);
        assert!(!report.failed);
        assert_eq!(report.count, None);

        let change_ttl = parse(
            &server,
            &["--username", "user", "--password", "secret", "--check", "change-ttl", "--ip", "192.0.2.1", "--ttl", "600"],
        );
        assert!(!run(change_ttl).await.unwrap().changed);
        any.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn test_change_ip_reports_count() {
        let server = MockServer::start_async().await;
        let api = server.url(PATH);
        let change_ip = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(PATH)
                    .body_contains("<ns1:changeIp>")
                    .body_contains("<UserName>user</UserName>");
                then.status(200)
                    .body(response_xml(&api, "changeIp", Some(true), &Value::Int(3)));
            })
            .await;

        let cli = parse(
            &server,
            &["--username", "user", "--password", "secret", "change-ip", "--from", "192.0.2.1", "--to", "192.0.2.2"],
        );
        let report = run(cli).await.unwrap();
        assert!(report.changed);
        assert_eq!(report.count, Some(3));
        change_ip.assert_async().await;
    }

    #[tokio::test]
    async fn test_credentials_fall_back_to_environment() {
        let server = MockServer::start_async().await;
        let any = server
            .mock_async(|when, then| {
                when.method(POST).path(PATH);
                then.status(500);
            })
            .await;

        let cli = parse(&server, &["list", "--zone", "example.ch"]);
        let err = run(cli).await.unwrap_err();
        assert_matches!(err, Error::Credential(msg) if msg.contains("HOSTTECH_USERNAME"));
        any.assert_hits_async(0).await;
    }

    #[test]
    fn test_username_requires_password() {
        assert!(
            Cli::try_parse_from(["hosttech-dns", "--username", "user", "list", "--zone", "example.ch"])
                .is_err()
        );
        assert!(
            Cli::try_parse_from([
                "hosttech-dns", "present", "--zone", "example.ch", "--record", "@", "--type", "MX",
                "--value", "10 mx.example.ch", "--priority", "10", "--overwrite",
            ])
            .is_err()
        );
    }

    #[tokio::test]
    async fn test_repeated_values_manage_a_record_set() {
        let server = MockServer::start_async().await;
        let api = server.url(PATH);
        let get_zone = server
            .mock_async(|when, then| {
                when.method(POST).path(PATH).body_contains("<ns1:getZone>");
                then.status(200)
                    .body(response_xml(&api, "getZone", Some(true), &www_zone()));
            })
            .await;
        let add = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(PATH)
                    .body_contains("<ns1:addRecord>")
                    .body_contains(r#"<value xsi:type="xsd:string">203.0.113.6</value>"#);
                then.status(200).body(response_xml(
                    &api,
                    "addRecord",
                    Some(true),
                    &Value::Map(vec![
                        ("id".into(), Value::Int(101)),
                        ("zone".into(), Value::Int(42)),
                        ("type".into(), "A".into()),
                        ("prefix".into(), "www".into()),
                        ("target".into(), "203.0.113.6".into()),
                        ("ttl".into(), Value::Int(3600)),
                        ("priority".into(), Value::Nil),
                    ]),
                ));
            })
            .await;

        let args = [
            "--username", "user", "--password", "secret", "present", "--zone", "example.ch",
            "--record", "www", "--type", "A", "--value", "203.0.113.5", "--value", "203.0.113.6",
        ];
        let err = run(parse(&server, &args)).await.unwrap_err();
        assert_matches!(err, Error::RecordSetMismatch(_));
        add.assert_hits_async(0).await;

        let mut overwrite = args.to_vec();
        overwrite.push("--overwrite");
        let report = run(parse(&server, &overwrite)).await.unwrap();
        assert!(report.changed);
        assert_eq!(report.action, Some(Action::Created));
        assert_eq!(
            report.record.unwrap()["values"],
            serde_json::json!(["203.0.113.5", "203.0.113.6"])
        );
        get_zone.assert_hits_async(2).await;
        add.assert_hits_async(1).await;
    }
}
