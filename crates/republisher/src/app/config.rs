use anyhow::bail;
use clap::{ArgAction, Parser};
use core::{num::NonZeroUsize, time::Duration};
use republisher_core::{Collection, CollectionTable, DispatchMode, Endpoints, HttpSettings};
use std::path::PathBuf;

/// Runtime configuration for the `republisher` binary.
///
/// Every flag can also be supplied through the environment (or a `.env`
/// file), which is how the tool is usually driven from a job scheduler.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "republisher",
    version,
    about = "Republishes native store content to the CMS notifier by UUID"
)]
pub struct CliArgs {
    /// Path to the UUIDs file.
    ///
    /// Either a JSON array of strings or plain text with one UUID per line.
    ///
    /// Environment variable: `UUIDS_FILE`
    #[arg(long = "uuids", env = "UUIDS_FILE")]
    pub uuids_file: PathBuf,

    /// Native store GET endpoint.
    ///
    /// Content is read from `<read>/<collection>/<uuid>`.
    ///
    /// Environment variable: `READ_ENDPOINT`
    #[arg(long = "read", env = "READ_ENDPOINT")]
    pub read_endpoint: String,

    /// CMS notifier POST endpoint.
    ///
    /// Environment variable: `POST_ENDPOINT`
    #[arg(long = "post", env = "POST_ENDPOINT")]
    pub post_endpoint: String,

    /// Republish identifiers concurrently. Set to `false` to process them one
    /// at a time in file order.
    ///
    /// Environment variable: `CONCURRENCY`
    #[arg(long, env = "CONCURRENCY", default_value_t = true, action = ArgAction::Set)]
    pub concurrency: bool,

    /// Upper bound on identifiers republished at the same time. Unbounded
    /// when unset. Ignored when concurrency is disabled.
    ///
    /// Environment variable: `MAX_IN_FLIGHT`
    #[arg(long, env = "MAX_IN_FLIGHT")]
    pub max_in_flight: Option<usize>,

    /// Collection to probe, as `NAME=ORIGIN_SYSTEM_ID`. Repeat the flag (or
    /// comma-separate the variable) to probe several collections in order.
    ///
    /// Defaults to `methode=methode-web-pub,wordpress=wordpress`.
    ///
    /// Environment variable: `COLLECTIONS`
    #[arg(long = "collection", env = "COLLECTIONS", value_delimiter = ',')]
    pub collections: Vec<Collection>,

    /// Per-request timeout in seconds, covering the whole request.
    ///
    /// Environment variable: `REQUEST_TIMEOUT`
    #[arg(long, env = "REQUEST_TIMEOUT", default_value_t = 30)]
    pub request_timeout: u64,

    /// TCP connect timeout in seconds.
    ///
    /// Environment variable: `CONNECT_TIMEOUT`
    #[arg(long, env = "CONNECT_TIMEOUT", default_value_t = 10)]
    pub connect_timeout: u64,

    /// Exit with a non-zero status when any entry of the UUIDs file was not
    /// republished, including entries skipped as invalid.
    ///
    /// Environment variable: `FAIL_ON_ERROR`
    #[arg(long, env = "FAIL_ON_ERROR")]
    pub fail_on_error: bool,
}

#[derive(Debug, Clone)]
pub struct RepublishConfig {
    pub uuids_file: PathBuf,
    pub endpoints: Endpoints,
    pub collections: CollectionTable,
    pub mode: DispatchMode,
    pub http: HttpSettings,
    pub fail_on_error: bool,
}

impl TryFrom<CliArgs> for RepublishConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.request_timeout == 0 {
            bail!("REQUEST_TIMEOUT must be greater than 0");
        }
        if args.connect_timeout == 0 {
            bail!("CONNECT_TIMEOUT must be greater than 0");
        }

        let mode = if args.concurrency {
            let max_in_flight = match args.max_in_flight {
                None => None,
                Some(n) => match NonZeroUsize::new(n) {
                    Some(n) => Some(n),
                    None => bail!("MAX_IN_FLIGHT must be greater than 0"),
                },
            };
            DispatchMode::Concurrent { max_in_flight }
        } else {
            DispatchMode::Sequential
        };

        let collections = if args.collections.is_empty() {
            CollectionTable::reference()
        } else {
            CollectionTable::new(args.collections)?
        };

        Ok(Self {
            uuids_file: args.uuids_file,
            endpoints: Endpoints::new(&args.read_endpoint, &args.post_endpoint)?,
            collections,
            mode,
            http: HttpSettings {
                request_timeout: Duration::from_secs(args.request_timeout),
                connect_timeout: Duration::from_secs(args.connect_timeout),
            },
            fail_on_error: args.fail_on_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: [&str; 7] = [
        "republisher",
        "--uuids",
        "uuids.json",
        "--read",
        "http://native-store:8080/content",
        "--post",
        "http://cms-notifier:8080/notify",
    ];

    fn parse(extra: &[&str]) -> anyhow::Result<RepublishConfig> {
        let args = CliArgs::try_parse_from(REQUIRED.iter().chain(extra).copied())?;
        RepublishConfig::try_from(args)
    }

    #[test]
    fn defaults_probe_methode_then_wordpress() {
        let config = parse(&[]).unwrap();

        assert_eq!(config.uuids_file, PathBuf::from("uuids.json"));
        assert_eq!(
            config.mode,
            DispatchMode::Concurrent {
                max_in_flight: None
            }
        );
        assert_eq!(config.collections, CollectionTable::reference());
        assert_eq!(config.http, HttpSettings::default());
        assert!(!config.fail_on_error);
        assert_eq!(
            config.endpoints.read_base(),
            "http://native-store:8080/content"
        );
    }

    #[test]
    fn concurrency_can_be_switched_off() {
        let config = parse(&["--concurrency", "false", "--max-in-flight", "4"]).unwrap();
        assert_eq!(config.mode, DispatchMode::Sequential);

        let config = parse(&["--concurrency=false"]).unwrap();
        assert_eq!(config.mode, DispatchMode::Sequential);
    }

    #[test]
    fn bounded_concurrency() {
        let config = parse(&["--max-in-flight", "8"]).unwrap();
        assert_eq!(
            config.mode,
            DispatchMode::Concurrent {
                max_in_flight: NonZeroUsize::new(8)
            }
        );
        assert!(parse(&["--max-in-flight", "0"]).is_err());
    }

    #[test]
    fn collections_override_keeps_order() {
        let config = parse(&[
            "--collection",
            "wordpress=wordpress",
            "--collection",
            "video=next-video-editor,methode=methode-web-pub",
        ])
        .unwrap();
        assert_eq!(config.collections.to_string(), "[wordpress video methode]");
    }

    #[test]
    fn rejects_bad_collections() {
        assert!(parse(&["--collection", "methode"]).is_err());
        assert!(parse(&["--collection", "methode=a", "--collection", "methode=b"]).is_err());
    }

    #[test]
    fn rejects_bad_endpoints_and_timeouts() {
        let args = CliArgs::try_parse_from([
            "republisher",
            "--uuids",
            "uuids.json",
            "--read",
            "native-store",
            "--post",
            "http://cms-notifier:8080/notify",
        ])
        .unwrap();
        assert!(RepublishConfig::try_from(args).is_err());

        assert!(parse(&["--request-timeout", "0"]).is_err());
        assert!(parse(&["--connect-timeout", "0"]).is_err());
    }

    #[test]
    fn fail_on_error_flag() {
        assert!(parse(&["--fail-on-error"]).unwrap().fail_on_error);
    }
}
