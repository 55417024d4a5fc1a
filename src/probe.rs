//! Readiness prober.
//!
//! Polls the server's service-capability endpoints until each answers 200 or a
//! global deadline elapses, writes a sentinel marker, then hands the process
//! over to a downstream command. A timed-out endpoint is logged and skipped,
//! never aborting the probe: the downstream command always runs, so a broken
//! service surfaces as test failures instead of a silent hang.

use std::path::Path;
use std::process::Command;
use std::time::{Duration, Instant};

use reqwest::StatusCode;

use crate::config::Config;

/// A service endpoint to poll, relative to the server base URL.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub name: &'static str,
    pub path: String,
}

impl Endpoint {
    pub fn new(name: &'static str, path: impl Into<String>) -> Self {
        Self {
            name,
            path: path.into(),
        }
    }
}

/// The fixed list of capability endpoints gating readiness.
pub fn capability_endpoints() -> Vec<Endpoint> {
    vec![
        Endpoint::new("web", "/web/"),
        Endpoint::new(
            "wms",
            "/ows?service=WMS&version=1.3.0&request=GetCapabilities",
        ),
        Endpoint::new(
            "wfs",
            "/ows?service=WFS&version=2.0.0&request=GetCapabilities",
        ),
        Endpoint::new(
            "wcs",
            "/ows?service=WCS&version=2.0.1&request=GetCapabilities",
        ),
        Endpoint::new(
            "wps",
            "/ows?service=WPS&version=1.0.0&request=GetCapabilities",
        ),
        Endpoint::new(
            "wmts",
            "/gwc/service/wmts?SERVICE=WMTS&VERSION=1.0.0&REQUEST=GetCapabilities",
        ),
        Endpoint::new("rest", "/rest/about/version.json"),
    ]
}

/// Outcome of a probe run: which endpoints answered 200 before the shared
/// deadline, and which were abandoned.
#[derive(Debug, Default)]
pub struct ProbeReport {
    pub ready: Vec<&'static str>,
    pub timed_out: Vec<&'static str>,
}

impl ProbeReport {
    pub fn all_ready(&self) -> bool {
        self.timed_out.is_empty()
    }
}

pub struct Prober {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
    timeout: Duration,
    interval: Duration,
}

impl Prober {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.geoserver_url.trim_end_matches('/').to_string(),
            username: config.geoserver_username.clone(),
            password: config.geoserver_password.clone(),
            timeout: config.max_timeout(),
            interval: Duration::from_secs(1),
        }
    }

    /// Override the retry interval (tests shrink it).
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Probe all endpoints in sequence against one shared deadline.
    ///
    /// The deadline is not reset between endpoints; once it elapses, each
    /// remaining endpoint gets exactly one attempt before being abandoned.
    pub async fn run(&self, endpoints: &[Endpoint]) -> ProbeReport {
        let deadline = Instant::now() + self.timeout;
        let mut report = ProbeReport::default();

        for endpoint in endpoints {
            if self.await_endpoint(endpoint, deadline).await {
                report.ready.push(endpoint.name);
            } else {
                report.timed_out.push(endpoint.name);
            }
        }

        report
    }

    /// Retry one endpoint until it answers 200 or the deadline passes.
    async fn await_endpoint(&self, endpoint: &Endpoint, deadline: Instant) -> bool {
        let url = format!("{}{}", self.base_url, endpoint.path);

        loop {
            match self.attempt(&url).await {
                Ok(StatusCode::OK) => {
                    tracing::info!(endpoint = endpoint.name, "service is ready");
                    return true;
                }
                Ok(status) => {
                    tracing::debug!(
                        endpoint = endpoint.name,
                        status = status.as_u16(),
                        "service not ready yet"
                    );
                }
                Err(e) => {
                    // Connection refused while the service boots; retry.
                    tracing::debug!(endpoint = endpoint.name, error = %e, "probe attempt failed");
                }
            }

            if Instant::now() >= deadline {
                tracing::warn!(
                    endpoint = endpoint.name,
                    "timed out waiting for service, moving on"
                );
                return false;
            }

            tokio::time::sleep(self.interval).await;
        }
    }

    async fn attempt(&self, url: &str) -> Result<StatusCode, reqwest::Error> {
        let response = self
            .http
            .get(url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await?;

        Ok(response.status())
    }
}

/// Run the configured health-check phase, then write the readiness marker.
///
/// With `ignore_health_check` set, polling is skipped entirely and the marker
/// is written immediately. The marker is written whatever the probe outcome.
pub async fn gate(config: &Config) -> std::io::Result<ProbeReport> {
    let report = if config.ignore_health_check {
        tracing::info!("IGNORE_HEALTH_CHECK set, skipping health checks");
        ProbeReport::default()
    } else {
        Prober::new(config).run(&capability_endpoints()).await
    };

    write_marker(&config.readiness_marker)?;
    Ok(report)
}

/// Write the sentinel marker signalling that the health-check phase finished.
pub fn write_marker(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, "ready\n")
}

/// Hand the process over to the downstream command.
///
/// On unix the process image is replaced so no wrapper lingers; elsewhere the
/// command is spawned, awaited, and its exit code forwarded. Returns only on
/// failure to launch.
pub fn exec_downstream(argv: &[String]) -> std::io::Error {
    let Some((program, args)) = argv.split_first() else {
        return std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "empty downstream command",
        );
    };

    let mut command = Command::new(program);
    command.args(args);

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.exec()
    }

    #[cfg(not(unix))]
    {
        match command.status() {
            Ok(status) => std::process::exit(status.code().unwrap_or(1)),
            Err(e) => e,
        }
    }
}
