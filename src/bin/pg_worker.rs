//! Runs one embedded `PostgreSQL` lifecycle step on behalf of a root test run.
//!
//! Usage:
//!
//! ```text
//! pg_worker <setup|start|stop> <config-path>
//! ```
//!
//! `config-path` names a JSON [`WorkerPayload`] written by the launcher. The
//! launcher demotes this process to `nobody` before `exec`, so the cluster is
//! owned by an unprivileged account even when the tests run as root.

#[cfg(unix)]
use camino::{Utf8Path, Utf8PathBuf};
#[cfg(unix)]
use pg_embedded_setup_unpriv::ambient_dir_and_path;
#[cfg(unix)]
use pg_embedded_setup_unpriv::worker::{PlainSecret, WorkerPayload};
#[cfg(unix)]
use postgresql_embedded::{PostgreSQL, Status};
#[cfg(unix)]
use std::io::Read;
#[cfg(unix)]
use thiserror::Error;
#[cfg(unix)]
use tokio::runtime::Builder;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[cfg(unix)]
#[derive(Debug, Error)]
enum WorkerError {
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
    #[error("failed to read worker config: {0}")]
    ConfigRead(#[source] BoxError),
    #[error("failed to parse worker config: {0}")]
    ConfigParse(#[source] serde_json::Error),
    #[error("settings conversion failed: {0}")]
    Settings(String),
    #[error("runtime init failed: {0}")]
    Runtime(#[source] std::io::Error),
    #[error("cluster {step} failed: {source}")]
    Cluster {
        step: &'static str,
        #[source]
        source: postgresql_embedded::Error,
    },
}

#[cfg(unix)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Setup,
    Start,
    Stop,
}

#[cfg(unix)]
impl Step {
    fn parse(arg: &str) -> Result<Self, WorkerError> {
        match arg {
            "setup" => Ok(Self::Setup),
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            other => Err(WorkerError::InvalidArgs(format!(
                "unknown operation '{other}'; expected setup, start, or stop"
            ))),
        }
    }
}

#[cfg(unix)]
fn main() -> Result<(), BoxError> {
    let (step, config_path) = parse_args(std::env::args())?;
    run(step, &config_path).map_err(Into::into)
}

#[cfg(unix)]
fn parse_args(mut args: impl Iterator<Item = String>) -> Result<(Step, Utf8PathBuf), WorkerError> {
    drop(args.next());
    let step = args
        .next()
        .ok_or_else(|| WorkerError::InvalidArgs("missing operation argument".into()))
        .and_then(|arg| Step::parse(&arg))?;
    let config_path = args
        .next()
        .map(Utf8PathBuf::from)
        .ok_or_else(|| WorkerError::InvalidArgs("missing config path argument".into()))?;
    if let Some(extra) = args.next() {
        return Err(WorkerError::InvalidArgs(format!(
            "unexpected extra argument: {extra}"
        )));
    }
    Ok((step, config_path))
}

#[cfg(unix)]
fn run(step: Step, config_path: &Utf8Path) -> Result<(), WorkerError> {
    let payload = load_payload(config_path)?;
    let settings = payload
        .settings
        .into_settings()
        .map_err(|err| WorkerError::Settings(err.to_string()))?;
    apply_environment(&payload.environment);
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(WorkerError::Runtime)?;

    let mut postgres = PostgreSQL::new(settings);
    runtime.block_on(async {
        match step {
            Step::Setup => {
                postgres.setup().await.map_err(cluster_error("setup"))?;
                ensure_started(&mut postgres).await
            }
            Step::Start => ensure_started(&mut postgres).await,
            Step::Stop => postgres.stop().await.map_err(cluster_error("stop")),
        }
    })?;
    if step != Step::Stop {
        // The server must outlive this process; dropping the handle stops it.
        std::mem::forget(postgres);
    }
    Ok(())
}

#[cfg(unix)]
async fn ensure_started(postgres: &mut PostgreSQL) -> Result<(), WorkerError> {
    if matches!(postgres.status(), Status::Started) {
        return Ok(());
    }
    postgres.start().await.map_err(cluster_error("start"))
}

#[cfg(unix)]
fn cluster_error(step: &'static str) -> impl Fn(postgresql_embedded::Error) -> WorkerError {
    move |source| WorkerError::Cluster { step, source }
}

#[cfg(unix)]
fn load_payload(path: &Utf8Path) -> Result<WorkerPayload, WorkerError> {
    let read = || -> Result<Vec<u8>, BoxError> {
        let (dir, relative) = ambient_dir_and_path(path)?;
        let mut file = dir.open(relative.as_std_path())?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        Ok(bytes)
    };
    let bytes = read().map_err(WorkerError::ConfigRead)?;
    serde_json::from_slice(&bytes).map_err(WorkerError::ConfigParse)
}

#[cfg(unix)]
fn apply_environment(environment: &[(String, Option<PlainSecret>)]) {
    for (key, value) in environment {
        // SAFETY: runs before the runtime starts, while the process is single-threaded.
        unsafe {
            match value {
                Some(plain) => std::env::set_var(key, plain.expose()),
                None => std::env::remove_var(key),
            }
        }
    }
}

#[cfg(not(unix))]
fn main() -> Result<(), BoxError> {
    Err("pg_worker is only supported on Unix platforms".into())
}
