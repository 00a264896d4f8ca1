//! Runs embedded `PostgreSQL` lifecycle steps for the integration tests when
//! they execute as root.
//!
//! ```text
//! pg_worker <setup|start|stop> <payload-path>
//! ```
//!
//! The payload is the JSON-encoded `WorkerPayload` written by
//! `pg-embed-setup-unpriv`. `initdb` refuses to run as root, so the worker
//! switches to the `nobody` account before touching the data directory.

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[cfg(unix)]
fn main() -> Result<(), BoxError> {
    lifecycle::run().map_err(Into::into)
}

#[cfg(not(unix))]
fn main() -> Result<(), BoxError> {
    Err("pg_worker only runs on Unix platforms".into())
}

#[cfg(unix)]
mod lifecycle {
    use super::BoxError;
    use camino::Utf8Path;
    use nix::unistd::{Uid, User, initgroups, setgid, setuid};
    use pg_embedded_setup_unpriv::ambient_dir_and_path;
    use pg_embedded_setup_unpriv::worker::{PlainSecret, WorkerPayload};
    use postgresql_embedded::{PostgreSQL, Status};
    use std::env;
    use std::ffi::CString;
    use std::io::Read;
    use std::mem::ManuallyDrop;
    use thiserror::Error;
    use tokio::runtime::Builder;

    const UNPRIVILEGED_USER: &str = "nobody";

    #[derive(Debug, Error)]
    pub(super) enum WorkerError {
        #[error("usage: pg_worker <setup|start|stop> <payload-path>: {0}")]
        Usage(String),
        #[error("failed to read payload: {0}")]
        PayloadRead(#[source] BoxError),
        #[error("failed to parse payload: {0}")]
        PayloadParse(#[source] serde_json::Error),
        #[error("invalid cluster settings: {0}")]
        Settings(String),
        #[error("failed to drop privileges: {0}")]
        Privileges(String),
        #[error("failed to build runtime: {0}")]
        Runtime(#[source] std::io::Error),
        #[error("{operation} failed: {reason}")]
        Postgres {
            operation: &'static str,
            reason: String,
        },
    }

    #[derive(Debug, Clone, Copy)]
    enum Operation {
        Setup,
        Start,
        Stop,
    }

    impl Operation {
        fn parse(value: &str) -> Result<Self, WorkerError> {
            match value {
                "setup" => Ok(Self::Setup),
                "start" => Ok(Self::Start),
                "stop" => Ok(Self::Stop),
                other => Err(WorkerError::Usage(format!("unknown operation '{other}'"))),
            }
        }

        const fn as_str(self) -> &'static str {
            match self {
                Self::Setup => "setup",
                Self::Start => "start",
                Self::Stop => "stop",
            }
        }
    }

    pub(super) fn run() -> Result<(), WorkerError> {
        let args = env::args_os()
            .skip(1)
            .map(|arg| {
                arg.into_string()
                    .map_err(|_| WorkerError::Usage("arguments must be UTF-8".to_owned()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let [operation_arg, payload_path] = args.as_slice() else {
            return Err(WorkerError::Usage(format!(
                "expected two arguments, got {}",
                args.len()
            )));
        };
        let operation = Operation::parse(operation_arg)?;
        let payload = read_payload(Utf8Path::new(payload_path))?;

        demote_to(UNPRIVILEGED_USER)?;
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
        runtime.block_on(perform(operation, &mut postgres))?;
        if matches!(operation, Operation::Setup | Operation::Start) {
            // The server must outlive this process.
            let _running = ManuallyDrop::new(postgres);
        }
        Ok(())
    }

    async fn perform(operation: Operation, postgres: &mut PostgreSQL) -> Result<(), WorkerError> {
        let failed = |err: postgresql_embedded::Error| WorkerError::Postgres {
            operation: operation.as_str(),
            reason: err.to_string(),
        };
        match operation {
            Operation::Setup => {
                postgres.setup().await.map_err(failed)?;
                ensure_started(postgres).await.map_err(failed)
            }
            Operation::Start => ensure_started(postgres).await.map_err(failed),
            Operation::Stop => postgres.stop().await.map_err(failed),
        }
    }

    async fn ensure_started(postgres: &mut PostgreSQL) -> Result<(), postgresql_embedded::Error> {
        if matches!(postgres.status(), Status::Started) {
            return Ok(());
        }
        postgres.start().await
    }

    fn read_payload(path: &Utf8Path) -> Result<WorkerPayload, WorkerError> {
        let read = || -> Result<Vec<u8>, BoxError> {
            let (dir, relative) = ambient_dir_and_path(path)?;
            let mut file = dir.open(relative.as_std_path())?;
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes)?;
            Ok(bytes)
        };
        let bytes = read().map_err(WorkerError::PayloadRead)?;
        serde_json::from_slice(&bytes).map_err(WorkerError::PayloadParse)
    }

    fn demote_to(username: &str) -> Result<(), WorkerError> {
        if !Uid::effective().is_root() {
            return Ok(());
        }
        let denied = |err: nix::Error| WorkerError::Privileges(err.to_string());
        let user = User::from_name(username)
            .map_err(denied)?
            .ok_or_else(|| WorkerError::Privileges(format!("user '{username}' not found")))?;
        let name = CString::new(user.name.clone())
            .map_err(|err| WorkerError::Privileges(err.to_string()))?;
        initgroups(&name, user.gid).map_err(denied)?;
        setgid(user.gid).map_err(denied)?;
        setuid(user.uid).map_err(denied)?;

        // SAFETY: the worker is single-threaded until the runtime is built.
        unsafe {
            env::set_var("HOME", &user.dir);
            env::set_var("USER", &user.name);
            env::set_var("LOGNAME", &user.name);
        }
        Ok(())
    }

    fn apply_environment(environment: &[(String, Option<PlainSecret>)]) {
        for (key, value) in environment {
            // SAFETY: the worker is single-threaded until the runtime is built.
            unsafe {
                match value {
                    Some(secret) => env::set_var(key, secret.expose()),
                    None => env::remove_var(key),
                }
            }
        }
    }
}
