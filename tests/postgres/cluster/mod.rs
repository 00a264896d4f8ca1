//! Embedded `PostgreSQL` cluster shared by the integration tests.
//!
//! The cluster is bootstrapped once per test binary. Unprivileged runs start
//! it in process; root runs hand setup and start to the `pg_worker` binary,
//! which drops privileges first.


use self::env_utils::{env_pairs, worker_env_changes};
use self::fs_utils::{sync_password_from_file, sync_port_from_pid};
use super::helpers::BoxError;
use crate::test_helpers::EnvVarGuard;
use pg_embedded_setup_unpriv::worker_process_test_api::{
    WorkerOperation, WorkerRequest, WorkerRequestArgs, run as run_worker,
};
use pg_embedded_setup_unpriv::{ExecutionPrivileges, TestBootstrapSettings, bootstrap_for_tests};
use postgresql_embedded::{PostgreSQL, Status};
use std::sync::OnceLock;
use std::thread;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};

static SHARED_CLUSTER: OnceLock<Result<EmbeddedCluster, String>> = OnceLock::new();

/// Running embedded cluster and the settings needed to reach it.
pub struct EmbeddedCluster {
    bootstrap: TestBootstrapSettings,
    env_vars: Vec<(String, Option<String>)>,
    runtime: Option<Runtime>,
    postgres: Option<PostgreSQL>,
}

impl EmbeddedCluster {
    /// Connection URL for `database` on this cluster.
    #[must_use]
    pub fn database_url(&self, database: &str) -> String {
        self.bootstrap.settings.url(database)
    }

    fn start() -> Result<Self, BoxError> {
        let worker_env = worker_env_changes()?;
        let worker_guard = EnvVarGuard::set_many(&env_pairs(&worker_env));
        let bootstrap = bootstrap_for_tests();
        drop(worker_guard);
        let mut bootstrap = bootstrap.map_err(|err| Box::new(err) as BoxError)?;
        sync_password_from_file(&mut bootstrap.settings)?;
        let env_vars = bootstrap.environment.to_env();
        let mut cluster = Self {
            bootstrap,
            env_vars,
            runtime: None,
            postgres: None,
        };
        match cluster.bootstrap.privileges {
            ExecutionPrivileges::Root => cluster.start_via_worker()?,
            ExecutionPrivileges::Unprivileged => cluster.start_in_process()?,
        }
        sync_port_from_pid(&mut cluster.bootstrap.settings)?;
        Ok(cluster)
    }

    fn start_in_process(&mut self) -> Result<(), BoxError> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        let env_guard = EnvVarGuard::set_many(&env_pairs(&self.env_vars));
        let mut postgres = PostgreSQL::new(self.bootstrap.settings.clone());
        let started = runtime.block_on(async {
            postgres.setup().await?;
            if !matches!(postgres.status(), Status::Started) {
                postgres.start().await?;
            }
            Ok::<(), postgresql_embedded::Error>(())
        });
        drop(env_guard);
        started.map_err(|err| Box::new(err) as BoxError)?;
        self.bootstrap.settings = postgres.settings().clone();
        self.runtime = Some(runtime);
        self.postgres = Some(postgres);
        Ok(())
    }

    fn start_via_worker(&self) -> Result<(), BoxError> {
        self.run_worker_operation(WorkerOperation::Setup, self.bootstrap.setup_timeout)?;
        self.run_worker_operation(WorkerOperation::Start, self.bootstrap.start_timeout)
    }

    fn run_worker_operation(
        &self,
        operation: WorkerOperation,
        timeout: Duration,
    ) -> Result<(), BoxError> {
        let worker = self.bootstrap.worker_binary.as_ref().ok_or_else(|| {
            Box::new(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "PG_EMBEDDED_WORKER is not set for a root test run",
            )) as BoxError
        })?;
        let args = WorkerRequestArgs {
            worker: worker.as_path(),
            settings: &self.bootstrap.settings,
            env_vars: &self.env_vars,
            operation,
            timeout,
        };
        run_worker(&WorkerRequest::new(args)).map_err(|err| Box::new(err) as BoxError)
    }

    fn stop(&mut self) -> Result<(), BoxError> {
        if let Some(postgres) = self.postgres.take() {
            let Some(runtime) = self.runtime.as_ref() else {
                return Ok(());
            };
            return runtime
                .block_on(postgres.stop())
                .map_err(|err| Box::new(err) as BoxError);
        }
        if matches!(self.bootstrap.privileges, ExecutionPrivileges::Root) {
            self.run_worker_operation(WorkerOperation::Stop, self.bootstrap.shutdown_timeout)?;
        }
        Ok(())
    }
}

impl Drop for EmbeddedCluster {
    fn drop(&mut self) {
        if let Err(err) = self.stop() {
            tracing::warn!(error = %err, "embedded cluster not stopped");
        }
    }
}

/// Returns the cluster for this test binary, starting it on first use.
///
/// Startup runs on a dedicated thread so that it can drive its own runtime
/// from inside an async test.
///
/// # Errors
///
/// Returns an error when the cluster cannot be bootstrapped or started.
pub fn shared_cluster() -> Result<&'static EmbeddedCluster, BoxError> {
    let cluster = SHARED_CLUSTER.get_or_init(|| {
        thread::spawn(|| EmbeddedCluster::start().map_err(|err| err.to_string()))
            .join()
            .unwrap_or_else(|_| Err("cluster startup thread panicked".to_owned()))
    });
    cluster.as_ref().map_err(|err| err.clone().into())
}
