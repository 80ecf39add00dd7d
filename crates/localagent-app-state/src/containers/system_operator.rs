//! Host snapshots (processes, services, metrics) and the filesystem
//! operation tracker.

use async_trait::async_trait;
use localagent_client::{ApiClient, ApiError, SystemOperatorService};
use localagent_types::system::SystemMetrics;
use localagent_types::{
    CommandOutput, FsOperation, FsOperationRequest, LogEntry, ProcessInfo, ServiceInfo,
};
use tokio::sync::RwLock;

use crate::error::StateError;
use crate::store::{Change, ResourceStore};
use crate::tracker::{JobDriver, JobTracker, JobTrackerConfig};

pub struct FsOperationDriver {
    service: SystemOperatorService,
}

#[async_trait]
impl JobDriver for FsOperationDriver {
    type Request = FsOperationRequest;
    type Record = FsOperation;

    async fn start(&self, request: &FsOperationRequest) -> Result<String, ApiError> {
        self.service
            .start_fs_operation(request)
            .await
            .map(|accepted| accepted.id)
    }

    async fn status(&self, id: &str) -> Result<FsOperation, ApiError> {
        self.service.fs_operation_status(id).await
    }

    async fn cancel(&self, id: &str) -> Result<(), ApiError> {
        self.service.cancel_fs_operation(id).await
    }
}

pub struct SystemOperatorContainer {
    service: SystemOperatorService,
    processes: ResourceStore<ProcessInfo>,
    services: ResourceStore<ServiceInfo>,
    metrics: RwLock<Option<SystemMetrics>>,
    fs_operations: JobTracker<FsOperationDriver>,
}

impl SystemOperatorContainer {
    #[must_use]
    pub fn new(client: ApiClient, config: JobTrackerConfig) -> Self {
        let service = SystemOperatorService::new(client);
        let fs_operations = JobTracker::new(
            FsOperationDriver {
                service: service.clone(),
            },
            config,
        );
        Self {
            service,
            processes: ResourceStore::new(),
            services: ResourceStore::new(),
            metrics: RwLock::new(None),
            fs_operations,
        }
    }

    #[must_use]
    pub fn processes(&self) -> &ResourceStore<ProcessInfo> {
        &self.processes
    }

    #[must_use]
    pub fn services(&self) -> &ResourceStore<ServiceInfo> {
        &self.services
    }

    #[must_use]
    pub fn fs_operations(&self) -> &JobTracker<FsOperationDriver> {
        &self.fs_operations
    }

    pub async fn refresh_processes(&self) -> Result<(), StateError> {
        self.processes.apply(Change::LoadStarted).await;
        match self.service.processes().await {
            Ok(processes) => {
                let items = processes
                    .into_iter()
                    .map(|process| (process.pid.to_string(), process))
                    .collect();
                self.processes.apply(Change::Loaded(items)).await;
                Ok(())
            }
            Err(error) => {
                self.processes.apply(Change::Failed(error.to_string())).await;
                Err(StateError::action(error))
            }
        }
    }

    pub async fn kill_process(&self, pid: u32) -> Result<(), StateError> {
        self.service
            .kill_process(pid)
            .await
            .map_err(StateError::action)?;
        self.processes.apply(Change::Removed(pid.to_string())).await;
        Ok(())
    }

    pub async fn refresh_services(&self) -> Result<(), StateError> {
        self.services.apply(Change::LoadStarted).await;
        match self.service.services().await {
            Ok(services) => {
                let items = services
                    .into_iter()
                    .map(|unit| (unit.name.clone(), unit))
                    .collect();
                self.services.apply(Change::Loaded(items)).await;
                Ok(())
            }
            Err(error) => {
                self.services.apply(Change::Failed(error.to_string())).await;
                Err(StateError::action(error))
            }
        }
    }

    pub async fn start_service(&self, name: &str) -> Result<ServiceInfo, StateError> {
        let unit = self.service.start_service(name).await;
        self.merge_service(unit).await
    }

    pub async fn stop_service(&self, name: &str) -> Result<ServiceInfo, StateError> {
        let unit = self.service.stop_service(name).await;
        self.merge_service(unit).await
    }

    pub async fn restart_service(&self, name: &str) -> Result<ServiceInfo, StateError> {
        let unit = self.service.restart_service(name).await;
        self.merge_service(unit).await
    }

    pub async fn enable_service(&self, name: &str) -> Result<ServiceInfo, StateError> {
        let unit = self.service.enable_service(name).await;
        self.merge_service(unit).await
    }

    pub async fn disable_service(&self, name: &str) -> Result<ServiceInfo, StateError> {
        let unit = self.service.disable_service(name).await;
        self.merge_service(unit).await
    }

    async fn merge_service(
        &self,
        unit: Result<ServiceInfo, ApiError>,
    ) -> Result<ServiceInfo, StateError> {
        let unit = unit.map_err(StateError::action)?;
        self.services
            .apply(Change::Merged(unit.name.clone(), unit.clone()))
            .await;
        Ok(unit)
    }

    pub async fn refresh_metrics(&self) -> Result<SystemMetrics, StateError> {
        let metrics = self.service.metrics().await.map_err(StateError::action)?;
        *self.metrics.write().await = Some(metrics.clone());
        Ok(metrics)
    }

    pub async fn metrics(&self) -> Option<SystemMetrics> {
        self.metrics.read().await.clone()
    }

    pub async fn start_fs_operation(&self, request: &FsOperationRequest) -> Result<String, StateError> {
        self.fs_operations.submit(request).await
    }

    pub async fn cancel_fs_operation(&self, id: &str) -> Result<(), StateError> {
        self.fs_operations.cancel(id).await
    }

    pub async fn execute_command(
        &self,
        command: &str,
        args: &[String],
    ) -> Result<CommandOutput, StateError> {
        self.service
            .execute_command(command, args)
            .await
            .map_err(StateError::action)
    }

    pub async fn logs(&self, limit: Option<u32>) -> Result<Vec<LogEntry>, StateError> {
        self.service.logs(limit).await.map_err(StateError::action)
    }
}
