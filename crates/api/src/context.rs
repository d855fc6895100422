//! Application context - dependency injection container

use std::sync::Arc;
use std::time::Duration;

use orderbridge_common::RetryStrategy;
use orderbridge_core::{
    AccessGate, OfflineQueue, SideEffectDispatcher, SubmissionOutbox, SubmissionService,
};
use orderbridge_domain::{Config, OrderBridgeError, Result};
use orderbridge_infra::{
    DbManager, ErpClient, SqliteAccessRepository, SqliteLeadRepository,
    SqliteOfflineQueueRepository, SqliteSubmissionRepository, SyncWorker, SyncWorkerConfig,
};

/// Holds every wired service behind its port. Handlers receive this via
/// axum state; the sync worker borrows the same service instances.
pub struct AppContext {
    /// Loaded configuration
    pub config: Config,
    /// Shared database manager
    pub db: Arc<DbManager>,
    /// Submission orchestrator
    pub submissions: Arc<SubmissionService>,
    /// Outbox read access for list/summary endpoints
    pub outbox: Arc<dyn SubmissionOutbox>,
    /// Authorization gate
    pub access: Arc<dyn AccessGate>,
    /// Device-local offline queue
    pub offline_queue: Arc<dyn OfflineQueue>,
}

impl AppContext {
    /// Wire all services from configuration. Runs migrations.
    pub fn new(config: Config) -> Result<Self> {
        let db = Arc::new(DbManager::new(&config.database.path, config.database.pool_size)?);
        db.run_migrations()?;

        let outbox: Arc<dyn SubmissionOutbox> =
            Arc::new(SqliteSubmissionRepository::new(Arc::clone(&db)));
        let access: Arc<dyn AccessGate> = Arc::new(SqliteAccessRepository::new(Arc::clone(&db)));
        let leads = Arc::new(SqliteLeadRepository::new(Arc::clone(&db)));
        let offline_queue: Arc<dyn OfflineQueue> = Arc::new(SqliteOfflineQueueRepository::new(
            Arc::clone(&db),
            config.sync.device_id.clone(),
        ));

        let gateway = Arc::new(
            ErpClient::from_config(&config.erp)
                .map_err(|e| OrderBridgeError::Config(format!("ERP client setup failed: {e}")))?,
        );

        let submissions = Arc::new(SubmissionService::new(
            Arc::clone(&outbox),
            gateway,
            Arc::clone(&access),
            SideEffectDispatcher::new(leads),
        ));

        Ok(Self { config, db, submissions, outbox, access, offline_queue })
    }

    /// Build the sync worker over the wired queue and submission service.
    pub fn sync_worker(&self) -> SyncWorker {
        let worker_config = SyncWorkerConfig {
            batch_size: self.config.sync.batch_size,
            poll_interval: Duration::from_secs(self.config.sync.poll_interval_seconds),
            retry: RetryStrategy::new().with_max_attempts(self.config.sync.max_retries),
            ..SyncWorkerConfig::default()
        };
        SyncWorker::new(
            Arc::clone(&self.offline_queue),
            Arc::clone(&self.submissions) as _,
            worker_config,
        )
    }
}
