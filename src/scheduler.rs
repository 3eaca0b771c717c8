//! Background maintenance: periodic pruning of expired access tokens.
//!
//! Expired tokens already fail validation; pruning only keeps the table from
//! accumulating dead rows.

use anyhow::Result;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::config::MaintenanceConfig;
use crate::db::Store;

pub struct Scheduler {
    store: Store,
    config: MaintenanceConfig,
}

impl Scheduler {
    #[must_use]
    pub const fn new(store: Store, config: MaintenanceConfig) -> Self {
        Self { store, config }
    }

    pub async fn start(&self) -> Result<()> {
        if !self.config.enabled {
            info!("Maintenance scheduler is disabled in config");
            return Ok(());
        }

        let sched = JobScheduler::new().await?;

        let store = self.store.clone();
        let job = Job::new_async(self.config.token_prune_cron.as_str(), move |_uuid, _lock| {
            let store = store.clone();
            Box::pin(async move {
                if let Err(e) = prune_expired_tokens(&store).await {
                    error!("Token prune failed: {e}");
                }
            })
        })?;

        sched.add(job).await?;
        sched.start().await?;

        info!(
            "Maintenance scheduler running (token prune cron: {})",
            self.config.token_prune_cron
        );

        // keep the scheduler alive until the owning task is aborted
        loop {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
        }
    }

    pub async fn run_once(&self) -> Result<()> {
        prune_expired_tokens(&self.store).await
    }
}

async fn prune_expired_tokens(store: &Store) -> Result<()> {
    let pruned = store
        .prune_expired_tokens(&chrono::Utc::now().to_rfc3339())
        .await?;

    if pruned > 0 {
        info!("Pruned {pruned} expired access tokens");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SecurityConfig;
    use crate::services::token_service::generate_token;

    #[tokio::test]
    async fn test_run_once_prunes_only_expired_tokens() {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let alice = store
            .create_user(
                "alice",
                "alice@example.com",
                "password123",
                &SecurityConfig::default(),
            )
            .await
            .unwrap();
        let project = store
            .create_project_with_owner("p1", None, alice.id)
            .await
            .unwrap();

        let expired = (chrono::Utc::now() - chrono::Duration::hours(1)).to_rfc3339();
        let future = (chrono::Utc::now() + chrono::Duration::hours(1)).to_rfc3339();

        let dead = generate_token();
        let live = generate_token();
        let eternal = generate_token();
        store
            .create_access_token(&dead, alice.id, project.id, "dead", Some(expired))
            .await
            .unwrap();
        store
            .create_access_token(&live, alice.id, project.id, "live", Some(future))
            .await
            .unwrap();
        store
            .create_access_token(&eternal, alice.id, project.id, "eternal", None)
            .await
            .unwrap();

        let scheduler = Scheduler::new(store.clone(), crate::config::MaintenanceConfig::default());
        scheduler.run_once().await.unwrap();

        assert!(store.find_access_token(&dead).await.unwrap().is_none());
        assert!(store.find_access_token(&live).await.unwrap().is_some());
        assert!(store.find_access_token(&eternal).await.unwrap().is_some());
    }
}
