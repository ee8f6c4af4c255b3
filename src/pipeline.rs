//! The provisioning and seeding run, one stage after another

use std::fmt;

use rand::Rng;
use tracing::{debug, info};

use crate::config::{SeedOptions, SeedSettings};
use crate::error::Error;
use crate::fixtures::FixtureFactory;
use crate::provision::Provisioner;
use crate::seed::{SeedReport, Seeder};
use crate::store::{BlobStore, DocumentStore};
use crate::topology::Topology;

/// A step of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    ProvisionDatabase,
    ProvisionCollections,
    SeedServices,
    ProvisionContainers,
    ProvisionQueues,
    ProvisionTables,
    SeedUsersAndMessages,
    Done,
}

impl Stage {
    /// The stage that follows, `None` once done
    pub fn next(self) -> Option<Stage> {
        use Stage::*;
        match self {
            Start => Some(ProvisionDatabase),
            ProvisionDatabase => Some(ProvisionCollections),
            ProvisionCollections => Some(SeedServices),
            SeedServices => Some(ProvisionContainers),
            ProvisionContainers => Some(ProvisionQueues),
            ProvisionQueues => Some(ProvisionTables),
            ProvisionTables => Some(SeedUsersAndMessages),
            SeedUsersAndMessages => Some(Done),
            Done => None,
        }
    }

    /// Whether the stage performs any work, as opposed to marking a boundary
    fn does_work(self) -> bool {
        !matches!(self, Stage::Start | Stage::Done)
    }

    fn provisions(self) -> bool {
        matches!(
            self,
            Stage::ProvisionDatabase
                | Stage::ProvisionCollections
                | Stage::ProvisionContainers
                | Stage::ProvisionQueues
                | Stage::ProvisionTables
        )
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Start => "start",
            Stage::ProvisionDatabase => "provision database",
            Stage::ProvisionCollections => "provision collections",
            Stage::SeedServices => "seed services",
            Stage::ProvisionContainers => "provision containers",
            Stage::ProvisionQueues => "provision queues",
            Stage::ProvisionTables => "provision tables",
            Stage::SeedUsersAndMessages => "seed users and messages",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// The first failure of a run and the stage it happened in
#[derive(Debug, thiserror::Error)]
#[error("{stage} failed: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: Error,
}

/// A single provisioning and seeding run
///
/// Without a provisioner the provisioning stages are skipped and only the
/// stores are written to.
pub struct Pipeline<'a, D: ?Sized, B: ?Sized> {
    provisioner: Option<Provisioner<'a>>,
    documents: &'a D,
    blobs: &'a B,
    topology: Topology,
    settings: &'a SeedSettings,
    options: &'a SeedOptions,
}

impl<'a, D, B> Pipeline<'a, D, B>
where
    D: DocumentStore + ?Sized,
    B: BlobStore + ?Sized,
{
    pub fn new(documents: &'a D, blobs: &'a B, settings: &'a SeedSettings, options: &'a SeedOptions) -> Self {
        Self {
            provisioner: None,
            documents,
            blobs,
            topology: Topology::new(options.composite_index),
            settings,
            options,
        }
    }

    pub fn with_provisioner(mut self, provisioner: Provisioner<'a>) -> Self {
        self.provisioner = Some(provisioner);
        self
    }

    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    /// Run every stage in order, stopping at the first failure
    pub async fn run<R: Rng>(self, factory: FixtureFactory<R>) -> Result<SeedReport, PipelineError> {
        let mut seeder = Seeder::new(self.documents, self.blobs, factory);
        let mut report = SeedReport::default();
        let mut stage = Stage::Start;

        while let Some(next) = stage.next() {
            stage = next;
            self.step(stage, &mut seeder, &mut report)
                .await
                .map_err(|source| PipelineError { stage, source })?;
        }

        info!(%report, "seeding complete");
        Ok(report)
    }

    async fn step<R: Rng>(
        &self,
        stage: Stage,
        seeder: &mut Seeder<'a, D, B, R>,
        report: &mut SeedReport,
    ) -> Result<(), Error> {
        if !stage.does_work() {
            return Ok(());
        }
        if stage.provisions() && self.provisioner.is_none() {
            debug!(%stage, "no provisioner, skipping");
            return Ok(());
        }
        info!(%stage, "stage started");

        match (stage, &self.provisioner) {
            (Stage::ProvisionDatabase, Some(p)) => {
                p.ensure_database().await?;
            }
            (Stage::ProvisionCollections, Some(p)) => {
                let created = p.ensure_collections(&self.topology.collections).await?;
                info!(total = self.topology.collections.len(), created, "collections ready");
            }
            (Stage::ProvisionContainers, Some(p)) => {
                let created = p.ensure_containers(&self.topology.containers).await?;
                info!(total = self.topology.containers.len(), created, "containers ready");
            }
            (Stage::ProvisionQueues, Some(p)) => {
                let created = p.ensure_queues(&self.topology.queues).await?;
                info!(total = self.topology.queues.len(), created, "queues ready");
            }
            (Stage::ProvisionTables, Some(p)) => {
                let created = p.ensure_tables(&self.topology.tables).await?;
                info!(total = self.topology.tables.len(), created, "tables ready");
            }
            (Stage::SeedServices, _) => seeder.seed_services(self.settings, report).await?,
            (Stage::SeedUsersAndMessages, _) => {
                seeder
                    .seed_users_and_messages(self.options.users, self.options.messages_per_user, report)
                    .await?
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Document, NewMessage, NewProfile, NewService};
    use crate::store::MemoryStore;

    #[test]
    fn test_stages_run_in_order() {
        let mut stages = vec![Stage::Start];
        while let Some(next) = stages.last().and_then(|s| s.next()) {
            stages.push(next);
        }
        assert_eq!(
            stages,
            vec![
                Stage::Start,
                Stage::ProvisionDatabase,
                Stage::ProvisionCollections,
                Stage::SeedServices,
                Stage::ProvisionContainers,
                Stage::ProvisionQueues,
                Stage::ProvisionTables,
                Stage::SeedUsersAndMessages,
                Stage::Done,
            ]
        );
    }

    #[test]
    fn test_only_boundary_stages_do_no_work() {
        let mut working = Vec::new();
        let mut stage = Stage::Start;
        assert!(!stage.does_work());
        while let Some(next) = stage.next() {
            stage = next;
            if stage.does_work() {
                working.push(stage);
            }
        }
        assert_eq!(stage, Stage::Done);
        assert!(!Stage::Done.does_work());
        assert_eq!(working.len(), 7);
        assert!(!working.contains(&Stage::Start));
        assert!(!working.contains(&Stage::Done));
    }

    #[tokio::test]
    async fn test_run_without_provisioner_seeds_the_store() {
        let store = MemoryStore::new();
        let settings = SeedSettings::default();
        let options = SeedOptions::default().with_users(2).with_messages_per_user(3);

        let report = Pipeline::new(&store, &store, &settings, &options)
            .run(FixtureFactory::seeded(5))
            .await
            .unwrap();

        assert_eq!(report.services, 2);
        assert_eq!(report.profiles, 2);
        assert_eq!(report.messages, 6);
        assert_eq!(store.count(NewService::COLLECTION), 4);
        assert_eq!(store.count(NewProfile::COLLECTION), 2);
        assert_eq!(store.count(NewMessage::COLLECTION), 6);
    }

    #[tokio::test]
    async fn test_failure_names_the_stage() {
        let store = MemoryStore::new();
        let settings = SeedSettings {
            primary_service: crate::config::ServiceSlot::new(Some("same".to_string())),
            special_service: crate::config::ServiceSlot::new(Some("same".to_string())),
            ..SeedSettings::default()
        };
        let options = SeedOptions::default();

        let err = Pipeline::new(&store, &store, &settings, &options)
            .run(FixtureFactory::seeded(5))
            .await
            .unwrap_err();

        assert_eq!(err.stage, Stage::SeedServices);
        assert!(err.source.is_conflict());
        assert!(err.to_string().starts_with("seed services failed: Cannot create service"));
        assert_eq!(store.count(NewProfile::COLLECTION), 0);
    }
}
