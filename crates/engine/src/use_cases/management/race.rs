//! Race CRUD operations.

use std::sync::Arc;

use grimoire_domain::{NamedRef, Page, Race, RaceId};
use grimoire_shared::{RaceListQuery, RaceRequest};

use crate::infrastructure::ports::RaceRepo;

use super::ManagementError;

pub struct RaceCrud {
    repo: Arc<dyn RaceRepo>,
}

impl RaceCrud {
    pub fn new(repo: Arc<dyn RaceRepo>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, query: &RaceListQuery) -> Result<Page<Race>, ManagementError> {
        Ok(self.repo.list(query).await?)
    }

    pub async fn list_all(&self) -> Result<Vec<NamedRef>, ManagementError> {
        Ok(self.repo.list_names().await?)
    }

    /// The race with its languages, ability adjustments and traits.
    pub async fn get(&self, id: RaceId) -> Result<Race, ManagementError> {
        self.repo.get(id).await?.ok_or(ManagementError::NotFound)
    }

    pub async fn create(&self, race: &RaceRequest) -> Result<RaceId, ManagementError> {
        let id = self.repo.create(race).await?;
        tracing::info!(race_id = %id, name = %race.name, "Created race");
        Ok(id)
    }

    pub async fn update(&self, id: RaceId, race: &RaceRequest) -> Result<(), ManagementError> {
        self.repo.update(id, race).await?;
        tracing::info!(race_id = %id, "Updated race");
        Ok(())
    }

    pub async fn delete(&self, id: RaceId) -> Result<(), ManagementError> {
        self.repo.delete(id).await?;
        tracing::info!(race_id = %id, "Deleted race");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{MockRaceRepo, RepoError};

    fn request() -> RaceRequest {
        RaceRequest {
            name: "Halfling".into(),
            description: None,
            size_id: Some(4),
            speed: 20,
            favored_class_id: 8,
            edition_id: Some(5),
            is_visible: true,
            languages: None,
            adjustments: None,
            traits: None,
        }
    }

    #[tokio::test]
    async fn unknown_trait_surfaces_as_constraint_violation() {
        let mut repo = MockRaceRepo::new();
        repo.expect_create()
            .returning(|_| Err(RepoError::constraint("race_trait_grants.trait_slug")));

        let crud = RaceCrud::new(Arc::new(repo));
        assert!(matches!(
            crud.create(&request()).await,
            Err(ManagementError::Repo(RepoError::ConstraintViolation(_)))
        ));
    }

    #[tokio::test]
    async fn update_passes_the_request_through() {
        let mut repo = MockRaceRepo::new();
        repo.expect_update()
            .withf(|id, race| *id == RaceId::new(3) && race.speed == 20)
            .times(1)
            .returning(|_, _| Ok(()));

        let crud = RaceCrud::new(Arc::new(repo));
        crud.update(RaceId::new(3), &request()).await.expect("update");
    }
}
