//! Race trait CRUD operations.

use std::sync::Arc;

use grimoire_domain::{Page, RaceTrait, Slug};
use grimoire_shared::{RaceTraitListQuery, RaceTraitRequest};

use crate::infrastructure::ports::RaceTraitRepo;

use super::{path_slug, ManagementError};

pub struct RaceTraitCrud {
    repo: Arc<dyn RaceTraitRepo>,
}

impl RaceTraitCrud {
    pub fn new(repo: Arc<dyn RaceTraitRepo>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, query: &RaceTraitListQuery) -> Result<Page<RaceTrait>, ManagementError> {
        Ok(self.repo.list(query).await?)
    }

    pub async fn list_all(&self) -> Result<Vec<RaceTrait>, ManagementError> {
        Ok(self.repo.list_all().await?)
    }

    pub async fn get(&self, slug: &str) -> Result<RaceTrait, ManagementError> {
        let slug = path_slug(slug)?;
        self.repo.get(&slug).await?.ok_or(ManagementError::NotFound)
    }

    pub async fn create(&self, race_trait: &RaceTraitRequest) -> Result<Slug, ManagementError> {
        self.repo.create(race_trait).await?;
        tracing::info!(slug = %race_trait.slug, "Created race trait");
        Ok(race_trait.slug.clone())
    }

    pub async fn update(
        &self,
        slug: &str,
        race_trait: &RaceTraitRequest,
    ) -> Result<(), ManagementError> {
        let slug = path_slug(slug)?;
        self.repo.update(&slug, race_trait).await?;
        tracing::info!(slug = %slug, new_slug = %race_trait.slug, "Updated race trait");
        Ok(())
    }

    pub async fn delete(&self, slug: &str) -> Result<(), ManagementError> {
        let slug = path_slug(slug)?;
        self.repo.delete(&slug).await?;
        tracing::info!(slug = %slug, "Deleted race trait");
        Ok(())
    }
}
