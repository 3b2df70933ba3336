//! Class feature CRUD operations.
//!
//! Features are shared text fragments keyed by slug; classes grant them at a
//! level. Renaming a slug carries over to every grant.

use std::sync::Arc;

use grimoire_domain::{ClassFeature, Page, Slug};
use grimoire_shared::{ClassFeatureListQuery, ClassFeatureRequest};

use crate::infrastructure::ports::ClassFeatureRepo;

use super::{path_slug, ManagementError};

pub struct ClassFeatureCrud {
    repo: Arc<dyn ClassFeatureRepo>,
}

impl ClassFeatureCrud {
    pub fn new(repo: Arc<dyn ClassFeatureRepo>) -> Self {
        Self { repo }
    }

    pub async fn list(
        &self,
        query: &ClassFeatureListQuery,
    ) -> Result<Page<ClassFeature>, ManagementError> {
        Ok(self.repo.list(query).await?)
    }

    pub async fn list_all(&self) -> Result<Vec<ClassFeature>, ManagementError> {
        Ok(self.repo.list_all().await?)
    }

    pub async fn get(&self, slug: &str) -> Result<ClassFeature, ManagementError> {
        let slug = path_slug(slug)?;
        self.repo.get(&slug).await?.ok_or(ManagementError::NotFound)
    }

    pub async fn create(&self, feature: &ClassFeatureRequest) -> Result<Slug, ManagementError> {
        self.repo.create(feature).await?;
        tracing::info!(slug = %feature.slug, "Created class feature");
        Ok(feature.slug.clone())
    }

    pub async fn update(
        &self,
        slug: &str,
        feature: &ClassFeatureRequest,
    ) -> Result<(), ManagementError> {
        let slug = path_slug(slug)?;
        self.repo.update(&slug, feature).await?;
        tracing::info!(slug = %slug, new_slug = %feature.slug, "Updated class feature");
        Ok(())
    }

    /// Fails with a constraint violation while a class still grants the feature.
    pub async fn delete(&self, slug: &str) -> Result<(), ManagementError> {
        let slug = path_slug(slug)?;
        self.repo.delete(&slug).await?;
        tracing::info!(slug = %slug, "Deleted class feature");
        Ok(())
    }
}
