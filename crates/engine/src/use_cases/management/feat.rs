//! Feat CRUD operations.

use std::sync::Arc;

use grimoire_domain::{Feat, FeatId, NamedRef, Page};
use grimoire_shared::{FeatListQuery, FeatRequest};

use crate::infrastructure::ports::FeatRepo;

use super::ManagementError;

pub struct FeatCrud {
    repo: Arc<dyn FeatRepo>,
}

impl FeatCrud {
    pub fn new(repo: Arc<dyn FeatRepo>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, query: &FeatListQuery) -> Result<Page<Feat>, ManagementError> {
        Ok(self.repo.list(query).await?)
    }

    pub async fn list_all(&self) -> Result<Vec<NamedRef>, ManagementError> {
        Ok(self.repo.list_names().await?)
    }

    pub async fn get(&self, id: FeatId) -> Result<Feat, ManagementError> {
        self.repo.get(id).await?.ok_or(ManagementError::NotFound)
    }

    pub async fn create(&self, feat: &FeatRequest) -> Result<FeatId, ManagementError> {
        let id = self.repo.create(feat).await?;
        tracing::info!(feat_id = %id, name = %feat.name, "Created feat");
        Ok(id)
    }

    /// Benefit and prerequisite lists are replaced only when present.
    pub async fn update(&self, id: FeatId, feat: &FeatRequest) -> Result<(), ManagementError> {
        self.repo.update(id, feat).await?;
        tracing::info!(feat_id = %id, "Updated feat");
        Ok(())
    }

    pub async fn delete(&self, id: FeatId) -> Result<(), ManagementError> {
        self.repo.delete(id).await?;
        tracing::info!(feat_id = %id, "Deleted feat");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::MockFeatRepo;

    #[tokio::test]
    async fn list_all_passes_names_through() {
        let mut repo = MockFeatRepo::new();
        repo.expect_list_names().returning(|| {
            Ok(vec![
                NamedRef {
                    id: 1,
                    name: "Cleave".into(),
                },
                NamedRef {
                    id: 2,
                    name: "Dodge".into(),
                },
            ])
        });

        let crud = FeatCrud::new(Arc::new(repo));
        let names = crud.list_all().await.expect("names");
        assert_eq!(names.len(), 2);
        assert_eq!(names[1].name, "Dodge");
    }

    #[tokio::test]
    async fn missing_feat_is_not_found() {
        let mut repo = MockFeatRepo::new();
        repo.expect_get().returning(|_| Ok(None));

        let crud = FeatCrud::new(Arc::new(repo));
        assert!(matches!(
            crud.get(FeatId::new(1)).await,
            Err(ManagementError::NotFound)
        ));
    }
}
