//! Spell CRUD operations.

use std::sync::Arc;

use grimoire_domain::{NamedRef, Page, Spell, SpellId};
use grimoire_shared::{SpellListQuery, SpellRequest};

use crate::infrastructure::ports::SpellRepo;

use super::ManagementError;

pub struct SpellCrud {
    repo: Arc<dyn SpellRepo>,
}

impl SpellCrud {
    pub fn new(repo: Arc<dyn SpellRepo>) -> Self {
        Self { repo }
    }

    /// Filtered page of spells.
    ///
    /// The comma-separated id lists in the query are parsed here; a
    /// malformed list is invalid input rather than an empty filter.
    pub async fn list(&self, query: &SpellListQuery) -> Result<Page<Spell>, ManagementError> {
        let filters = query.filters()?;
        Ok(self.repo.list(query, &filters).await?)
    }

    pub async fn list_all(&self) -> Result<Vec<NamedRef>, ManagementError> {
        Ok(self.repo.list_names().await?)
    }

    pub async fn get(&self, id: SpellId) -> Result<Spell, ManagementError> {
        self.repo.get(id).await?.ok_or(ManagementError::NotFound)
    }

    pub async fn create(&self, spell: &SpellRequest) -> Result<SpellId, ManagementError> {
        let id = self.repo.create(spell).await?;
        tracing::info!(spell_id = %id, name = %spell.name, "Created spell");
        Ok(id)
    }

    pub async fn update(&self, id: SpellId, spell: &SpellRequest) -> Result<(), ManagementError> {
        self.repo.update(id, spell).await?;
        tracing::info!(spell_id = %id, "Updated spell");
        Ok(())
    }

    pub async fn delete(&self, id: SpellId) -> Result<(), ManagementError> {
        self.repo.delete(id).await?;
        tracing::info!(spell_id = %id, "Deleted spell");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::MockSpellRepo;
    use grimoire_domain::PageRequest;

    #[tokio::test]
    async fn list_parses_id_lists_into_filters() {
        let mut repo = MockSpellRepo::new();
        repo.expect_list()
            .withf(|_, filters| filters.class_ids == vec![3, 7] && filters.school_ids == vec![5])
            .times(1)
            .returning(|query, _| Ok(Page::new(query.page_request(), 0, vec![])));

        let query = SpellListQuery {
            class_id: Some("3,7".into()),
            schools: Some("5".into()),
            ..Default::default()
        };
        let crud = SpellCrud::new(Arc::new(repo));
        let page = crud.list(&query).await.expect("list");
        assert_eq!(page.limit, PageRequest::default().limit());
    }

    #[tokio::test]
    async fn malformed_id_lists_are_invalid_input() {
        let repo = MockSpellRepo::new();
        let query = SpellListQuery {
            class_id: Some("3,wizard".into()),
            ..Default::default()
        };
        let crud = SpellCrud::new(Arc::new(repo));
        assert!(matches!(
            crud.list(&query).await,
            Err(ManagementError::InvalidInput(_))
        ));
    }
}
