//! Reference table CRUD operations.

use std::sync::Arc;

use grimoire_domain::{Page, ReferenceTableData, ReferenceTableSummary, Slug};
use grimoire_shared::{ReferenceTableListQuery, ReferenceTableRequest};

use crate::infrastructure::ports::ReferenceTableRepo;

use super::{path_slug, ManagementError};

pub struct ReferenceTableCrud {
    repo: Arc<dyn ReferenceTableRepo>,
}

impl ReferenceTableCrud {
    pub fn new(repo: Arc<dyn ReferenceTableRepo>) -> Self {
        Self { repo }
    }

    pub async fn list(
        &self,
        query: &ReferenceTableListQuery,
    ) -> Result<Page<ReferenceTableSummary>, ManagementError> {
        Ok(self.repo.list(query).await?)
    }

    /// Numeric identifiers are slugs like any other.
    pub async fn get(&self, slug: &str) -> Result<ReferenceTableData, ManagementError> {
        let slug = path_slug(slug)?;
        self.repo.get(&slug).await?.ok_or(ManagementError::NotFound)
    }

    pub async fn create(&self, table: &ReferenceTableRequest) -> Result<Slug, ManagementError> {
        self.repo.create(table).await?;
        tracing::info!(
            slug = %table.slug,
            columns = table.columns.len(),
            rows = table.rows.len(),
            "Created reference table"
        );
        Ok(table.slug.clone())
    }

    /// Replaces the table's fields and its whole layout.
    pub async fn update(
        &self,
        slug: &str,
        table: &ReferenceTableRequest,
    ) -> Result<(), ManagementError> {
        let slug = path_slug(slug)?;
        self.repo.update(&slug, table).await?;
        tracing::info!(slug = %slug, new_slug = %table.slug, "Updated reference table");
        Ok(())
    }

    pub async fn delete(&self, slug: &str) -> Result<(), ManagementError> {
        let slug = path_slug(slug)?;
        self.repo.delete(&slug).await?;
        tracing::info!(slug = %slug, "Deleted reference table");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::MockReferenceTableRepo;
    use chrono::Utc;
    use grimoire_domain::ReferenceTable;

    #[tokio::test]
    async fn numeric_identifiers_are_looked_up_as_slugs() {
        let mut repo = MockReferenceTableRepo::new();
        repo.expect_get()
            .withf(|slug| slug.as_str() == "42")
            .returning(|slug| {
                Ok(Some(ReferenceTableData::assemble(
                    ReferenceTable {
                        slug: slug.clone(),
                        name: "Forty-two".into(),
                        description: None,
                        created_at: Utc::now(),
                    },
                    vec![],
                    vec![],
                )))
            });

        let crud = ReferenceTableCrud::new(Arc::new(repo));
        let table = crud.get("42").await.expect("get");
        assert_eq!(table.table.name, "Forty-two");
    }

    #[tokio::test]
    async fn unknown_slug_is_not_found() {
        let mut repo = MockReferenceTableRepo::new();
        repo.expect_get().returning(|_| Ok(None));

        let crud = ReferenceTableCrud::new(Arc::new(repo));
        assert!(matches!(
            crud.get("missing").await,
            Err(ManagementError::NotFound)
        ));
    }
}
