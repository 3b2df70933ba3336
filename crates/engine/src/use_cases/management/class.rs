//! Class CRUD operations.

use std::sync::Arc;

use grimoire_domain::{Class, ClassId, NamedRef, Page};
use grimoire_shared::{ClassListQuery, ClassRequest};

use crate::infrastructure::ports::ClassRepo;

use super::ManagementError;

pub struct ClassCrud {
    repo: Arc<dyn ClassRepo>,
}

impl ClassCrud {
    pub fn new(repo: Arc<dyn ClassRepo>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, query: &ClassListQuery) -> Result<Page<Class>, ManagementError> {
        Ok(self.repo.list(query).await?)
    }

    pub async fn list_all(&self) -> Result<Vec<NamedRef>, ManagementError> {
        Ok(self.repo.list_names().await?)
    }

    pub async fn get(&self, id: ClassId) -> Result<Class, ManagementError> {
        self.repo.get(id).await?.ok_or(ManagementError::NotFound)
    }

    pub async fn create(&self, class: &ClassRequest) -> Result<ClassId, ManagementError> {
        let id = self.repo.create(class).await?;
        tracing::info!(class_id = %id, name = %class.name, "Created class");
        Ok(id)
    }

    /// Replaces the class. Features are replaced only when the request has them.
    pub async fn update(&self, id: ClassId, class: &ClassRequest) -> Result<(), ManagementError> {
        self.repo.update(id, class).await?;
        tracing::info!(class_id = %id, "Updated class");
        Ok(())
    }

    pub async fn delete(&self, id: ClassId) -> Result<(), ManagementError> {
        self.repo.delete(id).await?;
        tracing::info!(class_id = %id, "Deleted class");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{MockClassRepo, RepoError};
    use mockall::predicate::*;

    fn request() -> ClassRequest {
        ClassRequest {
            name: "Wizard".into(),
            abbreviation: "Wiz".into(),
            edition_id: Some(5),
            is_prestige: false,
            is_visible: true,
            can_cast_spells: true,
            hit_die: 4,
            skill_points: 2,
            casting_ability_id: Some(4),
            description: None,
            features: None,
        }
    }

    #[tokio::test]
    async fn get_missing_class_is_not_found() {
        let mut repo = MockClassRepo::new();
        repo.expect_get()
            .with(eq(ClassId::new(9)))
            .returning(|_| Ok(None));

        let crud = ClassCrud::new(Arc::new(repo));
        assert!(matches!(
            crud.get(ClassId::new(9)).await,
            Err(ManagementError::NotFound)
        ));
    }

    #[tokio::test]
    async fn create_returns_the_new_id() {
        let mut repo = MockClassRepo::new();
        repo.expect_create()
            .withf(|class| class.name == "Wizard")
            .returning(|_| Ok(ClassId::new(11)));

        let crud = ClassCrud::new(Arc::new(repo));
        assert_eq!(crud.create(&request()).await.expect("create"), ClassId::new(11));
    }

    #[tokio::test]
    async fn duplicate_names_surface_as_repo_conflicts() {
        let mut repo = MockClassRepo::new();
        repo.expect_create()
            .returning(|_| Err(RepoError::conflict("classes.name")));

        let crud = ClassCrud::new(Arc::new(repo));
        assert!(matches!(
            crud.create(&request()).await,
            Err(ManagementError::Repo(RepoError::Conflict(_)))
        ));
    }

    #[tokio::test]
    async fn update_of_missing_class_is_not_found() {
        let mut repo = MockClassRepo::new();
        repo.expect_update()
            .returning(|id, _| Err(RepoError::not_found("Class", id)));

        let crud = ClassCrud::new(Arc::new(repo));
        assert!(matches!(
            crud.update(ClassId::new(2), &request()).await,
            Err(ManagementError::NotFound)
        ));
    }
}
