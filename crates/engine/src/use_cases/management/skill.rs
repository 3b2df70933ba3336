//! Skill CRUD operations.

use std::sync::Arc;

use grimoire_domain::{NamedRef, Page, Skill, SkillId};
use grimoire_shared::{SkillListQuery, SkillRequest};

use crate::infrastructure::ports::SkillRepo;

use super::ManagementError;

pub struct SkillCrud {
    repo: Arc<dyn SkillRepo>,
}

impl SkillCrud {
    pub fn new(repo: Arc<dyn SkillRepo>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, query: &SkillListQuery) -> Result<Page<Skill>, ManagementError> {
        Ok(self.repo.list(query).await?)
    }

    pub async fn list_all(&self) -> Result<Vec<NamedRef>, ManagementError> {
        Ok(self.repo.list_names().await?)
    }

    pub async fn get(&self, id: SkillId) -> Result<Skill, ManagementError> {
        self.repo.get(id).await?.ok_or(ManagementError::NotFound)
    }

    pub async fn create(&self, skill: &SkillRequest) -> Result<SkillId, ManagementError> {
        let id = self.repo.create(skill).await?;
        tracing::info!(skill_id = %id, name = %skill.name, "Created skill");
        Ok(id)
    }

    pub async fn update(&self, id: SkillId, skill: &SkillRequest) -> Result<(), ManagementError> {
        self.repo.update(id, skill).await?;
        tracing::info!(skill_id = %id, "Updated skill");
        Ok(())
    }

    pub async fn delete(&self, id: SkillId) -> Result<(), ManagementError> {
        self.repo.delete(id).await?;
        tracing::info!(skill_id = %id, "Deleted skill");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{MockSkillRepo, RepoError};
    use mockall::predicate::*;

    fn skill(id: i64) -> Skill {
        Skill {
            id: SkillId::new(id),
            name: "Tumble".into(),
            ability_id: 2,
            trained_only: true,
            affected_by_armor: true,
            description: None,
            check_description: None,
            action_description: None,
            retry_type_id: None,
            retry_description: None,
            special_notes: None,
            synergy_notes: None,
            untrained_notes: None,
        }
    }

    #[tokio::test]
    async fn get_returns_the_skill() {
        let mut repo = MockSkillRepo::new();
        repo.expect_get()
            .with(eq(SkillId::new(4)))
            .returning(|id| Ok(Some(skill(id.get()))));

        let crud = SkillCrud::new(Arc::new(repo));
        assert_eq!(crud.get(SkillId::new(4)).await.expect("get").name, "Tumble");
    }

    #[tokio::test]
    async fn delete_of_missing_skill_is_not_found() {
        let mut repo = MockSkillRepo::new();
        repo.expect_delete()
            .returning(|id| Err(RepoError::not_found("Skill", id)));

        let crud = SkillCrud::new(Arc::new(repo));
        assert!(matches!(
            crud.delete(SkillId::new(4)).await,
            Err(ManagementError::NotFound)
        ));
    }
}
