//! Character CRUD operations.
//!
//! Characters belong to the user that created them. Admins may act on any
//! character and may assign it to another user with `userId`.

use std::sync::Arc;

use grimoire_domain::{Character, CharacterId, Page, UserId};
use grimoire_shared::{CharacterListQuery, CharacterRequest};

use crate::infrastructure::ports::CharacterRepo;

use super::ManagementError;

/// The authenticated user performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub is_admin: bool,
}

impl Actor {
    /// Owner for a write: admins may name one, everyone else owns their own.
    fn owner_for(&self, requested: Option<i64>, current: UserId) -> UserId {
        match requested {
            Some(id) if self.is_admin => UserId::new(id),
            _ => current,
        }
    }
}

pub struct CharacterCrud {
    repo: Arc<dyn CharacterRepo>,
}

impl CharacterCrud {
    pub fn new(repo: Arc<dyn CharacterRepo>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, query: &CharacterListQuery) -> Result<Page<Character>, ManagementError> {
        Ok(self.repo.list(query).await?)
    }

    pub async fn get(&self, id: CharacterId) -> Result<Character, ManagementError> {
        self.repo.get(id).await?.ok_or(ManagementError::NotFound)
    }

    pub async fn create(
        &self,
        actor: Actor,
        character: &CharacterRequest,
    ) -> Result<CharacterId, ManagementError> {
        let owner = actor.owner_for(character.user_id, actor.user_id);
        let id = self.repo.create(owner, character).await?;
        tracing::info!(character_id = %id, user_id = %owner, "Created character");
        Ok(id)
    }

    pub async fn update(
        &self,
        actor: Actor,
        id: CharacterId,
        character: &CharacterRequest,
    ) -> Result<(), ManagementError> {
        let existing = self.owned(actor, id).await?;
        let owner = actor.owner_for(character.user_id, existing.user_id);
        self.repo.update(id, owner, character).await?;
        tracing::info!(character_id = %id, user_id = %owner, "Updated character");
        Ok(())
    }

    pub async fn delete(&self, actor: Actor, id: CharacterId) -> Result<(), ManagementError> {
        self.owned(actor, id).await?;
        self.repo.delete(id).await?;
        tracing::info!(character_id = %id, user_id = %actor.user_id, "Deleted character");
        Ok(())
    }

    async fn owned(&self, actor: Actor, id: CharacterId) -> Result<Character, ManagementError> {
        let character = self.get(id).await?;
        if !actor.is_admin && !character.is_owned_by(actor.user_id) {
            tracing::warn!(
                character_id = %id,
                user_id = %actor.user_id,
                "Rejected write to another user's character"
            );
            return Err(ManagementError::Forbidden(
                "You can only modify your own characters".into(),
            ));
        }
        Ok(character)
    }
}
