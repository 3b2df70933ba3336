//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::{
    auth::{PasswordHasher, TokenService},
    cache::TtlCache,
    config::AppConfig,
    lookup_cache::LookupCache,
    ports::{
        CharacterRepo, ClassFeatureRepo, ClassRepo, ClockPort, EntityLookupRepo, FeatRepo,
        LookupRepo, RaceRepo, RaceTraitRepo, ReferenceTableRepo, SkillRepo, SpellRepo, UserRepo,
    },
    sqlite::SqliteRepositories,
};
use crate::use_cases::{
    self, AuthUseCases, LookupUseCases, ManagementUseCases, ProfileUseCases, RenderMarkdown,
    ResolutionCache, ResolveEntities,
};

/// Main application state.
///
/// Holds the repositories and use cases. Passed to HTTP handlers via Axum
/// state.
pub struct App {
    pub config: AppConfig,
    pub tokens: Arc<TokenService>,
    pub repositories: Repositories,
    pub use_cases: UseCases,
    pub resolution_cache: Arc<ResolutionCache>,
}

/// Container for all repository ports.
pub struct Repositories {
    pub user: Arc<dyn UserRepo>,
    pub class: Arc<dyn ClassRepo>,
    pub class_feature: Arc<dyn ClassFeatureRepo>,
    pub race: Arc<dyn RaceRepo>,
    pub race_trait: Arc<dyn RaceTraitRepo>,
    pub skill: Arc<dyn SkillRepo>,
    pub feat: Arc<dyn FeatRepo>,
    pub spell: Arc<dyn SpellRepo>,
    pub character: Arc<dyn CharacterRepo>,
    pub reference_table: Arc<dyn ReferenceTableRepo>,
    pub lookup: Arc<dyn LookupRepo>,
    pub entity_lookup: Arc<dyn EntityLookupRepo>,
}

impl From<SqliteRepositories> for Repositories {
    fn from(repos: SqliteRepositories) -> Self {
        Self {
            user: repos.user,
            class: repos.class,
            class_feature: repos.class_feature,
            race: repos.race,
            race_trait: repos.race_trait,
            skill: repos.skill,
            feat: repos.feat,
            spell: repos.spell,
            character: repos.character,
            reference_table: repos.reference_table,
            lookup: repos.lookup,
            entity_lookup: repos.entity_lookup,
        }
    }
}

/// Container for all use cases.
pub struct UseCases {
    pub auth: AuthUseCases,
    pub profile: ProfileUseCases,
    pub management: ManagementUseCases,
    pub lookups: LookupUseCases,
    pub resolve: Arc<ResolveEntities>,
    pub markdown: RenderMarkdown,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(config: AppConfig, repos: Repositories, clock: Arc<dyn ClockPort>) -> Self {
        let tokens = Arc::new(TokenService::new(
            &config.jwt_secret,
            config.jwt_ttl,
            clock.clone(),
        ));
        let hasher = Arc::new(PasswordHasher::new(config.bcrypt_cost));
        let resolution_cache: Arc<ResolutionCache> =
            Arc::new(TtlCache::new(config.resolution_cache_ttl));
        let lookup_cache = Arc::new(LookupCache::new(repos.lookup.clone()));

        let management = ManagementUseCases::new(
            use_cases::management::ClassCrud::new(repos.class.clone()),
            use_cases::management::ClassFeatureCrud::new(repos.class_feature.clone()),
            use_cases::management::RaceCrud::new(repos.race.clone()),
            use_cases::management::RaceTraitCrud::new(repos.race_trait.clone()),
            use_cases::management::SkillCrud::new(repos.skill.clone()),
            use_cases::management::FeatCrud::new(repos.feat.clone()),
            use_cases::management::SpellCrud::new(repos.spell.clone()),
            use_cases::management::CharacterCrud::new(repos.character.clone()),
            use_cases::management::ReferenceTableCrud::new(repos.reference_table.clone()),
        );

        let resolve = Arc::new(ResolveEntities::new(
            repos.entity_lookup.clone(),
            repos.reference_table.clone(),
            resolution_cache.clone(),
        ));

        let use_cases = UseCases {
            auth: AuthUseCases::new(repos.user.clone(), tokens.clone(), hasher),
            profile: ProfileUseCases::new(repos.user.clone(), tokens.clone()),
            management,
            lookups: LookupUseCases::new(
                lookup_cache,
                repos.class.clone(),
                repos.race.clone(),
                repos.spell.clone(),
            ),
            resolve: resolve.clone(),
            markdown: RenderMarkdown::new(resolve),
        };

        Self {
            config,
            tokens,
            repositories: repos,
            use_cases,
            resolution_cache,
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! A fully wired App over a fresh in-memory database.

    use std::sync::Arc;

    use grimoire_domain::{NewUser, User, UserId};

    use super::App;
    use crate::infrastructure::config::AppConfig;
    use crate::infrastructure::sqlite::{testing, SqliteRepositories};

    pub async fn app() -> Arc<App> {
        let pool = testing::pool().await;
        let clock = testing::clock();
        let repos = SqliteRepositories::new(pool, clock.clone());
        Arc::new(App::new(AppConfig::for_tests(), repos.into(), clock))
    }

    /// Insert a user directly and return a bearer token for them.
    pub async fn user_token(app: &App, username: &str, is_admin: bool) -> (UserId, String) {
        let id = app
            .repositories
            .user
            .create(&NewUser {
                username: username.into(),
                email: format!("{}@grimoire.test", username),
                password_hash: "not-a-real-hash".into(),
                is_admin,
            })
            .await
            .expect("create user");
        let user: User = app
            .repositories
            .user
            .get(id)
            .await
            .expect("get user")
            .expect("user exists");
        let token = app.tokens.issue(&user).expect("issue token");
        (id, token)
    }
}
