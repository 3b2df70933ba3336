//! HTTP routes.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::app::App;

use super::{
    auth_routes, character_routes, class_routes, feat_routes, lookup_routes, markdown_routes,
    middleware::require_auth, profile_routes, race_routes, reference_table_routes, skill_routes,
    spell_routes,
};

/// Create all HTTP routes.
///
/// Static segments such as `/api/classes/all` win over `{id}` captures, so
/// route order does not matter.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/health", get(health))
        .route("/api/health", get(health))
        // Accounts
        .route("/api/auth/register", post(auth_routes::register))
        .route("/api/auth/login", post(auth_routes::login))
        .route("/api/auth/me", get(auth_routes::me))
        .route("/api/auth/refresh-token", post(auth_routes::refresh_token))
        .route(
            "/api/user/profile",
            get(profile_routes::get_profile).put(profile_routes::update_profile),
        )
        // Reference data
        .route("/api/lookups", get(lookup_routes::get_lookups))
        .route("/api/lookups/reload", post(lookup_routes::reload_lookups))
        // Classes
        .route(
            "/api/classes",
            get(class_routes::list_classes).post(class_routes::create_class),
        )
        .route("/api/classes/all", get(class_routes::list_all_classes))
        .route(
            "/api/classes/features",
            get(class_routes::list_class_features).post(class_routes::create_class_feature),
        )
        .route(
            "/api/classes/features/all",
            get(class_routes::list_all_class_features),
        )
        .route(
            "/api/classes/features/{slug}",
            get(class_routes::get_class_feature)
                .put(class_routes::update_class_feature)
                .delete(class_routes::delete_class_feature),
        )
        .route(
            "/api/classes/{id}",
            get(class_routes::get_class)
                .put(class_routes::update_class)
                .delete(class_routes::delete_class),
        )
        // Races
        .route(
            "/api/races",
            get(race_routes::list_races).post(race_routes::create_race),
        )
        .route("/api/races/all", get(race_routes::list_all_races))
        .route(
            "/api/races/traits",
            get(race_routes::list_race_traits).post(race_routes::create_race_trait),
        )
        .route(
            "/api/races/traits/all",
            get(race_routes::list_all_race_traits),
        )
        .route(
            "/api/races/traits/{slug}",
            get(race_routes::get_race_trait)
                .put(race_routes::update_race_trait)
                .delete(race_routes::delete_race_trait),
        )
        .route(
            "/api/races/{id}",
            get(race_routes::get_race)
                .put(race_routes::update_race)
                .delete(race_routes::delete_race),
        )
        // Skills
        .route(
            "/api/skills",
            get(skill_routes::list_skills).post(skill_routes::create_skill),
        )
        .route("/api/skills/all", get(skill_routes::list_all_skills))
        .route(
            "/api/skills/{id}",
            get(skill_routes::get_skill)
                .put(skill_routes::update_skill)
                .delete(skill_routes::delete_skill),
        )
        // Feats
        .route(
            "/api/feats",
            get(feat_routes::list_feats).post(feat_routes::create_feat),
        )
        .route("/api/feats/all", get(feat_routes::list_all_feats))
        .route(
            "/api/feats/{id}",
            get(feat_routes::get_feat)
                .put(feat_routes::update_feat)
                .delete(feat_routes::delete_feat),
        )
        // Spells
        .route(
            "/api/spells",
            get(spell_routes::list_spells).post(spell_routes::create_spell),
        )
        .route("/api/spells/all", get(spell_routes::list_all_spells))
        .route(
            "/api/spells/{id}",
            get(spell_routes::get_spell)
                .put(spell_routes::update_spell)
                .delete(spell_routes::delete_spell),
        )
        // Characters
        .route(
            "/api/characters",
            get(character_routes::list_characters).post(character_routes::create_character),
        )
        .route(
            "/api/characters/{id}",
            get(character_routes::get_character)
                .put(character_routes::update_character)
                .delete(character_routes::delete_character),
        )
        // Reference tables
        .route(
            "/api/referencetables",
            get(reference_table_routes::list_reference_tables)
                .post(reference_table_routes::create_reference_table),
        )
        .route(
            "/api/referencetables/{slug}",
            get(reference_table_routes::get_reference_table)
                .put(reference_table_routes::update_reference_table)
                .delete(reference_table_routes::delete_reference_table),
        )
        // Rendering
        .route(
            "/api/entities/resolve",
            post(markdown_routes::resolve_entities),
        )
        .route("/api/markdown/render", post(markdown_routes::render_markdown))
}

/// All routes behind the bearer-token gate, with state applied.
pub fn router(app: Arc<App>) -> Router {
    routes()
        .layer(middleware::from_fn_with_state(app.clone(), require_auth))
        .with_state(app)
}

async fn health() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing::{app, user_token};
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn send(
        app: &Arc<App>,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = router(app.clone()).oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }

    fn skill(name: &str) -> Value {
        json!({ "name": name, "abilityId": 2, "trainedOnly": true })
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = app().await;
        let (status, body) = send(&app, Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }

    #[tokio::test]
    async fn protected_routes_need_a_valid_token() {
        let app = app().await;

        let (status, body) = send(&app, Method::GET, "/api/spells", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Missing or invalid auth header");
        assert_eq!(body["success"], false);

        let (status, body) = send(&app, Method::GET, "/api/spells", Some("garbage"), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Invalid or expired token");
    }

    #[tokio::test]
    async fn register_login_and_me() {
        let app = app().await;
        let credentials = json!({
            "username": "bigby",
            "email": "bigby@greyhawk.test",
            "password": "Hands0fForce",
        });

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/register",
            None,
            Some(credentials.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "User created");

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/auth/register",
            None,
            Some(credentials),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": "bigby", "password": "wrong-Passw0rd" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": "bigby", "password": "Hands0fForce" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["token"].as_str().expect("token").to_string();

        let (status, body) = send(&app, Method::GET, "/api/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["username"], "bigby");
        assert_eq!(body["user"]["isAdmin"], false);
    }

    #[tokio::test]
    async fn weak_passwords_fail_validation() {
        let app = app().await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "username": "bigby",
                "email": "bigby@greyhawk.test",
                "password": "password",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Validation failed");
        assert!(body["details"]["password"].is_array());
    }

    #[tokio::test]
    async fn catalog_writes_are_admin_only() {
        let app = app().await;
        let (_, user) = user_token(&app, "player", false).await;
        let (_, admin) = user_token(&app, "dm", true).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/skills",
            Some(&user),
            Some(skill("Tumble")),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Admin access required");

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/skills",
            Some(&admin),
            Some(skill("Tumble")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["id"].as_i64().expect("id");

        let (status, body) = send(
            &app,
            Method::GET,
            &format!("/api/skills/{}", id),
            Some(&user),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Tumble");

        let (status, body) = send(&app, Method::GET, "/api/skills/all", Some(&user), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["name"], "Tumble");
    }

    #[tokio::test]
    async fn missing_records_are_404() {
        let app = app().await;
        let (_, token) = user_token(&app, "player", false).await;

        let (status, body) = send(&app, Method::GET, "/api/skills/999", Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Skill not found");

        let (status, _) = send(
            &app,
            Method::GET,
            "/api/referencetables/no-such-table",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn characters_can_only_be_changed_by_their_owner() {
        let app = app().await;
        let (_, admin) = user_token(&app, "dm", true).await;
        let (_, owner) = user_token(&app, "owner", false).await;
        let (_, other) = user_token(&app, "other", false).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/races",
            Some(&admin),
            Some(json!({ "name": "Halfling", "speed": 20 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let race_id = body["id"].as_i64().expect("race id");

        let character = json!({ "name": "Tika", "raceId": race_id, "alignmentId": 1 });
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/characters",
            Some(&owner),
            Some(character.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let uri = format!("/api/characters/{}", body["id"]);

        let (status, _) = send(&app, Method::PUT, &uri, Some(&other), Some(character.clone())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(&app, Method::DELETE, &uri, Some(&other), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(&app, Method::PUT, &uri, Some(&owner), Some(character)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app, Method::DELETE, &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn markdown_links_resolved_entities() {
        let app = app().await;
        let (_, admin) = user_token(&app, "dm", true).await;
        let (_, body) = send(
            &app,
            Method::POST,
            "/api/skills",
            Some(&admin),
            Some(skill("Tumble")),
        )
        .await;
        let id = body["id"].as_i64().expect("id");

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/markdown/render",
            Some(&admin),
            Some(json!({ "markdown": "Try {Skill: Tumble} or {Skill: Juggle}." })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let html = body["html"].as_str().expect("html");
        assert!(html.contains(&format!(
            "<a href=\"/skills/{}\" class=\"entity-link\">Tumble</a>",
            id
        )));
        assert!(html.contains("<span class=\"entity-unresolved\">Juggle</span>"));
    }

    #[tokio::test]
    async fn renamed_entities_stop_linking_under_their_old_name() {
        let app = app().await;
        let (_, admin) = user_token(&app, "dm", true).await;
        let (_, body) = send(
            &app,
            Method::POST,
            "/api/skills",
            Some(&admin),
            Some(skill("Éclat")),
        )
        .await;
        let id = body["id"].as_i64().expect("id");

        let render = |markdown: &'static str| {
            let app = app.clone();
            let admin = admin.clone();
            async move {
                let (status, body) = send(
                    &app,
                    Method::POST,
                    "/api/markdown/render",
                    Some(&admin),
                    Some(json!({ "markdown": markdown })),
                )
                .await;
                assert_eq!(status, StatusCode::OK);
                body["html"].as_str().expect("html").to_string()
            }
        };

        let html = render("Use {Skill: ÉCLAT}").await;
        assert!(html.contains(&format!(
            "<a href=\"/skills/{}\" class=\"entity-link\">Éclat</a>",
            id
        )));

        let (status, _) = send(
            &app,
            Method::PUT,
            &format!("/api/skills/{}", id),
            Some(&admin),
            Some(skill("Flourish")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let html = render("Use {Skill: Éclat}").await;
        assert!(html.contains("<span class=\"entity-unresolved\">Éclat</span>"));
    }

    #[tokio::test]
    async fn resolve_rejects_unknown_types() {
        let app = app().await;
        let (_, token) = user_token(&app, "player", false).await;
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/entities/resolve",
            Some(&token),
            Some(json!({ "queries": [{ "type": "monster", "name": "Owlbear" }] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
