use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use receitas_api::data::memory::InMemoryStore;
use receitas_api::presentation::handlers::AppState;
use receitas_api::presentation::routes::configure;
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;

macro_rules! setup_recipes_test {
    () => {{
        let state = web::Data::new(AppState::new(Arc::new(InMemoryStore::new())));
        test::init_service(
            App::new()
                .app_data(state)
                .configure(configure::<InMemoryStore>),
        )
        .await
    }};
}

macro_rules! call_json {
    ($app:expr, $req:expr) => {{
        let resp = test::call_service(&$app, $req.to_request()).await;
        let status = resp.status();
        let body: serde_json::Value = test::read_body_json(resp).await;
        (status, body)
    }};
}

// One client owning recipes A..F, with A and B favorited by that client.
macro_rules! setup_feed {
    () => {{
        let app = setup_recipes_test!();
        let (_, body) = call_json!(
            app,
            test::TestRequest::post().uri("/cadastro").set_json(json!({
                "name": "Chef",
                "email": "chef@example.com",
                "password": "senha"
            }))
        );
        let client_id = body["client"]["id"].as_str().unwrap().to_string();

        let mut recipe_ids = Vec::new();
        for content in ["A", "B", "C", "D", "E", "F"] {
            let (status, body) = call_json!(
                app,
                test::TestRequest::post().uri("/receitas").set_json(json!({
                    "content": content,
                    "clientId": client_id
                }))
            );
            assert_eq!(status, StatusCode::CREATED);
            recipe_ids.push(body["recipe"]["id"].as_str().unwrap().to_string());
        }
        for recipe_id in &recipe_ids[..2] {
            let (status, _) = call_json!(
                app,
                test::TestRequest::post().uri("/favoritos").set_json(json!({
                    "clientId": client_id,
                    "recipeId": recipe_id
                }))
            );
            assert_eq!(status, StatusCode::CREATED);
        }
        (app, client_id)
    }};
}

fn contents(body: &serde_json::Value) -> Vec<String> {
    body["recipes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["content"].as_str().unwrap().to_string())
        .collect()
}

#[actix_web::test]
async fn test_feed_excludes_favorited_recipes() {
    let (app, client_id) = setup_feed!();

    let (status, body) = call_json!(
        app,
        test::TestRequest::get().uri(&format!("/receitas?userId={}&skip=0&take=5", client_id))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Receitas encontradas");
    assert_eq!(contents(&body), vec!["C", "D", "E", "F"]);
    assert_eq!(body["totalRecipes"], 4);
    assert_eq!(body["totalPages"], 1);
    assert_eq!(body["skip"], 0);
    assert_eq!(body["take"], 5);
}

#[actix_web::test]
async fn test_feed_defaults_and_no_user() {
    let (app, _) = setup_feed!();

    let (status, body) = call_json!(app, test::TestRequest::get().uri("/receitas"));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(contents(&body), vec!["A", "B", "C", "D", "E"]);
    assert_eq!(body["skip"], 0);
    assert_eq!(body["take"], 5);
    assert_eq!(body["totalRecipes"], 6);
    assert_eq!(body["totalPages"], 2);
}

#[actix_web::test]
async fn test_feed_pages_never_contain_favorites() {
    let (app, client_id) = setup_feed!();

    let (_, body) = call_json!(
        app,
        test::TestRequest::get().uri(&format!("/favoritos/ids/{}", client_id))
    );
    let favorited: HashSet<String> = body["recipeIds"]
        .as_array()
        .unwrap()
        .iter()
        .map(|id| id.as_str().unwrap().to_string())
        .collect();
    assert_eq!(favorited.len(), 2);

    for take in 1..=5u64 {
        let mut seen = Vec::new();
        let mut skip = 0;
        loop {
            let (status, body) = call_json!(
                app,
                test::TestRequest::get().uri(&format!(
                    "/receitas?userId={}&skip={}&take={}",
                    client_id, skip, take
                ))
            );
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["totalPages"], 4u64.div_ceil(take));

            let recipes = body["recipes"].as_array().unwrap();
            if recipes.is_empty() {
                break;
            }
            for recipe in recipes {
                let id = recipe["id"].as_str().unwrap().to_string();
                assert!(!favorited.contains(&id));
                seen.push(id);
            }
            skip += take;
        }
        assert_eq!(seen.len(), 4);
    }
}

#[actix_web::test]
async fn test_feed_skip_past_end_is_empty() {
    let (app, client_id) = setup_feed!();

    let (status, body) = call_json!(
        app,
        test::TestRequest::get().uri(&format!("/receitas?userId={}&skip=10", client_id))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recipes"], json!([]));
    assert_eq!(body["totalRecipes"], 4);
}

#[actix_web::test]
async fn test_feed_rejects_invalid_pagination() {
    let app = setup_recipes_test!();

    for query in ["take=abc", "take=0", "take=-2", "skip=-1", "skip=x"] {
        let (status, body) = call_json!(
            app,
            test::TestRequest::get().uri(&format!("/receitas?{}", query))
        );
        assert_eq!(status, StatusCode::BAD_REQUEST, "query {}", query);
        assert_eq!(body["code"], "validation_error");
    }
}

#[actix_web::test]
async fn test_create_recipe_validation() {
    let app = setup_recipes_test!();

    let (status, body) = call_json!(
        app,
        test::TestRequest::post()
            .uri("/receitas")
            .set_json(json!({ "clientId": "c1" }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Conteúdo e clientId são obrigatórios");

    let (status, body) = call_json!(
        app,
        test::TestRequest::post().uri("/receitas").set_json(json!({
            "content": "Pão de queijo",
            "clientId": "ghost"
        }))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Usuário não encontrado");
}

#[actix_web::test]
async fn test_create_recipe_returns_recipe() {
    let app = setup_recipes_test!();
    let (_, body) = call_json!(
        app,
        test::TestRequest::post().uri("/cadastro").set_json(json!({
            "name": "Chef",
            "email": "owner@example.com",
            "password": "senha"
        }))
    );
    let client_id = body["client"]["id"].as_str().unwrap().to_string();

    let (status, body) = call_json!(
        app,
        test::TestRequest::post().uri("/receitas").set_json(json!({
            "content": "Pão de queijo",
            "clientId": client_id
        }))
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Receita criada com sucesso!");
    assert_eq!(body["recipe"]["content"], "Pão de queijo");
    assert_eq!(body["recipe"]["clientId"], client_id);
}
