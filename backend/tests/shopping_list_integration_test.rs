//! Integration tests for favorites, the shopping cart and its download

mod common;

use axum::http::{header, Method, StatusCode};
use common::unique;

#[tokio::test]
#[ignore = "requires database"]
async fn test_shopping_list_sums_shared_ingredients() {
    let app = common::TestApp::new().await;
    let user = app.create_test_user().await;
    let tag = app.seed_tag(&unique("cart").replace(' ', "-")).await;

    let salt_name = unique("Salt");
    let sugar_name = unique("Sugar");
    let flour_name = unique("Flour");
    let salt = app.seed_ingredient(&salt_name, "г").await;
    let sugar = app.seed_ingredient(&sugar_name, "г").await;
    let flour = app.seed_ingredient(&flour_name, "г").await;

    let a = app.create_recipe(&user, "A", &[(salt, 10), (sugar, 5)], &[tag]).await;
    let b = app.create_recipe(&user, "B", &[(salt, 3), (flour, 200)], &[tag]).await;
    for id in [a, b] {
        let (status, _) = app
            .json(Method::POST, &format!("/api/recipes/{}/shopping_cart", id), None, Some(&user.token))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let response = app
        .send(Method::GET, "/api/recipes/download_shopping_cart", None, Some(&user.token))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"shoppingcart.txt\""
    );

    let (_, text) = app
        .request(Method::GET, "/api/recipes/download_shopping_cart", None, Some(&user.token))
        .await;
    assert_eq!(
        text,
        format!(
            "{} - 200 г\n{} - 13 г\n{} - 5 г\n",
            flour_name, salt_name, sugar_name
        )
    );

    let (status, csv) = app
        .request(Method::GET, "/api/recipes/download_shopping_cart?format=csv", None, Some(&user.token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(csv.starts_with("ingredient,measurement_unit,amount\n"));
    assert!(csv.contains(&format!("{},г,13\n", salt_name)));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_empty_cart_downloads_empty_list() {
    let app = common::TestApp::new().await;
    let user = app.create_test_user().await;

    let (status, text) = app
        .request(Method::GET, "/api/recipes/download_shopping_cart", None, Some(&user.token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(text.is_empty());
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_membership_add_and_remove_twice() {
    let app = common::TestApp::new().await;
    let user = app.create_test_user().await;
    let salt = app.seed_ingredient(&unique("Salt"), "г").await;
    let tag = app.seed_tag(&unique("fav").replace(' ', "-")).await;
    let id = app.create_recipe(&user, "Toast", &[(salt, 1)], &[tag]).await;

    for set in ["favorite", "shopping_cart"] {
        let path = format!("/api/recipes/{}/{}", id, set);

        let (status, summary) = app.json(Method::POST, &path, None, Some(&user.token)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(summary["id"], id);
        assert_eq!(summary["name"], "Toast");

        let (status, body) = app.json(Method::POST, &path, None, Some(&user.token)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "CONFLICT");

        let (status, _) = app.json(Method::DELETE, &path, None, Some(&user.token)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = app.json(Method::DELETE, &path, None, Some(&user.token)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_membership_of_missing_recipe_is_not_found() {
    let app = common::TestApp::new().await;
    let user = app.create_test_user().await;

    let (status, _) = app
        .json(Method::POST, &format!("/api/recipes/{}/favorite", i64::MAX), None, Some(&user.token))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_concurrent_favorite_adds_keep_one_row() {
    let app = common::TestApp::new().await;
    let user = app.create_test_user().await;
    let salt = app.seed_ingredient(&unique("Salt"), "г").await;
    let tag = app.seed_tag(&unique("race").replace(' ', "-")).await;
    let id = app.create_recipe(&user, "Porridge", &[(salt, 2)], &[tag]).await;

    let path = format!("/api/recipes/{}/favorite", id);
    let (first, second) = tokio::join!(
        app.json(Method::POST, &path, None, Some(&user.token)),
        app.json(Method::POST, &path, None, Some(&user.token)),
    );

    let mut statuses = [first.0, second.0];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::BAD_REQUEST]);
    let rejected = if first.0 == StatusCode::BAD_REQUEST { first.1 } else { second.1 };
    assert_eq!(rejected["error"]["code"], "CONFLICT");

    let (rows,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM favorites WHERE user_id = $1 AND recipe_id = $2")
            .bind(user.id)
            .bind(id)
            .fetch_one(&app.pool)
            .await
            .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_deleted_account_cannot_add_to_sets() {
    let app = common::TestApp::new().await;
    let author = app.create_test_user().await;
    let ghost = app.create_test_user().await;
    let salt = app.seed_ingredient(&unique("Salt"), "г").await;
    let tag = app.seed_tag(&unique("ghost").replace(' ', "-")).await;
    let id = app.create_recipe(&author, "Stew", &[(salt, 4)], &[tag]).await;

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(ghost.id)
        .execute(&app.pool)
        .await
        .unwrap();

    for set in ["favorite", "shopping_cart"] {
        let (status, body) = app
            .json(Method::POST, &format!("/api/recipes/{}/{}", id, set), None, Some(&ghost.token))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", set);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }
}
