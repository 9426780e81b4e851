use axum::http::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

mod common;
use common::{create, get, id_of, send, setup_test_app};

fn book(title: &str, year: i32, pages: i32) -> Value {
    json!({
        "title": title,
        "blurb": format!("A story called {title}"),
        "pages": pages,
        "publication_year": year,
    })
}

async fn seed_books(app: &axum::Router) {
    for (title, year, pages) in [
        ("The Storm Gate", 1985, 320),
        ("Stormlight Harbor", 1994, 410),
        ("Quiet Fields", 1997, 150),
        ("A Brainstorm of Crows", 2003, 280),
        ("Winter Roads", 2010, 500),
    ] {
        create(app, "books", book(title, year, pages)).await;
    }
}

#[tokio::test]
async fn test_create_book_trims_and_reports_success() {
    let app = setup_test_app().await;

    let (status, json) = send(
        &app,
        "POST",
        "/api/books",
        Some(json!({
            "title": "  The Storm Gate  ",
            "blurb": " Rain over the valley. ",
            "pages": 320,
            "publication_year": 1985,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Book created successfully");
    assert_eq!(json["data"]["title"], "The Storm Gate");
    assert_eq!(json["data"]["blurb"], "Rain over the valley.");
    assert_eq!(json["data"]["characters"], json!([]));
    assert!(json["data"]["createdAt"].is_string());
    assert!(Uuid::parse_str(json["data"]["id"].as_str().unwrap()).is_ok());
}

#[tokio::test]
async fn test_create_book_validation_errors() {
    let app = setup_test_app().await;

    let (status, json) = send(&app, "POST", "/api/books", Some(json!({ "title": "Only a title" }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert_eq!(
        json["error"],
        "Validation Error: Path `blurb` is required., Path `pages` is required., Path `publication_year` is required."
    );

    let long_title = "x".repeat(201);
    let (status, json) = send(&app, "POST", "/api/books", Some(book(&long_title, 2000, 10))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json["error"],
        "Validation Error: Path `title` is longer than the maximum allowed length (200)."
    );
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = setup_test_app().await;

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/books")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();
    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_books_default_pagination() {
    let app = setup_test_app().await;
    seed_books(&app).await;

    let (status, json) = get(&app, "/api/books").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    let page = &json["data"];
    assert_eq!(page["total"], 5);
    assert_eq!(page["page"], 1);
    assert_eq!(page["limit"], 10);
    assert_eq!(page["totalPages"], 1);
    assert_eq!(page["data"].as_array().unwrap().len(), 5);
    // newest first
    assert_eq!(page["data"][0]["title"], "Winter Roads");
}

#[tokio::test]
async fn test_list_books_pages_through_results() {
    let app = setup_test_app().await;
    seed_books(&app).await;

    let (_, json) = get(&app, "/api/books?page=2&limit=2").await;
    let page = &json["data"];
    assert_eq!(page["total"], 5);
    assert_eq!(page["page"], 2);
    assert_eq!(page["limit"], 2);
    assert_eq!(page["totalPages"], 3);
    assert_eq!(page["data"].as_array().unwrap().len(), 2);

    let (_, json) = get(&app, "/api/books?page=3&limit=2").await;
    assert_eq!(json["data"]["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_lenient_pagination_parameters() {
    let app = setup_test_app().await;
    seed_books(&app).await;

    let (status, json) = get(&app, "/api/books?page=-2&limit=0").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["page"], 1);
    assert_eq!(json["data"]["limit"], 1);
    assert_eq!(json["data"]["totalPages"], 5);

    let (_, json) = get(&app, "/api/books?page=abc&limit=3xyz").await;
    assert_eq!(json["data"]["page"], 1);
    assert_eq!(json["data"]["limit"], 3);
}

#[tokio::test]
async fn test_limit_is_capped() {
    let app = setup_test_app().await;

    let (_, json) = get(&app, "/api/books?limit=5000").await;

    assert_eq!(json["data"]["limit"], common::TEST_PAGE_SIZE_CAP);
    assert_eq!(json["data"]["totalPages"], 0);
}

#[tokio::test]
async fn test_huge_page_returns_empty_page() {
    let app = setup_test_app().await;
    seed_books(&app).await;

    for uri in [
        "/api/books?page=99999999999999999999&limit=50",
        "/api/books?page=100000000000000000&limit=100",
    ] {
        let (status, json) = get(&app, uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(json["data"]["data"], json!([]), "{uri}");
        assert_eq!(json["data"]["total"], 5, "{uri}");
    }
}

#[tokio::test]
async fn test_uncapped_huge_limit_lists_everything() {
    let app = common::setup_uncapped_test_app().await;
    seed_books(&app).await;

    let (status, json) = get(&app, "/api/books?page=3&limit=99999999999999999999").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["data"], json!([]));

    let (status, json) = get(&app, "/api/books?limit=99999999999999999999").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["data"].as_array().unwrap().len(), 5);
    assert_eq!(json["data"]["totalPages"], 1);
}

#[tokio::test]
async fn test_title_filter_is_case_insensitive_substring() {
    let app = setup_test_app().await;
    seed_books(&app).await;

    let (_, json) = get(&app, "/api/books?title=STORM").await;

    assert_eq!(json["data"]["total"], 3);
    let mut titles: Vec<&str> = json["data"]["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|book| book["title"].as_str().unwrap())
        .collect();
    titles.sort_unstable();
    assert_eq!(
        titles,
        vec!["A Brainstorm of Crows", "Stormlight Harbor", "The Storm Gate"]
    );
}

#[tokio::test]
async fn test_title_filter_treats_wildcards_literally() {
    let app = setup_test_app().await;
    seed_books(&app).await;
    create(&app, "books", book("100% Rain", 2020, 90)).await;

    let (_, json) = get(&app, &format!("/api/books?title={}", url_escape::encode_component("%"))).await;
    assert_eq!(json["data"]["total"], 1);

    let (_, json) = get(&app, "/api/books?title=_").await;
    assert_eq!(json["data"]["total"], 0);
}

#[tokio::test]
async fn test_publication_year_range_and_exact() {
    let app = setup_test_app().await;
    seed_books(&app).await;

    let (_, json) = get(&app, "/api/books?publication_year_min=1990&publication_year_max=2000").await;
    assert_eq!(json["data"]["total"], 2);

    let (_, json) = get(&app, "/api/books?publication_year_min=2000").await;
    assert_eq!(json["data"]["total"], 2);

    let (_, json) = get(&app, "/api/books?publication_year=1997").await;
    assert_eq!(json["data"]["total"], 1);
    assert_eq!(json["data"]["data"][0]["title"], "Quiet Fields");
}

#[tokio::test]
async fn test_non_numeric_year_matches_nothing() {
    let app = setup_test_app().await;
    seed_books(&app).await;

    let (status, json) = get(&app, "/api/books?publication_year=nineteen").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["total"], 0);
    assert_eq!(json["data"]["totalPages"], 0);

    for uri in [
        "/api/books?publication_year_max=inf",
        "/api/books?publication_year_min=nan",
    ] {
        let (status, json) = get(&app, uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(json["data"]["total"], 0, "{uri}");
    }

    let (_, json) = get(&app, "/api/books?publication_year_max=Infinity").await;
    assert_eq!(json["data"]["total"], 5);
}

#[tokio::test]
async fn test_blank_repeated_filter_uses_later_value() {
    let app = setup_test_app().await;
    seed_books(&app).await;

    let (status, json) = get(&app, "/api/books?title=&title=storm").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["total"], 3);
}

#[tokio::test]
async fn test_combined_filters_and_unknown_parameters() {
    let app = setup_test_app().await;
    seed_books(&app).await;

    let (_, json) = get(&app, "/api/books?title=storm&publication_year_max=1990&pages=9999").await;

    assert_eq!(json["data"]["total"], 1);
    assert_eq!(json["data"]["data"][0]["title"], "The Storm Gate");
}

#[tokio::test]
async fn test_created_at_date_range() {
    let app = setup_test_app().await;
    seed_books(&app).await;

    let (_, json) = get(&app, "/api/books?created_at_from=2000-01-01").await;
    assert_eq!(json["data"]["total"], 5);

    let (_, json) = get(&app, "/api/books?created_at_to=2000-01-01").await;
    assert_eq!(json["data"]["total"], 0);

    let (_, json) = get(&app, "/api/books?created_at_from=not-a-date").await;
    assert_eq!(json["data"]["total"], 0);
}

#[tokio::test]
async fn test_get_update_delete_book() {
    let app = setup_test_app().await;
    let created = create(&app, "books", book("Quiet Fields", 1997, 150)).await;
    let id = id_of(&created);

    let (status, json) = get(&app, &format!("/api/books/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["title"], "Quiet Fields");

    let (status, json) = send(
        &app,
        "PUT",
        &format!("/api/books/{id}"),
        Some(json!({ "pages": 175 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Book updated successfully");
    assert_eq!(json["data"]["pages"], 175);
    assert_eq!(json["data"]["title"], "Quiet Fields");

    let (status, json) = send(&app, "DELETE", &format!("/api/books/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({ "success": true, "message": "Book deleted successfully" }));

    let (status, json) = get(&app, &format!("/api/books/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Book not found");

    let (status, _) = send(&app, "DELETE", &format!("/api/books/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_rejects_blank_title() {
    let app = setup_test_app().await;
    let id = id_of(&create(&app, "books", book("Quiet Fields", 1997, 150)).await);

    let (status, json) = send(
        &app,
        "PUT",
        &format!("/api/books/{id}"),
        Some(json!({ "title": "   " })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Validation Error: Path `title` is required.");
}

#[tokio::test]
async fn test_invalid_and_unknown_ids() {
    let app = setup_test_app().await;

    let (status, json) = get(&app, "/api/books/not-an-id").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json, json!({ "success": false, "error": "Invalid book ID" }));

    let (status, json) = send(&app, "PUT", &format!("/api/books/{}", Uuid::new_v4()), Some(json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Book not found");
}

#[tokio::test]
async fn test_book_metadata_endpoints() {
    let app = setup_test_app().await;
    seed_books(&app).await;

    let (status, json) = get(&app, "/api/books/metadata?publication_year_min=2000&limit=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["total"], 2);
    assert_eq!(json["data"]["totalPages"], 2);
    let entry = &json["data"]["data"][0];
    let mut keys: Vec<&str> = entry.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["blurb", "characters", "id", "publication_year", "title"]);

    let id = entry["id"].as_str().unwrap();
    let (status, json) = get(&app, &format!("/api/books/{id}/metadata")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["id"], id);
    assert!(json["data"].get("pages").is_none());

    let (status, json) = get(&app, "/api/books/oops/metadata").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid book ID");
}

#[tokio::test]
async fn test_health_and_unknown_route() {
    let app = setup_test_app().await;

    let (status, json) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "OK");
    assert_eq!(json["database"], "connected");
    assert!(json["timestamp"].as_str().unwrap().ends_with('Z'));

    let (status, json) = get(&app, "/api/dragons").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json, json!({ "success": false, "error": "Route not found" }));
}

#[tokio::test]
async fn test_security_headers_are_set() {
    let app = setup_test_app().await;

    let request = axum::http::Request::builder()
        .uri("/health")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();

    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "SAMEORIGIN");
}
