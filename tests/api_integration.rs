use little_plans::api::{DocumentStore, StoreClient};
use little_plans::{DocumentId, DocumentPatch};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(uri: String) -> StoreClient {
    StoreClient::new(uri, "anon_key".into(), "test_token".into()).unwrap()
}

#[tokio::test]
async fn test_list_documents_success() {
    let mock_server = MockServer::start().await;

    let response = serde_json::json!([
        {
            "id": "doc2",
            "title": "Newest",
            "page_slug": "meal-planner",
            "updated_at": "2025-10-29T01:23:45+00:00",
            "response_content": "<h1>Newest</h1>"
        },
        {
            "id": 7,
            "title": null,
            "page_slug": null,
            "updated_at": "2025-10-28T15:04:05+00:00",
            "response_content": "<p>older</p>"
        }
    ]);

    Mock::given(method("GET"))
        .and(path("/rest/v1/user_ai_responses"))
        .and(query_param("user_id", "eq.user-1"))
        .and(query_param("order", "updated_at.desc"))
        .and(query_param(
            "select",
            "id,title,page_slug,updated_at,response_content",
        ))
        .and(header("apikey", "anon_key"))
        .and(header("Authorization", "Bearer test_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .mount(&mock_server)
        .await;

    let uri = mock_server.uri();

    // Run blocking client in a blocking context
    let result = tokio::task::spawn_blocking(move || client(uri).list_for_user("user-1"))
        .await
        .unwrap();

    let docs = result.unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].id.as_str(), "doc2");
    assert_eq!(docs[0].display_source(), "meal-planner");
    assert_eq!(docs[1].id.as_str(), "7");
    assert_eq!(docs[1].display_title(), "Untitled");
}

#[tokio::test]
async fn test_list_documents_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/user_ai_responses"))
        .respond_with(ResponseTemplate::new(401).set_body_string("JWT expired"))
        .mount(&mock_server)
        .await;

    let uri = mock_server.uri();
    let result = tokio::task::spawn_blocking(move || client(uri).list_for_user("user-1"))
        .await
        .unwrap();

    match result {
        Err(little_plans::Error::Api {
            status, message, ..
        }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "JWT expired");
        }
        other => panic!("Expected API error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_list_documents_bad_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/user_ai_responses"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let uri = mock_server.uri();
    let result = tokio::task::spawn_blocking(move || client(uri).list_for_user("user-1"))
        .await
        .unwrap();

    assert_eq!(result.unwrap_err().exit_code(), 5);
}

#[tokio::test]
async fn test_update_document_sends_patch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/user_ai_responses"))
        .and(query_param("id", "eq.doc1"))
        .and(header("Prefer", "return=minimal"))
        .and(header("apikey", "anon_key"))
        .and(body_partial_json(serde_json::json!({
            "response_content": "<h1>New</h1>",
            "title": "New"
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let uri = mock_server.uri();
    let result = tokio::task::spawn_blocking(move || {
        let patch = DocumentPatch {
            content: "<h1>New</h1>".into(),
            title: "New".into(),
            updated_at: chrono::Utc::now(),
        };
        client(uri).update_by_id(&DocumentId::new("doc1"), &patch)
    })
    .await
    .unwrap();

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_update_document_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/user_ai_responses"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let uri = mock_server.uri();
    let result = tokio::task::spawn_blocking(move || {
        let patch = DocumentPatch {
            content: String::new(),
            title: "Untitled".into(),
            updated_at: chrono::Utc::now(),
        };
        client(uri).update_by_id(&DocumentId::new("doc1"), &patch)
    })
    .await
    .unwrap();

    assert_eq!(result.unwrap_err().exit_code(), 4);
}

#[tokio::test]
async fn test_current_user_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .and(header("Authorization", "Bearer test_token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"id": "user-9", "email": "a@b.c"})),
        )
        .mount(&mock_server)
        .await;

    let uri = mock_server.uri();
    let result = tokio::task::spawn_blocking(move || client(uri).current_user_id())
        .await
        .unwrap();

    assert_eq!(result.unwrap(), "user-9");
}
