use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::Request;
use http_body_util::BodyExt;
use sqlx::PgPool;
use uuid::Uuid;

use staffhub::config::cors::CorsConfig;
use staffhub::config::jwt::JwtConfig;
use staffhub::config::storage::StorageConfig;
use staffhub::router::init_router;
use staffhub::state::AppState;
use staffhub::storage::LocalFileStorage;
use staffhub::utils::password::hash_password;

#[allow(dead_code)]
pub fn test_upload_dir() -> PathBuf {
    std::env::temp_dir().join(format!("staffhub-test-{}", Uuid::new_v4()))
}

#[allow(dead_code)]
pub fn setup_test_app_with_dir(pool: PgPool, upload_dir: PathBuf) -> Router {
    dotenvy::dotenv().ok();
    let state = AppState {
        db: pool,
        jwt_config: JwtConfig::from_env(),
        cors_config: CorsConfig::from_env(),
        storage_config: StorageConfig {
            upload_dir: upload_dir.clone(),
        },
        storage: Arc::new(LocalFileStorage::new(upload_dir)),
    };
    init_router(state)
}

#[allow(dead_code)]
pub fn setup_test_app(pool: PgPool) -> Router {
    setup_test_app_with_dir(pool, test_upload_dir())
}

#[allow(dead_code)]
pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}

#[allow(dead_code)]
pub async fn create_test_user(pool: &PgPool, name: &str, email: &str, password: &str) -> Uuid {
    let hashed = hash_password(password).unwrap();

    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO users (name, email, password) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(name)
    .bind(email)
    .bind(&hashed)
    .fetch_one(pool)
    .await
    .unwrap()
}

#[allow(dead_code)]
pub async fn create_test_staff(
    pool: &PgPool,
    surname: &str,
    other_names: &str,
    date_of_birth: &str,
    unique_code: i64,
) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO staff (surname, other_names, date_of_birth, unique_code)
         VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(surname)
    .bind(other_names)
    .bind(date_of_birth.parse::<chrono::NaiveDate>().unwrap())
    .bind(unique_code)
    .fetch_one(pool)
    .await
    .unwrap()
}

#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[allow(dead_code)]
pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

#[allow(dead_code)]
pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[allow(dead_code)]
pub const MULTIPART_BOUNDARY: &str = "staffhub-test-boundary";

/// Hand-rolled multipart/form-data body: text fields plus an optional
/// `image_src` file part.
#[allow(dead_code)]
pub fn multipart_request(
    uri: &str,
    fields: &[(&str, &str)],
    file: Option<(&str, &[u8])>,
) -> Request<Body> {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }

    if let Some((filename, content)) = file {
        body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"image_src\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}
