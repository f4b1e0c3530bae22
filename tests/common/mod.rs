#![allow(dead_code)]

use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use reqwest::multipart::{Form, Part};
use reqwest::{header, Response};
use serde_json::{json, Value};
use tempfile::TempDir;

use incident_report_api::config::AppConfig;
use incident_report_api::{app, database, AppState};

pub const PASSWORD: &str = "secret1";
pub const MAX_IMAGE_BYTES: usize = 1024 * 1024;
pub const MAX_VIDEO_BYTES: usize = 64 * 1024;

/// A server on its own port, with a private database file and upload directory.
pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
    pub upload_dir: PathBuf,
    _dir: TempDir,
}

pub async fn spawn_app() -> Result<TestApp> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("warn"))
        .with_test_writer()
        .try_init();

    let dir = tempfile::tempdir().context("failed to create temp dir")?;
    let upload_dir = dir.path().join("uploads");

    let mut config = AppConfig::development();
    config.database.url = format!("sqlite://{}", dir.path().join("test.db").display());
    config.database.max_connections = 4;
    config.security.jwt_secret = "integration-test-secret".to_string();
    // Minimum bcrypt cost keeps the suite fast.
    config.security.password_cost = 4;
    config.media.upload_dir = upload_dir.to_string_lossy().into_owned();
    config.media.max_image_bytes = MAX_IMAGE_BYTES;
    config.media.max_video_bytes = MAX_VIDEO_BYTES;
    config.validate()?;

    let pool = database::connect(&config.database).await?;
    database::ensure_schema(&pool).await?;

    // Pick an unused port for isolation
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    let router = app(AppState::new(config, pool));
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    Ok(TestApp {
        base_url: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
        upload_dir,
        _dir: dir,
    })
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<Response> {
        Ok(self
            .client
            .post(self.url("/auth/register"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Response> {
        Ok(self
            .client
            .post(self.url("/auth/login"))
            .form(&[("username", email), ("password", password)])
            .send()
            .await?)
    }

    /// Register `email` and return a bearer token for it.
    pub async fn token_for(&self, email: &str) -> Result<String> {
        let res = self.register(email, PASSWORD).await?;
        anyhow::ensure!(res.status() == 201, "register failed: {}", res.status());
        let res = self.login(email, PASSWORD).await?;
        anyhow::ensure!(res.status() == 200, "login failed: {}", res.status());
        let body: Value = res.json().await?;
        body["data"]["access_token"]
            .as_str()
            .map(str::to_string)
            .context("login response without access_token")
    }

    pub async fn create_report(&self, token: &str, form: Form) -> Result<Response> {
        Ok(self
            .client
            .post(self.url("/reports/"))
            .bearer_auth(token)
            .header(header::USER_AGENT, "integration-test/1.0")
            .multipart(form)
            .send()
            .await?)
    }

    /// Create a small video report and return its JSON.
    pub async fn seed_report(&self, token: &str, rating: i64, severity: i64) -> Result<Value> {
        let res = self.create_report(token, video_form("seeded report", rating, severity)).await?;
        anyhow::ensure!(res.status() == 201, "create failed: {}", res.status());
        let body: Value = res.json().await?;
        Ok(body["data"].clone())
    }

    pub async fn get(&self, token: &str, path: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).bearer_auth(token).send().await?)
    }

    pub async fn delete(&self, token: &str, path: &str) -> Result<Response> {
        Ok(self.client.delete(self.url(path)).bearer_auth(token).send().await?)
    }

    /// Reports returned by `GET /reports/?<query>`.
    pub async fn list(&self, token: &str, query: &str) -> Result<Vec<Value>> {
        let res = self.get(token, &format!("/reports/?{}", query)).await?;
        anyhow::ensure!(res.status() == 200, "list failed: {}", res.status());
        let body: Value = res.json().await?;
        body["data"].as_array().cloned().context("list response without array")
    }

    pub fn upload_count(&self) -> usize {
        std::fs::read_dir(&self.upload_dir).map(|entries| entries.count()).unwrap_or(0)
    }
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([220, 40, 40]));
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .expect("encode png");
    buf.into_inner()
}

pub fn fields(description: &str, rating: i64, severity: i64) -> Form {
    Form::new()
        .text("description", description.to_string())
        .text("behavior_rating", rating.to_string())
        .text("severity_index", severity.to_string())
}

pub fn with_media(form: Form, bytes: Vec<u8>, filename: &str, mime: &str) -> Form {
    let part = Part::bytes(bytes)
        .file_name(filename.to_string())
        .mime_str(mime)
        .expect("valid mime");
    form.part("media", part)
}

pub fn video_form(description: &str, rating: i64, severity: i64) -> Form {
    with_media(fields(description, rating, severity), vec![7u8; 512], "clip.mp4", "video/mp4")
}

pub fn words(n: usize) -> String {
    vec!["word"; n].join(" ")
}

pub fn file_name(stored_path: &str) -> &str {
    stored_path.rsplit('/').next().unwrap_or(stored_path)
}

pub fn exists(stored_path: &str) -> bool {
    Path::new(stored_path).exists()
}
