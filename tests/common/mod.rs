use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crm_api_rust::auth::{generate_jwt, password, Claims};

static SERVER: OnceLock<TestServer> = OnceLock::new();
static JWT_SECRET_INIT: OnceLock<()> = OnceLock::new();

/// Make sure both this test process and any spawned server agree on a JWT
/// secret, even when the environment does not provide one. Must run before
/// anything touches the config singleton.
pub fn ensure_jwt_secret() {
    JWT_SECRET_INIT.get_or_init(|| {
        if std::env::var("JWT_SECRET").is_err() {
            std::env::set_var("JWT_SECRET", "integration-test-secret");
        }
    });
}

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    #[allow(dead_code)]
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Spawn the already-built binary to keep start fast during tests
        // Assumes debug profile; adjust if you run tests with --release
        let mut cmd = Command::new("target/debug/crm-api-rust");
        cmd.env("CRM_API_PORT", port.to_string())
            .env(
                "JWT_SECRET",
                crm_api_rust::config::config().security.jwt_secret.clone(),
            )
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Inherit environment so the server sees DATABASE_URL when it is set
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self {
            port,
            base_url,
            child,
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                // Consider server ready on any non-404 response
                if resp.status() == StatusCode::OK
                    || resp.status() == StatusCode::SERVICE_UNAVAILABLE
                {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!(
            "server did not become ready on {} within {:?}",
            self.base_url,
            timeout
        )
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    ensure_jwt_secret();
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Connect to the configured test database and apply the schema.
/// Returns None when DATABASE_URL is not set so suites can skip cleanly.
pub async fn try_pool() -> Result<Option<PgPool>> {
    ensure_jwt_secret();
    let Ok(url) = std::env::var("DATABASE_URL") else {
        return Ok(None);
    };

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .context("DATABASE_URL is set but the database is unreachable")?;

    sqlx::raw_sql(include_str!("../../sql/schema.sql"))
        .execute(&pool)
        .await
        .context("failed to apply schema")?;

    Ok(Some(pool))
}

/// Insert a user with the given role. Email is unique per call.
pub async fn seed_user(pool: &PgPool, role: &str) -> Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO users (id, name, email, password_hash, role) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(id)
    .bind(format!("test-{}", role))
    .bind(format!("{}@test.local", id.simple()))
    .bind("*login-disabled*")
    .bind(role)
    .execute(pool)
    .await?;
    Ok(id)
}

/// Insert a user that can actually log in; returns (id, email).
pub async fn seed_user_with_password(
    pool: &PgPool,
    role: &str,
    plaintext: &str,
) -> Result<(Uuid, String)> {
    let id = Uuid::new_v4();
    let email = format!("{}@test.local", id.simple());
    let hash = password::hash_password(plaintext).expect("hashing should succeed");
    sqlx::query(
        "INSERT INTO users (id, name, email, password_hash, role) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(id)
    .bind(format!("test-{}", role))
    .bind(&email)
    .bind(hash)
    .bind(role)
    .execute(pool)
    .await?;
    Ok((id, email))
}

pub async fn seed_lead(pool: &PgPool, created_by: Uuid) -> Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO leads (id, client_name, client_phone, branch, pipeline, \
         product_stage, created_by) \
         VALUES ($1, 'Test Client', '+100000000', 'Main', 'Sales', 'New', $2)",
    )
    .bind(id)
    .bind(created_by)
    .execute(pool)
    .await?;
    Ok(id)
}

pub async fn seed_deal(pool: &PgPool) -> Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO deals (id, client_name, client_email, status) \
         VALUES ($1, 'Deal Client', 'client@test.local', 'Won')",
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(id)
}

/// Mint a bearer token the way the login endpoint would
pub fn token_for(user_id: Uuid, role: &str) -> String {
    ensure_jwt_secret();
    let claims = Claims::new(user_id, format!("test-{}", role), role.to_string());
    generate_jwt(claims).expect("token generation should succeed")
}
