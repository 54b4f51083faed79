//! End-to-end workflow coverage against a live server and database.
//! Requires DATABASE_URL pointing at a database with migrations applied,
//! same as the server itself.

mod common;

use anyhow::{Context, Result};
use serde_json::{json, Value};
use sqlx::Row;
use uuid::Uuid;

use tagihan_api::auth::hash_password;
use tagihan_api::database::manager::DatabaseManager;

const TEST_PASSWORD: &str = "rahasia-123";

/// All tests in this binary share one runtime. The database pool behind
/// `DatabaseManager::pool()` is a process-wide static, so it must outlive any
/// single test; per-test runtimes would tear down the pool's I/O driver when
/// the first test finishes and strand the rest.
fn rt() -> &'static tokio::runtime::Runtime {
    static RT: std::sync::OnceLock<tokio::runtime::Runtime> = std::sync::OnceLock::new();
    RT.get_or_init(|| tokio::runtime::Runtime::new().expect("failed to build test runtime"))
}

async fn seed_user(role: &str) -> Result<(Uuid, String)> {
    let _ = dotenvy::dotenv();
    let pool = DatabaseManager::pool().await?;
    let username = format!("{}-{}", role.to_lowercase(), Uuid::new_v4());
    let digest = hash_password(TEST_PASSWORD, "testsalt");
    let row = sqlx::query(
        "INSERT INTO users (username, name, password_digest, role) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(&username)
    .bind("Test User")
    .bind(&digest)
    .bind(role)
    .fetch_one(pool)
    .await?;
    Ok((row.get("id"), username))
}

async fn seed_asset() -> Result<Uuid> {
    let _ = dotenvy::dotenv();
    let pool = DatabaseManager::pool().await?;
    let row = sqlx::query("INSERT INTO assets (loan_id, debtor_name) VALUES ($1, $2) RETURNING id")
        .bind(format!("LN-{}", Uuid::new_v4()))
        .bind("Debitur Test")
        .fetch_one(pool)
        .await?;
    Ok(row.get("id"))
}

async fn login(base_url: &str, username: &str) -> Result<String> {
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}/auth/login", base_url))
        .json(&json!({ "username": username, "password": TEST_PASSWORD }))
        .send()
        .await?;
    anyhow::ensure!(resp.status() == 200, "login failed for {}", username);
    let body: Value = resp.json().await?;
    body["data"]["token"]
        .as_str()
        .map(String::from)
        .context("missing token")
}

async fn submit_visit(
    base_url: &str,
    token: &str,
    asset_id: Uuid,
    notes: &str,
) -> Result<(reqwest::StatusCode, Value)> {
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}/api/reports/visit", base_url))
        .bearer_auth(token)
        .json(&json!({ "assetId": asset_id, "outcome": "VISITED", "notes": notes }))
        .send()
        .await?;
    let status = resp.status();
    Ok((status, resp.json().await?))
}

async fn decide_visit(
    base_url: &str,
    token: &str,
    report_id: &str,
    body: Value,
) -> Result<(reqwest::StatusCode, Value)> {
    let client = reqwest::Client::new();
    let resp = client
        .patch(format!("{}/api/reports/visit/{}", base_url, report_id))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await?;
    let status = resp.status();
    Ok((status, resp.json().await?))
}

async fn get_asset(base_url: &str, token: &str, asset_id: Uuid) -> Result<Value> {
    let client = reqwest::Client::new();
    let resp = client
        .get(format!("{}/api/assets/{}", base_url, asset_id))
        .bearer_auth(token)
        .send()
        .await?;
    Ok(resp.json().await?)
}

#[test]
fn approved_commitment_visit_flips_asset_and_decision_is_final() -> Result<()> {
    rt().block_on(async {
        let server = common::ensure_server().await?;
        let (_, admin) = seed_user("ADMIN").await?;
        let (_, collector) = seed_user("COLLECTOR").await?;
        let asset_id = seed_asset().await?;

        let collector_token = login(&server.base_url, &collector).await?;
        let admin_token = login(&server.base_url, &admin).await?;

        // Legacy notes marker, no structured commitmentDate field
        let (status, body) = submit_visit(
            &server.base_url,
            &collector_token,
            asset_id,
            "Bertemu debitur. Komitmen: 2026-02-01",
        )
        .await?;
        assert_eq!(status, 201);
        assert_eq!(body["data"]["status_validation"], "PENDING");
        assert_eq!(body["data"]["commitment_date"], "2026-02-01");
        let report_id = body["data"]["id"].as_str().unwrap().to_string();

        // Submission alone must not move the asset
        let asset = get_asset(&server.base_url, &admin_token, asset_id).await?;
        assert_eq!(asset["data"]["status"], "NORMAL");

        let (status, body) = decide_visit(
            &server.base_url,
            &admin_token,
            &report_id,
            json!({ "status": "APPROVED" }),
        )
        .await?;
        assert_eq!(status, 200);
        assert_eq!(body["data"]["status_validation"], "APPROVED");

        let asset = get_asset(&server.base_url, &admin_token, asset_id).await?;
        assert_eq!(asset["data"]["status"], "JANJI_BAYAR");

        // A decided report is final: neither re-approval nor rejection may win
        for decision in ["APPROVED", "REJECTED"] {
            let (status, body) = decide_visit(
                &server.base_url,
                &admin_token,
                &report_id,
                json!({ "status": decision }),
            )
            .await?;
            assert_eq!(status, 409, "expected conflict for {}", decision);
            assert_eq!(body["code"], "CONFLICT");
        }
        Ok(())
    })
}

#[test]
fn approving_a_plain_visit_leaves_asset_unchanged() -> Result<()> {
    rt().block_on(async {
        let server = common::ensure_server().await?;
        let (_, admin) = seed_user("MANAGER").await?;
        let (_, collector) = seed_user("COLLECTOR").await?;
        let asset_id = seed_asset().await?;

        let collector_token = login(&server.base_url, &collector).await?;
        let admin_token = login(&server.base_url, &admin).await?;

        let (status, body) = submit_visit(
            &server.base_url,
            &collector_token,
            asset_id,
            "Tidak ada di rumah",
        )
        .await?;
        assert_eq!(status, 201);
        assert!(body["data"]["commitment_date"].is_null());
        let report_id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, _) = decide_visit(
            &server.base_url,
            &admin_token,
            &report_id,
            json!({ "status": "APPROVED" }),
        )
        .await?;
        assert_eq!(status, 200);

        let asset = get_asset(&server.base_url, &admin_token, asset_id).await?;
        assert_eq!(asset["data"]["status"], "NORMAL");
        Ok(())
    })
}

#[test]
fn rejection_overwrites_notes_and_never_mutates_asset() -> Result<()> {
    rt().block_on(async {
        let server = common::ensure_server().await?;
        let (_, admin) = seed_user("ADMIN").await?;
        let (_, collector) = seed_user("COLLECTOR").await?;
        let asset_id = seed_asset().await?;

        let collector_token = login(&server.base_url, &collector).await?;
        let admin_token = login(&server.base_url, &admin).await?;

        let (_, body) = submit_visit(
            &server.base_url,
            &collector_token,
            asset_id,
            "Komitmen: 2026-02-01",
        )
        .await?;
        let report_id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, body) = decide_visit(
            &server.base_url,
            &admin_token,
            &report_id,
            json!({ "status": "REJECTED", "rejectionReason": "foto bukti tidak jelas" }),
        )
        .await?;
        assert_eq!(status, 200);
        assert_eq!(body["data"]["status_validation"], "REJECTED");
        assert_eq!(body["data"]["notes"], "foto bukti tidak jelas");

        // Rejection must not advance the asset, commitment marker or not
        let asset = get_asset(&server.base_url, &admin_token, asset_id).await?;
        assert_eq!(asset["data"]["status"], "NORMAL");

        // And the rejected report can never be approved afterwards
        let (status, _) = decide_visit(
            &server.base_url,
            &admin_token,
            &report_id,
            json!({ "status": "APPROVED" }),
        )
        .await?;
        assert_eq!(status, 409);
        Ok(())
    })
}

#[test]
fn collectors_cannot_validate_reports() -> Result<()> {
    rt().block_on(async {
        let server = common::ensure_server().await?;
        let (_, collector) = seed_user("COLLECTOR").await?;
        let asset_id = seed_asset().await?;

        let collector_token = login(&server.base_url, &collector).await?;
        let (_, body) =
            submit_visit(&server.base_url, &collector_token, asset_id, "VISITED").await?;
        let report_id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, body) = decide_visit(
            &server.base_url,
            &collector_token,
            &report_id,
            json!({ "status": "APPROVED" }),
        )
        .await?;
        assert_eq!(status, 403);
        assert_eq!(body["code"], "FORBIDDEN");
        Ok(())
    })
}

#[test]
fn bulk_assignment_skips_existing_active_pairs() -> Result<()> {
    rt().block_on(async {
        let server = common::ensure_server().await?;
        let (_, admin) = seed_user("ADMIN").await?;
        let (collector_id, _) = seed_user("COLLECTOR").await?;
        let a1 = seed_asset().await?;
        let a2 = seed_asset().await?;
        let a3 = seed_asset().await?;

        let admin_token = login(&server.base_url, &admin).await?;
        let client = reqwest::Client::new();

        // Pre-existing active assignment for A1
        let resp = client
            .post(format!("{}/api/assignments/bulk", server.base_url))
            .bearer_auth(&admin_token)
            .json(&json!({ "collectorId": collector_id, "assetIds": [a1] }))
            .send()
            .await?;
        assert_eq!(resp.status(), 200);

        let resp = client
            .post(format!("{}/api/assignments/bulk", server.base_url))
            .bearer_auth(&admin_token)
            .json(&json!({ "collectorId": collector_id, "assetIds": [a1, a2, a3] }))
            .send()
            .await?;
        assert_eq!(resp.status(), 200);

        let body: Value = resp.json().await?;
        assert_eq!(body["data"]["created"].as_array().unwrap().len(), 2);
        assert_eq!(body["data"]["skipped"], json!([a1]));
        assert_eq!(body["data"]["errors"].as_array().unwrap().len(), 0);
        Ok(())
    })
}

#[test]
fn approved_payments_show_up_in_monthly_collected() -> Result<()> {
    rt().block_on(async {
        let server = common::ensure_server().await?;
        let (_, admin) = seed_user("ADMIN").await?;
        let (_, collector) = seed_user("COLLECTOR").await?;
        let asset_id = seed_asset().await?;

        let collector_token = login(&server.base_url, &collector).await?;
        let admin_token = login(&server.base_url, &admin).await?;
        let client = reqwest::Client::new();

        let resp = client
            .post(format!("{}/api/reports/payment", server.base_url))
            .bearer_auth(&collector_token)
            .json(&json!({ "assetId": asset_id, "amount": 150000, "paymentMethod": "TRANSFER" }))
            .send()
            .await?;
        assert_eq!(resp.status(), 201);
        let body: Value = resp.json().await?;
        let report_id = body["data"]["id"].as_str().unwrap().to_string();

        // Pending payments are not counted yet
        let resp = client
            .get(format!("{}/api/collector/dashboard", server.base_url))
            .bearer_auth(&collector_token)
            .send()
            .await?;
        let body: Value = resp.json().await?;
        let collected: f64 = body["data"]["monthly_collected"]
            .as_str()
            .unwrap()
            .parse()?;
        assert_eq!(collected, 0.0);

        let resp = client
            .patch(format!(
                "{}/api/reports/payment/{}",
                server.base_url, report_id
            ))
            .bearer_auth(&admin_token)
            .json(&json!({ "status": "APPROVED" }))
            .send()
            .await?;
        assert_eq!(resp.status(), 200);

        let resp = client
            .get(format!("{}/api/collector/dashboard", server.base_url))
            .bearer_auth(&collector_token)
            .send()
            .await?;
        let body: Value = resp.json().await?;
        let collected: f64 = body["data"]["monthly_collected"]
            .as_str()
            .unwrap()
            .parse()?;
        assert_eq!(collected, 150000.0);
        assert_eq!(body["data"]["visits_today"], 0);
        Ok(())
    })
}
