mod common;

use anyhow::Result;
use common::{expect_status, TestServer};
use serde_json::json;

#[tokio::test]
async fn foreign_tenant_sees_not_found() -> Result<()> {
    let server = TestServer::spawn().await?;
    let org_a = server.create_org("ALPHA").await?;
    let org_b = server.create_org("BETA").await?;
    let user = server.create_user(org_b, "owner@beta.edu", "student").await?;

    let res = server
        .get(&format!("/api/v1/users/{}", user))
        .header("X-Tenant-ID", org_a.to_string())
        .send()
        .await?;
    let body = expect_status(res, 404).await?;
    assert_eq!(body["code"], "NOT_FOUND");
    assert_eq!(body["message"], "User not found");

    let res = server
        .get(&format!("/api/v1/users/{}", user))
        .header("X-Tenant-ID", org_b.to_string())
        .send()
        .await?;
    let body = expect_status(res, 200).await?;
    assert_eq!(body["data"]["id"], user);
    assert_eq!(body["data"]["organization_id"], org_b);

    Ok(())
}

#[tokio::test]
async fn foreign_tenant_cannot_update_or_delete() -> Result<()> {
    let server = TestServer::spawn().await?;
    let org_a = server.create_org("ALPHA").await?;
    let org_b = server.create_org("BETA").await?;
    let user = server.create_user(org_b, "owner@beta.edu", "teacher").await?;

    let res = server
        .put(&format!("/api/v1/users/{}", user))
        .header("X-Tenant-ID", org_a.to_string())
        .json(&json!({ "full_name": "Hijacked" }))
        .send()
        .await?;
    expect_status(res, 404).await?;

    let res = server
        .delete(&format!("/api/v1/users/{}", user))
        .header("X-Tenant-ID", org_a.to_string())
        .send()
        .await?;
    expect_status(res, 404).await?;

    let res = server
        .get(&format!("/api/v1/users/{}", user))
        .header("X-Tenant-ID", org_b.to_string())
        .send()
        .await?;
    let body = expect_status(res, 200).await?;
    assert_eq!(body["data"]["full_name"], "Test User");

    Ok(())
}

#[tokio::test]
async fn malformed_tenant_id_is_rejected() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server.get("/api/v1/users").header("X-Tenant-ID", "abc").send().await?;
    let body = expect_status(res, 400).await?;
    assert_eq!(body["error"], true);
    assert_eq!(body["code"], "INVALID_TENANT_ID");

    let res = server.get("/api/v1/users?tenant_id=12x").send().await?;
    let body = expect_status(res, 400).await?;
    assert_eq!(body["code"], "INVALID_TENANT_ID");

    Ok(())
}

#[tokio::test]
async fn unknown_and_inactive_tenants_look_the_same() -> Result<()> {
    let server = TestServer::spawn().await?;
    let org = server.create_org("SLEEPY").await?;

    let res = server.get("/api/v1/users").header("X-Tenant-ID", "999").send().await?;
    let unknown = expect_status(res, 404).await?;
    assert_eq!(unknown["message"], "Organization not found or inactive");

    let res = server
        .put(&format!("/api/v1/organizations/{}", org))
        .json(&json!({ "is_active": false }))
        .send()
        .await?;
    let body = expect_status(res, 200).await?;
    assert_eq!(body["data"]["is_active"], false);

    let res = server
        .get("/api/v1/users")
        .header("X-Tenant-ID", org.to_string())
        .send()
        .await?;
    let inactive = expect_status(res, 404).await?;
    assert_eq!(inactive, unknown);

    Ok(())
}

#[tokio::test]
async fn organization_routes_skip_resolution() -> Result<()> {
    let server = TestServer::spawn().await?;
    let org = server.create_org("ADMIN").await?;

    // Tenant 3 does not exist, but organization management never resolves it
    let res = server
        .get(&format!("/api/v1/organizations/{}", org))
        .header("X-Tenant-ID", "3")
        .send()
        .await?;
    let body = expect_status(res, 200).await?;
    assert_eq!(body["data"]["code"], "ADMIN");

    let res = server
        .get("/api/v1/organizations")
        .header("X-Tenant-ID", "not-a-number")
        .send()
        .await?;
    expect_status(res, 200).await?;

    Ok(())
}

#[tokio::test]
async fn query_parameter_is_a_fallback_for_the_header() -> Result<()> {
    let server = TestServer::spawn().await?;
    let org_a = server.create_org("ALPHA").await?;
    let org_b = server.create_org("BETA").await?;
    server.create_user(org_a, "a@alpha.edu", "student").await?;
    server.create_user(org_b, "b@beta.edu", "student").await?;

    let res = server.get(&format!("/api/v1/users?tenant_id={}", org_a)).send().await?;
    let body = expect_status(res, 200).await?;
    let users = body["data"].as_array().cloned().unwrap_or_default();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["email"], "a@alpha.edu");

    // Header wins over the query parameter
    let res = server
        .get(&format!("/api/v1/users?tenant_id={}", org_a))
        .header("X-Tenant-ID", org_b.to_string())
        .send()
        .await?;
    let body = expect_status(res, 200).await?;
    let users = body["data"].as_array().cloned().unwrap_or_default();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["email"], "b@beta.edu");

    Ok(())
}

#[tokio::test]
async fn concurrent_requests_never_share_a_tenant() -> Result<()> {
    let server = TestServer::spawn().await?;
    let org_a = server.create_org("ALPHA").await?;
    let org_b = server.create_org("BETA").await?;
    for i in 0..3 {
        server.create_user(org_a, &format!("a{}@alpha.edu", i), "student").await?;
    }
    server.create_user(org_b, "b@beta.edu", "student").await?;

    let requests = (0..40).map(|i| {
        let org = if i % 2 == 0 { org_a } else { org_b };
        let request = server
            .get("/api/v1/users")
            .header("X-Tenant-ID", org.to_string())
            .send();
        async move { (org, request.await) }
    });

    for (org, res) in futures::future::join_all(requests).await {
        let body = expect_status(res?, 200).await?;
        let users = body["data"].as_array().cloned().unwrap_or_default();
        let expected = if org == org_a { 3 } else { 1 };
        assert_eq!(users.len(), expected, "tenant {} saw {}", org, body);
        assert!(users.iter().all(|u| u["organization_id"] == org));
    }

    Ok(())
}
