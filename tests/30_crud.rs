mod common;

use anyhow::Result;
use common::{expect_status, TestServer};
use serde_json::{json, Value};

fn ids(body: &Value) -> Vec<i64> {
    body["data"]
        .as_array()
        .map(|rows| rows.iter().filter_map(|r| r["id"].as_i64()).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn organization_lifecycle() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server
        .post("/api/v1/organizations")
        .json(&json!({ "name": "Springfield High", "code": "SHS", "domain": "shs.example.edu" }))
        .send()
        .await?;
    let body = expect_status(res, 201).await?;
    let id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["is_active"], true);
    assert_eq!(body["data"]["settings"], json!({}));

    let res = server
        .post("/api/v1/organizations")
        .json(&json!({ "name": "Copycat", "code": "SHS" }))
        .send()
        .await?;
    let body = expect_status(res, 409).await?;
    assert_eq!(body["code"], "CONFLICT");

    let body = expect_status(server.get("/api/v1/organizations/by-code/SHS").send().await?, 200).await?;
    assert_eq!(body["data"]["id"], id);

    let res = server
        .put(&format!("/api/v1/organizations/{}", id))
        .json(&json!({ "name": "Springfield High School" }))
        .send()
        .await?;
    let body = expect_status(res, 200).await?;
    assert_eq!(body["data"]["name"], "Springfield High School");
    assert_eq!(body["data"]["code"], "SHS");

    let res = server.delete(&format!("/api/v1/organizations/{}", id)).send().await?;
    let body = expect_status(res, 200).await?;
    assert_eq!(body["data"]["message"], "Organization deleted successfully");

    expect_status(server.get(&format!("/api/v1/organizations/{}", id)).send().await?, 404).await?;

    Ok(())
}

#[tokio::test]
async fn organization_list_pages_and_filters() -> Result<()> {
    let server = TestServer::spawn().await?;
    let first = server.create_org("ONE").await?;
    let second = server.create_org("TWO").await?;
    let third = server.create_org("THREE").await?;

    server
        .put(&format!("/api/v1/organizations/{}", second))
        .json(&json!({ "is_active": false }))
        .send()
        .await?;

    let body = expect_status(server.get("/api/v1/organizations").send().await?, 200).await?;
    assert_eq!(ids(&body), vec![first, second, third]);

    let body = expect_status(server.get("/api/v1/organizations?active_only=true").send().await?, 200).await?;
    assert_eq!(ids(&body), vec![first, third]);

    let body = expect_status(server.get("/api/v1/organizations?skip=1&limit=1").send().await?, 200).await?;
    assert_eq!(ids(&body), vec![second]);

    let body = expect_status(server.get("/api/v1/organizations?limit=101").send().await?, 422).await?;
    assert!(body["field_errors"]["limit"].is_string());

    Ok(())
}

#[tokio::test]
async fn create_under_context_ignores_explicit_organization() -> Result<()> {
    let server = TestServer::spawn().await?;
    let org_a = server.create_org("ALPHA").await?;
    let org_b = server.create_org("BETA").await?;

    let res = server
        .post("/api/v1/users")
        .header("X-Tenant-ID", org_a.to_string())
        .json(&json!({ "email": "x@alpha.edu", "role": "teacher", "organization_id": org_b }))
        .send()
        .await?;
    let body = expect_status(res, 201).await?;
    assert_eq!(body["data"]["organization_id"], org_a);

    Ok(())
}

#[tokio::test]
async fn create_without_any_tenant_is_rejected() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server
        .post("/api/v1/users")
        .json(&json!({ "email": "nobody@nowhere.edu", "role": "student" }))
        .send()
        .await?;
    expect_status(res, 400).await?;

    let res = server
        .post("/api/v1/users")
        .json(&json!({ "email": "nobody@nowhere.edu", "role": "student", "organization_id": 42 }))
        .send()
        .await?;
    let body = expect_status(res, 422).await?;
    assert_eq!(body["message"], "Organization 42 not found");

    Ok(())
}

#[tokio::test]
async fn update_never_moves_rows_between_tenants() -> Result<()> {
    let server = TestServer::spawn().await?;
    let org_a = server.create_org("ALPHA").await?;
    let org_b = server.create_org("BETA").await?;
    let user = server.create_user(org_a, "mover@alpha.edu", "student").await?;

    let res = server
        .put(&format!("/api/v1/users/{}", user))
        .header("X-Tenant-ID", org_a.to_string())
        .json(&json!({ "organization_id": org_b, "full_name": "Still Here" }))
        .send()
        .await?;
    let body = expect_status(res, 200).await?;
    assert_eq!(body["data"]["organization_id"], org_a);
    assert_eq!(body["data"]["full_name"], "Still Here");

    let res = server
        .put(&format!("/api/v1/users/{}", user))
        .header("X-Tenant-ID", org_a.to_string())
        .json(&json!({ "id": 999 }))
        .send()
        .await?;
    expect_status(res, 400).await?;

    let res = server
        .put(&format!("/api/v1/users/{}", user))
        .header("X-Tenant-ID", org_a.to_string())
        .json(&json!({ "favourite_colour": "green" }))
        .send()
        .await?;
    expect_status(res, 422).await?;

    Ok(())
}

#[tokio::test]
async fn unscoped_update_rejects_organization_change() -> Result<()> {
    let server = TestServer::spawn().await?;
    let org_a = server.create_org("ALPHA").await?;
    let org_b = server.create_org("BETA").await?;
    let user = server.create_user(org_a, "admin@alpha.edu", "admin").await?;

    let res = server
        .put(&format!("/api/v1/users/{}", user))
        .json(&json!({ "organization_id": org_b }))
        .send()
        .await?;
    let body = expect_status(res, 400).await?;
    assert_eq!(body["message"], "Field 'organization_id' cannot be changed once set");

    let res = server
        .get(&format!("/api/v1/users/{}", user))
        .header("X-Tenant-ID", org_a.to_string())
        .send()
        .await?;
    let body = expect_status(res, 200).await?;
    assert_eq!(body["data"]["organization_id"], org_a);

    Ok(())
}

#[tokio::test]
async fn natural_key_lookups_stay_inside_the_tenant() -> Result<()> {
    let server = TestServer::spawn().await?;
    let org_a = server.create_org("ALPHA").await?;
    let org_b = server.create_org("BETA").await?;
    let user = server.create_user(org_a, "kid@alpha.edu", "student").await?;
    let teacher = server.create_user(org_a, "t@alpha.edu", "teacher").await?;
    let (alpha, beta) = (org_a.to_string(), org_b.to_string());

    let res = server
        .post("/api/v1/students")
        .header("X-Tenant-ID", &alpha)
        .json(&json!({ "user_id": user, "student_number": "S-042" }))
        .send()
        .await?;
    let student = expect_status(res, 201).await?["data"]["id"].as_i64().unwrap();

    let res = server
        .post("/api/v1/courses")
        .header("X-Tenant-ID", &alpha)
        .json(&json!({ "title": "Physics", "code": "PHY1", "teacher_id": teacher }))
        .send()
        .await?;
    let course = expect_status(res, 201).await?["data"]["id"].as_i64().unwrap();

    for (path, id) in [
        ("/api/v1/users/by-email/kid@alpha.edu", user),
        ("/api/v1/students/by-number/S-042", student),
        ("/api/v1/courses/by-code/PHY1", course),
    ] {
        let body = expect_status(server.get(path).header("X-Tenant-ID", &alpha).send().await?, 200).await?;
        assert_eq!(body["data"]["id"], id, "{}", path);

        let res = server.get(path).header("X-Tenant-ID", &beta).send().await?;
        expect_status(res, 404).await?;
    }

    Ok(())
}

#[tokio::test]
async fn organization_lookup_by_domain() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server
        .post("/api/v1/organizations")
        .json(&json!({ "name": "Riverdale", "code": "RIV", "domain": "riverdale.edu" }))
        .send()
        .await?;
    let id = expect_status(res, 201).await?["data"]["id"].as_i64().unwrap();

    let body = expect_status(server.get("/api/v1/organizations/by-domain/riverdale.edu").send().await?, 200).await?;
    assert_eq!(body["data"]["id"], id);

    expect_status(server.get("/api/v1/organizations/by-domain/nowhere.edu").send().await?, 404).await?;

    Ok(())
}

#[tokio::test]
async fn references_must_stay_inside_the_tenant() -> Result<()> {
    let server = TestServer::spawn().await?;
    let org_a = server.create_org("ALPHA").await?;
    let org_b = server.create_org("BETA").await?;
    let foreign_teacher = server.create_user(org_b, "teacher@beta.edu", "teacher").await?;
    let teacher = server.create_user(org_a, "teacher@alpha.edu", "teacher").await?;

    let res = server
        .post("/api/v1/courses")
        .header("X-Tenant-ID", org_a.to_string())
        .json(&json!({ "title": "Algebra", "code": "MATH101", "teacher_id": foreign_teacher }))
        .send()
        .await?;
    let body = expect_status(res, 422).await?;
    assert_eq!(body["message"], format!("User {} not found", foreign_teacher));

    let res = server
        .post("/api/v1/courses")
        .header("X-Tenant-ID", org_a.to_string())
        .json(&json!({ "title": "Algebra", "code": "MATH101", "teacher_id": teacher }))
        .send()
        .await?;
    let body = expect_status(res, 201).await?;
    assert_eq!(body["data"]["teacher_id"], teacher);

    // Same course code is free in another tenant, taken in this one
    let res = server
        .post("/api/v1/courses")
        .header("X-Tenant-ID", org_b.to_string())
        .json(&json!({ "title": "Algebra", "code": "MATH101", "teacher_id": foreign_teacher }))
        .send()
        .await?;
    expect_status(res, 201).await?;

    let res = server
        .post("/api/v1/courses")
        .header("X-Tenant-ID", org_a.to_string())
        .json(&json!({ "title": "Algebra II", "code": "MATH101", "teacher_id": teacher }))
        .send()
        .await?;
    expect_status(res, 409).await?;

    Ok(())
}

#[tokio::test]
async fn student_validation_and_lookup() -> Result<()> {
    let server = TestServer::spawn().await?;
    let org = server.create_org("ALPHA").await?;
    let user = server.create_user(org, "kid@alpha.edu", "student").await?;
    let tenant = org.to_string();

    let res = server
        .post("/api/v1/students")
        .header("X-Tenant-ID", &tenant)
        .json(&json!({ "user_id": user, "student_number": "S-001", "gpa": 7.5 }))
        .send()
        .await?;
    let body = expect_status(res, 422).await?;
    assert!(body["field_errors"]["gpa"].is_string());

    let res = server
        .post("/api/v1/students")
        .header("X-Tenant-ID", &tenant)
        .json(&json!({
            "user_id": user,
            "student_number": "S-001",
            "date_of_birth": "2010-04-01",
            "gpa": 3.7
        }))
        .send()
        .await?;
    let body = expect_status(res, 201).await?;
    let student = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["date_of_birth"], "2010-04-01");

    let res = server
        .put(&format!("/api/v1/students/{}", student))
        .header("X-Tenant-ID", &tenant)
        .json(&json!({ "current_grade": "10", "is_active": false }))
        .send()
        .await?;
    let body = expect_status(res, 200).await?;
    assert_eq!(body["data"]["current_grade"], "10");

    let res = server
        .get("/api/v1/students?active_only=true")
        .header("X-Tenant-ID", &tenant)
        .send()
        .await?;
    let body = expect_status(res, 200).await?;
    assert!(ids(&body).is_empty());

    Ok(())
}

#[tokio::test]
async fn assignments_list_by_due_date() -> Result<()> {
    let server = TestServer::spawn().await?;
    let org = server.create_org("ALPHA").await?;
    let teacher = server.create_user(org, "t@alpha.edu", "teacher").await?;
    let tenant = org.to_string();

    let res = server
        .post("/api/v1/courses")
        .header("X-Tenant-ID", &tenant)
        .json(&json!({ "title": "Biology", "code": "BIO", "teacher_id": teacher }))
        .send()
        .await?;
    let course = expect_status(res, 201).await?["data"]["id"].as_i64().unwrap();

    let mut created = Vec::new();
    for (title, due) in [
        ("Final", "2026-06-01T09:00:00Z"),
        ("Quiz", "2026-02-01T09:00:00Z"),
        ("Midterm", "2026-04-01T09:00:00Z"),
    ] {
        let res = server
            .post("/api/v1/assignments")
            .header("X-Tenant-ID", &tenant)
            .json(&json!({ "course_id": course, "title": title, "due_date": due }))
            .send()
            .await?;
        let body = expect_status(res, 201).await?;
        assert_eq!(body["data"]["total_points"], 100.0);
        created.push(body["data"]["id"].as_i64().unwrap());
    }

    let res = server
        .get(&format!("/api/v1/assignments?course_id={}", course))
        .header("X-Tenant-ID", &tenant)
        .send()
        .await?;
    let body = expect_status(res, 200).await?;
    assert_eq!(ids(&body), vec![created[1], created[2], created[0]]);

    let res = server
        .post("/api/v1/assignments")
        .header("X-Tenant-ID", &tenant)
        .json(&json!({ "course_id": course + 100, "title": "Ghost", "due_date": "2026-01-01T00:00:00Z" }))
        .send()
        .await?;
    expect_status(res, 422).await?;

    Ok(())
}

#[tokio::test]
async fn notifications_are_newest_first_and_track_reads() -> Result<()> {
    let server = TestServer::spawn().await?;
    let org = server.create_org("ALPHA").await?;
    let user = server.create_user(org, "reader@alpha.edu", "student").await?;
    let tenant = org.to_string();

    let mut created = Vec::new();
    for title in ["first", "second", "third"] {
        let res = server
            .post("/api/v1/notifications")
            .header("X-Tenant-ID", &tenant)
            .json(&json!({
                "user_id": user,
                "title": title,
                "message": "hello",
                "notification_type": "announcement"
            }))
            .send()
            .await?;
        let body = expect_status(res, 201).await?;
        assert_eq!(body["data"]["priority"], "medium");
        assert_eq!(body["data"]["is_read"], false);
        created.push(body["data"]["id"].as_i64().unwrap());
    }

    let res = server
        .get(&format!("/api/v1/users/{}/notifications", user))
        .header("X-Tenant-ID", &tenant)
        .send()
        .await?;
    let body = expect_status(res, 200).await?;
    assert_eq!(ids(&body), vec![created[2], created[1], created[0]]);

    let res = server
        .post(&format!("/api/v1/notifications/{}/read", created[1]))
        .header("X-Tenant-ID", &tenant)
        .send()
        .await?;
    let body = expect_status(res, 200).await?;
    assert_eq!(body["data"]["is_read"], true);

    let res = server
        .post(&format!("/api/v1/notifications/{}/delivered", created[0]))
        .header("X-Tenant-ID", &tenant)
        .send()
        .await?;
    let body = expect_status(res, 200).await?;
    assert_eq!(body["data"]["is_delivered"], true);

    let res = server
        .get(&format!("/api/v1/users/{}/notifications?unread_only=true", user))
        .header("X-Tenant-ID", &tenant)
        .send()
        .await?;
    let body = expect_status(res, 200).await?;
    assert_eq!(ids(&body), vec![created[2], created[0]]);

    let res = server
        .delete(&format!("/api/v1/notifications/{}", created[2]))
        .header("X-Tenant-ID", &tenant)
        .send()
        .await?;
    let body = expect_status(res, 200).await?;
    assert_eq!(body["data"]["message"], "Notification deleted successfully");

    Ok(())
}

#[tokio::test]
async fn grades_and_attendance_are_tenant_scoped() -> Result<()> {
    let server = TestServer::spawn().await?;
    let org_a = server.create_org("ALPHA").await?;
    let org_b = server.create_org("BETA").await?;
    let teacher = server.create_user(org_a, "t@alpha.edu", "teacher").await?;
    let kid = server.create_user(org_a, "kid@alpha.edu", "student").await?;
    let (alpha, beta) = (org_a.to_string(), org_b.to_string());

    let res = server
        .post("/api/v1/students")
        .header("X-Tenant-ID", &alpha)
        .json(&json!({ "user_id": kid, "student_number": "S-7" }))
        .send()
        .await?;
    let student = expect_status(res, 201).await?["data"]["id"].as_i64().unwrap();

    let res = server
        .post("/api/v1/courses")
        .header("X-Tenant-ID", &alpha)
        .json(&json!({ "title": "History", "code": "HIS", "teacher_id": teacher }))
        .send()
        .await?;
    let course = expect_status(res, 201).await?["data"]["id"].as_i64().unwrap();

    let res = server
        .post("/api/v1/assignments")
        .header("X-Tenant-ID", &alpha)
        .json(&json!({ "course_id": course, "title": "Essay", "due_date": "2026-10-01T00:00:00Z", "total_points": 20 }))
        .send()
        .await?;
    let assignment = expect_status(res, 201).await?["data"]["id"].as_i64().unwrap();

    let res = server
        .post("/api/v1/grades")
        .header("X-Tenant-ID", &alpha)
        .json(&json!({ "student_id": student, "assignment_id": assignment, "score": 25 }))
        .send()
        .await?;
    let body = expect_status(res, 422).await?;
    assert!(body["field_errors"]["score"].is_string());

    let res = server
        .post("/api/v1/grades")
        .header("X-Tenant-ID", &alpha)
        .json(&json!({ "student_id": student, "assignment_id": assignment, "score": 18.5 }))
        .send()
        .await?;
    let grade = expect_status(res, 201).await?["data"]["id"].as_i64().unwrap();

    let res = server
        .post("/api/v1/attendance")
        .header("X-Tenant-ID", &alpha)
        .json(&json!({ "student_id": student, "course_id": course, "date": "2026-09-14", "status": "late" }))
        .send()
        .await?;
    let record = expect_status(res, 201).await?["data"]["id"].as_i64().unwrap();

    let res = server
        .post("/api/v1/attendance")
        .header("X-Tenant-ID", &alpha)
        .json(&json!({ "student_id": student, "course_id": course, "date": "2026-09-14", "status": "present" }))
        .send()
        .await?;
    expect_status(res, 409).await?;

    let res = server
        .get(&format!("/api/v1/grades?student_id={}", student))
        .header("X-Tenant-ID", &alpha)
        .send()
        .await?;
    assert_eq!(ids(&expect_status(res, 200).await?), vec![grade]);

    let res = server
        .get("/api/v1/attendance?date=2026-09-14")
        .header("X-Tenant-ID", &alpha)
        .send()
        .await?;
    assert_eq!(ids(&expect_status(res, 200).await?), vec![record]);

    for path in [format!("/api/v1/grades/{}", grade), format!("/api/v1/attendance/{}", record)] {
        expect_status(server.get(&path).header("X-Tenant-ID", &beta).send().await?, 404).await?;
    }
    let res = server.get("/api/v1/grades").header("X-Tenant-ID", &beta).send().await?;
    assert!(ids(&expect_status(res, 200).await?).is_empty());

    let res = server
        .post("/api/v1/grades")
        .header("X-Tenant-ID", &beta)
        .json(&json!({ "student_id": student, "assignment_id": assignment, "score": 1 }))
        .send()
        .await?;
    expect_status(res, 422).await?;

    Ok(())
}
