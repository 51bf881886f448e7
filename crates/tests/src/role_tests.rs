use crate::fixtures::test_app::TestApp;
use serde_json::Value;

#[tokio::test]
async fn custom_role_inherits_member_rights() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_team("teamlead").await;

    let resp = app
        .auth_put(
            &format!("/api/team/{}/role/teamlead", seeded.team_id),
            &seeded.owner.access_token,
        )
        .json(&serde_json::json!({
            "label": "Team Lead",
            "rights": { "deleteTask": true },
            "inherits": ["member"],
        }))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let resp = app
        .auth_get(
            &format!("/api/team/{}/role", seeded.team_id),
            &seeded.owner.access_token,
        )
        .send()
        .await
        .unwrap();
    let roles: Vec<Value> = resp.json().await.unwrap();
    let teamlead = roles.iter().find(|r| r["name"] == "teamlead").unwrap();

    // Own grant plus everything inherited from the member template.
    assert_eq!(teamlead["effective_rights"]["deleteTask"], true);
    assert_eq!(teamlead["effective_rights"]["createTask"], true);
    assert_eq!(teamlead["effective_rights"]["editTask"], true);
}

#[tokio::test]
async fn own_rights_override_inherited_ones() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_team("override").await;

    let resp = app
        .auth_put(
            &format!("/api/team/{}/role/restricted", seeded.team_id),
            &seeded.owner.access_token,
        )
        .json(&serde_json::json!({
            "label": "Restricted",
            "rights": { "createTask": false },
            "inherits": ["member"],
        }))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let resp = app
        .auth_get(
            &format!("/api/team/{}/role", seeded.team_id),
            &seeded.owner.access_token,
        )
        .send()
        .await
        .unwrap();
    let roles: Vec<Value> = resp.json().await.unwrap();
    let restricted = roles.iter().find(|r| r["name"] == "restricted").unwrap();

    assert_eq!(restricted["effective_rights"]["createTask"], false);
    assert_eq!(restricted["effective_rights"]["editTask"], true);
}

#[tokio::test]
async fn role_cannot_inherit_from_itself() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_team("selfinherit").await;

    let resp = app
        .auth_put(
            &format!("/api/team/{}/role/loop", seeded.team_id),
            &seeded.owner.access_token,
        )
        .json(&serde_json::json!({
            "label": "Loop",
            "rights": {},
            "inherits": ["loop"],
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 422);
}

#[tokio::test]
async fn cyclic_inheritance_across_roles_still_resolves() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_team("cycle").await;

    for (name, parent) in [("alpha", "beta"), ("beta", "alpha")] {
        let resp = app
            .auth_put(
                &format!("/api/team/{}/role/{}", seeded.team_id, name),
                &seeded.owner.access_token,
            )
            .json(&serde_json::json!({
                "label": name,
                "rights": { "createTask": true },
                "inherits": [parent],
            }))
            .send()
            .await
            .unwrap();
        assert!(resp.status().is_success());
    }

    // Listing resolves effective rights for every role and must terminate.
    let resp = app
        .auth_get(
            &format!("/api/team/{}/role", seeded.team_id),
            &seeded.owner.access_token,
        )
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let roles: Vec<Value> = resp.json().await.unwrap();
    let alpha = roles.iter().find(|r| r["name"] == "alpha").unwrap();
    assert_eq!(alpha["effective_rights"]["createTask"], true);
}

#[tokio::test]
async fn role_management_requires_manage_roles_right() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_team("rolegate").await;

    let resp = app
        .auth_put(
            &format!("/api/team/{}/role/sneaky", seeded.team_id),
            &seeded.member.access_token,
        )
        .json(&serde_json::json!({
            "label": "Sneaky",
            "rights": { "deleteTask": true },
            "inherits": [],
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 403);
}

#[tokio::test]
async fn deleting_a_role_orphans_its_members_onto_no_rights() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_team("orphan").await;

    let resp = app
        .auth_delete(
            &format!("/api/team/{}/role/member", seeded.team_id),
            &seeded.owner.access_token,
        )
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    // The orphaned member now resolves to empty rights and fails closed.
    let resp = app
        .auth_post(
            &format!("/api/team/{}/task", seeded.team_id),
            &seeded.member.access_token,
        )
        .json(&serde_json::json!({ "title": "Should not exist" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);
}

#[tokio::test]
async fn owner_retains_full_rights_after_owner_role_is_deleted() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_team("ownergone").await;

    let resp = app
        .auth_delete(
            &format!("/api/team/{}/role/owner", seeded.team_id),
            &seeded.owner.access_token,
        )
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    // The owner override never consults the role table.
    let task = app
        .create_task(
            &seeded.team_id,
            &seeded.owner.access_token,
            serde_json::json!({ "title": "Still in control" }),
        )
        .await;

    let resp = app
        .auth_delete(
            &format!(
                "/api/team/{}/task/{}",
                seeded.team_id,
                task["id"].as_str().unwrap()
            ),
            &seeded.owner.access_token,
        )
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
}
