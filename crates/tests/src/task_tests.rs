use crate::fixtures::test_app::TestApp;
use serde_json::Value;

#[tokio::test]
async fn new_tasks_start_closed_even_if_client_claims_otherwise() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_team("forced").await;

    // The status field is not part of the create contract; a client
    // sending one must not be able to pre-complete a task.
    let task = app
        .create_task(
            &seeded.team_id,
            &seeded.owner.access_token,
            serde_json::json!({ "title": "Sneaky", "status": "completed" }),
        )
        .await;

    assert_eq!(task["status"], "closed");
    assert_eq!(task["dependencies"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn task_creation_requires_a_title() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_team("notitle").await;

    let resp = app
        .auth_post(
            &format!("/api/team/{}/task", seeded.team_id),
            &seeded.owner.access_token,
        )
        .json(&serde_json::json!({ "title": "" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 422);
}

#[tokio::test]
async fn toggle_walks_the_status_cycle() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_team("cycle").await;

    let task = app
        .create_task(
            &seeded.team_id,
            &seeded.owner.access_token,
            serde_json::json!({ "title": "Cycling" }),
        )
        .await;
    let task_id = task["id"].as_str().unwrap();
    let toggle_url = format!("/api/team/{}/task/{}/toggle", seeded.team_id, task_id);

    for expected in ["open", "completed", "closed"] {
        let resp = app
            .auth_post(&toggle_url, &seeded.owner.access_token)
            .send()
            .await
            .unwrap();
        assert!(resp.status().is_success());
        let task: Value = resp.json().await.unwrap();
        assert_eq!(task["status"], expected);
    }
}

#[tokio::test]
async fn completing_is_blocked_until_dependencies_complete() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_team("deps").await;
    let token = &seeded.owner.access_token;

    let dep = app
        .create_task(
            &seeded.team_id,
            token,
            serde_json::json!({ "title": "Prerequisite" }),
        )
        .await;
    let dep_id = dep["id"].as_str().unwrap();

    let task = app
        .create_task(
            &seeded.team_id,
            token,
            serde_json::json!({ "title": "Dependent", "dependencies": [dep_id] }),
        )
        .await;
    let task_id = task["id"].as_str().unwrap();
    let status_url = format!("/api/team/{}/task/{}/status", seeded.team_id, task_id);

    // Start work, then try to finish while the dependency is still closed.
    let resp = app
        .auth_post(&status_url, token)
        .json(&serde_json::json!({ "status": "open" }))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let resp = app
        .auth_post(&status_url, token)
        .json(&serde_json::json!({ "status": "completed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);

    // The rejected transition must leave the task untouched.
    let resp = app
        .auth_get(
            &format!("/api/team/{}/task/{}", seeded.team_id, task_id),
            token,
        )
        .send()
        .await
        .unwrap();
    let unchanged: Value = resp.json().await.unwrap();
    assert_eq!(unchanged["status"], "open");

    // Complete the dependency, then the same transition succeeds.
    app.complete_task(&seeded.team_id, dep_id, token).await;

    let resp = app
        .auth_post(&status_url, token)
        .json(&serde_json::json!({ "status": "completed" }))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let done: Value = resp.json().await.unwrap();
    assert_eq!(done["status"], "completed");
}

#[tokio::test]
async fn deleted_dependency_blocks_completion() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_team("dangling").await;
    let token = &seeded.owner.access_token;

    let dep = app
        .create_task(
            &seeded.team_id,
            token,
            serde_json::json!({ "title": "Doomed" }),
        )
        .await;
    let dep_id = dep["id"].as_str().unwrap().to_string();

    let task = app
        .create_task(
            &seeded.team_id,
            token,
            serde_json::json!({ "title": "Dependent", "dependencies": [dep_id] }),
        )
        .await;
    let task_id = task["id"].as_str().unwrap();

    let resp = app
        .auth_delete(
            &format!("/api/team/{}/task/{}", seeded.team_id, dep_id),
            token,
        )
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    // The dangling id must read as "not completed", never as satisfied.
    let status_url = format!("/api/team/{}/task/{}/status", seeded.team_id, task_id);
    let resp = app
        .auth_post(&status_url, token)
        .json(&serde_json::json!({ "status": "open" }))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let resp = app
        .auth_post(&status_url, token)
        .json(&serde_json::json!({ "status": "completed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);
}

#[tokio::test]
async fn a_task_cannot_depend_on_itself() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_team("selfdep").await;
    let token = &seeded.owner.access_token;

    let task = app
        .create_task(
            &seeded.team_id,
            token,
            serde_json::json!({ "title": "Loner" }),
        )
        .await;
    let task_id = task["id"].as_str().unwrap();

    let resp = app
        .auth_put(
            &format!("/api/team/{}/task/{}", seeded.team_id, task_id),
            token,
        )
        .json(&serde_json::json!({ "dependencies": [task_id] }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 422);
}

#[tokio::test]
async fn skipping_edges_of_the_machine_is_rejected() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_team("edges").await;
    let token = &seeded.owner.access_token;

    let task = app
        .create_task(
            &seeded.team_id,
            token,
            serde_json::json!({ "title": "Edgy" }),
        )
        .await;
    let task_id = task["id"].as_str().unwrap();

    // closed → completed is not an edge.
    let resp = app
        .auth_post(
            &format!("/api/team/{}/task/{}/status", seeded.team_id, task_id),
            token,
        )
        .json(&serde_json::json!({ "status": "completed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);
}

#[tokio::test]
async fn observers_cannot_touch_tasks() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_team("observer").await;

    let resp = app
        .auth_put(
            &format!("/api/team/{}/member/{}", seeded.team_id, seeded.member.id),
            &seeded.owner.access_token,
        )
        .json(&serde_json::json!({ "role": "observer" }))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let resp = app
        .auth_post(
            &format!("/api/team/{}/task", seeded.team_id),
            &seeded.member.access_token,
        )
        .json(&serde_json::json!({ "title": "Nope" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    let task = app
        .create_task(
            &seeded.team_id,
            &seeded.owner.access_token,
            serde_json::json!({ "title": "Owner's task" }),
        )
        .await;

    let resp = app
        .auth_post(
            &format!(
                "/api/team/{}/task/{}/toggle",
                seeded.team_id,
                task["id"].as_str().unwrap()
            ),
            &seeded.member.access_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);
}

#[tokio::test]
async fn completing_needs_its_own_right() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_team("starter").await;

    // A role that may start work but never finish it.
    let resp = app
        .auth_put(
            &format!("/api/team/{}/role/starter", seeded.team_id),
            &seeded.owner.access_token,
        )
        .json(&serde_json::json!({
            "label": "Starter",
            "rights": { "createTask": true, "editTask": true },
            "inherits": [],
        }))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let resp = app
        .auth_put(
            &format!("/api/team/{}/member/{}", seeded.team_id, seeded.member.id),
            &seeded.owner.access_token,
        )
        .json(&serde_json::json!({ "role": "starter" }))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let task = app
        .create_task(
            &seeded.team_id,
            &seeded.member.access_token,
            serde_json::json!({ "title": "Started only" }),
        )
        .await;
    let task_id = task["id"].as_str().unwrap();
    let status_url = format!("/api/team/{}/task/{}/status", seeded.team_id, task_id);

    // editTask covers starting...
    let resp = app
        .auth_post(&status_url, &seeded.member.access_token)
        .json(&serde_json::json!({ "status": "open" }))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    // ...but landing on completed needs completeTask.
    let resp = app
        .auth_post(&status_url, &seeded.member.access_token)
        .json(&serde_json::json!({ "status": "completed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);
}

#[tokio::test]
async fn deleting_tasks_requires_the_delete_right() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_team("taskdelete").await;

    let task = app
        .create_task(
            &seeded.team_id,
            &seeded.owner.access_token,
            serde_json::json!({ "title": "Precious" }),
        )
        .await;
    let task_id = task["id"].as_str().unwrap();

    // The member template carries no deleteTask right.
    let resp = app
        .auth_delete(
            &format!("/api/team/{}/task/{}", seeded.team_id, task_id),
            &seeded.member.access_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    let resp = app
        .auth_delete(
            &format!("/api/team/{}/task/{}", seeded.team_id, task_id),
            &seeded.owner.access_token,
        )
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
}

#[tokio::test]
async fn task_list_filters_by_status_and_assignee() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_team("filters").await;
    let token = &seeded.owner.access_token;

    app.create_task(
        &seeded.team_id,
        token,
        serde_json::json!({ "title": "Mine", "assigned_to": seeded.member.id }),
    )
    .await;
    let done = app
        .create_task(
            &seeded.team_id,
            token,
            serde_json::json!({ "title": "Done" }),
        )
        .await;
    app.complete_task(&seeded.team_id, done["id"].as_str().unwrap(), token)
        .await;

    let resp = app
        .auth_get(
            &format!("/api/team/{}/task?status=completed", seeded.team_id),
            token,
        )
        .send()
        .await
        .unwrap();
    let tasks: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["title"], "Done");

    let resp = app
        .auth_get(
            &format!(
                "/api/team/{}/task?assigned_to={}",
                seeded.team_id, seeded.member.id
            ),
            token,
        )
        .send()
        .await
        .unwrap();
    let tasks: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["title"], "Mine");
}

#[tokio::test]
async fn notification_descriptor_round_trips_through_the_api() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_team("notify").await;
    let token = &seeded.owner.access_token;

    let task = app
        .create_task(
            &seeded.team_id,
            token,
            serde_json::json!({
                "title": "Nagging",
                "notification_type": "interval",
                "notification_interval": "weekly",
            }),
        )
        .await;
    assert_eq!(task["notification"]["type"], "interval");
    assert_eq!(task["notification"]["interval"], "weekly");

    // Switching to a daily rule requires a parseable wall-clock time.
    let resp = app
        .auth_put(
            &format!(
                "/api/team/{}/task/{}",
                seeded.team_id,
                task["id"].as_str().unwrap()
            ),
            token,
        )
        .json(&serde_json::json!({
            "notification_type": "daily",
            "notification_daily_time": "25:99",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);

    let resp = app
        .auth_put(
            &format!(
                "/api/team/{}/task/{}",
                seeded.team_id,
                task["id"].as_str().unwrap()
            ),
            token,
        )
        .json(&serde_json::json!({
            "notification_type": "daily",
            "notification_daily_time": "09:30",
        }))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let task: Value = resp.json().await.unwrap();
    assert_eq!(task["notification"]["type"], "daily");
    assert_eq!(task["notification"]["time"], "09:30");
}
