use crate::fixtures::test_app::TestApp;
use serde_json::Value;

async fn member_points(app: &TestApp, token: &str) -> (i64, String) {
    let resp = app.auth_get("/api/auth/me", token).send().await.unwrap();
    let me: Value = resp.json().await.unwrap();
    (
        me["points"].as_i64().unwrap(),
        me["level"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn completing_a_task_awards_ten_points_to_the_assignee() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_team("award").await;

    let task = app
        .create_task(
            &seeded.team_id,
            &seeded.owner.access_token,
            serde_json::json!({ "title": "Paid work", "assigned_to": seeded.member.id }),
        )
        .await;

    // The owner drives the transition; the assignee collects the award.
    app.complete_task(
        &seeded.team_id,
        task["id"].as_str().unwrap(),
        &seeded.owner.access_token,
    )
    .await;

    let (points, level) = member_points(&app, &seeded.member.access_token).await;
    assert_eq!(points, 10);
    assert_eq!(level, "Novice");

    let (owner_points, _) = member_points(&app, &seeded.owner.access_token).await;
    assert_eq!(owner_points, 0);
}

#[tokio::test]
async fn priority_tasks_award_double() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_team("priority").await;

    let task = app
        .create_task(
            &seeded.team_id,
            &seeded.owner.access_token,
            serde_json::json!({
                "title": "Urgent",
                "priority": true,
                "assigned_to": seeded.member.id,
            }),
        )
        .await;
    app.complete_task(
        &seeded.team_id,
        task["id"].as_str().unwrap(),
        &seeded.owner.access_token,
    )
    .await;

    let (points, _) = member_points(&app, &seeded.member.access_token).await;
    assert_eq!(points, 20);
}

#[tokio::test]
async fn duplicate_completion_attempts_award_nothing() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_team("dupes").await;
    let token = &seeded.owner.access_token;

    let task = app
        .create_task(
            &seeded.team_id,
            token,
            serde_json::json!({ "title": "Once only", "assigned_to": seeded.member.id }),
        )
        .await;
    let task_id = task["id"].as_str().unwrap();

    app.complete_task(&seeded.team_id, task_id, token).await;

    // Re-delivering the same completion is not an edge of the machine and
    // must not award again.
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

    let (points, _) = member_points(&app, &seeded.member.access_token).await;
    assert_eq!(points, 10);
}

#[tokio::test]
async fn closing_an_open_task_awards_nothing() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_team("noaward").await;
    let token = &seeded.owner.access_token;

    let task = app
        .create_task(
            &seeded.team_id,
            token,
            serde_json::json!({ "title": "Abandoned", "assigned_to": seeded.member.id }),
        )
        .await;
    let task_id = task["id"].as_str().unwrap();
    let status_url = format!("/api/team/{}/task/{}/status", seeded.team_id, task_id);

    for target in ["open", "closed"] {
        let resp = app
            .auth_post(&status_url, token)
            .json(&serde_json::json!({ "status": target }))
            .send()
            .await
            .unwrap();
        assert!(resp.status().is_success());
    }

    let (points, _) = member_points(&app, &seeded.member.access_token).await;
    assert_eq!(points, 0);
}

#[tokio::test]
async fn whole_team_tasks_award_the_acting_user() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_team("teamwide").await;

    let task = app
        .create_task(
            &seeded.team_id,
            &seeded.owner.access_token,
            serde_json::json!({ "title": "For everyone" }),
        )
        .await;
    let task_id = task["id"].as_str().unwrap();

    // The member completes the unassigned task and collects the award.
    app.complete_task(&seeded.team_id, task_id, &seeded.member.access_token)
        .await;

    let (points, _) = member_points(&app, &seeded.member.access_token).await;
    assert_eq!(points, 10);
}

#[tokio::test]
async fn accumulated_points_cross_level_thresholds() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_team("levels").await;
    let token = &seeded.owner.access_token;

    // Two priority completions: 40 points, still Novice.
    for i in 0..2 {
        let task = app
            .create_task(
                &seeded.team_id,
                token,
                serde_json::json!({
                    "title": format!("Grind {i}"),
                    "priority": true,
                    "assigned_to": seeded.member.id,
                }),
            )
            .await;
        app.complete_task(&seeded.team_id, task["id"].as_str().unwrap(), token)
            .await;
    }
    let (points, level) = member_points(&app, &seeded.member.access_token).await;
    assert_eq!(points, 40);
    assert_eq!(level, "Novice");

    // One more ordinary completion reaches the 50-point boundary.
    let task = app
        .create_task(
            &seeded.team_id,
            token,
            serde_json::json!({ "title": "Boundary", "assigned_to": seeded.member.id }),
        )
        .await;
    app.complete_task(&seeded.team_id, task["id"].as_str().unwrap(), token)
        .await;

    let (points, level) = member_points(&app, &seeded.member.access_token).await;
    assert_eq!(points, 50);
    assert_eq!(level, "Intermediate");

    // Three more priority completions cross 100.
    for i in 0..3 {
        let task = app
            .create_task(
                &seeded.team_id,
                token,
                serde_json::json!({
                    "title": format!("Push {i}"),
                    "priority": true,
                    "assigned_to": seeded.member.id,
                }),
            )
            .await;
        app.complete_task(&seeded.team_id, task["id"].as_str().unwrap(), token)
            .await;
    }

    let (points, level) = member_points(&app, &seeded.member.access_token).await;
    assert_eq!(points, 110);
    assert_eq!(level, "Expert");
}

#[tokio::test]
async fn reopening_and_recompleting_awards_again() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_team("recomplete").await;
    let token = &seeded.owner.access_token;

    let task = app
        .create_task(
            &seeded.team_id,
            token,
            serde_json::json!({ "title": "Recurring", "assigned_to": seeded.member.id }),
        )
        .await;
    let task_id = task["id"].as_str().unwrap();
    let status_url = format!("/api/team/{}/task/{}/status", seeded.team_id, task_id);

    app.complete_task(&seeded.team_id, task_id, token).await;

    // A genuine second pass through the cycle is a new completion event.
    for target in ["closed", "open", "completed"] {
        let resp = app
            .auth_post(&status_url, token)
            .json(&serde_json::json!({ "status": target }))
            .send()
            .await
            .unwrap();
        assert!(resp.status().is_success());
    }

    let (points, _) = member_points(&app, &seeded.member.access_token).await;
    assert_eq!(points, 20);
}
