mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

fn ids(reports: &[Value]) -> Vec<i64> {
    reports.iter().map(|r| r["id"].as_i64().unwrap()).collect()
}

#[tokio::test]
async fn rating_filters() -> Result<()> {
    let app = common::spawn_app().await?;
    let token = app.token_for("filters@x.com").await?;
    let report = app.seed_report(&token, 5, 40).await?;

    let found = app.list(&token, "rating_min=5").await?;
    assert_eq!(ids(&found), vec![report["id"].as_i64().unwrap()]);

    let found = app.list(&token, "rating_max=1").await?;
    assert!(found.is_empty());

    Ok(())
}

#[tokio::test]
async fn combined_filters_hold_for_every_result() -> Result<()> {
    let app = common::spawn_app().await?;
    let token = app.token_for("combo@x.com").await?;
    for (rating, severity) in [(1, 5), (2, 30), (3, 60), (4, 45), (5, 95), (3, 20)] {
        app.seed_report(&token, rating, severity).await?;
    }

    let found = app
        .list(&token, "rating_min=2&rating_max=4&severity_min=25&severity_max=70&limit=100")
        .await?;
    assert_eq!(found.len(), 3);
    for report in &found {
        let rating = report["behavior_rating"].as_i64().unwrap();
        let severity = report["severity_index"].as_i64().unwrap();
        assert!((2..=4).contains(&rating) && (25..=70).contains(&severity));
    }

    let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
    let found = app.list(&token, &format!("date_from={}&date_to={}&limit=100", today, today)).await?;
    assert_eq!(found.len(), 6);
    let found = app.list(&token, "date_to=2000-01-01").await?;
    assert!(found.is_empty());

    Ok(())
}

#[tokio::test]
async fn date_bounds_include_the_exact_stored_instant() -> Result<()> {
    let app = common::spawn_app().await?;
    let token = app.token_for("instant@x.com").await?;
    let report = app.seed_report(&token, 2, 20).await?;
    let created_at = report["created_at"].as_str().unwrap().to_string();

    let res = app
        .client
        .get(app.url("/reports/"))
        .bearer_auth(&token)
        .query(&[("date_from", created_at.as_str()), ("date_to", created_at.as_str())])
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    let found = body["data"].as_array().cloned().unwrap_or_default();
    assert_eq!(ids(&found), vec![report["id"].as_i64().unwrap()]);

    Ok(())
}

#[tokio::test]
async fn sorting_and_pagination() -> Result<()> {
    let app = common::spawn_app().await?;
    let token = app.token_for("sort@x.com").await?;
    for severity in [50, 10, 90, 30, 70] {
        app.seed_report(&token, 3, severity).await?;
    }

    let found = app.list(&token, "sort_by=severity_index&sort_order=asc").await?;
    let severities: Vec<i64> = found.iter().map(|r| r["severity_index"].as_i64().unwrap()).collect();
    assert_eq!(severities, vec![10, 30, 50, 70, 90]);

    // Default is newest first
    let newest_first = app.list(&token, "").await?;
    let mut expected = ids(&newest_first);
    expected.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(ids(&newest_first), expected);

    let page = app.list(&token, "limit=2&skip=1").await?;
    assert_eq!(page.len(), 2);
    assert_eq!(ids(&page), ids(&newest_first)[1..3].to_vec());

    let past_end = app.list(&token, "skip=10").await?;
    assert!(past_end.is_empty());

    Ok(())
}

#[tokio::test]
async fn invalid_query_parameters_are_rejected() -> Result<()> {
    let app = common::spawn_app().await?;
    let token = app.token_for("invalid@x.com").await?;

    for query in [
        "sort_by=description",
        "sort_order=sideways",
        "limit=0",
        "limit=101",
        "skip=-1",
        "rating_min=0",
        "severity_max=101",
        "date_from=not-a-date",
        "limit=ten",
    ] {
        let res = app.get(&token, &format!("/reports/?{}", query)).await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "query {}", query);
    }

    Ok(())
}

#[tokio::test]
async fn reports_are_private_to_their_owner() -> Result<()> {
    let app = common::spawn_app().await?;
    let owner = app.token_for("owner@x.com").await?;
    let other = app.token_for("other@x.com").await?;
    let report = app.seed_report(&owner, 4, 44).await?;
    let path = format!("/reports/{}", report["id"]);

    let res = app.get(&other, &path).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let hidden: Value = res.json().await?;

    let missing: Value = app.get(&other, "/reports/999999").await?.json().await?;
    assert_eq!(hidden, missing, "someone else's report looks exactly like a missing one");

    assert_eq!(app.delete(&other, &path).await?.status(), StatusCode::NOT_FOUND);
    assert!(app.list(&other, "").await?.is_empty());

    // Still there for the owner
    assert_eq!(app.get(&owner, &path).await?.status(), StatusCode::OK);
    Ok(())
}
