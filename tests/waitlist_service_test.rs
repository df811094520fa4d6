use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use sqlx::SqlitePool;

use teesheet::{
    domain::{CreateWaitlistRequest, UpdateWaitlistRequest, WaitlistStatus},
    error::AppError,
    repository::SqliteWaitlistRepository,
    service::waitlist_service::WaitlistService,
};

async fn setup() -> anyhow::Result<WaitlistService> {
    let pool = SqlitePool::connect(":memory:").await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let repo = Arc::new(SqliteWaitlistRepository::new(pool));
    Ok(WaitlistService::new(repo))
}

fn request(email: &str, date: NaiveDate, club: &str, priority: i64) -> CreateWaitlistRequest {
    CreateWaitlistRequest {
        guest_email: email.to_string(),
        guest_name: "Test Guest".to_string(),
        requested_date: date,
        preferred_time: "Flexible".to_string(),
        time_flexibility: "Flexible".to_string(),
        players: 2,
        golf_course: "The Island Golf Club".to_string(),
        club: club.to_string(),
        priority,
        notes: None,
        source: "email_bot".to_string(),
        opt_in_confirmed: true,
        original_booking_request: None,
    }
}

fn date(s: &str) -> NaiveDate {
    s.parse().expect("valid date")
}

#[tokio::test]
async fn test_add_and_check() -> anyhow::Result<()> {
    let service = setup().await?;
    let day = date("2025-09-20");

    let entry = service
        .add(request("guest@example.com", day, "island", 5))
        .await?;
    assert!(entry.waitlist_id.starts_with("WL-"));
    assert_eq!(entry.status, WaitlistStatus::Waiting);

    let found = service.check("guest@example.com", "island", Some(day)).await?;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].waitlist_id, entry.waitlist_id);

    // date can be omitted; all active entries at the club come back
    let found = service.check("guest@example.com", "island", None).await?;
    assert_eq!(found.len(), 1);

    // a different club sees nothing
    let found = service.check("guest@example.com", "links", Some(day)).await?;
    assert!(found.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_duplicate_active_entry_rejected() -> anyhow::Result<()> {
    let service = setup().await?;
    let day = date("2025-09-20");

    let first = service
        .add(request("guest@example.com", day, "island", 5))
        .await?;

    let result = service
        .add(request("guest@example.com", day, "island", 8))
        .await;

    match result {
        Err(AppError::DuplicateActiveEntry { waitlist_id, status }) => {
            assert_eq!(waitlist_id, first.waitlist_id);
            assert_eq!(status, WaitlistStatus::Waiting);
        }
        other => panic!("expected DuplicateActiveEntry, got {:?}", other),
    }

    // same guest, different date is fine
    service
        .add(request("guest@example.com", date("2025-09-21"), "island", 5))
        .await?;

    Ok(())
}

#[tokio::test]
async fn test_duplicate_check_covers_notified() -> anyhow::Result<()> {
    let service = setup().await?;
    let day = date("2025-09-20");

    let first = service
        .add(request("guest@example.com", day, "island", 5))
        .await?;
    service
        .update(
            &first.waitlist_id,
            UpdateWaitlistRequest {
                status: Some(WaitlistStatus::Notified),
                ..Default::default()
            },
        )
        .await?;

    let result = service
        .add(request("guest@example.com", day, "island", 5))
        .await;
    assert!(matches!(
        result,
        Err(AppError::DuplicateActiveEntry {
            status: WaitlistStatus::Notified,
            ..
        })
    ));

    // once converted, the entry no longer blocks a new add
    service
        .update(
            &first.waitlist_id,
            UpdateWaitlistRequest {
                status: Some(WaitlistStatus::Converted),
                ..Default::default()
            },
        )
        .await?;

    service
        .add(request("guest@example.com", day, "island", 5))
        .await?;

    Ok(())
}

#[tokio::test]
async fn test_add_requires_opt_in() -> anyhow::Result<()> {
    let service = setup().await?;

    let mut req = request("guest@example.com", date("2025-09-20"), "island", 5);
    req.opt_in_confirmed = false;

    assert!(matches!(
        service.add(req).await,
        Err(AppError::Validation(_))
    ));

    Ok(())
}

#[tokio::test]
async fn test_update_lifecycle_is_forward_only() -> anyhow::Result<()> {
    let service = setup().await?;
    let day = date("2025-09-20");

    let entry = service
        .add(request("guest@example.com", day, "island", 5))
        .await?;

    let updated = service
        .update(
            &entry.waitlist_id,
            UpdateWaitlistRequest {
                status: Some(WaitlistStatus::Notified),
                notification_sent: Some(true),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(updated.status, WaitlistStatus::Notified);
    assert!(updated.notification_sent);
    assert!(updated.notification_sent_at.is_some());

    let updated = service
        .update(
            &entry.waitlist_id,
            UpdateWaitlistRequest {
                status: Some(WaitlistStatus::Converted),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(updated.status, WaitlistStatus::Converted);

    // backward move is rejected
    let result = service
        .update(
            &entry.waitlist_id,
            UpdateWaitlistRequest {
                status: Some(WaitlistStatus::Waiting),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::InvalidTransition(_))));

    // unknown id is NotFound
    let result = service
        .update(
            "WL-00000000000000-0000",
            UpdateWaitlistRequest {
                notes: Some("hello".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    Ok(())
}

#[tokio::test]
async fn test_remove_is_strict() -> anyhow::Result<()> {
    let service = setup().await?;
    let day = date("2025-09-20");

    let entry = service
        .add(request("guest@example.com", day, "island", 5))
        .await?;

    service.remove(&entry.waitlist_id).await?;

    // removing again reports NotFound rather than a silent no-op
    assert!(matches!(
        service.remove(&entry.waitlist_id).await,
        Err(AppError::NotFound(_))
    ));

    Ok(())
}

#[tokio::test]
async fn test_matches_ordering() -> anyhow::Result<()> {
    let service = setup().await?;
    let day = date("2025-09-20");

    // priorities [3, 8, 8] created in order A, B, C: expect [B, C, A]
    let a = service.add(request("a@example.com", day, "island", 3)).await?;
    tokio::time::sleep(Duration::from_millis(10)).await;
    let b = service.add(request("b@example.com", day, "island", 8)).await?;
    tokio::time::sleep(Duration::from_millis(10)).await;
    let c = service.add(request("c@example.com", day, "island", 8)).await?;

    let matches = service.matches(day, "island").await?;
    let ids: Vec<&str> = matches.iter().map(|m| m.waitlist_id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            b.waitlist_id.as_str(),
            c.waitlist_id.as_str(),
            a.waitlist_id.as_str()
        ]
    );

    // only Waiting entries match
    service
        .update(
            &b.waitlist_id,
            UpdateWaitlistRequest {
                status: Some(WaitlistStatus::Notified),
                ..Default::default()
            },
        )
        .await?;

    let matches = service.matches(day, "island").await?;
    let ids: Vec<&str> = matches.iter().map(|m| m.waitlist_id.as_str()).collect();
    assert_eq!(ids, vec![c.waitlist_id.as_str(), a.waitlist_id.as_str()]);

    Ok(())
}
