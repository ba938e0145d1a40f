mod helpers;

use alarm_notifier_domain::NotificationPayload;
use alarm_notifier_sdk::{
    APIError, AlarmNotifierSDK, CreateAlarmInput, CreateUserInput, UpdateUserInput, User,
};
use chrono::{Duration, TimeZone, Utc};
use helpers::setup::{spawn_app, spawn_app_at};
use std::time::Duration as StdDuration;

async fn create_user(sdk: &AlarmNotifierSDK, username: &str) -> User {
    sdk.user
        .create(CreateUserInput {
            username: username.into(),
            email: Some(format!("{}@example.com", username)),
            phone_number: Some("+15550100".into()),
            timezone: Some("America/New_York".into()),
        })
        .await
        .expect("Expected to create user")
        .user
}

fn alarm_input(user: &User, send_sms: bool, send_email: bool) -> CreateAlarmInput {
    CreateAlarmInput {
        user_id: user.id,
        message: "Take your vitamins".into(),
        time: "07:30".into(),
        days_of_week: vec![0, 2],
        is_active: None,
        send_sms: Some(send_sms),
        send_email: Some(send_email),
        timezone: None,
    }
}

#[actix_web::test]
async fn test_status_ok() {
    let (_, sdk) = spawn_app().await;
    assert!(sdk.status.check_health().await.is_ok());
}

#[actix_web::test]
async fn test_crud_user() {
    let (_, sdk) = spawn_app().await;
    let user = create_user(&sdk, "alice").await;
    assert_eq!(user.timezone, "America/New_York");

    let res = sdk
        .user
        .create(CreateUserInput {
            username: "alice".into(),
            email: Some("other@example.com".into()),
            phone_number: None,
            timezone: None,
        })
        .await;
    assert!(matches!(res, Err(APIError::Conflict)));

    let fetched = sdk.user.get(user.id).await.expect("Expected to get user");
    assert_eq!(fetched.user.username, "alice");

    let updated = sdk
        .user
        .update(UpdateUserInput {
            user_id: user.id,
            email: None,
            phone_number: Some("+15550199".into()),
        })
        .await
        .expect("Expected to update user");
    assert_eq!(updated.user.phone_number, Some("+15550199".into()));

    assert!(sdk.user.delete(user.id).await.is_ok());
    assert!(matches!(sdk.user.get(user.id).await, Err(APIError::NotFound)));
}

#[actix_web::test]
async fn test_create_user_without_contact_info_is_rejected() {
    let (_, sdk) = spawn_app().await;
    let res = sdk
        .user
        .create(CreateUserInput {
            username: "bob".into(),
            email: None,
            phone_number: None,
            timezone: None,
        })
        .await;
    assert!(matches!(res, Err(APIError::BadClientData)));
}

#[actix_web::test]
async fn test_alarm_lifecycle() {
    let (app, sdk) = spawn_app().await;
    let user = create_user(&sdk, "carol").await;

    let alarm = sdk
        .alarm
        .create(alarm_input(&user, true, true))
        .await
        .expect("Expected to create alarm")
        .alarm;
    assert!(alarm.is_active);
    assert_eq!(alarm.timezone, "America/New_York");
    assert_eq!(alarm.days_of_week, vec![0, 2]);
    let sms_job_id = alarm.sms_job_id.clone().expect("Expected sms job");
    let email_job_id = alarm.email_job_id.clone().expect("Expected email job");
    assert_eq!(app.ctx.registry.len().await, 2);

    let job = sdk.job.get(&sms_job_id).await.expect("Expected job status");
    assert!(job.scheduled);
    assert!(job.next_fire_at.is_some());

    let deactivated = sdk
        .alarm
        .set_active(alarm.id, false)
        .await
        .expect("Expected to deactivate alarm")
        .alarm;
    assert!(!deactivated.is_active);
    assert_eq!(deactivated.sms_job_id, None);
    assert!(!sdk.job.get(&sms_job_id).await.unwrap().scheduled);
    assert!(!sdk.job.get(&email_job_id).await.unwrap().scheduled);

    let reactivated = sdk
        .alarm
        .set_active(alarm.id, true)
        .await
        .expect("Expected to reactivate alarm")
        .alarm;
    assert_eq!(reactivated.sms_job_id, Some(sms_job_id.clone()));
    assert_eq!(reactivated.email_job_id, Some(email_job_id));

    let alarms = sdk.alarm.get_by_user(user.id).await.unwrap().alarms;
    assert_eq!(alarms.len(), 1);

    assert!(sdk.alarm.delete(alarm.id).await.is_ok());
    assert!(matches!(
        sdk.alarm.get(alarm.id).await,
        Err(APIError::NotFound)
    ));
    assert!(!sdk.job.get(&sms_job_id).await.unwrap().scheduled);
    assert_eq!(app.ctx.registry.len().await, 0);
}

#[actix_web::test]
async fn test_create_alarm_with_invalid_input_is_rejected() {
    let (app, sdk) = spawn_app().await;
    let user = create_user(&sdk, "dave").await;

    let mut input = alarm_input(&user, true, false);
    input.days_of_week = vec![7];
    assert!(matches!(
        sdk.alarm.create(input).await,
        Err(APIError::BadClientData)
    ));

    let mut input = alarm_input(&user, true, false);
    input.time = "25:00".into();
    assert!(matches!(
        sdk.alarm.create(input).await,
        Err(APIError::BadClientData)
    ));

    let mut input = alarm_input(&user, true, false);
    input.timezone = Some("Mars/Olympus_Mons".into());
    assert!(matches!(
        sdk.alarm.create(input).await,
        Err(APIError::BadClientData)
    ));

    let mut input = alarm_input(&user, true, false);
    input.user_id = Default::default();
    assert!(matches!(
        sdk.alarm.create(input).await,
        Err(APIError::NotFound)
    ));

    assert_eq!(app.ctx.registry.len().await, 0);
}

#[actix_web::test]
async fn test_unknown_job_is_reported_as_not_scheduled() {
    let (_, sdk) = spawn_app().await;
    let job = sdk.job.get("sms_unknown").await.unwrap();
    assert!(!job.scheduled);
    assert_eq!(job.next_fire_at, None);
}

#[actix_web::test]
async fn test_alarm_fires_at_its_local_time() {
    // Tuesday 2024-03-05 09:00 in New York
    let (app, sdk) = spawn_app_at(Utc.with_ymd_and_hms(2024, 3, 5, 14, 0, 0).unwrap()).await;
    let user = create_user(&sdk, "erin").await;
    let alarm = sdk
        .alarm
        .create(alarm_input(&user, true, false))
        .await
        .expect("Expected to create alarm")
        .alarm;

    // Wednesday 07:30 in New York
    let first_fire = Utc.with_ymd_and_hms(2024, 3, 6, 12, 30, 0).unwrap();
    let sms_job_id = alarm.sms_job_id.expect("Expected sms job");
    let job = sdk.job.get(&sms_job_id).await.unwrap();
    assert_eq!(job.next_fire_at, Some(first_fire));

    app.sys.set(first_fire - Duration::milliseconds(200));
    app.ctx.runtime.wake();

    let mut sent = Vec::new();
    for _ in 0..100 {
        sent = app.sms.sent();
        if !sent.is_empty() {
            break;
        }
        tokio::time::sleep(StdDuration::from_millis(20)).await;
    }
    assert_eq!(
        sent,
        vec![NotificationPayload::Sms {
            alarm_id: alarm.id,
            phone_number: "+15550100".into(),
            message: "Take your vitamins".into(),
        }]
    );
    assert!(app.email.sent().is_empty());

    // Monday 07:30 in New York, now on daylight saving time
    let job = sdk.job.get(&sms_job_id).await.unwrap();
    assert_eq!(
        job.next_fire_at,
        Some(Utc.with_ymd_and_hms(2024, 3, 11, 11, 30, 0).unwrap())
    );
}
