use alarm_notifier_api::Application;
use alarm_notifier_infra::{
    AlarmContext, Config, InMemoryNotificationSender, Notifiers, Repos, ShiftedTimeSys,
};
use alarm_notifier_sdk::AlarmNotifierSDK;
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub struct TestApp {
    pub ctx: AlarmContext,
    pub sys: Arc<ShiftedTimeSys>,
    pub sms: Arc<InMemoryNotificationSender>,
    pub email: Arc<InMemoryNotificationSender>,
}

// Launch the application as a background task
pub async fn spawn_app() -> (TestApp, AlarmNotifierSDK) {
    spawn_app_at(Utc::now()).await
}

/// Like `spawn_app` but with the clock of the application starting at `now`
pub async fn spawn_app_at(now: DateTime<Utc>) -> (TestApp, AlarmNotifierSDK) {
    let mut config = Config::new();
    config.port = 0; // Random port
    config.notification_timeout_millis = 1000;

    let sys = Arc::new(ShiftedTimeSys::starting_at(now));
    let sms = Arc::new(InMemoryNotificationSender::new());
    let email = Arc::new(InMemoryNotificationSender::new());
    let ctx = AlarmContext::new(
        Repos::create_inmemory(),
        config,
        sys.clone(),
        Notifiers {
            sms: sms.clone(),
            email: email.clone(),
        },
    );

    let application = Application::new(ctx.clone())
        .await
        .expect("Failed to build application.");

    let address = format!("http://localhost:{}/api/v1", application.port());
    let _ = actix_web::rt::spawn(async move {
        application
            .start()
            .await
            .expect("Expected application to start");
    });

    let app = TestApp {
        ctx,
        sys,
        sms,
        email,
    };
    let sdk = AlarmNotifierSDK::new(address);
    (app, sdk)
}
