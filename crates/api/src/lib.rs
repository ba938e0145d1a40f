mod alarm;
mod error;
mod job;
mod job_schedulers;
mod shared;
mod status;
mod user;

use actix_cors::Cors;
use actix_web::{dev::Server, middleware, web, App, HttpServer};
use alarm_notifier_infra::AlarmContext;
use job_schedulers::{start_job_scheduler, stop_job_scheduler};
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

pub fn configure_server_api(cfg: &mut web::ServiceConfig) {
    alarm::configure_routes(cfg);
    job::configure_routes(cfg);
    status::configure_routes(cfg);
    user::configure_routes(cfg);
}

pub struct Application {
    server: Server,
    port: u16,
    context: AlarmContext,
}

impl Application {
    pub async fn new(context: AlarmContext) -> Result<Self, std::io::Error> {
        start_job_scheduler(&context)
            .await
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        let (server, port) = Application::configure_server(context.clone()).await?;

        Ok(Self {
            server,
            port,
            context,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    async fn configure_server(context: AlarmContext) -> Result<(Server, u16), std::io::Error> {
        let port = context.config.port;
        let address = format!("0.0.0.0:{}", port);
        let listener = TcpListener::bind(&address)?;
        let port = listener.local_addr()?.port();
        let context = web::Data::new(context);

        let server = HttpServer::new(move || {
            App::new()
                .wrap(Cors::permissive())
                .wrap(middleware::Compress::default())
                .wrap(TracingLogger::default())
                .app_data(context.clone())
                .service(web::scope("/api/v1").configure(configure_server_api))
        })
        .listen(listener)?
        .workers(4)
        .run();

        Ok((server, port))
    }

    /// Serves requests until the server shuts down, then stops the job
    /// scheduler.
    pub async fn start(self) -> Result<(), std::io::Error> {
        let res = self.server.await;
        stop_job_scheduler(&self.context).await;
        res
    }
}
