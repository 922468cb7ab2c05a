use course_service::svc::course_service_server::CourseServiceServer;
use course_service::{Context, CourseServiceImpl};
use course_service_core::telemetry::logging::{init_subscriber, make_subscriber};
use tonic::transport::Server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_subscriber(make_subscriber(env!("CARGO_PKG_NAME"), "info"))?;

    let ctx = Context::from_env().await?;
    let addr = ctx.listen_addr;
    let server = CourseServiceServer::new(CourseServiceImpl::new(ctx));

    tracing::info!(%addr, "Course service listening.");
    Server::builder()
        .add_service(server)
        .serve_with_shutdown(addr, async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("Shutting down."),
                Err(e) => {
                    tracing::error!(error = ?e, "Listening for the shutdown signal failed.");
                    std::future::pending::<()>().await;
                }
            }
        })
        .await?;

    Ok(())
}
