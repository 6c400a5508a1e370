use std::sync::Arc;

use hashline::config::Config;
use hashline::logging::{Logger, TracingLogger};
use hashline::server::Server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut config = Config::load();
    if let Some(arg) = std::env::args().nth(1) {
        match arg.parse() {
            Ok(port) => config.port = port,
            Err(_) => {
                eprintln!("invalid port.\nusage: hashline [port = 23]");
                std::process::exit(2);
            }
        }
    }

    let logger: Arc<dyn Logger> = TracingLogger::shared();
    let server = Arc::new(Server::bind(config, logger.clone()).await?);

    let mut runner = tokio::spawn({
        let server = Arc::clone(&server);
        async move { server.run().await }
    });

    tokio::select! {
        res = tokio::signal::ctrl_c() => {
            res?;
            logger.message("shutdown signal received");
            server.stop().await;
            runner.await??;
        }
        res = &mut runner => {
            res??;
        }
    }

    logger.message("server stopped");

    Ok(())
}
