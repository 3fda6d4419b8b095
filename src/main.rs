use devserve::config::Config;
use devserve::logger;
use devserve::server::{self, Server};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::load()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(&cfg))?;

    // In-flight connections are dropped, not drained
    runtime.shutdown_background();
    logger::log_server_stopped();
    Ok(())
}

async fn async_main(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let server = Server::bind(cfg).await?;
    server::start_signal_handler(server.shutdown_handle())?;

    logger::log_server_start(&server.url());
    server.run().await?;
    Ok(())
}
