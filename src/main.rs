//! DevFolio backend binary entry point.
//! Delegates to the library for all app logic.

#[tokio::main]
async fn main() {
    if let Err(e) = devfolio_backend::run().await {
        tracing::error!("fatal: {}", e);
        eprintln!("devfolio-backend: {}", e);
        std::process::exit(1);
    }
}
