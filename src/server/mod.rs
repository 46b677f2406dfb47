pub mod api;
pub mod error;

use crate::cli::ServeArgs;
use api::{ router, AppState };
use std::error::Error;
use std::net::SocketAddr;
use std::time::Duration;
use log::{ info, error };

pub use api::CHAT_ROUTE;

#[derive(Debug, PartialEq, Eq)]
enum Transport {
    Plain,
    Tls { cert_path: String, key_path: String },
}

pub struct Server {
    addr: String,
    state: AppState,
    args: ServeArgs,
}

impl Server {
    pub fn new(addr: String, state: AppState, args: ServeArgs) -> Self {
        Self { addr, state, args }
    }

    /// Serves until ctrl-c, then drains in-flight requests.
    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let addr = self.addr.parse::<SocketAddr>()
            .map_err(|e| format!("Invalid server address '{}': {}", self.addr, e))?;
        let app = router(self.state.clone());

        match transport(&self.args)? {
            Transport::Tls { cert_path, key_path } => {
                let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
                    cert_path,
                    key_path
                ).await?;

                let handle = axum_server::Handle::new();
                let shutdown_handle = handle.clone();
                tokio::spawn(async move {
                    shutdown_signal().await;
                    shutdown_handle.graceful_shutdown(Some(Duration::from_secs(10)));
                });

                info!("HTTPS server listening on: https://{}", addr);
                axum_server::bind_rustls(addr, tls_config)
                    .handle(handle)
                    .serve(app.into_make_service())
                    .await?;
            }
            Transport::Plain => {
                let listener = tokio::net::TcpListener::bind(addr).await
                    .map_err(|e| format!("Failed to bind HTTP server to {}: {}. Try a different port.", addr, e))?;
                info!("HTTP server listening on: http://{}", addr);
                axum::serve(listener, app.into_make_service())
                    .with_graceful_shutdown(shutdown_signal())
                    .await?;
            }
        }

        info!("Server stopped");
        Ok(())
    }
}

/// Picks plain HTTP or HTTPS. TLS needs both PEM paths; one alone, or none
/// with `--enable-tls`, refuses to start.
fn transport(args: &ServeArgs) -> Result<Transport, Box<dyn Error + Send + Sync>> {
    if !args.enable_tls {
        info!("TLS not enabled. Running plain HTTP server.");
        return Ok(Transport::Plain);
    }
    match (&args.tls_cert_path, &args.tls_key_path) {
        (Some(cert_path), Some(key_path)) => {
            info!(
                "TLS enabled. Loading certificate from '{}' and key from '{}'",
                cert_path,
                key_path
            );
            Ok(Transport::Tls { cert_path: cert_path.clone(), key_path: key_path.clone() })
        }
        (Some(_), None) | (None, Some(_)) => {
            error!("Both --tls-cert-path and --tls-key-path must be provided to enable TLS.");
            Err("Missing TLS certificate or key path".into())
        }
        (None, None) => {
            error!("--enable-tls was set but no certificate/key paths provided.");
            Err("TLS enabled without cert/key".into())
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
