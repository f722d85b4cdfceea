pub mod rest;

use std::net::SocketAddr;

use axum::{Router, extract::Extension, routing::get};
use tower_http::cors::{Any, CorsLayer};

use self::rest::{
    health::health_check,
    proxy::{Relay, proxy},
};

/// The relay's HTTP surface: a health probe and the pass-through proxy, with
/// permissive CORS so a browser client can use it from any origin.
pub struct Server {
    router: Router,
}

impl Server {
    pub fn new(relay: Relay) -> Self {
        let router = Router::new()
            .route("/health", get(health_check))
            .route("/proxy", get(proxy))
            .layer(Extension(relay))
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );

        Self { router }
    }

    pub async fn serve<A: Into<SocketAddr>>(self, addr: A) -> Result<(), anyhow::Error> {
        let addr = addr.into();
        info!("relay listening on {addr}");
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, self.router).await?;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn test_router_builds() {
        let relay = Relay::new().unwrap();

        let _server = Server::new(relay);
    }
}
