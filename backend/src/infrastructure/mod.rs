// Infrastructure layer - external concerns (provider REST, language model, HTTP)
// Implements interfaces defined in application layer

use anyhow::Result;
use std::sync::Arc;

use crate::application::ask::AskHandler;
use crate::application::gateway::ProxyGateway;

pub mod config;
pub mod driven;    // Output adapters (provider and completion clients)
pub mod driving;   // Input adapters (HTTP)

pub use config::GatewayConfig;

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<ProxyGateway>,
    pub ask: Arc<AskHandler>,
}

impl AppState {
    /// Wire the outbound clients from configuration; keys stay inside the clients
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        let timeout = config.http.timeout();
        let control_plane = Arc::new(driven::HeygenClient::new(&config.heygen, timeout)?);
        let completion = Arc::new(driven::OpenAiCompletion::new(&config.llm, timeout)?);

        Ok(Self {
            gateway: Arc::new(ProxyGateway::new(control_plane)),
            ask: Arc::new(AskHandler::new(completion)),
        })
    }
}
