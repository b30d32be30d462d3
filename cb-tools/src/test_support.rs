use crate::client::BridgeClient;
use async_trait::async_trait;
use cb_transport::{
    BridgeConfig, BridgeSettings, BridgeSources, EnvSnapshot, OperationRequest, Transport,
    TransportError, TransportResult,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Records every request and answers from a queue of canned responses
/// (200 `{}` once the queue is empty).
#[derive(Default)]
pub(crate) struct RecordingTransport {
    requests: Mutex<Vec<(BridgeConfig, OperationRequest)>>,
    responses: Mutex<VecDeque<TransportResult>>,
}

impl RecordingTransport {
    pub(crate) fn respond(self, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .expect("responses lock")
            .push_back(TransportResult {
                ok: (200..300).contains(&status),
                status,
                body: body.to_string(),
            });
        self
    }

    pub(crate) fn requests(&self) -> Vec<OperationRequest> {
        self.requests
            .lock()
            .expect("requests lock")
            .iter()
            .map(|(_, request)| request.clone())
            .collect()
    }

    pub(crate) fn configs(&self) -> Vec<BridgeConfig> {
        self.requests
            .lock()
            .expect("requests lock")
            .iter()
            .map(|(config, _)| config.clone())
            .collect()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(
        &self,
        config: &BridgeConfig,
        request: &OperationRequest,
    ) -> Result<TransportResult, TransportError> {
        self.requests
            .lock()
            .expect("requests lock")
            .push((config.clone(), request.clone()));
        let next = self.responses.lock().expect("responses lock").pop_front();
        Ok(next.unwrap_or(TransportResult {
            ok: true,
            status: 200,
            body: "{}".to_string(),
        }))
    }
}

pub(crate) fn configured_client(
    sources: BridgeSources,
    transport: Arc<RecordingTransport>,
) -> BridgeClient {
    BridgeClient::new(
        BridgeSettings {
            base_url: Some("http://bridge.test".to_string()),
            api_key: Some("test-key".to_string()),
        },
        sources,
        Arc::new(EnvSnapshot::new()),
        transport,
    )
}

pub(crate) fn unconfigured_client(
    sources: BridgeSources,
    transport: Arc<RecordingTransport>,
) -> BridgeClient {
    BridgeClient::new(
        BridgeSettings::default(),
        sources,
        Arc::new(EnvSnapshot::new()),
        transport,
    )
}
