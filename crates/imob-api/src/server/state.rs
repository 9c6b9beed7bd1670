#[derive(Clone)]
struct AppState {
    inner: std::sync::Arc<Mutex<ServerInner>>,
}

impl AppState {
    fn new(api: ConsoleApi) -> Self {
        Self {
            inner: std::sync::Arc::new(Mutex::new(ServerInner {
                api,
                envelopes: BTreeMap::new(),
                envelope_seq: 0,
            })),
        }
    }
}

#[derive(Debug)]
struct ServerInner {
    api: ConsoleApi,
    /// In-memory e-signature envelopes, never persisted.
    envelopes: BTreeMap<String, SignatureEnvelope>,
    envelope_seq: u64,
}

impl ServerInner {
    fn next_envelope_id(&mut self) -> String {
        let id = format!("env_{:03}", self.envelope_seq);
        self.envelope_seq += 1;
        id
    }

    fn require_envelope(&self, id: &str) -> Result<&SignatureEnvelope, HttpApiError> {
        self.envelopes.get(id).ok_or_else(|| {
            HttpApiError::not_found("envelope not found", Some(format!("envelope_id={id}")))
        })
    }
}
