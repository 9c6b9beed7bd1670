#[derive(Debug, Deserialize)]
struct CreateEnvelopeRequest {
    lease_id: String,
}

#[derive(Debug, Serialize)]
struct EnvelopeResponse {
    schema_version: String,
    envelope_id: String,
    lease_id: String,
    status: EnvelopeStatus,
}

impl EnvelopeResponse {
    fn from_envelope(envelope: &SignatureEnvelope) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            envelope_id: envelope.envelope_id.clone(),
            lease_id: envelope.lease_id.clone(),
            status: envelope.status,
        }
    }
}

async fn create_envelope(
    State(state): State<AppState>,
    Json(request): Json<CreateEnvelopeRequest>,
) -> Result<Json<EnvelopeResponse>, HttpApiError> {
    let mut inner = state.inner.lock().await;
    if inner.api.store().entities().lease(&request.lease_id).is_none() {
        return Err(HttpApiError::not_found(
            "lease not found",
            Some(format!("lease_id={}", request.lease_id)),
        ));
    }

    let envelope_id = inner.next_envelope_id();
    let envelope = SignatureEnvelope {
        envelope_id: envelope_id.clone(),
        lease_id: request.lease_id,
        status: EnvelopeStatus::Created,
    };
    let response = EnvelopeResponse::from_envelope(&envelope);
    inner.envelopes.insert(envelope_id, envelope);
    Ok(Json(response))
}

async fn send_envelope(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<EnvelopeResponse>, HttpApiError> {
    let mut inner = state.inner.lock().await;
    inner.require_envelope(&id)?;
    let envelope = inner.envelopes.get_mut(&id).expect("checked above");
    envelope.status = EnvelopeStatus::Sent;
    Ok(Json(EnvelopeResponse::from_envelope(envelope)))
}

/// Signing is the only transition that reaches the store: the outcome lands
/// in the lease event log and a pending-signature lease goes active.
async fn sign_envelope(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<EnvelopeResponse>, HttpApiError> {
    let mut inner = state.inner.lock().await;
    let lease_id = inner.require_envelope(&id)?.lease_id.clone();
    inner
        .api
        .record_signature_status(&lease_id, &id, EnvelopeStatus::Signed)
        .map_err(|err| HttpApiError::from_store(&err))?;
    let envelope = inner.envelopes.get_mut(&id).expect("checked above");
    envelope.status = EnvelopeStatus::Signed;
    Ok(Json(EnvelopeResponse::from_envelope(envelope)))
}

async fn envelope_status(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<EnvelopeResponse>, HttpApiError> {
    let inner = state.inner.lock().await;
    let envelope = inner.require_envelope(&id)?;
    Ok(Json(EnvelopeResponse::from_envelope(envelope)))
}

#[derive(Debug, Deserialize)]
struct PaymentEmitRequest {
    invoice_id: String,
}

#[derive(Debug, Serialize)]
struct PaymentEmitResponse {
    schema_version: String,
    invoice_id: String,
    status: &'static str,
    barcode: &'static str,
}

async fn payments_emit(
    State(state): State<AppState>,
    Json(request): Json<PaymentEmitRequest>,
) -> Result<Json<PaymentEmitResponse>, HttpApiError> {
    let inner = state.inner.lock().await;
    if inner.api.store().entities().invoice(&request.invoice_id).is_none() {
        return Err(HttpApiError::not_found(
            "invoice not found",
            Some(format!("invoice_id={}", request.invoice_id)),
        ));
    }
    Ok(Json(PaymentEmitResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        invoice_id: request.invoice_id,
        status: "issued",
        barcode: PAYMENT_BARCODE,
    }))
}

#[derive(Debug, Deserialize, Serialize)]
struct PaymentWebhookRequest {
    invoice_id: String,
    event: String,
}

#[derive(Debug, Serialize)]
struct PaymentWebhookResponse {
    schema_version: String,
    received: PaymentWebhookRequest,
}

/// Acknowledges the provider callback; the console follows up with its own
/// payment registration, the webhook itself never mutates the store.
async fn payments_webhook(
    Json(request): Json<PaymentWebhookRequest>,
) -> Json<PaymentWebhookResponse> {
    Json(PaymentWebhookResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        received: request,
    })
}

#[derive(Debug, Deserialize, Serialize)]
struct PushRequest {
    title: String,
    message: String,
}

#[derive(Debug, Serialize)]
struct PushResponse {
    schema_version: String,
    delivered: PushRequest,
    notice_id: String,
}

/// Records the broadcast as a general notice so it shows up on the board.
async fn push_send(
    State(state): State<AppState>,
    Json(request): Json<PushRequest>,
) -> Result<Json<PushResponse>, HttpApiError> {
    let mut inner = state.inner.lock().await;
    let input = imob_core::store::NoticeInput {
        title: request.title.clone(),
        body: request.message.clone(),
        groups: vec![contracts::NoticeGroup::General],
        audience: contracts::NoticeAudience::All,
        expiry: None,
        segment_detail: None,
        attachments: Vec::new(),
    };
    let notice_id = inner
        .api
        .mutate(|store| store.add_notice(input))
        .map_err(|err| HttpApiError::from_store(&err))?;
    Ok(Json(PushResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        delivered: request,
        notice_id,
    }))
}
