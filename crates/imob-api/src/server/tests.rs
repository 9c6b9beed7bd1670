use super::*;

fn inner() -> ServerInner {
    ServerInner {
        api: ConsoleApi::from_config(DemoConfig::default()).expect("api seeds"),
        envelopes: BTreeMap::new(),
        envelope_seq: 0,
    }
}

#[test]
fn scenario_flags_parse_round_trip() {
    for kind in [
        ScenarioKind::HighDelinquency,
        ScenarioKind::HighVacancy,
        ScenarioKind::HighMaintenance,
    ] {
        assert_eq!(ScenarioKind::parse(kind.as_str()), Some(kind));
    }
    assert_eq!(ScenarioKind::parse("high_everything"), None);
}

#[test]
fn envelope_ids_are_sequential() {
    let mut inner = inner();
    assert_eq!(inner.next_envelope_id(), "env_000");
    assert_eq!(inner.next_envelope_id(), "env_001");
}

#[test]
fn missing_envelope_maps_to_not_found() {
    let inner = inner();
    let err = inner.require_envelope("env_404").expect_err("must be missing");
    assert_eq!(err.status, StatusCode::NOT_FOUND);
    assert_eq!(err.error.error_code, ErrorCode::NotFound);
}

#[test]
fn store_errors_map_to_http_statuses() {
    let not_found = StoreError::not_found(contracts::EntityKind::Invoice, "inv_999");
    assert_eq!(
        HttpApiError::from_store(&not_found).status,
        StatusCode::NOT_FOUND
    );

    let invalid = StoreError::invalid_state(contracts::EntityKind::Invoice, "inv_001", "paid");
    assert_eq!(
        HttpApiError::from_store(&invalid).status,
        StatusCode::CONFLICT
    );

    let validation = StoreError::Validation("bad period".to_string());
    assert_eq!(
        HttpApiError::from_store(&validation).status,
        StatusCode::BAD_REQUEST
    );
}

#[test]
fn signing_an_envelope_reaches_the_lease_log() {
    let mut inner = inner();
    let lease_id = inner.api.store().entities().leases[0].id.clone();
    let envelope_id = inner.next_envelope_id();
    inner.envelopes.insert(
        envelope_id.clone(),
        SignatureEnvelope {
            envelope_id: envelope_id.clone(),
            lease_id: lease_id.clone(),
            status: EnvelopeStatus::Sent,
        },
    );

    inner
        .api
        .record_signature_status(&lease_id, &envelope_id, EnvelopeStatus::Signed)
        .expect("signature records");
    let events = inner.api.store().lease_events(&lease_id);
    assert!(events.iter().any(|event| event.text.contains(&envelope_id)));
}
