#[derive(Debug, Serialize)]
struct HealthResponse {
    schema_version: String,
    status: &'static str,
    storage: &'static str,
    scenarios: ScenarioFlags,
}

async fn get_health(State(state): State<AppState>) -> Json<HealthResponse> {
    let inner = state.inner.lock().await;
    Json(HealthResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        status: "ok",
        storage: STORAGE_NAME,
        scenarios: inner.api.store().scenarios(),
    })
}

#[derive(Debug, Serialize)]
struct DashboardResponse {
    schema_version: String,
    scenarios: ScenarioFlags,
    aggregates: DashboardAggregates,
    persistence_warning: Option<String>,
}

async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardResponse> {
    let inner = state.inner.lock().await;
    Json(DashboardResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        scenarios: inner.api.store().scenarios(),
        aggregates: inner.api.dashboard(),
        persistence_warning: inner.api.last_persistence_error().map(str::to_string),
    })
}

#[derive(Debug, Serialize)]
struct ScenarioResponse {
    schema_version: String,
    scenarios: ScenarioFlags,
}

async fn toggle_scenario(
    Path(flag): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ScenarioResponse>, HttpApiError> {
    let kind = ScenarioKind::parse(&flag).ok_or_else(|| {
        HttpApiError::invalid_request("unknown scenario flag", Some(format!("flag={flag}")))
    })?;

    let mut inner = state.inner.lock().await;
    let scenarios = inner.api.toggle_scenario(kind);
    Ok(Json(ScenarioResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        scenarios,
    }))
}

#[derive(Debug, Deserialize)]
struct GenerateInvoicesRequest {
    period: String,
}

#[derive(Debug, Serialize)]
struct GenerateInvoicesResponse {
    schema_version: String,
    period: String,
    created: usize,
}

async fn generate_invoices(
    State(state): State<AppState>,
    Json(request): Json<GenerateInvoicesRequest>,
) -> Result<Json<GenerateInvoicesResponse>, HttpApiError> {
    let mut inner = state.inner.lock().await;
    let created = inner
        .api
        .generate_invoices(&request.period)
        .map_err(|err| HttpApiError::from_store(&err))?;
    Ok(Json(GenerateInvoicesResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        period: request.period,
        created,
    }))
}
