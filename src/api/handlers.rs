use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::build::{BuildCoordinator, StartOutcome};

use super::router::AppState;
use super::types::*;

fn bad_json(rejection: JsonRejection) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody::with_details("bad_json", rejection.body_text())),
    )
        .into_response()
}

/// `GET /search?q=<string>&topk=<uint>`
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Json<SearchResponse> {
    let q = params.q.clone().unwrap_or_default();
    let top_k = params.top_k();

    let timer = state.metrics.search_latency.start_timer();
    let output = state.query.search(&q, top_k);
    timer.observe_duration();
    state.metrics.searches_total.inc();

    Json(SearchResponse {
        ok: true,
        q,
        terms: output.terms,
        t_ms: output.t_ms,
        results: output.hits,
    })
}

/// `POST /build` — kick off a background build, or report the one in flight.
pub async fn build(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BuildRequest>, JsonRejection>,
) -> Response {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return bad_json(rejection),
    };

    let (default_dataset, default_threads) = state.coordinator.defaults();

    // The stored default applies only when the key is absent; an explicit
    // empty string falls through to the validation below.
    let dataset = req.dataset_path.unwrap_or(default_dataset);
    let threads = req.threads.unwrap_or(default_threads as i64).max(1) as usize;
    let incremental = req.incremental.unwrap_or(true);

    if dataset.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new("dataset_path_required")),
        )
            .into_response();
    }

    // The request's dataset and thread count become the new defaults for
    // subsequent builds and the scheduler.
    state.coordinator.set_defaults(dataset.clone(), threads);

    match BuildCoordinator::start(&state.coordinator, dataset.clone(), threads, incremental) {
        StartOutcome::AlreadyRunning => Json(BuildAccepted {
            ok: true,
            status: "already_running",
            mode: None,
            dataset_path: None,
            threads: None,
        })
        .into_response(),
        StartOutcome::Started => {
            state.metrics.builds_total.inc();
            Json(BuildAccepted {
                ok: true,
                status: "started",
                mode: Some(if incremental { "update" } else { "build" }),
                dataset_path: Some(dataset),
                threads: Some(threads),
            })
            .into_response()
        }
    }
}

/// `POST /scheduler` — flip the periodic incremental scheduler.
pub async fn scheduler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SchedulerRequest>, JsonRejection>,
) -> Response {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return bad_json(rejection),
    };

    if let Some(enabled) = req.enabled {
        state.coordinator.set_scheduler_enabled(enabled);
    }
    if let Some(interval_s) = req.interval_s {
        state.coordinator.set_scheduler_interval_s(interval_s.max(1) as u64);
    }

    Json(SchedulerResponse {
        ok: true,
        enabled: state.coordinator.scheduler_enabled(),
        interval_s: state.coordinator.scheduler_interval_s(),
    })
    .into_response()
}

/// `GET /status`
pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (dataset_path, build_threads) = state.coordinator.defaults();
    let last = state
        .coordinator
        .last()
        .map(LastBlock::from)
        .unwrap_or_default();

    Json(StatusResponse {
        ok: true,
        building: state.coordinator.is_building(),
        dataset_path,
        build_threads,
        scheduler_enabled: state.coordinator.scheduler_enabled(),
        scheduler_interval_s: state.coordinator.scheduler_interval_s(),
        index: state.index.stats(),
        last,
    })
}

/// Prometheus metrics endpoint
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    use prometheus::Encoder;

    let encoder = prometheus::TextEncoder::new();
    let metric_families = state.metrics.registry().gather();
    let mut buffer = Vec::new();
    if encoder.encode(&metric_families, &mut buffer).is_err() {
        return (StatusCode::INTERNAL_SERVER_ERROR, "encode failed").into_response();
    }

    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4",
        )],
        buffer,
    )
        .into_response()
}
