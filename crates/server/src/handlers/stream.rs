//! `POST /api/conversations/{id}/message/stream` — stage-streamed
//! deliberation over SSE. Drives the same stage functions `council::engine`
//! exposes for the synchronous endpoint, but emits one event per stage
//! boundary instead of waiting for the whole pipeline to finish.

use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    response::{
        Sse,
        sse::{Event, KeepAlive},
    },
    Json,
};
use config::aliases::resolve_model_alias;
use council::{engine, title};
use futures::{Stream, stream};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StreamRequest {
    query: String,
    #[serde(default)]
    final_only: bool,
    models: Option<Vec<String>>,
    chairman: Option<String>,
}

pub async fn message_stream(
    State(state): State<AppState>,
    Path(_conversation_id): Path<String>,
    Json(request): Json<StreamRequest>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(run_stream(state, request, tx));

    let stream = stream::unfold(rx, |mut rx| async move { rx.recv().await.map(|event| (event, rx)) });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

async fn run_stream(state: AppState, request: StreamRequest, tx: mpsc::UnboundedSender<Result<Event, Infallible>>) {
    if request.query.trim().is_empty() {
        let _ = tx.send(error_event("query must not be empty"));
        return;
    }

    let models = request
        .models
        .map(|models| models.into_iter().map(|m| resolve_model_alias(&m)).collect())
        .unwrap_or_else(|| state.council_models.clone());
    let chairman = request.chairman.map(|c| resolve_model_alias(&c)).unwrap_or_else(|| state.chairman_model.clone());

    let _ = tx.send(json_event("stage1_start", json!({ "models": models })));

    let stage1 = engine::stage1_collect_responses(&state.router, &request.query, &models).await;

    if stage1.is_empty() {
        let _ = tx.send(error_event("all models failed to respond"));
        return;
    }

    let _ = tx.send(json_event("stage1_complete", json!({ "responses": stage1 })));

    let (stage2, _label_map, aggregate_rankings) = if request.final_only {
        (Vec::new(), council::types::LabelMap::new(), Vec::new())
    } else {
        let _ = tx.send(json_event("stage2_start", json!({})));
        let (stage2, label_map) = engine::stage2_collect_rankings(&state.router, &request.query, &stage1, &models).await;
        let aggregate_rankings = engine::calculate_aggregate_rankings(&stage2, &label_map);

        let _ = tx.send(json_event(
            "stage2_complete",
            json!({
                "rankings": stage2,
                "label_to_model": label_map.as_map(),
                "aggregate_rankings": aggregate_rankings,
            }),
        ));

        (stage2, label_map, aggregate_rankings)
    };

    let _ = tx.send(json_event("stage3_start", json!({})));
    let stage3 = engine::stage3_synthesize_final(&state.router, &request.query, &stage1, &stage2, &chairman).await;
    let _ = tx.send(json_event("stage3_complete", json!({ "response": stage3 })));

    let title = title::generate(&state.router, &request.query).await;
    let _ = tx.send(json_event("title_complete", json!({ "title": title })));

    let _ = tx.send(json_event(
        "complete",
        json!({
            "stage1": stage1,
            "stage2": stage2,
            "stage3": stage3,
            "aggregate_rankings": aggregate_rankings,
            "final_only": request.final_only,
            "title": title,
        }),
    ));
}

fn json_event(event_type: &str, mut body: serde_json::Value) -> Result<Event, Infallible> {
    if let serde_json::Value::Object(map) = &mut body {
        map.insert("type".to_string(), serde_json::Value::String(event_type.to_string()));
    }
    Ok(Event::default().event(event_type).json_data(body).unwrap_or_else(|_| Event::default()))
}

fn error_event(message: &str) -> Result<Event, Infallible> {
    Ok(Event::default()
        .event("error")
        .json_data(json!({ "type": "error", "message": message }))
        .unwrap_or_else(|_| Event::default()))
}
