//! Alert broadcast and history endpoints.

use axum::extract::{Query, State};
use axum::Json;
use broadcaster::BroadcastOutcome;
use database::alert_log::{self, DEFAULT_HISTORY_LIMIT};
use database::region;
use database::AlertRecord;
use flood_core::{BroadcastRequest, DeliveryReport, RegionId, RiskLevel};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{error, warn};

use crate::error::{AdminError, Result};
use crate::state::AppState;

/// Upper bound on `limit` for history queries.
const MAX_HISTORY_LIMIT: i64 = 1000;

/// Operator broadcast request body.
#[derive(Debug, Deserialize)]
pub struct SendAlertRequest {
    pub region_id: RegionId,
    pub risk_level: RiskLevel,
    pub message: String,
    #[serde(default = "default_issuer")]
    pub issued_by: String,
}

fn default_issuer() -> String {
    "admin-web".to_string()
}

impl From<SendAlertRequest> for BroadcastRequest {
    fn from(req: SendAlertRequest) -> Self {
        BroadcastRequest {
            region_id: req.region_id,
            risk_level: req.risk_level,
            message: req.message,
            issued_by: req.issued_by,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SendAlertResponse {
    #[serde(flatten)]
    pub report: DeliveryReport,
    pub log_id: Option<i64>,
}

impl From<BroadcastOutcome> for SendAlertResponse {
    fn from(outcome: BroadcastOutcome) -> Self {
        Self {
            report: outcome.report,
            log_id: outcome.log_id,
        }
    }
}

/// Flips the cancel flag when the request future is dropped.
///
/// The broadcast runs on its own task, so a client disconnect stops new sends
/// while in-flight sends finish and the alert log is still written.
struct CancelOnDrop(watch::Sender<bool>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if !*self.0.borrow() {
            let _ = self.0.send(true);
        }
    }
}

/// Broadcast an alert to every recipient of a region.
pub async fn send(
    State(state): State<AppState>,
    Json(request): Json<SendAlertRequest>,
) -> Result<Json<SendAlertResponse>> {
    let request = BroadcastRequest::from(request);
    let region_id = request.region_id;
    // Unknown regions are rejected before any send.
    region::get_region(state.db.pool(), region_id).await?;

    let (cancel_tx, cancel_rx) = watch::channel(false);
    let guard = CancelOnDrop(cancel_tx);

    let alerts = state.alerts.clone();
    let task =
        tokio::spawn(async move { alerts.broadcast_with_cancel(request, cancel_rx).await });

    let result = task.await.map_err(|e| {
        error!(region_id, error = %e, "Broadcast task failed");
        AdminError::Internal(format!("broadcast task failed: {}", e))
    })?;
    // Completed normally; nothing left to cancel.
    drop(guard);

    let outcome = result?;
    if outcome.report.cancelled {
        warn!(region_id, broadcast_id = %outcome.report.broadcast_id, "Broadcast was cancelled");
    }

    Ok(Json(outcome.into()))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

/// Newest alert log entries first.
pub async fn history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<AlertRecord>>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);
    Ok(Json(alert_log::list_recent(state.db.pool(), limit).await?))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::http::StatusCode;
    use database::recipient::create_recipient;
    use database::region::create_region;
    use database::{NewRecipient, NewRegion};
    use flood_core::testing::ScriptedProvider;
    use flood_core::Channel;
    use serde_json::json;
    use tokio::sync::Semaphore;

    use super::*;
    use crate::routes::test_support::{body_json, call, get, json, state_with};

    async fn seed(state: &AppState, phones: &[&str]) -> i64 {
        let region = create_region(
            state.db.pool(),
            &NewRegion {
                name: "Barpeta".to_string(),
                state: Some("Assam".to_string()),
                latitude: 26.32,
                longitude: 91.0,
                station_id: None,
                population: None,
            },
        )
        .await
        .unwrap();

        for phone in phones {
            create_recipient(
                state.db.pool(),
                &NewRecipient {
                    phone_number: phone.to_string(),
                    name: None,
                    region_id: region.id,
                    language: None,
                    channels: None,
                },
            )
            .await
            .unwrap();
        }
        region.id
    }

    #[tokio::test]
    async fn test_send_reports_and_records_history() {
        let sms = Arc::new(ScriptedProvider::new(Channel::Sms).fail_for("+919800000002"));
        let state = state_with(Vec::new(), vec![sms.clone()]).await;
        let region_id = seed(&state, &["+919800000001", "+919800000002"]).await;

        let response = call(
            &state,
            json(
                "POST",
                "/api/alerts/send",
                json!({
                    "region_id": region_id,
                    "risk_level": "high",
                    "message": "Move to higher ground"
                }),
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["attempted_count"], 2);
        assert_eq!(body["succeeded_count"], 1);
        assert_eq!(body["cancelled"], false);
        assert!(body["log_id"].is_i64());

        let (_, text) = &sms.sent()[0];
        assert!(text.starts_with("⚠️ Flood Alert (HIGH):\nMove to higher ground"));

        let response = call(&state, get("/api/alerts/history?limit=5")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["succeeded_count"], 1);
        assert_eq!(body[0]["issued_by"], "admin-web");
    }

    #[tokio::test]
    async fn test_send_rejects_empty_message() {
        let state = state_with(Vec::new(), vec![Arc::new(ScriptedProvider::new(Channel::Sms))]).await;
        let region_id = seed(&state, &["+919800000001"]).await;

        let response = call(
            &state,
            json(
                "POST",
                "/api/alerts/send",
                json!({"region_id": region_id, "risk_level": "high", "message": "  "}),
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let response = call(&state, get("/api/alerts/history")).await;
        assert!(body_json(response).await.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_to_unknown_region_is_not_found() {
        let sms = Arc::new(ScriptedProvider::new(Channel::Sms));
        let state = state_with(Vec::new(), vec![sms.clone()]).await;
        seed(&state, &["+919800000001"]).await;

        let response = call(
            &state,
            json(
                "POST",
                "/api/alerts/send",
                json!({"region_id": 999, "risk_level": "high", "message": "Move to higher ground"}),
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(sms.sent().is_empty());
        let response = call(&state, get("/api/alerts/history")).await;
        assert!(body_json(response).await.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dropped_request_cancels_remaining_sends() {
        // One permit: the first send completes, the second waits at the gate.
        let gate = Arc::new(Semaphore::new(1));
        let sms = Arc::new(ScriptedProvider::new(Channel::Sms).gated(gate.clone()));
        let state = state_with(Vec::new(), vec![sms.clone()]).await;
        let phones: Vec<String> = (1..=5).map(|i| format!("+91980000000{}", i)).collect();
        let phone_refs: Vec<&str> = phones.iter().map(String::as_str).collect();
        let region_id = seed(&state, &phone_refs).await;

        // Default concurrency is 8, so use a state whose dispatcher sends one at a time.
        let state = {
            use broadcaster::{AlertService, DispatchConfig, Dispatcher};
            let dispatcher = Dispatcher::new(DispatchConfig {
                concurrency: 1,
                ..DispatchConfig::default()
            })
            .with_provider(sms.clone());
            AppState {
                alerts: Arc::new(AlertService::new(
                    Arc::new(state.db.clone()),
                    dispatcher,
                    Arc::new(state.db.clone()),
                )),
                ..state
            }
        };

        let request = SendAlertRequest {
            region_id,
            risk_level: RiskLevel::Critical,
            message: "Evacuate now".to_string(),
            issued_by: "control-room".to_string(),
        };
        let mut handler = Box::pin(send(State(state.clone()), Json(request)));

        // Abandon the request once the second send is in flight.
        tokio::select! {
            _ = &mut handler => panic!("handler finished while a send was held"),
            _ = async {
                while sms.sent().len() < 2 {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                }
            } => {}
        }
        drop(handler);
        gate.add_permits(1);

        // The spawned broadcast still finishes and writes the log.
        let history = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let history = alert_log::list_recent(state.db.pool(), 10).await.unwrap();
                if !history.is_empty() {
                    break history;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("alert log was never written");

        assert_eq!(sms.sent().len(), 2);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].entry.succeeded_count, 2);
        assert_eq!(history[0].entry.issued_by, "control-room");
    }

    #[tokio::test]
    async fn test_history_limit_is_clamped() {
        let state = state_with(Vec::new(), vec![Arc::new(ScriptedProvider::new(Channel::Sms))]).await;

        let response = call(&state, get("/api/alerts/history?limit=-4")).await;

        assert_eq!(response.status(), StatusCode::OK);
    }
}
