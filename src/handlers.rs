use crate::consts::{
    API_GREETING, REPLY_REJECTION, REPLY_SNIPPET_CHARS, TASK_STATUS_PENDING, UNKNOWN_LOCATION,
};
use crate::error::AppError;
use crate::twilio_types::{InboundSmsPayload, Response};
use crate::types::{
    AgentStatusRequest, AgentStatusResponse, AllowMultipleAgentsRequest, AnswerCallRequest,
    AppState, CallHistoryAck, CallHistoryUpdate, CallRecord, CallStatusResponse, LocationResponse,
    MessageRecord, SendSmsRequest, SendSmsResponse, TaskRecord, TaskStatusResponse,
};
use crate::utils::{fetch_friendly_name, is_owned_number, is_twilio_sid, leading_chars, non_empty};

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};

/// Unwrap a JSON body, turning axum's rejection into our 400.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}

/// Reject anything but a well-formed SID of the expected kind before it reaches an upstream path.
fn require_sid(field: &str, value: &str, prefix: &str) -> Result<(), AppError> {
    if is_twilio_sid(value, prefix) {
        Ok(())
    } else {
        Err(AppError::Validation(format!("{field} must be a {prefix} SID.")))
    }
}

pub async fn hello() -> &'static str {
    API_GREETING
}

/// Country (via Numverify) and Twilio friendly name for a number.
pub async fn call_location_name(
    State(app_state): State<Arc<AppState>>,
    Path(phone_number): Path<String>,
) -> Result<(StatusCode, Json<LocationResponse>), AppError> {
    info!(%phone_number, "looking up number location");
    let validation = app_state.validator.validate(&phone_number).await?;
    let fallback = app_state.config.friendly_name_fallback;

    if validation.valid {
        let friendly_name =
            fetch_friendly_name(app_state.numbers.as_ref(), &phone_number, fallback).await?;
        let location = validation
            .country_name
            .unwrap_or_else(|| UNKNOWN_LOCATION.to_string());
        return Ok((
            StatusCode::OK,
            Json(LocationResponse {
                location,
                friendly_name,
            }),
        ));
    }

    // Invalid number: still answer with a friendly name, best effort.
    let friendly_name =
        match fetch_friendly_name(app_state.numbers.as_ref(), &phone_number, fallback).await {
            Ok(name) => name,
            Err(e) => {
                warn!(error = %e, "friendly name lookup failed for invalid number");
                fallback.resolve(&phone_number)
            }
        };
    Ok((
        StatusCode::BAD_REQUEST,
        Json(LocationResponse {
            location: UNKNOWN_LOCATION.to_string(),
            friendly_name,
        }),
    ))
}

pub async fn call_logs(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<CallRecord>>, AppError> {
    let calls = app_state
        .calls
        .list_calls(app_state.config.log_page_size)
        .await?;
    debug!(count = calls.len(), "fetched call logs");
    Ok(Json(calls))
}

pub async fn sms_logs(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<MessageRecord>>, AppError> {
    let messages = app_state
        .messages
        .list_messages(app_state.config.log_page_size)
        .await?;
    debug!(count = messages.len(), "fetched sms logs");
    Ok(Json(messages))
}

pub async fn task_logs(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<TaskRecord>>, AppError> {
    let tasks = app_state
        .tasks
        .list_tasks(app_state.config.log_page_size)
        .await?;
    debug!(count = tasks.len(), "fetched task logs");
    Ok(Json(tasks))
}

pub async fn send_sms(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<SendSmsRequest>, JsonRejection>,
) -> Result<Json<SendSmsResponse>, AppError> {
    let payload = json_body(payload)?;

    // Order matters: recipient/body, then sender, then ownership of the sender.
    let (to, body) = match (non_empty(payload.to), non_empty(payload.body)) {
        (Some(to), Some(body)) => (to, body),
        _ => {
            return Err(AppError::Validation(
                "Recipient phone number and message body are required.".to_string(),
            ))
        }
    };
    let from = non_empty(payload.from)
        .ok_or_else(|| AppError::Validation("\"from\" number is required.".to_string()))?;
    if !is_owned_number(app_state.numbers.as_ref(), &from).await? {
        return Err(AppError::Validation(
            "The provided \"from\" number is not a valid Twilio number.".to_string(),
        ));
    }

    let message_sid = app_state.messages.send_message(&to, &from, &body).await?;
    info!(%message_sid, %to, %from, "sent sms");
    Ok(Json(SendSmsResponse {
        message_sid,
        status: "sent",
    }))
}

/// Twilio's inbound-message webhook. Replies with TwiML on success and JSON on any failure.
pub async fn receive_sms(
    State(app_state): State<Arc<AppState>>,
    body: String,
) -> Result<impl IntoResponse, AppError> {
    trace!(body = %body, "inbound sms request body");
    let payload = serde_urlencoded::from_str::<InboundSmsPayload>(&body).map_err(|e| {
        error!(error = %e, "failed to deserialize Twilio inbound sms payload");
        AppError::WebhookInput(format!("Malformed webhook body: {e}"))
    })?;

    let (from, to, text) = match (
        non_empty(payload.from),
        non_empty(payload.to),
        non_empty(payload.body),
    ) {
        (Some(from), Some(to), Some(text)) => (from, to, text),
        _ => {
            error!("inbound sms is missing From, To or Body");
            return Err(AppError::WebhookInput(
                "Missing required fields: From, To, Body".to_string(),
            ));
        }
    };
    info!(%from, %to, "received sms");

    let owned = is_owned_number(app_state.numbers.as_ref(), &to)
        .await
        .map_err(|e| {
            error!(error = %e, "failed to process inbound sms");
            AppError::Webhook(format!("Failed to process incoming message: {e}"))
        })?;
    let reply = if owned {
        format!(
            "Thank you for your message: {}... It was received on {to}.",
            leading_chars(&text, REPLY_SNIPPET_CHARS)
        )
    } else {
        warn!(%to, "inbound sms addressed to a number this account does not own");
        REPLY_REJECTION.to_string()
    };

    let twiml = Response::message(reply).render();
    trace!("twiml: '{}'", twiml);

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/xml"),
    );
    Ok((StatusCode::OK, headers, twiml))
}

pub async fn agent_status(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<AgentStatusRequest>, JsonRejection>,
) -> Result<Json<AgentStatusResponse>, AppError> {
    let payload = json_body(payload)?;
    let (worker_sid, activity_sid) =
        match (non_empty(payload.worker_sid), non_empty(payload.activity_sid)) {
            (Some(worker), Some(activity)) => (worker, activity),
            _ => {
                return Err(AppError::Validation(
                    "worker_sid and activity_sid are required.".to_string(),
                ))
            }
        };
    require_sid("worker_sid", &worker_sid, "WK")?;
    require_sid("activity_sid", &activity_sid, "WA")?;

    let status = app_state
        .tasks
        .update_worker_activity(&worker_sid, &activity_sid)
        .await?;
    info!(%worker_sid, %activity_sid, %status, "updated worker activity");
    Ok(Json(AgentStatusResponse { worker_sid, status }))
}

/// Put a task back to `pending` so another worker can be reserved for it.
pub async fn allow_multiple_agents(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<AllowMultipleAgentsRequest>, JsonRejection>,
) -> Result<Json<TaskStatusResponse>, AppError> {
    let payload = json_body(payload)?;
    let task_sid = non_empty(payload.task_sid)
        .ok_or_else(|| AppError::Validation("task_sid is required.".to_string()))?;
    require_sid("task_sid", &task_sid, "WT")?;

    let status = app_state
        .tasks
        .update_task_assignment(&task_sid, TASK_STATUS_PENDING)
        .await?;
    info!(%task_sid, %status, "reopened task for assignment");
    Ok(Json(TaskStatusResponse { task_sid, status }))
}

/// Redirect a live call to the answering worker's client.
pub async fn answer_call(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<AnswerCallRequest>, JsonRejection>,
) -> Result<Json<CallStatusResponse>, AppError> {
    let payload = json_body(payload)?;
    let (call_sid, worker_sid) = match (non_empty(payload.call_sid), non_empty(payload.worker_sid))
    {
        (Some(call), Some(worker)) => (call, worker),
        _ => {
            return Err(AppError::Validation(
                "call_sid and worker_sid are required.".to_string(),
            ))
        }
    };
    require_sid("call_sid", &call_sid, "CA")?;
    require_sid("worker_sid", &worker_sid, "WK")?;

    let twiml = Response::dial_client(worker_sid.as_str()).render();
    trace!("twiml: '{}'", twiml);
    let status = app_state.calls.update_call(&call_sid, &twiml).await?;
    info!(%call_sid, %worker_sid, %status, "connected call to worker");
    Ok(Json(CallStatusResponse { call_sid, status }))
}

/// Acknowledge a call summary from the front end. Nothing is stored; the record is logged.
pub async fn update_call_history(
    payload: Result<Json<CallHistoryUpdate>, JsonRejection>,
) -> Result<Json<CallHistoryAck>, AppError> {
    let update = json_body(payload)?;
    let call_sid = non_empty(update.call_sid)
        .ok_or_else(|| AppError::Validation("call_sid is required.".to_string()))?;

    info!(
        %call_sid,
        from = ?update.from,
        to = ?update.to,
        status = ?update.status,
        duration = ?update.duration,
        start_time = ?update.start_time,
        "call history updated"
    );
    Ok(Json(CallHistoryAck {
        status: "success",
        call_sid,
    }))
}
