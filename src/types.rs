use crate::config::Config;
use crate::numverify::NumberValidator;
use crate::twilio_client::{CallLog, MessageLog, NumberInventory, TaskRouter};
use crate::twilio_types::{CallResource, MessageResource, TaskResource};

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::OffsetDateTime;

/// A number provisioned on the Twilio account.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct PhoneNumberRecord {
    pub phone_number: String,
    pub friendly_name: String,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct CallRecord {
    #[serde(rename = "call_sid")]
    pub sid: String,
    pub from: String,
    pub to: String,
    pub status: String,
    #[serde(rename = "duration")]
    pub duration_seconds: Option<u32>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub start_time: Option<OffsetDateTime>,
    #[serde(rename = "dateCreated", with = "time::serde::rfc3339::option")]
    pub date_created: Option<OffsetDateTime>,
}

impl From<CallResource> for CallRecord {
    fn from(call: CallResource) -> Self {
        Self {
            sid: call.sid,
            from: call.from,
            to: call.to,
            status: call.status,
            duration_seconds: call.duration,
            start_time: call.start_time,
            date_created: call.date_created,
        }
    }
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct MessageRecord {
    #[serde(rename = "message_sid")]
    pub sid: String,
    pub body: String,
    pub from: String,
    pub to: String,
    pub status: String,
    #[serde(with = "time::serde::rfc3339::option")]
    pub date_sent: Option<OffsetDateTime>,
}

impl From<MessageResource> for MessageRecord {
    fn from(message: MessageResource) -> Self {
        Self {
            sid: message.sid,
            body: message.body,
            from: message.from,
            to: message.to,
            status: message.status,
            date_sent: message.date_sent,
        }
    }
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct TaskRecord {
    #[serde(rename = "task_sid")]
    pub sid: String,
    pub assignment_status: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date_created: OffsetDateTime,
    /// Opaque JSON document, passed through as Twilio stores it.
    pub attributes: String,
}

impl From<TaskResource> for TaskRecord {
    fn from(task: TaskResource) -> Self {
        Self {
            sid: task.sid,
            assignment_status: task.assignment_status,
            date_created: task.date_created,
            attributes: task.attributes,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub country_name: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct SendSmsRequest {
    pub to: Option<String>,
    pub body: Option<String>,
    pub from: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct SendSmsResponse {
    pub message_sid: String,
    pub status: &'static str,
}

#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct LocationResponse {
    pub location: String,
    pub friendly_name: String,
}

#[derive(Deserialize, Debug, Default)]
pub struct AgentStatusRequest {
    pub worker_sid: Option<String>,
    pub activity_sid: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct AgentStatusResponse {
    pub worker_sid: String,
    pub status: String,
}

#[derive(Deserialize, Debug, Default)]
pub struct AllowMultipleAgentsRequest {
    pub task_sid: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct TaskStatusResponse {
    pub task_sid: String,
    pub status: String,
}

#[derive(Deserialize, Debug, Default)]
pub struct AnswerCallRequest {
    pub call_sid: Option<String>,
    pub worker_sid: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct CallStatusResponse {
    pub call_sid: String,
    pub status: String,
}

/// Call summary pushed by the front end once a call ends.
#[derive(Deserialize, Debug, Default)]
pub struct CallHistoryUpdate {
    pub call_sid: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub status: Option<String>,
    pub duration: Option<serde_json::Value>,
    pub start_time: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct CallHistoryAck {
    pub status: &'static str,
    pub call_sid: String,
}

pub struct AppState {
    pub config: Config,
    pub numbers: Arc<dyn NumberInventory>,
    pub calls: Arc<dyn CallLog>,
    pub messages: Arc<dyn MessageLog>,
    pub tasks: Arc<dyn TaskRouter>,
    pub validator: Arc<dyn NumberValidator>,
}
