use crate::config::Config;
use crate::twilio_types::{
    CallPage, CallUpdate, IncomingPhoneNumberPage, MessageCreated, MessagePage, TaskPage,
    TaskResource, TwilioErrorBody, WorkerResource,
};
use crate::types::{CallRecord, MessageRecord, PhoneNumberRecord, TaskRecord};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Request(#[from] reqwest::Error),
    #[error("Twilio API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error(transparent)]
    Parse(#[from] serde_json::Error),
}

/// The account's provisioned phone numbers.
#[async_trait]
pub trait NumberInventory: Send + Sync {
    /// Every owned number; walks all pages.
    async fn list_numbers(&self) -> Result<Vec<PhoneNumberRecord>, ClientError>;
}

#[async_trait]
pub trait CallLog: Send + Sync {
    async fn list_calls(&self, limit: u32) -> Result<Vec<CallRecord>, ClientError>;

    /// Replace the instructions of a live call; returns the call's status afterwards.
    async fn update_call(&self, call_sid: &str, twiml: &str) -> Result<String, ClientError>;
}

#[async_trait]
pub trait MessageLog: Send + Sync {
    async fn list_messages(&self, limit: u32) -> Result<Vec<MessageRecord>, ClientError>;

    /// Send an SMS; returns the new message SID.
    async fn send_message(&self, to: &str, from: &str, body: &str)
        -> Result<String, ClientError>;
}

#[async_trait]
pub trait TaskRouter: Send + Sync {
    /// Returns the worker's activity name after the update.
    async fn update_worker_activity(
        &self,
        worker_sid: &str,
        activity_sid: &str,
    ) -> Result<String, ClientError>;

    /// Returns the task's assignment status after the update.
    async fn update_task_assignment(
        &self,
        task_sid: &str,
        assignment_status: &str,
    ) -> Result<String, ClientError>;

    async fn list_tasks(&self, limit: u32) -> Result<Vec<TaskRecord>, ClientError>;
}

/// REST client for the Twilio core and TaskRouter APIs, authenticated with the account SID and
/// auth token.
pub struct TwilioClient {
    http_client: reqwest::Client,
    account_sid: String,
    auth_token: String,
    workspace_sid: String,
    api_base: String,
    taskrouter_base: String,
}

impl TwilioClient {
    pub fn new(config: &Config, http_client: reqwest::Client) -> Self {
        Self {
            http_client,
            account_sid: config.twilio_account_sid.clone(),
            auth_token: config.twilio_auth_token.clone(),
            workspace_sid: config.twilio_workspace_sid.clone(),
            api_base: config.twilio_api_base.clone(),
            taskrouter_base: config.taskrouter_base.clone(),
        }
    }

    fn account_url(&self, resource: &str) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/{resource}",
            self.api_base, self.account_sid
        )
    }

    fn workspace_url(&self, resource: &str) -> String {
        format!(
            "{}/v1/Workspaces/{}/{resource}",
            self.taskrouter_base, self.workspace_sid
        )
    }

    async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        trace!(url, "GET");
        let response = self
            .http_client
            .get(url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .query(query)
            .send()
            .await?;
        parse_response(response).await
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        url: &str,
        form: &[(&str, &str)],
    ) -> Result<T, ClientError> {
        trace!(url, "POST");
        let response = self
            .http_client
            .post(url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(form)
            .send()
            .await?;
        parse_response(response).await
    }
}

/// Decode a 2xx body as `T`, or turn Twilio's error document into `ClientError::Api`.
async fn parse_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.text().await?;
    if status.is_success() {
        return Ok(serde_json::from_str(&body)?);
    }
    let message = match serde_json::from_str::<TwilioErrorBody>(&body) {
        Ok(err) => {
            debug!(code = ?err.code, "twilio error body");
            err.message
        }
        Err(_) => body,
    };
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl NumberInventory for TwilioClient {
    async fn list_numbers(&self) -> Result<Vec<PhoneNumberRecord>, ClientError> {
        let mut numbers = Vec::new();
        let mut page: IncomingPhoneNumberPage = self
            .get(&self.account_url("IncomingPhoneNumbers.json"), &[])
            .await?;
        loop {
            numbers.extend(page.incoming_phone_numbers.into_iter().map(|n| {
                PhoneNumberRecord {
                    phone_number: n.phone_number,
                    friendly_name: n.friendly_name,
                }
            }));
            match page.next_page_uri {
                // next_page_uri is relative to the API host and already carries its query.
                Some(uri) => {
                    page = self.get(&format!("{}{uri}", self.api_base), &[]).await?;
                }
                None => break,
            }
        }
        debug!(count = numbers.len(), "fetched owned numbers");
        Ok(numbers)
    }
}

#[async_trait]
impl CallLog for TwilioClient {
    async fn list_calls(&self, limit: u32) -> Result<Vec<CallRecord>, ClientError> {
        let page: CallPage = self
            .get(
                &self.account_url("Calls.json"),
                &[("PageSize", limit.to_string())],
            )
            .await?;
        Ok(page.calls.into_iter().map(CallRecord::from).collect())
    }

    async fn update_call(&self, call_sid: &str, twiml: &str) -> Result<String, ClientError> {
        let call: CallUpdate = self
            .post_form(
                &self.account_url(&format!("Calls/{call_sid}.json")),
                &[("Twiml", twiml)],
            )
            .await?;
        Ok(call.status)
    }
}

#[async_trait]
impl MessageLog for TwilioClient {
    async fn list_messages(&self, limit: u32) -> Result<Vec<MessageRecord>, ClientError> {
        let page: MessagePage = self
            .get(
                &self.account_url("Messages.json"),
                &[("PageSize", limit.to_string())],
            )
            .await?;
        Ok(page.messages.into_iter().map(MessageRecord::from).collect())
    }

    async fn send_message(
        &self,
        to: &str,
        from: &str,
        body: &str,
    ) -> Result<String, ClientError> {
        let created: MessageCreated = self
            .post_form(
                &self.account_url("Messages.json"),
                &[("To", to), ("From", from), ("Body", body)],
            )
            .await?;
        Ok(created.sid)
    }
}

#[async_trait]
impl TaskRouter for TwilioClient {
    async fn update_worker_activity(
        &self,
        worker_sid: &str,
        activity_sid: &str,
    ) -> Result<String, ClientError> {
        let worker: WorkerResource = self
            .post_form(
                &self.workspace_url(&format!("Workers/{worker_sid}")),
                &[("ActivitySid", activity_sid)],
            )
            .await?;
        Ok(worker.activity_name)
    }

    async fn update_task_assignment(
        &self,
        task_sid: &str,
        assignment_status: &str,
    ) -> Result<String, ClientError> {
        let task: TaskResource = self
            .post_form(
                &self.workspace_url(&format!("Tasks/{task_sid}")),
                &[("AssignmentStatus", assignment_status)],
            )
            .await?;
        Ok(task.assignment_status)
    }

    async fn list_tasks(&self, limit: u32) -> Result<Vec<TaskRecord>, ClientError> {
        let page: TaskPage = self
            .get(&self.workspace_url("Tasks"), &[("PageSize", limit.to_string())])
            .await?;
        Ok(page.tasks.into_iter().map(TaskRecord::from).collect())
    }
}
