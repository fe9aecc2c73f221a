pub fn wrap_twiml(twiml: String) -> String {
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>{twiml}")
}

mod twiml {
    use xmlserde_derives::XmlSerialize;

    #[derive(PartialEq, Eq, XmlSerialize)]
    #[xmlserde(root = b"Response")]
    pub struct Response {
        #[xmlserde(ty = "untag")]
        pub actions: Vec<ResponseAction>,
    }

    #[derive(PartialEq, Eq, XmlSerialize)]
    pub enum ResponseAction {
        #[xmlserde(name = b"Message")]
        Message(MessageAction),
        #[xmlserde(name = b"Dial")]
        Dial(DialAction),
    }

    #[derive(PartialEq, Eq, XmlSerialize, Default)]
    pub struct MessageAction {
        #[xmlserde(ty = "text")]
        pub body: String,
    }

    #[derive(PartialEq, Eq, XmlSerialize)]
    pub struct DialAction {
        #[xmlserde(ty = "untag")]
        pub noun: DialNoun,
    }

    #[derive(PartialEq, Eq, XmlSerialize)]
    pub enum DialNoun {
        #[xmlserde(name = b"Client")]
        Client(ClientNoun),
    }

    #[derive(PartialEq, Eq, XmlSerialize, Default)]
    pub struct ClientNoun {
        #[xmlserde(ty = "text")]
        pub identity: String,
    }

    impl Response {
        /// A single `<Message>` reply, as expected from an inbound messaging webhook.
        pub fn message(body: impl Into<String>) -> Self {
            Self {
                actions: vec![ResponseAction::Message(MessageAction { body: body.into() })],
            }
        }

        /// Bridge a live call to a TaskRouter worker's client endpoint.
        pub fn dial_client(identity: impl Into<String>) -> Self {
            Self {
                actions: vec![ResponseAction::Dial(DialAction {
                    noun: DialNoun::Client(ClientNoun {
                        identity: identity.into(),
                    }),
                })],
            }
        }

        pub fn render(self) -> String {
            super::wrap_twiml(xmlserde::xml_serialize(self))
        }
    }
}
pub use twiml::*;

/// Resource shapes returned by the Twilio REST and TaskRouter APIs. Only the fields this service
/// reads are modelled; serde ignores the rest.
mod rest {
    use serde::{Deserialize, Deserializer};
    use time::OffsetDateTime;

    #[derive(Deserialize, Debug)]
    pub struct IncomingPhoneNumberPage {
        #[serde(default)]
        pub incoming_phone_numbers: Vec<IncomingPhoneNumber>,
        pub next_page_uri: Option<String>,
    }

    #[derive(Deserialize, Debug)]
    pub struct IncomingPhoneNumber {
        pub phone_number: String,
        #[serde(default)]
        pub friendly_name: String,
    }

    #[derive(Deserialize, Debug)]
    pub struct CallUpdate {
        #[serde(default)]
        pub status: String,
    }

    #[derive(Deserialize, Debug)]
    pub struct MessageCreated {
        pub sid: String,
    }

    #[derive(Deserialize, Debug)]
    pub struct CallPage {
        #[serde(default)]
        pub calls: Vec<CallResource>,
    }

    #[derive(Deserialize, Debug)]
    pub struct CallResource {
        pub sid: String,
        #[serde(default)]
        pub from: String,
        #[serde(default)]
        pub to: String,
        #[serde(default)]
        pub status: String,
        // Twilio sends the duration as a string, or null while the call is live.
        #[serde(default, deserialize_with = "de_opt_u32")]
        pub duration: Option<u32>,
        #[serde(default, with = "time::serde::rfc2822::option")]
        pub start_time: Option<OffsetDateTime>,
        #[serde(default, with = "time::serde::rfc2822::option")]
        pub date_created: Option<OffsetDateTime>,
    }

    #[derive(Deserialize, Debug)]
    pub struct MessagePage {
        #[serde(default)]
        pub messages: Vec<MessageResource>,
    }

    #[derive(Deserialize, Debug)]
    pub struct MessageResource {
        pub sid: String,
        #[serde(default)]
        pub body: String,
        #[serde(default)]
        pub from: String,
        #[serde(default)]
        pub to: String,
        #[serde(default)]
        pub status: String,
        #[serde(default, with = "time::serde::rfc2822::option")]
        pub date_sent: Option<OffsetDateTime>,
    }

    #[derive(Deserialize, Debug)]
    pub struct TaskPage {
        #[serde(default)]
        pub tasks: Vec<TaskResource>,
    }

    #[derive(Deserialize, Debug)]
    pub struct TaskResource {
        pub sid: String,
        pub assignment_status: String,
        #[serde(with = "time::serde::rfc3339")]
        pub date_created: OffsetDateTime,
        #[serde(default)]
        pub attributes: String,
    }

    #[derive(Deserialize, Debug)]
    pub struct WorkerResource {
        #[serde(default)]
        pub activity_name: String,
    }

    /// Error body Twilio attaches to non-2xx responses.
    #[derive(Deserialize, Debug)]
    pub struct TwilioErrorBody {
        pub code: Option<u32>,
        pub message: String,
    }

    fn de_opt_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum StrOrNum {
            Str(String),
            Num(u32),
        }

        match Option::<StrOrNum>::deserialize(deserializer)? {
            None => Ok(None),
            Some(StrOrNum::Num(n)) => Ok(Some(n)),
            Some(StrOrNum::Str(s)) => s.parse().map(Some).map_err(serde::de::Error::custom),
        }
    }
}
pub use rest::*;

mod inbound {
    use serde::Deserialize;

    /// Form body of Twilio's inbound-message webhook. Every field is optional here so that
    /// missing values surface as a validation error instead of a deserialization failure.
    /// Twilio sends many more keys (`MessageSid`, `NumMedia`, ...); they are ignored.
    #[derive(Deserialize, Debug, Default)]
    #[serde(rename_all = "PascalCase")]
    pub struct InboundSmsPayload {
        pub from: Option<String>,
        pub to: Option<String>,
        pub body: Option<String>,
    }
}
pub use inbound::*;
