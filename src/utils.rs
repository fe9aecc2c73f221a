use crate::config::FriendlyNameFallback;
use crate::twilio_client::{ClientError, NumberInventory};

/// Friendly name Twilio holds for `phone_number`, or the configured fallback when the account
/// does not own it. Always a fresh inventory fetch.
pub async fn fetch_friendly_name(
    numbers: &dyn NumberInventory,
    phone_number: &str,
    fallback: FriendlyNameFallback,
) -> Result<String, ClientError> {
    let owned = numbers.list_numbers().await?;
    Ok(owned
        .into_iter()
        .find(|record| record.phone_number == phone_number)
        .map(|record| record.friendly_name)
        .unwrap_or_else(|| fallback.resolve(phone_number)))
}

/// Whether `phone_number` is currently provisioned on the account. Always a fresh inventory fetch.
pub async fn is_owned_number(
    numbers: &dyn NumberInventory,
    phone_number: &str,
) -> Result<bool, ClientError> {
    let owned = numbers.list_numbers().await?;
    Ok(owned.iter().any(|record| record.phone_number == phone_number))
}

/// First `max_chars` characters of `text`, counted as chars so multi-byte input is never split.
pub fn leading_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// `Some` only for present, non-empty values.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Whether `value` is a Twilio SID of the given kind: the two-letter `prefix` followed by 32 hex
/// digits. SIDs end up in upstream URL paths, so nothing else may pass.
pub fn is_twilio_sid(value: &str, prefix: &str) -> bool {
    match value.strip_prefix(prefix) {
        Some(tail) => tail.len() == 32 && tail.bytes().all(|b| b.is_ascii_hexdigit()),
        None => false,
    }
}
