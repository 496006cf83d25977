//! Wire format of the remote VPN service.
//!
//! The service's JSON is loosely typed: the server list arrives either as a
//! list or as a mapping keyed by id, numbers arrive as strings (`"23%"`,
//! `"1,247"`), and rejections come with non-2xx statuses. Everything is
//! normalized here, at the boundary, so the rest of the workspace only sees
//! [`ServerDescriptor`] lists and [`ConnectionState`] values.
//!
//! All functions take the raw body bytes; the HTTP layer never inspects JSON.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{
    error::TransportError,
    model::{ConnectionState, Percent, ServerDescriptor},
};

/// Message used when a rejection carries no text.
const NO_REASON: &str = "no reason given";

/// Outcome of a connect/disconnect call that reached the service.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply<T> {
    /// `success: true`.
    Accepted(T),
    /// `success: false`, with the service's message.
    Rejected {
        /// Message supplied by the service, kept verbatim.
        message: String,
    },
}

/// Accepted `POST /api/connect/:id`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectAck {
    /// Service message, e.g. `"Connected to USA East Coast"`.
    pub message: String,
    /// Server the service connected to, if it echoed one.
    pub server: Option<ServerDescriptor>,
}

/// Accepted `POST /api/disconnect`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisconnectAck {
    /// Service message.
    pub message: String,
}

#[derive(Deserialize)]
struct StatusBody {
    #[serde(default)]
    connected: Option<bool>,
    #[serde(default)]
    current_server: Option<Value>,
    /// Older service builds report the server object under `server`.
    #[serde(default)]
    server: Option<Value>,
    #[serde(default)]
    current_ip: Option<String>,
    #[serde(default)]
    original_ip: Option<String>,
    #[serde(default)]
    ip_changed: Option<bool>,
}

#[derive(Deserialize)]
struct RawServer {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    flag: Option<String>,
    #[serde(default)]
    ping: Option<Value>,
    #[serde(default)]
    load: Option<Value>,
    #[serde(default)]
    speed: Option<Value>,
    #[serde(default)]
    users: Option<Value>,
    #[serde(default)]
    uptime: Option<Value>,
}

#[derive(Deserialize)]
struct AckBody {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    server: Option<Value>,
}

/// Parse `GET /api/status`.
///
/// Missing `ip_changed` is derived from the two addresses. Empty strings are
/// treated as absent.
pub fn parse_status(body: &[u8]) -> Result<ConnectionState, TransportError> {
    let status: StatusBody = serde_json::from_slice(body)?;

    let current_ip = non_empty(status.current_ip);
    let original_ip = non_empty(status.original_ip);
    let ip_changed = status.ip_changed.unwrap_or_else(|| match (&current_ip, &original_ip) {
        (Some(current), Some(original)) => current != original,
        _ => false,
    });
    let current_server_id =
        status.current_server.as_ref().or(status.server.as_ref()).and_then(server_key);

    Ok(ConnectionState {
        connected: status.connected.unwrap_or(false),
        current_server_id,
        current_ip,
        original_ip,
        ip_changed,
    })
}

/// Parse `GET /api/servers` into a list.
///
/// Accepted shapes: `{servers: [..]}`, `{servers: {id: {..}}}`, a bare list,
/// or a bare mapping. Mapping order follows the document. Entries without an
/// id (list shape) or that are not objects are skipped.
pub fn parse_servers(body: &[u8]) -> Result<Vec<ServerDescriptor>, TransportError> {
    let document: Value = serde_json::from_slice(body)?;

    let servers = match document {
        Value::Object(mut root) => match root.remove("servers") {
            Some(servers) => servers,
            None => Value::Object(root),
        },
        other => other,
    };

    match servers {
        Value::Array(entries) => {
            Ok(entries.into_iter().filter_map(|entry| normalize_server(entry, None)).collect())
        },
        Value::Object(entries) => Ok(normalize_mapping(entries)),
        Value::Null => Ok(Vec::new()),
        other => Err(TransportError::malformed(format!(
            "expected server list or mapping, found {}",
            json_kind(&other)
        ))),
    }
}

/// Parse `POST /api/connect/:id`.
///
/// `requested_id` fills in the id of an echoed server object that lacks one.
pub fn parse_connect(
    body: &[u8],
    requested_id: &str,
) -> Result<Reply<ConnectAck>, TransportError> {
    let ack: AckBody = serde_json::from_slice(body)?;
    let message = ack.message.unwrap_or_default();

    if !ack.success {
        return Ok(rejected(message));
    }

    let server = ack.server.and_then(|server| normalize_server(server, Some(requested_id)));
    Ok(Reply::Accepted(ConnectAck { message, server }))
}

/// Parse `POST /api/disconnect`.
pub fn parse_disconnect(body: &[u8]) -> Result<Reply<DisconnectAck>, TransportError> {
    let ack: AckBody = serde_json::from_slice(body)?;
    let message = ack.message.unwrap_or_default();

    if ack.success { Ok(Reply::Accepted(DisconnectAck { message })) } else { Ok(rejected(message)) }
}

fn rejected<T>(message: String) -> Reply<T> {
    let message = if message.trim().is_empty() { NO_REASON.to_string() } else { message };
    Reply::Rejected { message }
}

fn normalize_mapping(entries: Map<String, Value>) -> Vec<ServerDescriptor> {
    entries.into_iter().filter_map(|(key, entry)| normalize_server(entry, Some(&key))).collect()
}

fn normalize_server(entry: Value, fallback_id: Option<&str>) -> Option<ServerDescriptor> {
    let raw: RawServer = match serde_json::from_value(entry) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(error = %e, "skipping malformed server entry");
            return None;
        },
    };

    let Some(id) = non_empty(raw.id).or_else(|| fallback_id.map(str::to_string)) else {
        tracing::warn!("skipping server entry without id");
        return None;
    };

    Some(ServerDescriptor {
        name: non_empty(raw.name).unwrap_or_else(|| id.clone()),
        location: raw.location.unwrap_or_default(),
        flag: non_empty(raw.flag),
        ping: raw.ping.as_ref().and_then(display_text),
        load: raw.load.as_ref().and_then(percent),
        speed: raw.speed.as_ref().and_then(display_text),
        users: raw.users.as_ref().and_then(count),
        uptime: raw.uptime.as_ref().and_then(percent),
        id,
    })
}

/// Server id from either a bare key or an embedded server object.
fn server_key(value: &Value) -> Option<String> {
    match value {
        Value::String(key) => non_empty(Some(key.clone())),
        Value::Object(object) => object.get("id").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

fn display_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => non_empty(Some(text.clone())),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn percent(value: &Value) -> Option<Percent> {
    match value {
        Value::String(text) => Percent::parse(text),
        Value::Number(number) => number.as_f64().and_then(Percent::new),
        _ => None,
    }
}

fn count(value: &Value) -> Option<u64> {
    match value {
        Value::String(text) => {
            let digits: String =
                text.chars().filter(|c| !matches!(c, ',' | '_' | ' ')).collect();
            digits.parse().ok()
        },
        Value::Number(number) => number.as_u64(),
        _ => None,
    }
}

fn non_empty(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportErrorKind;

    #[test]
    fn status_derives_ip_changed_when_missing() {
        let state = parse_status(
            br#"{"connected": true, "current_server": "uk",
                 "current_ip": "198.51.100.4", "original_ip": "203.0.113.7"}"#,
        )
        .unwrap();

        assert!(state.connected);
        assert_eq!(state.current_server_id.as_deref(), Some("uk"));
        assert!(state.ip_changed);
    }

    #[test]
    fn status_accepts_null_fields() {
        let state = parse_status(
            br#"{"connected": false, "current_server": null,
                 "current_ip": "", "original_ip": null, "ip_changed": false}"#,
        )
        .unwrap();

        assert_eq!(state, ConnectionState::default());
    }

    #[test]
    fn status_reads_legacy_server_object() {
        let state =
            parse_status(br#"{"connected": true, "server": {"id": "de", "name": "Germany"}}"#)
                .unwrap();
        assert_eq!(state.current_server_id.as_deref(), Some("de"));
    }

    #[test]
    fn status_rejects_non_object() {
        let err = parse_status(b"[1, 2]").unwrap_err();
        assert_eq!(err.kind, TransportErrorKind::Malformed);
    }

    #[test]
    fn list_entries_without_id_are_skipped() {
        let servers =
            parse_servers(br#"{"servers": [{"name": "nameless"}, {"id": "jp", "load": 22}]}"#)
                .unwrap();
        assert_eq!(servers.len(), 1);
        assert_eq!(servers[0].id, "jp");
        assert_eq!(servers[0].name, "jp");
    }

    #[test]
    fn servers_of_wrong_type_are_malformed() {
        let err = parse_servers(br#"{"servers": "none"}"#).unwrap_err();
        assert_eq!(err.kind, TransportErrorKind::Malformed);
    }

    #[test]
    fn null_servers_is_empty_list() {
        assert!(parse_servers(br#"{"servers": null}"#).unwrap().is_empty());
    }

    #[test]
    fn users_with_thousand_separators() {
        let servers = parse_servers(br#"[{"id": "uk", "users": "1,456"}]"#).unwrap();
        assert_eq!(servers[0].users, Some(1456));
    }

    #[test]
    fn rejection_keeps_message_verbatim() {
        let reply = parse_connect(br#"{"success": false, "message": "server full"}"#, "uk");
        assert_eq!(reply.unwrap(), Reply::Rejected { message: "server full".into() });
    }

    #[test]
    fn rejection_without_message_gets_placeholder() {
        let reply = parse_disconnect(br#"{"success": false}"#).unwrap();
        assert_eq!(reply, Reply::Rejected { message: NO_REASON.into() });
    }

    #[test]
    fn connect_ack_fills_missing_server_id() {
        let reply = parse_connect(
            br#"{"success": true, "message": "ok", "server": {"name": "USA Free Server"}}"#,
            "usa_free",
        )
        .unwrap();

        let Reply::Accepted(ack) = reply else { panic!("expected acceptance") };
        let server = ack.server.unwrap();
        assert_eq!(server.id, "usa_free");
        assert_eq!(server.name, "USA Free Server");
    }

    #[test]
    fn ack_without_success_is_malformed() {
        let err = parse_disconnect(br#"{"message": "?"}"#).unwrap_err();
        assert_eq!(err.kind, TransportErrorKind::Malformed);
    }
}
