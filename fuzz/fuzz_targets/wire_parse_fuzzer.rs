//! Fuzz target for service reply parsing
//!
//! Feeds arbitrary and structurally plausible bodies to every reply parser.
//!
//! # Strategy
//!
//! - Raw bytes: completely arbitrary bodies (general malformation)
//! - Shaped servers: list and mapping documents with mixed field types
//! - Shaped acks: `success`/`message` combinations, wrong types included
//!
//! # Invariants
//!
//! - NEVER panic on malformed JSON
//! - A rejection always carries a non-empty message
//! - Quick-connect selection over parsed servers picks a listed server with
//!   the lowest known load

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use voltvpn_core::{
    Reply, ServerDescriptor, select_least_loaded,
    wire::{parse_connect, parse_disconnect, parse_servers, parse_status},
};

#[derive(Debug, Arbitrary)]
enum Endpoint {
    Status,
    Servers,
    Connect,
    Disconnect,
}

#[derive(Debug, Arbitrary)]
enum LoadField {
    Missing,
    Number(f64),
    Text(String),
    Percent(u8),
}

#[derive(Debug, Arbitrary)]
struct ShapedServer {
    id: Option<String>,
    name: Option<String>,
    load: LoadField,
}

#[derive(Debug, Arbitrary)]
enum FuzzInput {
    Raw { endpoint: Endpoint, body: Vec<u8> },
    Servers { servers: Vec<ShapedServer>, as_mapping: bool, wrapped: bool },
    Ack { success: Option<bool>, message: Option<String>, endpoint_is_connect: bool },
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

fn server_fields(server: &ShapedServer, with_id: bool) -> String {
    let mut fields = Vec::new();
    if let (true, Some(id)) = (with_id, &server.id) {
        fields.push(format!("\"id\":{}", quote(id)));
    }
    if let Some(name) = &server.name {
        fields.push(format!("\"name\":{}", quote(name)));
    }
    match &server.load {
        LoadField::Missing => {},
        LoadField::Number(n) if n.is_finite() => fields.push(format!("\"load\":{n}")),
        LoadField::Number(_) => fields.push("\"load\":null".to_string()),
        LoadField::Text(t) => fields.push(format!("\"load\":{}", quote(t))),
        LoadField::Percent(p) => fields.push(format!("\"load\":\"{p}%\"")),
    }
    format!("{{{}}}", fields.join(","))
}

fn servers_document(servers: &[ShapedServer], as_mapping: bool, wrapped: bool) -> String {
    let inner = if as_mapping {
        let entries: Vec<_> = servers
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let key = s.id.clone().unwrap_or_else(|| format!("k{i}"));
                format!("{}:{}", quote(&key), server_fields(s, false))
            })
            .collect();
        format!("{{{}}}", entries.join(","))
    } else {
        let entries: Vec<_> = servers.iter().map(|s| server_fields(s, true)).collect();
        format!("[{}]", entries.join(","))
    };
    if wrapped { format!("{{\"servers\":{inner}}}") } else { inner }
}

fn check_selection(servers: &[ServerDescriptor]) {
    let Some(chosen) = select_least_loaded(servers) else {
        assert!(servers.is_empty());
        return;
    };
    assert!(servers.iter().any(|s| s.id == chosen.id));
    if let Some(chosen_load) = chosen.load {
        for server in servers {
            if let Some(load) = server.load {
                assert!(chosen_load.value() <= load.value());
            }
        }
    } else {
        assert!(servers.iter().all(|s| s.load.is_none()));
    }
}

fn check_reply<T>(reply: &Reply<T>) {
    if let Reply::Rejected { message } = reply {
        assert!(!message.trim().is_empty());
    }
}

fuzz_target!(|input: FuzzInput| {
    match input {
        FuzzInput::Raw { endpoint, body } => match endpoint {
            Endpoint::Status => {
                let _ = parse_status(&body);
            },
            Endpoint::Servers => {
                if let Ok(servers) = parse_servers(&body) {
                    check_selection(&servers);
                }
            },
            Endpoint::Connect => {
                if let Ok(reply) = parse_connect(&body, "fuzz") {
                    check_reply(&reply);
                }
            },
            Endpoint::Disconnect => {
                if let Ok(reply) = parse_disconnect(&body) {
                    check_reply(&reply);
                }
            },
        },
        FuzzInput::Servers { servers, as_mapping, wrapped } => {
            let document = servers_document(&servers, as_mapping, wrapped);
            if let Ok(servers) = parse_servers(document.as_bytes()) {
                check_selection(&servers);
            }
        },
        FuzzInput::Ack { success, message, endpoint_is_connect } => {
            let mut fields = Vec::new();
            if let Some(success) = success {
                fields.push(format!("\"success\":{success}"));
            }
            if let Some(message) = &message {
                fields.push(format!("\"message\":{}", quote(message)));
            }
            let body = format!("{{{}}}", fields.join(","));
            if endpoint_is_connect {
                if let Ok(reply) = parse_connect(body.as_bytes(), "fuzz") {
                    check_reply(&reply);
                }
            } else if let Ok(reply) = parse_disconnect(body.as_bytes()) {
                check_reply(&reply);
            }
        },
    }
});
