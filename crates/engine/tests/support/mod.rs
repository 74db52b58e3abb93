#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cma_api::{ApiRequest, Transport, TransportError};
use serde_json::{Value, json};

/// In-memory transport: answers from a queue and records every request.
#[derive(Default)]
pub struct RecordingTransport {
    responses: Mutex<VecDeque<Result<Value, TransportError>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, payload: Value) {
        self.responses.lock().expect("responses lock").push_back(Ok(payload));
    }

    pub fn fail(&self, status: u16, code: &str) {
        self.responses.lock().expect("responses lock").push_back(Err(TransportError::Status {
            status,
            code: Some(code.to_string()),
            message: format!("{code} from test transport"),
        }));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().expect("requests lock").len()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value, TransportError> {
        self.requests.lock().expect("requests lock").push(request);
        self.responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .unwrap_or_else(|| {
                Err(TransportError::Status {
                    status: 599,
                    code: Some("NoCannedResponse".into()),
                    message: "test transport ran out of responses".into(),
                })
            })
    }
}

pub fn link(link_type: &str, id: &str) -> Value {
    json!({ "sys": { "type": "Link", "linkType": link_type, "id": id } })
}

/// Server representation of an entry in space `abc`.
pub fn entry_payload(id: &str, version: u64, content_type: &str, fields: Value) -> Value {
    json!({
        "sys": {
            "id": id,
            "type": "Entry",
            "version": version,
            "createdAt": "2020-01-01T00:00:00.000Z",
            "updatedAt": "2020-01-01T00:00:00.000Z",
            "space": link("Space", "abc"),
            "contentType": link("ContentType", content_type)
        },
        "fields": fields
    })
}

pub fn page(total: u64, skip: u64, limit: u64, items: Vec<Value>) -> Value {
    json!({
        "sys": { "type": "Array" },
        "total": total,
        "skip": skip,
        "limit": limit,
        "items": items
    })
}

pub fn content_type_payload(id: &str, fields: Value) -> Value {
    json!({
        "sys": { "id": id, "type": "ContentType", "version": 1 },
        "name": id,
        "fields": fields
    })
}
