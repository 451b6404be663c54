//! Client-side chat state: session identity, request lifecycle, the message
//! exchange controller, the first-run tutorial, and connectivity.
//!
//! SYSTEM CONTEXT
//! ==============
//! None of these modules render anything. They hold the state a chat UI reads
//! and expose the operations its controls trigger.

pub mod connectivity;
pub mod exchange;
pub mod lifecycle;
pub mod session;
pub mod tutorial;

#[cfg(test)]
pub(crate) mod test_helpers {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use tokio::sync::Notify;

    use super::session::IdGenerator;
    use crate::net::api::ChatApi;
    use crate::net::types::{Message, TransportError, UploadAck, UploadFile, User};

    pub fn user(id: &str) -> User {
        User { id: id.to_owned(), name: format!("User {id}") }
    }

    pub fn message(id: i64, content: &str, session_id: &str) -> Message {
        Message { id, content: content.to_owned(), is_bot: false, session_id: session_id.to_owned(), timestamp: None }
    }

    /// Deterministic id source: `{prefix}1`, `{prefix}2`, ...
    #[derive(Clone)]
    pub struct SequentialIds {
        prefix: String,
        issued: Arc<AtomicUsize>,
    }

    impl SequentialIds {
        pub fn new(prefix: &str) -> Self {
            Self { prefix: prefix.to_owned(), issued: Arc::new(AtomicUsize::new(0)) }
        }

        pub fn generator(&self) -> IdGenerator {
            let this = self.clone();
            Box::new(move || {
                let n = this.issued.fetch_add(1, Ordering::SeqCst) + 1;
                format!("{}{n}", this.prefix)
            })
        }

        pub fn issued(&self) -> usize {
            self.issued.load(Ordering::SeqCst)
        }
    }

    /// In-memory chat server. Sends append to the session's history; each call
    /// is logged in order so tests can assert sequencing.
    #[derive(Default)]
    pub struct MockApi {
        histories: Mutex<HashMap<String, Vec<Message>>>,
        uploads: Mutex<Vec<(String, String)>>,
        calls: Mutex<Vec<String>>,
        next_id: AtomicUsize,
        pub fail_fetch: AtomicBool,
        pub fail_send: AtomicBool,
        pub fail_upload: AtomicBool,
        send_gate: Mutex<Option<Arc<Notify>>>,
        fetch_gate: Mutex<Option<Arc<Notify>>>,
    }

    impl MockApi {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn seed(&self, session_id: &str, messages: Vec<Message>) {
            self.histories.lock().unwrap().insert(session_id.to_owned(), messages);
        }

        /// Make sends park until the returned handle is notified.
        pub fn gate_sends(&self) -> Arc<Notify> {
            let gate = Arc::new(Notify::new());
            *self.send_gate.lock().unwrap() = Some(gate.clone());
            gate
        }

        /// Make fetches park until the returned handle is notified.
        pub fn gate_fetches(&self) -> Arc<Notify> {
            let gate = Arc::new(Notify::new());
            *self.fetch_gate.lock().unwrap() = Some(gate.clone());
            gate
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        pub fn count(&self, prefix: &str) -> usize {
            self.calls.lock().unwrap().iter().filter(|c| c.starts_with(prefix)).count()
        }

        pub fn uploads(&self) -> Vec<(String, String)> {
            self.uploads.lock().unwrap().clone()
        }

        fn log(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    fn unavailable() -> TransportError {
        TransportError::Status { status: 503, body: "unavailable".to_owned() }
    }

    #[async_trait::async_trait]
    impl ChatApi for MockApi {
        async fn fetch_messages(&self, session_id: &str) -> Result<Vec<Message>, TransportError> {
            self.log(format!("fetch:{session_id}"));
            let gate = self.fetch_gate.lock().unwrap().clone();
            if let Some(gate) = gate {
                gate.notified().await;
            }
            if self.fail_fetch.load(Ordering::SeqCst) {
                return Err(unavailable());
            }
            Ok(self.histories.lock().unwrap().get(session_id).cloned().unwrap_or_default())
        }

        async fn send_message(&self, content: &str, session_id: &str) -> Result<Message, TransportError> {
            self.log(format!("send:{session_id}:{content}"));
            let gate = self.send_gate.lock().unwrap().clone();
            if let Some(gate) = gate {
                gate.notified().await;
            }
            if self.fail_send.load(Ordering::SeqCst) {
                return Err(unavailable());
            }
            let id = i64::try_from(self.next_id.fetch_add(1, Ordering::SeqCst) + 1).unwrap();
            let msg = message(id, content, session_id);
            self.histories
                .lock()
                .unwrap()
                .entry(session_id.to_owned())
                .or_default()
                .push(msg.clone());
            Ok(msg)
        }

        async fn upload_file(&self, file: &UploadFile, session_id: &str) -> Result<UploadAck, TransportError> {
            self.log(format!("upload:{session_id}:{}", file.file_name));
            if self.fail_upload.load(Ordering::SeqCst) {
                return Err(unavailable());
            }
            self.uploads
                .lock()
                .unwrap()
                .push((session_id.to_owned(), file.file_name.clone()));
            Ok(UploadAck(serde_json::json!({ "ok": true })))
        }
    }
}
