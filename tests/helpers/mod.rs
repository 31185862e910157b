#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use iris::backend::{BackendError, ComputeEngine, LanguageModel};
use iris::config::{Secrets, SecretsStatus};
use iris::conversation::Exchange;
use iris::notes::{NotesStore, NotionRecord, Recorder};
use iris::oracle::{Backends, Oracle};

/// Language model returning a fixed reply (or failing), counting calls and
/// remembering how much history each call saw.
#[derive(Default)]
pub struct MockLanguageModel {
    reply: Option<String>,
    pub calls: AtomicUsize,
    pub history_lens: Mutex<Vec<usize>>,
}

impl MockLanguageModel {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply.to_string()),
            ..Self::default()
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LanguageModel for MockLanguageModel {
    async fn complete(&self, _prompt: &str, history: &[Exchange]) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.history_lens.lock().unwrap().push(history.len());
        self.reply.clone().ok_or(BackendError::Rejected {
            service: "mock-llm",
            message: "model overloaded".into(),
        })
    }
}

/// Compute engine returning a fixed answer (or failing), counting calls.
#[derive(Default)]
pub struct MockCompute {
    answer: Option<String>,
    pub calls: AtomicUsize,
}

impl MockCompute {
    pub fn answering(answer: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: Some(answer.to_string()),
            ..Self::default()
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ComputeEngine for MockCompute {
    async fn query(&self, _input: &str) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer.clone().ok_or(BackendError::NoAnswer {
            service: "mock-compute",
        })
    }
}

/// Notes store capturing every page it is asked to create.
#[derive(Default)]
pub struct MockNotes {
    pub pages: Mutex<Vec<NotionRecord>>,
    pub fail: bool,
}

impl MockNotes {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    pub fn page_count(&self) -> usize {
        self.pages.lock().unwrap().len()
    }
}

#[async_trait]
impl NotesStore for MockNotes {
    async fn create_page(
        &self,
        _database_id: &str,
        record: &NotionRecord,
    ) -> Result<(), BackendError> {
        self.pages.lock().unwrap().push(record.clone());
        if self.fail {
            Err(BackendError::Rejected {
                service: "mock-notes",
                message: "database not shared with integration".into(),
            })
        } else {
            Ok(())
        }
    }
}

/// Secrets with every value present.
pub fn full_status() -> SecretsStatus {
    Secrets {
        openai_api_key: Some("sk-test".into()),
        wolfram_app_id: Some("APP".into()),
        notion_token: Some("secret".into()),
        notion_database_id: Some("db".into()),
    }
    .status()
}

/// A ready oracle over the given mocks, recording into `notes` under database "db".
pub fn oracle_with(
    llm: Arc<MockLanguageModel>,
    compute: Arc<MockCompute>,
    notes: Arc<MockNotes>,
) -> Oracle {
    Oracle::ready(
        Backends {
            language_model: llm,
            compute,
            recorder: Recorder::new(Some(notes), Some("db".into())),
        },
        full_status(),
    )
}
