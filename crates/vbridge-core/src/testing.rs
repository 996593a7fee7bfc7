//! Fakes for the capability traits, shared by the unit tests.

use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use vbridge_model::{Envelope, StreamDescriptor};

use crate::{
    error::{QueueError, RegistryError},
    queue::WorkQueue,
    registry::StreamRegistry,
};

/// Queue that keeps every envelope, or refuses all of them.
#[derive(Default)]
pub struct RecordingQueue {
    sent: Mutex<Vec<Envelope>>,
    reject: Option<QueueError>,
}

impl RecordingQueue {
    pub fn rejecting(err: QueueError) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            reject: Some(err),
        }
    }

    pub fn envelopes(&self) -> Vec<Envelope> {
        self.sent.lock().unwrap().clone()
    }
}

impl WorkQueue for RecordingQueue {
    fn enqueue(&self, envelope: Envelope) -> Result<(), QueueError> {
        if let Some(err) = &self.reject {
            return Err(err.clone());
        }
        self.sent.lock().unwrap().push(envelope);
        Ok(())
    }
}

/// Registry counting its calls.
#[derive(Default)]
pub struct FakeRegistry {
    streams: Mutex<Vec<StreamDescriptor>>,
    created: Mutex<Vec<StreamDescriptor>>,
    list_calls: AtomicUsize,
    create_calls: AtomicUsize,
    create_error: Option<String>,
}

impl FakeRegistry {
    pub fn with_streams(streams: Vec<StreamDescriptor>) -> Self {
        Self {
            streams: Mutex::new(streams),
            ..Default::default()
        }
    }

    pub fn failing_create(reason: &str) -> Self {
        Self {
            create_error: Some(reason.to_string()),
            ..Default::default()
        }
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn created(&self) -> Vec<StreamDescriptor> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl StreamRegistry for FakeRegistry {
    async fn list_streams(&self) -> Result<Vec<StreamDescriptor>, RegistryError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.streams.lock().unwrap().clone())
    }

    async fn create_stream(
        &self,
        url: &str,
        description: &str,
    ) -> Result<StreamDescriptor, RegistryError> {
        let n = self.create_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = &self.create_error {
            return Err(RegistryError::Rejected(reason.clone()));
        }
        let stream = StreamDescriptor::new(format!("stream-{n}"), url, description);
        self.streams.lock().unwrap().push(stream.clone());
        self.created.lock().unwrap().push(stream.clone());
        Ok(stream)
    }
}
