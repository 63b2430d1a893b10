use super::{CloudApi, LifecycleState};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A scripted [`CloudApi`] that records how it was called.
///
/// Each `instance_state` call pops the next scripted state, holding on the
/// final one so a poll loop always has something to observe.
pub struct RecordingCloud {
    account: String,
    states: Mutex<VecDeque<LifecycleState>>,
    pub identity_calls: AtomicUsize,
    pub describe_calls: AtomicUsize,
    pub start_calls: AtomicUsize,
    pub stop_calls: AtomicUsize,
}

impl RecordingCloud {
    pub fn new(account: &str, states: &[LifecycleState]) -> Self {
        RecordingCloud {
            account: account.to_owned(),
            states: Mutex::new(states.iter().cloned().collect()),
            identity_calls: AtomicUsize::new(0),
            describe_calls: AtomicUsize::new(0),
            start_calls: AtomicUsize::new(0),
            stop_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CloudApi for RecordingCloud {
    async fn caller_account_id(&self) -> Result<String> {
        self.identity_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.account.clone())
    }

    async fn instance_state(&self, instance_id: &str) -> Result<LifecycleState> {
        self.describe_calls.fetch_add(1, Ordering::SeqCst);
        let mut states = self.states.lock().unwrap();
        match states.len() {
            0 => Err(anyhow!("no scripted state left for {instance_id}")),
            1 => Ok(states[0].clone()),
            _ => Ok(states.pop_front().unwrap()),
        }
    }

    async fn start_instance(&self, _instance_id: &str) -> Result<()> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn stop_instance(&self, _instance_id: &str) -> Result<()> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
