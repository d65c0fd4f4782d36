//! In-memory host for tests
//!
//! Inputs come from a map; outputs and log lines are recorded in order.

use std::collections::HashMap;

use parking_lot::Mutex;

use super::HostIo;
use crate::error::HostError;

#[derive(Debug, Default)]
pub struct MemoryHost {
    inputs: HashMap<String, String>,
    /// Every set_output call, in order (duplicates kept)
    writes: Mutex<Vec<(String, String)>>,
    logs: Mutex<Vec<String>>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_inputs<K, V>(inputs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            inputs: inputs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            ..Self::default()
        }
    }

    /// Last value written for `key`
    pub fn output(&self, key: &str) -> Option<String> {
        self.writes
            .lock()
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    /// Final output map
    pub fn outputs(&self) -> HashMap<String, String> {
        self.writes.lock().iter().cloned().collect()
    }

    /// Raw write log, including repeated keys
    pub fn writes(&self) -> Vec<(String, String)> {
        self.writes.lock().clone()
    }

    pub fn logs(&self) -> Vec<String> {
        self.logs.lock().clone()
    }
}

impl HostIo for MemoryHost {
    fn get_input(&self, key: &str) -> String {
        self.inputs.get(key).cloned().unwrap_or_default()
    }

    fn set_output(&self, key: &str, value: &str) -> Result<(), HostError> {
        self.writes.lock().push((key.to_string(), value.to_string()));
        Ok(())
    }

    fn set_outputs(&self, outputs: &[(&str, String)]) -> Result<(), HostError> {
        let mut writes = self.writes.lock();
        writes.extend(outputs.iter().map(|(k, v)| (k.to_string(), v.clone())));
        Ok(())
    }

    fn info(&self, message: &str) {
        self.logs.lock().push(message.to_string());
    }
}
