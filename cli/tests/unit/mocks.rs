//! In-memory port implementations for unit tests.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Result;
use stackcraft_cli::application::ports::{
    ApplyAction, ConfigStore, DeployedResource, Materialized, ProgressReporter,
    ProvisioningBackend,
};
use stackcraft_cli::domain::config::StackConfig;
use stackcraft_common::{DeploymentTarget, LogicalId, Resource, ResourceRef};

/// One call the backend received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    Upsert(LogicalId),
    Delete(LogicalId),
}

#[derive(Debug, Clone)]
struct Tracked {
    resource: Resource,
    physical_id: String,
}

/// Provisioning backend that keeps deployed resources in memory and records
/// every call.
#[derive(Default)]
pub struct InMemoryBackend {
    stacks: Mutex<BTreeMap<String, Vec<Tracked>>>,
    calls: Mutex<Vec<BackendCall>>,
    /// Resolved maps handed to `upsert`, by logical ID.
    pub resolved: Mutex<BTreeMap<LogicalId, BTreeMap<LogicalId, String>>>,
    fail_on: Option<LogicalId>,
}

impl InMemoryBackend {
    pub fn failing_on(id: LogicalId) -> Self {
        Self {
            fail_on: Some(id),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn deployed_ids(&self, stack: &str) -> Vec<LogicalId> {
        self.stacks
            .lock()
            .unwrap()
            .get(stack)
            .map(|v| v.iter().map(|t| t.resource.id.clone()).collect())
            .unwrap_or_default()
    }
}

fn physical_id_for(resource: &Resource) -> String {
    format!("phys:{}", resource.id)
}

impl ProvisioningBackend for InMemoryBackend {
    async fn upsert(
        &self,
        _target: &DeploymentTarget,
        stack: &str,
        resource: &Resource,
        resolved: &BTreeMap<LogicalId, String>,
    ) -> Result<Materialized> {
        self.calls
            .lock()
            .unwrap()
            .push(BackendCall::Upsert(resource.id.clone()));
        if self.fail_on.as_ref() == Some(&resource.id) {
            anyhow::bail!("injected failure for {}", resource.id);
        }
        for ResourceRef { target, .. } in resource.properties.references() {
            anyhow::ensure!(resolved.contains_key(target), "unresolved reference {target}");
        }
        self.resolved
            .lock()
            .unwrap()
            .insert(resource.id.clone(), resolved.clone());

        let mut stacks = self.stacks.lock().unwrap();
        let tracked = stacks.entry(stack.to_string()).or_default();
        let physical_id = physical_id_for(resource);
        let action = match tracked.iter_mut().find(|t| t.resource.id == resource.id) {
            Some(existing) if existing.resource == *resource => ApplyAction::Unchanged,
            Some(existing) => {
                existing.resource = resource.clone();
                ApplyAction::Updated
            }
            None => {
                tracked.push(Tracked {
                    resource: resource.clone(),
                    physical_id: physical_id.clone(),
                });
                ApplyAction::Created
            }
        };
        Ok(Materialized {
            physical_id,
            action,
        })
    }

    async fn delete(&self, stack: &str, id: &LogicalId) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(BackendCall::Delete(id.clone()));
        if let Some(tracked) = self.stacks.lock().unwrap().get_mut(stack) {
            tracked.retain(|t| &t.resource.id != id);
        }
        Ok(())
    }

    async fn list(&self, stack: &str) -> Result<Vec<DeployedResource>> {
        Ok(self
            .stacks
            .lock()
            .unwrap()
            .get(stack)
            .map(|tracked| {
                tracked
                    .iter()
                    .map(|t| DeployedResource {
                        id: t.resource.id.clone(),
                        kind: t.resource.kind(),
                        physical_id: t.physical_id.clone(),
                        retained: t.resource.is_retained(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Reporter that records every message with its level.
#[derive(Default)]
pub struct RecordingReporter {
    pub events: RefCell<Vec<(&'static str, String)>>,
}

impl RecordingReporter {
    pub fn warnings(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter(|(level, _)| *level == "warn")
            .map(|(_, msg)| msg.clone())
            .collect()
    }

    pub fn last_success(&self) -> Option<String> {
        self.events
            .borrow()
            .iter()
            .rev()
            .find(|(level, _)| *level == "success")
            .map(|(_, msg)| msg.clone())
    }
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.events.borrow_mut().push(("step", message.to_string()));
    }

    fn success(&self, message: &str) {
        self.events
            .borrow_mut()
            .push(("success", message.to_string()));
    }

    fn warn(&self, message: &str) {
        self.events.borrow_mut().push(("warn", message.to_string()));
    }
}

/// Config store holding one config in memory.
#[derive(Default)]
pub struct InMemoryConfigStore {
    pub config: RefCell<Option<StackConfig>>,
}

impl ConfigStore for InMemoryConfigStore {
    fn load(&self) -> Result<StackConfig> {
        Ok(self.config.borrow().clone().unwrap_or_default())
    }

    fn save(&self, config: &StackConfig) -> Result<()> {
        *self.config.borrow_mut() = Some(config.clone());
        Ok(())
    }

    fn path(&self) -> Result<PathBuf> {
        Ok(PathBuf::from("memory://stackcraft.yaml"))
    }
}
