//! Local file-backed implementation of the `ProvisioningBackend` port.
//!
//! Each stack's deployed state lives in one JSON file. Writes are atomic
//! (temp file + rename) and mutations of a backend instance are serialized
//! through a mutex. Physical identifiers are derived deterministically from
//! the target, stack and logical ID, so re-applying an unchanged graph
//! reports every resource as unchanged.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stackcraft_common::{
    DeploymentTarget, LogicalId, Resource, ResourceKind, ResourceProperties,
};
use tokio::sync::Mutex;

use crate::application::ports::{ApplyAction, DeployedResource, Materialized, ProvisioningBackend};
use crate::domain::fingerprint::sha256_hex;
use crate::domain::naming::RESOURCE_NAME_RE;

/// Environment variable overriding the state directory.
pub const STATE_DIR_ENV: &str = "STACKCRAFT_STATE_DIR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct StateEntry {
    id: LogicalId,
    kind: ResourceKind,
    physical_id: String,
    retained: bool,
    /// SHA-256 of the applied properties and resolved references.
    digest: String,
    /// Task definition revision; 0 for other kinds.
    #[serde(default)]
    revision: u32,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct StackState {
    #[serde(default)]
    resources: Vec<StateEntry>,
}

/// Provisioning backend that records deployed resources on disk.
pub struct LocalStateBackend {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl LocalStateBackend {
    /// Backend using `STACKCRAFT_STATE_DIR` or `~/.stackcraft/state`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self> {
        if let Ok(dir) = std::env::var(STATE_DIR_ENV) {
            return Ok(Self::with_dir(PathBuf::from(dir)));
        }
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
        Ok(Self::with_dir(home.join(".stackcraft").join("state")))
    }

    /// Backend rooted at an explicit directory (used in tests).
    #[must_use]
    pub fn with_dir(dir: PathBuf) -> Self {
        Self {
            dir,
            lock: Mutex::new(()),
        }
    }

    fn state_path(&self, stack: &str) -> Result<PathBuf> {
        if !RESOURCE_NAME_RE.is_match(stack) {
            anyhow::bail!("invalid stack name '{stack}'");
        }
        Ok(self.dir.join(format!("{stack}.json")))
    }

    async fn load(&self, stack: &str) -> Result<StackState> {
        let path = self.state_path(stack)?;
        tokio::task::spawn_blocking(move || load_sync(&path))
            .await
            .context("state load task panicked")?
    }

    async fn save(&self, stack: &str, state: StackState) -> Result<()> {
        let path = self.state_path(stack)?;
        tokio::task::spawn_blocking(move || save_sync(&path, &state))
            .await
            .context("state save task panicked")?
    }
}

fn load_sync(path: &std::path::Path) -> Result<StackState> {
    if !path.exists() {
        return Ok(StackState::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading state file {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing state file {}", path.display()))
}

fn save_sync(path: &std::path::Path, state: &StackState) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    let content = serde_json::to_string_pretty(state).context("serializing state")?;

    let temp_path = path.with_extension("json.tmp");
    std::fs::write(&temp_path, &content)
        .with_context(|| format!("writing temp file {}", temp_path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&temp_path, std::fs::Permissions::from_mode(0o600))
            .with_context(|| format!("setting permissions on {}", temp_path.display()))?;
    }

    std::fs::rename(&temp_path, path)
        .with_context(|| format!("finalizing state file {}", path.display()))?;
    Ok(())
}

/// Short deterministic suffix for generated identifiers.
fn suffix(target: &DeploymentTarget, stack: &str, id: &LogicalId, len: usize) -> String {
    let seed = format!("{}/{}/{stack}/{id}", target.account, target.region);
    sha256_hex(seed.as_bytes())[..len].to_string()
}

/// Resolved physical ID of `target`, or an error naming the missing link.
fn resolved_ref<'a>(
    resolved: &'a BTreeMap<LogicalId, String>,
    owner: &LogicalId,
    target: &LogicalId,
) -> Result<&'a str> {
    resolved
        .get(target)
        .map(String::as_str)
        .with_context(|| format!("{owner} references {target}, which was not resolved"))
}

/// Provider-style identifier for `resource`.
fn physical_id(
    target: &DeploymentTarget,
    stack: &str,
    resource: &Resource,
    resolved: &BTreeMap<LogicalId, String>,
    revision: u32,
) -> Result<String> {
    let DeploymentTarget { account, region } = target;
    let hash = |len| suffix(target, stack, &resource.id, len);
    let id = match &resource.properties {
        ResourceProperties::Network(_) => format!("vpc-{}", hash(17)),
        ResourceProperties::SecurityGroup(_) => format!("sg-{}", hash(17)),
        ResourceProperties::ImageRegistry(p) => {
            format!("arn:aws:ecr:{region}:{account}:repository/{}", p.name)
        }
        ResourceProperties::DeployPrincipal(p) => format!("arn:aws:iam::{account}:user/{}", p.name),
        ResourceProperties::ExecutionRole(p) => format!("arn:aws:iam::{account}:role/{}", p.name),
        ResourceProperties::AccessGrant(p) => format!("arn:aws:iam::{account}:policy/{}", p.name),
        ResourceProperties::ComputeCluster(p) => {
            format!("arn:aws:ecs:{region}:{account}:cluster/{}", p.name)
        }
        ResourceProperties::WorkloadDefinition(p) => format!(
            "arn:aws:ecs:{region}:{account}:task-definition/{}:{revision}",
            p.family
        ),
        ResourceProperties::Service(p) => {
            let cluster = resolved_ref(resolved, &resource.id, &p.cluster.target)?;
            let cluster_name = cluster.rsplit('/').next().unwrap_or(cluster);
            format!("arn:aws:ecs:{region}:{account}:service/{cluster_name}/{}", p.name)
        }
        ResourceProperties::LoadBalancer(p) => format!(
            "arn:aws:elasticloadbalancing:{region}:{account}:loadbalancer/app/{}/{}",
            p.name,
            hash(16)
        ),
        ResourceProperties::TargetGroup(p) => format!(
            "arn:aws:elasticloadbalancing:{region}:{account}:targetgroup/{}/{}",
            p.name,
            hash(16)
        ),
        ResourceProperties::Listener(p) => {
            let balancer = resolved_ref(resolved, &resource.id, &p.load_balancer.target)?;
            let path = balancer
                .split_once(":loadbalancer/")
                .map_or(balancer, |(_, path)| path);
            format!(
                "arn:aws:elasticloadbalancing:{region}:{account}:listener/{path}/{}",
                hash(16)
            )
        }
    };
    Ok(id)
}

impl ProvisioningBackend for LocalStateBackend {
    async fn upsert(
        &self,
        target: &DeploymentTarget,
        stack: &str,
        resource: &Resource,
        resolved: &BTreeMap<LogicalId, String>,
    ) -> Result<Materialized> {
        for reference in resource.properties.references() {
            resolved_ref(resolved, &resource.id, &reference.target)?;
        }
        // Digest covers the target: a new account or region is an update.
        let applied = serde_json::to_vec(&(target, &resource.properties, resolved))
            .context("serializing resource properties")?;
        let digest = sha256_hex(&applied);

        let _guard = self.lock.lock().await;
        let mut state = self.load(stack).await?;
        let existing = state.resources.iter().position(|e| e.id == resource.id);
        let is_workload = resource.kind() == ResourceKind::WorkloadDefinition;

        let (action, revision) = match existing.map(|i| &state.resources[i]) {
            None => (ApplyAction::Created, u32::from(is_workload)),
            Some(entry) if entry.digest == digest && entry.retained == resource.is_retained() => {
                (ApplyAction::Unchanged, entry.revision)
            }
            Some(entry) if is_workload && entry.digest != digest => {
                (ApplyAction::Updated, entry.revision + 1)
            }
            Some(entry) => (ApplyAction::Updated, entry.revision),
        };
        let physical_id = physical_id(target, stack, resource, resolved, revision)?;

        if action != ApplyAction::Unchanged {
            let entry = StateEntry {
                id: resource.id.clone(),
                kind: resource.kind(),
                physical_id: physical_id.clone(),
                retained: resource.is_retained(),
                digest,
                revision,
                updated_at: Utc::now(),
            };
            match existing {
                Some(i) => state.resources[i] = entry,
                None => state.resources.push(entry),
            }
            self.save(stack, state).await?;
        }
        Ok(Materialized {
            physical_id,
            action,
        })
    }

    async fn delete(&self, stack: &str, id: &LogicalId) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut state = self.load(stack).await?;
        let before = state.resources.len();
        state.resources.retain(|e| &e.id != id);
        if state.resources.len() != before {
            self.save(stack, state).await?;
        }
        Ok(())
    }

    async fn list(&self, stack: &str) -> Result<Vec<DeployedResource>> {
        let state = self.load(stack).await?;
        Ok(state
            .resources
            .into_iter()
            .map(|e| DeployedResource {
                id: e.id,
                kind: e.kind,
                physical_id: e.physical_id,
                retained: e.retained,
            })
            .collect())
    }
}
