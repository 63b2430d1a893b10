use anyhow::Result;
use async_trait::async_trait;
use std::fmt;

pub mod aws;
#[cfg(test)]
pub mod stub;

/// The cloud calls this tool needs, kept narrow so tests can substitute a
/// scripted implementation.
#[async_trait]
pub trait CloudApi: Send + Sync {
    /// The account id the current credentials resolve to.
    async fn caller_account_id(&self) -> Result<String>;

    async fn instance_state(&self, instance_id: &str) -> Result<LifecycleState>;

    async fn start_instance(&self, instance_id: &str) -> Result<()>;

    async fn stop_instance(&self, instance_id: &str) -> Result<()>;
}

/// Lifecycle state of an EC2 instance as reported by DescribeInstances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleState {
    Pending,
    Running,
    ShuttingDown,
    Stopped,
    Stopping,
    Terminated,
    /// A state name this tool does not know about. EC2 can grow new states
    /// and an unknown name must still be reportable to the user.
    Other(String),
}

impl From<&str> for LifecycleState {
    fn from(name: &str) -> Self {
        match name {
            "pending" => LifecycleState::Pending,
            "running" => LifecycleState::Running,
            "shutting-down" => LifecycleState::ShuttingDown,
            "stopped" => LifecycleState::Stopped,
            "stopping" => LifecycleState::Stopping,
            "terminated" => LifecycleState::Terminated,
            other => LifecycleState::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Pending => "pending",
            LifecycleState::Running => "running",
            LifecycleState::ShuttingDown => "shutting-down",
            LifecycleState::Stopped => "stopped",
            LifecycleState::Stopping => "stopping",
            LifecycleState::Terminated => "terminated",
            LifecycleState::Other(name) => name,
        };
        write!(f, "{name}")
    }
}
