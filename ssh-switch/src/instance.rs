use crate::cloud::{CloudApi, LifecycleState};
use anyhow::Result;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_secs(15);

/// One EC2 instance addressed through its ssh host alias.
pub struct Ec2Instance {
    host: String,
    instance_id: String,
    cloud: Arc<dyn CloudApi>,
}

impl Ec2Instance {
    pub fn new(host: &str, instance_id: &str, cloud: Arc<dyn CloudApi>) -> Self {
        Ec2Instance {
            host: host.to_owned(),
            instance_id: instance_id.to_owned(),
            cloud,
        }
    }

    /// Reports the current state without changing it.
    pub async fn status(&self) -> Result<LifecycleState> {
        let state = self.cloud.instance_state(&self.instance_id).await?;
        self.report(&state);
        Ok(state)
    }

    /// Starts the instance and waits until it is running.
    pub async fn power_on(&self) -> Result<LifecycleState> {
        let state = self.cloud.instance_state(&self.instance_id).await?;
        if state == LifecycleState::Running {
            self.report(&state);
            return Ok(state);
        }
        self.cloud.start_instance(&self.instance_id).await?;
        // Reported as "starting" rather than the EC2 state name "pending".
        self.report("starting");
        let state = self.wait_for(LifecycleState::Running).await?;
        self.report(&state);
        Ok(state)
    }

    /// Stops the instance and waits until it is stopped.
    pub async fn power_off(&self) -> Result<LifecycleState> {
        let state = self.cloud.instance_state(&self.instance_id).await?;
        if state == LifecycleState::Stopped {
            self.report(&state);
            return Ok(state);
        }
        self.cloud.stop_instance(&self.instance_id).await?;
        self.report("stopping");
        let state = self.wait_for(LifecycleState::Stopped).await?;
        self.report(&state);
        Ok(state)
    }

    /// Polls until the instance reaches `target`.
    ///
    /// There is deliberately no timeout. EC2 transitions can stall for a
    /// long time and the user can always interrupt the process.
    async fn wait_for(&self, target: LifecycleState) -> Result<LifecycleState> {
        loop {
            let state = self.cloud.instance_state(&self.instance_id).await?;
            if state == target {
                return Ok(state);
            }
            tracing::debug!("instance {} is {state}, waiting for {target}", self.instance_id);
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    fn report(&self, state: impl fmt::Display) {
        println!("State of {}: {state}", self.host);
    }
}
