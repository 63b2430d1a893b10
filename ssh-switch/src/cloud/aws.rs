use super::{CloudApi, LifecycleState};
use crate::error::SwitchError;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_config::{meta::region::RegionProviderChain, BehaviorVersion};
use aws_sdk_ec2::config::Region;
use aws_sdk_ec2::Client as Ec2Client;
use aws_sdk_sts::error::ProvideErrorMetadata;
use aws_sdk_sts::Client as StsClient;

/// Cloud access backed by the real AWS APIs, scoped to a single region.
pub struct Aws {
    sts: StsClient,
    ec2: Ec2Client,
}

impl Aws {
    pub async fn new(region: String) -> Self {
        let config = sdk_config(region).await;
        Aws {
            sts: StsClient::new(&config),
            ec2: Ec2Client::new(&config),
        }
    }
}

async fn sdk_config(region: String) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(RegionProviderChain::first_try(Region::new(region)))
        .load()
        .await
}

#[async_trait]
impl CloudApi for Aws {
    async fn caller_account_id(&self) -> Result<String> {
        let identity = match self.sts.get_caller_identity().send().await {
            Ok(identity) => identity,
            Err(err) => {
                let err = err.into_service_error();
                if err.code().is_some_and(|code| code.contains("ExpiredToken")) {
                    return Err(SwitchError::ExpiredToken.into());
                }
                return Err(err.into());
            }
        };
        identity
            .account()
            .map(|account| account.to_owned())
            .ok_or_else(|| anyhow!("GetCallerIdentity returned no account id"))
    }

    async fn instance_state(&self, instance_id: &str) -> Result<LifecycleState> {
        let described = self
            .ec2
            .describe_instances()
            .instance_ids(instance_id)
            .send()
            .await?;
        described
            .reservations()
            .iter()
            .flat_map(|reservation| reservation.instances())
            .find_map(|instance| instance.state().and_then(|state| state.name()))
            .map(|name| LifecycleState::from(name.as_str()))
            .ok_or_else(|| anyhow!("DescribeInstances returned no state for {instance_id}"))
    }

    async fn start_instance(&self, instance_id: &str) -> Result<()> {
        let started = self
            .ec2
            .start_instances()
            .instance_ids(instance_id)
            .send()
            .await?;
        for change in started.starting_instances() {
            tracing::debug!(
                "instance {:?} {:?} -> {:?}",
                change.instance_id(),
                change.previous_state().and_then(|state| state.name()),
                change.current_state().and_then(|state| state.name()),
            );
        }
        Ok(())
    }

    async fn stop_instance(&self, instance_id: &str) -> Result<()> {
        let stopped = self
            .ec2
            .stop_instances()
            .instance_ids(instance_id)
            .send()
            .await?;
        for change in stopped.stopping_instances() {
            tracing::debug!(
                "instance {:?} {:?} -> {:?}",
                change.instance_id(),
                change.previous_state().and_then(|state| state.name()),
                change.current_state().and_then(|state| state.name()),
            );
        }
        Ok(())
    }
}
