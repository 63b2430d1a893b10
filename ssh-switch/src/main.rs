use anyhow::Result;
use clap::Parser;
use cli::{Action, Args};
use cloud::aws::Aws;
use cloud::{CloudApi, LifecycleState};
use error::SwitchError;
use instance::Ec2Instance;
use ssh_config::InstanceCoordinates;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod cli;
mod cloud;
mod error;
mod instance;
mod ssh_config;

#[tokio::main]
async fn main() {
    // Needed to disable anyhow stacktraces by default
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0");
    }

    let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stdout());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(non_blocking)
        .init();

    let args = Args::parse();
    let code = match run(args).await {
        Ok(()) => 0,
        Err(err) => {
            tracing::error!("{:?}", err.context("Failed to switch the instance"));
            1
        }
    };

    // Ensure tracing is flushed by dropping before exiting
    std::mem::drop(guard);
    std::process::exit(code);
}

async fn run(args: Args) -> Result<()> {
    let coordinates = InstanceCoordinates::from_ssh_config(&args.host, &args.ssh_config_filepath)?;
    tracing::debug!("resolved {} to {coordinates:?}", args.host);

    let cloud = Arc::new(Aws::new(coordinates.region.clone()).await);
    execute(args.action, &args.host, &coordinates, cloud).await?;
    Ok(())
}

/// Runs `action` against the instance after checking the credentials belong
/// to the annotated account.
async fn execute(
    action: Action,
    host: &str,
    coordinates: &InstanceCoordinates,
    cloud: Arc<dyn CloudApi>,
) -> Result<LifecycleState> {
    let actual = cloud.caller_account_id().await?;
    if actual != coordinates.account_id {
        return Err(SwitchError::AccountMismatch {
            expected: coordinates.account_id.clone(),
            actual,
        }
        .into());
    }

    let instance = Ec2Instance::new(host, &coordinates.instance_id, cloud);
    match action {
        Action::Status => instance.status().await,
        Action::On => instance.power_on().await,
        Action::Off => instance.power_off().await,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::cloud::stub::RecordingCloud;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::Ordering;

    const CONFIG: &str = r#"
Host myhost
    HostName myhost.example.com
    SetEnv ssh_switch_aws_account_id=1111
    SetEnv ssh_switch_aws_region=us-east-1
    SetEnv ssh_switch_aws_ec2_instance_id=i-abc123
"#;

    #[tokio::test(start_paused = true)]
    async fn test_execute_on_from_ssh_config() {
        let filepath = std::env::temp_dir().join("ssh-switch-test-on");
        std::fs::write(&filepath, CONFIG).unwrap();
        let coordinates =
            InstanceCoordinates::from_ssh_config("myhost", filepath.to_str().unwrap()).unwrap();

        let cloud = Arc::new(RecordingCloud::new(
            "1111",
            &[
                LifecycleState::Stopped,
                LifecycleState::Pending,
                LifecycleState::Running,
            ],
        ));
        let state = execute(Action::On, "myhost", &coordinates, cloud.clone())
            .await
            .unwrap();

        assert_eq!(state, LifecycleState::Running);
        assert_eq!(cloud.identity_calls.load(Ordering::SeqCst), 1);
        assert_eq!(cloud.start_calls.load(Ordering::SeqCst), 1);
        assert_eq!(cloud.stop_calls.load(Ordering::SeqCst), 0);
        assert_eq!(cloud.describe_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_execute_rejects_wrong_account() {
        let coordinates = InstanceCoordinates {
            account_id: "1111".to_owned(),
            region: "us-east-1".to_owned(),
            instance_id: "i-abc123".to_owned(),
        };

        let cloud = Arc::new(RecordingCloud::new("2222", &[LifecycleState::Stopped]));
        let err = execute(Action::On, "myhost", &coordinates, cloud.clone())
            .await
            .unwrap_err();

        assert_eq!(
            format!("{err}"),
            "Current credentials are for a different account (2222). Update credentials to account 1111."
        );
        assert_eq!(cloud.identity_calls.load(Ordering::SeqCst), 1);
        assert_eq!(cloud.describe_calls.load(Ordering::SeqCst), 0);
        assert_eq!(cloud.start_calls.load(Ordering::SeqCst), 0);
        assert_eq!(cloud.stop_calls.load(Ordering::SeqCst), 0);
    }
}
