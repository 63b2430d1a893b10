use clap::{Parser, crate_version};

/// Switches an AWS EC2 instance on or off through its ssh host alias.
///
/// The alias must have a `Host` block in the ssh config carrying
/// `SetEnv ssh_switch_aws_*` annotations naming the account, region and
/// instance id of the machine it connects to.
#[derive(Parser, Clone)]
#[clap(version = crate_version!())]
pub struct Args {
    /// What to do with the instance.
    #[arg(value_enum)]
    pub action: Action,

    /// Host alias of the instance, as named by a `Host` block in the ssh config.
    pub host: String,

    /// Path to the ssh config file containing the host block.
    #[clap(long, default_value = "~/.ssh/config")]
    pub ssh_config_filepath: String,
}

#[derive(clap::ValueEnum, Clone, Copy)]
pub enum Action {
    /// Power the instance on and wait until it is running.
    On,
    /// Power the instance off and wait until it is stopped.
    Off,
    /// Report the current state of the instance without changing it.
    Status,
}
