use crate::error::SwitchError;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Prefix shared by every annotation this tool reads from the ssh config.
pub const ANNOTATION_PREFIX: &str = "ssh_switch_aws_";

/// The AWS coordinates of the instance behind an ssh host alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceCoordinates {
    pub account_id: String,
    pub region: String,
    pub instance_id: String,
}

impl InstanceCoordinates {
    /// Reads the coordinates of `host` out of the ssh config at `filepath`.
    ///
    /// The values are carried as `SetEnv ssh_switch_aws_*=value` lines inside
    /// the `Host` block for the alias. ssh itself ignores them unless the
    /// server opts in to accepting those variables, so they are safe to keep
    /// in a config that is also used for plain ssh connections.
    pub fn from_ssh_config(host: &str, filepath: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(expand_home(filepath))
            .with_context(|| format!("Couldn't read the ssh config file {filepath}"))?;
        Self::from_contents(host, filepath, &contents)
    }

    fn from_contents(host: &str, filepath: &str, contents: &str) -> Result<Self> {
        let mut in_matching_block = false;
        let mut account_id = None;
        let mut region = None;
        let mut instance_id = None;
        for line in contents.lines() {
            let line = line.trim();
            if let Some(alias) = line.strip_prefix("Host ") {
                in_matching_block = alias == host;
            } else if in_matching_block {
                if let Some(value) = annotation_value(line, "account_id") {
                    account_id = Some(value.to_owned());
                } else if let Some(value) = annotation_value(line, "region") {
                    region = Some(value.to_owned());
                } else if let Some(value) = annotation_value(line, "ec2_instance_id") {
                    instance_id = Some(value.to_owned());
                }
            }
        }
        Ok(InstanceCoordinates {
            account_id: account_id
                .ok_or_else(|| missing_annotation("account_id", host, filepath))?,
            region: region.ok_or_else(|| missing_annotation("region", host, filepath))?,
            instance_id: instance_id
                .ok_or_else(|| missing_annotation("ec2_instance_id", host, filepath))?,
        })
    }
}

fn annotation_value<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    line.strip_prefix("SetEnv ")?
        .strip_prefix(ANNOTATION_PREFIX)?
        .strip_prefix(key)?
        .strip_prefix('=')
}

fn missing_annotation(key: &str, host: &str, filepath: &str) -> anyhow::Error {
    SwitchError::MissingAnnotation {
        key: format!("{ANNOTATION_PREFIX}{key}"),
        host: host.to_owned(),
        filepath: filepath.to_owned(),
    }
    .into()
}

/// Expands a leading `~/` to the users home directory so the default
/// `~/.ssh/config` path works when the shell did not already expand it.
fn expand_home(filepath: &str) -> PathBuf {
    match (filepath.strip_prefix("~/"), std::env::var_os("HOME")) {
        (Some(rest), Some(home)) => Path::new(&home).join(rest),
        _ => PathBuf::from(filepath),
    }
}
