use thiserror::Error;

/// Failures the user can act on directly.
///
/// Anything else is reported through [`anyhow::Error`] with context attached
/// at the call site.
#[derive(Error, Debug)]
pub enum SwitchError {
    #[error(
        "Couldn't find {key} for {host} in {filepath}.\nAdd `SetEnv {key}=<fill-in-blank>` to the `Host {host}` block in {filepath}."
    )]
    MissingAnnotation {
        key: String,
        host: String,
        filepath: String,
    },

    #[error("Can't use the current AWS credentials due to an expired token. Refresh them and then retry.")]
    ExpiredToken,

    #[error("Current credentials are for a different account ({actual}). Update credentials to account {expected}.")]
    AccountMismatch { expected: String, actual: String },
}
