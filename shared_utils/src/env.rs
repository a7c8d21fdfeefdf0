use std::path::PathBuf;

use thiserror::Error;

/// An environment variable required by the application is not set.
#[derive(Debug, Error)]
#[error("Missing environment variable: {0}")]
pub struct MissingEnvVarError(pub String);

/// Reads an environment variable, returning a structured error if it's missing.
///
/// Variables that are set but contain only whitespace are reported as
/// missing too, so `FOO= cargo run` behaves like an unset `FOO`.
///
/// # Arguments
/// * `name` - The name of the environment variable to read.
pub fn get_env_var(name: &str) -> Result<String, MissingEnvVarError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(MissingEnvVarError(name.to_string())),
    }
}

/// Optional flavor of [`get_env_var`] for settings that merely override a default.
pub fn env_var_opt(name: &str) -> Option<String> {
    get_env_var(name).ok()
}

/// Reads an optional environment variable as a filesystem path.
pub fn env_path_opt(name: &str) -> Option<PathBuf> {
    env_var_opt(name).map(PathBuf::from)
}
