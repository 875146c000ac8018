//! Value parsers for CLI arguments clap cannot check on its own.

use std::fs;
use std::net::IpAddr;
use std::path::PathBuf;

const MAX_HOSTNAME_LEN: usize = 253;
const MAX_ROLLBACK_STEPS: u32 = 100;

/// Port must be 1-65535.
pub fn validate_port(port_str: &str) -> Result<u16, String> {
    let port: u16 = port_str.parse().map_err(|_| {
        format!("Port must be a valid number between 1 and 65535, got: '{port_str}'")
    })?;

    if port == 0 {
        return Err("Port must be between 1 and 65535. Port 0 is not allowed.".to_string());
    }

    Ok(port)
}

/// Config file must exist, be a regular file and be readable.
pub fn validate_config_file_path(path_str: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(format!("Configuration file does not exist: '{path_str}'"));
    }
    if !path.is_file() {
        return Err(format!("Configuration path is not a file: '{path_str}'"));
    }

    fs::File::open(&path)
        .map(|_| path)
        .map_err(|e| format!("Cannot read configuration file '{path_str}': {e}"))
}

pub fn validate_rollback_steps(steps_str: &str) -> Result<u32, String> {
    let steps: u32 = steps_str.parse().map_err(|_| {
        format!("Rollback steps must be a valid positive number, got: '{steps_str}'")
    })?;

    match steps {
        0 => Err("Rollback steps must be greater than 0".to_string()),
        s if s > MAX_ROLLBACK_STEPS => Err(format!(
            "Rollback steps cannot exceed {MAX_ROLLBACK_STEPS} for safety reasons"
        )),
        s => Ok(s),
    }
}

/// Accepts IP literals and plausible hostnames.
///
/// Dotted all-digit input must be a valid IPv4 address so that typos like
/// `999.1.1.1` are not mistaken for hostnames.
pub fn validate_host_address(host_str: &str) -> Result<String, String> {
    let host = host_str.trim();

    if host.is_empty() {
        return Err("Host address cannot be empty".to_string());
    }
    if host.chars().any(char::is_whitespace) {
        return Err("Host address cannot contain spaces".to_string());
    }
    if host.parse::<IpAddr>().is_ok() {
        return Ok(host.to_string());
    }
    if host.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(format!("Invalid IPv4 address format: '{host_str}'"));
    }
    if host.len() > MAX_HOSTNAME_LEN {
        return Err(format!(
            "Host address is too long (maximum {MAX_HOSTNAME_LEN} characters)"
        ));
    }

    Ok(host.to_string())
}
