use std::io::IsTerminal;

use dialoguer::Password;

fn from_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn interactive(no_input: bool) -> bool {
    std::io::stdin().is_terminal() && !no_input
}

/// Prompt for a password, or read it from `env_var`.
pub fn prompt_password(env_var: &str, prompt: &str, no_input: bool) -> anyhow::Result<String> {
    if let Some(value) = from_env(env_var) {
        return Ok(value);
    }
    if !interactive(no_input) {
        return Err(anyhow::anyhow!(
            "No password provided and no TTY available. Set {}.",
            env_var
        ));
    }
    Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read password: {}", e))
}

/// Prompt for a new password with confirmation, or read `MOBILITY_NEW_PASSWORD`.
pub fn prompt_new_password(no_input: bool) -> anyhow::Result<String> {
    if let Some(value) = from_env("MOBILITY_NEW_PASSWORD") {
        return Ok(value);
    }
    if !interactive(no_input) {
        return Err(anyhow::anyhow!(
            "No new password provided and no TTY available. Set MOBILITY_NEW_PASSWORD."
        ));
    }
    Password::new()
        .with_prompt("New password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read password: {}", e))
}
