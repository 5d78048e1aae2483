//! `hearth devices` - manage device tokens.

use anyhow::{Context, bail};
use hearth_auth::{AuthError, Credentials};

use crate::theme::Theme;

/// List devices, marking the one holding `token`.
pub(crate) fn list(creds: &Credentials, token: Option<&str>) -> anyhow::Result<()> {
    let devices = creds.devices().list(token)?;

    println!("\n{}", Theme::header("Devices"));
    if devices.is_empty() {
        println!("{}", Theme::dimmed("  (none)"));
    }
    for device in &devices {
        let marker = if device.is_caller { " (this device)" } else { "" };
        println!(
            "  {:<24} {}{}",
            device.name,
            Theme::timestamp(&device.created_at),
            Theme::dimmed(marker)
        );
    }
    println!();
    Ok(())
}

/// Issue a token for a new device and print it once.
pub(crate) fn create(creds: &Credentials, name: &str) -> anyhow::Result<()> {
    let device = creds.devices().create(name)?;

    println!("{}", Theme::success("Device token created."));
    println!("{}", Theme::kv("Name", &device.name));
    println!("{}", Theme::kv("Token", &Theme::secret(&device.secret)));
    println!(
        "{}",
        Theme::warning("The token is shown only once. Store it on the device now.")
    );
    Ok(())
}

/// Delete a device by name.
pub(crate) fn delete(creds: &Credentials, name: &str, token: Option<&str>) -> anyhow::Result<()> {
    match creds.devices().delete(name, token.unwrap_or_default()) {
        Ok(()) => {
            println!("{}", Theme::success(&format!("Deleted device '{name}'.")));
            Ok(())
        },
        Err(AuthError::NotFound) => bail!("no device named '{name}'"),
        Err(AuthError::CannotDeleteCaller) => {
            bail!("refusing to delete '{name}': it holds the token you authenticated with")
        },
        Err(e) => Err(e.into()),
    }
}

/// Replace the caller's token.
pub(crate) fn rotate(creds: &Credentials, token: Option<&str>) -> anyhow::Result<()> {
    let token = token.context("rotating requires the current token (--token or HEARTH_TOKEN)")?;
    let name = creds.devices().name_of(token)?;
    let fresh = match creds.devices().rotate(token) {
        Ok(fresh) => fresh,
        Err(AuthError::NotFound) => bail!("the supplied token does not belong to any device"),
        Err(e) => return Err(e.into()),
    };

    println!("{}", Theme::success("Device token rotated."));
    if let Some(name) = name {
        println!("{}", Theme::kv("Name", &name));
    }
    println!("{}", Theme::kv("Token", &Theme::secret(&fresh)));
    println!("{}", Theme::info("The previous token no longer works."));
    Ok(())
}
