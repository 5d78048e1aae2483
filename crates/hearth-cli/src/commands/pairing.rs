//! `hearth pairing` - one-shot secrets for enrolling new devices.

use anyhow::bail;
use hearth_auth::{AuthError, Credentials};

use crate::theme::Theme;

/// Issue a pairing secret.
pub(crate) fn create(creds: &Credentials) -> anyhow::Result<()> {
    let secret = creds.pairing().generate()?;
    let expires = creds.pairing().status()?;

    println!("{}", Theme::success("Pairing secret created."));
    println!("{}", Theme::kv("Secret", &Theme::secret(&secret)));
    if let Some(exp) = expires {
        println!("{}", Theme::kv("Expires", &Theme::timestamp(&exp)));
    }
    println!(
        "{}",
        Theme::info("It works once. Creating another replaces this one.")
    );
    Ok(())
}

/// Show whether a pairing secret is pending.
pub(crate) fn status(creds: &Credentials) -> anyhow::Result<()> {
    match creds.pairing().status()? {
        Some(exp) => println!(
            "{}",
            Theme::info(&format!(
                "Pairing secret pending until {}",
                Theme::timestamp(&exp)
            ))
        ),
        None => println!("{}", Theme::dimmed("No pairing secret pending.")),
    }
    Ok(())
}

/// Drop the pending pairing secret.
pub(crate) fn invalidate(creds: &Credentials) -> anyhow::Result<()> {
    creds.pairing().invalidate()?;
    println!("{}", Theme::success("Pairing secret invalidated."));
    Ok(())
}

/// Trade the pairing secret for a device token.
pub(crate) fn redeem(creds: &Credentials, secret: &str, device_name: &str) -> anyhow::Result<()> {
    let device = match creds.pairing().redeem(secret, device_name) {
        Ok(device) => device,
        Err(AuthError::NotFound) => bail!("pairing secret rejected"),
        Err(e) => return Err(e.into()),
    };

    println!("{}", Theme::success("Device paired."));
    println!("{}", Theme::kv("Name", &device.name));
    println!("{}", Theme::kv("Token", &Theme::secret(&device.secret)));
    Ok(())
}
