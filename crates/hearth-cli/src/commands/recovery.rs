//! `hearth recovery` - the recovery phrase.

use anyhow::bail;
use chrono::{DateTime, Utc};
use hearth_auth::{AuthError, Credentials};

use crate::theme::Theme;

/// Generate a new phrase, replacing the old one.
pub(crate) fn generate(
    creds: &Credentials,
    expires_at: Option<DateTime<Utc>>,
    uses: Option<i64>,
) -> anyhow::Result<()> {
    let phrase = match creds.recovery().generate(expires_at, uses) {
        Ok(phrase) => phrase,
        Err(AuthError::InvalidExpirationDate) => bail!("--expires-at must be in the future"),
        Err(AuthError::InvalidUsesLeft) => bail!("--uses must be at least 1"),
        Err(e) => return Err(e.into()),
    };

    println!("{}", Theme::success("Recovery phrase generated."));
    println!("\n  {}\n", Theme::secret(&phrase));
    if let Some(exp) = expires_at {
        println!("{}", Theme::kv("Expires", &Theme::timestamp(&exp)));
    }
    if let Some(n) = uses {
        println!("{}", Theme::kv("Uses", &n.to_string()));
    }
    println!(
        "{}",
        Theme::warning("Write the phrase down. Any previous phrase has stopped working.")
    );
    Ok(())
}

/// Show whether a phrase exists and can be used.
pub(crate) fn status(creds: &Credentials) -> anyhow::Result<()> {
    let status = creds.recovery().status()?;

    println!("\n{}", Theme::header("Recovery phrase"));
    if !status.exists {
        println!("{}", Theme::dimmed("  none generated"));
        println!();
        return Ok(());
    }
    println!(
        "{}",
        Theme::kv("Valid", if status.valid { "yes" } else { "no" })
    );
    if let Some(created) = status.created_at {
        println!("{}", Theme::kv("Created", &Theme::timestamp(&created)));
    }
    let expires = status
        .expires_at
        .map_or_else(|| "never".to_owned(), |t| Theme::timestamp(&t));
    println!("{}", Theme::kv("Expires", &expires));
    let uses = status
        .uses_left
        .map_or_else(|| "unlimited".to_owned(), |n| n.to_string());
    println!("{}", Theme::kv("Uses left", &uses));
    println!();
    Ok(())
}

/// Trade a phrase for a new device token.
pub(crate) fn redeem(creds: &Credentials, phrase: &str, device_name: &str) -> anyhow::Result<()> {
    let device = match creds.recovery().redeem(phrase, device_name) {
        Ok(device) => device,
        Err(AuthError::InvalidMnemonic(e)) => bail!("not a valid recovery phrase: {e}"),
        Err(AuthError::NotFound) => bail!("recovery phrase rejected"),
        Err(e) => return Err(e.into()),
    };

    println!("{}", Theme::success("Recovery phrase accepted."));
    println!("{}", Theme::kv("Name", &device.name));
    println!("{}", Theme::kv("Token", &Theme::secret(&device.secret)));
    Ok(())
}
