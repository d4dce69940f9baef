// SPDX-FileCopyrightText: 2026 Arscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `arscan login`, `signup`, `whoami` and `logout` command implementations.
//!
//! Passwords come from `ARSCAN_PASSWORD` when set (for scripts), otherwise
//! from an interactive prompt.

use arscan_core::{ArscanError, User};
use colored::Colorize;
use tracing::{debug, warn};

use crate::context::AppContext;

/// Environment variable consulted before prompting for a password.
pub const PASSWORD_ENV_VAR: &str = "ARSCAN_PASSWORD";

fn read_password(prompt: &str) -> Result<String, ArscanError> {
    if let Ok(password) = std::env::var(PASSWORD_ENV_VAR)
        && !password.is_empty()
    {
        debug!("password read from {PASSWORD_ENV_VAR}");
        return Ok(password);
    }

    eprint!("{prompt}");
    let password = rpassword::read_password()
        .map_err(|e| ArscanError::Internal(format!("failed to read password: {e}")))?;
    if password.is_empty() {
        return Err(ArscanError::Config("empty password not allowed".to_string()));
    }
    Ok(password)
}

fn print_user(user: &User) {
    println!(
        "{} {} <{}>",
        user.first_name.bold(),
        user.last_name.bold(),
        user.email
    );
    if let Some(phone) = &user.phone {
        println!("  phone: {phone}");
    }
}

/// Persist a signed-in session.
async fn remember(ctx: &AppContext, token: &str, user: &User) -> Result<(), ArscanError> {
    ctx.session.set_auth_token(token).await?;
    ctx.session.set_user(user).await?;
    ctx.api.set_token(Some(token.to_string()));
    Ok(())
}

/// Run `arscan login --email <EMAIL>`.
pub async fn run_login(ctx: &AppContext, email: &str) -> Result<(), ArscanError> {
    let password = read_password("Password: ")?;
    let response = ctx.api.login(email, &password).await?;
    remember(ctx, &response.token, &response.user).await?;
    println!("{} logged in", "✓".green());
    print_user(&response.user);
    Ok(())
}

/// Run `arscan signup`.
pub async fn run_signup(
    ctx: &AppContext,
    email: &str,
    first_name: &str,
    last_name: &str,
) -> Result<(), ArscanError> {
    let password = read_password("Choose a password: ")?;
    let response = ctx
        .api
        .signup(email, &password, first_name, last_name)
        .await?;
    match &response.token {
        Some(token) => remember(ctx, token, &response.user).await?,
        None => debug!("signup returned no token; login required"),
    }
    println!("{} {}", "✓".green(), response.message);
    print_user(&response.user);
    Ok(())
}

/// Run `arscan whoami [--refresh]`.
///
/// The stored user wins unless `refresh` is set; then the backend is asked
/// and the stored user is the fallback when it cannot be reached.
pub async fn run_whoami(ctx: &AppContext, refresh: bool) -> Result<(), ArscanError> {
    let stored = ctx.session.user().await?;
    if let Some(user) = &stored
        && !refresh
    {
        print_user(user);
        return Ok(());
    }

    if ctx.session.auth_token().await?.is_none() {
        return Err(ArscanError::Api {
            status: None,
            message: "not logged in".to_string(),
        });
    }

    match ctx.api.current_user().await {
        Ok(user) => {
            ctx.session.set_user(&user).await?;
            print_user(&user);
            Ok(())
        }
        Err(e) => match stored {
            Some(user) => {
                warn!(error = %e, "could not refresh user, showing stored copy");
                print_user(&user);
                Ok(())
            }
            None => Err(e),
        },
    }
}

/// Run `arscan logout`. Cached markers are kept.
pub async fn run_logout(ctx: &AppContext) -> Result<(), ArscanError> {
    ctx.session.clear_all().await?;
    ctx.api.set_token(None);
    println!("{} logged out", "✓".green());
    Ok(())
}
