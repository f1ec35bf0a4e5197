use super::prompts;
use crate::output::Output;
use chrono::{DateTime, Utc};
use color_eyre::Result;
use comfy_table::{Attribute, Cell, Color, Table};
use reelscout_config::{CredentialStore, PathManager, StoredSession};
use reelscout_core::{AuthState, Session};
use serde_json::json;

/// Load the credential store and the auth state persisted in it.
pub fn restore_auth() -> Result<(CredentialStore, AuthState)> {
    let path_manager = PathManager::default();
    let credentials_file = path_manager.credentials_file();
    let mut store = CredentialStore::new(credentials_file.clone());
    store.load().map_err(|e| {
        color_eyre::eyre::eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e)
    })?;
    let auth = AuthState::restore(store.session());
    Ok((store, auth))
}

fn persist(store: &mut CredentialStore, session: Option<&Session>) -> Result<()> {
    match session {
        Some(session) => store.set_session(&StoredSession::from(session)),
        None => store.clear_session(),
    }
    store
        .save()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save credentials: {}", e))
}

pub fn run_login(user: Option<String>, token: Option<String>, output: &Output) -> Result<()> {
    let (mut store, auth) = restore_auth()?;
    if let Some(existing) = auth.session() {
        output.warn(format!("Replacing the session for {}", existing.user));
    }

    let user = match user {
        Some(u) => u,
        None => prompts::prompt_string("User name", None)?,
    };
    let token = match token {
        Some(t) => t,
        None => prompts::prompt_secret("Session token")?,
    };
    let (user, token) = (user.trim(), token.trim());
    if user.is_empty() || token.is_empty() {
        return Err(color_eyre::eyre::eyre!("User name and token are both required"));
    }

    let session = auth.login(user, token);
    persist(&mut store, Some(&session))?;
    output.success(format!("Logged in as {}", session.user));
    Ok(())
}

pub fn run_logout(output: &Output) -> Result<()> {
    let (mut store, auth) = restore_auth()?;
    match auth.logout() {
        Some(session) => {
            persist(&mut store, None)?;
            output.success(format!("Logged out {}", session.user));
        }
        None => output.info("Not logged in"),
    }
    Ok(())
}

/// Only available with a session; anything else gets "Access Denied".
pub fn run_dashboard(output: &Output) -> Result<()> {
    let (_, auth) = restore_auth()?;
    let Some(session) = auth.session() else {
        return Err(color_eyre::eyre::eyre!(
            "Access Denied: log in with 'reelscout login' to view the dashboard"
        ));
    };

    let now = Utc::now();
    if !output.is_human() {
        output.json(&json!({
            "type": "dashboard",
            "user": session.user,
            "started_at": session.started_at.to_rfc3339(),
            "session_age": session_age(session.started_at, now),
        }));
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![Cell::new(format!("Welcome, {}", session.user))
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)]);
    table.add_row(vec![Cell::new("User"), Cell::new(&session.user)]);
    table.add_row(vec![
        Cell::new("Signed in"),
        Cell::new(session.started_at.format("%Y-%m-%d %H:%M UTC")),
    ]);
    table.add_row(vec![Cell::new("Session age"), Cell::new(session_age(session.started_at, now))]);
    table.add_row(vec![Cell::new("Token"), Cell::new(super::config::mask_string(&session.token))]);
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    output.println(table.to_string());
    Ok(())
}

fn session_age(started_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let age = now.signed_duration_since(started_at);
    if age.num_days() > 0 {
        format!("{}d {}h", age.num_days(), age.num_hours() % 24)
    } else if age.num_hours() > 0 {
        format!("{}h {}m", age.num_hours(), age.num_minutes() % 60)
    } else {
        format!("{}m", age.num_minutes().max(0))
    }
}
