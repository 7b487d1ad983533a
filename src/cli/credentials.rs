use tabled::Table;

use crate::{
    management::Session,
    success,
    types::SettingTableRow,
    utils, warning,
};

pub async fn save_credentials(session: &mut Session, client_id: &str, client_secret: &str) {
    if client_id.trim().is_empty() || client_secret.trim().is_empty() {
        warning!("Please enter both Client ID and Client Secret.");
        return;
    }

    session
        .settings_mut()
        .set_credentials(client_id, client_secret);
    match session.settings().persist().await {
        Ok(()) => success!("Client ID and Secret saved (plaintext)."),
        Err(e) => warning!("Failed to save config: {}", e),
    }
}

pub async fn save_username(session: &mut Session, username: &str) {
    if username.trim().is_empty() {
        warning!("Please enter a Spotify username.");
        return;
    }

    session.settings_mut().set_username(username);
    match session.settings().persist().await {
        Ok(()) => success!("Username saved."),
        Err(e) => warning!("Failed to save config: {}", e),
    }
}

pub fn show_config(session: &Session) {
    let settings = session.settings().settings();
    let endpoints = session.endpoints();

    let or_unset = |v: &str| {
        if v.is_empty() {
            "(not set)".to_string()
        } else {
            v.to_string()
        }
    };

    let rows = vec![
        SettingTableRow {
            key: "Settings file".to_string(),
            value: session.settings().path().display().to_string(),
        },
        SettingTableRow {
            key: "Client ID".to_string(),
            value: or_unset(&settings.client_id),
        },
        SettingTableRow {
            key: "Client Secret".to_string(),
            value: or_unset(&utils::mask_secret(&settings.client_secret)),
        },
        SettingTableRow {
            key: "Last username".to_string(),
            value: or_unset(&settings.last_username),
        },
        SettingTableRow {
            key: "API URL".to_string(),
            value: endpoints.api_url.clone(),
        },
        SettingTableRow {
            key: "Token URL".to_string(),
            value: endpoints.token_url.clone(),
        },
    ];

    println!("{}", Table::new(rows));
}
