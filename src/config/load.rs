use super::{default_global_config_path, default_state_root_path, ClientSettings, ConfigError};

pub const BASE_URL_ENV: &str = "NXGROUP_BASE_URL";

/// Loads `~/.nxgroup/config.yaml`, falling back to defaults when the file is
/// absent, then applies the base url environment override.
pub fn load_global_settings() -> Result<ClientSettings, ConfigError> {
    let path = default_global_config_path()?;
    let mut settings = if path.exists() {
        ClientSettings::from_path(&path)?
    } else {
        ClientSettings::default()
    };
    if let Some(base_url) = std::env::var(BASE_URL_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
    {
        settings.base_url = base_url;
    }
    if settings.state_root.is_none() {
        settings.state_root = Some(default_state_root_path()?);
    }
    settings.validate()?;
    Ok(settings)
}
