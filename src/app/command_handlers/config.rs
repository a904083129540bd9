use crate::app::command_support::map_config_err;
use crate::config::{
    default_global_config_path, load_global_settings, save_settings, ClientSettings,
};

fn render_settings(settings: &ClientSettings) -> String {
    let state_root = settings
        .state_root
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "none".to_string());
    format!(
        "base_url={}\nrequest_timeout_ms={}\nstate_root={state_root}",
        settings.base_url, settings.request_timeout_ms
    )
}

pub fn cmd_config(args: &[String]) -> Result<String, String> {
    match args.first().map(String::as_str) {
        None | Some("show") => {
            let settings = load_global_settings().map_err(map_config_err)?;
            Ok(render_settings(&settings))
        }
        Some("base-url") => {
            let url = args
                .get(1)
                .ok_or_else(|| "usage: config base-url <url>".to_string())?;
            let path = default_global_config_path().map_err(map_config_err)?;
            let mut settings = if path.exists() {
                ClientSettings::from_path(&path).map_err(map_config_err)?
            } else {
                ClientSettings::default()
            };
            settings.base_url = url.trim().to_string();
            let path = save_settings(&settings).map_err(map_config_err)?;
            Ok(format!(
                "saved {}\n{}",
                path.display(),
                render_settings(&settings)
            ))
        }
        Some(other) => Err(format!(
            "unknown config subcommand `{other}`; expected `show` or `base-url <url>`"
        )),
    }
}
