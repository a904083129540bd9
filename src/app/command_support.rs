use crate::config::{load_global_settings, ClientSettings, ConfigError};
use crate::form::{GroupSettingsForm, ResourceTypeTemplate};
use crate::remote::ExtDirectClient;
use crate::shared::ids::RepositoryId;
use crate::shared::logging::LogSink;
use std::collections::BTreeMap;

pub fn map_config_err(err: ConfigError) -> String {
    err.to_string()
}

pub struct CommandContext {
    pub settings: ClientSettings,
    pub client: ExtDirectClient,
    pub log: LogSink,
}

impl CommandContext {
    pub fn from_settings(settings: ClientSettings) -> Self {
        let client = ExtDirectClient::from_settings(&settings);
        let log = settings
            .state_root
            .clone()
            .map(LogSink::new)
            .unwrap_or_default();
        Self {
            settings,
            client,
            log,
        }
    }

    pub fn new_form(&self, template: ResourceTypeTemplate) -> GroupSettingsForm {
        GroupSettingsForm::for_template(template, self.log.clone())
    }
}

pub fn load_context() -> Result<CommandContext, String> {
    let settings = load_global_settings().map_err(map_config_err)?;
    Ok(CommandContext::from_settings(settings))
}

/// Positional arguments plus `--flag value` pairs. Flags listed in `switches`
/// take no value and are recorded as `"true"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArgs {
    pub positional: Vec<String>,
    pub flags: BTreeMap<String, String>,
}

impl ParsedArgs {
    pub fn flag(&self, name: &str) -> Option<&str> {
        self.flags.get(name).map(String::as_str)
    }

    pub fn has_switch(&self, name: &str) -> bool {
        self.flags.contains_key(name)
    }
}

pub fn parse_args(args: &[String], switches: &[&str]) -> Result<ParsedArgs, String> {
    let mut parsed = ParsedArgs::default();
    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        if let Some(name) = arg.strip_prefix("--") {
            if switches.contains(&name) {
                parsed.flags.insert(name.to_string(), "true".to_string());
                i += 1;
                continue;
            }
            let value = args
                .get(i + 1)
                .ok_or_else(|| format!("--{name} requires a value"))?;
            if parsed.flags.insert(name.to_string(), value.clone()).is_some() {
                return Err(format!("--{name} given more than once"));
            }
            i += 2;
        } else {
            parsed.positional.push(arg.clone());
            i += 1;
        }
    }
    Ok(parsed)
}

pub fn parse_bool_flag(name: &str, raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" => Ok(true),
        "false" | "no" | "off" => Ok(false),
        _ => Err(format!("--{name} must be true or false")),
    }
}

pub fn required_template(parsed: &ParsedArgs) -> Result<ResourceTypeTemplate, String> {
    let raw = parsed
        .flag("format")
        .ok_or_else(|| "--format is required".to_string())?;
    ResourceTypeTemplate::parse(raw)
}

pub fn required_group_id(parsed: &ParsedArgs, usage: &str) -> Result<RepositoryId, String> {
    let raw = parsed
        .positional
        .first()
        .ok_or_else(|| format!("usage: {usage}"))?;
    RepositoryId::parse(raw)
}
