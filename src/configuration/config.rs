#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::ArgMatches;
use clap::Command;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;
use tokio::fs;

use crate::domain::models::BackendName;
use crate::domain::models::Device;
use crate::domain::models::GenerationOptions;
use crate::domain::models::LoadOptions;
use crate::domain::models::Precision;

static CONFIG: Lazy<DashMap<String, String>> = Lazy::new(DashMap::new);

#[derive(Clone, Copy, Debug, Eq, PartialEq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ConfigKey {
    Backend,
    BackendHealthCheckTimeout,
    ConfigFile,
    Device,
    MaxNewTokens,
    Model,
    OllamaURL,
    OpenAiToken,
    OpenAiURL,
    Precision,
    SystemPrompt,
    UserRequest,
}

pub struct Config {}

impl Config {
    pub fn get(key: ConfigKey) -> String {
        if let Some(val) = CONFIG.get(&key.to_string()) {
            return val.to_string();
        }

        return "".to_string();
    }

    pub fn set(key: ConfigKey, value: &str) {
        CONFIG.insert(key.to_string(), value.to_string());
    }

    pub fn default(key: ConfigKey) -> String {
        let default_backend = BackendName::Ollama.to_string();
        let default_device = Device::Auto.to_string();
        let default_precision = LoadOptions::default().precision.to_string();
        let default_max_new_tokens = GenerationOptions::default().max_new_tokens.to_string();

        let config_path = dirs::config_dir()
            .unwrap_or_else(|| return path::PathBuf::from("."))
            .join("aleph/config.toml")
            .to_string_lossy()
            .to_string();

        let res = match key {
            ConfigKey::Backend => &default_backend,
            ConfigKey::BackendHealthCheckTimeout => "1000",
            ConfigKey::Device => &default_device,
            ConfigKey::MaxNewTokens => &default_max_new_tokens,
            ConfigKey::Model => "qwen2.5:0.5b-instruct",
            ConfigKey::OllamaURL => "http://localhost:11434",
            ConfigKey::OpenAiToken => "",
            ConfigKey::OpenAiURL => "http://localhost:8080",
            ConfigKey::Precision => &default_precision,
            ConfigKey::SystemPrompt => "You are a helpful assistant.",
            ConfigKey::UserRequest => "Tell me a funny joke.",

            // Special
            ConfigKey::ConfigFile => &config_path,
        };

        return res.to_string();
    }

    pub fn backend_name() -> Result<BackendName> {
        let name = Config::get(ConfigKey::Backend);
        if let Some(backend_name) = BackendName::parse(name.to_string()) {
            return Ok(backend_name);
        }

        bail!(format!("No backend named {name}"));
    }

    pub fn load_options() -> Result<LoadOptions> {
        let precision_str = Config::get(ConfigKey::Precision);
        let device_str = Config::get(ConfigKey::Device);

        let precision = match Precision::parse(precision_str.to_string()) {
            Some(precision) => precision,
            None => bail!(format!("Invalid precision: {precision_str}")),
        };

        let device = match Device::parse(device_str.to_string()) {
            Some(device) => device,
            None => bail!(format!("Invalid device: {device_str}")),
        };

        return Ok(LoadOptions { precision, device });
    }

    pub fn generation_options() -> Result<GenerationOptions> {
        let max_new_tokens = Config::get(ConfigKey::MaxNewTokens).parse::<u32>()?;
        return Ok(GenerationOptions { max_new_tokens });
    }

    pub async fn load(cmd: Command, clap_arg_matches: Vec<&ArgMatches>) -> Result<()> {
        for key in ConfigKey::iter() {
            Config::set(key, &Config::default(key))
        }

        let mut config_file = Config::default(ConfigKey::ConfigFile);
        for matches in clap_arg_matches.as_slice() {
            if let Ok(Some(arg_config_file)) =
                matches.try_get_one::<String>(&ConfigKey::ConfigFile.to_string())
            {
                config_file = arg_config_file.to_string();
            }
        }

        let config_path = path::PathBuf::from(config_file);
        if config_path.exists() {
            let toml_str = fs::read_to_string(config_path).await?;
            let doc = toml_str.parse::<toml_edit::Document>()?;

            for key in ConfigKey::iter() {
                if let Some(val) = doc.get(&key.to_string()) {
                    // Use clap value parsers to do validation.
                    let mut possible_values = vec![];
                    if let Some(arg) = cmd
                        .get_arguments()
                        .find(|e| return e.get_long() == Some(key.to_string().as_str()))
                    {
                        if !arg.get_possible_values().is_empty() {
                            possible_values = arg
                                .get_possible_values()
                                .iter()
                                .map(|e| return e.get_name().to_string())
                                .collect::<Vec<String>>();
                        }
                    }

                    if let Some(val_int) = val.as_integer() {
                        Config::set(key, &val_int.to_string());
                    } else if let Some(val_str) = val.as_str() {
                        if val_str.is_empty() {
                            continue;
                        }
                        if !possible_values.is_empty()
                            && !possible_values.contains(&val_str.to_string())
                        {
                            bail!(format!("config.toml has an invalid value for key '{key}': {val_str}\nPossible values are: {}", possible_values.join(", ")));
                        }
                        Config::set(key, val_str);
                    }
                }
            }
        }

        for key in ConfigKey::iter() {
            for matches in clap_arg_matches.as_slice() {
                if let Ok(Some(val)) = matches.try_get_one::<String>(&key.to_string()) {
                    if val.is_empty() {
                        continue;
                    }
                    Config::set(key, val)
                }
            }
        }

        tracing::debug!(
            backend = Config::get(ConfigKey::Backend),
            model = Config::get(ConfigKey::Model),
            precision = Config::get(ConfigKey::Precision),
            device = Config::get(ConfigKey::Device),
            max_new_tokens = Config::get(ConfigKey::MaxNewTokens),
            "config"
        );

        return Ok(());
    }

    pub fn serialize_default(cmd: Command) -> String {
        let toml_str = ConfigKey::iter()
            .filter_map(|key| {
                if key == ConfigKey::ConfigFile {
                    return None;
                }

                let arg = cmd
                    .get_arguments()
                    .find(|e| return e.get_long() == Some(key.to_string().as_str()))?;

                let mut description = arg
                    .get_help()
                    .map(|help| return help.to_string())
                    .unwrap_or_default();

                description = description
                    .split("[default:")
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_string();

                if !arg.get_possible_values().is_empty() {
                    let possible_values = arg
                        .get_possible_values()
                        .iter()
                        .map(|e| return e.get_name())
                        .collect::<Vec<_>>()
                        .join(", ");
                    description = format!("{description} [possible values: {}]", possible_values);
                }

                let mut val = Config::default(key);
                if val.is_empty() {
                    val = format!("# {key} = \"\"");
                } else if val.parse::<i32>().is_ok() {
                    val = format!("{key} = {val}");
                } else {
                    val = format!("{key} = \"{val}\"");
                }

                return Some(format!("# {description}\n{val}"));
            })
            .collect::<Vec<String>>()
            .join("\n\n");

        return toml_str;
    }
}
