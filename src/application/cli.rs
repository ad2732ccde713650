#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;

use std::io;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use yansi::Paint;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::BackendName;
use crate::domain::models::Device;
use crate::domain::models::Precision;
use crate::domain::services::actions::help_text;

pub enum RunMode {
    Chat,
    Generate,
    Exit,
}

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
    std::process::exit(0);
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut file = fs::File::create(&config_file_path).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
    return Ok(());
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn subcommand_debug() -> Command {
    return Command::new("debug")
        .about("Debug helpers for Aleph")
        .hide(true)
        .subcommand(
            Command::new("log-path").about("Output path to debug log file generated when running Aleph with environment variable RUST_LOG=aleph")
        )
        .subcommand(
            Command::new("enum-config").about("List all config keys as strings.")
        );
}

fn arg_backend() -> Arg {
    return Arg::new(ConfigKey::Backend.to_string())
        .short('b')
        .long(ConfigKey::Backend.to_string())
        .env("ALEPH_BACKEND")
        .num_args(1)
        .help(format!(
            "The backend hosting the model. [default: {}]",
            Config::default(ConfigKey::Backend)
        ))
        .value_parser(PossibleValuesParser::new(BackendName::VARIANTS))
        .global(true);
}

fn arg_backend_health_check_timeout() -> Arg {
    return Arg::new(ConfigKey::BackendHealthCheckTimeout.to_string())
        .long(ConfigKey::BackendHealthCheckTimeout.to_string())
        .env("ALEPH_BACKEND_HEALTH_CHECK_TIMEOUT")
        .num_args(1)
        .help(
            format!("Time to wait in milliseconds before timing out when doing a healthcheck for a backend. [default: {}]", Config::default(ConfigKey::BackendHealthCheckTimeout)),
        )
        .global(true);
}

fn arg_model() -> Arg {
    return Arg::new(ConfigKey::Model.to_string())
        .short('m')
        .long(ConfigKey::Model.to_string())
        .env("ALEPH_MODEL")
        .num_args(1)
        .help(format!(
            "Model identifier to load from the backend. [default: {}]",
            Config::default(ConfigKey::Model)
        ))
        .global(true);
}

fn arg_precision() -> Arg {
    return Arg::new(ConfigKey::Precision.to_string())
        .short('p')
        .long(ConfigKey::Precision.to_string())
        .env("ALEPH_PRECISION")
        .num_args(1)
        .help(format!(
            "Expected quantization of the model weights. Loading fails when the model does not match. [default: {}]",
            Config::default(ConfigKey::Precision)
        ))
        .value_parser(PossibleValuesParser::new(Precision::VARIANTS))
        .global(true);
}

fn arg_device() -> Arg {
    return Arg::new(ConfigKey::Device.to_string())
        .short('d')
        .long(ConfigKey::Device.to_string())
        .env("ALEPH_DEVICE")
        .num_args(1)
        .help(format!(
            "Device the model should run on. [default: {}]",
            Config::default(ConfigKey::Device)
        ))
        .value_parser(PossibleValuesParser::new(Device::VARIANTS))
        .global(true);
}

fn arg_max_new_tokens() -> Arg {
    return Arg::new(ConfigKey::MaxNewTokens.to_string())
        .long(ConfigKey::MaxNewTokens.to_string())
        .env("ALEPH_MAX_NEW_TOKENS")
        .num_args(1)
        .help(format!(
            "Maximum number of new tokens to generate per response. [default: {}]",
            Config::default(ConfigKey::MaxNewTokens)
        ))
        .global(true);
}

fn arg_system_prompt() -> Arg {
    return Arg::new(ConfigKey::SystemPrompt.to_string())
        .long(ConfigKey::SystemPrompt.to_string())
        .env("ALEPH_SYSTEM_PROMPT")
        .num_args(1)
        .help(format!(
            "Initial system prompt. [default: {}]",
            Config::default(ConfigKey::SystemPrompt)
        ))
        .global(true);
}

fn arg_user_request() -> Arg {
    return Arg::new(ConfigKey::UserRequest.to_string())
        .long(ConfigKey::UserRequest.to_string())
        .env("ALEPH_USER_REQUEST")
        .num_args(1)
        .help(format!(
            "Initial user request. [default: {}]",
            Config::default(ConfigKey::UserRequest)
        ))
        .global(true);
}

pub fn build() -> Command {
    let hotkeys_text = help_text()
        .split('\n')
        .map(|line| {
            if line.starts_with('-') {
                return format!("  {line}");
            }
            if line.starts_with("HOTKEYS:") {
                return Paint::new(format!("CHAT {line}"))
                    .underline()
                    .bold()
                    .to_string();
            }
            return line.to_string();
        })
        .collect::<Vec<String>>()
        .join("\n");

    let about = format!(
        "{}\n\nVersion: {}\nCommit: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    );

    return Command::new("aleph")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(hotkeys_text)
        .arg_required_else_help(false)
        .subcommand(Command::new("chat").about("Open the prompt editor and generate interactively."))
        .subcommand(Command::new("generate").about("Generate a single response from the configured prompts and print it to stdout."))
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(subcommand_debug())
        .subcommand(Command::new("manpages").about("Generates manpages and outputs to stdout."))
        .arg(arg_backend())
        .arg(arg_backend_health_check_timeout())
        .arg(arg_model())
        .arg(arg_precision())
        .arg(arg_device())
        .arg(arg_max_new_tokens())
        .arg(arg_system_prompt())
        .arg(arg_user_request())
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("ALEPH_CONFIG_FILE")
                .num_args(1)
                .help(format!("Path to configuration file [default: {}]", Config::default(ConfigKey::ConfigFile)))
                .global(true)
        )
        .arg(
            Arg::new(ConfigKey::OllamaURL.to_string())
                .long(ConfigKey::OllamaURL.to_string())
                .env("ALEPH_OLLAMA_URL")
                .num_args(1)
                .help(format!("Ollama API URL when using the Ollama backend. [default: {}]", Config::default(ConfigKey::OllamaURL)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::OpenAiURL.to_string())
                .long(ConfigKey::OpenAiURL.to_string())
                .env("ALEPH_OPENAI_URL")
                .num_args(1)
                .help(format!("OpenAI compatible API URL when using the OpenAI backend, such as llama.cpp or LM Studio. [default: {}]", Config::default(ConfigKey::OpenAiURL)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::OpenAiToken.to_string())
                .long(ConfigKey::OpenAiToken.to_string())
                .env("ALEPH_OPENAI_TOKEN")
                .num_args(1)
                .help("API token when using the OpenAI backend, if the server requires one.")
                .global(true),
        );
}

pub async fn parse() -> Result<RunMode> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("debug", debug_matches)) => {
            match debug_matches.subcommand() {
                Some(("log-path", _)) => {
                    let log_dir = match std::env::var("ALEPH_LOG_DIR") {
                        Ok(dir) => path::PathBuf::from(dir),
                        Err(_) => dirs::cache_dir()
                            .unwrap_or_else(std::env::temp_dir)
                            .join("aleph"),
                    };
                    let log_path = log_dir.join("debug.log");
                    println!("{}", log_path.to_string_lossy());
                }
                Some(("enum-config", _)) => {
                    let res = ConfigKey::VARIANTS.join("\n");
                    println!("{}", res);
                }
                _ => {
                    subcommand_debug().print_long_help()?;
                }
            }

            return Ok(RunMode::Exit);
        }
        Some(("chat", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
        }
        Some(("generate", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            return Ok(RunMode::Generate);
        }
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
            return Ok(RunMode::Exit);
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
                return Ok(RunMode::Exit);
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
                return Ok(RunMode::Exit);
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
                return Ok(RunMode::Exit);
            }
            _ => {
                subcommand_config().print_long_help()?;
                return Ok(RunMode::Exit);
            }
        },
        Some(("manpages", _)) => {
            clap_mangen::Man::new(build()).render(&mut io::stdout())?;
            return Ok(RunMode::Exit);
        }
        _ => {
            Config::load(build(), vec![&matches]).await?;
        }
    }

    return Ok(RunMode::Chat);
}
