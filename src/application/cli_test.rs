use anyhow::Result;

use super::build;
use crate::configuration::ConfigKey;

#[test]
fn it_builds_a_valid_command() {
    build().debug_assert();
}

#[test]
fn it_accepts_global_args_after_subcommands() -> Result<()> {
    let matches = build().try_get_matches_from(vec![
        "aleph",
        "generate",
        "--model",
        "smollm2:135m",
        "--precision",
        "fp16",
        "--device",
        "gpu",
    ])?;

    let (name, subcmd_matches) = matches.subcommand().unwrap();
    assert_eq!(name, "generate");
    assert_eq!(
        subcmd_matches
            .get_one::<String>(&ConfigKey::Model.to_string())
            .unwrap(),
        "smollm2:135m"
    );
    assert_eq!(
        subcmd_matches
            .get_one::<String>(&ConfigKey::Precision.to_string())
            .unwrap(),
        "fp16"
    );
    assert_eq!(
        subcmd_matches
            .get_one::<String>(&ConfigKey::Device.to_string())
            .unwrap(),
        "gpu"
    );

    return Ok(());
}

#[test]
fn it_rejects_unknown_backends() {
    let res = build().try_get_matches_from(vec!["aleph", "--backend", "webgpu"]);
    assert!(res.is_err());
}

#[test]
fn it_rejects_unknown_devices() {
    let res = build().try_get_matches_from(vec!["aleph", "chat", "--device", "tpu"]);
    assert!(res.is_err());
}

#[test]
fn it_defaults_to_no_subcommand() -> Result<()> {
    let matches = build().try_get_matches_from(vec!["aleph", "-m", "qwen2.5:1.5b-instruct"])?;
    assert!(matches.subcommand().is_none());
    assert_eq!(
        matches
            .get_one::<String>(&ConfigKey::Model.to_string())
            .unwrap(),
        "qwen2.5:1.5b-instruct"
    );

    return Ok(());
}
