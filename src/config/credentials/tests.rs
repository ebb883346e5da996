use super::*;
use crate::config::ENV_LOCK;

fn clear_env() {
    for name in STRING_ENV_VARS
        .iter()
        .chain(NUMERIC_ENV_VARS)
        .chain(std::iter::once(&ACK_USER_IDS_ENV))
    {
        unsafe { std::env::remove_var(name) };
    }
}

#[test]
fn test_env_var_tables() {
    assert_eq!(STRING_ENV_VARS.len(), 3);
    assert_eq!(NUMERIC_ENV_VARS.len(), 3);
    assert!(
        STRING_ENV_VARS
            .iter()
            .chain(NUMERIC_ENV_VARS)
            .all(|v| v.starts_with("SCROLLCHECK_"))
    );
}

#[test]
fn test_apply_string_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();
    let mut config = Config::default();

    unsafe { std::env::set_var("SCROLLCHECK_DISCORD_TOKEN", "env-token") };
    unsafe { std::env::set_var("SCROLLCHECK_GUILD_ID", "123") };
    apply_env_overrides(&mut config).unwrap();
    assert_eq!(config.discord.token, "env-token");
    assert_eq!(config.discord.guild_id, "123");
    assert!(config.discord.report_channel_id.is_empty());

    clear_env();
}

#[test]
fn test_empty_env_ignored() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();
    let mut config = Config::default();
    config.discord.token = "file-token".to_string();

    unsafe { std::env::set_var("SCROLLCHECK_DISCORD_TOKEN", "") };
    apply_env_overrides(&mut config).unwrap();
    assert_eq!(config.discord.token, "file-token");

    clear_env();
}

#[test]
fn test_numeric_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();
    let mut config = Config::default();

    unsafe { std::env::set_var("SCROLLCHECK_WINDOW_HOURS", "12") };
    unsafe { std::env::set_var("SCROLLCHECK_CONCURRENCY", " 4 ") };
    unsafe { std::env::set_var("SCROLLCHECK_MAX_RESULTS", "50") };
    apply_env_overrides(&mut config).unwrap();
    assert_eq!(config.scan.window_hours, 12);
    assert_eq!(config.scan.concurrency, 4);
    assert_eq!(config.scan.max_results, 50);

    clear_env();
}

#[test]
fn test_malformed_numeric_override_is_config_error() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();
    let mut config = Config::default();

    unsafe { std::env::set_var("SCROLLCHECK_WINDOW_HOURS", "a day") };
    let err = apply_env_overrides(&mut config).unwrap_err();
    assert!(matches!(err, ScrollError::Config(_)));
    assert!(err.to_string().contains("SCROLLCHECK_WINDOW_HOURS"));

    clear_env();
}

#[test]
fn test_ack_user_ids_override() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();
    let mut config = Config::default();
    config.ack.user_ids = vec!["1".to_string()];

    unsafe { std::env::set_var("SCROLLCHECK_ACK_USER_IDS", "5, 6,,7") };
    apply_env_overrides(&mut config).unwrap();
    assert_eq!(config.ack.user_ids, vec!["5", "6", "7"]);

    unsafe { std::env::set_var("SCROLLCHECK_ACK_USER_IDS", "5,carol") };
    let err = apply_env_overrides(&mut config).unwrap_err();
    assert!(err.to_string().contains("'carol'"));

    clear_env();
}
