use super::schema::Config;
use crate::utils::split_id_list;
use scrollcheck_core::ScrollError;
use std::str::FromStr;
use tracing::debug;

macro_rules! define_string_overrides {
    ($( $env:literal => $($path:ident).+ );* $(;)?) => {
        /// Env vars that replace string fields verbatim.
        pub const STRING_ENV_VARS: &[&str] = &[$($env),*];

        fn apply_string_overrides(config: &mut Config) {
            $(
                if let Some(val) = env_value($env) {
                    debug!("{} overrides config file", $env);
                    config.$($path).+ = val;
                }
            )*
        }
    };
}

macro_rules! define_numeric_overrides {
    ($( $env:literal => $($path:ident).+ );* $(;)?) => {
        /// Env vars that replace numeric fields; malformed values are rejected.
        pub const NUMERIC_ENV_VARS: &[&str] = &[$($env),*];

        fn apply_numeric_overrides(config: &mut Config) -> Result<(), ScrollError> {
            $(
                if let Some(val) = env_value($env) {
                    config.$($path).+ = parse_number($env, &val)?;
                }
            )*
            Ok(())
        }
    };
}

define_string_overrides! {
    "SCROLLCHECK_DISCORD_TOKEN"      => discord.token;
    "SCROLLCHECK_GUILD_ID"           => discord.guild_id;
    "SCROLLCHECK_REPORT_CHANNEL_ID"  => discord.report_channel_id;
}

define_numeric_overrides! {
    "SCROLLCHECK_WINDOW_HOURS"       => scan.window_hours;
    "SCROLLCHECK_CONCURRENCY"        => scan.concurrency;
    "SCROLLCHECK_MAX_RESULTS"        => scan.max_results;
}

pub const ACK_USER_IDS_ENV: &str = "SCROLLCHECK_ACK_USER_IDS";

/// Apply environment variable overrides.
///
/// Any `SCROLLCHECK_*` env var that is set and non-empty overwrites the matching
/// config field, so secrets and ids can be injected by a cron job or container
/// without touching the config file.
pub fn apply_env_overrides(config: &mut Config) -> Result<(), ScrollError> {
    apply_string_overrides(config);
    apply_numeric_overrides(config)?;
    if let Some(val) = env_value(ACK_USER_IDS_ENV) {
        let ids = split_id_list(&val).map_err(|bad| {
            ScrollError::Config(format!(
                "{} contains a non-integer entry: '{}'",
                ACK_USER_IDS_ENV, bad
            ))
        })?;
        config.ack.user_ids = ids.iter().map(u64::to_string).collect();
    }
    Ok(())
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_number<T: FromStr>(name: &str, raw: &str) -> Result<T, ScrollError> {
    raw.trim().parse().map_err(|_| {
        ScrollError::Config(format!("{} must be a non-negative integer, got '{}'", name, raw))
    })
}

#[cfg(test)]
mod tests;
