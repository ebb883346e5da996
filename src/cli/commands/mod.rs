
use crate::config::{Config, get_config_path, load_config};
use crate::scan::ScanSettings;
use crate::scan::settings::MAX_WINDOW;
use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use scrollcheck_core::RunTrigger;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "scrollcheck")]
#[command(about = "Report unacknowledged 📜 messages in a Discord server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the guild and post the report
    Scan(ScanArgs),
    /// Load and validate the configuration
    Validate {
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// List channel filter presets
    Presets {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct ScanArgs {
    #[arg(long)]
    config: Option<PathBuf>,
    /// Channel filter preset (defaults to filters.defaultPreset)
    #[arg(long)]
    preset: Option<String>,
    /// Which run this is: morning, evening or manual
    #[arg(long, default_value = "manual")]
    run: RunTrigger,
    /// Look-back window, e.g. 24h or 90m (defaults to scan.windowHours)
    #[arg(long, value_parser = humantime::parse_duration)]
    window: Option<Duration>,
    #[arg(long)]
    max_results: Option<usize>,
    /// Also consider messages written by bots
    #[arg(long)]
    include_bots: bool,
    /// Log matches instead of posting the report
    #[arg(long)]
    dry_run: bool,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan(args) => {
            scan(args).await?;
        }
        Commands::Validate { config } => {
            validate(config.as_deref())?;
        }
        Commands::Presets { config } => {
            presets(config.as_deref())?;
        }
    }

    Ok(())
}

fn apply_cli_overrides(config: &mut Config, args: &ScanArgs) {
    if let Some(max) = args.max_results {
        config.scan.max_results = max;
    }
    if args.include_bots {
        config.scan.include_bots = true;
    }
}

fn check_window(window: Duration) -> Result<Duration> {
    if window.is_zero() {
        bail!("--window must be greater than zero");
    }
    if window > MAX_WINDOW {
        bail!(
            "--window {} is longer than the maximum of {}",
            humantime::format_duration(window),
            humantime::format_duration(MAX_WINDOW)
        );
    }
    Ok(window)
}

fn load_validated(path: Option<&Path>, args: Option<&ScanArgs>) -> Result<Config> {
    let mut config = load_config(path)?;
    if let Some(args) = args {
        apply_cli_overrides(&mut config, args);
    }
    config
        .validate()
        .with_context(|| "Configuration validation failed")?;
    Ok(config)
}

fn scan_settings(config: &Config, args: &ScanArgs) -> Result<ScanSettings> {
    let mut settings = ScanSettings::from_config(config, args.preset.as_deref())?;
    if let Some(window) = args.window {
        settings.window = check_window(window)?;
    }
    Ok(settings)
}

async fn scan(args: ScanArgs) -> Result<()> {
    let config = load_validated(args.config.as_deref(), Some(&args))?;
    let settings = scan_settings(&config, &args)?;
    let ctx = settings.context(Utc::now(), args.run);

    info!(
        "scanning guild {} (preset: {}, run: {}, window: {}, today: {}{})",
        settings.guild_id,
        args.preset
            .as_deref()
            .or(config.filters.default_preset.as_deref())
            .unwrap_or("none"),
        args.run,
        humantime::format_duration(settings.window),
        ctx.today,
        if args.dry_run { ", dry run" } else { "" }
    );

    run_with_discord(&config, settings, &ctx, args.dry_run).await
}

#[cfg(feature = "discord")]
async fn run_with_discord(
    config: &Config,
    settings: ScanSettings,
    ctx: &scrollcheck_core::ScanContext,
    dry_run: bool,
) -> Result<()> {
    use crate::discord::DiscordClient;
    use std::sync::Arc;

    let client = Arc::new(DiscordClient::new(
        &config.discord.token,
        config.retry.clone(),
    ));
    client.verify().await?;
    crate::scan::run_scan(client.clone(), client.as_ref(), settings, ctx, dry_run).await?;
    Ok(())
}

#[cfg(not(feature = "discord"))]
async fn run_with_discord(
    _config: &Config,
    _settings: ScanSettings,
    _ctx: &scrollcheck_core::ScanContext,
    _dry_run: bool,
) -> Result<()> {
    bail!("scrollcheck was built without the `discord` feature")
}

fn validate(path: Option<&Path>) -> Result<()> {
    let config = load_validated(path, None)?;
    print!("{}", describe_config(&config, path)?);
    Ok(())
}

fn describe_config(config: &Config, path: Option<&Path>) -> Result<String> {
    let location = match path {
        Some(p) => p.to_path_buf(),
        None => get_config_path()?,
    };
    let mut out = String::new();
    writeln!(out, "Configuration OK ({})", location.display())?;
    writeln!(out, "  guild:          {}", config.guild_id()?)?;
    writeln!(out, "  report channel: {}", config.report_channel_id()?)?;
    writeln!(out, "  acknowledgers:  {}", config.acknowledger_ids()?.len())?;
    writeln!(out, "  checkmark:      {}", config.checkmark()?)?;

    let mut modes = Vec::new();
    if config.marker.literal_enabled() {
        modes.push("literal".to_string());
    }
    if config.marker.phrase.enabled {
        modes.push(format!("phrase ({})", config.marker.phrase.keyword));
    }
    writeln!(out, "  marker:         {} [{}]", config.marker.unicode, modes.join(", "))?;
    writeln!(
        out,
        "  window:         {}h, cap {}, concurrency {}, timezone {}",
        config.scan.window_hours,
        config.scan.max_results,
        config.scan.concurrency,
        config.scan.timezone
    )?;
    writeln!(out, "  presets:        {}", config.filters.presets.len())?;
    Ok(out)
}

fn presets(path: Option<&Path>) -> Result<()> {
    let config = load_config(path)?;
    print!("{}", describe_presets(&config)?);
    Ok(())
}

fn describe_presets(config: &Config) -> Result<String> {
    let filters = &config.filters;
    let mut out = String::new();
    if filters.presets.is_empty() {
        writeln!(out, "No filter presets configured; every channel is scanned.")?;
        return Ok(out);
    }
    for (name, preset) in &filters.presets {
        let marker = if filters.default_preset.as_deref() == Some(name.as_str()) {
            " (default)"
        } else {
            ""
        };
        writeln!(out, "{}{}", name, marker)?;
        for (label, values) in [
            ("allow ids", &preset.allow_ids),
            ("allow categories", &preset.allow_categories),
            ("allow names", &preset.allow_names),
            ("exclude names", &preset.exclude_names),
        ] {
            if !values.is_empty() {
                writeln!(out, "  {}: {}", label, values.join(", "))?;
            }
        }
    }
    Ok(out)
}
