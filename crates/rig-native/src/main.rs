//! Headless rig router: load a setup, wire it, print the cables.

mod config;
mod scene;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rig_core::{import_devices, ConnectionKind, Diagnostic, Rig, RoutingParams, SetupKind};

use scene::MemoryScene;

#[derive(Parser)]
#[command(name = "rig-native")]
#[command(author, version, about = "Infer and print the cabling of a rig setup", long_about = None)]
struct Cli {
    /// JSON array of device documents
    #[arg(value_name = "SETUP")]
    file: PathBuf,

    /// TOML routing config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the setup kind (dj, producer, musician)
    #[arg(short, long, value_parser = parse_setup)]
    setup: Option<SetupKind>,

    /// Print connections and diagnostics as JSON
    #[arg(long)]
    json: bool,

    /// Log fallback levels and scene calls
    #[arg(short, long)]
    verbose: bool,
}

fn parse_setup(s: &str) -> Result<SetupKind, String> {
    SetupKind::from_name(s).ok_or_else(|| format!("unknown setup kind '{s}'"))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    env_logger::builder()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .parse_default_env()
        .init();

    let mut params = match &cli.config {
        Some(path) => config::load(path)?,
        None => RoutingParams::default(),
    };
    if let Some(kind) = cli.setup {
        params.setup = kind;
    }

    let text = std::fs::read_to_string(&cli.file)
        .with_context(|| format!("reading setup {}", cli.file.display()))?;
    let devices = import_devices(&text)
        .with_context(|| format!("importing setup {}", cli.file.display()))?;
    log::info!("loaded {} devices ({:?} setup)", devices.len(), params.setup);

    let mut rig = Rig::new(MemoryScene::default(), params);
    let report = rig.load_setup(devices)?;

    if cli.json {
        let out = serde_json::json!({
            "connections": rig.connections(),
            "diagnostics": report.diagnostics,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{} cables", rig.connections().len());
    for c in rig.connections() {
        let name = |uid: &str| {
            rig.device(uid)
                .map(|d| d.name.clone())
                .unwrap_or_else(|| uid.to_string())
        };
        println!(
            "  {:<10} {} [{}] -> {} [{}]",
            kind_label(c.kind),
            name(&c.source_device),
            c.source_port.label,
            name(&c.target_device),
            c.target_port.label
        );
    }
    if !report.diagnostics.is_empty() {
        println!("{} notes", report.diagnostics.len());
        for d in &report.diagnostics {
            println!("  {}", describe(d));
        }
    }
    Ok(())
}

fn kind_label(kind: ConnectionKind) -> String {
    match kind {
        ConnectionKind::Line { channel } => format!("ch{channel}"),
        ConnectionKind::Send => "send".into(),
        ConnectionKind::Return => "return".into(),
        ConnectionKind::Master { side } => format!("master/{side:?}").to_lowercase(),
    }
}

fn describe(d: &Diagnostic) -> String {
    match d {
        Diagnostic::NoHub => "no mixer in the setup; nothing to wire".into(),
        Diagnostic::ChannelFallback { device, channel } => {
            format!("{device}: no table channel, used channel {channel}")
        }
        Diagnostic::ChannelOverflow { device } => format!("{device}: no channel left"),
        Diagnostic::Unmatched {
            rule,
            source,
            target,
            reason,
        } => format!("{rule:?} {source} -> {target}: {reason:?}"),
        Diagnostic::Fallback {
            rule,
            source,
            target,
            level,
        } => format!("{rule:?} {source} -> {target}: matched by {level:?}"),
        Diagnostic::SpeakerSideGuessed { device, side } => {
            format!("{device}: side guessed as {side:?}")
        }
        Diagnostic::DuplicateSuppressed { key } => format!("duplicate {key} dropped"),
    }
}
