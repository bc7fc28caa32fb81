mod commands;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    load_settings_from, settings::SETTINGS_FILE, AppShell, ClipboardService, FilePreferenceStore,
    HttpTransport, NotificationEvent, PanelError, Tab,
};
use commands::{parse_command, ShellCommand, HELP};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pwutil", about = "Secure password generator and analyzer")]
struct Args {
    /// Base URL of the password service, e.g. http://127.0.0.1:5000/api/v1
    #[arg(long, env = "PWUTIL_API_ROOT")]
    api_root: Option<String>,
    #[arg(long, default_value = SETTINGS_FILE)]
    config: PathBuf,
    /// Where the theme preference is kept.
    #[arg(long)]
    preferences: Option<PathBuf>,
    #[arg(long)]
    download_dir: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let args = Args::parse();

    let mut settings = load_settings_from(&args.config, |name| std::env::var(name).ok())?;
    if let Some(api_root) = args.api_root {
        settings.api_root = api_root;
    }
    if let Some(path) = args.preferences {
        settings.preferences_path = path;
    }
    if let Some(dir) = args.download_dir {
        settings.download_dir = dir;
    }
    settings.validate()?;

    let shell = AppShell::start(
        &settings,
        Arc::new(HttpTransport::new(settings.api_root.clone())),
        ClipboardService::system(),
        Arc::new(FilePreferenceStore::new(settings.preferences_path.clone())),
    );
    spawn_notification_printer(&shell);
    shell.spawn_health_probe();

    println!(
        "Secure Password Utility [{}] theme {}  (type 'help')",
        settings.api_root,
        shell.theme.indicator()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(commands::CommandParseError::Empty) => continue,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };
        if command == ShellCommand::Quit {
            break;
        }
        run_command(&shell, command).await;
    }
    Ok(())
}

fn spawn_notification_printer(shell: &AppShell) {
    let mut events = shell.notifications.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(NotificationEvent::Shown(notification)) => {
                    println!("{} {}", notification.severity.icon(), notification.message);
                }
                Ok(_) => {}
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "notification printer lagged");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

async fn run_command(shell: &AppShell, command: ShellCommand) {
    debug!(?command, "running command");
    match command {
        ShellCommand::Help => println!("{HELP}"),
        ShellCommand::Quit => {}
        ShellCommand::Status => print_status(shell).await,
        ShellCommand::SwitchTab(tab) => shell.tabs.switch(tab),
        ShellCommand::ToggleTheme => {
            shell.theme.toggle();
        }
        ShellCommand::About => shell.about(),
        ShellCommand::Privacy => shell.privacy(),
        ShellCommand::SetOption { set, enabled } => shell.generator.set_option(set, enabled).await,
        ShellCommand::SetLength(length) => shell.generator.set_length(length).await,
        ShellCommand::Generate => {
            if shell.generator.generate().await.is_ok() {
                print_generator(shell).await;
            }
        }
        ShellCommand::CopyPassword => {
            if !shell.generator.copy().await {
                println!("nothing copied");
            }
        }
        ShellCommand::TogglePasswordVisibility => {
            shell.generator.toggle_visibility().await;
            print_generator(shell).await;
        }
        ShellCommand::SetAnalyzerInput(text) => shell.analyzer.set_input(text).await,
        ShellCommand::Analyze => {
            if let Ok(report) = shell.analyzer.analyze().await {
                for metric in &report.metrics {
                    println!("  {:<11} {}", metric.label, metric.value);
                }
                for (set, present) in &report.character_types {
                    println!("  {:<11} {}", set.label(), if *present { "✓" } else { "✗" });
                }
                if report.shows_detected_issues() {
                    println!("  Detected issues:");
                    for pattern in &report.detected_patterns {
                        println!("    - {pattern}");
                    }
                }
                if report.shows_recommendations() {
                    println!("  Recommendations:");
                    for recommendation in &report.recommendations {
                        println!("    - {recommendation}");
                    }
                }
            }
        }
        ShellCommand::ClearAnalyzer => shell.analyzer.clear_input().await,
        ShellCommand::ToggleAnalyzerVisibility => {
            let masked = shell.analyzer.toggle_visibility().await;
            println!("analyzer input {}", if masked { "hidden" } else { "visible" });
        }
        ShellCommand::BulkOpen => shell.bulk.open().await,
        ShellCommand::BulkCount(count) => shell.bulk.set_count(count).await,
        ShellCommand::BulkLength(length) => shell.bulk.set_length(length).await,
        ShellCommand::BulkGenerate => match shell.bulk.generate_bulk().await {
            Ok(_) => {
                let view = shell.bulk.view().await;
                if let Some(heading) = view.heading() {
                    println!("{heading}");
                }
                for (index, password) in view.results.iter().enumerate() {
                    println!("  {index:>2}  {password}");
                }
            }
            Err(PanelError::ModalClosed) => println!("run 'bulk open' first"),
            Err(_) => {}
        },
        ShellCommand::BulkCopyAll => {
            shell.bulk.copy_all().await;
        }
        ShellCommand::BulkCopyItem(index) => {
            if shell.bulk.copy_item(index).await {
                println!("  {index:>2}  ✓");
            } else {
                println!("no password at index {index}");
            }
        }
        ShellCommand::BulkDownload => match shell.bulk.download().await {
            Ok(path) => println!("saved to {}", path.display()),
            Err(err) => println!("{err}"),
        },
        ShellCommand::BulkClose => shell.bulk.close().await,
    }
}

async fn print_generator(shell: &AppShell) {
    let view = shell.generator.view().await;
    println!(
        "  {}  {} {}",
        view.display_text(),
        view.entropy_text,
        view.rating_text
    );
}

async fn print_status(shell: &AppShell) {
    let tab = shell.tabs.active();
    println!(
        "[{}] theme {}",
        tab.label(),
        shell.theme.indicator()
    );
    match tab {
        Tab::Generator => {
            let view = shell.generator.view().await;
            println!(
                "  length {}  {}",
                view.selection.length,
                shared::domain::CharacterSet::ALL
                    .iter()
                    .map(|set| format!(
                        "{}:{}",
                        set.label(),
                        if view.selection.options.is_enabled(*set) { "on" } else { "off" }
                    ))
                    .collect::<Vec<_>>()
                    .join(" ")
            );
            print_generator(shell).await;
        }
        Tab::Analyzer => {
            let view = shell.analyzer.view().await;
            println!("  input {} characters", view.input_len);
            if view.meter.visible {
                println!("  strength {} ({:.0}%)", view.meter.label, view.meter.score);
            }
        }
    }
    if shell.bulk.is_visible() {
        let view = shell.bulk.view().await;
        println!(
            "  bulk dialog: count {} length {} results {}",
            view.count,
            view.length,
            view.results.len()
        );
    }
}
