use clap::Parser;
use gtk4::gdk::Display;
use gtk4::glib;
use gtk4::prelude::*;
use gtk4::{Application, CssProvider};
use log::{info, warn};
use std::path::PathBuf;

use klock::config::{AppConfig, ConfigOverrides};
use klock::ui::MainWindow;
use klock_types::{Color, TextSize, Theme};

const APP_ID: &str = "org.klock.Klock";

/// klock - A full-screen desk clock with flip-card digits and a focus stopwatch
#[derive(Parser, Debug, Clone)]
#[command(name = "klock")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Clock theme: default, flip or flip-basic
    #[arg(short = 't', long = "theme", value_name = "THEME")]
    theme: Option<Theme>,

    /// Clock text color as #rrggbb or #rrggbbaa
    #[arg(short = 'c', long = "color", value_name = "HEX")]
    color: Option<Color>,

    /// Background color as #rrggbb or #rrggbbaa
    #[arg(short = 'b', long = "background", value_name = "HEX")]
    background: Option<Color>,

    /// Clock font: a settings-menu label (e.g. "Georgia") or a font family
    #[arg(long = "font", value_name = "FONT")]
    font: Option<String>,

    /// Clock text size, e.g. 18vw, 120px or 120
    #[arg(short = 's', long = "size", value_name = "SIZE")]
    size: Option<TextSize>,

    /// Start in klock mode (HH:MM with a minute progress bar)
    #[arg(short = 'k', long = "klock")]
    klock: bool,

    /// Launch in fullscreen mode
    #[arg(short = 'f', long = "fullscreen")]
    fullscreen: bool,

    /// Debug verbosity level (0=quiet, 1=info, 2=debug, 3=trace)
    #[arg(short = 'd', long = "debug", value_name = "LEVEL", default_value = "0")]
    debug: u8,

    /// Configuration file to read instead of the default location
    #[arg(long = "config", value_name = "FILE")]
    config: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            theme: self.theme,
            text_color: self.color,
            background_color: self.background,
            font: self.font.clone(),
            text_size: self.size.clone(),
            klock_mode: self.klock,
            fullscreen: self.fullscreen,
        }
    }
}

fn main() -> glib::ExitCode {
    let cli = Cli::parse();

    // Level 0 (default): warn only
    // Level 1: info
    // Level 2: debug
    // Level 3+: trace
    let log_level = match cli.debug {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // Allow RUST_LOG to override CLI setting
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    warn!("Starting klock v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load(cli.config.as_deref()).with_overrides(&cli.overrides());
    info!(
        "Theme {}, klock mode {}, size {}",
        config.clock.theme, config.clock.klock_mode, config.clock.text_size
    );

    let app = Application::builder().application_id(APP_ID).build();

    app.connect_startup(|_| load_css());
    app.connect_activate(move |app| {
        // A second launch just raises the existing window
        if let Some(window) = app.active_window() {
            window.present();
            return;
        }
        MainWindow::new(app, &config).present();
    });

    // Pass only the program name; clap already consumed the arguments
    app.run_with_args(&["klock"])
}

fn load_css() {
    let provider = CssProvider::new();
    provider.load_from_data(
        "
        .settings-panel {
            background-color: rgba(255, 255, 255, 0.95);
            color: #333333;
            border-radius: 10px;
            padding: 12px 16px 16px 16px;
            box-shadow: 0 4px 16px rgba(0, 0, 0, 0.25);
        }

        .settings-drag-handle {
            background-color: rgba(0, 0, 0, 0.15);
            border-radius: 4px;
            margin: 0 80px 4px 80px;
            min-height: 6px;
        }

        .settings-close-button {
            margin-top: 8px;
        }

        .clock-control-button {
            font-size: 22px;
            min-width: 44px;
            min-height: 44px;
            border-radius: 22px;
            background: rgba(255, 255, 255, 0.6);
        }
        ",
    );

    match Display::default() {
        Some(display) => gtk4::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
        ),
        None => warn!("No display available; skipping stylesheet"),
    }
}
