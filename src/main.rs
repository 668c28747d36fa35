use std::cell::Cell;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

use clap::{Args, Parser, Subcommand};
use serde_json::{Value, json};

use pixel_mirror::config::Config;
use pixel_mirror::db::{self, DbError};
use pixel_mirror::guides::css::LengthContext;
use pixel_mirror::guides::grid::GridLayout;
use pixel_mirror::overlay::display::HostPage;
use pixel_mirror::overlay::geometry::{Size, Viewport};
use pixel_mirror::services::grid_presets::{GridPosition, GridPreset, NewGridPreset, PresetError};
use pixel_mirror::services::images::{self, ImageError, StoredImage, UploadFile};
use pixel_mirror::session::{Session, SessionError};
use pixel_mirror::state::settings::SettingsStore;
use pixel_mirror::state::storage::FileStorage;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to create data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Image(#[from] ImageError),
    #[error(transparent)]
    Preset(#[from] PresetError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "pixel-mirror", about = "Manage stored designs, grid presets and overlay settings")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Images(ImagesCommand),
    Presets(PresetsCommand),
    Settings(SettingsCommand),
    /// Print the resolved rhythm and grid guides for the configured viewport.
    Guides,
}

#[derive(Args, Debug)]
struct ImagesCommand {
    #[command(subcommand)]
    command: ImagesSubcommand,
}

#[derive(Subcommand, Debug)]
enum ImagesSubcommand {
    List,
    Upload {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    Delete {
        id: String,
    },
    Clear,
}

#[derive(Args, Debug)]
struct PresetsCommand {
    #[command(subcommand)]
    command: PresetsSubcommand,
}

#[derive(Subcommand, Debug)]
enum PresetsSubcommand {
    List,
    Add {
        #[arg(long)]
        width: String,
        #[arg(long)]
        columns: String,
        #[arg(long)]
        gutter: String,
        /// Keep gutters between columns only (no half-gutter edge padding).
        #[arg(long)]
        inside: bool,
        #[arg(long, default_value = "center")]
        position: String,
    },
    Delete {
        id: String,
    },
    Activate {
        id: String,
    },
    Reset,
}

#[derive(Args, Debug)]
struct SettingsCommand {
    #[command(subcommand)]
    command: SettingsSubcommand,
}

#[derive(Subcommand, Debug)]
enum SettingsSubcommand {
    Show,
    Reset,
}

/// Host stand-in for running without a browser.
struct HeadlessPage {
    viewport: Viewport,
    issued: Cell<u32>,
}

impl HostPage for HeadlessPage {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn document_size(&self) -> Size {
        Size::new(self.viewport.width, self.viewport.height)
    }

    fn create_object_url(&self, _content: &[u8], mime_type: &str) -> String {
        let n = self.issued.get() + 1;
        self.issued.set(n);
        format!("memory:{mime_type}/{n}")
    }

    fn revoke_object_url(&self, url: &str) {
        tracing::debug!(%url, "headless url released");
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    if let Err(e) = dotenvy::dotenv()
        && !e.not_found()
    {
        tracing::warn!(error = %e, "failed to load .env");
    }

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = Config::from_env();
    tokio::fs::create_dir_all(&config.data_dir)
        .await
        .map_err(|source| CliError::DataDir { path: config.data_dir.clone(), source })?;

    let pool = db::init_pool(&config.database_url).await?;
    let settings = SettingsStore::load(Box::new(FileStorage::new(config.settings_dir())), config.key_prefix.clone());
    let host = Rc::new(HeadlessPage {
        viewport: Viewport { scroll_x: 0.0, scroll_y: 0.0, width: config.viewport_width, height: config.viewport_height },
        issued: Cell::new(0),
    });
    let mut session = Session::new(pool, settings, host);
    if let Err(e) = session.mount().await {
        tracing::warn!(error = %e, "continuing without the selected design");
    }

    let result = match cli.command {
        Command::Images(cmd) => run_images(&mut session, cmd).await,
        Command::Presets(cmd) => run_presets(&mut session, cmd).await,
        Command::Settings(cmd) => run_settings(&mut session, cmd),
        Command::Guides => run_guides(&mut session, &config).await,
    };
    session.teardown();
    result
}

async fn run_images(session: &mut Session<HeadlessPage>, cmd: ImagesCommand) -> Result<(), CliError> {
    match cmd.command {
        ImagesSubcommand::List => {
            let all = images::list_images(session.pool()).await?;
            print_json(&Value::Array(all.iter().map(image_json).collect()))
        }
        ImagesSubcommand::Upload { paths } => {
            let mut files = Vec::with_capacity(paths.len());
            for path in &paths {
                files.push(UploadFile::read(path).await?);
            }
            let stored = session.upload(files).await?;
            eprintln!("stored {} of {} files", stored.len(), paths.len());
            print_json(&Value::Array(stored.iter().map(image_json).collect()))
        }
        ImagesSubcommand::Delete { id } => {
            session.delete_image(&id).await?;
            println!("deleted {id}");
            Ok(())
        }
        ImagesSubcommand::Clear => {
            let removed = session.delete_all_images().await?;
            println!("deleted {removed} designs");
            Ok(())
        }
    }
}

async fn run_presets(session: &mut Session<HeadlessPage>, cmd: PresetsCommand) -> Result<(), CliError> {
    match cmd.command {
        PresetsSubcommand::List => {
            let active = session.settings().with(|s| s.active_grid_system_id.clone());
            let presets = session.list_presets().await?;
            let rows = presets.iter().map(|p| preset_json(p, active.as_deref() == Some(p.id.as_str()))).collect();
            print_json(&Value::Array(rows))
        }
        PresetsSubcommand::Add { width, columns, gutter, inside, position } => {
            let position: GridPosition = position.parse()?;
            let fields = NewGridPreset::parse(&width, &columns, &gutter, !inside, position)?;
            let preset = session.create_preset(&fields).await?;
            print_json(&preset_json(&preset, false))
        }
        PresetsSubcommand::Delete { id } => {
            session.delete_preset(&id).await?;
            println!("deleted {id}");
            Ok(())
        }
        PresetsSubcommand::Activate { id } => {
            session.activate_preset(&id).await?;
            println!("active {id}");
            Ok(())
        }
        PresetsSubcommand::Reset => {
            let preset = session.reset_presets().await?;
            print_json(&preset_json(&preset, true))
        }
    }
}

fn run_settings(session: &mut Session<HeadlessPage>, cmd: SettingsCommand) -> Result<(), CliError> {
    match cmd.command {
        SettingsSubcommand::Show => print_json(&serde_json::to_value(session.settings().snapshot())?),
        SettingsSubcommand::Reset => {
            session.reset_settings()?;
            println!("settings reset");
            Ok(())
        }
    }
}

async fn run_guides(session: &mut Session<HeadlessPage>, config: &Config) -> Result<(), CliError> {
    let ctx = LengthContext::for_viewport(config.viewport_width);
    let rhythm = session.rhythm_guide().map(|g| {
        json!({
            "rowHeight": g.row_height.to_string(),
            "periodPx": g.period_px(&ctx),
            "color": g.color,
            "backgroundImage": g.background_image(),
        })
    });
    let grid = session.grid_guide().await.map(|g| {
        json!({
            "presetId": g.preset_id,
            "color": g.color,
            "edgePadding": g.edge_padding().map(|p| p.to_string()),
            "layout": layout_json(&g.layout(config.viewport_width)),
        })
    });
    print_json(&json!({ "viewportWidth": config.viewport_width, "rhythm": rhythm, "grid": grid }))
}

fn image_json(image: &StoredImage) -> Value {
    json!({
        "id": image.id,
        "mimeType": image.mime_type,
        "bytes": image.content.len(),
        "createdAt": image.created_at,
    })
}

fn preset_json(preset: &GridPreset, active: bool) -> Value {
    json!({
        "id": preset.id,
        "width": preset.width,
        "columns": preset.columns,
        "gutterWidth": preset.gutter_width,
        "gutterOnOutside": preset.gutter_on_outside,
        "position": preset.position.as_str(),
        "createdAt": preset.created_at,
        "active": active,
    })
}

fn layout_json(layout: &GridLayout) -> Value {
    let columns: Vec<Value> = layout.columns.iter().map(|c| json!({ "left": c.left, "width": c.width })).collect();
    json!({
        "containerLeft": layout.container.left,
        "containerWidth": layout.container.width,
        "edgePaddingPx": layout.edge_padding_px,
        "gutterPx": layout.gutter_px,
        "columns": columns,
    })
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
