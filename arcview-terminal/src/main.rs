/// Arcview Terminal - Interactive mesh viewer
///
/// Controls:
///   - Left drag: Rotate, Right drag: Zoom, Middle drag: Pan
///   - O/P: Orthographic / perspective projection
///   - H: Toggle shadow
///   - S/W/R/G/B: Background color (with shift: object color), D: Defaults
///   - A/V: Pause animation / hide vector (bounce demo)
///   - Q/ESC: Quit
use anyhow::Context;
use arcview_core::{MeshLoader, ViewerSession};
use arcview_terminal::cli::{create_clap_command, handle_clap_matches, Content};
use arcview_terminal::TerminalApp;
use simplelog::{Config, WriteLogger};
use std::fs::OpenOptions;

fn main() -> anyhow::Result<()> {
    let matches = create_clap_command().get_matches();
    let options = handle_clap_matches(&matches);

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&options.log_file)
        .with_context(|| format!("opening log file {}", options.log_file.display()))?;
    WriteLogger::init(options.log_level, Config::default(), log_file)?;

    // Load before touching the terminal so errors print normally
    let session = match options.content {
        Content::Model(path) => {
            let loader = MeshLoader::new(options.config.target_extent);
            let mesh = loader.load(path.as_deref()).map_err(|err| {
                log::error!("{}", err);
                err
            })?;
            ViewerSession::new(mesh, options.config)
        }
        Content::Bounce => ViewerSession::bounce(options.config),
    };

    let mut app = TerminalApp::new(session)?;
    app.run()?;

    Ok(())
}
