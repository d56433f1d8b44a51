/// Command line arguments for the terminal viewer
use arcview_core::ViewerConfig;
use clap::{value_parser, Arg, ArgAction, Command};
use log::LevelFilter;
use std::path::PathBuf;

/// What the viewer shows
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// A mesh file; `None` when no path was given
    Model(Option<PathBuf>),
    Bounce,
}

#[derive(Debug, Clone)]
pub struct CliOptions {
    pub content: Content,
    pub log_file: PathBuf,
    pub log_level: LevelFilter,
    pub config: ViewerConfig,
}

pub fn create_clap_command() -> Command {
    Command::new("arcview-terminal")
        .about("Interactive mesh viewer for the terminal")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("model")
                .value_name("MODEL")
                .help("Path to the .obj mesh to view")
                .value_parser(value_parser!(PathBuf))
                .required(false),
        )
        .arg(
            Arg::new("demo")
                .long("demo")
                .value_name("DEMO")
                .help("Run a built-in demo instead of loading a mesh")
                .value_parser(["bounce"])
                .conflicts_with("model"),
        )
        .arg(
            Arg::new("frame-rate")
                .long("frame-rate")
                .value_name("HZ")
                .help("Simulation and redraw ticks per second")
                .value_parser(value_parser!(f32))
                .default_value("100"),
        )
        .arg(
            Arg::new("extent")
                .long("extent")
                .value_name("LENGTH")
                .help("Length the longest bounding box edge is scaled to")
                .value_parser(value_parser!(f32))
                .default_value("2"),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .value_name("FILE")
                .help("Where log output is written")
                .value_parser(value_parser!(PathBuf))
                .default_value("arcview.log"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("More log output; repeat for trace")
                .action(ArgAction::Count),
        )
}

pub fn handle_clap_matches(matches: &clap::ArgMatches) -> CliOptions {
    let content = match matches.get_one::<String>("demo").map(String::as_str) {
        Some("bounce") => Content::Bounce,
        _ => Content::Model(matches.get_one::<PathBuf>("model").cloned()),
    };

    let log_level = match matches.get_count("verbose") {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let mut config = ViewerConfig::default();
    if let Some(&rate) = matches.get_one::<f32>("frame-rate") {
        config.frame_rate = rate;
    }
    if let Some(&extent) = matches.get_one::<f32>("extent") {
        config.target_extent = extent;
    }

    CliOptions {
        content,
        log_file: matches
            .get_one::<PathBuf>("log-file")
            .cloned()
            .unwrap_or_else(|| PathBuf::from("arcview.log")),
        log_level,
        config,
    }
}
