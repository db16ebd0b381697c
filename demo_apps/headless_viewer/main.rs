//! Headless viewer
//!
//! Usage: `headless_viewer [config.json] [frames]`
//!
//! With a config file, assets are read from its `asset_root`. Without one,
//! a small in-memory model and measurement table are used so the demo runs
//! anywhere.

use couture::assets::MemoryAssetReader;
use couture::base::FrameState;
use couture::scene::{BackgroundMode, MEASUREMENT_NAMES};
use couture::{FrameRenderer, PropertyKey, Scene, SessionCommand, Viewer, ViewerConfig};

const DEFAULT_FRAMES: u64 = 240;

/// Logs a scene summary every `every` frames instead of drawing.
struct LoggingRenderer {
    every: u64,
}

impl FrameRenderer for LoggingRenderer {
    fn render(&mut self, scene: &Scene, frame: &FrameState) -> couture::Result<()> {
        if frame.frame_count % self.every == 0 {
            let background = match scene.background {
                BackgroundMode::Color(c) => format!("colour {c}"),
                BackgroundMode::Cube(_) => "environment cube".to_string(),
            };
            log::info!(
                "frame {:>4} t={:.2}s: {} nodes, {} meshes, {} materials, background {}",
                frame.frame_count,
                frame.time,
                scene.nodes.len(),
                scene.meshes.len(),
                scene.materials.len(),
                background
            );
        }
        Ok(())
    }
}

fn demo_assets() -> MemoryAssetReader {
    let reader = MemoryAssetReader::new();

    let mut obj = String::from("o body\n");
    for (x, y, z) in [
        (-1.0, -1.0, -1.0),
        (1.0, -1.0, -1.0),
        (1.0, 1.0, -1.0),
        (-1.0, 1.0, -1.0),
        (-1.0, -1.0, 1.0),
        (1.0, -1.0, 1.0),
        (1.0, 1.0, 1.0),
        (-1.0, 1.0, 1.0),
    ] {
        obj.push_str(&format!("v {} {} {}\n", x * 300.0, y * 900.0 + 900.0, z * 150.0));
    }
    obj.push_str("f 1 4 3 2\nf 5 6 7 8\nf 1 2 6 5\nf 4 8 7 3\nf 1 5 8 4\nf 2 3 7 6\n");
    reader.insert("guy.obj", obj.into_bytes());

    let mut measurement = serde_json::Map::new();
    for (i, name) in MEASUREMENT_NAMES.iter().enumerate() {
        let y = 300.0 + 200.0 * i as f32;
        measurement.insert(
            (*name).to_string(),
            serde_json::json!({
                "line_points": [[-320.0, y, 0.0], [0.0, y, 170.0], [320.0, y, 0.0], [0.0, y, -170.0]],
                "closed": true,
            }),
        );
    }
    let table = serde_json::json!({ "measurement": measurement });
    reader.insert("measurement.json", table.to_string().into_bytes());

    reader
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let config_path = args.next();
    let frames = args
        .next()
        .and_then(|n| n.parse().ok())
        .unwrap_or(DEFAULT_FRAMES);

    let mut viewer = match &config_path {
        Some(path) => {
            let config = ViewerConfig::from_file(path)?;
            pollster::block_on(Viewer::start_from_root(config))?
        }
        None => {
            let config = ViewerConfig {
                environments: Vec::new(),
                ..ViewerConfig::default()
            };
            pollster::block_on(Viewer::start(config, demo_assets()))?
        }
    };
    pollster::block_on(viewer.load_configured_assets())?;

    let mut renderer = LoggingRenderer { every: 30 };
    for frame in 0..frames {
        match frame {
            30 => viewer.send(SessionCommand::ApplyPreset("IronSkin".to_string())),
            60 => viewer.send(SessionCommand::SelectMeasurement(0)),
            90 => viewer.send(SessionCommand::SwitchFamily),
            120 => viewer.send(SessionCommand::SetSlider {
                key: PropertyKey::Shininess,
                raw: 40.0,
            }),
            150 => viewer.send(SessionCommand::ToggleBackground),
            180 => viewer.send(SessionCommand::ApplyPreset("OriginSkin".to_string())),
            _ => {}
        }
        if viewer.frame(&mut renderer)?.is_none() {
            break;
        }
    }

    let session = viewer.session();
    log::info!(
        "Done: family {}, {} overrides, {} material rebuilds, guide time {:.2}",
        session.registry().active_family(),
        session.registry().overrides().len(),
        session.registry().reconstruction_count(),
        session.guide().time()
    );
    viewer.unmount();
    Ok(())
}
