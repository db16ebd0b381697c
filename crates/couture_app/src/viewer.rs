//! The viewer host: owns the frame timer, the input state and the bridge,
//! and starts asset loads whose results come back as session commands.

use std::future::Future;
use std::sync::Arc;

use couture_assets::{AssetReaderVariant, AssetServer, EnvironmentSet, ModelLoader};
use couture_core::{FrameState, Input, Result, Timer};
use couture_scene::MeasurementTable;
use couture_studio::{FrameRenderer, RenderBridge, SessionCommand, StudioSession};

use crate::config::ViewerConfig;

pub struct Viewer {
    config: ViewerConfig,
    assets: AssetServer,
    loader: Arc<ModelLoader>,
    bridge: RenderBridge,
    timer: Timer,
    input: Input,
}

impl Viewer {
    /// Loads environments and measurements, then mounts a session.
    ///
    /// Environments or measurements that fail to load are logged and left
    /// out; the model is requested separately with
    /// [`request_model`](Self::request_model).
    pub async fn start(config: ViewerConfig, reader: impl Into<AssetReaderVariant>) -> Result<Self> {
        let assets = AssetServer::new(reader);

        let names: Vec<&str> = config.environments.iter().map(String::as_str).collect();
        let environments = if names.is_empty() {
            EnvironmentSet::new()
        } else {
            EnvironmentSet::load(&assets, &names).await.unwrap_or_else(|e| {
                log::warn!("No environment could be loaded: {e}");
                EnvironmentSet::new()
            })
        };

        let measurements = match &config.measurements {
            Some(uri) => load_measurements(&assets, uri).await,
            None => MeasurementTable::new(Vec::new()),
        };

        let session = StudioSession::new(&config.session_settings(), environments, measurements)?;
        log::info!("Viewer started with asset root '{}'", config.asset_root);
        Ok(Self {
            config,
            assets,
            loader: Arc::new(ModelLoader::new()),
            bridge: RenderBridge::mount(session),
            timer: Timer::new(),
            input: Input::new(),
        })
    }

    /// Starts with assets read from `config.asset_root` (a directory, or a
    /// URL with the `http` feature).
    pub async fn start_from_root(config: ViewerConfig) -> Result<Self> {
        let reader = AssetReaderVariant::from_source(&config.asset_root)?;
        Self::start(config, reader).await
    }

    #[must_use]
    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    #[must_use]
    pub fn assets(&self) -> &AssetServer {
        &self.assets
    }

    #[must_use]
    pub fn session(&self) -> &StudioSession {
        self.bridge.session()
    }

    pub fn session_mut(&mut self) -> &mut StudioSession {
        self.bridge.session_mut()
    }

    #[must_use]
    pub fn bridge(&self) -> &RenderBridge {
        &self.bridge
    }

    pub fn bridge_mut(&mut self) -> &mut RenderBridge {
        &mut self.bridge
    }

    /// Input state the platform adapter writes into between frames.
    pub fn input_mut(&mut self) -> &mut Input {
        &mut self.input
    }

    pub fn send(&self, command: SessionCommand) {
        self.bridge.send(command);
    }

    /// A future that loads `uri` and queues the model for installation.
    ///
    /// Resolves to `Ok(false)` when a later request superseded this one; the
    /// result is then dropped. A queued model is dropped too if a newer
    /// request starts before the next frame installs it. On failure the
    /// current model stays.
    pub fn request_model(&self, uri: &str) -> impl Future<Output = Result<bool>> + 'static {
        let assets = self.assets.clone();
        let loader = self.loader.clone();
        let tx = self.bridge.sender();
        let uri = uri.to_string();
        async move {
            let Some((model, ticket)) = loader.load_ticketed(&assets, &uri).await? else {
                return Ok(false);
            };
            let command = SessionCommand::InstallLoadedModel {
                model: Box::new(model),
                ticket,
            };
            Ok(tx.send(command).is_ok())
        }
    }

    /// A future that loads a colour texture and queues it as the model map.
    pub fn request_texture(&self, uri: &str) -> impl Future<Output = Result<bool>> + 'static {
        let assets = self.assets.clone();
        let tx = self.bridge.sender();
        let uri = uri.to_string();
        async move {
            let handle = assets.load_texture(&uri).await?;
            Ok(tx.send(SessionCommand::SetMap(Some(handle))).is_ok())
        }
    }

    /// Loads the configured model and texture, waiting for both.
    pub async fn load_configured_assets(&self) -> Result<()> {
        if let Some(texture) = &self.config.texture
            && let Err(e) = self.request_texture(texture).await
        {
            log::warn!("Texture '{texture}' unavailable: {e}");
        }
        self.request_model(&self.config.model).await?;
        Ok(())
    }

    /// Advances the clock and runs one frame. Returns `None` once unmounted.
    pub fn frame(&mut self, renderer: &mut dyn FrameRenderer) -> Result<Option<FrameState>> {
        let tick = self.timer.tick();
        let state = self.bridge.frame(&self.input, tick.dt, renderer);
        self.input.start_frame();
        state
    }

    /// Stops frames and drops every frame callback.
    pub fn unmount(&mut self) {
        self.bridge.unmount();
    }
}

async fn load_measurements(assets: &AssetServer, uri: &str) -> MeasurementTable {
    let table = async {
        let text = assets.reader().read_string(uri).await?;
        MeasurementTable::from_json(&text)
    }
    .await;
    table.unwrap_or_else(|e| {
        log::warn!("Measurements '{uri}' unavailable: {e}");
        MeasurementTable::new(Vec::new())
    })
}
