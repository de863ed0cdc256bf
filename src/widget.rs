//! Widget Instance - Mint, Gate, Download
//!
//! One `Widget` per `init` call. All mutable state (current record, view,
//! canvas) lives on the instance; nothing is shared between instances.

use std::fmt;

use base64::Engine as _;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::canvas::{Canvas, CanvasError, ExportFormat};
use crate::capabilities::CapabilityError;
use crate::compositor::{compose, CanvasSize};
use crate::config::{ConfigError, Options, Settings};
use crate::generator::{MintRecord, TokenGenerator};
use crate::hashing::sha256_hex;
use crate::raster::PngCanvas;
use crate::validation::{Field, MintInput, Validator};

pub const HEADING: &str = "Emoji NFT Minter";
pub const MINT_LABEL: &str = "Mint NFT";
pub const MINTING_LABEL: &str = "Minting...";
pub const MINT_AGAIN_LABEL: &str = "Mint Again";
pub const DOWNLOAD_LABEL: &str = "Download Image";

pub const MISSING_INPUT_MESSAGE: &str = "Please enter both Wallet Address and Name!";
pub const GATE_PROMPT: &str = "Enter the 4-character code from the token image:";
pub const GATE_MISMATCH_MESSAGE: &str = "Incorrect code!";

#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("Container with ID \"{0}\" not found")]
    MountNotFound(String),

    #[error("Capability unavailable: {0}")]
    CapabilityUnavailable(#[from] CapabilityError),

    #[error("Missing input: {0:?}")]
    MissingInput(Vec<Field>),

    #[error("Incorrect code")]
    GateMismatch,

    #[error("No token minted yet")]
    NotReady,

    #[error("Canvas error: {0}")]
    Canvas(#[from] CanvasError),

    #[error("Failed to save download: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// `init` was pointed at a container the host does not have. The host comes
/// back untouched.
pub struct MountNotFound<H> {
    pub container_id: String,
    pub host: H,
}

impl<H> fmt::Debug for MountNotFound<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountNotFound")
            .field("container_id", &self.container_id)
            .finish_non_exhaustive()
    }
}

impl<H> fmt::Display for MountNotFound<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Container with ID \"{}\" not found", self.container_id)
    }
}

impl<H> std::error::Error for MountNotFound<H> {}

impl<H> From<MountNotFound<H>> for WidgetError {
    fn from(err: MountNotFound<H>) -> Self {
        WidgetError::MountNotFound(err.container_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MintState {
    Idle,
    Minting,
    Ready,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ButtonState {
    pub label: String,
    pub enabled: bool,
}

impl ButtonState {
    fn enabled(label: &str) -> Self {
        Self {
            label: label.to_string(),
            enabled: true,
        }
    }

    fn busy() -> Self {
        Self {
            label: MINTING_LABEL.to_string(),
            enabled: false,
        }
    }
}

/// Everything the host needs to draw the widget's controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WidgetView {
    pub heading: String,
    pub max_width: String,
    pub accent_color: String,
    pub wallet: String,
    pub name: String,
    pub mint_button: ButtonState,
    /// `None` while the canvas is hidden.
    pub canvas: Option<CanvasSize>,
    pub download_visible: bool,
}

impl WidgetView {
    fn new(settings: &Settings) -> Self {
        Self {
            heading: HEADING.to_string(),
            max_width: settings.width.clone(),
            accent_color: settings.primary_color.clone(),
            wallet: settings.default_wallet.clone(),
            name: settings.default_name.clone(),
            mint_button: ButtonState::enabled(MINT_LABEL),
            canvas: None,
            download_visible: false,
        }
    }
}

/// The page the widget is embedded in.
pub trait Host {
    /// Width of the mount point in CSS pixels, `None` if it does not exist.
    fn container_width(&self, container_id: &str) -> Option<f64>;

    /// Show (or refresh) the widget inside the container.
    fn present(&mut self, container_id: &str, view: &WidgetView);

    /// Modal text prompt. `None` when dismissed.
    fn prompt(&mut self, message: &str) -> Option<String>;

    fn notify(&mut self, message: &str);

    fn save(&mut self, file: &DownloadFile) -> std::io::Result<()>;
}

/// An unlocked token image, ready to hand to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadFile {
    pub filename: String,
    pub format: ExportFormat,
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub hash: String,
}

impl DownloadFile {
    pub fn new(record: &MintRecord, format: ExportFormat, bytes: Vec<u8>) -> Self {
        Self {
            filename: download_filename(record, format),
            format,
            hash: sha256_hex(&bytes),
            bytes,
        }
    }

    pub fn media_type(&self) -> &'static str {
        self.format.media_type()
    }

    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.media_type(),
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

/// `NFT_<serial>_<timestamp with ':' replaced by '-'>.<ext>`
pub fn download_filename(record: &MintRecord, format: ExportFormat) -> String {
    format!("{}.{}", record.file_stem(), format.extension())
}

/// Exact, case-sensitive match. A dismissed prompt never matches.
pub fn gate_accepts(entered: Option<&str>, gate_code: &str) -> bool {
    entered == Some(gate_code)
}

/// Holds the widget in `Minting` until `complete`. Dropped early (a failed
/// or abandoned mint), it puts the previous state and button back.
struct MintGuard<'a, H: Host> {
    state: &'a mut MintState,
    view: &'a mut WidgetView,
    host: &'a mut H,
    container_id: &'a str,
    previous: Option<(MintState, ButtonState)>,
}

impl<'a, H: Host> MintGuard<'a, H> {
    fn begin(
        state: &'a mut MintState,
        view: &'a mut WidgetView,
        host: &'a mut H,
        container_id: &'a str,
    ) -> Self {
        let previous = Some((*state, view.mint_button.clone()));
        *state = MintState::Minting;
        view.mint_button = ButtonState::busy();
        host.present(container_id, view);
        Self {
            state,
            view,
            host,
            container_id,
            previous,
        }
    }

    /// Fit to the container; keep the last size if it has gone, else the
    /// full-size layout.
    fn canvas_size(&self) -> CanvasSize {
        self.host
            .container_width(self.container_id)
            .map(CanvasSize::fit)
            .or(self.view.canvas)
            .unwrap_or(CanvasSize::BASE)
    }

    fn complete(mut self, size: CanvasSize) {
        self.previous = None;
        *self.state = MintState::Ready;
        self.view.mint_button = ButtonState::enabled(MINT_AGAIN_LABEL);
        self.view.canvas = Some(size);
        self.view.download_visible = true;
        self.host.present(self.container_id, &*self.view);
    }
}

impl<H: Host> Drop for MintGuard<'_, H> {
    fn drop(&mut self) {
        if let Some((state, button)) = self.previous.take() {
            *self.state = state;
            self.view.mint_button = button;
            self.host.present(self.container_id, &*self.view);
        }
    }
}

pub struct Widget<H: Host, C: Canvas = PngCanvas> {
    id: Uuid,
    container_id: String,
    settings: Settings,
    host: H,
    canvas: C,
    generator: TokenGenerator,
    validator: Validator,
    state: MintState,
    record: Option<MintRecord>,
    view: WidgetView,
}

impl<H: Host, C: Canvas> Widget<H, C> {
    /// Mount a widget backed by the system generator.
    pub fn init(
        host: H,
        canvas: C,
        container_id: &str,
        options: Options,
    ) -> Result<Self, MountNotFound<H>> {
        Self::init_with(host, canvas, container_id, options, TokenGenerator::system())
    }

    pub fn init_with(
        mut host: H,
        canvas: C,
        container_id: &str,
        options: Options,
        generator: TokenGenerator,
    ) -> Result<Self, MountNotFound<H>> {
        if host.container_width(container_id).is_none() {
            error!(container_id, "Container with ID \"{container_id}\" not found.");
            return Err(MountNotFound {
                container_id: container_id.to_string(),
                host,
            });
        }

        let settings = options.resolve();
        let view = WidgetView::new(&settings);
        host.present(container_id, &view);

        let id = Uuid::new_v4();
        info!(widget = %id, container_id, "widget mounted");

        Ok(Self {
            id,
            container_id: container_id.to_string(),
            generator: generator.with_timezone(settings.timezone),
            settings,
            host,
            canvas,
            validator: Validator::new(),
            state: MintState::Idle,
            record: None,
            view,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> MintState {
        self.state
    }

    pub fn record(&self) -> Option<&MintRecord> {
        self.record.as_ref()
    }

    pub fn view(&self) -> &WidgetView {
        &self.view
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn set_wallet(&mut self, wallet: impl Into<String>) {
        self.view.wallet = wallet.into();
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.view.name = name.into();
    }

    /// Generate a fresh record, draw it and unlock the download control.
    ///
    /// On failure, or if the returned future is dropped before it finishes,
    /// the previous record, state and controls are left as they were.
    pub async fn mint(&mut self) -> Result<&MintRecord, WidgetError> {
        let input = MintInput {
            wallet: self.view.wallet.clone(),
            name: self.view.name.clone(),
        };
        let validation = self.validator.validate(&input);
        if !validation.is_valid() {
            warn!(widget = %self.id, fields = ?validation.fields(), "mint rejected");
            self.host.notify(MISSING_INPUT_MESSAGE);
            return Err(WidgetError::MissingInput(validation.fields()));
        }

        let Self {
            id,
            container_id,
            settings,
            host,
            canvas,
            generator,
            state,
            record,
            view,
            ..
        } = self;
        let id = *id;

        let guard = MintGuard::begin(state, view, host, container_id.as_str());
        info!(widget = %id, "minting");

        if !settings.mint_delay.is_zero() {
            tokio::time::sleep(settings.mint_delay).await;
        }

        let minted = match generator.generate(&input.wallet, &input.name).await {
            Ok(minted) => minted,
            Err(e) => {
                drop(guard);
                warn!(widget = %id, error = %e, "mint failed");
                host.notify(&format!("Minting failed: {e}"));
                return Err(e.into());
            }
        };

        let size = guard.canvas_size();
        canvas.draw(&compose(&minted, size, &settings.primary_color));
        guard.complete(size);
        info!(
            widget = %id,
            serial = %minted.serial,
            digest = %minted.digest.short_hex(),
            width = size.width,
            "token minted"
        );

        Ok(&*record.insert(minted))
    }

    /// Prompt for the gate code and, if it matches, save the image.
    pub fn download(&mut self) -> Result<DownloadFile, WidgetError> {
        let record = match (&self.record, self.state) {
            (Some(record), MintState::Ready) => record,
            _ => return Err(WidgetError::NotReady),
        };

        let entered = self.host.prompt(GATE_PROMPT);
        if !gate_accepts(entered.as_deref(), &record.gate_code) {
            warn!(widget = %self.id, serial = %record.serial, "gate code rejected");
            self.host.notify(GATE_MISMATCH_MESSAGE);
            return Err(WidgetError::GateMismatch);
        }

        let file = DownloadFile::new(record, self.canvas.format(), self.canvas.encode()?);
        self.host.save(&file)?;
        info!(widget = %self.id, filename = %file.filename, hash = %file.hash, "token downloaded");
        Ok(file)
    }

    /// Refit the canvas to the container and redraw the current record.
    ///
    /// Returns the new size, or `None` when there is nothing to redraw.
    pub fn resize(&mut self) -> Option<CanvasSize> {
        let record = self.record.as_ref()?;
        let width = self.host.container_width(&self.container_id)?;
        let size = CanvasSize::fit(width);

        self.canvas
            .draw(&compose(record, size, &self.settings.primary_color));
        self.view.canvas = Some(size);
        self.host.present(&self.container_id, &self.view);
        debug!(widget = %self.id, width = size.width, height = size.height, "redrawn");
        Some(size)
    }
}
