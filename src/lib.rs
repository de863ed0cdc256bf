//! Emoji Mint - Deterministic Token Images with a Code-Gated Download
//!
//! # Guarantees
//! 1. Same record, same image (at any width, up to uniform scale)
//! 2. The digest binds serial and mint time, recomputed on every mint
//! 3. The gate code is independent randomness, visible only in the image
//! 4. Decorative randomness and secure randomness never mix

pub mod capabilities;
pub mod hashing;
pub mod random;
pub mod seeded;
pub mod config;
pub mod generator;
pub mod compositor;
pub mod canvas;
pub mod raster;
pub mod validation;
pub mod widget;

pub use capabilities::{CapabilityError, Clock, Digester, FixedClock, SecureRandom, SystemClock};
pub use hashing::{sha256_hex, Sha256Digester, TokenDigest};
pub use random::OsRandom;
pub use seeded::SeededStream;
pub use config::{ConfigError, Options, Settings, TimeZonePolicy};
pub use generator::{MintRecord, TokenGenerator};
pub use compositor::{compose, CanvasSize, Composition, DrawOp};
pub use canvas::{Canvas, CanvasError, ExportFormat, SvgCanvas};
pub use raster::PngCanvas;
pub use widget::{DownloadFile, Host, MintState, MountNotFound, Widget, WidgetError, WidgetView};

pub const WIDGET_VERSION: &str = env!("CARGO_PKG_VERSION");
