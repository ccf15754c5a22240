pub mod adjustments;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod geometry;
pub mod input;
pub mod logging;
pub mod notification;
pub mod panel;
pub mod processing;
pub mod state;
pub mod viewer;
pub mod viewport;
pub use error::{AppError, AppResult};

use std::sync::Arc;

use engine::{Bitmap, ImageEngine};
use geometry::Rect;
use notification::DesktopNotifier;
use viewer::{ListenerHost, ViewerSession};

/// Entrypoint used by host shells: configures logging, loads the user config
/// and opens a viewer session for `source`.
pub fn open_viewer(
    source: Arc<Bitmap>,
    image_name: Option<&str>,
    engine: Option<Arc<dyn ImageEngine>>,
    host: Box<dyn ListenerHost>,
    bounds: Option<Rect>,
) -> AppResult<ViewerSession> {
    logging::init();
    let config = config::load_viewer_config();
    tracing::info!(
        engine = engine.is_some(),
        format = ?config.default_format,
        "starting pixtune viewer"
    );

    let mut session = ViewerSession::new(source, engine, &config, host, Box::new(DesktopNotifier));
    if let Some(name) = image_name {
        session = session.with_image_name(name);
    }
    session.open(bounds)?;

    tracing::info!("viewer ready with state={:?}", session.state());
    Ok(session)
}
