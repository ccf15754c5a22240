//! Viewer session: one opened image with its viewport, edit panel and pipelines.
//!
//! The host forwards raw events through [`ViewerSession::handle_input`] and
//! calls [`ViewerSession::pump`] from its event loop to apply finished
//! engine work. Nothing here blocks the calling thread except the explicit
//! `settle` helper.

mod listeners;

pub use listeners::{ListenerHost, ListenerId, ListenerSet};

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::adjustments::{AdjustmentKey, AdjustmentParams, AdjustmentState, AdjustmentValue};
use crate::config::ViewerConfig;
use crate::engine::{Bitmap, EngineError, ExportFormat, ImageEngine, Quality};
use crate::error::AppResult;
use crate::export::{
    ExportCompletion, ExportCoordinator, ExportDispatch, ExportRuntime, PreviewCompletion,
};
use crate::geometry::{Point, Rect};
use crate::input::{
    resolve_shortcut, PointerCapture, PointerOwner, PointerTarget, ShortcutAction, ViewerInput,
};
use crate::notification::{Notifier, EXPORT_FAILED, PROCESSING_FAILED};
use crate::panel::PanelDrag;
use crate::processing::{Completion, Dispatch, ProcessingRuntime, RequestId};
use crate::state::{StateMachine, ViewerEvent, ViewerState};
use crate::viewport::Viewport;

pub const NO_ENGINE_LABEL: &str = "No instance";

/// Contents of the debug overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugOverlay {
    pub engine: String,
    pub zoom_percent: u32,
    pub processing: bool,
    pub previewing: bool,
    pub exporting: bool,
    pub latest_request: Option<RequestId>,
}

/// Everything a `pump` applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PumpReport {
    pub processing: Vec<Completion>,
    pub previews: Vec<PreviewCompletion>,
    pub exports: Vec<ExportCompletion>,
}

impl PumpReport {
    pub fn is_empty(&self) -> bool {
        self.processing.is_empty() && self.previews.is_empty() && self.exports.is_empty()
    }
}

pub struct ViewerSession {
    machine: StateMachine,
    viewport: Viewport,
    panel: Option<PanelDrag>,
    capture: PointerCapture,
    adjustments: AdjustmentState,
    processing: ProcessingRuntime,
    export: ExportRuntime,
    listeners: ListenerSet,
    host: Box<dyn ListenerHost>,
    notifier: Box<dyn Notifier>,
    image_name: Option<String>,
    show_edit_panel: bool,
    show_debug_menu: bool,
}

impl ViewerSession {
    pub fn new(
        source: Arc<Bitmap>,
        engine: Option<Arc<dyn ImageEngine>>,
        config: &ViewerConfig,
        host: Box<dyn ListenerHost>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        let coordinator = ExportCoordinator::new(
            config.default_format,
            config.jpeg_quality,
            config.webp_quality,
            config.export_file_stem.clone(),
        );
        Self {
            machine: StateMachine::new(),
            viewport: Viewport::new(),
            panel: None,
            capture: PointerCapture::new(),
            adjustments: AdjustmentState::new(),
            processing: ProcessingRuntime::new(Arc::clone(&source), engine.clone()),
            export: ExportRuntime::new(coordinator, source, engine),
            listeners: ListenerSet::new(),
            host,
            notifier,
            image_name: None,
            show_edit_panel: config.show_edit_panel,
            show_debug_menu: false,
        }
    }

    /// Name of the opened file, used for the export filename.
    pub fn with_image_name(mut self, name: impl Into<String>) -> Self {
        self.image_name = Some(name.into());
        self
    }

    pub fn state(&self) -> ViewerState {
        self.machine.state()
    }

    pub fn is_open(&self) -> bool {
        self.machine.state().is_open()
    }

    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub const fn panel(&self) -> Option<&PanelDrag> {
        self.panel.as_ref()
    }

    pub const fn adjustments(&self) -> &AdjustmentState {
        &self.adjustments
    }

    pub const fn processing(&self) -> &ProcessingRuntime {
        &self.processing
    }

    pub const fn export_state(&self) -> &ExportCoordinator {
        self.export.coordinator()
    }

    pub const fn listeners(&self) -> &ListenerSet {
        &self.listeners
    }

    pub const fn show_edit_panel(&self) -> bool {
        self.show_edit_panel
    }

    pub const fn show_debug_menu(&self) -> bool {
        self.show_debug_menu
    }

    pub fn image_name(&self) -> Option<&str> {
        self.image_name.as_deref()
    }

    /// Bitmap that should be on screen right now.
    pub fn displayed_image(&self) -> Arc<Bitmap> {
        self.processing.displayed_bitmap()
    }

    pub fn open(&mut self, bounds: Option<Rect>) -> AppResult<()> {
        self.machine.transition(ViewerEvent::Open)?;
        self.viewport.open(bounds);
        self.panel = bounds.map(|bounds| PanelDrag::new(bounds.size()));
        self.capture = PointerCapture::new();
        self.listeners.attach_all(self.host.as_mut());
        tracing::info!(
            image = self.image_name.as_deref().unwrap_or("<unnamed>"),
            "viewer opened"
        );
        self.submit(*self.adjustments.committed());
        Ok(())
    }

    pub fn close(&mut self) -> AppResult<()> {
        self.machine.transition(ViewerEvent::Close)?;
        self.release_gestures();
        self.listeners.detach_all(self.host.as_mut());
        tracing::info!("viewer closed");
        Ok(())
    }

    fn release_gestures(&mut self) {
        self.capture.release();
        self.viewport.pointer_up();
        self.viewport.touch_end();
        if let Some(panel) = self.panel.as_mut() {
            panel.pointer_up();
        }
    }

    /// Applies a host event; returns whether anything visible changed.
    pub fn handle_input(&mut self, input: ViewerInput) -> bool {
        if !self.is_open() {
            return false;
        }
        if let Some(kind) = input.listener() {
            if !self.listeners.is_attached(kind) {
                return false;
            }
        }

        match input {
            ViewerInput::Wheel { client, delta_y } => self.viewport.apply_wheel(client, delta_y),
            ViewerInput::PointerDown { target, client } => self.pointer_down(target, client),
            ViewerInput::PointerMove { client } => match self.capture.owner() {
                Some(PointerOwner::Viewport) => self.viewport.pointer_move(client),
                Some(PointerOwner::Panel) => self
                    .panel
                    .as_mut()
                    .is_some_and(|panel| panel.pointer_move(client)),
                None => false,
            },
            ViewerInput::PointerUp => {
                let owner = self.capture.release();
                self.viewport.pointer_up();
                if let Some(panel) = self.panel.as_mut() {
                    panel.pointer_up();
                }
                owner.is_some()
            }
            ViewerInput::TouchStart { contacts } => {
                self.viewport.touch_start(&contacts);
                self.viewport.touch_session().is_some()
            }
            ViewerInput::TouchMove { contacts } => self.viewport.touch_move(&contacts),
            ViewerInput::TouchEnd => {
                let active = self.viewport.touch_session().is_some();
                self.viewport.touch_end();
                active
            }
            ViewerInput::Resize { bounds } => {
                self.viewport.set_bounds(bounds);
                match self.panel.as_mut() {
                    Some(panel) => panel.resize(bounds.size()),
                    None => self.panel = Some(PanelDrag::new(bounds.size())),
                }
                true
            }
            ViewerInput::Key { key, modifiers } => {
                match resolve_shortcut(key, modifiers, self.is_open()) {
                    Some(action) => self.apply_shortcut(action),
                    None => false,
                }
            }
        }
    }

    fn pointer_down(&mut self, target: PointerTarget, client: Point) -> bool {
        let target = match target {
            PointerTarget::PanelHeader if !self.show_edit_panel || self.panel.is_none() => {
                PointerTarget::Chrome
            }
            other => other,
        };
        match self.capture.press(target) {
            Some(PointerOwner::Viewport) => {
                self.viewport.pointer_down(client);
                true
            }
            Some(PointerOwner::Panel) => {
                if let Some(panel) = self.panel.as_mut() {
                    panel.pointer_down(client);
                }
                true
            }
            None => false,
        }
    }

    fn apply_shortcut(&mut self, action: ShortcutAction) -> bool {
        tracing::debug!(?action, "shortcut");
        match action {
            ShortcutAction::CloseViewer => self.close().is_ok(),
            ShortcutAction::ZoomIn => {
                self.viewport.zoom_in();
                true
            }
            ShortcutAction::ZoomOut => {
                self.viewport.zoom_out();
                true
            }
            ShortcutAction::ResetView => {
                self.viewport.reset();
                true
            }
            ShortcutAction::ToggleEditPanel => {
                self.toggle_edit_panel();
                true
            }
            ShortcutAction::ToggleDebugMenu => {
                self.toggle_debug_menu();
                true
            }
        }
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    pub fn reset_view(&mut self) {
        self.viewport.reset();
    }

    pub fn toggle_edit_panel(&mut self) {
        self.show_edit_panel = !self.show_edit_panel;
        if !self.show_edit_panel && self.capture.owner() == Some(PointerOwner::Panel) {
            self.capture.release();
            if let Some(panel) = self.panel.as_mut() {
                panel.pointer_up();
            }
        }
    }

    pub fn toggle_debug_menu(&mut self) {
        self.show_debug_menu = !self.show_debug_menu;
    }

    pub fn update_adjustment(&mut self, key: AdjustmentKey, value: AdjustmentValue) -> AppResult<()> {
        self.adjustments.update(key, value)?;
        Ok(())
    }

    pub fn commit_adjustment(
        &mut self,
        key: AdjustmentKey,
        value: AdjustmentValue,
    ) -> AppResult<Option<Dispatch>> {
        let committed = self.adjustments.commit(key, value)?;
        Ok(committed.map(|params| self.submit(params)))
    }

    /// Slider release without a separate commit event.
    pub fn release_adjustment(&mut self, key: AdjustmentKey) -> Option<Dispatch> {
        let committed = self.adjustments.release(key)?;
        Some(self.submit(committed))
    }

    pub fn reset_adjustment(&mut self, key: AdjustmentKey) -> Option<Dispatch> {
        let committed = self.adjustments.reset_key(key)?;
        Some(self.submit(committed))
    }

    pub fn reset_all_adjustments(&mut self) -> Option<Dispatch> {
        let committed = self.adjustments.reset_all()?;
        Some(self.submit(committed))
    }

    fn submit(&mut self, params: AdjustmentParams) -> Dispatch {
        let dispatch = self.processing.submit(params);
        if self.export.coordinator().latest_preview_request().is_some() {
            self.export.refresh_preview(params);
        }
        dispatch
    }

    pub fn select_format(&mut self, format: ExportFormat) {
        let params = *self.adjustments.committed();
        self.export.select_format(format, params);
    }

    pub fn set_quality(&mut self, quality: Quality) -> bool {
        self.export.set_quality_live(quality)
    }

    pub fn commit_quality(&mut self, quality: Quality) {
        let params = *self.adjustments.committed();
        self.export.commit_quality(quality, params);
    }

    pub fn release_quality(&mut self) {
        let params = *self.adjustments.committed();
        self.export.release_quality(params);
    }

    /// Starts the final export of the committed parameters.
    pub fn export(&mut self) -> ExportDispatch {
        let params = *self.adjustments.committed();
        self.export.export(params, self.image_name.as_deref())
    }

    /// Applies finished engine work; call from the host event loop.
    pub fn pump(&mut self) -> PumpReport {
        let report = self.collect();
        self.surface_failures(&report);
        report
    }

    fn collect(&mut self) -> PumpReport {
        PumpReport {
            processing: self.processing.poll(),
            previews: self.export.poll_previews(),
            exports: self.export.poll_exports(),
        }
    }

    /// Blocks until in-flight processing and export work finished or `timeout` elapsed.
    pub fn settle(&mut self, timeout: Duration) -> PumpReport {
        let deadline = Instant::now() + timeout;
        let mut report = PumpReport {
            processing: self.processing.wait_idle(timeout),
            ..PumpReport::default()
        };
        while self.export.coordinator().is_exporting() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.export.wait_export(remaining) {
                Some(completion) => report.exports.push(completion),
                None => break,
            }
        }
        while self.export.coordinator().is_preview_busy() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.export.wait_preview(remaining) {
                Some(completion) => report.previews.push(completion),
                None => break,
            }
        }
        let rest = self.collect();
        report.processing.extend(rest.processing);
        report.previews.extend(rest.previews);
        report.exports.extend(rest.exports);
        self.surface_failures(&report);
        report
    }

    fn surface_failures(&self, report: &PumpReport) {
        if report.processing.iter().any(|completion| completion.is_failure()) {
            self.notifier.notify(PROCESSING_FAILED);
        }
        if report
            .exports
            .iter()
            .any(|completion| *completion == ExportCompletion::Failed)
        {
            self.notifier.notify(EXPORT_FAILED);
        }
    }

    /// Identity of the loaded engine.
    pub fn probe_engine(&self) -> AppResult<String> {
        let engine = self.processing.engine().ok_or(EngineError::Unavailable)?;
        Ok(engine.identity())
    }

    /// Overlay contents, or `None` while the debug menu is hidden.
    pub fn debug_overlay(&self) -> Option<DebugOverlay> {
        if !self.show_debug_menu {
            return None;
        }
        let export = self.export.coordinator();
        Some(DebugOverlay {
            engine: self
                .probe_engine()
                .unwrap_or_else(|_| NO_ENGINE_LABEL.to_string()),
            zoom_percent: self.viewport.zoom_percent(),
            processing: self.processing.is_busy(),
            previewing: export.is_preview_busy(),
            exporting: export.is_exporting(),
            latest_request: self.processing.coordinator().latest(),
        })
    }
}

impl Drop for ViewerSession {
    fn drop(&mut self) {
        if !self.listeners.is_empty() {
            self.listeners.detach_all(self.host.as_mut());
        }
    }
}
