use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::adjustments::AdjustmentParams;
use crate::engine::{
    ensure_drawable, Bitmap, EngineResult, ExportFormat, FilterArgs, ImageEngine, Quality,
};
use crate::processing::worker::{guard_engine_call, WorkerChannel};

use super::{
    ExportCompletion, ExportCoordinator, ExportDispatch, PreviewCompletion, PreviewTicket,
};

/// Filters `source` with `params`, skipping the engine for identity parameters.
fn render(
    engine: &dyn ImageEngine,
    source: &Arc<Bitmap>,
    params: &AdjustmentParams,
) -> EngineResult<Arc<Bitmap>> {
    ensure_drawable(source)?;
    if params.is_identity() {
        return Ok(Arc::clone(source));
    }
    engine
        .process_all_filters(source, &FilterArgs::from(params))
        .map(Arc::new)
}

/// Drives [`ExportCoordinator`] tickets on background workers.
pub struct ExportRuntime {
    coordinator: ExportCoordinator,
    engine: Option<Arc<dyn ImageEngine>>,
    source: Arc<Bitmap>,
    previews: WorkerChannel<(PreviewTicket, EngineResult<String>)>,
    exports: WorkerChannel<EngineResult<PathBuf>>,
}

impl ExportRuntime {
    pub fn new(
        coordinator: ExportCoordinator,
        source: Arc<Bitmap>,
        engine: Option<Arc<dyn ImageEngine>>,
    ) -> Self {
        Self {
            coordinator,
            engine,
            source,
            previews: WorkerChannel::new(),
            exports: WorkerChannel::new(),
        }
    }

    pub const fn coordinator(&self) -> &ExportCoordinator {
        &self.coordinator
    }

    fn engine_available(&self) -> bool {
        self.engine.is_some()
    }

    pub fn select_format(&mut self, format: ExportFormat, params: AdjustmentParams) {
        let available = self.engine_available();
        let ticket = self.coordinator.select_format(format, params, available);
        self.spawn_preview(ticket);
    }

    pub fn set_quality_live(&mut self, quality: Quality) -> bool {
        self.coordinator.set_quality_live(quality)
    }

    pub fn commit_quality(&mut self, quality: Quality, params: AdjustmentParams) {
        let available = self.engine_available();
        let ticket = self.coordinator.commit_quality(quality, params, available);
        self.spawn_preview(ticket);
    }

    pub fn release_quality(&mut self, params: AdjustmentParams) {
        let available = self.engine_available();
        let ticket = self.coordinator.release_quality(params, available);
        self.spawn_preview(ticket);
    }

    /// Re-encodes the preview after the committed filter snapshot changed.
    pub fn refresh_preview(&mut self, params: AdjustmentParams) {
        let available = self.engine_available();
        let ticket = self.coordinator.begin_preview(params, available);
        self.spawn_preview(ticket);
    }

    fn spawn_preview(&self, ticket: Option<PreviewTicket>) {
        let (Some(ticket), Some(engine)) = (ticket, &self.engine) else {
            return;
        };
        let engine = Arc::clone(engine);
        let source = Arc::clone(&self.source);
        self.previews.spawn_worker_action(move || {
            let result = guard_engine_call(|| {
                let bitmap = render(engine.as_ref(), &source, &ticket.params)?;
                engine.preview_data_url(&bitmap, ticket.format, ticket.quality)
            });
            (ticket, result)
        });
    }

    pub fn export(&mut self, params: AdjustmentParams, image_name: Option<&str>) -> ExportDispatch {
        let available = self.engine_available();
        let dispatch = self.coordinator.export(params, image_name, available);
        if let (ExportDispatch::Issued(ticket), Some(engine)) = (&dispatch, &self.engine) {
            let ticket = ticket.clone();
            let engine = Arc::clone(engine);
            let source = Arc::clone(&self.source);
            self.exports.spawn_worker_action(move || {
                guard_engine_call(|| {
                    let bitmap = render(engine.as_ref(), &source, &ticket.params)?;
                    engine.encode_and_save(&bitmap, ticket.format, &ticket.filename, ticket.quality)
                })
            });
        }
        dispatch
    }

    pub fn poll_previews(&mut self) -> Vec<PreviewCompletion> {
        self.previews
            .drain()
            .into_iter()
            .map(|(ticket, result)| self.coordinator.finish_preview(&ticket, result))
            .collect()
    }

    pub fn poll_exports(&mut self) -> Vec<ExportCompletion> {
        self.exports
            .drain()
            .into_iter()
            .map(|result| self.coordinator.finish_export(result))
            .collect()
    }

    pub fn wait_preview(&mut self, timeout: Duration) -> Option<PreviewCompletion> {
        let (ticket, result) = self.previews.recv_timeout(timeout)?;
        Some(self.coordinator.finish_preview(&ticket, result))
    }

    pub fn wait_export(&mut self, timeout: Duration) -> Option<ExportCompletion> {
        let result = self.exports.recv_timeout(timeout)?;
        Some(self.coordinator.finish_export(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const WAIT: Duration = Duration::from_secs(5);

    #[derive(Debug, Clone, PartialEq)]
    struct SaveCall {
        args: Option<FilterArgs>,
        format: ExportFormat,
        filename: String,
        quality: Option<Quality>,
    }

    #[derive(Default)]
    struct RecordingEngine {
        last_args: Mutex<Option<FilterArgs>>,
        saves: Mutex<Vec<SaveCall>>,
        filter_calls: AtomicUsize,
        fail_save: bool,
    }

    impl ImageEngine for RecordingEngine {
        fn process_all_filters(&self, source: &Bitmap, args: &FilterArgs) -> EngineResult<Bitmap> {
            self.filter_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_args.lock().expect("args lock") = Some(*args);
            Ok(source.clone())
        }

        fn preview_data_url(
            &self,
            _bitmap: &Bitmap,
            format: ExportFormat,
            quality: Quality,
        ) -> EngineResult<String> {
            Ok(format!("data:{};q={}", format.mime_type(), quality.value()))
        }

        fn encode_and_save(
            &self,
            _bitmap: &Bitmap,
            format: ExportFormat,
            filename: &str,
            quality: Option<Quality>,
        ) -> EngineResult<PathBuf> {
            if self.fail_save {
                return Err(EngineError::Encode {
                    format,
                    reason: "encoder missing".into(),
                });
            }
            let args = self.last_args.lock().expect("args lock").take();
            self.saves.lock().expect("saves lock").push(SaveCall {
                args,
                format,
                filename: filename.to_string(),
                quality,
            });
            Ok(PathBuf::from("/tmp").join(filename))
        }

        fn identity(&self) -> String {
            "recording".to_string()
        }
    }

    fn source() -> Arc<Bitmap> {
        Arc::new(Bitmap::from_pixel(2, 2, image::Rgba([10, 20, 30, 255])))
    }

    fn runtime(engine: &Arc<RecordingEngine>, format: ExportFormat) -> ExportRuntime {
        let engine: Arc<dyn ImageEngine> = engine.clone();
        let coordinator =
            ExportCoordinator::new(format, Quality::DEFAULT, Quality::DEFAULT, "processed-image");
        ExportRuntime::new(coordinator, source(), Some(engine))
    }

    fn committed() -> AdjustmentParams {
        let mut params = AdjustmentParams::default();
        params.color.contrast = 35.0;
        params.filters.sharpen = 1.5;
        params
    }

    #[test]
    fn jpeg_export_saves_committed_params_at_quality() {
        let engine = Arc::new(RecordingEngine::default());
        let mut runtime = runtime(&engine, ExportFormat::Jpeg);

        let dispatch = runtime.export(committed(), Some("cat.png"));
        assert!(matches!(dispatch, ExportDispatch::Issued(_)));
        assert_eq!(
            runtime.wait_export(WAIT),
            Some(ExportCompletion::Saved(PathBuf::from("/tmp/cat.jpg")))
        );

        let saves = engine.saves.lock().expect("saves lock");
        assert_eq!(saves.len(), 1);
        assert_eq!(saves[0].format, ExportFormat::Jpeg);
        assert_eq!(saves[0].quality, Some(Quality::new(90.0)));
        assert_eq!(saves[0].args, Some(FilterArgs::from(&committed())));
    }

    #[test]
    fn png_export_ignores_quality() {
        let engine = Arc::new(RecordingEngine::default());
        let mut runtime = runtime(&engine, ExportFormat::Png);

        runtime.export(committed(), None);
        assert_eq!(
            runtime.wait_export(WAIT),
            Some(ExportCompletion::Saved(PathBuf::from(
                "/tmp/processed-image.png"
            )))
        );
        let saves = engine.saves.lock().expect("saves lock");
        assert_eq!(saves[0].quality, None);
        assert_eq!(saves[0].args, Some(FilterArgs::from(&committed())));
    }

    #[test]
    fn identity_preview_skips_filters() {
        let engine = Arc::new(RecordingEngine::default());
        let mut runtime = runtime(&engine, ExportFormat::Png);

        runtime.select_format(ExportFormat::Webp, AdjustmentParams::default());
        let completion = runtime.wait_preview(WAIT).expect("preview");
        assert!(matches!(completion, PreviewCompletion::Applied(_)));
        assert_eq!(engine.filter_calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            runtime.coordinator().preview().expect("preview").data_url,
            "data:image/webp;q=90"
        );
    }

    #[test]
    fn committed_quality_change_refreshes_preview() {
        let engine = Arc::new(RecordingEngine::default());
        let mut runtime = runtime(&engine, ExportFormat::Jpeg);

        assert!(runtime.set_quality_live(Quality::new(55.0)));
        assert!(runtime.poll_previews().is_empty());

        runtime.release_quality(committed());
        runtime.wait_preview(WAIT).expect("preview");
        assert_eq!(
            runtime.coordinator().preview().expect("preview").data_url,
            "data:image/jpeg;q=55"
        );
        assert_eq!(engine.filter_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_save_reports_failure() {
        let engine = Arc::new(RecordingEngine {
            fail_save: true,
            ..RecordingEngine::default()
        });
        let mut runtime = runtime(&engine, ExportFormat::Webp);

        runtime.export(committed(), None);
        assert_eq!(runtime.wait_export(WAIT), Some(ExportCompletion::Failed));
        assert!(!runtime.coordinator().is_exporting());
    }

    #[test]
    fn empty_source_fails_export_without_engine_call() {
        let engine = Arc::new(RecordingEngine::default());
        let dyn_engine: Arc<dyn ImageEngine> = engine.clone();
        let mut runtime = ExportRuntime::new(
            ExportCoordinator::default(),
            Arc::new(Bitmap::new(0, 0)),
            Some(dyn_engine),
        );

        runtime.export(committed(), None);
        assert_eq!(runtime.wait_export(WAIT), Some(ExportCompletion::Failed));
        assert_eq!(engine.filter_calls.load(Ordering::SeqCst), 0);
        assert!(engine.saves.lock().expect("saves lock").is_empty());
    }
}
