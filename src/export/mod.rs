//! Format/quality selection, encode previews and the final export request.
//!
//! Quality previews and exports run on their own channels so that preview
//! churn can never hold up an export.

mod runtime;

pub use runtime::ExportRuntime;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::adjustments::AdjustmentParams;
use crate::engine::{EngineResult, ExportFormat, Quality};
use crate::processing::{RequestId, RequestSequence};

/// PNG previews are always requested at full quality.
pub const PNG_PREVIEW_QUALITY: Quality = Quality::MAX;
pub const DEFAULT_FILE_STEM: &str = "processed-image";

/// Live/committed pair behind a quality slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityTier {
    live: Quality,
    committed: Quality,
}

impl QualityTier {
    pub const fn new(quality: Quality) -> Self {
        Self {
            live: quality,
            committed: quality,
        }
    }

    pub const fn live(&self) -> Quality {
        self.live
    }

    pub const fn committed(&self) -> Quality {
        self.committed
    }
}

/// Encoded approximation shown next to the format picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewResult {
    pub data_url: String,
    pub request: RequestId,
    pub format: ExportFormat,
    pub quality: Quality,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewTicket {
    pub id: RequestId,
    pub params: AdjustmentParams,
    pub format: ExportFormat,
    pub quality: Quality,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewCompletion {
    Applied(RequestId),
    Superseded(RequestId),
    Failed(RequestId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportTicket {
    pub params: AdjustmentParams,
    pub format: ExportFormat,
    /// `None` for PNG.
    pub quality: Option<Quality>,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExportDispatch {
    Issued(ExportTicket),
    /// An export is already running.
    Busy,
    /// No engine loaded; nothing was requested.
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportCompletion {
    Saved(PathBuf),
    Failed,
}

#[derive(Debug)]
pub struct ExportCoordinator {
    format: ExportFormat,
    jpeg: QualityTier,
    webp: QualityTier,
    file_stem: String,
    sequence: RequestSequence,
    latest_preview: Option<RequestId>,
    outstanding_previews: BTreeSet<RequestId>,
    preview: Option<PreviewResult>,
    exporting: bool,
}

impl Default for ExportCoordinator {
    fn default() -> Self {
        Self::new(
            ExportFormat::default(),
            Quality::DEFAULT,
            Quality::DEFAULT,
            DEFAULT_FILE_STEM,
        )
    }
}

impl ExportCoordinator {
    pub fn new(
        format: ExportFormat,
        jpeg_quality: Quality,
        webp_quality: Quality,
        file_stem: impl Into<String>,
    ) -> Self {
        Self {
            format,
            jpeg: QualityTier::new(jpeg_quality),
            webp: QualityTier::new(webp_quality),
            file_stem: file_stem.into(),
            sequence: RequestSequence::default(),
            latest_preview: None,
            outstanding_previews: BTreeSet::new(),
            preview: None,
            exporting: false,
        }
    }

    pub const fn format(&self) -> ExportFormat {
        self.format
    }

    pub const fn preview(&self) -> Option<&PreviewResult> {
        self.preview.as_ref()
    }

    pub const fn is_exporting(&self) -> bool {
        self.exporting
    }

    pub fn is_preview_busy(&self) -> bool {
        self.latest_preview
            .is_some_and(|latest| self.outstanding_previews.contains(&latest))
    }

    pub const fn latest_preview_request(&self) -> Option<RequestId> {
        self.latest_preview
    }

    /// Slider pair for `format`; PNG has none.
    pub const fn quality_tier(&self, format: ExportFormat) -> Option<&QualityTier> {
        match format {
            ExportFormat::Png => None,
            ExportFormat::Jpeg => Some(&self.jpeg),
            ExportFormat::Webp => Some(&self.webp),
        }
    }

    fn quality_tier_mut(&mut self, format: ExportFormat) -> Option<&mut QualityTier> {
        match format {
            ExportFormat::Png => None,
            ExportFormat::Jpeg => Some(&mut self.jpeg),
            ExportFormat::Webp => Some(&mut self.webp),
        }
    }

    /// Quality a preview of `format` is encoded at.
    pub fn preview_quality(&self, format: ExportFormat) -> Quality {
        self.quality_tier(format)
            .map_or(PNG_PREVIEW_QUALITY, QualityTier::committed)
    }

    /// Switches the output format and requests a matching preview.
    pub fn select_format(
        &mut self,
        format: ExportFormat,
        params: AdjustmentParams,
        engine_available: bool,
    ) -> Option<PreviewTicket> {
        if format != self.format {
            tracing::debug!(from = ?self.format, to = ?format, "export format selected");
        }
        self.format = format;
        self.begin_preview(params, engine_available)
    }

    /// Moves the current format's slider without touching the engine.
    pub fn set_quality_live(&mut self, quality: Quality) -> bool {
        match self.quality_tier_mut(self.format) {
            Some(tier) => {
                tier.live = quality;
                true
            }
            None => false,
        }
    }

    /// Finalises the current format's quality and requests a preview if it changed.
    pub fn commit_quality(
        &mut self,
        quality: Quality,
        params: AdjustmentParams,
        engine_available: bool,
    ) -> Option<PreviewTicket> {
        let tier = self.quality_tier_mut(self.format)?;
        tier.live = quality;
        if tier.committed == quality {
            return None;
        }
        tier.committed = quality;
        self.begin_preview(params, engine_available)
    }

    /// Commits the slider's live position, as on pointer release.
    pub fn release_quality(
        &mut self,
        params: AdjustmentParams,
        engine_available: bool,
    ) -> Option<PreviewTicket> {
        let live = self.quality_tier(self.format)?.live();
        self.commit_quality(live, params, engine_available)
    }

    pub fn begin_preview(
        &mut self,
        params: AdjustmentParams,
        engine_available: bool,
    ) -> Option<PreviewTicket> {
        let id = self.sequence.next();
        self.latest_preview = Some(id);
        if !engine_available {
            tracing::debug!(request = id.value(), "no image engine; skipping quality preview");
            return None;
        }
        self.outstanding_previews.insert(id);
        let ticket = PreviewTicket {
            id,
            params,
            format: self.format,
            quality: self.preview_quality(self.format),
        };
        tracing::debug!(
            request = id.value(),
            format = ?ticket.format,
            quality = ticket.quality.value(),
            "quality preview requested"
        );
        Some(ticket)
    }

    pub fn finish_preview(
        &mut self,
        ticket: &PreviewTicket,
        result: EngineResult<String>,
    ) -> PreviewCompletion {
        let id = ticket.id;
        self.outstanding_previews.remove(&id);
        if self.latest_preview != Some(id) {
            return PreviewCompletion::Superseded(id);
        }
        match result {
            Ok(data_url) => {
                self.preview = Some(PreviewResult {
                    data_url,
                    request: id,
                    format: ticket.format,
                    quality: ticket.quality,
                });
                PreviewCompletion::Applied(id)
            }
            Err(err) => {
                tracing::warn!(request = id.value(), %err, "quality preview failed");
                PreviewCompletion::Failed(id)
            }
        }
    }

    /// File name handed to the engine's save routine.
    pub fn export_filename(&self, image_name: Option<&str>) -> String {
        let stem = image_name
            .and_then(|name| Path::new(name).file_stem())
            .and_then(|stem| stem.to_str())
            .filter(|stem| !stem.is_empty())
            .unwrap_or(&self.file_stem);
        format!("{stem}.{}", self.format.extension())
    }

    /// Requests the final encode of the committed parameters.
    pub fn export(
        &mut self,
        params: AdjustmentParams,
        image_name: Option<&str>,
        engine_available: bool,
    ) -> ExportDispatch {
        if !engine_available {
            tracing::warn!("export requested without an image engine");
            return ExportDispatch::Unavailable;
        }
        if self.exporting {
            tracing::debug!("export already running");
            return ExportDispatch::Busy;
        }
        self.exporting = true;
        let ticket = ExportTicket {
            params,
            format: self.format,
            quality: self
                .quality_tier(self.format)
                .map(QualityTier::committed),
            filename: self.export_filename(image_name),
        };
        tracing::info!(
            format = ?ticket.format,
            quality = ?ticket.quality.map(Quality::value),
            filename = %ticket.filename,
            "export started"
        );
        ExportDispatch::Issued(ticket)
    }

    pub fn finish_export(&mut self, result: EngineResult<PathBuf>) -> ExportCompletion {
        self.exporting = false;
        match result {
            Ok(path) => {
                tracing::info!(path = %path.display(), "export saved");
                ExportCompletion::Saved(path)
            }
            Err(err) => {
                tracing::warn!(%err, "export failed");
                ExportCompletion::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineError;

    fn blurred() -> AdjustmentParams {
        let mut params = AdjustmentParams::default();
        params.filters.blur = 6.0;
        params
    }

    #[test]
    fn png_preview_uses_full_quality() {
        let mut coordinator = ExportCoordinator::default();
        let ticket = coordinator
            .select_format(ExportFormat::Png, blurred(), true)
            .expect("ticket");
        assert_eq!(ticket.quality, PNG_PREVIEW_QUALITY);

        let ticket = coordinator
            .select_format(ExportFormat::Jpeg, blurred(), true)
            .expect("ticket");
        assert_eq!(ticket.quality, Quality::DEFAULT);
        assert_eq!(ticket.format, ExportFormat::Jpeg);
    }

    #[test]
    fn live_quality_does_not_request_preview() {
        let mut coordinator = ExportCoordinator::default();
        coordinator.select_format(ExportFormat::Webp, blurred(), true);
        let before = coordinator.latest_preview_request();

        assert!(coordinator.set_quality_live(Quality::new(40.0)));
        assert_eq!(coordinator.latest_preview_request(), before);
        let tier = coordinator.quality_tier(ExportFormat::Webp).expect("tier");
        assert_eq!(tier.live().value(), 40);
        assert_eq!(tier.committed(), Quality::DEFAULT);

        let ticket = coordinator
            .release_quality(blurred(), true)
            .expect("committed change");
        assert_eq!(ticket.quality.value(), 40);
        assert_eq!(coordinator.release_quality(blurred(), true), None);
    }

    #[test]
    fn png_has_no_quality_slider() {
        let mut coordinator = ExportCoordinator::default();
        assert!(!coordinator.set_quality_live(Quality::new(50.0)));
        assert_eq!(
            coordinator.commit_quality(Quality::new(50.0), blurred(), true),
            None
        );
    }

    #[test]
    fn stale_preview_is_discarded() {
        let mut coordinator = ExportCoordinator::default();
        let first = coordinator
            .select_format(ExportFormat::Jpeg, blurred(), true)
            .expect("first");
        let second = coordinator
            .commit_quality(Quality::new(60.0), blurred(), true)
            .expect("second");
        assert!(coordinator.is_preview_busy());

        assert_eq!(
            coordinator.finish_preview(&second, Ok("data:second".into())),
            PreviewCompletion::Applied(second.id)
        );
        assert_eq!(
            coordinator.finish_preview(&first, Ok("data:first".into())),
            PreviewCompletion::Superseded(first.id)
        );
        let preview = coordinator.preview().expect("preview");
        assert_eq!(preview.data_url, "data:second");
        assert_eq!(preview.quality.value(), 60);
        assert!(!coordinator.is_preview_busy());
    }

    #[test]
    fn failed_preview_keeps_previous_result() {
        let mut coordinator = ExportCoordinator::default();
        let first = coordinator
            .select_format(ExportFormat::Png, blurred(), true)
            .expect("first");
        coordinator.finish_preview(&first, Ok("data:png".into()));
        let second = coordinator
            .select_format(ExportFormat::Jpeg, blurred(), true)
            .expect("second");
        assert_eq!(
            coordinator.finish_preview(&second, Err(EngineError::Encode {
                format: ExportFormat::Jpeg,
                reason: "unsupported".into(),
            })),
            PreviewCompletion::Failed(second.id)
        );
        assert_eq!(coordinator.preview().expect("preview").data_url, "data:png");
    }

    #[test]
    fn export_uses_committed_quality_and_blocks_reentry() {
        let mut coordinator = ExportCoordinator::default();
        coordinator.select_format(ExportFormat::Jpeg, blurred(), true);
        coordinator.set_quality_live(Quality::new(30.0));

        let ticket = match coordinator.export(blurred(), Some("holiday.jpeg"), true) {
            ExportDispatch::Issued(ticket) => ticket,
            other => panic!("unexpected dispatch: {other:?}"),
        };
        assert_eq!(ticket.quality, Some(Quality::DEFAULT));
        assert_eq!(ticket.filename, "holiday.jpg");
        assert!(coordinator.is_exporting());
        assert_eq!(
            coordinator.export(blurred(), None, true),
            ExportDispatch::Busy
        );

        let completion = coordinator.finish_export(Ok(PathBuf::from("/tmp/holiday.jpg")));
        assert_eq!(completion, ExportCompletion::Saved(PathBuf::from("/tmp/holiday.jpg")));
        assert!(!coordinator.is_exporting());
    }

    #[test]
    fn png_export_has_no_quality_and_falls_back_to_stem() {
        let mut coordinator = ExportCoordinator::default();
        let ticket = match coordinator.export(blurred(), None, true) {
            ExportDispatch::Issued(ticket) => ticket,
            other => panic!("unexpected dispatch: {other:?}"),
        };
        assert_eq!(ticket.quality, None);
        assert_eq!(ticket.filename, "processed-image.png");
    }

    #[test]
    fn export_without_engine_is_unavailable() {
        let mut coordinator = ExportCoordinator::default();
        assert_eq!(
            coordinator.export(blurred(), None, false),
            ExportDispatch::Unavailable
        );
        assert!(!coordinator.is_exporting());
        assert_eq!(coordinator.select_format(ExportFormat::Webp, blurred(), false), None);
        assert_eq!(coordinator.format(), ExportFormat::Webp);
    }

    #[test]
    fn failed_export_clears_busy_flag() {
        let mut coordinator = ExportCoordinator::default();
        coordinator.export(blurred(), None, true);
        let completion = coordinator.finish_export(Err(EngineError::Io(std::io::Error::other(
            "disk full",
        ))));
        assert_eq!(completion, ExportCompletion::Failed);
        assert!(!coordinator.is_exporting());
    }
}
