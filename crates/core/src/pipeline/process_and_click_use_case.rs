use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::clicking::domain::click_dispatcher::ClickDispatcher;
use crate::detection::domain::cell_detector::CellDetector;
use crate::detection::domain::detector_config::CellColor;
use crate::imaging::domain::frame_source::FrameSource;
use crate::imaging::domain::image_writer::ImageWriter;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::settings::config_handle::ConfigHandle;
use crate::shared::cancellation::CancellationToken;
use crate::shared::point::Point;
use crate::shared::region::Region;

/// Result of one capture → detect → (click) run.
///
/// Failures are reported in `error` rather than returned, so a caller
/// always learns how many cells were seen and clicked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessOutcome {
    pub cell_count: usize,
    pub click_count: usize,
    /// Region-local centers.
    pub centers: Vec<Point>,
    pub error: Option<String>,
}

/// Capture a region, detect cells, save the annotated debug image and,
/// when a dispatcher is attached, click every cell.
///
/// Without a dispatcher this is preview mode: nothing is clicked.
pub struct ProcessAndClickUseCase {
    source: Box<dyn FrameSource>,
    image_writer: Box<dyn ImageWriter>,
    detector: Box<dyn CellDetector>,
    dispatcher: Option<ClickDispatcher>,
    config: Arc<ConfigHandle>,
    debug_image_path: PathBuf,
    logger: Box<dyn PipelineLogger>,
}

impl ProcessAndClickUseCase {
    pub fn new(
        source: Box<dyn FrameSource>,
        image_writer: Box<dyn ImageWriter>,
        detector: Box<dyn CellDetector>,
        dispatcher: Option<ClickDispatcher>,
        config: Arc<ConfigHandle>,
        debug_image_path: PathBuf,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            source,
            image_writer,
            detector,
            dispatcher,
            config,
            debug_image_path,
            logger,
        }
    }

    pub fn debug_image_path(&self) -> &Path {
        &self.debug_image_path
    }

    pub fn execute(
        &mut self,
        region: Option<&Region>,
        color: CellColor,
        cancel: &CancellationToken,
    ) -> ProcessOutcome {
        self.logger.begin_run();
        let config = self.config.current();

        let t0 = Instant::now();
        let frame = match self.source.capture(region) {
            Ok(frame) => frame,
            Err(e) => {
                log::error!("Capture failed: {e}");
                self.logger.info(&format!("Capture failed: {e}"));
                return ProcessOutcome {
                    error: Some(e.to_string()),
                    ..ProcessOutcome::default()
                };
            }
        };
        self.logger.timing("capture", elapsed_ms(t0));

        let t0 = Instant::now();
        let detection = self.detector.detect(&frame, color, &config);
        self.logger.timing("detect", elapsed_ms(t0));
        self.logger.metric("cells", detection.count() as f64);
        if detection.separated {
            self.logger.info("Overlapping cells separated by watershed");
        }

        let mut write_error = None;
        if let Err(e) = self
            .image_writer
            .write(&self.debug_image_path, &detection.annotated)
        {
            log::warn!(
                "Failed to write debug image {}: {e}",
                self.debug_image_path.display()
            );
            write_error = Some(e.to_string());
        }

        let mut outcome = ProcessOutcome {
            cell_count: detection.count(),
            centers: detection.centers,
            ..ProcessOutcome::default()
        };

        if let Some(dispatcher) = self.dispatcher.as_mut() {
            if !outcome.centers.is_empty() {
                let click_region = region
                    .copied()
                    .unwrap_or_else(|| Region::full_frame(frame.width(), frame.height()));

                let t0 = Instant::now();
                let clicks = dispatcher.dispatch(&outcome.centers, &click_region, cancel);
                self.logger.timing("click", elapsed_ms(t0));
                self.logger.metric("clicks", clicks.clicked as f64);

                if clicks.interrupted {
                    self.logger.info("Clicking interrupted by user");
                }
                outcome.click_count = clicks.clicked;
                outcome.error = clicks.error;
            }
        }

        if outcome.error.is_none() {
            outcome.error = write_error;
        }

        self.logger.info(&format!(
            "Detected {} cells, clicked {}",
            outcome.cell_count, outcome.click_count
        ));
        self.logger.summary();
        outcome
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clicking::domain::click_delay::ClickDelay;
    use crate::clicking::domain::pointer::Pointer;
    use crate::detection::domain::cell_detector::Detection;
    use crate::detection::domain::detector_config::DetectorConfig;
    use crate::detection::infrastructure::color_blob_detector::ColorBlobDetector;
    use crate::pipeline::pipeline_logger::NullPipelineLogger;
    use crate::shared::frame::Frame;
    use std::sync::Mutex;
    use std::time::Duration;

    // --- Stubs ---

    struct StubSource {
        frame: Option<Frame>,
        requested: Arc<Mutex<Vec<Option<Region>>>>,
    }

    impl StubSource {
        fn new(frame: Frame) -> Self {
            Self {
                frame: Some(frame),
                requested: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn failing() -> Self {
            Self {
                frame: None,
                requested: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl FrameSource for StubSource {
        fn capture(
            &mut self,
            region: Option<&Region>,
        ) -> Result<Frame, Box<dyn std::error::Error>> {
            self.requested.lock().unwrap().push(region.copied());
            self.frame.clone().ok_or_else(|| "screen not available".into())
        }
    }

    struct StubImageWriter {
        written: Arc<Mutex<Vec<(PathBuf, Frame)>>>,
        fail: bool,
    }

    impl StubImageWriter {
        fn new() -> Self {
            Self {
                written: Arc::new(Mutex::new(Vec::new())),
                fail: false,
            }
        }
    }

    impl ImageWriter for StubImageWriter {
        fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
            if self.fail {
                return Err("disk full".into());
            }
            self.written
                .lock()
                .unwrap()
                .push((path.to_path_buf(), frame.clone()));
            Ok(())
        }
    }

    struct StubDetector {
        centers: Vec<Point>,
        seen_configs: Arc<Mutex<Vec<DetectorConfig>>>,
    }

    impl StubDetector {
        fn new(centers: Vec<Point>) -> Self {
            Self {
                centers,
                seen_configs: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl CellDetector for StubDetector {
        fn detect(&self, frame: &Frame, _color: CellColor, config: &DetectorConfig) -> Detection {
            self.seen_configs.lock().unwrap().push(config.clone());
            Detection {
                centers: self.centers.clone(),
                blobs: Vec::new(),
                annotated: frame.clone(),
                separated: false,
            }
        }
    }

    struct RecordingPointer {
        moves: Arc<Mutex<Vec<Point>>>,
    }

    impl Pointer for RecordingPointer {
        fn move_to(&mut self, target: Point) -> Result<(), Box<dyn std::error::Error>> {
            self.moves.lock().unwrap().push(target);
            Ok(())
        }

        fn click(&mut self) -> Result<(), Box<dyn std::error::Error>> {
            Ok(())
        }
    }

    struct RecordingLogger {
        events: Arc<Mutex<Vec<String>>>,
    }

    impl PipelineLogger for RecordingLogger {
        fn begin_run(&mut self) {
            self.events.lock().unwrap().push("begin".to_string());
        }

        fn timing(&mut self, stage: &str, _duration_ms: f64) {
            self.events.lock().unwrap().push(format!("timing:{stage}"));
        }

        fn metric(&mut self, name: &str, value: f64) {
            self.events.lock().unwrap().push(format!("metric:{name}={value}"));
        }

        fn info(&mut self, _message: &str) {}

        fn summary(&self) {
            self.events.lock().unwrap().push("summary".to_string());
        }
    }

    // --- Helpers ---

    fn dispatcher(moves: &Arc<Mutex<Vec<Point>>>) -> ClickDispatcher {
        ClickDispatcher::new(
            Box::new(RecordingPointer {
                moves: Arc::clone(moves),
            }),
            ClickDelay::Fixed(Duration::ZERO),
        )
    }

    fn use_case(
        source: StubSource,
        writer: StubImageWriter,
        detector: StubDetector,
        dispatcher: Option<ClickDispatcher>,
        config: Arc<ConfigHandle>,
    ) -> ProcessAndClickUseCase {
        ProcessAndClickUseCase::new(
            Box::new(source),
            Box::new(writer),
            Box::new(detector),
            dispatcher,
            config,
            PathBuf::from("processed_image.png"),
            Box::new(NullPipelineLogger),
        )
    }

    fn centers() -> Vec<Point> {
        vec![Point::new(5, 5), Point::new(20, 10)]
    }

    // --- Tests ---

    #[test]
    fn test_click_mode_clicks_every_center() {
        let moves = Arc::new(Mutex::new(Vec::new()));
        let mut uc = use_case(
            StubSource::new(Frame::filled(40, 30, [0, 0, 0])),
            StubImageWriter::new(),
            StubDetector::new(centers()),
            Some(dispatcher(&moves)),
            Arc::new(ConfigHandle::default()),
        );

        let outcome = uc.execute(None, CellColor::Green, &CancellationToken::new());

        assert_eq!(outcome.cell_count, 2);
        assert_eq!(outcome.click_count, 2);
        assert!(outcome.error.is_none());
        assert_eq!(*moves.lock().unwrap(), centers());
    }

    #[test]
    fn test_clicks_are_offset_by_region() {
        let moves = Arc::new(Mutex::new(Vec::new()));
        let mut uc = use_case(
            StubSource::new(Frame::filled(40, 30, [0, 0, 0])),
            StubImageWriter::new(),
            StubDetector::new(centers()),
            Some(dispatcher(&moves)),
            Arc::new(ConfigHandle::default()),
        );

        let region = Region::new(100, 200, 40, 30);
        uc.execute(Some(&region), CellColor::Green, &CancellationToken::new());

        assert_eq!(
            *moves.lock().unwrap(),
            vec![Point::new(105, 205), Point::new(120, 210)]
        );
    }

    #[test]
    fn test_preview_mode_never_clicks() {
        let mut uc = use_case(
            StubSource::new(Frame::filled(40, 30, [0, 0, 0])),
            StubImageWriter::new(),
            StubDetector::new(centers()),
            None,
            Arc::new(ConfigHandle::default()),
        );

        let outcome = uc.execute(None, CellColor::Green, &CancellationToken::new());

        assert_eq!(outcome.cell_count, 2);
        assert_eq!(outcome.click_count, 0);
        assert_eq!(outcome.centers, centers());
    }

    #[test]
    fn test_capture_failure_yields_zero_counts_and_error() {
        let writer = StubImageWriter::new();
        let written = writer.written.clone();
        let mut uc = use_case(
            StubSource::failing(),
            writer,
            StubDetector::new(centers()),
            None,
            Arc::new(ConfigHandle::default()),
        );

        let outcome = uc.execute(None, CellColor::Green, &CancellationToken::new());

        assert_eq!(outcome.cell_count, 0);
        assert_eq!(outcome.click_count, 0);
        assert_eq!(outcome.error.as_deref(), Some("screen not available"));
        assert!(written.lock().unwrap().is_empty());
    }

    #[test]
    fn test_debug_image_written_every_run() {
        let writer = StubImageWriter::new();
        let written = writer.written.clone();
        let mut uc = use_case(
            StubSource::new(Frame::filled(40, 30, [9, 9, 9])),
            writer,
            StubDetector::new(Vec::new()),
            None,
            Arc::new(ConfigHandle::default()),
        );

        uc.execute(None, CellColor::Green, &CancellationToken::new());
        uc.execute(None, CellColor::Green, &CancellationToken::new());

        let written = written.lock().unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(written[0].0, PathBuf::from("processed_image.png"));
        assert_eq!(written[0].1.width(), 40);
    }

    #[test]
    fn test_debug_image_failure_keeps_results() {
        let mut writer = StubImageWriter::new();
        writer.fail = true;
        let mut uc = use_case(
            StubSource::new(Frame::filled(40, 30, [0, 0, 0])),
            writer,
            StubDetector::new(centers()),
            None,
            Arc::new(ConfigHandle::default()),
        );

        let outcome = uc.execute(None, CellColor::Green, &CancellationToken::new());

        assert_eq!(outcome.cell_count, 2);
        assert_eq!(outcome.error.as_deref(), Some("disk full"));
    }

    #[test]
    fn test_region_forwarded_to_source() {
        let source = StubSource::new(Frame::filled(10, 10, [0, 0, 0]));
        let requested = source.requested.clone();
        let mut uc = use_case(
            source,
            StubImageWriter::new(),
            StubDetector::new(Vec::new()),
            None,
            Arc::new(ConfigHandle::default()),
        );

        let region = Region::new(1, 2, 10, 10);
        uc.execute(Some(&region), CellColor::Red, &CancellationToken::new());

        assert_eq!(*requested.lock().unwrap(), vec![Some(region)]);
    }

    #[test]
    fn test_each_run_uses_latest_config() {
        let detector = StubDetector::new(Vec::new());
        let seen = detector.seen_configs.clone();
        let config = Arc::new(ConfigHandle::default());
        let mut uc = use_case(
            StubSource::new(Frame::filled(10, 10, [0, 0, 0])),
            StubImageWriter::new(),
            detector,
            None,
            Arc::clone(&config),
        );

        uc.execute(None, CellColor::Green, &CancellationToken::new());
        config.replace(DetectorConfig {
            circularity_threshold: 0.4,
            ..DetectorConfig::default()
        });
        uc.execute(None, CellColor::Green, &CancellationToken::new());

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].circularity_threshold, 0.7);
        assert_eq!(seen[1].circularity_threshold, 0.4);
    }

    #[test]
    fn test_black_screen_with_real_detector_clicks_nothing() {
        let moves = Arc::new(Mutex::new(Vec::new()));
        let mut uc = ProcessAndClickUseCase::new(
            Box::new(StubSource::new(Frame::filled(100, 100, [0, 0, 0]))),
            Box::new(StubImageWriter::new()),
            Box::new(ColorBlobDetector::new()),
            Some(dispatcher(&moves)),
            Arc::new(ConfigHandle::default()),
            PathBuf::from("processed_image.png"),
            Box::new(NullPipelineLogger),
        );

        let outcome = uc.execute(None, CellColor::Green, &CancellationToken::new());

        assert_eq!(outcome.cell_count, 0);
        assert_eq!(outcome.click_count, 0);
        assert!(outcome.centers.is_empty());
        assert!(outcome.error.is_none());
        assert!(moves.lock().unwrap().is_empty());
    }

    #[test]
    fn test_summary_emitted_after_each_run() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let moves = Arc::new(Mutex::new(Vec::new()));
        let mut uc = ProcessAndClickUseCase::new(
            Box::new(StubSource::new(Frame::filled(40, 30, [0, 0, 0]))),
            Box::new(StubImageWriter::new()),
            Box::new(StubDetector::new(centers())),
            Some(dispatcher(&moves)),
            Arc::new(ConfigHandle::default()),
            PathBuf::from("processed_image.png"),
            Box::new(RecordingLogger {
                events: Arc::clone(&events),
            }),
        );

        uc.execute(None, CellColor::Green, &CancellationToken::new());

        let events = events.lock().unwrap();
        assert_eq!(events.first().map(String::as_str), Some("begin"));
        assert_eq!(events.last().map(String::as_str), Some("summary"));
        assert!(events.contains(&"metric:cells=2".to_string()));
        assert!(events.contains(&"metric:clicks=2".to_string()));
    }
}
