//! End-to-end pipeline tests against a real temporary tile directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tempfile::tempdir;
use tileforge::container::ContainerMetadata;
use tileforge::coord::BoundingBox;
use tileforge::pipeline::{run_pipeline, CancelToken, PipelineConfig, PipelineError};
use tileforge::render::{
    EngineBundle, Extent, FlatColorEngine, IdentityTransform, RenderEngine, RenderError,
    TileFormat,
};

/// Engine that writes a small marker file and counts renders per worker.
struct MarkerEngine {
    renders: Arc<AtomicUsize>,
    fail_every: Option<usize>,
}

impl RenderEngine for MarkerEngine {
    fn ensure_buffer(&mut self, _pixels: u32) {}

    fn render_to_file(&mut self, _extent: &Extent, path: &Path) -> Result<(), RenderError> {
        let n = self.renders.fetch_add(1, Ordering::SeqCst);
        if let Some(every) = self.fail_every {
            if n % every == 0 {
                return Err(RenderError::Engine("simulated failure".to_string()));
            }
        }
        std::fs::write(path, b"marker-tile")?;
        Ok(())
    }
}

fn marker_factory(
    renders: Arc<AtomicUsize>,
    fail_every: Option<usize>,
) -> impl FnMut(usize) -> Result<EngineBundle, RenderError> {
    move |_| {
        Ok(EngineBundle {
            engine: Box::new(MarkerEngine {
                renders: Arc::clone(&renders),
                fail_every,
            }),
            transform: Box::new(IdentityTransform),
        })
    }
}

fn tile_files(root: &Path) -> HashMap<PathBuf, Vec<u8>> {
    let mut files = HashMap::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else {
                let data = std::fs::read(&path).unwrap();
                files.insert(path.strip_prefix(root).unwrap().to_path_buf(), data);
            }
        }
    }
    files
}

#[test]
fn test_second_run_skips_every_tile_and_leaves_files_untouched() {
    let dir = tempdir().unwrap();
    let tile_dir = dir.path().join("tiles");
    let renders = Arc::new(AtomicUsize::new(0));

    let config = PipelineConfig::new("idempotent", &tile_dir, BoundingBox::world(), 0, 2)
        .with_threads(3)
        .with_tile_size(256);

    let first = run_pipeline(
        &config,
        marker_factory(Arc::clone(&renders), None),
        &CancelToken::new(),
    )
    .unwrap();
    assert_eq!(first.enqueued, 21);
    assert_eq!(first.rendered, 21);
    assert_eq!(first.skipped, 0);

    let snapshot = tile_files(&tile_dir);
    assert_eq!(snapshot.len(), 21);

    let second = run_pipeline(
        &config,
        marker_factory(Arc::clone(&renders), None),
        &CancelToken::new(),
    )
    .unwrap();
    assert_eq!(second.enqueued, 21);
    assert_eq!(second.rendered, 0, "no new renders on the second run");
    assert_eq!(second.skipped, 21);
    assert_eq!(renders.load(Ordering::SeqCst), 21, "engine untouched on rerun");

    assert_eq!(
        tile_files(&tile_dir),
        snapshot,
        "second run must be byte-identical to the first"
    );
}

#[test]
fn test_failures_are_aggregated_without_stopping_the_run() {
    let dir = tempdir().unwrap();
    let tile_dir = dir.path().join("tiles");
    let renders = Arc::new(AtomicUsize::new(0));

    let config = PipelineConfig::new("flaky", &tile_dir, BoundingBox::world(), 0, 2)
        .with_threads(2)
        .with_tile_size(256);

    // Every third render attempt fails.
    let summary = run_pipeline(
        &config,
        marker_factory(Arc::clone(&renders), Some(3)),
        &CancelToken::new(),
    )
    .unwrap();

    assert_eq!(summary.enqueued, 21);
    assert_eq!(summary.rendered + summary.failed, 21);
    assert!(summary.failed > 0, "some renders must have failed");
    assert_eq!(
        renders.load(Ordering::SeqCst),
        21,
        "every tile was attempted despite failures"
    );
}

#[test]
fn test_many_workers_with_no_work_drain_cleanly() {
    let dir = tempdir().unwrap();
    let tile_dir = dir.path().join("tiles");
    let renders = Arc::new(AtomicUsize::new(0));

    // min_zoom above max_zoom enumerates nothing; the sentinels alone must
    // drain the queue and stop every worker.
    let config = PipelineConfig::new("empty", &tile_dir, BoundingBox::world(), 3, 2)
        .with_threads(6)
        .with_tile_size(256);

    let summary = run_pipeline(
        &config,
        marker_factory(Arc::clone(&renders), None),
        &CancelToken::new(),
    )
    .unwrap();

    assert_eq!(summary.enqueued, 0);
    assert_eq!(summary.rendered, 0);
    assert_eq!(renders.load(Ordering::SeqCst), 0);
}

#[test]
fn test_cancelled_run_reports_cancellation() {
    let dir = tempdir().unwrap();
    let config = PipelineConfig::new(
        "cancelled",
        dir.path().join("tiles"),
        BoundingBox::world(),
        0,
        0,
    )
    .with_threads(1)
    .with_tile_size(256);

    let cancel = CancelToken::new();
    cancel.cancel();

    let renders = Arc::new(AtomicUsize::new(0));
    let result = run_pipeline(&config, marker_factory(renders, None), &cancel);
    assert!(matches!(result, Err(PipelineError::Cancelled)));
}

#[test]
fn test_flat_engine_pipeline_produces_decodable_tiles_and_metadata() {
    let dir = tempdir().unwrap();
    let tile_dir = dir.path().join("tiles");

    let bbox = BoundingBox::new(10.0, 10.0, 11.0, 11.0);
    let config = PipelineConfig::new("flat", &tile_dir, bbox, 5, 5)
        .with_threads(2)
        .with_tile_size(256)
        .with_format(TileFormat::Png);

    let summary = run_pipeline(
        &config,
        |_| {
            Ok(EngineBundle {
                engine: Box::new(FlatColorEngine::new(256, TileFormat::Png)),
                transform: Box::new(IdentityTransform),
            })
        },
        &CancelToken::new(),
    )
    .unwrap();

    assert_eq!(summary.enqueued, 1);
    let tile_path = tile_dir.join("5").join("16").join("15.png");
    assert!(tile_path.is_file());
    let data = std::fs::read(&tile_path).unwrap();
    assert_eq!(&data[1..4], b"PNG");

    let metadata = ContainerMetadata::new("flat", "png", bbox.to_string(), 5, 5);
    metadata.write(&tile_dir).unwrap();
    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(tile_dir.join("metadata.json")).unwrap())
            .unwrap();
    assert_eq!(parsed["bounds"], "10, 10, 11, 11");
    assert_eq!(parsed["minzoom"], "5");
}
