/*!
 * Worker pool bounds, order independence and cancellation
 */

use anyhow::Result;
use parking_lot::Mutex;
use std::sync::atomic::Ordering;
use tempfile::TempDir;
use code_translator::processor::ProcessorConfig;
use code_translator::translation::MockEngine;
use crate::common;

fn create_many_files(count: usize) -> Result<TempDir> {
    let dir = common::create_temp_dir()?;
    for i in 0..count {
        let content = format!("# 文件 {}\nvalue = {}  # 数值\nlabel = \"标签\"\n", i, i);
        common::create_test_file(dir.path(), &format!("pkg{}/mod_{:02}.py", i % 3, i), &content)?;
    }
    Ok(dir)
}

fn workers(max_workers: usize) -> ProcessorConfig {
    ProcessorConfig {
        max_workers,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_aggregate_counts_shouldNotDependOnWorkerCount() -> Result<()> {
    common::init_test_logging();
    let single = create_many_files(12)?;
    let pooled = create_many_files(12)?;

    let serial = common::processor_with(MockEngine::working(), workers(1))
        .process_directory(single.path())
        .await?;
    let parallel = common::processor_with(MockEngine::slow(5), workers(4))
        .process_directory(pooled.path())
        .await?;

    assert_eq!(serial, parallel);
    assert_eq!(serial.files_translated, 12);
    assert_eq!(serial.elements_translated, 24);

    let serial_files: Vec<Vec<u8>> = common::read_tree(single.path())?.into_iter().map(|(_, c)| c).collect();
    let parallel_files: Vec<Vec<u8>> = common::read_tree(pooled.path())?.into_iter().map(|(_, c)| c).collect();
    assert_eq!(serial_files, parallel_files);
    Ok(())
}

#[tokio::test]
async fn test_outstanding_engine_calls_shouldBeBoundedByWorkers() -> Result<()> {
    common::init_test_logging();
    let tree = create_many_files(10)?;
    let engine = MockEngine::slow(20);
    let processor = common::processor_with(engine.clone(), workers(3));

    processor.process_directory(tree.path()).await?;

    assert_eq!(engine.request_count(), 20);
    assert!(engine.peak_in_flight() >= 1);
    assert!(engine.peak_in_flight() <= 3);
    Ok(())
}

#[tokio::test]
async fn test_progress_callback_shouldReportEveryFile() -> Result<()> {
    common::init_test_logging();
    let tree = create_many_files(5)?;
    let processor = common::processor_with(MockEngine::working(), workers(2));
    let reports = Mutex::new(Vec::new());

    processor
        .process_directory_with_progress(tree.path(), |done, total| reports.lock().push((done, total)))
        .await?;

    let mut reports = reports.into_inner();
    reports.sort();
    assert_eq!(reports, vec![(1, 5), (2, 5), (3, 5), (4, 5), (5, 5)]);
    Ok(())
}

#[tokio::test]
async fn test_cancel_beforeStart_shouldDispatchNothing() -> Result<()> {
    common::init_test_logging();
    let tree = create_many_files(4)?;
    let before = common::read_tree(tree.path())?;
    let engine = MockEngine::working();
    let processor = common::processor_with(engine.clone(), workers(2));
    processor.cancel_handle().store(true, Ordering::SeqCst);

    let stats = processor.process_directory(tree.path()).await?;

    assert!(stats.cancelled);
    assert_eq!(stats.files_scanned, 0);
    assert_eq!(stats.files_skipped, 0);
    assert_eq!(engine.request_count(), 0);
    assert_eq!(common::read_tree(tree.path())?, before);
    Ok(())
}

#[tokio::test]
async fn test_cancel_duringRun_shouldFinishStartedFilesOnly() -> Result<()> {
    common::init_test_logging();
    let tree = create_many_files(6)?;
    let processor = common::processor_with(MockEngine::working(), workers(1));
    let cancel = processor.cancel_handle();

    let stats = processor
        .process_directory_with_progress(tree.path(), |done, _| {
            if done == 2 {
                cancel.store(true, Ordering::SeqCst);
            }
        })
        .await?;

    assert!(stats.cancelled);
    assert_eq!(stats.files_scanned, 2);
    assert_eq!(stats.files_translated, 2);
    Ok(())
}
