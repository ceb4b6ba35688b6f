mod common;

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use common::{ten_sample_track, ScriptedParser};
use mp4inspect::avc::FrameType;
use mp4inspect::container::ContainerParser;
use mp4inspect::tasks::{ParseOperation, TaskRunner, TaskState};
use mp4inspect::tracks::TrackStore;

fn runner_with_loaded_store() -> (TaskRunner, Arc<RwLock<TrackStore>>) {
    let parser: Arc<Mutex<Box<dyn ContainerParser>>> = Arc::new(Mutex::new(Box::new(
        ScriptedParser::new(vec![ten_sample_track("avc1")]),
    )));
    let store = Arc::new(RwLock::new(TrackStore::new()));
    let mut runner = TaskRunner::new(Arc::clone(&parser), Arc::clone(&store));

    assert!(runner.start_parse(ParseOperation::ParseFile(
        Path::new("/tmp/clip.mp4").to_path_buf()
    )));
    runner.wait();
    assert_eq!(runner.state(), TaskState::Idle);
    assert_eq!(runner.total_video_frames(), 10);
    (runner, store)
}

#[test]
fn test_classification_marks_every_sample() {
    let (mut runner, store) = runner_with_loaded_store();

    let order: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
    let callback_order = Arc::clone(&order);
    runner.set_on_frame_parsed(Arc::new(move |track, sample, _frame_type| {
        assert_eq!(track, 0);
        callback_order.lock().unwrap().push(sample);
    }));

    assert!(runner.start_parse(ParseOperation::ParseFrameType));
    runner.wait();
    assert_eq!(runner.state(), TaskState::Idle);
    assert!((runner.classification_progress() - 1.0).abs() < f32::EPSILON);

    // Callbacks arrive in decode order, one per sample
    assert_eq!(*order.lock().unwrap(), (0..10).collect::<Vec<_>>());

    let store = store.read().unwrap();
    let track = store.track(0).unwrap();
    for (idx, sample) in track.samples.iter().enumerate() {
        let expected = if idx == 0 || idx == 5 {
            FrameType::I
        } else {
            FrameType::P
        };
        assert_eq!(sample.frame_type, expected);
        assert!(!sample.nalu_types.is_empty());
    }
}

#[test]
fn test_cancellation_stops_classification_promptly() {
    let (mut runner, store) = runner_with_loaded_store();

    let calls = Arc::new(AtomicUsize::new(0));
    let callback_calls = Arc::clone(&calls);
    let token = runner.cancel_token();
    runner.set_on_frame_parsed(Arc::new(move |_track, _sample, _frame_type| {
        if callback_calls.fetch_add(1, Ordering::SeqCst) + 1 == 4 {
            token.cancel();
        }
    }));

    assert!(runner.start_parse(ParseOperation::ParseFrameType));
    runner.wait();
    assert_eq!(runner.state(), TaskState::Idle);

    // The worker observes the token before the next sample, so exactly the
    // first four samples were classified
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    let store = store.read().unwrap();
    let track = store.track(0).unwrap();
    for (idx, sample) in track.samples.iter().enumerate() {
        if idx < 4 {
            assert_ne!(sample.frame_type, FrameType::Unknown);
        } else {
            assert_eq!(sample.frame_type, FrameType::Unknown);
        }
    }
}

#[test]
fn test_start_refused_while_running() {
    let parser: Arc<Mutex<Box<dyn ContainerParser>>> = Arc::new(Mutex::new(Box::new(
        ScriptedParser::new(vec![ten_sample_track("avc1")]),
    )));
    let store = Arc::new(RwLock::new(TrackStore::new()));
    let mut runner = TaskRunner::new(Arc::clone(&parser), store);

    // Hold the parser lock so the worker stays busy inside parse()
    let guard = parser.lock().unwrap();
    assert!(runner.start_parse(ParseOperation::ParseFile(
        Path::new("/tmp/clip.mp4").to_path_buf()
    )));
    assert!(!runner.start_parse(ParseOperation::ParseFrameType));
    drop(guard);
    runner.wait();
}
