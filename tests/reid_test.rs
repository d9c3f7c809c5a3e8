use ndarray::Array2;
use reid_rs::{ObjectState, ReidConfig, ReidProcessor};

// bbox (x, y, w, h), tracker id, category, confidence
fn det(id: u64, x: f64, conf: f64) -> [f64; 7] {
    [x, 0.0, 10.0, 10.0, id as f64, 0.0, conf]
}

fn frame(rows: Vec<[f64; 7]>) -> Array2<f64> {
    Array2::from(rows)
}

fn permissive_config() -> ReidConfig {
    ReidConfig {
        filter_confidence_threshold: 0.1,
        filter_frames_seen_threshold: 1,
        max_frames_to_rematch: 100,
        max_attempt_to_match: 3,
        ..Default::default()
    }
}

fn zero_cost_processor(config: ReidConfig) -> ReidProcessor {
    ReidProcessor::with_functions(config, Box::new(|_, _| 0.0), Box::new(|_, _| true)).unwrap()
}

fn assert_no_duplicate_ids(processor: &ReidProcessor) {
    let mut seen = std::collections::HashSet::new();
    for object in processor.all_objects() {
        for &id in &object.re_id_chain {
            assert!(seen.insert(id), "id {id} appears in two live chains");
        }
    }
}

#[test]
fn test_id_switch_is_corrected() {
    let mut processor = zero_cost_processor(permissive_config());

    // Two steady objects for 6 frames.
    for frame_id in 1..=6 {
        let output = processor
            .update(frame(vec![det(1, 0.0, 0.9), det(2, 100.0, 0.9)]).view(), frame_id)
            .unwrap();
        if frame_id >= 4 {
            // candidates gave up waiting on frame 4 and are emitted as stable
            assert_eq!(output.nrows(), 2, "frame {frame_id}");
        }
        assert_no_duplicate_ids(&processor);
    }

    // Frame 7: the tracker swaps id 2 for a fresh id 3.
    let output = processor
        .update(frame(vec![det(1, 0.0, 0.9), det(3, 100.0, 0.9)]).view(), 7)
        .unwrap();
    assert_no_duplicate_ids(&processor);
    assert_eq!(output.nrows(), 2);

    // The corrected row keeps canonical id 2 while carrying tracker id 3.
    let corrected_row = (0..output.nrows())
        .map(|i| output.row(i))
        .find(|row| row[9] == 3.0)
        .expect("row with tracker id 3");
    assert_eq!(corrected_row[1], 2.0);
    assert_eq!(corrected_row[0], 7.0);

    let corrected = processor
        .all_objects()
        .iter()
        .find(|o| o.contains(3))
        .expect("object owning id 3");
    assert_eq!(corrected.re_id_chain, vec![2, 3]);
    assert_eq!(corrected.state, ObjectState::Stable);
    assert_eq!(processor.nb_corrections(), 1);
    assert_eq!(processor.corrected_objects().len(), 1);
}

#[test]
fn test_unmatched_candidate_is_accepted_under_its_own_id() {
    let mut processor = zero_cost_processor(permissive_config());

    // age reaches max_attempt_to_match = 3 on frame 4
    for frame_id in 1..=3 {
        let output = processor
            .update(frame(vec![det(5, 0.0, 0.9)]).view(), frame_id)
            .unwrap();
        assert_eq!(output.nrows(), 0, "frame {frame_id}");
    }
    let output = processor
        .update(frame(vec![det(5, 0.0, 0.9)]).view(), 4)
        .unwrap();

    assert_eq!(output.nrows(), 1);
    assert_eq!(output[[0, 1]], 5.0); // canonical id is its own raw id
    assert_eq!(output[[0, 9]], 5.0);
    assert_eq!(processor.nb_corrections(), 0);
}

#[test]
fn test_switcher_eviction_timing() {
    let config = ReidConfig {
        max_frames_to_rematch: 2,
        max_attempt_to_match: 1,
        ..permissive_config()
    };
    let mut processor = zero_cost_processor(config);

    // Object 1 is visible for frames 1-3; object 9 keeps the stream alive.
    for frame_id in 1..=3 {
        processor
            .update(frame(vec![det(1, 0.0, 0.9), det(9, 200.0, 0.9)]).view(), frame_id)
            .unwrap();
    }

    let state_of = |processor: &ReidProcessor, raw_id: u64| {
        processor
            .all_objects()
            .iter()
            .find(|o| o.contains(raw_id))
            .map(|o| o.state)
            .unwrap()
    };

    // Frame 4: first frame of absence, flagged as switcher.
    processor
        .update(frame(vec![det(9, 200.0, 0.9)]).view(), 4)
        .unwrap();
    assert_eq!(state_of(&processor, 1), ObjectState::Switcher);

    // Frame 5: unseen for 2 == max_frames_to_rematch frames, still waiting.
    processor
        .update(frame(vec![det(9, 200.0, 0.9)]).view(), 5)
        .unwrap();
    assert_eq!(state_of(&processor, 1), ObjectState::Switcher);

    // Frame 6: unseen for max + 1 frames, abandoned now and not before.
    processor
        .update(frame(vec![det(9, 200.0, 0.9)]).view(), 6)
        .unwrap();
    assert_eq!(state_of(&processor, 1), ObjectState::LostForever);
}

#[test]
fn test_reappearing_interior_id_splits_the_chain() {
    let config = ReidConfig {
        max_attempt_to_match: 1,
        ..permissive_config()
    };
    let mut processor = zero_cost_processor(config);

    // Frames 1-2: objects 1 and 2.
    for frame_id in 1..=2 {
        processor
            .update(frame(vec![det(1, 0.0, 0.9), det(2, 100.0, 0.9)]).view(), frame_id)
            .unwrap();
        assert_no_duplicate_ids(&processor);
    }

    // Frame 3: id 2 is replaced by id 3 and rematched into chain [2, 3].
    processor
        .update(frame(vec![det(1, 0.0, 0.9), det(3, 100.0, 0.9)]).view(), 3)
        .unwrap();
    assert_no_duplicate_ids(&processor);
    let merged = processor
        .all_objects()
        .iter()
        .find(|o| o.contains(3))
        .unwrap();
    assert_eq!(merged.re_id_chain, vec![2, 3]);

    // Frame 4: the tracker resurrects id 2, which sits inside [2, 3]; the
    // chain is split so 2 stays a single live identity.
    processor
        .update(frame(vec![det(1, 0.0, 0.9), det(2, 100.0, 0.9)]).view(), 4)
        .unwrap();
    assert_no_duplicate_ids(&processor);
    let owner_of_2 = processor
        .all_objects()
        .iter()
        .find(|o| o.contains(2))
        .unwrap();
    assert_eq!(owner_of_2.re_id_chain, vec![2]);
    assert_eq!(owner_of_2.state, ObjectState::Stable);
    // the stale suffix [3] was held back from the live set
    assert!(processor.all_objects().iter().all(|o| !o.contains(3)));

    // Frame 5: id 3 can come back as a brand new identity.
    processor
        .update(
            frame(vec![det(1, 0.0, 0.9), det(2, 100.0, 0.9), det(3, 300.0, 0.9)]).view(),
            5,
        )
        .unwrap();
    assert_no_duplicate_ids(&processor);
    assert!(processor.all_objects().iter().any(|o| o.re_id_chain == vec![3]));
}

#[test]
fn test_low_confidence_objects_stay_out_of_the_process() {
    let config = ReidConfig {
        filter_confidence_threshold: 0.5,
        max_attempt_to_match: 1,
        ..permissive_config()
    };
    let mut processor = zero_cost_processor(config);

    for frame_id in 1..=5 {
        let output = processor
            .update(frame(vec![det(1, 0.0, 0.3)]).view(), frame_id)
            .unwrap();
        assert_eq!(output.nrows(), 0, "frame {frame_id}");
        assert_eq!(
            processor.all_objects()[0].state,
            ObjectState::TrackerOutput
        );
    }
}

#[test]
fn test_confidence_drop_demotes_a_stable_object() {
    let config = ReidConfig {
        filter_confidence_threshold: 0.5,
        max_attempt_to_match: 1,
        ..permissive_config()
    };
    let mut processor = zero_cost_processor(config);

    // Two confident frames make the object stable and emitted.
    processor
        .update(frame(vec![det(1, 0.0, 0.9)]).view(), 1)
        .unwrap();
    let output = processor
        .update(frame(vec![det(1, 0.0, 0.9)]).view(), 2)
        .unwrap();
    assert_eq!(output.nrows(), 1);

    // Worthless observations drag the running mean below the threshold on
    // frame 4 (mean 1.8 / 4 = 0.45).
    processor
        .update(frame(vec![det(1, 0.0, 0.0)]).view(), 3)
        .unwrap();
    let output = processor
        .update(frame(vec![det(1, 0.0, 0.0)]).view(), 4)
        .unwrap();

    assert_eq!(output.nrows(), 0);
    let state = processor.all_objects()[0].state;
    assert!(!matches!(
        state,
        ObjectState::FilteredOutput | ObjectState::Candidate | ObjectState::Stable
    ));
}

#[test]
fn test_empty_frames_pass_through() {
    let config = ReidConfig {
        max_attempt_to_match: 1,
        ..permissive_config()
    };
    let mut processor = zero_cost_processor(config);

    processor
        .update(frame(vec![det(1, 0.0, 0.9)]).view(), 1)
        .unwrap();
    let output = processor.update(Array2::zeros((0, 7)).view(), 2).unwrap();
    assert_eq!(output.nrows(), 0);

    // The gap does not turn the object into a switcher.
    let output = processor
        .update(frame(vec![det(1, 0.0, 0.9)]).view(), 3)
        .unwrap();
    assert_eq!(output.nrows(), 1);
    assert_eq!(processor.all_objects()[0].state, ObjectState::Stable);
}

#[test]
fn test_sink_persists_corrected_rows() {
    let path = std::env::temp_dir().join(format!("reid_rs_output_{}.txt", std::process::id()));
    let _ = std::fs::remove_file(&path);

    let config = ReidConfig {
        max_attempt_to_match: 1,
        sink_path: Some(path.clone()),
        ..permissive_config()
    };
    let mut processor = zero_cost_processor(config);

    processor
        .update(frame(vec![det(1, 0.0, 0.9)]).view(), 1)
        .unwrap();
    processor
        .update(frame(vec![det(1, 0.0, 0.9)]).view(), 2)
        .unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    // frame, object id, category, bbox, confidence, mean confidence, tracker id
    assert_eq!(content, "2 1 0 0 0 10 10 0.900000 0.900000 1\n");
    std::fs::remove_file(&path).unwrap();
}
