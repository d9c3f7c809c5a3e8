//! Per-frame re-identification cycle orchestration.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use tracing::{debug, warn};

use crate::error::{ReidError, Result};
use crate::io::{InputDataPositions, OutputDataPositions, TxtSink};
use crate::reid::filter::TrackedObjectFilter;
use crate::reid::functions::{bounding_box_distance, select_by_category};
use crate::reid::matcher::{CostFn, Matcher, SelectionFn};
use crate::reid::object_state::ObjectState;
use crate::reid::tracked_object::TrackedObject;

/// Configuration for the [`ReidProcessor`], immutable after construction.
#[derive(Debug, Clone)]
pub struct ReidConfig {
    /// Minimum mean confidence for an object to enter the reid process
    pub filter_confidence_threshold: f64,
    /// Minimum observed frames for an object to enter the reid process
    pub filter_frames_seen_threshold: u64,
    /// Frames a switcher may stay unmatched before being abandoned
    pub max_frames_to_rematch: u64,
    /// Frames a candidate waits for a match before being accepted unmatched
    pub max_attempt_to_match: u64,
    /// Optional ceiling on the cost function; pairs above it never match
    pub cost_function_threshold: Option<f64>,
    /// Column layout of the tracker's input rows
    pub input_positions: InputDataPositions,
    /// Column layout of the corrected output rows
    pub output_positions: OutputDataPositions,
    /// When set, corrected rows are appended to this text file
    pub sink_path: Option<PathBuf>,
}

impl Default for ReidConfig {
    fn default() -> Self {
        Self {
            filter_confidence_threshold: 0.4,
            filter_frames_seen_threshold: 5,
            max_frames_to_rematch: 500,
            max_attempt_to_match: 5,
            cost_function_threshold: None,
            input_positions: InputDataPositions::default(),
            output_positions: OutputDataPositions::default(),
            sink_path: None,
        }
    }
}

/// Consumes raw per-frame tracker rows and emits a corrected stream in
/// which lost objects, id switches and late reappearances are reconciled
/// into stable long-lived identities.
///
/// The processor exclusively owns its live object set; frames must be
/// submitted through [`update`](Self::update) in strictly increasing
/// `frame_id` order.
pub struct ReidProcessor {
    matcher: Matcher,
    filter: TrackedObjectFilter,
    objects: Vec<TrackedObject>,
    // raw tracker id -> index into `objects`; rebuilt on every split/merge
    id_index: HashMap<u64, usize>,
    // canonical ids of the objects tracked in the previous frame
    last_frame_tracked: HashSet<u64>,
    frame_id: u64,
    max_frames_to_rematch: u64,
    max_attempt_to_match: u64,
    input_positions: InputDataPositions,
    output_positions: OutputDataPositions,
    nb_output_cols: usize,
    sink: Option<TxtSink>,
}

impl ReidProcessor {
    /// Create a processor with the default cost (Euclidean distance between
    /// box centers) and selection (equal category) functions.
    pub fn new(config: ReidConfig) -> Result<Self> {
        Self::with_functions(
            config,
            Box::new(bounding_box_distance),
            Box::new(select_by_category),
        )
    }

    /// Create a processor with caller-supplied cost and selection functions.
    pub fn with_functions(
        config: ReidConfig,
        cost_function: CostFn,
        selection_function: SelectionFn,
    ) -> Result<Self> {
        config.output_positions.validate()?;
        let nb_output_cols = config.output_positions.nb_cols();
        Ok(Self {
            matcher: Matcher::new(
                cost_function,
                selection_function,
                config.cost_function_threshold,
            ),
            filter: TrackedObjectFilter::new(
                config.filter_confidence_threshold,
                config.filter_frames_seen_threshold,
            ),
            objects: Vec::new(),
            id_index: HashMap::new(),
            last_frame_tracked: HashSet::new(),
            frame_id: 0,
            max_frames_to_rematch: config.max_frames_to_rematch,
            max_attempt_to_match: config.max_attempt_to_match,
            input_positions: config.input_positions,
            output_positions: config.output_positions,
            nb_output_cols,
            sink: config.sink_path.map(TxtSink::new),
        })
    }

    /// Process one frame of raw tracker rows and return the corrected rows.
    ///
    /// Frames must arrive in strictly increasing `frame_id` order;
    /// out-of-order frames are undefined behavior, not a checked error. An
    /// empty frame is a no-op producing no output rows.
    pub fn update(&mut self, rows: ArrayView2<f64>, frame_id: u64) -> Result<Array2<f64>> {
        if rows.nrows() == 0 {
            return Ok(Array2::zeros((0, self.nb_output_cols)));
        }
        self.input_positions.check_row_len(rows.ncols())?;
        self.frame_id = frame_id;

        let current_ids: Vec<u64> = rows
            .rows()
            .into_iter()
            .map(|row| self.input_positions.id_of(row))
            .collect();

        self.ingest(rows, frame_id);
        self.apply_filtering();
        self.perform_reid_process(&current_ids)?;

        let output = self.project_output(&current_ids);
        if let Some(sink) = &self.sink {
            sink.append(output.view())?;
        }
        Ok(output)
    }

    /// Process a single detection row as a one-row frame.
    pub fn update_row(&mut self, row: ArrayView1<f64>, frame_id: u64) -> Result<Array2<f64>> {
        self.update(row.insert_axis(Axis(0)), frame_id)
    }

    // Step 1: append observations to known identities, create the rest.
    fn ingest(&mut self, rows: ArrayView2<f64>, frame_id: u64) {
        for row in rows.rows() {
            let raw_id = self.input_positions.id_of(row);
            match self.id_index.get(&raw_id) {
                Some(&index) => {
                    self.objects[index].update_metadata(row, &self.input_positions, frame_id);
                }
                None => {
                    debug!(raw_id, frame_id, "new tracker id");
                    let object = TrackedObject::new(
                        raw_id,
                        ObjectState::TrackerOutput,
                        row,
                        &self.input_positions,
                        frame_id,
                    );
                    self.id_index.insert(raw_id, self.objects.len());
                    self.objects.push(object);
                }
            }
        }
    }

    // Step 2: run the admission filter over every live object.
    fn apply_filtering(&mut self) {
        for object in &mut self.objects {
            self.filter.update(object);
        }
    }

    fn perform_reid_process(&mut self, current_ids: &[u64]) -> Result<()> {
        self.correct_reid_chains(current_ids)?;

        let current_tracked = self.current_frame_tracked(current_ids);
        self.update_switcher_states(&current_tracked);
        self.update_candidate_states();
        self.identify_switchers(&current_tracked);
        self.identify_candidates();
        self.process_matches()?;

        // Snapshot after matching so freshly merged identities count as tracked.
        self.last_frame_tracked = self.current_frame_tracked(current_ids);
        Ok(())
    }

    /// Canonical ids of objects in the reid process observed this frame
    /// (membership is over the whole chain, not only its endpoints).
    fn current_frame_tracked(&self, current_ids: &[u64]) -> HashSet<u64> {
        self.objects
            .iter()
            .filter(|object| object.state.is_in_reid_process())
            .filter(|object| current_ids.iter().any(|&id| object.contains(id)))
            .map(|object| object.object_id())
            .collect()
    }

    // Step 3: when an id from the interior of a chain reappears, split the
    // chain there so no id can be claimed by two live identities.
    fn correct_reid_chains(&mut self, current_ids: &[u64]) -> Result<()> {
        let top_ids: HashSet<u64> = self.objects.iter().map(|o| o.tracker_id()).collect();
        let to_correct: Vec<u64> = current_ids
            .iter()
            .copied()
            .filter(|id| !top_ids.contains(id))
            .collect();
        if to_correct.is_empty() {
            return Ok(());
        }

        for raw_id in to_correct {
            let Some(position) = self.objects.iter().position(|o| o.contains(raw_id)) else {
                continue;
            };
            // An earlier cut this frame may already have exposed the id as a
            // chain tail.
            if self.objects[position].tracker_id() == raw_id {
                continue;
            }

            let mut owner = self.objects.remove(position);
            let mut suffix = owner.cut(raw_id)?;
            debug!(
                raw_id,
                prefix = ?owner.re_id_chain,
                suffix = ?suffix.re_id_chain,
                "reappearing id split a chain"
            );

            owner.state = ObjectState::Stable;
            self.objects.push(owner);

            if current_ids.contains(&suffix.tracker_id()) {
                suffix.state = ObjectState::Candidate;
                self.objects.push(suffix);
            } else if suffix.nb_corrections() > 1 {
                suffix.state = ObjectState::Switcher;
                self.objects.push(suffix);
            } else {
                // Stale singleton-correction suffix: held back from the live set.
                warn!(chain = ?suffix.re_id_chain, "dropping stale split suffix");
            }
        }

        self.rebuild_index()
    }

    // Step 4: a switcher seen again stabilizes; one unseen too long is
    // abandoned.
    fn update_switcher_states(&mut self, current_tracked: &HashSet<u64>) {
        let frame_id = self.frame_id;
        for object in &mut self.objects {
            if object.state != ObjectState::Switcher {
                continue;
            }
            if current_tracked.contains(&object.object_id()) {
                object.state = ObjectState::Stable;
            } else if object.get_nb_frames_since_last_appearance(frame_id)
                > self.max_frames_to_rematch
            {
                debug!(object_id = object.object_id(), "switcher lost forever");
                object.state = ObjectState::LostForever;
            }
        }
    }

    // Step 5: a candidate nobody matched in time is accepted as stable.
    fn update_candidate_states(&mut self) {
        let frame_id = self.frame_id;
        for object in &mut self.objects {
            if object.state == ObjectState::Candidate
                && object.get_age(frame_id) >= self.max_attempt_to_match
            {
                object.state = ObjectState::Stable;
            }
        }
    }

    // Step 6: objects tracked last frame but absent this frame become
    // switchers.
    fn identify_switchers(&mut self, current_tracked: &HashSet<u64>) {
        for object in &mut self.objects {
            let object_id = object.object_id();
            if self.last_frame_tracked.contains(&object_id)
                && !current_tracked.contains(&object_id)
            {
                debug!(object_id, "object lost, marked as switcher");
                object.state = ObjectState::Switcher;
            }
        }
    }

    // Step 7: freshly filtered objects become candidates.
    fn identify_candidates(&mut self) {
        for object in &mut self.objects {
            if object.state == ObjectState::FilteredOutput {
                object.state = ObjectState::Candidate;
            }
        }
    }

    // Steps 8 and 9: run the matcher, then let each matched switcher absorb
    // its candidate.
    fn process_matches(&mut self) -> Result<()> {
        let matches = {
            let candidates: Vec<&TrackedObject> = self
                .objects
                .iter()
                .filter(|o| o.state == ObjectState::Candidate)
                .collect();
            let switchers: Vec<&TrackedObject> = self
                .objects
                .iter()
                .filter(|o| o.state == ObjectState::Switcher)
                .collect();
            self.matcher.match_objects(&candidates, &switchers)
        };
        if matches.is_empty() {
            return Ok(());
        }

        for (candidate_id, switcher_id) in matches {
            let Some(candidate_pos) = self
                .objects
                .iter()
                .position(|o| o.object_id() == candidate_id)
            else {
                continue;
            };
            let Some(switcher_pos) = self
                .objects
                .iter()
                .position(|o| o.object_id() == switcher_id)
            else {
                continue;
            };

            let candidate = self.objects.remove(candidate_pos);
            let switcher_pos = if switcher_pos > candidate_pos {
                switcher_pos - 1
            } else {
                switcher_pos
            };
            debug!(
                switcher_id,
                candidate_id, "rematched candidate onto switcher"
            );
            let switcher = &mut self.objects[switcher_pos];
            switcher.merge(candidate);
            switcher.state = ObjectState::Stable;
        }

        self.rebuild_index()
    }

    // Step 11: one output row per stable object observed this frame.
    fn project_output(&self, current_ids: &[u64]) -> Array2<f64> {
        let stable: Vec<&TrackedObject> = self
            .objects
            .iter()
            .filter(|object| object.state == ObjectState::Stable)
            .filter(|object| current_ids.iter().any(|&id| object.contains(id)))
            .collect();

        let positions = &self.output_positions;
        let mut output = Array2::zeros((stable.len(), self.nb_output_cols));
        for (row_idx, object) in stable.iter().enumerate() {
            let mut row = output.row_mut(row_idx);
            row[positions.frame_id] = self.frame_id as f64;
            row[positions.object_id] = object.object_id() as f64;
            row[positions.category] = object.category().unwrap_or_default() as f64;
            let bbox = object.bbox().to_tlwh();
            for (coord_idx, &pos) in positions.bbox.iter().enumerate() {
                row[pos] = bbox[coord_idx];
            }
            row[positions.confidence] = object.confidence();
            row[positions.mean_confidence] = object.mean_confidence();
            row[positions.tracker_id] = object.tracker_id() as f64;
        }
        output
    }

    /// Rebuild the raw-id index from scratch, enforcing that no raw id
    /// belongs to more than one live chain.
    fn rebuild_index(&mut self) -> Result<()> {
        self.id_index.clear();
        for (index, object) in self.objects.iter().enumerate() {
            for &raw_id in &object.re_id_chain {
                if self.id_index.insert(raw_id, index).is_some() {
                    return Err(ReidError::DuplicateId { id: raw_id });
                }
            }
        }
        Ok(())
    }

    /// The most recently processed frame id.
    pub fn frame_id(&self) -> u64 {
        self.frame_id
    }

    /// Every identity ever created, terminal ones included.
    pub fn all_objects(&self) -> &[TrackedObject] {
        &self.objects
    }

    /// Total number of identity corrections applied across all objects.
    pub fn nb_corrections(&self) -> usize {
        self.objects.iter().map(|o| o.nb_corrections()).sum()
    }

    /// Total number of raw tracker ids absorbed across all objects.
    pub fn nb_tracker_ids(&self) -> usize {
        self.objects.iter().map(|o| o.nb_ids()).sum()
    }

    /// Objects whose identity was corrected at least once.
    pub fn corrected_objects(&self) -> Vec<&TrackedObject> {
        self.objects
            .iter()
            .filter(|o| o.nb_corrections() > 0)
            .collect()
    }

    /// Objects that made it past the admission filter at some point.
    pub fn seen_objects(&self) -> Vec<&TrackedObject> {
        self.objects
            .iter()
            .filter(|o| {
                !matches!(
                    o.state,
                    ObjectState::TrackerOutput | ObjectState::FilteredOutput
                )
            })
            .collect()
    }

    /// Mean number of corrections per object; 0.0 with no objects.
    pub fn mean_nb_corrections(&self) -> f64 {
        if self.objects.is_empty() {
            return 0.0;
        }
        self.nb_corrections() as f64 / self.objects.len() as f64
    }

    /// Structured snapshot of every identity, keyed by canonical id; for
    /// persistence and inspection, not the hot path.
    pub fn export(&self) -> BTreeMap<u64, &TrackedObject> {
        self.objects
            .iter()
            .map(|object| (object.object_id(), object))
            .collect()
    }
}
