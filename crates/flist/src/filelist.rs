//! The segmented, globally-indexed file list (spec §4.5, §8, §9).

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::path::PathBuf;

use crate::compare::compare_entries;
use crate::entry::FileInfo;
use crate::error::FileListError;
use crate::segment::Segment;

/// Owns every live [`Segment`] plus the queue of stub directories awaiting
/// expansion.
///
/// Mutation discipline (spec §4.5's concurrency notes): `segments` is
/// mutated only through [`Filelist::new_segment`] and
/// [`Filelist::delete_first_segment`]; `stub_directories` is populated here
/// and drained only by [`Filelist::take_stub_directory`].
#[derive(Debug, Default)]
pub struct Filelist {
    segments: VecDeque<Segment>,
    stub_directories: BTreeMap<i64, PathBuf>,
    expanded_stub_directories: BTreeSet<i64>,
    next_index: i64,
}

impl Filelist {
    /// Builds an empty file list; the next segment created starts at global
    /// index 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sorts `entries` by the custom comparator, assigns them the next
    /// contiguous block of global indices, and files any directories among
    /// them (other than `.`) into the stub-directory queue. Adjacent
    /// byte-equal names are pruned, keeping the later occurrence, per the
    /// name-only dedup behavior preserved from upstream (spec §9).
    ///
    /// Returns the new segment's base index.
    pub fn new_segment(&mut self, parent_stub_index: Option<i64>, entries: Vec<FileInfo>) -> i64 {
        let mut entries = entries;
        entries.sort_by(compare_entries);
        dedup_by_name(&mut entries);

        let base_index = self.next_index - 1;
        let segment = Segment::new(base_index, parent_stub_index, entries);
        let end_index = segment.end_index();

        for (index, entry) in segment.iter() {
            if entry.is_directory() && !entry.is_dot_directory() {
                if let Some(path) = entry.local_path() {
                    self.stub_directories.insert(index, path.to_path_buf());
                }
            }
        }

        self.next_index = end_index + 1;
        self.segments.push_back(segment);
        base_index
    }

    /// Drops the oldest segment, e.g. once the sender has streamed past it.
    pub fn delete_first_segment(&mut self) -> Option<Segment> {
        self.segments.pop_front()
    }

    /// Finds the segment containing `index`, if any.
    #[must_use]
    pub fn get_segment_with(&self, index: i64) -> Option<&Segment> {
        self.segments.iter().find(|segment| segment.contains(index))
    }

    /// Looks up a single entry by its global index.
    #[must_use]
    pub fn get_entry(&self, index: i64) -> Option<&FileInfo> {
        self.get_segment_with(index)?.get(index)
    }

    /// Number of live segments.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// True iff at least one stub directory is still awaiting expansion.
    #[must_use]
    pub fn has_expandable_stubs(&self) -> bool {
        !self.stub_directories.is_empty()
    }

    /// The next global index [`Filelist::new_segment`] would assign.
    #[must_use]
    pub fn next_global_index(&self) -> i64 {
        self.next_index
    }

    /// Removes and returns the local path to scan for the stub directory at
    /// `dir_index`, marking it consumed.
    ///
    /// Distinguishes "never a valid stub directory index" from "already
    /// expanded" (spec §9 flags this distinction as missing upstream).
    pub fn take_stub_directory(&mut self, dir_index: i64) -> Result<PathBuf, FileListError> {
        if let Some(path) = self.stub_directories.remove(&dir_index) {
            self.expanded_stub_directories.insert(dir_index);
            Ok(path)
        } else if self.expanded_stub_directories.contains(&dir_index) {
            Err(FileListError::StubAlreadyConsumed(dir_index))
        } else {
            Err(FileListError::StubIndexOutOfRange(dir_index))
        }
    }
}

fn dedup_by_name(entries: &mut Vec<FileInfo>) {
    let mut i = 1;
    while i < entries.len() {
        if entries[i - 1].name_bytes() == entries[i].name_bytes() {
            logging::record(
                logging::Level::Warning,
                format!("duplicate file-list entry {:?}; dropping the earlier one", entries[i].decoded_name()),
            );
            entries.remove(i - 1);
        } else {
            i += 1;
        }
    }
}
