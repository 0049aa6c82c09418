//! Episodic Memory and Skill Library
//!
//! Episodes live in a ring buffer with oldest-first eviction. Skills map a
//! task to the last action sequence that solved it.

use std::collections::HashMap;

use tracing::debug;
use uuid::Uuid;

use physis_common::{Action, RingBuffer, State, TaskId};

use crate::domain::memory::Episode;

/// Episodes scanned by [`EpisodeMemory::similar_episodes`]
pub const SIMILARITY_SCAN_DEPTH: usize = 100;

/// Bounded store of observed transitions
#[derive(Debug, Clone)]
pub struct EpisodeMemory {
    episodes: RingBuffer<Episode>,
}

impl EpisodeMemory {
    /// Create a store holding at most `capacity` episodes
    pub fn new(capacity: usize) -> Self {
        Self {
            episodes: RingBuffer::new(capacity),
        }
    }

    /// Record a transition, evicting the oldest episode when full
    pub fn store_episode(
        &mut self,
        state: State,
        action: Action,
        next_state: State,
        success: bool,
    ) -> Uuid {
        let episode = Episode::new(state, action, next_state, success);
        let id = episode.id;
        if let Some(evicted) = self.episodes.push(episode) {
            debug!(evicted = %evicted.id, "Episode evicted");
        }
        id
    }

    /// Up to `k` recent episodes, exact fingerprint matches first
    ///
    /// Only the newest [`SIMILARITY_SCAN_DEPTH`] episodes are considered.
    /// Within each group episodes keep chronological order.
    pub fn similar_episodes(&self, state: &State, k: usize) -> Vec<&Episode> {
        let target = state.fingerprint();
        let (exact, rest): (Vec<&Episode>, Vec<&Episode>) = self
            .episodes
            .recent(SIMILARITY_SCAN_DEPTH)
            .partition(|ep| ep.fingerprint == target);

        exact.into_iter().chain(rest).take(k).collect()
    }

    pub fn episodes(&self) -> impl Iterator<Item = &Episode> {
        self.episodes.iter()
    }

    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.episodes.capacity()
    }
}

impl Default for EpisodeMemory {
    fn default() -> Self {
        Self::new(crate::EPISODE_CAPACITY)
    }
}

/// Task → last successful action sequence
#[derive(Debug, Clone, Default)]
pub struct SkillLibrary {
    skills: HashMap<TaskId, Vec<Action>>,
}

impl SkillLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a skill, replacing any previous one for the task
    pub fn store_skill(&mut self, task_id: TaskId, actions: &[Action]) {
        debug!(task = %task_id, len = actions.len(), "Skill stored");
        self.skills.insert(task_id, actions.to_vec());
    }

    /// Copy of the stored skill for a task
    pub fn skill(&self, task_id: TaskId) -> Option<Vec<Action>> {
        self.skills.get(&task_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}
