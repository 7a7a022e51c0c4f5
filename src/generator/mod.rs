//! Backtracking search for conflict-free frequencies.
//!
//! The generator fills a list of [`ChannelTemplate`] slots one at a time. For
//! each slot it draws candidates from a [`CandidateSet`], runs the analyser's
//! full conflict check, commits the first clean candidate and recurses. A
//! dead end rolls the commit back and tries the next candidate.
//!
//! Commits made during the search are tentative: the analyser keeps the
//! replaced intermod list on a stack, so a rollback restores the exact list.
//! Only a complete assignment is kept. Any other outcome leaves the analyser
//! exactly as it was.
//!
//! ## Example
//!
//! ```rust
//! use rfcoord::analyser::Analyser;
//! use rfcoord::generator::{GeneratorConfig, SearchOutcome, add_new_channels};
//! use rfcoord::types::{Equipment, ImSpacing, Range};
//! use std::sync::Arc;
//!
//! let range = Range::new(606_000, 614_000, "CH38");
//! let equipment = Arc::new(
//!     Equipment::new("Shure", "UHF-R", 25, 325, ImSpacing::new(175, 0, 0, 0, 50))?
//!         .with_ranges(vec![range.clone()])?,
//! );
//!
//! let mut analyser = Analyser::new();
//! let report = add_new_channels(&mut analyser, 4, equipment, range, &GeneratorConfig::default())?;
//!
//! assert_eq!(report.outcome, SearchOutcome::Found);
//! assert_eq!(analyser.channel_count(), 4);
//! assert_eq!(analyser.conflict_count(), 0);
//! # Ok::<(), rfcoord::CoordinationError>(())
//! ```

mod candidates;

pub use candidates::CandidateSet;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

use crate::analyser::Analyser;
use crate::types::{Channel, ChannelId, Equipment, Range};
use crate::{CoordinationError, Result};

/// How the next candidate is drawn from a slot's set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum Selection {
    /// Lowest remaining frequency. Deterministic, packs channels low.
    #[default]
    Lowest,
    /// Uniform pick. A fixed seed makes the search reproducible.
    Random { seed: Option<u64> },
}

/// Search configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneratorConfig {
    pub selection: Selection,
    /// Upper bound on candidates examined. `None` searches exhaustively.
    pub max_iterations: Option<u64>,
    pub time_limit: Option<Duration>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            selection: Selection::Lowest,
            max_iterations: Some(1_000_000),
            time_limit: None,
        }
    }
}

impl GeneratorConfig {
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: Option<u64>) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_time_limit(mut self, time_limit: Option<Duration>) -> Self {
        self.time_limit = time_limit;
        self
    }
}

/// One channel to place.
#[derive(Debug, Clone)]
pub struct ChannelTemplate {
    /// Fixed id, or `None` to take one from the analyser's counter.
    pub id: Option<ChannelId>,
    /// Fixed name, or `None` for the default channel name.
    pub name: Option<String>,
    pub equipment: Arc<Equipment>,
    /// Bound range the frequency is drawn from. Must belong to `equipment`.
    pub range: Range,
}

impl ChannelTemplate {
    pub fn new(equipment: Arc<Equipment>, range: Range) -> Self {
        Self {
            id: None,
            name: None,
            equipment,
            range,
        }
    }

    pub fn with_id(mut self, id: ChannelId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    fn same_profile(&self, other: &ChannelTemplate) -> bool {
        self.range == other.range
            && (Arc::ptr_eq(&self.equipment, &other.equipment)
                || *self.equipment == *other.equipment)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchOutcome {
    /// Every slot was filled and committed.
    Found,
    /// The candidate space holds no complete assignment.
    Exhausted,
    /// The iteration or time budget ran out first.
    BudgetExceeded,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Candidates examined.
    pub iterations: u64,
    /// Committed candidates later rolled back.
    pub backtracks: u64,
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub outcome: SearchOutcome,
    /// Accepted frequencies in slot order. Empty unless `Found`.
    pub frequencies: Vec<i32>,
    /// Ids of the added channels in slot order. Empty unless `Found`.
    pub channels: Vec<ChannelId>,
    pub stats: SearchStats,
}

impl GenerationReport {
    pub fn is_found(&self) -> bool {
        self.outcome == SearchOutcome::Found
    }
}

/// Find and add `count` conflict-free channels on `equipment` within `range`.
pub fn add_new_channels(
    analyser: &mut Analyser,
    count: usize,
    equipment: Arc<Equipment>,
    range: Range,
    config: &GeneratorConfig,
) -> Result<GenerationReport> {
    let templates = vec![ChannelTemplate::new(equipment, range); count];
    let mut generator = FrequencyGenerator::new(config.clone());
    generator.generate(analyser, &templates)
}

/// Depth-first search driver. Keeps its configuration and RNG across calls.
#[derive(Debug)]
pub struct FrequencyGenerator {
    config: GeneratorConfig,
    rng: StdRng,
}

enum Step {
    Found,
    Exhausted,
    OutOfBudget,
}

struct Search<'a> {
    analyser: &'a mut Analyser,
    templates: &'a [ChannelTemplate],
    ids: Vec<ChannelId>,
    accepted: Vec<i32>,
    stats: SearchStats,
    started: Instant,
}

impl FrequencyGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        let rng = match config.selection {
            Selection::Random { seed: Some(seed) } => StdRng::seed_from_u64(seed),
            _ => StdRng::from_os_rng(),
        };
        Self { config, rng }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Fill every slot in `templates`, or leave `analyser` untouched.
    pub fn generate(
        &mut self,
        analyser: &mut Analyser,
        templates: &[ChannelTemplate],
    ) -> Result<GenerationReport> {
        let ids = assign_ids(analyser, templates)?;
        for template in templates {
            template.equipment.validate()?;
            template.range.validate()?;
            if !template.equipment.has_range(&template.range) {
                return Err(CoordinationError::invalid_argument(format!(
                    "range {} is not offered by {}",
                    template.range, template.equipment
                )));
            }
        }

        info!(
            slots = templates.len(),
            existing = analyser.channel_count(),
            "Starting frequency search"
        );
        let mut search = Search {
            analyser,
            templates,
            ids,
            accepted: Vec::new(),
            stats: SearchStats::default(),
            started: Instant::now(),
        };

        let first = match templates.first() {
            Some(template) => {
                CandidateSet::from_analyser(&*search.analyser, &template.equipment, &template.range)
            }
            None => CandidateSet::default(),
        };
        let step = search.descend(0, first, &self.config, &mut self.rng)?;
        search.stats.elapsed = search.started.elapsed();

        let outcome = match step {
            Step::Found => SearchOutcome::Found,
            Step::Exhausted => SearchOutcome::Exhausted,
            Step::OutOfBudget => SearchOutcome::BudgetExceeded,
        };
        let stats = search.stats;
        let (frequencies, channels) = if outcome == SearchOutcome::Found {
            search.analyser.release_tentative();
            let mut frequencies = search.accepted;
            frequencies.reverse();
            (frequencies, search.ids)
        } else {
            (Vec::new(), Vec::new())
        };

        match outcome {
            SearchOutcome::Found => info!(
                channels = channels.len(),
                iterations = stats.iterations,
                backtracks = stats.backtracks,
                elapsed_ms = stats.elapsed.as_millis() as u64,
                "Frequency search succeeded"
            ),
            SearchOutcome::Exhausted => warn!(
                slots = templates.len(),
                iterations = stats.iterations,
                "Frequency search exhausted candidates"
            ),
            SearchOutcome::BudgetExceeded => warn!(
                slots = templates.len(),
                iterations = stats.iterations,
                "Frequency search ran out of budget"
            ),
        }
        Ok(GenerationReport {
            outcome,
            frequencies,
            channels,
            stats,
        })
    }
}

impl Search<'_> {
    fn out_of_budget(&self, config: &GeneratorConfig) -> bool {
        config
            .max_iterations
            .is_some_and(|max| self.stats.iterations >= max)
            || config
                .time_limit
                .is_some_and(|limit| self.started.elapsed() >= limit)
    }

    fn descend(
        &mut self,
        slot: usize,
        mut candidates: CandidateSet,
        config: &GeneratorConfig,
        rng: &mut StdRng,
    ) -> Result<Step> {
        let templates = self.templates;
        let Some(template) = templates.get(slot) else {
            return Ok(Step::Found);
        };
        let id = self.ids[slot];
        let next_template = templates.get(slot + 1);

        loop {
            if self.out_of_budget(config) {
                return Ok(Step::OutOfBudget);
            }
            let picked = match config.selection {
                Selection::Lowest => candidates.take_lowest(),
                Selection::Random { .. } => candidates.take_random(rng),
            };
            let Some(frequency) = picked else {
                trace!(slot, "Candidates exhausted");
                return Ok(Step::Exhausted);
            };
            self.stats.iterations += 1;

            let mut channel = Channel::new(id, frequency, template.equipment.clone())?
                .with_range(template.range.clone())?;
            if let Some(name) = &template.name {
                channel.set_name(name.clone());
            }

            let intermods = self.analyser.calculate_intermods(&channel);
            let conflicts = self.analyser.detect_conflicts(&channel, &intermods);
            if !conflicts.is_empty() {
                trace!(
                    slot,
                    frequency,
                    conflicts = conflicts.len(),
                    "Candidate rejected"
                );
                continue;
            }

            let narrowed = next_template
                .filter(|next| next.same_profile(template))
                .map(|_| {
                    let mut next = candidates.clone();
                    next.exclude_channel(&template.equipment, &channel);
                    for intermod in &intermods {
                        next.exclude_intermod(&template.equipment, intermod);
                    }
                    next
                });

            self.analyser.commit_tentative(channel, &intermods);
            trace!(slot, frequency, "Candidate committed");

            let next = match (narrowed, next_template) {
                (Some(narrowed), _) => narrowed,
                (None, Some(next)) => {
                    CandidateSet::from_analyser(&*self.analyser, &next.equipment, &next.range)
                }
                (None, None) => CandidateSet::default(),
            };

            match self.descend(slot + 1, next, config, rng)? {
                Step::Found => {
                    self.accepted.push(frequency);
                    return Ok(Step::Found);
                }
                Step::OutOfBudget => {
                    self.analyser.rollback_tentative(id);
                    return Ok(Step::OutOfBudget);
                }
                Step::Exhausted => {
                    self.analyser.rollback_tentative(id);
                    self.stats.backtracks += 1;
                    debug!(slot, frequency, "Backtracking");
                }
            }
        }
    }
}

/// Fixed ids are checked for clashes; the rest are drawn upward from the
/// analyser's counter, skipping taken ids.
fn assign_ids(analyser: &Analyser, templates: &[ChannelTemplate]) -> Result<Vec<ChannelId>> {
    let mut taken = HashSet::new();
    for id in templates.iter().filter_map(|template| template.id) {
        if analyser.channel(id).is_some() || !taken.insert(id) {
            return Err(CoordinationError::invalid_argument(format!(
                "channel {id} is already present"
            )));
        }
    }

    let mut next = analyser.peek_next_id().0;
    let mut ids = Vec::with_capacity(templates.len());
    for template in templates {
        let id = match template.id {
            Some(id) => id,
            None => {
                while taken.contains(&ChannelId(next))
                    || analyser.channel(ChannelId(next)).is_some()
                {
                    next = next.checked_add(1).ok_or_else(|| {
                        CoordinationError::invalid_argument("channel ids exhausted")
                    })?;
                }
                taken.insert(ChannelId(next));
                ChannelId(next)
            }
        };
        ids.push(id);
    }
    Ok(ids)
}
