// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Debouncing of repeated classifications into one decision.
//!
//! A camera looking at a single item produces a stream of predictions that
//! may flicker between categories. [`ClassificationManager`] keeps a short
//! window of recent results and commits to a category once the stream is
//! stable enough, counting each committed decision.

use std::collections::VecDeque;
use std::path::Path;

use crate::category::{Category, CategoryCounts};
use crate::error::Result;
use crate::results::ClassificationOutput;
use crate::stats::StatsFile;
use crate::{verbose, warn};

/// Number of recent classifications kept.
pub const MAX_RECENT_CLASSIFICATIONS: usize = 10;

/// Identical consecutive results needed to decide.
pub const CONSECUTIVE_THRESHOLD: usize = 2;

/// Occurrences within a full window needed to decide.
pub const MAJORITY_THRESHOLD: usize = 5;

/// Anything that can turn an image path into a classification record.
pub trait ImageClassifier {
    /// Classify the image at `image`. Failures are reported in the record.
    fn classify_path(&mut self, image: &Path) -> ClassificationOutput;
}

/// Callback invoked with each finalized category.
pub type DecisionCallback = Box<dyn FnMut(Category) + Send>;

/// Turns a stream of classifications into finalized decisions.
pub struct ClassificationManager<C> {
    classifier: C,
    counts: CategoryCounts,
    recent: VecDeque<Category>,
    current: Option<Category>,
    finalized: bool,
    stats: Option<StatsFile>,
    callback: Option<DecisionCallback>,
}

impl<C: ImageClassifier> ClassificationManager<C> {
    /// Create a manager without stats persistence.
    #[must_use]
    pub fn new(classifier: C) -> Self {
        Self {
            classifier,
            counts: CategoryCounts::new(),
            recent: VecDeque::with_capacity(MAX_RECENT_CLASSIFICATIONS + 1),
            current: None,
            finalized: false,
            stats: None,
            callback: None,
        }
    }

    /// Create a manager that persists decisions under `stats_dir`.
    ///
    /// Counts are seeded from an existing stats file.
    ///
    /// # Errors
    ///
    /// Returns an error if the stats directory or file can't be created or read.
    pub fn with_stats_dir<P: AsRef<Path>>(classifier: C, stats_dir: P) -> Result<Self> {
        let stats = StatsFile::open(stats_dir)?;
        let counts = stats.load_counts()?;
        verbose!(
            "Loaded {} previous decisions from {}",
            counts.total(),
            stats.path().display()
        );

        let mut manager = Self::new(classifier);
        manager.counts = counts;
        manager.stats = Some(stats);
        Ok(manager)
    }

    /// Set the callback notified when a decision is finalized.
    pub fn set_callback<F>(&mut self, callback: F)
    where
        F: FnMut(Category) + Send + 'static,
    {
        self.callback = Some(Box::new(callback));
    }

    /// Classify an image and feed a successful result into the window.
    ///
    /// Returns the category if this result finalized a decision.
    pub fn classify_image<P: AsRef<Path>>(&mut self, image: P) -> Option<Category> {
        let output = self.classifier.classify_path(image.as_ref());

        match output {
            ClassificationOutput {
                success: true,
                category: Some(category),
                ..
            } => self.record(category),
            ClassificationOutput { error, .. } => {
                warn!(
                    "Classification failed: {}",
                    error.as_deref().unwrap_or("Unknown error")
                );
                None
            }
        }
    }

    /// Add a category to the window and finalize if the window is stable.
    ///
    /// Returns the category if this call finalized a decision.
    pub fn record(&mut self, category: Category) -> Option<Category> {
        self.recent.push_back(category);
        if self.recent.len() > MAX_RECENT_CLASSIFICATIONS {
            self.recent.pop_front();
        }

        if self.finalized {
            return None;
        }

        let decided = self.consecutive_match().or_else(|| self.majority_match());
        if let Some(decision) = decided {
            self.finalize(decision);
        }
        decided
    }

    /// The last `CONSECUTIVE_THRESHOLD` results agree.
    fn consecutive_match(&self) -> Option<Category> {
        if self.recent.len() < CONSECUTIVE_THRESHOLD {
            return None;
        }
        let mut tail = self.recent.iter().rev().take(CONSECUTIVE_THRESHOLD);
        let last = *tail.next()?;
        tail.all(|&c| c == last).then_some(last)
    }

    /// A full window where one category reaches the majority threshold.
    /// The majority category is returned, not the entry that filled the
    /// window. On a tie the most recent category wins.
    fn majority_match(&self) -> Option<Category> {
        if self.recent.len() < MAX_RECENT_CLASSIFICATIONS {
            return None;
        }

        let mut frequency = CategoryCounts::new();
        for &c in &self.recent {
            frequency.increment(c);
        }

        let newest = self.recent.back().copied();
        frequency
            .iter()
            .filter(|&(_, n)| n >= MAJORITY_THRESHOLD)
            .max_by_key(|&(c, n)| (n, Some(c) == newest))
            .map(|(c, _)| c)
    }

    fn finalize(&mut self, category: Category) {
        self.current = Some(category);
        self.finalized = true;
        let count = self.counts.increment(category);
        verbose!("Finalized {category} (total {count})");

        if let Some(stats) = &self.stats
            && let Err(e) = stats.append(category, count)
        {
            warn!("{e}");
        }

        if let Some(callback) = self.callback.as_mut() {
            callback(category);
        }
    }

    /// Forget the current decision and window, ready for the next item.
    /// Counts are kept.
    pub fn reset(&mut self) {
        self.current = None;
        self.finalized = false;
        self.recent.clear();
    }

    /// Decisions per category, including ones loaded from the stats file.
    #[must_use]
    pub const fn counts(&self) -> CategoryCounts {
        self.counts
    }

    /// The finalized category, if any.
    #[must_use]
    pub const fn current(&self) -> Option<Category> {
        self.current
    }

    /// Whether a decision has been made since the last reset.
    #[must_use]
    pub const fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// The wrapped classifier.
    pub const fn classifier_mut(&mut self) -> &mut C {
        &mut self.classifier
    }
}

impl<C> std::fmt::Debug for ClassificationManager<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassificationManager")
            .field("counts", &self.counts)
            .field("recent", &self.recent)
            .field("current", &self.current)
            .field("finalized", &self.finalized)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
