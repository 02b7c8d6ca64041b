//! Process-wide translation cache invalidation.
//!
//! Whatever serves translated strings keeps its own cache; this module only
//! carries the "translations changed" signal. Readers compare the generation
//! they built their cache at against [`TranslationCacheState::generation`].

use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Invalidation hook fired after every translation save or delete
pub trait TranslationCache: Send + Sync {
    fn clear(&self);
}

#[derive(Debug, Default)]
pub struct TranslationCacheState {
    generation: AtomicU64,
}

impl TranslationCacheState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of invalidations since startup
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

impl TranslationCache for TranslationCacheState {
    fn clear(&self) {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        debug!("Translation cache invalidated (generation {})", generation);
    }
}
