use std::{cell::Cell, rc::Rc};

use crate::transport::{MediaError, MediaFactory, PlaceholderStream};

/// Counts placeholder streams built and released through one factory.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderStats {
    created: Rc<Cell<usize>>,
    released: Rc<Cell<usize>>,
}

impl PlaceholderStats {
    #[must_use]
    pub fn created(&self) -> usize {
        self.created.get()
    }

    #[must_use]
    pub fn released(&self) -> usize {
        self.released.get()
    }

    /// Streams built but not yet released.
    #[must_use]
    pub fn live(&self) -> usize {
        self.created() - self.released()
    }
}

/// Silent audio plus a 1×1 video track, as far as the transport can tell.
#[derive(Debug)]
pub struct SyntheticPlaceholder {
    stats: PlaceholderStats,
    released: bool,
}

impl PlaceholderStream for SyntheticPlaceholder {
    fn track_count(&self) -> usize {
        if self.released { 0 } else { 2 }
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.stats.released.set(self.stats.released.get() + 1);
        }
    }
}

impl Drop for SyntheticPlaceholder {
    fn drop(&mut self) {
        self.release();
    }
}

#[derive(Debug, Default)]
pub struct SyntheticPlaceholderFactory {
    stats: PlaceholderStats,
    failure: Option<MediaError>,
}

impl SyntheticPlaceholderFactory {
    /// A factory whose every build fails with `error`.
    #[must_use]
    pub fn failing(error: MediaError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    pub fn set_failure(&mut self, failure: Option<MediaError>) {
        self.failure = failure;
    }

    #[must_use]
    pub fn stats(&self) -> &PlaceholderStats {
        &self.stats
    }
}

impl MediaFactory for SyntheticPlaceholderFactory {
    type Placeholder = SyntheticPlaceholder;

    fn create_placeholder(&mut self) -> Result<SyntheticPlaceholder, MediaError> {
        if let Some(e) = &self.failure {
            return Err(e.clone());
        }
        self.stats.created.set(self.stats.created.get() + 1);
        Ok(SyntheticPlaceholder {
            stats: self.stats.clone(),
            released: false,
        })
    }
}
