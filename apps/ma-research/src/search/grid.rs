//! Search-space definitions: the coarse grid and the refinement neighborhood.

use serde::{Deserialize, Serialize};

use crate::error::{ResearchError, Result};

/// Validated coarse grid: non-empty, strictly ascending, positive windows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct CoarseGrid(Vec<usize>);

impl CoarseGrid {
    /// Create a grid from caller-supplied windows.
    pub fn new(windows: Vec<usize>) -> Result<Self> {
        if windows.is_empty() {
            return Err(ResearchError::InvalidSearchSpace(
                "coarse grid is empty".to_string(),
            ));
        }
        if windows.contains(&0) {
            return Err(ResearchError::InvalidSearchSpace(
                "coarse grid windows must be positive".to_string(),
            ));
        }
        if let Some(pair) = windows.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(ResearchError::InvalidSearchSpace(format!(
                "coarse grid must be strictly ascending ({} then {})",
                pair[0], pair[1]
            )));
        }
        Ok(Self(windows))
    }

    /// Windows in grid order.
    #[must_use]
    pub fn windows(&self) -> &[usize] {
        &self.0
    }

    /// Number of windows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a validated grid.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Largest window in the grid.
    #[must_use]
    pub fn max_window(&self) -> usize {
        self.0.last().copied().unwrap_or(0)
    }

    /// Whether `window` is a grid point.
    #[must_use]
    pub fn contains(&self, window: usize) -> bool {
        self.0.binary_search(&window).is_ok()
    }
}

impl TryFrom<Vec<usize>> for CoarseGrid {
    type Error = ResearchError;

    fn try_from(windows: Vec<usize>) -> Result<Self> {
        Self::new(windows)
    }
}

impl From<CoarseGrid> for Vec<usize> {
    fn from(grid: CoarseGrid) -> Self {
        grid.0
    }
}

/// Local refinement around the best coarse window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefineSpec {
    /// Half-width of the neighborhood.
    pub radius: usize,
    /// Step between candidate windows, counted from the lower end.
    pub stride: usize,
    /// Smallest window considered.
    pub lower_bound: usize,
    /// Largest window considered.
    pub upper_bound: usize,
}

impl Default for RefineSpec {
    fn default() -> Self {
        Self {
            radius: 20,
            stride: 5,
            lower_bound: 5,
            upper_bound: 250,
        }
    }
}

impl RefineSpec {
    /// Check that the neighborhood is well formed.
    pub fn validate(&self) -> Result<()> {
        if self.stride == 0 {
            return Err(ResearchError::InvalidSearchSpace(
                "refine stride must be positive".to_string(),
            ));
        }
        if self.lower_bound == 0 {
            return Err(ResearchError::InvalidSearchSpace(
                "refine lower_bound must be positive".to_string(),
            ));
        }
        if self.lower_bound > self.upper_bound {
            return Err(ResearchError::InvalidSearchSpace(format!(
                "refine lower_bound {} exceeds upper_bound {}",
                self.lower_bound, self.upper_bound
            )));
        }
        Ok(())
    }

    /// Candidate windows around `center`, ascending.
    ///
    /// The range is `[max(lower_bound, center - radius), min(upper_bound,
    /// center + radius, max_window)]` stepped by `stride` from its lower end.
    /// Empty when the clamped range is empty.
    #[must_use]
    pub fn neighborhood(&self, center: usize, max_window: usize) -> Vec<usize> {
        let lo = self.lower_bound.max(center.saturating_sub(self.radius)).max(1);
        let hi = self
            .upper_bound
            .min(center.saturating_add(self.radius))
            .min(max_window);
        if lo > hi || self.stride == 0 {
            return Vec::new();
        }
        (lo..=hi).step_by(self.stride).collect()
    }
}
