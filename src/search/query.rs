//! Search query building blocks: validated tag lists, ID windows and the
//! rendered sub-searches a partition turns into.
use super::error::DeepSearchError;

/// Sort directives the partitioner appends internally to force a stable
/// ID order. Caller-supplied queries must not contain them.
pub(crate) const SORT_ASCENDING: &str = "sort:id:asc";
pub(crate) const SORT_DESCENDING: &str = "sort:id:desc";

/// A validated, lower-cased tag search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagQuery {
    tags: Vec<String>,
}

impl TagQuery {
    /// Builds a query from raw input words. Each word may carry several
    /// whitespace-separated tags; everything is lower-cased.
    ///
    /// Fails with [`DeepSearchError::ForbiddenTags`] when the input
    /// already contains one of the internal sort directives, before any
    /// network request could be made with it.
    pub fn new<S: AsRef<str>>(input: &[S]) -> Result<Self, DeepSearchError> {
        let tags: Vec<String> = input
            .iter()
            .flat_map(|t| t.as_ref().split_whitespace())
            .map(str::to_lowercase)
            .collect();

        if let Some(tag) = tags
            .iter()
            .find(|t| *t == SORT_ASCENDING || *t == SORT_DESCENDING)
        {
            return Err(DeepSearchError::ForbiddenTags { tag: tag.clone() });
        }

        Ok(Self { tags })
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// The query every boundary probe uses: restricted to IDs above
    /// `min_id` and forced ascending so page fullness is monotonic.
    pub(crate) fn probe_tags(&self, min_id: u64) -> Vec<String> {
        let mut tags = self.ascending_tags();
        tags.push(format!("id:>{min_id}"));
        tags
    }

    /// The query forced ascending, used to find the first matching ID.
    pub(crate) fn ascending_tags(&self) -> Vec<String> {
        let mut tags = self.tags.clone();
        tags.push(SORT_ASCENDING.to_string());
        tags
    }
}

/// A contiguous, cap-respecting ID range covering part of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdWindow {
    pub start: u64,
    pub end: u64,
    /// Whether `start` itself belongs to the window. Only the first
    /// window of a partition owns its start; every later window begins
    /// right after the previous window's end, which was already counted.
    pub start_inclusive: bool,
}

impl IdWindow {
    pub(crate) fn leading(start: u64, end: u64) -> Self {
        Self {
            start,
            end,
            start_inclusive: true,
        }
    }

    pub(crate) fn following(start: u64, end: u64) -> Self {
        Self {
            start,
            end,
            start_inclusive: false,
        }
    }

    /// Tag constraining a search to this window's lower bound.
    pub fn lower_bound_tag(&self) -> String {
        if self.start_inclusive {
            format!("id:>={}", self.start)
        } else {
            format!("id:>{}", self.start)
        }
    }

    /// Tag constraining a search to this window's upper bound.
    pub fn upper_bound_tag(&self) -> String {
        format!("id:<={}", self.end)
    }

    /// Whether the given post ID falls inside this window.
    pub fn contains(&self, id: u64) -> bool {
        let above_start = if self.start_inclusive {
            id >= self.start
        } else {
            id > self.start
        };

        above_start && id <= self.end
    }
}

/// The complete ordered window list covering a search from its first to
/// its last matching ID, with no gaps and no double-counted IDs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    windows: Vec<IdWindow>,
}

impl Partition {
    pub(crate) fn new(windows: Vec<IdWindow>) -> Self {
        Self { windows }
    }

    pub fn windows(&self) -> &[IdWindow] {
        &self.windows
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Renders one ready-to-use search per window: the original tags plus
    /// the window's ID bounds, space-joined in window order.
    pub fn queries(&self, query: &TagQuery) -> Vec<String> {
        self.windows
            .iter()
            .map(|window| {
                let mut parts = query.tags().to_vec();
                parts.push(window.lower_bound_tag());
                parts.push(window.upper_bound_tag());
                parts.join(" ")
            })
            .collect()
    }
}
