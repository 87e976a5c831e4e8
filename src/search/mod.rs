//! Deep search partitioning.
//!
//! A Gelbooru-style API never reveals how many posts a search matches; it
//! only answers "here is page N, up to L posts of it". Once a search
//! matches more posts than the site's pagination cap, plain paging can no
//! longer reach the tail of the result set. [`SearchPartitioner`] works
//! around that by splitting the search into contiguous post-ID windows,
//! each small enough to page through in full.
//!
//! Window boundaries are inferred from a handful of bounded page probes:
//! * a probe at the highest reachable page index tells whether the
//!   current window saturates the cap,
//! * a probe at page zero catches the final, short window of a search,
//! * and when both come back full, a binary search over the page indices
//!   in between hunts down the partial page sitting at the seam.
//!
//! Probes are strictly sequential: every answer decides the parameters of
//! the next request, so nothing here is worth parallelizing.
use std::time::{Duration, Instant};

use log::debug;

use crate::client::models::Post;
use crate::client::SearchClient;
use crate::config::SearchLimits;

use self::error::DeepSearchError;
use self::query::{IdWindow, Partition, TagQuery};

pub mod error;
pub mod query;

/// Outcome of the binary page bisection: either a probe landed on the
/// partial page and the exact boundary post is known, or every probed
/// page was full or empty and only the last full page index survived.
enum BinaryProbe {
    FoundPost(u64),
    FoundFullPage(u64),
}

/// Splits a tag search into cap-respecting ID windows by probing the
/// imageboard a few pages at a time.
pub struct SearchPartitioner<C> {
    client: C,
    limits: SearchLimits,
    request_count: u64,
    request_time: Duration,
}

impl<C> SearchPartitioner<C> {
    pub fn new(client: C, limits: SearchLimits) -> Self {
        Self {
            client,
            limits,
            request_count: 0,
            request_time: Duration::ZERO,
        }
    }

    /// Number of API requests issued by the last computation.
    pub const fn request_count(&self) -> u64 {
        self.request_count
    }

    /// Total time spent waiting on the API during the last computation.
    pub const fn request_time(&self) -> Duration {
        self.request_time
    }
}

impl<C: SearchClient> SearchPartitioner<C> {
    /// Computes the ordered window list covering every post the query
    /// matches.
    ///
    /// The first window owns both of its bounds; every later window
    /// starts right after the previous window's end. Fails with
    /// [`DeepSearchError::EmptySearch`] when the query matches nothing.
    pub async fn compute_partition(
        &mut self,
        query: &TagQuery,
    ) -> Result<Partition, DeepSearchError> {
        debug!("Starting deep search for tags {:?}", query.tags());
        self.request_count = 0;
        self.request_time = Duration::ZERO;

        let first_id = self.lowest_id(query).await?;
        let last_id = self.highest_id(query).await?;

        let (Some(first_id), Some(last_id)) = (first_id, last_id) else {
            return Err(DeepSearchError::EmptySearch {
                tags: query.tags().join(" "),
            });
        };
        debug!("First id {}, last id {}", first_id, last_id);

        let mut windows: Vec<IdWindow> = Vec::new();
        let mut window_start = first_id;

        while window_start < last_id {
            match self.find_window_end(query, window_start).await? {
                Some(window_end) => {
                    windows.push(next_window(&windows, window_start, window_end));
                    window_start = window_end;
                }
                None => {
                    // Overshot past the final post; close out with
                    // whatever remains up to the highest known ID.
                    windows.push(next_window(&windows, window_start, last_id));
                    break;
                }
            }
        }

        // A search matching a single post never enters the loop; the
        // partition still has to cover it.
        if windows.is_empty() {
            windows.push(IdWindow::leading(first_id, last_id));
        }

        debug!("Generated {} windows", windows.len());
        Ok(Partition::new(windows))
    }

    /// Finds the ID closing the window that opens right above `min_id`,
    /// or `None` when nothing matches beyond it.
    async fn find_window_end(
        &mut self,
        query: &TagQuery,
        min_id: u64,
    ) -> Result<Option<u64>, DeepSearchError> {
        debug!("Looking for the window end above id {}", min_id);

        let probe_tags = query.probe_tags(min_id);
        let per_page = self.limits.max_posts_per_page();

        // A full page at the highest reachable index means this window
        // saturates the pagination cap and more posts remain beyond it.
        let last_page = self
            .probe(&probe_tags, per_page, self.limits.max_pages())
            .await?;
        debug!("Last page returned {} posts", last_page.len());

        if last_page.len() as u64 == per_page {
            let end = last_post_id(&last_page)?;
            debug!("Last page is full, window ends at id {}", end);
            return Ok(Some(end));
        }

        let first_page = self.probe(&probe_tags, per_page, 0).await?;
        debug!("First page returned {} posts", first_page.len());

        if first_page.is_empty() {
            // Overshot the end of the result set; the previous window
            // was the last one.
            debug!("First page is empty, no posts above id {}", min_id);
            return Ok(None);
        }

        if (first_page.len() as u64) < per_page {
            let end = last_post_id(&first_page)?;
            debug!("First page is partial, window ends at id {}", end);
            return Ok(Some(end));
        }

        // Both probes came back full, so the boundary page lies strictly
        // between them.
        match self.bisect_boundary_page(&probe_tags).await? {
            BinaryProbe::FoundPost(id) => Ok(Some(id)),
            BinaryProbe::FoundFullPage(page) => {
                // The partial page slipped between the probed indices;
                // settle for the end of the last full page seen. The
                // window comes up at most one page short and the next
                // iteration re-probes the uncovered tail.
                let posts = self.probe(&probe_tags, per_page, page).await?;
                let end = last_post_id(&posts)?;
                debug!("Settled on full page {}, window ends at id {}", page, end);
                Ok(Some(end))
            }
        }
    }

    /// Binary search over the page indices strictly between the two pages
    /// already probed, looking for the partial page at the seam.
    ///
    /// Relies on fullness being monotonic under the fixed ascending sort
    /// and ID floor: every page up to the seam is full, everything after
    /// it is empty, with at most one partial page in between.
    async fn bisect_boundary_page(
        &mut self,
        probe_tags: &[String],
    ) -> Result<BinaryProbe, DeepSearchError> {
        let per_page = self.limits.max_posts_per_page();
        let mut left = 1;
        let mut right = self.limits.max_pages() - 1;
        let mut last_full_page = 0;

        while left <= right {
            let mid = (left + right) / 2;
            debug!("Bisecting pages: left {}, right {}, mid {}", left, right, mid);

            let posts = self.probe(probe_tags, per_page, mid).await?;
            let count = posts.len() as u64;

            if count == 0 {
                debug!("Page {} is empty", mid);
                right = mid - 1;
            } else if count < per_page {
                let id = last_post_id(&posts)?;
                debug!("Found the partial page at {}, boundary id {}", mid, id);
                return Ok(BinaryProbe::FoundPost(id));
            } else {
                debug!("Page {} is full", mid);
                last_full_page = mid;
                left = mid + 1;
            }
        }

        debug!(
            "No partial page hit, falling back to full page {}",
            last_full_page
        );
        Ok(BinaryProbe::FoundFullPage(last_full_page))
    }

    /// Lowest matching ID: ascending order, first post of the first page.
    async fn lowest_id(&mut self, query: &TagQuery) -> Result<Option<u64>, DeepSearchError> {
        let posts = self.probe(&query.ascending_tags(), 1, 0).await?;
        Ok(posts.first().map(|p| p.id))
    }

    /// Highest matching ID. Relies on the API default order, newest
    /// first; no sort tag is injected.
    async fn highest_id(&mut self, query: &TagQuery) -> Result<Option<u64>, DeepSearchError> {
        let posts = self.probe(query.tags(), 1, 0).await?;
        Ok(posts.first().map(|p| p.id))
    }

    async fn probe(
        &mut self,
        tags: &[String],
        limit: u64,
        page: u64,
    ) -> Result<Vec<Post>, DeepSearchError> {
        self.request_count += 1;
        debug!(
            "Request #{}: {:?}, limit {}, page {}",
            self.request_count, tags, limit, page
        );

        let start = Instant::now();
        let posts = self.client.search(tags, limit, page).await?;
        let elapsed = start.elapsed();
        self.request_time += elapsed;

        debug!("Request #{} completed in {:?}", self.request_count, elapsed);
        Ok(posts)
    }
}

fn next_window(windows: &[IdWindow], start: u64, end: u64) -> IdWindow {
    if windows.is_empty() {
        IdWindow::leading(start, end)
    } else {
        IdWindow::following(start, end)
    }
}

// The DAPI never hands back a full or partial page without posts; an
// empty one here means the result set shifted underneath the computation.
fn last_post_id(page: &[Post]) -> Result<u64, DeepSearchError> {
    page.last()
        .map(|p| p.id)
        .ok_or(DeepSearchError::InconsistentResults)
}
