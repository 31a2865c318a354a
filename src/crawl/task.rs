// src/crawl/task.rs
// =============================================================================
// This module implements one unit of recursive crawl work.
//
// A task owns a single locator at a given remaining depth. In order it:
// 1. Stops on exhausted depth or an empty locator (empty contribution)
// 2. Stops on an ignored locator, without marking it visited
// 3. Atomically claims the locator in the visited registry (first visitor wins)
// 4. Checks the crawl deadline, then parses the page under the parallelism gate
// 5. Merges the page's word counts into the shared tally
// 6. Checks the deadline again, then forks one child task per outbound locator
// 7. Waits for all of its children (fork/join)
//
// Tasks never hand partial results back to their parent; the shared registry
// and tally are the only communication. Recursion goes through boxed futures,
// so a deep link tree cannot overflow the native stack.
// =============================================================================

use futures::future::{join_all, BoxFuture};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use super::tally::WordTally;
use super::visited::VisitedRegistry;
use crate::config::IgnorePatterns;
use crate::parser::PageParser;

// State shared by every task of one crawl invocation
pub(crate) struct CrawlContext {
    pub visited: VisitedRegistry,
    pub tally: WordTally,
    pub ignored: IgnorePatterns,
    pub parser: Arc<dyn PageParser>,
    /// Wall-clock point after which no new work may start
    pub deadline: Instant,
    /// Bounds how many pages are being parsed at the same time
    pub gate: Semaphore,
}

impl CrawlContext {
    pub fn past_deadline(&self) -> bool {
        Instant::now() >= self.deadline
    }
}

// One node of the recursive traversal
pub(crate) struct CrawlTask {
    locator: String,
    depth: usize,
    ctx: Arc<CrawlContext>,
}

impl CrawlTask {
    pub fn new(locator: String, depth: usize, ctx: Arc<CrawlContext>) -> Self {
        Self {
            locator,
            depth,
            ctx,
        }
    }

    // Runs this task and, transitively, all of its children
    //
    // Returns a boxed future because the function is recursive: each child's
    // future has the same type as the parent's.
    pub fn run(self) -> BoxFuture<'static, ()> {
        Box::pin(async move {
            if self.depth == 0 || self.locator.is_empty() {
                return;
            }

            // Ignore is checked before the visit claim: an ignored path must
            // leave the locator claimable by a different, non-ignored path
            if self.ctx.ignored.matches(&self.locator) {
                debug!(locator = %self.locator, "locator ignored");
                return;
            }

            if !self.ctx.visited.try_visit(&self.locator) {
                debug!(locator = %self.locator, "already visited");
                return;
            }

            // Cooperative cancellation: no new page work past the deadline
            if self.ctx.past_deadline() {
                debug!(locator = %self.locator, "deadline reached before parse");
                return;
            }

            let parsed = {
                // Permit held only for the parse itself; it is released before
                // the children run, so a waiting parent cannot starve them
                let _permit = match self.ctx.gate.acquire().await {
                    Ok(permit) => permit,
                    Err(_) => return, // gate closed, crawl is shutting down
                };
                self.ctx.parser.parse(&self.locator).await
            };

            // A failing page contributes nothing and spawns nothing, but the
            // rest of the crawl keeps going
            let page = match parsed {
                Ok(page) => page,
                Err(e) => {
                    warn!(locator = %self.locator, error = %e, "page failed, skipping branch");
                    return;
                }
            };

            self.ctx.tally.merge(page.word_counts);

            if self.ctx.past_deadline() {
                debug!(locator = %self.locator, "deadline reached, not spawning children");
                return;
            }

            let children = page.links.into_iter().map(|link| {
                CrawlTask::new(link, self.depth - 1, Arc::clone(&self.ctx)).run()
            });

            // Fork/join: this task completes only when all its children have
            join_all(children).await;
        })
    }
}
