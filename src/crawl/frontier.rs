// src/crawl/frontier.rs
// =============================================================================
// This module implements the crawl frontier: the stack of URLs still to be
// fetched, plus the set of every URL that was ever put on it.
//
// How it works:
// 1. The crawl starts with an empty frontier and enqueues the root URL
// 2. Workers dequeue the most recently enqueued URL (LIFO = depth-first)
// 3. Links found on a page are filtered and the survivors enqueued
// 4. The seen set only ever grows, so a URL is never admitted twice
//
// Locking:
// - One reader/writer lock guards both the stack and the seen set
// - seen() takes the read lock, so many workers can test at once
// - enqueue() and dequeue() take the write lock, so the push and the
//   seen-set insert always happen together
//
// Rust concepts:
// - Vec: used as a stack (push / pop at the end)
// - HashSet: O(1) membership test on the canonical URL string
// - RwLock: shared readers, exclusive writer
// - Traits: Seener is the only part of the frontier the filters can see
// =============================================================================

use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;
use url::Url;

// The "has this URL been seen?" capability.
//
// The dedup filter only needs this one question answered, so it depends on
// this trait rather than on the whole Frontier. Tests can pass any stand-in.
pub trait Seener {
    fn seen(&self, url: &Url) -> bool;
}

impl<S: Seener + ?Sized> Seener for Arc<S> {
    fn seen(&self, url: &Url) -> bool {
        (**self).seen(url)
    }
}

impl<S: Seener + ?Sized> Seener for &S {
    fn seen(&self, url: &Url) -> bool {
        (**self).seen(url)
    }
}

// Everything behind the lock
#[derive(Debug, Default)]
struct FrontierState {
    pending: Vec<Url>,
    // Canonical string form of every URL ever enqueued
    seen: HashSet<String>,
}

impl FrontierState {
    fn push(&mut self, url: Url) {
        self.seen.insert(url.as_str().to_owned());
        self.pending.push(url);
    }
}

/// In-memory LIFO frontier with a monotonic seen set.
///
/// Every URL in the pending stack is also in the seen set, and nothing is
/// ever removed from the seen set.
#[derive(Debug, Default)]
pub struct Frontier {
    state: RwLock<FrontierState>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes `url` and records it as seen, in one critical section.
    ///
    /// No filtering happens here: enqueueing an already-seen URL pushes it
    /// again. Callers run candidates through the eligibility pipeline first.
    pub fn enqueue(&self, url: Url) {
        self.state.write().push(url);
    }

    /// Like `enqueue`, but only if the URL has never been seen.
    ///
    /// The check and the push share one write lock, so two workers that
    /// discover the same link at the same moment cannot both admit it.
    /// Returns `true` if the URL was admitted.
    pub fn enqueue_unseen(&self, url: Url) -> bool {
        let mut state = self.state.write();
        if state.seen.contains(url.as_str()) {
            return false;
        }
        state.push(url);
        true
    }

    /// Pops the most recently enqueued URL, or `None` if nothing is pending.
    ///
    /// Never waits for new work to arrive.
    pub fn dequeue(&self) -> Option<Url> {
        self.state.write().pending.pop()
    }

    pub fn pending_len(&self) -> usize {
        self.state.read().pending.len()
    }

    pub fn seen_len(&self) -> usize {
        self.state.read().seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().pending.is_empty()
    }
}

impl Seener for Frontier {
    fn seen(&self, url: &Url) -> bool {
        self.state.read().seen.contains(url.as_str())
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a Vec and not a VecDeque?
//    - We only ever push and pop at the same end, which makes it a stack
//    - A stack gives depth-first crawling: follow one path down, then
//      backtrack
//    - Swapping in a VecDeque with pop_front() would make it breadth-first
//
// 2. Why store Strings in the seen set instead of Urls?
//    - Two URLs are "the same page" when their text is identical
//    - url.as_str() is that text, exactly as it was resolved
//    - Nothing is normalized: "/a" and "/a/" are different pages here
//
// 3. Why parking_lot::RwLock instead of std::sync::RwLock?
//    - Its guards are returned directly (no Result, no lock poisoning)
//    - It is a drop-in reader/writer lock otherwise
//
// 4. Why do enqueue() and dequeue() take &self and not &mut self?
//    - The lock gives us "interior mutability"
//    - That lets many workers share one Frontier through an Arc
// -----------------------------------------------------------------------------
