// Copyright 2019 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

use crate::message::MsgId;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Cached outcome of having already processed an inbound confirmable message once.
#[derive(Debug, Clone)]
pub enum CachedReply {
    /// The first delivery of this message was acknowledged; resend the same ACK bytes
    /// rather than re-running the request handler.
    Ack(Vec<u8>),

    /// The first delivery of this message was rejected; resend the same RST bytes.
    Reset(Vec<u8>),

    /// The first delivery produced no reply (e.g. a NON message, or an ACK-less CON
    /// whose response is still pending); just drop the duplicate silently.
    None,
}

#[derive(Debug)]
struct Entry {
    reply: CachedReply,
    seen_at: Instant,
}

/// Mark-and-sweep duplicate suppression table, keyed by `(peer, message-id)`.
///
/// Per RFC 7252 §4.5, a message-id is only guaranteed unique for `EXCHANGE_LIFETIME`
/// (the sweep window passed to [`Deduplicator::sweep`]); after that the id may be
/// reused by the peer for an unrelated exchange, so the cache entry is evicted rather
/// than retained indefinitely.
#[derive(Debug)]
pub struct Deduplicator<Peer> {
    table: HashMap<(Peer, MsgId), Entry>,
}

impl<Peer> Default for Deduplicator<Peer>
where
    Peer: Eq + Hash,
{
    fn default() -> Self {
        Deduplicator {
            table: HashMap::new(),
        }
    }
}

impl<Peer> Deduplicator<Peer>
where
    Peer: Eq + Hash + Clone,
{
    /// Creates a new, empty deduplicator.
    pub fn new() -> Self {
        Default::default()
    }

    /// Checks whether `(peer, msg_id)` has already been seen.
    ///
    /// Returns the cached reply produced the first time this message was handled, if
    /// any is on record.
    pub fn check(&self, peer: &Peer, msg_id: MsgId) -> Option<CachedReply> {
        self.table
            .get(&(peer.clone(), msg_id))
            .map(|entry| entry.reply.clone())
    }

    /// Records that `(peer, msg_id)` has now been handled, along with the reply (if
    /// any) that was sent for it, so that a retransmission of the same message can be
    /// answered identically without re-invoking application logic.
    pub fn mark(&mut self, peer: Peer, msg_id: MsgId, reply: CachedReply) {
        self.table.insert(
            (peer, msg_id),
            Entry {
                reply,
                seen_at: Instant::now(),
            },
        );
    }

    /// Evicts all entries older than `lifetime`.
    ///
    /// Should be called periodically (see [`crate::ClientConfig::mark_and_sweep_interval`])
    /// with `lifetime` set to the transmission parameters' `EXCHANGE_LIFETIME`.
    pub fn sweep(&mut self, lifetime: Duration) {
        let now = Instant::now();
        self.table
            .retain(|_, entry| now.duration_since(entry.seen_at) < lifetime);
    }

    /// Returns the number of entries currently cached. Exposed for tests and diagnostics.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns true if the deduplicator currently holds no entries.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_delivery_is_not_a_dupe() {
        let dedup: Deduplicator<u32> = Deduplicator::new();
        assert!(dedup.check(&1, 100).is_none());
    }

    #[test]
    fn marked_message_is_reported_as_dupe() {
        let mut dedup: Deduplicator<u32> = Deduplicator::new();
        dedup.mark(1, 100, CachedReply::None);
        assert!(matches!(dedup.check(&1, 100), Some(CachedReply::None)));
        // A different peer with the same message id is a distinct exchange.
        assert!(dedup.check(&2, 100).is_none());
        // A different message id from the same peer is also distinct.
        assert!(dedup.check(&1, 101).is_none());
    }

    #[test]
    fn cached_ack_bytes_round_trip() {
        let mut dedup: Deduplicator<u32> = Deduplicator::new();
        dedup.mark(7, 42, CachedReply::Ack(vec![1, 2, 3]));
        match dedup.check(&7, 42) {
            Some(CachedReply::Ack(bytes)) => assert_eq!(bytes, vec![1, 2, 3]),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn sweep_evicts_expired_entries() {
        let mut dedup: Deduplicator<u32> = Deduplicator::new();
        dedup.mark(1, 1, CachedReply::None);
        assert_eq!(dedup.len(), 1);
        dedup.sweep(Duration::from_secs(0));
        assert!(dedup.is_empty());
    }

    #[test]
    fn sweep_retains_fresh_entries() {
        let mut dedup: Deduplicator<u32> = Deduplicator::new();
        dedup.mark(1, 1, CachedReply::None);
        dedup.sweep(Duration::from_secs(600));
        assert_eq!(dedup.len(), 1);
    }
}
