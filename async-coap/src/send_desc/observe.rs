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

use super::*;
use std::time::Instant;

/// Highest value representable by the 24-bit OBSERVE sequence counter.
const OBSERVE_SEQNUM_MAX: u32 = 1 << 24;

/// Half of [`OBSERVE_SEQNUM_MAX`], used for the wraparound comparison in RFC 7641 §3.4.
const OBSERVE_SEQNUM_HALF: u32 = 1 << 23;

/// Window, per RFC 7641 §3.4, beyond which a lower sequence number is still accepted as fresh
/// on the theory that the counter has wrapped rather than gone backwards.
const OBSERVE_FRESHNESS_WINDOW: Duration = Duration::from_secs(128);

/// Returns true if a notification carrying sequence number `v2` is fresher than one carrying
/// `v1`, observed `elapsed` ago, per the comparison in RFC 7641 §3.4.
fn is_fresher(v1: u32, v2: u32, elapsed: Duration) -> bool {
    (v1 < v2 && (v2 - v1) < OBSERVE_SEQNUM_HALF)
        || (v1 > v2 && (v1 - v2) > OBSERVE_SEQNUM_HALF)
        || elapsed > OBSERVE_FRESHNESS_WINDOW
}

/// Send descriptor created by [`CoapRequest::observe`] used for sending CoAP GET requests that
/// observe changing resources.
///
/// This send descriptor can yield multiple results, so it should be used with
/// [`LocalEndpointExt::send_as_stream`], [`RemoteEndpointExt::send_as_stream`],
/// and/or [`RemoteEndpointExt::send_to_as_stream`].
///
/// Stale or reordered notifications are dropped per the sequence-number comparison in
/// [RFC 7641](https://tools.ietf.org/html/rfc7641) §3.4: out-of-order deliveries are silently
/// ignored rather than surfaced to the caller.
#[derive(Debug)]
pub struct SendObserve<IC> {
    last_seq: Option<(u32, Instant)>,
    max_age: Option<Duration>,
    last_was_significant: bool,
    phantom: PhantomData<IC>,
}

impl<IC> SendDescUnicast for SendObserve<IC> {}

impl<IC> Default for SendObserve<IC> {
    fn default() -> Self {
        Self::new()
    }
}

impl<IC> SendObserve<IC> {
    pub(crate) fn new() -> Self {
        Self {
            last_seq: None,
            max_age: None,
            last_was_significant: true,
            phantom: PhantomData,
        }
    }

    /// Returns a nonconfirmable version of this send descriptor.
    #[inline(always)]
    pub fn nonconfirmable(self) -> Nonconfirmable<SendObserve<IC>> {
        Default::default()
    }

    /// Returns a multicast version of this send descriptor.
    #[inline(always)]
    pub fn multicast(self) -> Multicast<SendObserve<IC>> {
        Default::default()
    }
}

impl<IC: InboundContext> SendDesc<IC, ()> for SendObserve<IC> {
    fn delay_to_restart(&self) -> Option<Duration> {
        // Reregister a bit before the most recent notification's Max-Age expires, falling
        // back to the default notification lifetime if none was ever provided.
        let max_age = self
            .max_age
            .unwrap_or(crate::ClientConfig::default().notification_max_age);

        Some(max_age)
    }

    fn write_options(
        &self,
        msg: &mut dyn OptionInsert,
        socket_addr: &IC::SocketAddr,
        start: Bound<OptionNumber>,
        end: Bound<OptionNumber>,
    ) -> Result<(), Error> {
        write_options!((msg, socket_addr, start, end) {
            OBSERVE => Some(OBSERVE_REGISTER),
        })
    }

    fn write_payload(
        &self,
        msg: &mut dyn MessageWrite,
        _socket_addr: &IC::SocketAddr,
    ) -> Result<(), Error> {
        msg.set_msg_code(MsgCode::MethodGet);
        Ok(())
    }

    fn handler(&mut self, context: Result<&IC, Error>) -> Result<ResponseStatus<()>, Error> {
        self.last_was_significant = true;

        let context = context?;

        let mut options = context.message().options();
        let seq = options.find_next_of(option::OBSERVE).transpose()?;

        self.max_age = options
            .find_next_of(option::MAX_AGE)
            .transpose()?
            .map(|secs| Duration::from_secs(secs as u64));

        let seq = match seq {
            Some(seq) => seq,
            // A response with no Observe option is either an error response or the server
            // declining to establish the relationship; either way, stop observing.
            None => return Ok(ResponseStatus::Done(())),
        };

        let now = Instant::now();

        if let Some((last_seq, last_seen)) = self.last_seq {
            if !is_fresher(last_seq, seq, now.duration_since(last_seen)) {
                debug!("Observe: dropping stale notification (seq={})", seq);
                // Stale or reordered notification; ignore it and keep waiting. Mark it
                // insignificant so wrapping combinators such as `inspect()` don't surface it.
                self.last_was_significant = false;
                return Ok(ResponseStatus::Continue);
            }
        }

        self.last_seq = Some((seq, now));

        Ok(ResponseStatus::Continue)
    }

    fn last_delivery_was_significant(&self) -> bool {
        self.last_was_significant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_sequence_is_fresh() {
        assert!(is_fresher(10, 11, Duration::from_secs(1)));
    }

    #[test]
    fn stale_sequence_is_rejected() {
        assert!(!is_fresher(11, 10, Duration::from_secs(1)));
    }

    #[test]
    fn wraparound_is_treated_as_fresh() {
        // Counter wrapped from near the top back to a small value.
        let v1 = OBSERVE_SEQNUM_MAX - 2;
        let v2 = 3;
        assert!(is_fresher(v1, v2, Duration::from_secs(1)));
    }

    #[test]
    fn long_elapsed_time_overrides_stale_sequence() {
        assert!(is_fresher(20, 19, Duration::from_secs(200)));
    }

    use crate::option::OptionInsertExt;

    struct FakeContext(crate::message::OwnedImmutableMessage);

    impl InboundContext for FakeContext {
        type SocketAddr = std::net::SocketAddr;

        fn remote_socket_addr(&self) -> Self::SocketAddr {
            "127.0.0.1:5683".parse().unwrap()
        }

        fn is_dupe(&self) -> bool {
            false
        }

        fn message(&self) -> &dyn MessageRead {
            &self.0
        }
    }

    fn notification_with_seq(seq: u32) -> FakeContext {
        let mut encoder = crate::message::VecMessageEncoder::new();
        encoder.set_msg_code(crate::message::MsgCode::SuccessContent);
        encoder
            .insert_option(option::OBSERVE, seq)
            .expect("insert_option failed");
        FakeContext(encoder.into())
    }

    // Notifications carrying Observe counters 5, 6, 4 arrive in that order; only 5 and 6
    // should be delivered through `inspect()`, 4 dropped as stale/reordered.
    #[test]
    fn inspect_suppresses_stale_notification() {
        use crate::send_desc::SendDescExt;

        let delivered = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let delivered_clone = delivered.clone();

        let mut send_desc = SendObserve::<FakeContext>::new().inspect(move |context| {
            let seq = context
                .message()
                .options()
                .find_next_of(option::OBSERVE)
                .transpose()
                .unwrap()
                .unwrap();
            delivered_clone.lock().expect("lock").push(seq);
        });

        for seq in [5u32, 6, 4] {
            let context = notification_with_seq(seq);
            send_desc
                .handler(Ok(&context))
                .expect("handler should not error");
        }

        assert_eq!(*delivered.lock().expect("lock"), vec![5, 6]);
    }
}
