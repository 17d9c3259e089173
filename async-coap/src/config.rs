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

use crate::BlockInfo;
use std::time::Duration;

/// Runtime-configurable client behavior, layered on top of the compile-time
/// [`TransParams`](crate::TransParams) constants.
///
/// `TransParams` remains the zero-cost path for the RFC 7252 §4.8 transmission
/// parameters. `ClientConfig` covers everything those constants don't: block-wise
/// status lifetime, ID/token randomization policy, and the observe/dedup timers.
/// A `DatagramLocalEndpoint` is constructed with a `ClientConfig`, which is then
/// consulted by the deduplicator, the observe manager, and the block-wise engine.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClientConfig {
    /// Default port used for `coap://` URIs with no explicit port.
    pub default_port: u16,

    /// Default port used for `coaps://` URIs with no explicit port.
    pub default_secure_port: u16,

    /// Default maximum block size (in bytes) to negotiate for block-wise transfers
    /// when the caller hasn't specified one explicitly.
    pub default_block_size: u32,

    /// How long cached block-wise transfer state is retained before being discarded.
    pub blockwise_status_lifetime: Duration,

    /// If true, the local endpoint starts its message-id counter at a random value
    /// instead of zero, to reduce collisions across process restarts.
    pub use_random_id_start: bool,

    /// If true, the local endpoint starts its token counter at a random value
    /// instead of zero.
    pub use_random_token_start: bool,

    /// The maximum amount of time a cached notification is considered fresh absent
    /// other information, per RFC 7641.
    pub notification_max_age: Duration,

    /// Time-based interval at which an observe relationship is proactively
    /// refreshed with a confirmable GET, regardless of notification traffic.
    pub notification_check_interval_time: Duration,

    /// Number of notifications allowed to elapse before an observe relationship is
    /// proactively refreshed with a confirmable GET.
    pub notification_check_interval_count: u32,

    /// Backoff applied before attempting to reregister an observe relationship
    /// after a registration appears to have lapsed.
    pub notification_reregistration_backoff: Duration,

    /// Interval between sweeps of the deduplicator's mark-and-sweep cache.
    pub mark_and_sweep_interval: Duration,

    /// Size, in bytes, of the receive buffer used when reading inbound packets.
    pub channel_receive_packet_size: usize,
}

impl ClientConfig {
    /// [`default_block_size`](Self::default_block_size), expressed as a [`BlockInfo`] with
    /// `num` 0 and the more flag unset, ready to pass to
    /// [`SendDescUnicast::block1`](crate::send_desc::SendDescUnicast::block1) or
    /// [`SendDescUnicast::block2`](crate::send_desc::SendDescUnicast::block2) as the starting
    /// point for a block-wise transfer.
    pub fn default_block_info(&self) -> BlockInfo {
        BlockInfo::from_byte_size(self.default_block_size)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            default_port: crate::consts::DEFAULT_PORT_COAP_UDP,
            default_secure_port: crate::consts::DEFAULT_PORT_COAP_DTLS,
            default_block_size: 1024,
            blockwise_status_lifetime: Duration::from_millis(600_000),
            use_random_id_start: true,
            use_random_token_start: true,
            notification_max_age: Duration::from_millis(128_000),
            notification_check_interval_time: Duration::from_millis(86_400_000),
            notification_check_interval_count: 100,
            notification_reregistration_backoff: Duration::from_millis(2_000),
            mark_and_sweep_interval: Duration::from_millis(10_000),
            channel_receive_packet_size: 2048,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_table() {
        let config = ClientConfig::default();
        assert_eq!(config.default_port, 5683);
        assert_eq!(config.default_secure_port, 5684);
        assert_eq!(config.default_block_size, 1024);
        assert_eq!(config.blockwise_status_lifetime, Duration::from_secs(600));
        assert!(config.use_random_id_start);
        assert!(config.use_random_token_start);
        assert_eq!(config.notification_max_age, Duration::from_millis(128_000));
        assert_eq!(config.notification_check_interval_count, 100);
        assert_eq!(config.mark_and_sweep_interval, Duration::from_secs(10));
    }

    #[test]
    fn default_block_info_matches_default_block_size() {
        let config = ClientConfig::default();
        let block_info = config.default_block_info();
        assert_eq!(1024, block_info.len());
        assert_eq!(0, block_info.num());
        assert!(!block_info.more_flag());
    }
}
