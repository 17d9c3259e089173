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
use std::marker::PhantomData;
use std::time::{Duration, Instant};

impl<SD: SendDescUnicast, IC> SendDescUnicast for UnicastBlock1<SD, IC> {}

/// Default amount of time a Block1 transfer may go without progress before it's abandoned,
/// matching [`ClientConfig::blockwise_status_lifetime`](crate::ClientConfig)'s own default.
const DEFAULT_STATUS_LIFETIME: Duration = Duration::from_secs(600);

/// Unicast Block1 Tracking combinator, created by [`SendDescUnicast::block1`].
///
/// Splits `payload` into blocks no larger than the size implied by `block_size` (defaulting to
/// 1024 bytes; pass [`ClientConfig::default_block_info`](crate::ClientConfig::default_block_info)
/// to honor a configured default), sending one block per request and waiting for a
/// `2.31 Continue` before sending the next. If the server's response asks for a smaller block
/// size, the next block sent is resized and realigned to the new boundary.
///
/// If no progress is made for `status_lifetime` (defaulting to 600 seconds, matching
/// [`ClientConfig::blockwise_status_lifetime`](crate::ClientConfig); pass that value to honor
/// a configured override), the transfer is abandoned with [`Error::ResponseTimeout`].
#[derive(Debug)]
pub struct UnicastBlock1<SD, IC> {
    pub(super) inner: SD,
    pub(super) payload: Vec<u8>,
    pub(super) current_block: BlockInfo,
    pub(super) status_lifetime: Duration,
    pub(super) deadline: Instant,
    pub(super) phantom: PhantomData<IC>,
}

impl<SD, IC> UnicastBlock1<SD, IC> {
    pub(super) fn new(
        inner: SD,
        payload: Vec<u8>,
        block_size: Option<BlockInfo>,
        status_lifetime: Option<Duration>,
    ) -> UnicastBlock1<SD, IC> {
        let szx = block_size
            .map(|b| b.szx())
            .unwrap_or_else(|| BlockInfo::default().szx());
        let block_len = BlockInfo::new(0, false, szx).unwrap().len();
        let more = payload.len() > block_len;
        let current_block = BlockInfo::new(0, more, szx).unwrap();
        let status_lifetime = status_lifetime.unwrap_or(DEFAULT_STATUS_LIFETIME);

        UnicastBlock1 {
            inner,
            payload,
            current_block,
            status_lifetime,
            deadline: Instant::now() + status_lifetime,
            phantom: PhantomData,
        }
    }

    fn current_chunk(&self) -> &[u8] {
        let start = self.current_block.offset().min(self.payload.len());
        let end = (start + self.current_block.len()).min(self.payload.len());
        &self.payload[start..end]
    }
}

impl<SD, IC, R> SendDesc<IC, R> for UnicastBlock1<SD, IC>
where
    SD: SendDesc<IC, R> + Send + SendDescUnicast,
    IC: InboundContext,
    R: Send,
{
    send_desc_passthru_timing!(inner);

    fn supports_option(&self, option: OptionNumber) -> bool {
        self.inner.supports_option(option) || option == OptionNumber::BLOCK1
    }

    fn write_options(
        &self,
        msg: &mut dyn OptionInsert,
        socket_addr: &IC::SocketAddr,
        start: Bound<OptionNumber>,
        end: Bound<OptionNumber>,
    ) -> Result<(), Error> {
        let block1 = Some(self.current_block);

        write_options!((msg, socket_addr, start, end, self.inner) {
            BLOCK1 => block1.into_iter(),
        })
    }

    fn write_payload(
        &self,
        msg: &mut dyn MessageWrite,
        _socket_addr: &IC::SocketAddr,
    ) -> Result<(), Error> {
        msg.append_payload_bytes(self.current_chunk())
    }

    fn handler(&mut self, context: Result<&IC, Error>) -> Result<ResponseStatus<R>, Error> {
        if let Some(context) = context.ok() {
            if context.is_dupe() {
                // Ignore dupes.
                return Ok(ResponseStatus::Continue);
            }

            if self.current_block.more_flag() {
                if Instant::now() > self.deadline {
                    return self.inner.handler(Err(Error::ResponseTimeout));
                }

                let msg = context.message();

                if msg.msg_code() != MsgCode::SuccessContinue {
                    // Not a `2.31 Continue`: let the inner handler decide what to do with it
                    // (typically surfacing it as an error to the caller).
                    return self.inner.handler(Ok(context));
                }

                let mut next = self
                    .current_block
                    .next()
                    .ok_or(Error::InvalidArgument)?;

                if let Some(echoed) = msg.block1() {
                    if echoed.szx() < self.current_block.szx() {
                        // Server asked for a smaller block size. Resume at the same byte
                        // offset, realigned to the new, smaller block boundary.
                        let new_szx = echoed.szx();
                        let new_block_len = BlockInfo::new(0, false, new_szx).unwrap().len();
                        let offset = self.current_block.offset() + self.current_chunk().len();
                        let new_num = (offset / new_block_len) as u32;
                        next = BlockInfo::new(new_num, true, new_szx).ok_or(Error::BadResponse)?;
                    }
                }

                let remaining = self.payload.len().saturating_sub(next.offset());
                let more = remaining > next.len();
                self.current_block =
                    BlockInfo::new(next.num(), more, next.szx()).ok_or(Error::BadResponse)?;
                self.deadline = Instant::now() + self.status_lifetime;

                return Ok(ResponseStatus::SendNext);
            }
        }

        self.inner.handler(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{OwnedImmutableMessage, VecMessageEncoder};
    use crate::option::OptionInsertExt;
    use std::net::SocketAddr;

    #[derive(Debug)]
    struct StubInner;

    impl SendDescUnicast for StubInner {}

    impl SendDesc<TestContext, ()> for StubInner {
        fn write_options(
            &self,
            _msg: &mut dyn OptionInsert,
            _socket_addr: &SocketAddr,
            _start: Bound<OptionNumber>,
            _end: Bound<OptionNumber>,
        ) -> Result<(), Error> {
            Ok(())
        }

        fn write_payload(
            &self,
            _msg: &mut dyn MessageWrite,
            _socket_addr: &SocketAddr,
        ) -> Result<(), Error> {
            Ok(())
        }

        fn handler(&mut self, context: Result<&TestContext, Error>) -> Result<ResponseStatus<()>, Error> {
            context.map(|_| ResponseStatus::Done(()))
        }
    }

    struct TestContext(OwnedImmutableMessage);

    impl InboundContext for TestContext {
        type SocketAddr = SocketAddr;

        fn remote_socket_addr(&self) -> SocketAddr {
            "127.0.0.1:5683".parse().unwrap()
        }

        fn is_dupe(&self) -> bool {
            false
        }

        fn message(&self) -> &dyn MessageRead {
            &self.0
        }
    }

    fn continue_response(block1: Option<BlockInfo>) -> TestContext {
        let mut encoder = VecMessageEncoder::new();
        encoder.set_msg_code(MsgCode::SuccessContinue);
        if let Some(block1) = block1 {
            encoder
                .insert_option(crate::option::BLOCK1, block1)
                .expect("insert_option failed");
        }
        TestContext(encoder.into())
    }

    #[test]
    fn splits_payload_into_negotiated_blocks() {
        let payload = vec![0xAAu8; 40];
        let mut block1: UnicastBlock1<StubInner, TestContext> =
            UnicastBlock1::new(StubInner, payload.clone(), BlockInfo::new(0, false, 0), None);

        assert_eq!(16, block1.current_block.len());
        assert_eq!(0, block1.current_block.num());
        assert!(block1.current_block.more_flag());
        assert_eq!(&payload[0..16], block1.current_chunk());

        let context = continue_response(None);
        assert_eq!(
            Ok(ResponseStatus::SendNext),
            block1.handler(Ok(&context))
        );
        assert_eq!(1, block1.current_block.num());
        assert!(block1.current_block.more_flag());
        assert_eq!(&payload[16..32], block1.current_chunk());

        let context = continue_response(None);
        assert_eq!(
            Ok(ResponseStatus::SendNext),
            block1.handler(Ok(&context))
        );
        assert_eq!(2, block1.current_block.num());
        assert!(!block1.current_block.more_flag());
        assert_eq!(&payload[32..40], block1.current_chunk());

        let context = continue_response(None);
        assert_eq!(Ok(ResponseStatus::Done(())), block1.handler(Ok(&context)));
    }

    #[test]
    fn realigns_after_server_requests_smaller_size() {
        let payload = vec![0xBBu8; 80];
        let mut block1: UnicastBlock1<StubInner, TestContext> =
            UnicastBlock1::new(StubInner, payload.clone(), BlockInfo::new(0, false, 2), None);

        assert_eq!(64, block1.current_block.len());

        let smaller = BlockInfo::new(1, true, 0).unwrap();
        let context = continue_response(Some(smaller));
        assert_eq!(
            Ok(ResponseStatus::SendNext),
            block1.handler(Ok(&context))
        );

        assert_eq!(0, block1.current_block.szx());
        assert_eq!(16, block1.current_block.len());
        assert_eq!(64, block1.current_block.offset());
        assert_eq!(&payload[64..80], block1.current_chunk());
    }

    #[test]
    fn abandons_transfer_after_status_lifetime_elapses() {
        let payload = vec![0xCCu8; 40];
        let mut block1: UnicastBlock1<StubInner, TestContext> = UnicastBlock1::new(
            StubInner,
            payload,
            BlockInfo::new(0, false, 0),
            Some(Duration::from_millis(0)),
        );

        std::thread::sleep(Duration::from_millis(1));

        let context = continue_response(None);
        assert_eq!(
            Err(Error::ResponseTimeout),
            block1.handler(Ok(&context))
        );
    }
}
