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

use super::codec::*;
use super::*;

/// A class for writing a single [RFC 8323](https://tools.ietf.org/html/rfc8323) TCP/WS framed
/// message to a heap-allocated [`Vec`].
///
/// There is no message type or message id to set: [`set_msg_type`][MessageWrite::set_msg_type]
/// and [`set_msg_id`][MessageWrite::set_msg_id] are no-ops, since that information doesn't
/// exist in this framing. Reliability and ordering come from the underlying stream transport.
#[derive(Debug)]
pub struct StreamMessageEncoder {
    code: MsgCode,
    token: MsgToken,
    // Options followed by, if a payload has been appended, a `0xFF` marker and the payload.
    body: Vec<u8>,
    last_option: OptionNumber,
    payload_start: usize,
}

impl StreamMessageEncoder {
    /// Creates a new, empty `StreamMessageEncoder`.
    pub fn new() -> StreamMessageEncoder {
        StreamMessageEncoder {
            code: MsgCode::Empty,
            token: MsgToken::EMPTY,
            body: Vec::new(),
            last_option: Default::default(),
            payload_start: 0,
        }
    }

    /// Encodes this message to a standalone frame, header included.
    pub fn as_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.body.len() + self.token.len() + 6);
        encode_stream_header(&mut out, self.code, self.token.as_bytes(), self.body.len())
            .expect("token too long");
        out.extend_from_slice(&self.body);
        out
    }
}

impl Default for StreamMessageEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StreamMessageEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        CoapByteDisplayFormatter(&self.as_bytes()).fmt(f)
    }
}

impl MessageWrite for StreamMessageEncoder {
    fn set_msg_type(&mut self, _tt: MsgType) {
        // RFC 8323 framing carries no message type.
    }

    fn set_msg_id(&mut self, _msg_id: u16) {
        // RFC 8323 framing carries no message id.
    }

    fn set_msg_code(&mut self, code: MsgCode) {
        self.code = code;
    }

    fn set_msg_token(&mut self, token: MsgToken) {
        self.token = token;
    }

    fn append_payload_bytes(&mut self, payload: &[u8]) -> Result<(), Error> {
        if self.body.len() == self.payload_start {
            self.body.push(0xFF);
        }
        self.body.extend_from_slice(payload);
        Ok(())
    }

    fn clear(&mut self) {
        self.code = MsgCode::Empty;
        self.token = MsgToken::EMPTY;
        self.body.clear();
        self.last_option = Default::default();
        self.payload_start = 0;
    }
}

impl OptionInsert for StreamMessageEncoder {
    fn insert_option_with_bytes(&mut self, key: OptionNumber, value: &[u8]) -> Result<(), Error> {
        if self.last_option == key && !key.is_repeatable() {
            return Err(Error::OptionNotRepeatable);
        }

        let len = self.body.len();
        let workspace = value.len() + 5;
        self.body.resize(len + workspace, 0);

        let (new_len, last_option) = insert_option(&mut self.body, len, self.last_option, key, value)?;

        self.body.truncate(new_len);
        self.last_option = last_option;
        self.payload_start = new_len;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::*;

    #[test]
    fn round_trips_simple_get() {
        let mut builder = StreamMessageEncoder::new();
        builder.set_msg_code(MsgCode::MethodGet);
        builder.set_msg_token(MsgToken::from(0x2021));
        assert_eq!(Ok(()), builder.insert_option(URI_PATH, "temp"));

        let frame = builder.as_bytes();

        let (parser, consumed) = StreamMessageParser::new(&frame).unwrap().unwrap();
        assert_eq!(frame.len(), consumed);
        assert_eq!(MsgCode::MethodGet, parser.msg_code());
        assert_eq!(MsgToken::from(0x2021), parser.msg_token());
        assert!(parser.payload().is_empty());

        let mut iter = parser.options();
        assert_eq!(Some(Ok((OptionNumber::URI_PATH, &b"temp"[..]))), iter.next());
        assert_eq!(None, iter.next());
    }

    #[test]
    fn round_trips_payload_without_options() {
        let mut builder = StreamMessageEncoder::new();
        builder.set_msg_code(MsgCode::SuccessContent);
        assert_eq!(Ok(()), builder.append_payload_string("22.3 C"));

        let frame = builder.as_bytes();
        let (parser, _) = StreamMessageParser::new(&frame).unwrap().unwrap();
        assert_eq!(MsgCode::SuccessContent, parser.msg_code());
        assert_eq!(b"22.3 C", parser.payload());
        assert_eq!(MsgToken::EMPTY, parser.msg_token());
    }

    #[test]
    fn round_trips_extended_token() {
        let long_token = MsgToken::new(&[0xab; 20]);

        let mut builder = StreamMessageEncoder::new();
        builder.set_msg_code(MsgCode::MethodPost);
        builder.set_msg_token(long_token);
        assert_eq!(Ok(()), builder.insert_option(URI_PATH, "big"));
        assert_eq!(Ok(()), builder.append_payload_string("payload"));

        let frame = builder.as_bytes();
        let (parser, consumed) = StreamMessageParser::new(&frame).unwrap().unwrap();
        assert_eq!(frame.len(), consumed);
        assert_eq!(long_token, parser.msg_token());
        assert_eq!(b"payload", parser.payload());
    }

    #[test]
    fn set_msg_type_and_id_are_ignored() {
        let mut builder = StreamMessageEncoder::new();
        builder.set_msg_type(MsgType::Con);
        builder.set_msg_id(0x1234);
        builder.set_msg_code(MsgCode::MethodGet);

        let frame = builder.as_bytes();
        let (parser, _) = StreamMessageParser::new(&frame).unwrap().unwrap();
        assert_eq!(MsgType::Con, parser.msg_type());
        assert_eq!(0, parser.msg_id());
    }
}
