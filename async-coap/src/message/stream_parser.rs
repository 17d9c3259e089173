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

/// A class for parsing a single [RFC 8323](https://tools.ietf.org/html/rfc8323) TCP/WS framed
/// message from the start of a buffer.
///
/// Unlike [`StandardMessageParser`], this type has no notion of message type or message id:
/// ordering and reliable delivery are provided by the underlying stream rather than by CoAP
/// itself. [`msg_type`][MessageRead::msg_type] always reports [`MsgType::Con`] and
/// [`msg_id`][MessageRead::msg_id] always reports `0`.
#[derive(Debug)]
pub struct StreamMessageParser<'buf> {
    buffer: &'buf [u8],
    msg_code: MsgCode,
    token: MsgToken,
    content_format: Option<ContentFormat>,
    accept: Option<ContentFormat>,
    block2: Option<BlockInfo>,
    block1: Option<BlockInfo>,
    option_start: usize,
    payload_start: usize,
}

impl<'buf> std::fmt::Display for StreamMessageParser<'buf> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        MessageDisplay(self).fmt(f)
    }
}

impl<'buf> StreamMessageParser<'buf> {
    /// Attempts to parse a single framed message from the start of `buffer`.
    ///
    /// Returns `Ok(None)` if `buffer` doesn't yet contain a complete frame, in which case the
    /// caller should read more bytes from the stream and try again. On success, also returns
    /// the number of bytes consumed from the front of `buffer`, so that the caller can advance
    /// past this frame before parsing the next one.
    pub fn new(buffer: &'buf [u8]) -> Result<Option<(StreamMessageParser<'buf>, usize)>, Error> {
        let header = match decode_stream_header(buffer)? {
            Some(header) => header,
            None => return Ok(None),
        };

        let frame_len = header.frame_len();
        if buffer.len() < frame_len {
            return Ok(None);
        }

        let buffer = &buffer[..frame_len];
        let token = MsgToken::new(&buffer[header.header_len..header.header_len + header.token_len]);
        let option_start = header.header_len + header.token_len;

        let mut content_format = None;
        let mut accept = None;
        let mut block2 = None;
        let mut block1 = None;

        let body = &buffer[option_start..];
        let mut iter = OptionIterator::new(body);

        for result in &mut iter {
            match result {
                Ok((OptionNumber::CONTENT_FORMAT, value)) => {
                    content_format = Some(ContentFormat(
                        try_decode_u16(value).ok_or(Error::ParseFailure)?,
                    ));
                }
                Ok((OptionNumber::ACCEPT, value)) => match try_decode_u16(value) {
                    Some(x) => accept = Some(ContentFormat(x)),
                    None => return Err(Error::ParseFailure),
                },
                Ok((OptionNumber::BLOCK2, value)) => match try_decode_u32(value) {
                    Some(x) => block2 = Some(BlockInfo(x).valid().ok_or(Error::ParseFailure)?),
                    None => return Err(Error::ParseFailure),
                },
                Ok((OptionNumber::BLOCK1, value)) => match try_decode_u32(value) {
                    Some(x) => block1 = Some(BlockInfo(x).valid().ok_or(Error::ParseFailure)?),
                    None => return Err(Error::ParseFailure),
                },
                Ok((_key, _value)) => {
                    // Skip.
                }
                Err(e) => {
                    return Err(e);
                }
            }
        }

        let payload_start = option_start + (iter.as_slice().as_ptr() as usize - body.as_ptr() as usize);

        let parser = StreamMessageParser {
            buffer,
            msg_code: header.code,
            token,
            content_format,
            accept,
            block2,
            block1,
            option_start,
            payload_start,
        };

        Ok(Some((parser, frame_len)))
    }

    /// Returns a byte slice containing the encoded frame, header included.
    pub fn as_bytes(&self) -> &'buf [u8] {
        self.buffer
    }
}

impl<'buf> MessageRead for StreamMessageParser<'buf> {
    fn msg_code(&self) -> MsgCode {
        self.msg_code
    }

    fn msg_type(&self) -> MsgType {
        MsgType::Con
    }

    fn msg_id(&self) -> u16 {
        0
    }

    fn msg_token(&self) -> MsgToken {
        self.token
    }

    fn payload(&self) -> &[u8] {
        &self.buffer[self.payload_start..]
    }

    fn content_format(&self) -> Option<ContentFormat> {
        self.content_format
    }

    fn accept(&self) -> Option<ContentFormat> {
        self.accept
    }

    fn block2(&self) -> Option<BlockInfo> {
        self.block2
    }

    fn block1(&self) -> Option<BlockInfo> {
        self.block1
    }

    fn options(&self) -> OptionIterator<'_> {
        OptionIterator::new(&self.buffer[self.option_start..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_frame_requests_more_bytes() {
        let mut buffer = Vec::new();
        encode_stream_header(&mut buffer, MsgCode::MethodGet, &[0x20], 4).unwrap();
        buffer.extend_from_slice(b"body");

        assert_eq!(Ok(None), StreamMessageParser::new(&buffer[..buffer.len() - 1]));
    }

    #[test]
    fn parses_simple_get() {
        let mut buffer = Vec::new();
        encode_stream_header(&mut buffer, MsgCode::MethodGet, &[0x20, 0x21], 0).unwrap();

        let (parser, consumed) = StreamMessageParser::new(&buffer).unwrap().unwrap();
        assert_eq!(buffer.len(), consumed);
        assert_eq!(MsgCode::MethodGet, parser.msg_code());
        assert_eq!(MsgToken::from(0x2021), parser.msg_token());
        assert!(parser.payload().is_empty());
    }

    #[test]
    fn parses_options_and_payload() {
        let mut options_and_payload = Vec::new();
        // Uri-Path: "large"
        options_and_payload.extend_from_slice(&[0xb5, b'l', b'a', b'r', b'g', b'e']);
        options_and_payload.push(0xFF);
        options_and_payload.extend_from_slice(b"hello");

        let mut buffer = Vec::new();
        encode_stream_header(
            &mut buffer,
            MsgCode::SuccessContent,
            &[0x01],
            options_and_payload.len(),
        )
        .unwrap();
        buffer.extend_from_slice(&options_and_payload);

        let (parser, consumed) = StreamMessageParser::new(&buffer).unwrap().unwrap();
        assert_eq!(buffer.len(), consumed);
        assert_eq!(MsgCode::SuccessContent, parser.msg_code());
        assert_eq!(b"hello", parser.payload());

        let mut iter = parser.options();
        assert_eq!(
            Some(Ok((OptionNumber::URI_PATH, &b"large"[..]))),
            iter.next()
        );
        assert_eq!(None, iter.next());
    }

    #[test]
    fn trailing_bytes_are_ignored_past_the_frame() {
        let mut buffer = Vec::new();
        encode_stream_header(&mut buffer, MsgCode::MethodGet, &[], 0).unwrap();
        buffer.extend_from_slice(&[0xAA, 0xBB, 0xCC]);

        let (_parser, consumed) = StreamMessageParser::new(&buffer).unwrap().unwrap();
        assert_eq!(2, consumed);
    }
}
