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

//! Low-level message codec functions.

use super::option::*;
use super::*;

/// Calculates the encoded size of a CoAP option.
pub fn calc_option_size(prev_key: OptionNumber, key: OptionNumber, mut value_len: usize) -> usize {
    if value_len >= 269 {
        value_len += 2;
    } else if value_len >= 13 {
        value_len += 1;
    }

    let option_delta = (key - prev_key) as u16;

    if option_delta >= 269 {
        value_len += 3;
    } else if option_delta >= 13 {
        value_len += 2;
    } else {
        value_len += 1;
    }

    return value_len;
}

/// Decodes the token-length field of a CoAP header, including the
/// [RFC 8974](https://tools.ietf.org/html/rfc8974) TKL-13/14 extension.
///
/// `buffer` must start at the beginning of the 4-byte fixed header. Returns `(token_len,
/// header_len)`, where `header_len` is the number of bytes from the start of `buffer` to the
/// start of the token itself (4, plus 1 or 2 extension bytes).
pub fn decode_token_len(buffer: &[u8]) -> Result<(usize, usize), Error> {
    let tkl = (buffer[0] & COAP_MSG_TKL_MASK) as usize;

    match tkl {
        0..=12 => Ok((tkl, 4)),
        13 => {
            let ext = *buffer.get(4).ok_or(Error::ParseFailure)? as usize;
            let token_len = ext + 13;
            if token_len > MsgToken::MAX_LEN {
                return Err(Error::ParseFailure);
            }
            Ok((token_len, 5))
        }
        // TKL-14 tokens are at least 269 bytes long, which exceeds `MsgToken::MAX_LEN`; this
        // implementation doesn't support them.
        14 => Err(Error::ParseFailure),
        // TKL 15 is reserved.
        _ => Err(Error::ParseFailure),
    }
}

/// Computes the TKL nibble and, if needed, the RFC 8974 TKL-13 extension byte for a token of
/// `token_len` bytes. `token_len` must be `<= MsgToken::MAX_LEN`.
///
/// Returns `(tkl_nibble, extension_byte)`; `extension_byte` is `Some` iff `token_len > 12`.
pub fn encode_token_len(token_len: usize) -> (u8, Option<u8>) {
    if token_len <= 12 {
        (token_len as u8, None)
    } else {
        (13, Some((token_len - 13) as u8))
    }
}

/// The fixed/variable-length portion of an [RFC 8323](https://tools.ietf.org/html/rfc8323)
/// TCP/WS message header, decoded up to (but not including) the token bytes.
///
/// Unlike the UDP header, the TCP/WS header has no message type or message id: ordering and
/// reliability come from the underlying stream instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamMsgHeader {
    /// Number of bytes from the start of the frame to the start of the token.
    pub header_len: usize,

    /// Length of the token, in bytes.
    pub token_len: usize,

    /// Length of the options-plus-payload body that follows the token.
    pub body_len: usize,

    /// The CoAP message code.
    pub code: MsgCode,
}

impl StreamMsgHeader {
    /// Total length of the frame this header describes, including the header itself.
    pub fn frame_len(&self) -> usize {
        self.header_len + self.token_len + self.body_len
    }
}

/// Decodes the header of an [RFC 8323](https://tools.ietf.org/html/rfc8323) TCP/WS message from
/// the start of `buffer`.
///
/// Returns `Ok(None)` if `buffer` doesn't yet contain enough bytes to decode the full header,
/// in which case the caller should read more bytes from the stream and try again.
pub fn decode_stream_header(buffer: &[u8]) -> Result<Option<StreamMsgHeader>, Error> {
    let first = match buffer.first() {
        Some(b) => *b,
        None => return Ok(None),
    };

    let len_nibble = first >> 4;
    let tkl_nibble = first & COAP_MSG_TKL_MASK;

    let (len_ext_bytes, len_base): (usize, usize) = match len_nibble {
        0..=12 => (0, len_nibble as usize),
        13 => (1, 13),
        14 => (2, 269),
        _ => (4, 65805),
    };

    if buffer.len() < 1 + len_ext_bytes {
        return Ok(None);
    }

    let body_len = match len_ext_bytes {
        0 => len_base,
        1 => len_base + buffer[1] as usize,
        2 => len_base + (((buffer[1] as usize) << 8) | buffer[2] as usize),
        4 => {
            len_base
                + (((buffer[1] as usize) << 24)
                    | ((buffer[2] as usize) << 16)
                    | ((buffer[3] as usize) << 8)
                    | buffer[4] as usize)
        }
        _ => unreachable!(),
    };

    let code_offset = 1 + len_ext_bytes;
    let code = match buffer.get(code_offset) {
        Some(b) => MsgCode::try_from(*b).ok_or(Error::UnknownMessageCode)?,
        None => return Ok(None),
    };

    let tkl_ext_offset = code_offset + 1;

    let (token_len, tkl_ext_bytes) = match tkl_nibble {
        0..=12 => (tkl_nibble as usize, 0),
        13 => {
            let ext = match buffer.get(tkl_ext_offset) {
                Some(b) => *b as usize,
                None => return Ok(None),
            };
            let token_len = ext + 13;
            if token_len > MsgToken::MAX_LEN {
                return Err(Error::ParseFailure);
            }
            (token_len, 1)
        }
        // As with the UDP codec, TKL-14 tokens exceed `MsgToken::MAX_LEN` and aren't supported.
        14 => return Err(Error::ParseFailure),
        _ => return Err(Error::ParseFailure),
    };

    Ok(Some(StreamMsgHeader {
        header_len: tkl_ext_offset + tkl_ext_bytes,
        token_len,
        body_len,
        code,
    }))
}

/// Encodes an [RFC 8323](https://tools.ietf.org/html/rfc8323) TCP/WS message header (everything
/// up to and including the token) into `out`, which is appended to rather than overwritten.
///
/// `body_len` is the combined length of the options and payload (including the `0xFF` marker,
/// if present) that the caller will append after this header.
pub fn encode_stream_header(
    out: &mut Vec<u8>,
    code: MsgCode,
    token: &[u8],
    body_len: usize,
) -> Result<(), Error> {
    if token.len() > MsgToken::MAX_LEN {
        return Err(Error::InvalidArgument);
    }

    let (tkl_nibble, tkl_ext) = encode_token_len(token.len());

    let len_nibble: u8 = if body_len <= 12 {
        body_len as u8
    } else if body_len < 269 {
        13
    } else if body_len < 65805 {
        14
    } else if body_len - 65805 <= core::u32::MAX as usize {
        15
    } else {
        return Err(Error::InvalidArgument);
    };

    out.push((len_nibble << 4) | tkl_nibble);

    match len_nibble {
        13 => out.push((body_len - 13) as u8),
        14 => {
            let ext = (body_len - 269) as u16;
            out.push((ext >> 8) as u8);
            out.push(ext as u8);
        }
        15 => out.extend_from_slice(&((body_len - 65805) as u32).to_be_bytes()),
        _ => {}
    }

    out.push(code as u8);

    if let Some(ext) = tkl_ext {
        out.push(ext);
    }

    out.extend_from_slice(token);

    Ok(())
}

/// Decodes one option from a `core::slice::Iter`, which can be obtained from a byte slice.
/// The iterator is then advanced to the next option.
///
/// Will return `Ok(None)` if it either encounters the end-of-options marker (0xFF) or if the
/// given iterator has been fully consumed.
pub fn decode_option<'a>(
    iter: &mut core::slice::Iter<'a, u8>,
    last_option: OptionNumber,
) -> Result<Option<(OptionNumber, &'a [u8])>, Error> {
    // TODO(#5): Improve performance.
    macro_rules! try_next {
        ($iter:expr, $none:expr) => {
            match ($iter).next() {
                Some(x) => *x,
                None => return $none,
            }
        };
    }

    let header: u8 = try_next!(iter, Ok(None));

    if header == 0xFF {
        // End of options marker.
        return Ok(None);
    }

    let key_delta: u16 = match header >> 4 {
        13 => 13u16 + try_next!(iter, Err(Error::ParseFailure)) as u16,
        14 => {
            let msb = try_next!(iter, Err(Error::ParseFailure)) as u16;
            (269u16 + try_next!(iter, Err(Error::ParseFailure)) as u16 + (msb << 8)) as u16
        }
        15 => return Err(Error::ParseFailure),
        key @ _ => key as u16,
    };

    let len = match header & 0xF {
        13 => (13 + try_next!(iter, Err(Error::ParseFailure))) as usize,
        14 => {
            let msb = try_next!(iter, Err(Error::ParseFailure)) as u16;
            (269u16 + try_next!(iter, Err(Error::ParseFailure)) as u16 + (msb << 8)) as usize
        }
        15 => return Err(Error::ParseFailure),
        len @ _ => len as usize,
    };

    if last_option > core::u16::MAX - key_delta {
        // Don't let the key wrap.
        return Err(Error::ParseFailure);
    }

    if len == 0 {
        return Ok(Some((last_option + key_delta, &[])));
    }

    let value: &'a [u8] = &iter.as_slice()[..len];

    iter.nth(len - 1);

    Ok(Some((last_option + key_delta, value)))
}

/// Encodes all parts of an option into the given buffer *except* the value. All other parts,
/// including the value length, are encoded. This is typically used directly when inserting
/// options, otherwise `encode_option()` (which writes the value) is typically a better fit.
pub fn encode_option_without_value(
    buffer: &mut [u8],
    prev_key: OptionNumber,
    key: OptionNumber,
    value_len: usize,
) -> Result<usize, Error> {
    if prev_key > key {
        return Err(Error::InvalidArgument);
    }

    let calc_len = calc_option_size(prev_key, key, value_len);
    if calc_len > buffer.len() {
        log::warn!("calc_len:{}, blen:{}", calc_len, buffer.len());
        return Err(Error::OutOfSpace);
    }

    if value_len > MAX_OPTION_VALUE_SIZE {
        log::warn!("value_len:{}, max:{}", value_len, MAX_OPTION_VALUE_SIZE);
        return Err(Error::InvalidArgument);
    }

    let mut value_offset = 1;
    let mut option_delta = key - prev_key;

    let buffer_ptr = buffer.as_mut_ptr();

    unsafe {
        // This is safe because we checked the buffer size constraints in a check above.
        // This significantly improves performance.

        if option_delta >= 269 {
            option_delta -= 269;
            *buffer_ptr.offset(0) = 14 << 4;
            *buffer_ptr.offset(1) = (option_delta >> 8) as u8;
            *buffer_ptr.offset(2) = option_delta as u8;
            value_offset += 2;
        } else if option_delta >= 13 {
            *buffer_ptr.offset(0) = 13 << 4;
            *buffer_ptr.offset(1) = (option_delta - 13) as u8;
            value_offset += 1;
        } else {
            *buffer_ptr.offset(0) = (option_delta << 4) as u8;
        }

        if value_len >= 269 {
            *buffer_ptr.offset(0) |= 14;
            *buffer_ptr.offset(value_offset) = ((value_len - 269) >> 8) as u8;
            *buffer_ptr.offset(value_offset + 1) = (value_len - 269) as u8;
            value_offset += 2;
        } else if value_len >= 13 {
            *buffer_ptr.offset(0) |= 13;
            *buffer_ptr.offset(value_offset) = (value_len - 13) as u8;
            value_offset += 1;
        } else {
            *buffer_ptr.offset(0) |= (value_len & 15) as u8;
        }
    }

    return Ok(value_offset as usize + value_len);
}

/// Encodes an option into the given buffer, including the value.
pub fn encode_option(
    buffer: &mut [u8],
    prev_key: OptionNumber,
    key: OptionNumber,
    value: &[u8],
) -> Result<usize, Error> {
    let option_len = encode_option_without_value(buffer, prev_key, key, value.len())?;

    // The value bytes are always at the end.
    buffer[option_len - value.len()..option_len].copy_from_slice(value);

    return Ok(option_len);
}

/// Helper function for implementing option insertion.
/// Return value is a tuple of several fields:
///
/// * `split_index` (`usize`) The index where the new option should be inserted.
/// * `prev_option_key` (`OptionNumber`) The option number of the option immediately before the split.
/// * `next_key` (`OptionNumber`) The option number of the option immediately after the split.
/// * `next_value_len` (`usize`) The length of the value of the option immediately after the split.
/// * `next_option_size` (`usize`) The length of the entire option immediately after the split.
///
fn insert_split_helper(
    buffer: &[u8],
    key: OptionNumber,
) -> (usize, OptionNumber, OptionNumber, usize, usize) {
    // This is the key for the option immediately prior to
    // the option we are adding.
    let mut prev_option_key = OptionNumber(0);

    // This marks at what index we will split the two halves.
    let mut split_index;

    let mut iter = OptionIterator::new(buffer);

    loop {
        split_index = iter.as_slice().as_ptr() as usize - buffer.as_ptr() as usize;

        let (next_key, next_value) = iter
            .next()
            .expect(&format!(
                "Unexpected end of options (prev: {}, iter: {:?})",
                prev_option_key, iter
            ))
            .expect("Wrote corrupt options");

        if next_key > key {
            let next_option_size =
                iter.as_slice().as_ptr() as usize - buffer.as_ptr() as usize - split_index;
            return (
                split_index,
                prev_option_key,
                next_key,
                next_value.len(),
                next_option_size,
            );
        }

        prev_option_key = next_key;
    }
}

/// Inserts an option into an option list. Very slow unless called sequentially.
pub fn insert_option(
    buffer: &mut [u8],
    mut len: usize,
    last_option: OptionNumber,
    key: OptionNumber,
    value: &[u8],
) -> Result<(usize, OptionNumber), Error> {
    if value.len() > MAX_OPTION_VALUE_SIZE {
        return Err(Error::InvalidArgument);
    }

    if key >= last_option {
        // This is the easy case: A simple append is adequate.
        len += encode_option(&mut buffer[len..], last_option, key, value)?;
        return Ok((len, key));
    }

    // What follows will only happen if this method is called with a property key
    // out-of-order. Hopefully this should only happen rarely, as there is a
    // significant performance penalty for doing so. This approach does have a
    // bright side though: It doesn't require a heap.

    let (split_index, prev_option_key, next_option_key, next_option_value_len, next_option_size) =
        insert_split_helper(&buffer[..len], key);

    // This variable is keeping track of the small possible change
    // in size due to the change of the key delta encoding.
    let key_delta_size_adj =
        next_option_size - calc_option_size(key, next_option_key, next_option_value_len);

    // The size of the option we are going to insert.
    let new_option_size = calc_option_size(prev_option_key, key, value.len());

    // Calculate the total change in size.
    let adj_size = new_option_size - key_delta_size_adj;

    // Do a space check before we start trying to move buffers around.
    if len + adj_size > buffer.len() {
        log::warn!(
            "len:{} + adj_size:{} > blen:{}",
            len,
            adj_size,
            buffer.len()
        );
        return Err(Error::OutOfSpace);
    }

    let src = split_index..len;
    let dest = split_index + adj_size;

    // Move the options above the split.
    buffer.copy_within(src, dest);
    len += adj_size;

    // Encode our new option.
    // This should not fail---if it does then something
    // has gone terribly wrong and we should panic.
    encode_option(
        &mut buffer[split_index..split_index + new_option_size],
        prev_option_key,
        key,
        value,
    )
    .expect("Internal inconsistency inserting option");

    if key != prev_option_key {
        // Partially Re-encode the next option, since the previous option
        // key value has changed. Since the value part hasn't changed and
        // remains at the end of the option, we don't need it here.
        // This should not fail---if it does then something
        // has gone terribly wrong and we should panic.
        encode_option_without_value(
            &mut buffer[split_index + new_option_size..],
            key,
            next_option_key,
            next_option_value_len,
        )
        .expect("Internal inconsistency inserting option");
    }

    return Ok((len, last_option));
}

#[cfg(test)]
mod stream_header_tests {
    use super::*;

    #[test]
    fn decode_needs_more_for_empty_buffer() {
        assert_eq!(Ok(None), decode_stream_header(&[]));
    }

    #[test]
    fn small_message_round_trips() {
        let mut buffer = Vec::new();
        encode_stream_header(&mut buffer, MsgCode::MethodGet, &[0x20, 0x21], 4).unwrap();

        // Len nibble 4 (body_len), TKL nibble 2 (token_len), no extension bytes.
        assert_eq!(&[0x42, MsgCode::MethodGet as u8, 0x20, 0x21], buffer.as_slice());

        let header = decode_stream_header(&buffer).unwrap().unwrap();
        assert_eq!(4, header.header_len);
        assert_eq!(2, header.token_len);
        assert_eq!(4, header.body_len);
        assert_eq!(MsgCode::MethodGet, header.code);
        assert_eq!(8, header.frame_len());
    }

    #[test]
    fn len_extension_13_round_trips() {
        let body_len = 200;
        let mut buffer = Vec::new();
        encode_stream_header(&mut buffer, MsgCode::SuccessContent, &[], body_len).unwrap();

        assert_eq!(0b1101, buffer[0] >> 4);
        assert_eq!((body_len - 13) as u8, buffer[1]);

        let header = decode_stream_header(&buffer).unwrap().unwrap();
        assert_eq!(body_len, header.body_len);
        assert_eq!(0, header.token_len);
        assert_eq!(MsgCode::SuccessContent, header.code);
    }

    #[test]
    fn len_extension_14_round_trips() {
        let body_len = 1000;
        let mut buffer = Vec::new();
        encode_stream_header(&mut buffer, MsgCode::SuccessContent, &[], body_len).unwrap();

        assert_eq!(0b1110, buffer[0] >> 4);

        let header = decode_stream_header(&buffer).unwrap().unwrap();
        assert_eq!(body_len, header.body_len);
    }

    #[test]
    fn extended_token_round_trips() {
        let token = [0xab; 20];
        let mut buffer = Vec::new();
        encode_stream_header(&mut buffer, MsgCode::MethodPost, &token, 0).unwrap();

        let header = decode_stream_header(&buffer).unwrap().unwrap();
        assert_eq!(20, header.token_len);
        assert_eq!(4, header.header_len);
        assert_eq!(&token[..], &buffer[header.header_len..header.header_len + header.token_len]);
    }

    #[test]
    fn incomplete_header_requests_more_bytes() {
        let mut buffer = Vec::new();
        encode_stream_header(&mut buffer, MsgCode::MethodGet, &[0xab; 20], 0).unwrap();

        // Truncate before the token-length extension byte is readable.
        assert_eq!(Ok(None), decode_stream_header(&buffer[..2]));
        // The header (Len nibble, Code, TKL extension byte) is fully decodable in 3 bytes,
        // even though none of the token itself has arrived yet.
        assert!(decode_stream_header(&buffer[..3]).unwrap().is_some());
    }

    #[test]
    fn rejects_tkl_14() {
        // First byte: Len nibble 0, TKL nibble 14.
        assert_eq!(
            Err(Error::ParseFailure),
            decode_stream_header(&[0x0E, MsgCode::MethodGet as u8])
        );
    }
}
