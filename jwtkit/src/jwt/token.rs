use std::ops::Range;

use jwtkit_base64::Base64Url;

use crate::error;

/// A compact serialization laid out in a single buffer
///
/// Only the positions of the two separators are stored. Every segment is a
/// view into `buffer`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct TokenBuffer<B> {
    buffer: B,
    header_end: usize,
    signed_end: usize,
}

impl TokenBuffer<Vec<u8>> {
    /// Allocates a token sized for segments of the given raw lengths, with
    /// both separators already in place
    pub(crate) fn with_segment_lengths(header: usize, payload: usize, signature: usize) -> Self {
        let header_end = Base64Url::calc_encoded_len(header);
        let signed_end = header_end + 1 + Base64Url::calc_encoded_len(payload);
        let len = signed_end + 1 + Base64Url::calc_encoded_len(signature);

        let mut buffer = vec![0u8; len];
        buffer[header_end] = b'.';
        buffer[signed_end] = b'.';

        Self {
            buffer,
            header_end,
            signed_end,
        }
    }

    pub(crate) fn header_mut(&mut self) -> &mut [u8] {
        let range = self.header_range();
        &mut self.buffer[range]
    }

    pub(crate) fn payload_mut(&mut self) -> &mut [u8] {
        let range = self.payload_range();
        &mut self.buffer[range]
    }

    pub(crate) fn signature_mut(&mut self) -> &mut [u8] {
        let range = self.signature_range();
        &mut self.buffer[range]
    }

    pub(crate) fn into_inner(self) -> Vec<u8> {
        self.buffer
    }
}

impl<'a> TokenBuffer<&'a [u8]> {
    /// Locates the two separators of a borrowed token
    ///
    /// The second separator is searched for only after the first, and the
    /// remainder must hold no further separator.
    pub(crate) fn parse(token: &'a [u8]) -> Result<Self, error::MalformedToken> {
        let header_end = find_dot(token, 0).ok_or_else(error::malformed_token)?;
        let signed_end = find_dot(token, header_end + 1).ok_or_else(error::malformed_token)?;

        if find_dot(token, signed_end + 1).is_some() {
            return Err(error::malformed_token());
        }

        Ok(Self {
            buffer: token,
            header_end,
            signed_end,
        })
    }
}

fn find_dot(token: &[u8], from: usize) -> Option<usize> {
    token[from..]
        .iter()
        .position(|&b| b == b'.')
        .map(|idx| idx + from)
}

impl<B: AsRef<[u8]>> TokenBuffer<B> {
    fn header_range(&self) -> Range<usize> {
        0..self.header_end
    }

    fn payload_range(&self) -> Range<usize> {
        self.header_end + 1..self.signed_end
    }

    fn signature_range(&self) -> Range<usize> {
        self.signed_end + 1..self.buffer.as_ref().len()
    }

    /// The encoded header
    pub(crate) fn header(&self) -> &[u8] {
        &self.buffer.as_ref()[self.header_range()]
    }

    /// The encoded payload
    pub(crate) fn payload(&self) -> &[u8] {
        &self.buffer.as_ref()[self.payload_range()]
    }

    /// The encoded header and payload with their separator, which is the
    /// input to the signature
    pub(crate) fn signed(&self) -> &[u8] {
        &self.buffer.as_ref()[..self.signed_end]
    }

    /// The encoded signature
    pub(crate) fn signature(&self) -> &[u8] {
        &self.buffer.as_ref()[self.signature_range()]
    }
}
