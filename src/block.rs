
extern crate byteorder;

use std::fmt;
use std::str::FromStr;

use byteorder::{ByteOrder, LittleEndian};
use serde::{Serialize, Deserialize};

use crate::error::{Result, ScopeError};
use crate::session::ByteSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleFormat { Byte, Word }

impl SampleFormat {
    pub fn width(&self) -> usize {
        match self {
            SampleFormat::Byte => 1,
            SampleFormat::Word => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SampleFormat::Byte => "BYTE",
            SampleFormat::Word => "WORD",
        }
    }
}

impl FromStr for SampleFormat {
    type Err = ScopeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "BYTE" => Ok(SampleFormat::Byte),
            "WORD" => Ok(SampleFormat::Word),
            _      => Err(ScopeError::InvalidSampleFormat(s.to_owned())),
        }
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { f.write_str(self.as_str()) }
}

fn digit_value(b: u8) -> Result<usize> {
    if b.is_ascii_digit() { Ok((b - b'0') as usize) }
    else { Err(ScopeError::InvalidHeaderLengthDigit(b)) }
}

fn parse_decimal(digits: &[u8]) -> Result<usize> {
    digits.iter().try_fold(0usize, |acc, b| {
        let d = digit_value(*b)?;
        acc.checked_mul(10)
            .and_then(|x| x.checked_add(d))
            .ok_or_else(|| ScopeError::UnexpectedResponse(format!("Block length {:?} overflows", String::from_utf8_lossy(digits))))
    })
}

/// Read one length-prefixed block and return its payload.
///
/// Layout: one framing byte (not checked), one ASCII digit H, H ASCII digits giving the payload length N, then
/// N payload bytes. Nothing past the payload is consumed.
pub fn read_block<B: ByteSource + ?Sized>(source: &mut B) -> Result<Vec<u8>> {
    source.read_bytes(1)?;

    let header = source.read_bytes(1)?;
    let digit: u8 = *header.first()
        .ok_or_else(|| ScopeError::UnexpectedResponse("Byte source returned nothing for the header length".to_owned()))?;
    let header_len: usize = digit_value(digit)?;
    if header_len == 0 {
        // "#0" would be an indefinite length block, which this instrument never sends
        return Err(ScopeError::InvalidHeaderLengthDigit(digit));
    }

    let length_field = source.read_bytes(header_len)?;
    let payload_len: usize = parse_decimal(&length_field)?;
    log::debug!("Block header: {} digit length field, {} payload bytes", header_len, payload_len);

    source.read_bytes(payload_len)
}

/// Split a payload into samples, one per stride of `format.width()` bytes. A trailing partial stride is dropped.
pub fn decode_samples(payload: &[u8], format: SampleFormat) -> Vec<u16> {
    payload.chunks_exact(format.width())
        .map(|stride| match format {
            SampleFormat::Byte => u16::from(stride[0]),
            SampleFormat::Word => LittleEndian::read_u16(stride),
        })
        .collect()
}

/// Read a waveform block and decode it, returning the samples and how many there are.
pub fn read_waveform_block<B: ByteSource + ?Sized>(source: &mut B, format: SampleFormat) -> Result<(Vec<u16>, usize)> {
    let payload = read_block(source)?;
    let samples = decode_samples(&payload, format);
    let count = samples.len();
    Ok((samples, count))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(payload: &[u8]) -> Vec<u8> {
        let len = payload.len().to_string();
        let mut ans: Vec<u8> = format!("#{}{}", len.len(), len).into_bytes();
        ans.extend_from_slice(payload);
        ans
    }

    #[test]
    fn test_sample_format_tokens() {
        assert_eq!("BYTE".parse::<SampleFormat>().unwrap(), SampleFormat::Byte);
        assert_eq!("WORD".parse::<SampleFormat>().unwrap(), SampleFormat::Word);
        assert_eq!(SampleFormat::Word.to_string(), "WORD");
        assert!(matches!("ASCii".parse::<SampleFormat>(), Err(ScopeError::InvalidSampleFormat(_))));
    }

    #[test]
    fn test_byte_blocks_reproduce_samples() {
        for &len in &[0usize, 1, 2, 1000] {
            let payload: Vec<u8> = (0..len).map(|i| (i * 7 % 256) as u8).collect();
            let buf = frame(&payload);
            let mut src: &[u8] = &buf;

            let (samples, count) = read_waveform_block(&mut src, SampleFormat::Byte).unwrap();
            assert_eq!(count, len);
            assert_eq!(samples, payload.iter().map(|b| *b as u16).collect::<Vec<u16>>());
            assert!(src.is_empty());
        }
    }

    #[test]
    fn test_word_is_little_endian() {
        assert_eq!(decode_samples(&[0x34, 0x12], SampleFormat::Word), vec![0x1234]);
        assert_eq!(decode_samples(&[0xff, 0xff, 0x00, 0x01], SampleFormat::Word), vec![0xffff, 0x0100]);
    }

    #[test]
    fn test_word_drops_trailing_byte() {
        let buf = frame(&[1, 0, 2, 0, 3]);
        let mut src: &[u8] = &buf;
        let (samples, count) = read_waveform_block(&mut src, SampleFormat::Word).unwrap();
        assert_eq!(count, 2);
        assert_eq!(samples, vec![1, 2]);
    }

    #[test]
    fn test_stride_counts() {
        assert_eq!(decode_samples(&[], SampleFormat::Word), Vec::<u16>::new());
        assert_eq!(decode_samples(&[7], SampleFormat::Word), Vec::<u16>::new());
        assert_eq!(decode_samples(&[7], SampleFormat::Byte), vec![7]);
        assert_eq!(decode_samples(&[0x00, 0xff, 0x80], SampleFormat::Byte), vec![0x00, 0xff, 0x80]);
    }

    #[test]
    fn test_framing_byte_is_not_checked() {
        let mut src: &[u8] = b"X12ab";
        assert_eq!(read_block(&mut src).unwrap(), b"ab".to_vec());
    }

    #[test]
    fn test_bad_header_digits() {
        let mut src: &[u8] = b"#x1000";
        assert!(matches!(read_block(&mut src), Err(ScopeError::InvalidHeaderLengthDigit(b'x'))));

        let mut src: &[u8] = b"#41a00";
        assert!(matches!(read_block(&mut src), Err(ScopeError::InvalidHeaderLengthDigit(b'a'))));

        let mut src: &[u8] = b"#0abc";
        assert!(matches!(read_block(&mut src), Err(ScopeError::InvalidHeaderLengthDigit(b'0'))));
    }

    #[test]
    fn test_short_payload_is_a_read_failure() {
        let mut src: &[u8] = b"#210abc";
        assert!(matches!(read_block(&mut src), Err(ScopeError::TransportReadFailure(_))));
    }
}
