//! Bit-level signal decoding
//!
//! Extracts one bit-packed raw value from a record and applies the channel's
//! conversion formula to produce a physical double. Handles arbitrary bit
//! positions, widths from 1 to 64 bits, and both byte orders; correctness is
//! independent of the host machine's endianness because the gathered bytes
//! are normalized to one canonical order before any shifting.

use crate::blocks::{CcBlock, CnBlock};
use crate::file::MdfFile;
use crate::types::{DecodeError, Result};

/// MDF3 signal data type codes
pub mod data_type {
    pub const UNSIGNED_DEFAULT: u16 = 0;
    pub const SIGNED_DEFAULT: u16 = 1;
    pub const FLOAT_DEFAULT: u16 = 2;
    pub const DOUBLE_DEFAULT: u16 = 3;
    pub const STRING: u16 = 7;
    pub const BYTE_ARRAY: u16 = 8;
    pub const UNSIGNED_BIG_ENDIAN: u16 = 9;
    pub const SIGNED_BIG_ENDIAN: u16 = 10;
    pub const FLOAT_BIG_ENDIAN: u16 = 11;
    pub const DOUBLE_BIG_ENDIAN: u16 = 12;
    pub const UNSIGNED_LITTLE_ENDIAN: u16 = 13;
    pub const SIGNED_LITTLE_ENDIAN: u16 = 14;
    pub const FLOAT_LITTLE_ENDIAN: u16 = 15;
    pub const DOUBLE_LITTLE_ENDIAN: u16 = 16;
}

/// MDF3 conversion type codes
pub mod conversion_type {
    pub const LINEAR: u16 = 0;
    pub const TABULAR_INTERPOLATED: u16 = 1;
    pub const RATIONAL: u16 = 9;
    pub const TEXT_TABLE: u16 = 11;
    pub const TEXT_RANGE_TABLE: u16 = 12;
    pub const ONE_TO_ONE: u16 = 65535;
}

/// Value family of a signal data type, after endianness is factored out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeFamily {
    Unsigned,
    Signed,
    Float,
    Double,
    /// Strings and byte arrays carry no numeric value; raw decodes as 0
    Opaque,
}

impl TypeFamily {
    fn classify(sdt: u16) -> Result<Self> {
        use data_type::*;
        match sdt {
            UNSIGNED_DEFAULT | UNSIGNED_BIG_ENDIAN | UNSIGNED_LITTLE_ENDIAN => Ok(Self::Unsigned),
            SIGNED_DEFAULT | SIGNED_BIG_ENDIAN | SIGNED_LITTLE_ENDIAN => Ok(Self::Signed),
            FLOAT_DEFAULT | FLOAT_BIG_ENDIAN | FLOAT_LITTLE_ENDIAN => Ok(Self::Float),
            DOUBLE_DEFAULT | DOUBLE_BIG_ENDIAN | DOUBLE_LITTLE_ENDIAN => Ok(Self::Double),
            STRING | BYTE_ARRAY => Ok(Self::Opaque),
            other => Err(DecodeError::UnsupportedDataType(other)),
        }
    }
}

/// Raw value extracted from the bit field, before physical conversion
///
/// The variant preserves the widening rule: unsigned and opaque types widen
/// through u64, signed through i64, floats keep their IEEE-754 bit pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawValue {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
}

impl RawValue {
    /// Widen to double for conversion formulas
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Unsigned(v) => v as f64,
            Self::Signed(v) => v as f64,
            Self::Float(v) => v,
        }
    }
}

/// True if the channel's data is stored big-endian
///
/// Explicit big-endian variants always are; "default" variants inherit the
/// file's global byte-order flag; everything else is little-endian.
fn is_big_endian(sdt: u16, file_default_big_endian: bool) -> bool {
    use data_type::*;
    match sdt {
        UNSIGNED_BIG_ENDIAN | SIGNED_BIG_ENDIAN | FLOAT_BIG_ENDIAN | DOUBLE_BIG_ENDIAN => true,
        UNSIGNED_DEFAULT | SIGNED_DEFAULT | FLOAT_DEFAULT | DOUBLE_DEFAULT => {
            file_default_big_endian
        }
        _ => false,
    }
}

/// Decode one signal value from one record
///
/// `record` is the record payload: the fixed-size slice for one sample, with
/// any leading record-ID bytes already skipped by the caller. The result is
/// the physical value after the channel's conversion formula.
pub fn decode_signal(file: &MdfFile, channel: &CnBlock<'_>, record: &[u8]) -> Result<f64> {
    let raw = extract_raw(file, channel, record)?;
    let conversion = file.conversion(channel.conversion_link());
    apply_conversion(conversion.as_ref(), raw)
}

/// Extract the raw bit-field value of a channel from one record
pub fn extract_raw(file: &MdfFile, channel: &CnBlock<'_>, record: &[u8]) -> Result<RawValue> {
    let sdt = channel.signal_data_type();
    let family = TypeFamily::classify(sdt)?;

    // Strings and byte arrays are not numerically decoded here
    if family == TypeFamily::Opaque {
        return Ok(RawValue::Unsigned(0));
    }

    let number_bits = channel.number_of_bits() as u32;
    if number_bits == 0 || number_bits > 64 {
        return Err(DecodeError::InvalidBitField(format!(
            "number of bits {} outside 1..=64",
            number_bits
        )));
    }

    let first_bit = channel.first_bit() as usize;
    let bit_offset = (first_bit % 8) as u32;
    let number_bytes = ((bit_offset + number_bits) as usize + 7) / 8;

    let mut byte_offset = first_bit / 8;
    if file.version() >= 300 {
        byte_offset += channel.additional_byte_offset() as usize;
    }

    if byte_offset + number_bytes > record.len() {
        return Err(DecodeError::RecordOutOfRange(format!(
            "bit field at byte {} (+{}) outside record of {} bytes",
            byte_offset,
            number_bytes,
            record.len()
        )));
    }

    if bit_offset + number_bits > 64 {
        return Err(DecodeError::InvalidBitField(format!(
            "bit offset {} + {} bits exceeds 64-bit extraction window",
            bit_offset, number_bits
        )));
    }

    // Gather the field bytes into a scratch buffer in little-endian order,
    // so the shift/mask logic below is identical for both source orders and
    // for either host endianness.
    let field = &record[byte_offset..byte_offset + number_bytes];
    let mut scratch = [0u8; 8];
    if is_big_endian(sdt, file.default_big_endian()) {
        for (i, &b) in field.iter().rev().enumerate() {
            scratch[i] = b;
        }
    } else {
        scratch[..number_bytes].copy_from_slice(field);
    }
    let word = u64::from_le_bytes(scratch);

    match family {
        TypeFamily::Unsigned => {
            let mut value = word >> bit_offset;
            if number_bits < 64 {
                value &= (1u64 << number_bits) - 1;
            }
            Ok(RawValue::Unsigned(value))
        }
        TypeFamily::Signed => {
            // Left-shift the field to the top, arithmetic-shift back down:
            // sign-extends from bit number_bits-1, and makes a 1-bit signed
            // field decode to exactly 0 or -1.
            let value = ((word << (64 - number_bits - bit_offset)) as i64) >> (64 - number_bits);
            Ok(RawValue::Signed(value))
        }
        TypeFamily::Float => {
            validate_float_field(bit_offset, number_bits, 32)?;
            let bits = u32::from_le_bytes(scratch[..4].try_into().unwrap());
            Ok(RawValue::Float(f32::from_bits(bits) as f64))
        }
        TypeFamily::Double => {
            validate_float_field(bit_offset, number_bits, 64)?;
            Ok(RawValue::Float(f64::from_bits(word)))
        }
        TypeFamily::Opaque => unreachable!("handled above"),
    }
}

fn validate_float_field(bit_offset: u32, number_bits: u32, expected_bits: u32) -> Result<()> {
    if bit_offset != 0 || number_bits != expected_bits {
        return Err(DecodeError::InvalidBitField(format!(
            "IEEE-754 field must be byte-aligned and {} bits wide, got offset {} width {}",
            expected_bits, bit_offset, number_bits
        )));
    }
    Ok(())
}

/// Apply a conversion formula to a raw value
///
/// An absent conversion block is the identity conversion. Text-table types
/// (11, 12) are not resolved to text; they pass the raw number through.
pub fn apply_conversion(conversion: Option<&CcBlock<'_>>, raw: RawValue) -> Result<f64> {
    let cc = match conversion {
        Some(cc) => cc,
        None => return Ok(raw.as_f64()),
    };

    use conversion_type::*;
    match cc.conversion_type() {
        LINEAR => {
            let (p1, p2) = cc.linear_params()?;
            Ok(raw.as_f64() * p2 + p1)
        }
        TABULAR_INTERPOLATED => tabular_lookup(cc, raw.as_f64()),
        RATIONAL => {
            let [p1, p2, p3, p4, p5, p6] = cc.rational_params()?;
            let x = raw.as_f64();
            let denominator = x * (x * p4 + p5) + p6;
            if denominator == 0.0 {
                // Defined fallback, not an error
                Ok(0.0)
            } else {
                Ok((x * (x * p1 + p2) + p3) / denominator)
            }
        }
        TEXT_TABLE | TEXT_RANGE_TABLE | ONE_TO_ONE => Ok(raw.as_f64()),
        other => Err(DecodeError::UnsupportedConversion(other)),
    }
}

/// Tabular lookup with clamping outside the table and linear interpolation
/// between the bracketing pair inside it
///
/// Entries are `(int_value, phys_value)` pairs ascending by `int_value`.
fn tabular_lookup(cc: &CcBlock<'_>, raw: f64) -> Result<f64> {
    let pairs = cc.table_pairs()?;

    if pairs.windows(2).any(|w| w[0].0 > w[1].0) {
        return Err(DecodeError::MalformedConversion(
            "tabular conversion entries not ascending".to_string(),
        ));
    }

    let (first_x, first_y) = pairs[0];
    let (last_x, last_y) = pairs[pairs.len() - 1];
    if raw < first_x {
        return Ok(first_y);
    }
    if raw >= last_x {
        return Ok(last_y);
    }

    for window in pairs.windows(2) {
        let (x0, y0) = window[0];
        let (x1, y1) = window[1];
        if raw >= x0 && raw < x1 {
            if x1 == x0 {
                return Ok(y0);
            }
            return Ok(y0 + (y1 - y0) * (raw - x0) / (x1 - x0));
        }
    }

    // Unreachable for ascending tables, but never return silently
    Err(DecodeError::MalformedConversion(
        "tabular conversion bracketing failed".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{CnBlock, Link};

    /// Build a file image holding one channel block, return (image, cn link)
    fn image_with_channel(
        version: u16,
        big_endian_default: bool,
        first_bit: u16,
        number_bits: u16,
        sdt: u16,
        conversion_link: Link,
        additional_byte_offset: u16,
    ) -> (Vec<u8>, Link) {
        let mut image = vec![0u8; 64];
        image[..8].copy_from_slice(b"MDF     ");
        image[24..26].copy_from_slice(&(big_endian_default as u16).to_le_bytes());
        image[28..30].copy_from_slice(&version.to_le_bytes());

        let cn_link = image.len() as Link;
        let mut cn = vec![0u8; CnBlock::SIZE];
        cn[..2].copy_from_slice(b"CN");
        cn[8..12].copy_from_slice(&conversion_link.to_le_bytes());
        cn[186..188].copy_from_slice(&first_bit.to_le_bytes());
        cn[188..190].copy_from_slice(&number_bits.to_le_bytes());
        cn[190..192].copy_from_slice(&sdt.to_le_bytes());
        cn[226..228].copy_from_slice(&additional_byte_offset.to_le_bytes());
        image.extend_from_slice(&cn);

        (image, cn_link)
    }

    /// Append a conversion block with the given type and f64 parameters
    fn append_cc(image: &mut Vec<u8>, conversion_type: u16, size_info: u16, params: &[f64]) -> Link {
        let link = image.len() as Link;
        let mut cc = vec![0u8; 46 + params.len() * 8];
        cc[..2].copy_from_slice(b"CC");
        cc[42..44].copy_from_slice(&conversion_type.to_le_bytes());
        cc[44..46].copy_from_slice(&size_info.to_le_bytes());
        for (i, p) in params.iter().enumerate() {
            cc[46 + i * 8..54 + i * 8].copy_from_slice(&p.to_le_bytes());
        }
        image.extend_from_slice(&cc);
        link
    }

    fn decode_one(
        first_bit: u16,
        number_bits: u16,
        sdt: u16,
        record: &[u8],
    ) -> Result<f64> {
        let (image, cn_link) = image_with_channel(330, false, first_bit, number_bits, sdt, 0, 0);
        let file = MdfFile::from_bytes(image).unwrap();
        let cn = file.channel(cn_link).unwrap();
        decode_signal(&file, &cn, record)
    }

    #[test]
    fn test_unsigned_byte_aligned() {
        assert_eq!(
            decode_one(0, 8, data_type::UNSIGNED_DEFAULT, &[0xA5]).unwrap(),
            165.0
        );
    }

    #[test]
    fn test_unsigned_bit_packed() {
        // 5-bit field at bit 3 of 0b1101_1000 = value 0b11011 = 27
        assert_eq!(
            decode_one(3, 5, data_type::UNSIGNED_DEFAULT, &[0b1101_1000]).unwrap(),
            27.0
        );
    }

    #[test]
    fn test_unsigned_crosses_byte_boundary() {
        // 12-bit field at bit 4: low nibble from byte 0, full byte 1
        // bytes [0xF0, 0xAB] -> word 0xABF0 >> 4 = 0xABF, mask 12 bits = 0xABF
        assert_eq!(
            decode_one(4, 12, data_type::UNSIGNED_DEFAULT, &[0xF0, 0xAB]).unwrap(),
            0xABF as f64
        );
    }

    #[test]
    fn test_unsigned_full_64_bits() {
        let record = u64::MAX.to_le_bytes();
        assert_eq!(
            decode_one(0, 64, data_type::UNSIGNED_DEFAULT, &record).unwrap(),
            u64::MAX as f64
        );
    }

    #[test]
    fn test_signed_sign_extension() {
        // 8-bit signed 0xFF = -1, 0x80 = -128, 0x7F = 127
        assert_eq!(decode_one(0, 8, data_type::SIGNED_DEFAULT, &[0xFF]).unwrap(), -1.0);
        assert_eq!(decode_one(0, 8, data_type::SIGNED_DEFAULT, &[0x80]).unwrap(), -128.0);
        assert_eq!(decode_one(0, 8, data_type::SIGNED_DEFAULT, &[0x7F]).unwrap(), 127.0);
    }

    #[test]
    fn test_one_bit_signed() {
        // A set bit is exactly -1, a clear bit exactly 0
        assert_eq!(decode_one(0, 1, data_type::SIGNED_DEFAULT, &[0x01]).unwrap(), -1.0);
        assert_eq!(decode_one(0, 1, data_type::SIGNED_DEFAULT, &[0x00]).unwrap(), 0.0);
        assert_eq!(decode_one(3, 1, data_type::SIGNED_DEFAULT, &[0b0000_1000]).unwrap(), -1.0);
    }

    #[test]
    fn test_one_bit_unsigned() {
        assert_eq!(decode_one(0, 1, data_type::UNSIGNED_DEFAULT, &[0x01]).unwrap(), 1.0);
        assert_eq!(decode_one(5, 1, data_type::UNSIGNED_DEFAULT, &[0b0010_0000]).unwrap(), 1.0);
    }

    #[test]
    fn test_signed_bit_packed_negative() {
        // 4-bit signed at bit 2: 0b00_1100_00 -> field 0b1100 = -4
        assert_eq!(
            decode_one(2, 4, data_type::SIGNED_DEFAULT, &[0b0011_0000]).unwrap(),
            -4.0
        );
    }

    #[test]
    fn test_big_endian_u16() {
        // Big-endian 0x0102 decodes to 258 regardless of host byte order
        assert_eq!(
            decode_one(0, 16, data_type::UNSIGNED_BIG_ENDIAN, &[0x01, 0x02]).unwrap(),
            258.0
        );
        // The little-endian encoding of the same logical value agrees
        assert_eq!(
            decode_one(0, 16, data_type::UNSIGNED_LITTLE_ENDIAN, &[0x02, 0x01]).unwrap(),
            258.0
        );
    }

    #[test]
    fn test_default_type_follows_file_byte_order() {
        let record = [0x01, 0x02];
        let (image, cn_link) =
            image_with_channel(330, true, 0, 16, data_type::UNSIGNED_DEFAULT, 0, 0);
        let file = MdfFile::from_bytes(image).unwrap();
        let cn = file.channel(cn_link).unwrap();
        assert_eq!(decode_signal(&file, &cn, &record).unwrap(), 258.0);

        let (image, cn_link) =
            image_with_channel(330, false, 0, 16, data_type::UNSIGNED_DEFAULT, 0, 0);
        let file = MdfFile::from_bytes(image).unwrap();
        let cn = file.channel(cn_link).unwrap();
        assert_eq!(decode_signal(&file, &cn, &record).unwrap(), 0x0201 as f64);
    }

    #[test]
    fn test_big_endian_signed() {
        // Big-endian 0xFF38 as i16 = -200
        assert_eq!(
            decode_one(0, 16, data_type::SIGNED_BIG_ENDIAN, &[0xFF, 0x38]).unwrap(),
            -200.0
        );
    }

    #[test]
    fn test_float_round_trip() {
        let record = 3.5f32.to_le_bytes();
        assert_eq!(
            decode_one(0, 32, data_type::FLOAT_LITTLE_ENDIAN, &record).unwrap(),
            3.5
        );

        let record = 3.5f32.to_be_bytes();
        assert_eq!(
            decode_one(0, 32, data_type::FLOAT_BIG_ENDIAN, &record).unwrap(),
            3.5
        );
    }

    #[test]
    fn test_double_round_trip() {
        let value = -12345.6789f64;
        let record = value.to_le_bytes();
        assert_eq!(
            decode_one(0, 64, data_type::DOUBLE_LITTLE_ENDIAN, &record).unwrap(),
            value
        );

        let record = value.to_be_bytes();
        assert_eq!(
            decode_one(0, 64, data_type::DOUBLE_BIG_ENDIAN, &record).unwrap(),
            value
        );
    }

    #[test]
    fn test_float_field_must_be_aligned() {
        let record = [0u8; 8];
        assert!(matches!(
            decode_one(3, 32, data_type::FLOAT_DEFAULT, &record),
            Err(DecodeError::InvalidBitField(_))
        ));
        assert!(matches!(
            decode_one(0, 16, data_type::DOUBLE_DEFAULT, &record),
            Err(DecodeError::InvalidBitField(_))
        ));
    }

    #[test]
    fn test_string_and_byte_array_decode_as_zero() {
        assert_eq!(decode_one(0, 8, data_type::STRING, &[0xFF]).unwrap(), 0.0);
        assert_eq!(decode_one(0, 8, data_type::BYTE_ARRAY, &[0xFF]).unwrap(), 0.0);
    }

    #[test]
    fn test_unsupported_data_type() {
        assert!(matches!(
            decode_one(0, 8, 99, &[0x00]),
            Err(DecodeError::UnsupportedDataType(99))
        ));
        // VAX float codes are not supported either
        assert!(matches!(
            decode_one(0, 32, 4, &[0u8; 4]),
            Err(DecodeError::UnsupportedDataType(4))
        ));
    }

    #[test]
    fn test_field_outside_record() {
        assert!(matches!(
            decode_one(8, 16, data_type::UNSIGNED_DEFAULT, &[0x00]),
            Err(DecodeError::RecordOutOfRange(_))
        ));
    }

    #[test]
    fn test_additional_byte_offset_versioned() {
        let record = [0x00, 0x2A];

        // Version >= 300 honors the additional byte offset
        let (image, cn_link) =
            image_with_channel(330, false, 0, 8, data_type::UNSIGNED_DEFAULT, 0, 1);
        let file = MdfFile::from_bytes(image).unwrap();
        let cn = file.channel(cn_link).unwrap();
        assert_eq!(decode_signal(&file, &cn, &record).unwrap(), 42.0);

        // Older versions ignore the field
        let (image, cn_link) =
            image_with_channel(212, false, 0, 8, data_type::UNSIGNED_DEFAULT, 0, 1);
        let file = MdfFile::from_bytes(image).unwrap();
        let cn = file.channel(cn_link).unwrap();
        assert_eq!(decode_signal(&file, &cn, &record).unwrap(), 0.0);
    }

    #[test]
    fn test_linear_conversion() {
        // raw 10, p1 = 1.0, p2 = 2.0 -> 21.0
        let mut image = vec![0u8; 64];
        image[..8].copy_from_slice(b"MDF     ");
        image[28..30].copy_from_slice(&330u16.to_le_bytes());
        let cc_link = append_cc(&mut image, conversion_type::LINEAR, 2, &[1.0, 2.0]);

        let cn_link = image.len() as Link;
        let mut cn = vec![0u8; CnBlock::SIZE];
        cn[..2].copy_from_slice(b"CN");
        cn[8..12].copy_from_slice(&cc_link.to_le_bytes());
        cn[188..190].copy_from_slice(&8u16.to_le_bytes());
        image.extend_from_slice(&cn);

        let file = MdfFile::from_bytes(image).unwrap();
        let cn = file.channel(cn_link).unwrap();
        assert_eq!(decode_signal(&file, &cn, &[10]).unwrap(), 21.0);
    }

    fn convert_raw(conversion_ty: u16, size_info: u16, params: &[f64], raw: RawValue) -> Result<f64> {
        let mut image = vec![0u8; 64];
        image[..8].copy_from_slice(b"MDF     ");
        image[28..30].copy_from_slice(&330u16.to_le_bytes());
        let cc_link = append_cc(&mut image, conversion_ty, size_info, params);
        let file = MdfFile::from_bytes(image).unwrap();
        let cc = file.conversion(cc_link).unwrap();
        apply_conversion(Some(&cc), raw)
    }

    #[test]
    fn test_tabular_conversion() {
        let table = [0.0, 0.0, 10.0, 100.0, 20.0, 300.0];

        // Interpolated inside the table
        assert_eq!(
            convert_raw(conversion_type::TABULAR_INTERPOLATED, 3, &table, RawValue::Signed(5)).unwrap(),
            50.0
        );
        // Clamped below and above
        assert_eq!(
            convert_raw(conversion_type::TABULAR_INTERPOLATED, 3, &table, RawValue::Signed(-1)).unwrap(),
            0.0
        );
        assert_eq!(
            convert_raw(conversion_type::TABULAR_INTERPOLATED, 3, &table, RawValue::Signed(25)).unwrap(),
            300.0
        );
        // Exact knot
        assert_eq!(
            convert_raw(conversion_type::TABULAR_INTERPOLATED, 3, &table, RawValue::Signed(10)).unwrap(),
            100.0
        );
        // Second segment interpolation
        assert_eq!(
            convert_raw(conversion_type::TABULAR_INTERPOLATED, 3, &table, RawValue::Signed(15)).unwrap(),
            200.0
        );
    }

    #[test]
    fn test_tabular_unsorted_is_malformed() {
        let table = [20.0, 300.0, 0.0, 0.0];
        assert!(matches!(
            convert_raw(conversion_type::TABULAR_INTERPOLATED, 2, &table, RawValue::Signed(5)),
            Err(DecodeError::MalformedConversion(_))
        ));
    }

    #[test]
    fn test_rational_conversion() {
        // Constant numerator 5, denominator 1: any raw -> 5.0
        let params = [0.0, 0.0, 5.0, 0.0, 0.0, 1.0];
        assert_eq!(
            convert_raw(conversion_type::RATIONAL, 0, &params, RawValue::Signed(123)).unwrap(),
            5.0
        );

        // Denominator exactly zero -> defined 0.0 fallback
        let params = [0.0, 0.0, 5.0, 0.0, 0.0, 0.0];
        assert_eq!(
            convert_raw(conversion_type::RATIONAL, 0, &params, RawValue::Signed(0)).unwrap(),
            0.0
        );

        // Full quadratic-over-quadratic: (x*(x*1+2)+3)/(x*(x*0+0)+1) at x=2 -> 11
        let params = [1.0, 2.0, 3.0, 0.0, 0.0, 1.0];
        assert_eq!(
            convert_raw(conversion_type::RATIONAL, 0, &params, RawValue::Signed(2)).unwrap(),
            11.0
        );
    }

    #[test]
    fn test_text_table_passes_raw_through() {
        assert_eq!(
            convert_raw(conversion_type::TEXT_TABLE, 0, &[], RawValue::Unsigned(7)).unwrap(),
            7.0
        );
        assert_eq!(
            convert_raw(conversion_type::TEXT_RANGE_TABLE, 0, &[], RawValue::Signed(-3)).unwrap(),
            -3.0
        );
    }

    #[test]
    fn test_one_to_one_conversion() {
        assert_eq!(
            convert_raw(conversion_type::ONE_TO_ONE, 0, &[], RawValue::Unsigned(42)).unwrap(),
            42.0
        );
    }

    #[test]
    fn test_unsupported_conversion_type() {
        assert!(matches!(
            convert_raw(7, 0, &[], RawValue::Unsigned(1)),
            Err(DecodeError::UnsupportedConversion(7))
        ));
    }

    #[test]
    fn test_absent_conversion_is_identity() {
        assert_eq!(apply_conversion(None, RawValue::Unsigned(u64::MAX)).unwrap(), u64::MAX as f64);
        assert_eq!(apply_conversion(None, RawValue::Signed(-5)).unwrap(), -5.0);
        assert_eq!(apply_conversion(None, RawValue::Float(2.25)).unwrap(), 2.25);
    }

    #[test]
    fn test_integer_round_trip_various_positions() {
        // Encode 0x2AB at several bit positions and widths, decode bit-exactly
        for &(first_bit, number_bits, value) in
            &[(0u16, 10u16, 0x2ABu64), (5, 10, 0x155), (13, 17, 0x1FFFF), (7, 9, 0x100)]
        {
            let mut record = [0u8; 8];
            let word = value << (first_bit % 8);
            let shifted = word.to_le_bytes();
            let byte_offset = (first_bit / 8) as usize;
            for (i, b) in shifted.iter().enumerate() {
                if byte_offset + i < record.len() {
                    record[byte_offset + i] |= b;
                }
            }
            let decoded =
                decode_one(first_bit, number_bits, data_type::UNSIGNED_DEFAULT, &record).unwrap();
            assert_eq!(decoded, value as f64, "first_bit={} bits={}", first_bit, number_bits);
        }
    }
}
