//! Typed views over the MDF3 block graph
//!
//! Every block is a zero-copy view into the file image, located by a link
//! (a byte offset, 0 meaning absent). Views are obtained through the typed
//! getters on [`MdfFile`], which route all bounds validation through the
//! navigator primitive in `file.rs`. Field offsets follow the MDF 3.x block
//! layouts; multi-byte fields are little-endian.

use crate::file::MdfFile;
use crate::types::{DecodeError, Result};
use byteorder::{ByteOrder, LittleEndian};

/// A link: byte offset of a block within the file image, 0 = absent
pub type Link = u32;

/// Fixed location of the header block
pub const HD_BLOCK_OFFSET: Link = 64;

/// Channel type code for data channels
pub const CHANNEL_TYPE_DATA: u16 = 0;
/// Channel type code for the time channel
pub const CHANNEL_TYPE_TIME: u16 = 1;

/// Extension type code for generic/DIM supplements
pub const EXTENSION_TYPE_DIM: u16 = 2;
/// Extension type code for Vector CAN supplements
pub const EXTENSION_TYPE_VECTOR_CAN: u16 = 19;

fn read_u16(data: &[u8], offset: usize) -> u16 {
    LittleEndian::read_u16(&data[offset..offset + 2])
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    LittleEndian::read_u32(&data[offset..offset + 4])
}

fn read_f64(data: &[u8], offset: usize) -> f64 {
    LittleEndian::read_f64(&data[offset..offset + 8])
}

fn read_link(data: &[u8], offset: usize) -> Link {
    read_u32(data, offset)
}

/// Fixed-width string field: ends at the first NUL or the declared width
fn read_str(data: &[u8], offset: usize, width: usize) -> String {
    let bytes = &data[offset..offset + width];
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(width);
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// Identification block at offset 0
pub struct IdBlock<'a> {
    data: &'a [u8],
}

impl<'a> IdBlock<'a> {
    pub const SIZE: usize = 64;

    /// Standard-flags bit: record counters must be recomputed, not trusted
    pub const FLAG_UPDATE_RECORD_COUNTERS: u16 = 1 << 0;

    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn file_identifier(&self) -> String {
        read_str(self.data, 0, 8)
    }

    pub fn format_identifier(&self) -> String {
        read_str(self.data, 8, 8)
    }

    pub fn program_identifier(&self) -> String {
        read_str(self.data, 16, 8)
    }

    /// Default byte order for signal data: 0 = Intel, anything else = Motorola
    pub fn byte_order(&self) -> u16 {
        read_u16(self.data, 24)
    }

    pub fn float_format(&self) -> u16 {
        read_u16(self.data, 26)
    }

    /// Format version, e.g. 212, 300, 330
    pub fn version_number(&self) -> u16 {
        read_u16(self.data, 28)
    }

    pub fn code_page(&self) -> u16 {
        read_u16(self.data, 30)
    }

    pub fn standard_flags(&self) -> u16 {
        read_u16(self.data, 60)
    }

    pub fn custom_flags(&self) -> u16 {
        read_u16(self.data, 62)
    }
}

/// Header block at offset 64, root of the data-group chain
pub struct HdBlock<'a> {
    data: &'a [u8],
}

impl<'a> HdBlock<'a> {
    pub const SIZE: usize = 164;

    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn first_data_group_link(&self) -> Link {
        read_link(self.data, 4)
    }

    pub fn comment_link(&self) -> Link {
        read_link(self.data, 8)
    }

    pub fn program_link(&self) -> Link {
        read_link(self.data, 12)
    }

    pub fn number_of_data_groups(&self) -> u16 {
        read_u16(self.data, 16)
    }

    pub fn date(&self) -> String {
        read_str(self.data, 18, 10)
    }

    pub fn time(&self) -> String {
        read_str(self.data, 28, 8)
    }

    pub fn author(&self) -> String {
        read_str(self.data, 36, 32)
    }

    pub fn organization(&self) -> String {
        read_str(self.data, 68, 32)
    }

    pub fn project(&self) -> String {
        read_str(self.data, 100, 32)
    }

    pub fn subject(&self) -> String {
        read_str(self.data, 132, 32)
    }
}

/// Data group block: groups channel groups sharing one record stream
pub struct DgBlock<'a> {
    data: &'a [u8],
}

impl<'a> DgBlock<'a> {
    pub const SIZE: usize = 28;

    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn next_link(&self) -> Link {
        read_link(self.data, 4)
    }

    pub fn first_channel_group_link(&self) -> Link {
        read_link(self.data, 8)
    }

    pub fn trigger_link(&self) -> Link {
        read_link(self.data, 12)
    }

    /// Link to the raw record stream for this group's records
    pub fn data_records_link(&self) -> Link {
        read_link(self.data, 16)
    }

    pub fn number_of_channel_groups(&self) -> u16 {
        read_u16(self.data, 20)
    }

    /// Leading record-ID bytes per record: 0, 1 or 2
    pub fn number_of_record_ids(&self) -> u16 {
        read_u16(self.data, 22)
    }

    /// Iterate the channel groups of this data group
    pub fn channel_groups(&self, file: &'a MdfFile) -> ChannelGroups<'a> {
        ChannelGroups {
            file,
            next: self.first_channel_group_link(),
        }
    }
}

/// Channel group block: one record layout shared by a set of channels
pub struct CgBlock<'a> {
    data: &'a [u8],
}

impl<'a> CgBlock<'a> {
    pub const SIZE: usize = 26;

    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn next_link(&self) -> Link {
        read_link(self.data, 4)
    }

    pub fn first_channel_link(&self) -> Link {
        read_link(self.data, 8)
    }

    pub fn comment_link(&self) -> Link {
        read_link(self.data, 12)
    }

    pub fn record_id(&self) -> u16 {
        read_u16(self.data, 16)
    }

    pub fn number_of_channels(&self) -> u16 {
        read_u16(self.data, 18)
    }

    /// Bytes per record, including any leading record-ID byte(s)
    pub fn record_size(&self) -> u16 {
        read_u16(self.data, 20)
    }

    pub fn number_of_records(&self) -> u32 {
        read_u32(self.data, 22)
    }

    /// Iterate the channels of this group
    pub fn channels(&self, file: &'a MdfFile) -> Channels<'a> {
        Channels {
            file,
            next: self.first_channel_link(),
        }
    }
}

/// Channel block: one signal's decoding descriptor within a record
pub struct CnBlock<'a> {
    data: &'a [u8],
}

impl<'a> CnBlock<'a> {
    pub const SIZE: usize = 228;

    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn next_link(&self) -> Link {
        read_link(self.data, 4)
    }

    pub fn conversion_link(&self) -> Link {
        read_link(self.data, 8)
    }

    pub fn extension_link(&self) -> Link {
        read_link(self.data, 12)
    }

    pub fn dependency_link(&self) -> Link {
        read_link(self.data, 16)
    }

    pub fn comment_link(&self) -> Link {
        read_link(self.data, 20)
    }

    /// 0 = data channel, 1 = time channel
    pub fn channel_type(&self) -> u16 {
        read_u16(self.data, 24)
    }

    /// Inline fixed-width signal name
    pub fn short_name(&self) -> String {
        read_str(self.data, 26, 32)
    }

    pub fn description(&self) -> String {
        read_str(self.data, 58, 128)
    }

    /// Absolute bit position of the signal within the record payload
    pub fn first_bit(&self) -> u16 {
        read_u16(self.data, 186)
    }

    pub fn number_of_bits(&self) -> u16 {
        read_u16(self.data, 188)
    }

    pub fn signal_data_type(&self) -> u16 {
        read_u16(self.data, 190)
    }

    pub fn value_range_valid(&self) -> bool {
        read_u16(self.data, 192) != 0
    }

    pub fn min_value(&self) -> f64 {
        read_f64(self.data, 194)
    }

    pub fn max_value(&self) -> f64 {
        read_f64(self.data, 202)
    }

    pub fn sample_rate(&self) -> f64 {
        read_f64(self.data, 210)
    }

    /// Link to the long (ASAM) name text block, meaningful for version >= 212
    pub fn long_name_link(&self) -> Link {
        read_link(self.data, 218)
    }

    pub fn display_name_link(&self) -> Link {
        read_link(self.data, 222)
    }

    /// Extra byte offset added to the bit-field position for version >= 300
    pub fn additional_byte_offset(&self) -> u16 {
        read_u16(self.data, 226)
    }

    /// Resolve the channel's long name
    ///
    /// For format version >= 212 the linked ASAM name text block wins; if it
    /// is absent or unresolved, the inline fixed-width name is used.
    pub fn long_name(&self, file: &MdfFile) -> String {
        if file.version() >= 212 {
            if let Some(tx) = file.text(self.long_name_link()) {
                return tx.text();
            }
        }
        self.short_name()
    }

    /// Resolve message metadata from the channel's extension block
    ///
    /// An absent or unresolved extension link yields the default info.
    pub fn message_info(&self, file: &MdfFile) -> MessageInfo {
        match file.extension(self.extension_link()) {
            Some(ce) => ce.message_info(),
            None => MessageInfo::default(),
        }
    }
}

/// Channel extension block: message metadata supplement
pub struct CeBlock<'a> {
    data: &'a [u8],
}

impl<'a> CeBlock<'a> {
    pub const SIZE: usize = 128;

    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn extension_type(&self) -> u16 {
        read_u16(self.data, 4)
    }

    /// Message name / CAN id / CAN channel, dispatched on the extension type
    pub fn message_info(&self) -> MessageInfo {
        match self.extension_type() {
            EXTENSION_TYPE_VECTOR_CAN => MessageInfo {
                message_name: read_str(self.data, 14, 36),
                can_id: read_u32(self.data, 6),
                can_channel: read_u32(self.data, 10),
            },
            EXTENSION_TYPE_DIM => MessageInfo {
                message_name: read_str(self.data, 10, 80),
                ..MessageInfo::default()
            },
            _ => MessageInfo::default(),
        }
    }

    /// Sender node name (Vector CAN supplement only)
    pub fn sender_name(&self) -> Option<String> {
        if self.extension_type() == EXTENSION_TYPE_VECTOR_CAN {
            Some(read_str(self.data, 50, 36))
        } else {
            None
        }
    }
}

/// Message metadata resolved from a channel extension block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageInfo {
    pub message_name: String,
    pub can_id: u32,
    pub can_channel: u32,
}

impl Default for MessageInfo {
    fn default() -> Self {
        Self {
            message_name: "(undef)".to_string(),
            can_id: 0,
            can_channel: 0,
        }
    }
}

/// Conversion formula block
///
/// The fixed head is followed by a parameter area whose shape depends on the
/// conversion type; the parameter accessors validate their own extent, so a
/// truncated block surfaces as a malformed-conversion error rather than an
/// out-of-range read.
pub struct CcBlock<'a> {
    data: &'a [u8],
}

impl<'a> CcBlock<'a> {
    pub const MIN_SIZE: usize = 46;

    const PARAMS_OFFSET: usize = 46;

    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn physical_range_valid(&self) -> bool {
        read_u16(self.data, 4) != 0
    }

    pub fn min_value(&self) -> f64 {
        read_f64(self.data, 6)
    }

    pub fn max_value(&self) -> f64 {
        read_f64(self.data, 14)
    }

    /// Physical unit, trimmed of padding
    pub fn unit(&self) -> String {
        read_str(self.data, 22, 20).trim_end().to_string()
    }

    pub fn conversion_type(&self) -> u16 {
        read_u16(self.data, 42)
    }

    /// Table length for tabular formulas
    pub fn size_information(&self) -> u16 {
        read_u16(self.data, 44)
    }

    fn param(&self, index: usize) -> Result<f64> {
        let offset = Self::PARAMS_OFFSET + index * 8;
        if offset + 8 > self.data.len() {
            return Err(DecodeError::MalformedConversion(format!(
                "parameter {} outside block extent",
                index
            )));
        }
        Ok(read_f64(self.data, offset))
    }

    /// Linear formula parameters `(p1, p2)` where `phys = raw * p2 + p1`
    pub fn linear_params(&self) -> Result<(f64, f64)> {
        Ok((self.param(0)?, self.param(1)?))
    }

    /// Rational formula parameters `p1..p6`
    pub fn rational_params(&self) -> Result<[f64; 6]> {
        Ok([
            self.param(0)?,
            self.param(1)?,
            self.param(2)?,
            self.param(3)?,
            self.param(4)?,
            self.param(5)?,
        ])
    }

    /// Tabular formula entries as `(int_value, phys_value)` pairs
    ///
    /// An empty or truncated table is malformed.
    pub fn table_pairs(&self) -> Result<Vec<(f64, f64)>> {
        let count = self.size_information() as usize;
        if count == 0 {
            return Err(DecodeError::MalformedConversion(
                "tabular conversion with empty table".to_string(),
            ));
        }

        let mut pairs = Vec::with_capacity(count);
        for i in 0..count {
            pairs.push((self.param(2 * i)?, self.param(2 * i + 1)?));
        }
        Ok(pairs)
    }
}

/// Text block: a NUL-terminated string
pub struct TxBlock<'a> {
    data: &'a [u8],
}

impl<'a> TxBlock<'a> {
    pub const MIN_SIZE: usize = 5;

    const TEXT_OFFSET: usize = 4;

    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn declared_size(&self) -> u16 {
        read_u16(self.data, 2)
    }

    /// The text payload, capped at the declared block size and the region end
    pub fn text(&self) -> String {
        text_payload(self.data, self.declared_size())
    }
}

/// Program block: program-specific data, text-shaped
pub struct PrBlock<'a> {
    data: &'a [u8],
}

impl<'a> PrBlock<'a> {
    pub const MIN_SIZE: usize = 5;

    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn declared_size(&self) -> u16 {
        read_u16(self.data, 2)
    }

    pub fn program_data(&self) -> String {
        text_payload(self.data, self.declared_size())
    }
}

fn text_payload(data: &[u8], declared_size: u16) -> String {
    let end = (declared_size as usize).min(data.len());
    if end <= TxBlock::TEXT_OFFSET {
        return String::new();
    }
    let bytes = &data[TxBlock::TEXT_OFFSET..end];
    let nul = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..nul]).into_owned()
}

/// Typed block getters: each composes the navigator's resolve primitive
impl MdfFile {
    pub fn data_group(&self, link: Link) -> Option<DgBlock<'_>> {
        self.resolve(link, DgBlock::SIZE).map(DgBlock::new)
    }

    pub fn channel_group(&self, link: Link) -> Option<CgBlock<'_>> {
        self.resolve(link, CgBlock::SIZE).map(CgBlock::new)
    }

    pub fn channel(&self, link: Link) -> Option<CnBlock<'_>> {
        self.resolve(link, CnBlock::SIZE).map(CnBlock::new)
    }

    pub fn conversion(&self, link: Link) -> Option<CcBlock<'_>> {
        self.resolve(link, CcBlock::MIN_SIZE).map(CcBlock::new)
    }

    pub fn extension(&self, link: Link) -> Option<CeBlock<'_>> {
        self.resolve(link, CeBlock::SIZE).map(CeBlock::new)
    }

    pub fn text(&self, link: Link) -> Option<TxBlock<'_>> {
        self.resolve(link, TxBlock::MIN_SIZE).map(TxBlock::new)
    }

    pub fn program(&self, link: Link) -> Option<PrBlock<'_>> {
        self.resolve(link, PrBlock::MIN_SIZE).map(PrBlock::new)
    }

    /// Iterate the data-group chain rooted at the header block
    pub fn data_groups(&self) -> DataGroups<'_> {
        let first = self
            .header_block()
            .map(|hd| hd.first_data_group_link())
            .unwrap_or(0);
        DataGroups { file: self, next: first }
    }
}

/// Iterator over the null-terminated data-group chain
pub struct DataGroups<'a> {
    file: &'a MdfFile,
    next: Link,
}

impl<'a> Iterator for DataGroups<'a> {
    type Item = DgBlock<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let dg = self.file.data_group(self.next)?;
        self.next = dg.next_link();
        Some(dg)
    }
}

/// Iterator over the channel groups of one data group
pub struct ChannelGroups<'a> {
    file: &'a MdfFile,
    next: Link,
}

impl<'a> Iterator for ChannelGroups<'a> {
    type Item = CgBlock<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let cg = self.file.channel_group(self.next)?;
        self.next = cg.next_link();
        Some(cg)
    }
}

/// Iterator over the channel linked list of one channel group
pub struct Channels<'a> {
    file: &'a MdfFile,
    next: Link,
}

impl<'a> Iterator for Channels<'a> {
    type Item = CnBlock<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let cn = self.file.channel(self.next)?;
        self.next = cn.next_link();
        Some(cn)
    }
}
