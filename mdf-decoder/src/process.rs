//! Channel-group record processing
//!
//! Walks a channel group's fixed-size records, decodes every channel through
//! the signal decoder and delivers one paired time/value series per channel
//! to a caller-supplied sink. Time channels are decoded first so their series
//! can be shared as the x-axis of every data channel in the group.

use crate::blocks::{CnBlock, Link, CHANNEL_TYPE_DATA, CHANNEL_TYPE_TIME};
use crate::config::DecodeConfig;
use crate::decode::decode_signal;
use crate::file::MdfFile;
use crate::types::{DecodeError, Result};

/// Record count for one channel group, carrying its provenance
///
/// When the identification block flags record counters as untrustworthy, a
/// `Declared` count is discarded (the recount itself is an external
/// collaborator concern; without one the group decodes as empty rather than
/// reading out of range). A `Recomputed` count is the caller's assertion that
/// an external recount happened and is always trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordCount {
    /// Count as stored in the channel group block
    Declared(u32),
    /// Count recomputed externally, trusted even when the file flags
    /// declared counters as stale
    Recomputed(u32),
}

impl RecordCount {
    fn effective(self, file: &MdfFile) -> u32 {
        match self {
            Self::Declared(n) => {
                if file.record_counters_need_recount() {
                    log::warn!(
                        "Record counters flagged for recomputation, discarding declared count {}",
                        n
                    );
                    0
                } else {
                    n
                }
            }
            Self::Recomputed(n) => n,
        }
    }
}

/// One decoded signal series, borrowed for the duration of a sink call
///
/// `samples` holds the paired series laid out `[t0..t_{n-1}, v0..v_{n-1}]`
/// and is `None` only when the record count is 0.
#[derive(Debug)]
pub struct SignalSeries<'a> {
    pub can_channel: u32,
    pub can_id: u32,
    pub record_count: u32,
    pub channel_type: u16,
    pub message_name: String,
    pub signal_name: String,
    pub unit: String,
    pub samples: Option<&'a [f64]>,
}

impl<'a> SignalSeries<'a> {
    /// The time half of the paired series
    pub fn time(&self) -> &'a [f64] {
        match self.samples {
            Some(samples) => &samples[..self.record_count as usize],
            None => &[],
        }
    }

    /// The value half of the paired series
    pub fn values(&self) -> &'a [f64] {
        match self.samples {
            Some(samples) => &samples[self.record_count as usize..],
            None => &[],
        }
    }
}

/// A per-channel decode failure recorded during a group scan
#[derive(Debug)]
pub struct ChannelError {
    pub signal_name: String,
    pub error: DecodeError,
}

/// Outcome of processing one channel group
#[derive(Debug, Default)]
pub struct GroupOutcome {
    /// Channels whose series reached the sink
    pub channels_delivered: usize,
    /// Channels that failed to decode; the scan continued past them
    pub errors: Vec<ChannelError>,
}

/// Outcome of processing a whole file
#[derive(Debug, Default)]
pub struct FileOutcome {
    pub groups_processed: usize,
    pub groups_skipped: usize,
    pub channels_delivered: usize,
    pub errors: Vec<ChannelError>,
}

/// Decode every channel of one sorted channel group
///
/// `first_channel` roots the group's channel linked list, `data_link` the raw
/// record stream of `record_count` records of `record_size` bytes each, the
/// first `record_id_bytes` (0, 1 or 2) of every record being record-ID bytes
/// skipped before the channel bit fields. The sink is invoked once per
/// channel, time channels first; a channel that fails to decode is recorded
/// in the outcome and the scan continues.
pub fn process_group<F>(
    file: &MdfFile,
    first_channel: Link,
    record_count: RecordCount,
    record_id_bytes: u16,
    record_size: u16,
    data_link: Link,
    mut sink: F,
) -> Result<GroupOutcome>
where
    F: FnMut(&MdfFile, &SignalSeries<'_>),
{
    let mut outcome = GroupOutcome::default();

    let record_count = record_count.effective(file);
    if record_count == 0 {
        return Ok(outcome);
    }

    if record_id_bytes > 2 {
        return Err(DecodeError::InvalidRecordLayout(format!(
            "{} record-ID bytes, at most 2 supported",
            record_id_bytes
        )));
    }
    if (record_size as usize) <= record_id_bytes as usize {
        return Err(DecodeError::InvalidRecordLayout(format!(
            "record size {} does not cover {} record-ID byte(s)",
            record_size, record_id_bytes
        )));
    }

    // Validate the whole record stream once; individual records then slice
    // out of this region without further bounds arithmetic.
    let stream_len = record_count as usize * record_size as usize;
    let stream = file.resolve(data_link, stream_len).ok_or_else(|| {
        DecodeError::RecordOutOfRange(format!(
            "record stream of {} bytes unresolved at link {:#x}",
            stream_len, data_link
        ))
    })?;
    let stream = &stream[..stream_len];

    let n = record_count as usize;
    let mut time_value = vec![0.0f64; 2 * n];

    // Time channels first so the shared time half is populated before any
    // data channel's series is delivered.
    for phase in [CHANNEL_TYPE_TIME, CHANNEL_TYPE_DATA] {
        let mut next = first_channel;
        while let Some(cn) = file.channel(next) {
            next = cn.next_link();
            if cn.channel_type() != phase {
                continue;
            }

            let half = if phase == CHANNEL_TYPE_TIME { 0 } else { n };
            match decode_channel_records(
                file,
                &cn,
                stream,
                record_size as usize,
                record_id_bytes as usize,
                &mut time_value[half..half + n],
            ) {
                Ok(()) => {}
                Err(error) => {
                    let signal_name = cn.long_name(file);
                    log::warn!("Channel '{}' failed to decode: {}", signal_name, error);
                    outcome.errors.push(ChannelError { signal_name, error });
                    continue;
                }
            }

            let series = assemble_series(file, &cn, record_count, Some(&time_value));
            sink(file, &series);
            outcome.channels_delivered += 1;
        }
    }

    Ok(outcome)
}

/// Decode all records of one channel into `target`
fn decode_channel_records(
    file: &MdfFile,
    cn: &CnBlock<'_>,
    stream: &[u8],
    record_size: usize,
    record_id_bytes: usize,
    target: &mut [f64],
) -> Result<()> {
    let mut cursor = 0;
    for slot in target.iter_mut() {
        let record = &stream[cursor + record_id_bytes..cursor + record_size];
        *slot = decode_signal(file, cn, record)?;
        cursor += record_size;
    }
    Ok(())
}

/// Resolve a channel's metadata and wrap the shared buffer as a series
fn assemble_series<'a>(
    file: &MdfFile,
    cn: &CnBlock<'_>,
    record_count: u32,
    samples: Option<&'a [f64]>,
) -> SignalSeries<'a> {
    let info = cn.message_info(file);
    let unit = file
        .conversion(cn.conversion_link())
        .map(|cc| cc.unit())
        .unwrap_or_default();

    SignalSeries {
        can_channel: info.can_channel,
        can_id: info.can_id,
        record_count,
        channel_type: cn.channel_type(),
        message_name: info.message_name,
        signal_name: cn.long_name(file),
        unit,
        samples,
    }
}

/// Deliver one channel whose records were already extracted elsewhere
///
/// Companion entry point for pre-separated time/value arrays: packs them as
/// `[time..][values..]`, resolves the same metadata as the group scan and
/// invokes the sink exactly once. No per-record bit decoding happens here.
pub fn process_channel<F>(
    file: &MdfFile,
    channel: &CnBlock<'_>,
    time: &[f64],
    values: &[f64],
    mut sink: F,
) -> Result<()>
where
    F: FnMut(&MdfFile, &SignalSeries<'_>),
{
    if time.len() != values.len() {
        return Err(DecodeError::SeriesLengthMismatch {
            time: time.len(),
            values: values.len(),
        });
    }

    if time.is_empty() {
        let series = assemble_series(file, channel, 0, None);
        sink(file, &series);
        return Ok(());
    }

    let mut time_value = Vec::with_capacity(2 * time.len());
    time_value.extend_from_slice(time);
    time_value.extend_from_slice(values);

    let series = assemble_series(file, channel, time.len() as u32, Some(&time_value));
    sink(file, &series);
    Ok(())
}

/// Decode every sorted channel group of a file
///
/// Walks the data-group chain from the header and processes each group whose
/// data group holds exactly one channel group (a sorted file); unsorted data
/// groups are skipped with a warning. The config's filters gate which series
/// reach the sink; structural failures skip the affected group and the walk
/// continues.
pub fn process_file<F>(file: &MdfFile, config: &DecodeConfig, mut sink: F) -> Result<FileOutcome>
where
    F: FnMut(&MdfFile, &SignalSeries<'_>),
{
    let mut outcome = FileOutcome::default();

    for dg in file.data_groups() {
        if dg.number_of_channel_groups() != 1 {
            log::warn!(
                "Skipping unsorted data group with {} channel groups",
                dg.number_of_channel_groups()
            );
            outcome.groups_skipped += 1;
            continue;
        }

        let cg = match file.channel_group(dg.first_channel_group_link()) {
            Some(cg) => cg,
            None => {
                log::warn!("Skipping data group with unresolved channel group link");
                outcome.groups_skipped += 1;
                continue;
            }
        };

        let mut delivered = 0usize;
        let group_result = process_group(
            file,
            cg.first_channel_link(),
            RecordCount::Declared(cg.number_of_records()),
            dg.number_of_record_ids(),
            cg.record_size(),
            dg.data_records_link(),
            |file, series| {
                if config.should_deliver(series) {
                    sink(file, series);
                    delivered += 1;
                }
            },
        );

        match group_result {
            Ok(group) => {
                outcome.groups_processed += 1;
                outcome.channels_delivered += delivered;
                outcome.errors.extend(group.errors);
            }
            Err(error) => {
                log::warn!("Skipping channel group: {}", error);
                outcome.groups_skipped += 1;
            }
        }
    }

    Ok(outcome)
}
