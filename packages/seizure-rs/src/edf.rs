// EDF (European Data Format) file reader/writer implementation
// Specification: https://www.edfplus.info/specs/edf.html

use crate::error::{Result, SeizureError};
use crate::segment::offset_to_datetime;
use crate::types::Recording;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rayon::prelude::*;
use std::io::{Cursor, Read, Seek, SeekFrom, Write};
use std::str::FromStr;

/// Label of the EDF+ annotation signal, which carries no samples
pub const ANNOTATION_LABEL: &str = "EDF Annotations";

const MAIN_HEADER_BYTES: usize = 256;
const SIGNAL_HEADER_BYTES: usize = 256;
const NUM_RECORDS_OFFSET: u64 = 236;

#[derive(Debug, Clone)]
pub struct EDFHeader {
    pub version: String,              // 8 bytes: version of this data format (0)
    pub patient_id: String,           // 80 bytes: local patient identification
    pub recording_id: String,         // 80 bytes: local recording identification
    pub start_date: String,           // 8 bytes: startdate of recording (dd.mm.yy)
    pub start_time: String,           // 8 bytes: starttime of recording (hh.mm.ss)
    pub header_bytes: usize,          // 8 bytes: number of bytes in header record
    pub reserved: String,             // 44 bytes: reserved
    pub num_data_records: i64,        // 8 bytes: number of data records (-1 if unknown)
    pub duration_of_data_record: f64, // 8 bytes: duration of a data record, in seconds
    pub num_signals: usize,           // 4 bytes: number of signals (channels)
}

#[derive(Debug, Clone)]
pub struct EDFSignalHeader {
    pub label: String,                 // 16 bytes: label (e.g. EEG Fpz-Cz)
    pub transducer_type: String,       // 80 bytes: transducer type (e.g. AgAgCl electrode)
    pub physical_dimension: String,    // 8 bytes: physical dimension (e.g. uV)
    pub physical_minimum: f64,         // 8 bytes: physical minimum
    pub physical_maximum: f64,         // 8 bytes: physical maximum
    pub digital_minimum: i64,          // 8 bytes: digital minimum
    pub digital_maximum: i64,          // 8 bytes: digital maximum
    pub prefiltering: String,          // 80 bytes: prefiltering
    pub num_samples_per_record: usize, // 8 bytes: number of samples in each data record
    pub reserved: String,              // 32 bytes: reserved
}

impl EDFSignalHeader {
    /// Microvolt channel spanning the full 16-bit digital range
    pub fn eeg(label: &str, physical_minimum: f64, physical_maximum: f64, num_samples: usize) -> Self {
        Self {
            label: label.to_string(),
            transducer_type: String::new(),
            physical_dimension: "uV".to_string(),
            physical_minimum,
            physical_maximum,
            digital_minimum: i16::MIN as i64,
            digital_maximum: i16::MAX as i64,
            prefiltering: String::new(),
            num_samples_per_record: num_samples,
            reserved: String::new(),
        }
    }

    pub fn sample_frequency(&self, record_duration: f64) -> f64 {
        self.num_samples_per_record as f64 / record_duration
    }

    pub fn gain(&self) -> f64 {
        (self.physical_maximum - self.physical_minimum)
            / (self.digital_maximum - self.digital_minimum) as f64
    }

    pub fn offset(&self) -> f64 {
        self.physical_maximum - self.gain() * self.digital_maximum as f64
    }

    pub fn is_annotation(&self) -> bool {
        self.label == ANNOTATION_LABEL
    }
}

fn invalid(message: impl Into<String>) -> SeizureError {
    SeizureError::InvalidEdf(message.into())
}

fn parse_field<T: FromStr>(value: &str, field: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| invalid(format!("Invalid {} '{}': {}", field, value, e)))
}

/// Parses the `dd.mm.yy` / `hh.mm.ss` header pair.
///
/// Two-digit years 85-99 belong to the 1900s, everything else to the 2000s.
pub fn parse_edf_datetime(start_date: &str, start_time: &str) -> Option<NaiveDateTime> {
    let date: Vec<u32> = start_date
        .trim()
        .split('.')
        .map(|part| part.trim().parse::<u32>())
        .collect::<std::result::Result<_, _>>()
        .ok()?;
    let time: Vec<u32> = start_time
        .trim()
        .split(|c| c == '.' || c == ':')
        .map(|part| part.trim().parse::<u32>())
        .collect::<std::result::Result<_, _>>()
        .ok()?;

    if date.len() != 3 || time.len() != 3 {
        return None;
    }

    let year = if date[2] >= 85 { 1900 + date[2] } else { 2000 + date[2] };
    let day = NaiveDate::from_ymd_opt(year as i32, date[1], date[0])?;
    let clock = NaiveTime::from_hms_opt(time[0], time[1], time[2])?;
    Some(NaiveDateTime::new(day, clock))
}

pub struct EDFReader<R> {
    reader: R,
    pub header: EDFHeader,
    pub signal_headers: Vec<EDFSignalHeader>,
    data_start_offset: u64,
    record_size: usize,
}

impl<R: Read + Seek> EDFReader<R> {
    pub fn new(mut reader: R) -> Result<Self> {
        // Read main header (256 bytes)
        let mut header = Self::read_header(&mut reader)?;

        let expected_header_bytes = MAIN_HEADER_BYTES + header.num_signals * SIGNAL_HEADER_BYTES;
        if header.header_bytes < expected_header_bytes {
            return Err(invalid(format!(
                "Header declares {} bytes but {} signals need {}",
                header.header_bytes, header.num_signals, expected_header_bytes
            )));
        }

        // Read signal headers
        let signal_headers = Self::read_signal_headers(&mut reader, header.num_signals)?;

        // Each sample is 2 bytes / 16 bits
        let record_size: usize = signal_headers
            .iter()
            .map(|sh| sh.num_samples_per_record * 2)
            .sum();

        let data_start_offset = header.header_bytes as u64;
        let total_len = reader.seek(SeekFrom::End(0))?;
        let available_records = if record_size == 0 {
            0
        } else {
            (total_len.saturating_sub(data_start_offset) / record_size as u64) as i64
        };

        if header.num_data_records < 0 {
            header.num_data_records = available_records;
        } else if header.num_data_records > available_records {
            log::warn!(
                "EDF header declares {} data records but only {} are present",
                header.num_data_records,
                available_records
            );
            header.num_data_records = available_records;
        }

        Ok(Self {
            reader,
            header,
            signal_headers,
            data_start_offset,
            record_size,
        })
    }

    fn read_fixed_string(reader: &mut R, size: usize) -> Result<String> {
        let mut buffer = vec![0u8; size];
        reader
            .read_exact(&mut buffer)
            .map_err(|e| invalid(format!("Truncated header: {}", e)))?;
        Ok(String::from_utf8_lossy(&buffer).trim().to_string())
    }

    fn read_header(reader: &mut R) -> Result<EDFHeader> {
        let version = Self::read_fixed_string(reader, 8)?;
        let patient_id = Self::read_fixed_string(reader, 80)?;
        let recording_id = Self::read_fixed_string(reader, 80)?;
        let start_date = Self::read_fixed_string(reader, 8)?;
        let start_time = Self::read_fixed_string(reader, 8)?;
        let header_bytes = parse_field(&Self::read_fixed_string(reader, 8)?, "header bytes")?;
        let reserved = Self::read_fixed_string(reader, 44)?;
        let num_data_records =
            parse_field(&Self::read_fixed_string(reader, 8)?, "number of data records")?;
        let duration_of_data_record =
            parse_field(&Self::read_fixed_string(reader, 8)?, "duration")?;
        let num_signals = parse_field(&Self::read_fixed_string(reader, 4)?, "number of signals")?;

        log::debug!(
            "EDF header parsed: num_data_records={}, duration_of_data_record={}, num_signals={}",
            num_data_records,
            duration_of_data_record,
            num_signals
        );

        Ok(EDFHeader {
            version,
            patient_id,
            recording_id,
            start_date,
            start_time,
            header_bytes,
            reserved,
            num_data_records,
            duration_of_data_record,
            num_signals,
        })
    }

    // Signal header fields are stored column-wise: every label, then every transducer, ...
    fn read_column(reader: &mut R, num_signals: usize, size: usize) -> Result<Vec<String>> {
        (0..num_signals)
            .map(|_| Self::read_fixed_string(reader, size))
            .collect()
    }

    fn parse_column<T: FromStr>(values: Vec<String>, field: &str) -> Result<Vec<T>>
    where
        T::Err: std::fmt::Display,
    {
        values.iter().map(|v| parse_field(v, field)).collect()
    }

    fn read_signal_headers(reader: &mut R, num_signals: usize) -> Result<Vec<EDFSignalHeader>> {
        let labels = Self::read_column(reader, num_signals, 16)?;
        let transducer_types = Self::read_column(reader, num_signals, 80)?;
        let physical_dimensions = Self::read_column(reader, num_signals, 8)?;
        let physical_minimums: Vec<f64> =
            Self::parse_column(Self::read_column(reader, num_signals, 8)?, "physical minimum")?;
        let physical_maximums: Vec<f64> =
            Self::parse_column(Self::read_column(reader, num_signals, 8)?, "physical maximum")?;
        let digital_minimums: Vec<i64> =
            Self::parse_column(Self::read_column(reader, num_signals, 8)?, "digital minimum")?;
        let digital_maximums: Vec<i64> =
            Self::parse_column(Self::read_column(reader, num_signals, 8)?, "digital maximum")?;
        let prefilterings = Self::read_column(reader, num_signals, 80)?;
        let num_samples_per_records: Vec<usize> =
            Self::parse_column(Self::read_column(reader, num_signals, 8)?, "number of samples")?;
        let reserveds = Self::read_column(reader, num_signals, 32)?;

        let mut signal_headers = Vec::with_capacity(num_signals);
        for i in 0..num_signals {
            signal_headers.push(EDFSignalHeader {
                label: labels[i].clone(),
                transducer_type: transducer_types[i].clone(),
                physical_dimension: physical_dimensions[i].clone(),
                physical_minimum: physical_minimums[i],
                physical_maximum: physical_maximums[i],
                digital_minimum: digital_minimums[i],
                digital_maximum: digital_maximums[i],
                prefiltering: prefilterings[i].clone(),
                num_samples_per_record: num_samples_per_records[i],
                reserved: reserveds[i].clone(),
            });
        }

        Ok(signal_headers)
    }

    pub fn num_records(&self) -> usize {
        self.header.num_data_records.max(0) as usize
    }

    /// Index of the first signal that carries samples
    pub fn first_data_channel(&self) -> Option<usize> {
        self.signal_headers
            .iter()
            .position(|sh| !sh.is_annotation() && sh.num_samples_per_record > 0)
    }

    pub fn start_datetime(&self) -> Option<NaiveDateTime> {
        parse_edf_datetime(&self.header.start_date, &self.header.start_time)
    }

    pub fn read_record(&mut self, record_index: usize) -> Result<Vec<Vec<i16>>> {
        if record_index >= self.num_records() {
            return Err(invalid(format!(
                "Record index {} out of bounds ({} records)",
                record_index,
                self.num_records()
            )));
        }

        let record_offset = self.data_start_offset + (record_index * self.record_size) as u64;
        self.reader.seek(SeekFrom::Start(record_offset))?;

        let mut signals = Vec::with_capacity(self.signal_headers.len());
        for signal_header in &self.signal_headers {
            let mut buf = vec![0u8; signal_header.num_samples_per_record * 2];
            self.reader
                .read_exact(&mut buf)
                .map_err(|e| invalid(format!("Truncated data record {}: {}", record_index, e)))?;
            signals.push(
                buf.chunks_exact(2)
                    .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
                    .collect(),
            );
        }

        Ok(signals)
    }

    /// Reads every sample of one signal, scaled to physical units
    pub fn read_physical_signal(&mut self, signal_index: usize) -> Result<Vec<f64>> {
        let signal_header = self
            .signal_headers
            .get(signal_index)
            .ok_or_else(|| invalid(format!("Signal index {} out of bounds", signal_index)))?;

        let offset_in_record: usize = self.signal_headers[..signal_index]
            .iter()
            .map(|sh| sh.num_samples_per_record * 2)
            .sum();
        let gain = signal_header.gain();
        let offset = signal_header.offset();
        let samples_per_record = signal_header.num_samples_per_record;
        if self.num_records() == 0 || samples_per_record == 0 {
            return Ok(Vec::new());
        }

        let mut result = Vec::with_capacity(self.num_records() * samples_per_record);
        let mut buf = vec![0u8; samples_per_record * 2];
        for record_idx in 0..self.num_records() {
            let position =
                self.data_start_offset + (record_idx * self.record_size + offset_in_record) as u64;
            self.reader.seek(SeekFrom::Start(position))?;
            self.reader
                .read_exact(&mut buf)
                .map_err(|e| invalid(format!("Truncated data record {}: {}", record_idx, e)))?;
            result.extend(
                buf.chunks_exact(2)
                    .map(|pair| gain * i16::from_le_bytes([pair[0], pair[1]]) as f64 + offset),
            );
        }

        Ok(result)
    }

    pub fn total_duration(&self) -> f64 {
        self.num_records() as f64 * self.header.duration_of_data_record
    }
}

/// Decodes the first data channel of an EDF stream
pub fn load_recording<R: Read + Seek>(source: R) -> Result<Recording> {
    let mut edf = EDFReader::new(source)?;

    let channel = edf
        .first_data_channel()
        .ok_or_else(|| invalid("File contains no data channels"))?;
    let record_duration = edf.header.duration_of_data_record;
    if !record_duration.is_finite() || record_duration <= 0.0 {
        return Err(invalid(format!(
            "Data record duration must be a positive number, got {}",
            record_duration
        )));
    }

    let signal_header = &edf.signal_headers[channel];
    if signal_header.digital_maximum <= signal_header.digital_minimum {
        return Err(invalid(format!(
            "Signal '{}' has an empty digital range",
            signal_header.label
        )));
    }
    let channel_label = signal_header.label.clone();
    let sample_rate = signal_header.sample_frequency(record_duration);

    let signal = edf.read_physical_signal(channel)?;
    let times: Vec<f64> = (0..signal.len()).map(|i| i as f64 / sample_rate).collect();
    let meas_start = edf.start_datetime();
    if let (Some(start), Some(&last)) = (meas_start, times.last()) {
        if offset_to_datetime(start, last).is_none() {
            return Err(invalid(format!(
                "Recording of {} s starting {} ends outside the supported date range",
                last, start
            )));
        }
    }

    log::debug!(
        "Loaded channel '{}': {} samples at {} Hz, start {:?}",
        channel_label,
        signal.len(),
        sample_rate,
        meas_start
    );

    Ok(Recording {
        channel_label,
        signal,
        times,
        sample_rate,
        meas_start,
    })
}

pub fn load_recording_from_bytes(bytes: &[u8]) -> Result<Recording> {
    load_recording(Cursor::new(bytes))
}

pub struct EDFWriter<W> {
    writer: W,
    header: EDFHeader,
    signal_headers: Vec<EDFSignalHeader>,
}

impl<W: Write + Seek> EDFWriter<W> {
    pub fn new(
        writer: W,
        patient_id: String,
        recording_id: String,
        start: Option<NaiveDateTime>,
        duration_of_data_record: f64,
        signal_headers: Vec<EDFSignalHeader>,
    ) -> Result<Self> {
        let num_signals = signal_headers.len();
        let (start_date, start_time) = match start {
            Some(ts) => (
                ts.format("%d.%m.%y").to_string(),
                ts.format("%H.%M.%S").to_string(),
            ),
            None => (String::new(), String::new()),
        };

        let header = EDFHeader {
            version: "0".to_string(),
            patient_id,
            recording_id,
            start_date,
            start_time,
            header_bytes: MAIN_HEADER_BYTES + num_signals * SIGNAL_HEADER_BYTES,
            reserved: String::new(),
            num_data_records: -1, // Will be updated when finalized
            duration_of_data_record,
            num_signals,
        };

        let mut writer = Self {
            writer,
            header,
            signal_headers,
        };

        writer.write_header()?;
        Ok(writer)
    }

    fn write_fixed_string(&mut self, s: &str, size: usize) -> Result<()> {
        let mut buffer = vec![b' '; size];
        let bytes = s.as_bytes();
        let copy_len = bytes.len().min(size);
        buffer[..copy_len].copy_from_slice(&bytes[..copy_len]);
        self.writer.write_all(&buffer)?;
        Ok(())
    }

    fn write_header(&mut self) -> Result<()> {
        let main_fields = [
            (self.header.version.clone(), 8),
            (self.header.patient_id.clone(), 80),
            (self.header.recording_id.clone(), 80),
            (self.header.start_date.clone(), 8),
            (self.header.start_time.clone(), 8),
            (self.header.header_bytes.to_string(), 8),
            (self.header.reserved.clone(), 44),
            (self.header.num_data_records.to_string(), 8),
            (format!("{}", self.header.duration_of_data_record), 8),
            (self.header.num_signals.to_string(), 4),
        ];
        for (value, size) in &main_fields {
            self.write_fixed_string(value, *size)?;
        }

        let signal_headers = self.signal_headers.clone();
        let columns: [(fn(&EDFSignalHeader) -> String, usize); 10] = [
            (|sh| sh.label.clone(), 16),
            (|sh| sh.transducer_type.clone(), 80),
            (|sh| sh.physical_dimension.clone(), 8),
            (|sh| sh.physical_minimum.to_string(), 8),
            (|sh| sh.physical_maximum.to_string(), 8),
            (|sh| sh.digital_minimum.to_string(), 8),
            (|sh| sh.digital_maximum.to_string(), 8),
            (|sh| sh.prefiltering.clone(), 80),
            (|sh| sh.num_samples_per_record.to_string(), 8),
            (|sh| sh.reserved.clone(), 32),
        ];
        for (field, size) in columns {
            for sh in &signal_headers {
                self.write_fixed_string(&field(sh), size)?;
            }
        }

        Ok(())
    }

    pub fn write_physical_record(&mut self, physical_data: &[Vec<f64>]) -> Result<()> {
        if physical_data.len() != self.signal_headers.len() {
            return Err(SeizureError::InvalidParameter(format!(
                "Expected {} signals, got {}",
                self.signal_headers.len(),
                physical_data.len()
            )));
        }

        // Parallel conversion of physical to digital, then sequential write
        let digital_data: Result<Vec<Vec<i16>>> = physical_data
            .par_iter()
            .enumerate()
            .map(|(signal_idx, physical_samples)| {
                let signal_header = &self.signal_headers[signal_idx];

                if physical_samples.len() != signal_header.num_samples_per_record {
                    return Err(SeizureError::InvalidParameter(format!(
                        "Signal {} expected {} samples, got {}",
                        signal_idx,
                        signal_header.num_samples_per_record,
                        physical_samples.len()
                    )));
                }

                let gain = signal_header.gain();
                let offset = signal_header.offset();
                let (dmin, dmax) = (
                    signal_header.digital_minimum as f64,
                    signal_header.digital_maximum as f64,
                );

                Ok(physical_samples
                    .iter()
                    .map(|&physical| ((physical - offset) / gain).round().clamp(dmin, dmax) as i16)
                    .collect())
            })
            .collect();

        for digital_samples in digital_data? {
            for digital in digital_samples {
                self.writer.write_all(&digital.to_le_bytes())?;
            }
        }

        Ok(())
    }

    /// Patches the record count into the header and hands back the sink
    pub fn finalize(mut self, num_records_written: i64) -> Result<W> {
        self.writer.seek(SeekFrom::Start(NUM_RECORDS_OFFSET))?;
        self.write_fixed_string(&num_records_written.to_string(), 8)?;
        self.writer.seek(SeekFrom::End(0))?;
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Builds a single-channel EDF in memory, one record per second of `signal`
pub fn write_single_channel(
    label: &str,
    signal: &[f64],
    sample_rate: usize,
    start: Option<NaiveDateTime>,
) -> Result<Vec<u8>> {
    if sample_rate == 0 || signal.len() % sample_rate != 0 {
        return Err(SeizureError::InvalidParameter(format!(
            "Signal length {} is not a whole number of {} Hz records",
            signal.len(),
            sample_rate
        )));
    }

    let peak = signal.iter().fold(1.0_f64, |acc, v| acc.max(v.abs())).ceil();
    let header = EDFSignalHeader::eeg(label, -peak, peak, sample_rate);
    let mut writer = EDFWriter::new(
        Cursor::new(Vec::new()),
        "X X X X".to_string(),
        "Startdate X X X X".to_string(),
        start,
        1.0,
        vec![header],
    )?;

    let mut records = 0;
    for chunk in signal.chunks(sample_rate) {
        writer.write_physical_record(&[chunk.to_vec()])?;
        records += 1;
    }

    Ok(writer.finalize(records)?.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_signal_header_calculations() {
        let header = EDFSignalHeader {
            label: "Test".to_string(),
            transducer_type: "".to_string(),
            physical_dimension: "uV".to_string(),
            physical_minimum: -100.0,
            physical_maximum: 100.0,
            digital_minimum: -32768,
            digital_maximum: 32767,
            prefiltering: "".to_string(),
            num_samples_per_record: 256,
            reserved: "".to_string(),
        };

        assert_eq!(header.sample_frequency(1.0), 256.0);
        assert!((header.gain() - 0.00305).abs() < 0.001);
        assert!((header.gain() * 32767.0 + header.offset() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_edf_datetime_century_pivot() {
        let modern = parse_edf_datetime("15.03.24", "10.30.00").unwrap();
        assert_eq!(modern, start());

        let old = parse_edf_datetime("01.01.99", "00.00.01").unwrap();
        assert_eq!(old.format("%Y").to_string(), "1999");

        assert!(parse_edf_datetime("", "").is_none());
        assert!(parse_edf_datetime("31.02.24", "00.00.00").is_none());
        assert!(parse_edf_datetime("yy.mm.dd", "10.30.00").is_none());
    }

    #[test]
    fn test_round_trip_single_channel() {
        let signal: Vec<f64> = (0..512).map(|i| (i as f64 * 0.1).sin() * 50.0).collect();
        let bytes = write_single_channel("EEG Fp1", &signal, 256, Some(start())).unwrap();
        assert_eq!(bytes.len(), 512 + 512 * 2);

        let recording = load_recording_from_bytes(&bytes).unwrap();
        assert_eq!(recording.channel_label, "EEG Fp1");
        assert_eq!(recording.sample_rate, 256.0);
        assert_eq!(recording.len(), 512);
        assert_eq!(recording.meas_start, Some(start()));
        assert_eq!(recording.times[256], 1.0);
        for (decoded, original) in recording.signal.iter().zip(&signal) {
            assert!((decoded - original).abs() < 0.01);
        }
    }

    #[test]
    fn test_unknown_record_count_is_inferred() {
        let signal = vec![1.0; 300];
        let mut writer = EDFWriter::new(
            Cursor::new(Vec::new()),
            String::new(),
            String::new(),
            None,
            1.0,
            vec![EDFSignalHeader::eeg("EEG", -10.0, 10.0, 100)],
        )
        .unwrap();
        for chunk in signal.chunks(100) {
            writer.write_physical_record(&[chunk.to_vec()]).unwrap();
        }
        // Leave the header at -1
        let bytes = writer.finalize(-1).unwrap().into_inner();

        let reader = EDFReader::new(Cursor::new(&bytes[..])).unwrap();
        assert_eq!(reader.num_records(), 3);
        assert_eq!(reader.total_duration(), 3.0);
        assert!(reader.start_datetime().is_none());
    }

    #[test]
    fn test_annotation_channel_is_skipped() {
        let mut annotations = EDFSignalHeader::eeg(ANNOTATION_LABEL, -1.0, 1.0, 8);
        annotations.physical_dimension = String::new();
        let mut writer = EDFWriter::new(
            Cursor::new(Vec::new()),
            String::new(),
            String::new(),
            Some(start()),
            1.0,
            vec![annotations, EDFSignalHeader::eeg("EEG Cz", -100.0, 100.0, 4)],
        )
        .unwrap();
        writer
            .write_physical_record(&[vec![0.0; 8], vec![10.0, 20.0, 30.0, 40.0]])
            .unwrap();
        let bytes = writer.finalize(1).unwrap().into_inner();

        let recording = load_recording_from_bytes(&bytes).unwrap();
        assert_eq!(recording.channel_label, "EEG Cz");
        assert_eq!(recording.len(), 4);
        assert!((recording.signal[2] - 30.0).abs() < 0.01);
    }

    #[test]
    fn test_truncated_header_is_rejected() {
        let err = load_recording_from_bytes(b"0       not an edf").unwrap_err();
        assert!(matches!(err, SeizureError::InvalidEdf(_)));
    }

    #[test]
    fn test_non_numeric_field_is_rejected() {
        let mut bytes = write_single_channel("EEG", &[0.0; 10], 10, None).unwrap();
        bytes[252..256].copy_from_slice(b"abc ");
        let err = load_recording_from_bytes(&bytes).unwrap_err();
        assert!(err.to_string().contains("number of signals"));
    }

    fn with_record_duration(bytes: &mut [u8], duration: &[u8; 8]) {
        bytes[244..252].copy_from_slice(duration);
    }

    #[test]
    fn test_unusable_record_duration_is_rejected() {
        for duration in [b"0       ", b"-1      ", b"inf     ", b"NaN     "] {
            let mut bytes = write_single_channel("EEG", &[0.0; 10], 10, None).unwrap();
            with_record_duration(&mut bytes, duration);
            let err = load_recording_from_bytes(&bytes).unwrap_err();
            assert!(matches!(err, SeizureError::InvalidEdf(_)), "{:?}", duration);
        }
    }

    #[test]
    fn test_recording_past_date_range_is_rejected() {
        let mut bytes = write_single_channel("EEG", &[0.0; 10], 10, Some(start())).unwrap();
        with_record_duration(&mut bytes, b"1e13    ");
        let err = load_recording_from_bytes(&bytes).unwrap_err();
        assert!(err.to_string().contains("supported date range"));

        // Without a start date the offsets stay plain seconds
        let mut undated = write_single_channel("EEG", &[0.0; 10], 10, None).unwrap();
        with_record_duration(&mut undated, b"1e13    ");
        let recording = load_recording_from_bytes(&undated).unwrap();
        assert_eq!(recording.len(), 10);
    }

    #[test]
    fn test_oversized_record_without_data_loads_empty() {
        let mut bytes = write_single_channel("EEG", &[], 10, Some(start())).unwrap();
        assert_eq!(bytes.len(), 512);
        // samples-per-record field of the only signal
        bytes[472..480].copy_from_slice(b"99999999");

        let mut reader = EDFReader::new(Cursor::new(&bytes[..])).unwrap();
        assert_eq!(reader.num_records(), 0);
        assert!(reader.read_physical_signal(0).unwrap().is_empty());
    }
}
