//! Wall-clock encode/decode benchmark over a synthetic device-reading set.

use std::time::Instant;

use pbwire::{
    DecodeError, Decoder, EncodeError, Encoder, IntWidth, Message, MessageReader, MessageWriter,
};

const DEVICE_COUNT: usize = 10_000;
const READINGS_PER_DEVICE: usize = 32;
const ROUNDS: usize = 10;

#[derive(Debug, Clone, PartialEq)]
struct Reading {
    timestamp: i64,
    value: f64,
    quality: u32,
}

impl Message for Reading {
    fn encode_fields(&self, w: &mut MessageWriter<'_>) -> Result<(), EncodeError> {
        w.write_int64(1, self.timestamp)?;
        w.write_double(2, self.value)?;
        w.write_uint32(3, self.quality)
    }

    fn decode_fields(r: &MessageReader<'_>) -> Result<Self, DecodeError> {
        Ok(Reading {
            timestamp: r.read_int64(1)?,
            value: r.read_double(2)?,
            quality: r.read_uint32(3)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Device {
    id: u64,
    name: String,
    online: bool,
    channel_ids: Vec<i32>,
    readings: Vec<Reading>,
}

impl Message for Device {
    fn encode_fields(&self, w: &mut MessageWriter<'_>) -> Result<(), EncodeError> {
        w.write_uint64(1, self.id)?;
        w.write_string(2, &self.name)?;
        w.write_bool(3, self.online)?;
        w.write_packed_int32(4, &self.channel_ids)?;
        w.write_message_list(5, &self.readings)
    }

    fn decode_fields(r: &MessageReader<'_>) -> Result<Self, DecodeError> {
        Ok(Device {
            id: r.read_uint64(1)?,
            name: r.read_string(2)?,
            online: r.read_bool(3)?,
            channel_ids: r.read_repeated_int32(4)?,
            readings: r.read_message_list(5)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Fleet {
    devices: Vec<Device>,
}

impl Message for Fleet {
    fn encode_fields(&self, w: &mut MessageWriter<'_>) -> Result<(), EncodeError> {
        w.write_message_list(1, &self.devices)
    }

    fn decode_fields(r: &MessageReader<'_>) -> Result<Self, DecodeError> {
        Ok(Fleet {
            devices: r.read_message_list(1)?,
        })
    }
}

fn build_fleet() -> Fleet {
    let devices = (0..DEVICE_COUNT as u64)
        .map(|i| Device {
            id: i,
            name: format!("device-{i:05}"),
            online: i % 3 != 0,
            channel_ids: (0..8).map(|c| (i as i32 * 8 + c) - 4).collect(),
            readings: (0..READINGS_PER_DEVICE as i64)
                .map(|t| Reading {
                    timestamp: 1_700_000_000 + i as i64 * 60 + t,
                    value: (i as f64) * 0.25 + t as f64,
                    quality: (t % 4) as u32,
                })
                .collect(),
        })
        .collect();
    Fleet { devices }
}

fn main() {
    let fleet = build_fleet();
    let encoder = Encoder::new(IntWidth::SixtyFour);
    let decoder = Decoder::new(IntWidth::SixtyFour);

    let bytes = encoder.encode(&fleet).expect("encode");
    println!(
        "fleet: {} devices, {} readings, {} encoded bytes",
        fleet.devices.len(),
        fleet.devices.len() * READINGS_PER_DEVICE,
        bytes.len()
    );

    let start = Instant::now();
    for _ in 0..ROUNDS {
        let encoded = encoder.encode(&fleet).expect("encode");
        std::hint::black_box(encoded);
    }
    let encode_elapsed = start.elapsed();
    let mib = bytes.len() as f64 / (1024.0 * 1024.0);
    println!(
        "encode: {:>8.2?} / round, {:.1} MiB/s",
        encode_elapsed / ROUNDS as u32,
        mib * ROUNDS as f64 / encode_elapsed.as_secs_f64()
    );

    let start = Instant::now();
    let mut decoded = None;
    for _ in 0..ROUNDS {
        decoded = Some(decoder.decode::<Fleet>(&bytes).expect("decode"));
    }
    let decode_elapsed = start.elapsed();
    println!(
        "decode: {:>8.2?} / round, {:.1} MiB/s",
        decode_elapsed / ROUNDS as u32,
        mib * ROUNDS as f64 / decode_elapsed.as_secs_f64()
    );

    assert_eq!(decoded.expect("at least one round"), fleet);
    println!("roundtrip verified");
}
