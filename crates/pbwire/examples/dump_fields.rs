//! Scans an encoded message and prints its raw field layout.
//!
//! Run with: cargo run --example dump_fields

use pbwire::{DecodeError, EncodeError, FieldIndex, Message, MessageReader, MessageWriter};

struct Sample {
    id: u64,
    label: String,
    readings: Vec<i32>,
}

impl Message for Sample {
    fn encode_fields(&self, w: &mut MessageWriter<'_>) -> Result<(), EncodeError> {
        w.write_uint64(1, self.id)?;
        w.write_string(2, &self.label)?;
        w.write_packed_int32(3, &self.readings)
    }

    fn decode_fields(r: &MessageReader<'_>) -> Result<Self, DecodeError> {
        Ok(Sample {
            id: r.read_uint64(1)?,
            label: r.read_string(2)?,
            readings: r.read_repeated_int32(3)?,
        })
    }
}

fn main() {
    let sample = Sample {
        id: 7,
        label: "sensor-a".to_string(),
        readings: vec![-3, 0, 150],
    };

    let bytes = pbwire::encode(&sample).expect("encode");
    println!("encoded {} bytes: {:02x?}", bytes.len(), bytes);

    let index = FieldIndex::scan(&bytes).expect("scan");
    for raw in index.iter() {
        let payload = index.bytes(raw);
        println!(
            "field {:>3}  {:17}  {} byte(s)  {:02x?}",
            raw.number,
            raw.wire_type.to_string(),
            payload.len(),
            payload
        );
    }

    let decoded: Sample = pbwire::decode(&bytes).expect("decode");
    println!(
        "decoded: id={} label={:?} readings={:?}",
        decoded.id, decoded.label, decoded.readings
    );
}
