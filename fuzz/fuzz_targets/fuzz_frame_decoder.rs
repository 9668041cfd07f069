//! Fuzz target: `FrameDecoder::feed` + `PacketDecoder::decode`
//!
//! Drives arbitrary bytes into the streaming frame decoder and decodes
//! every frame it yields. Neither stage may panic, every frame has the
//! configured length, and every point batch has equal-length sequences.
//!
//! cargo fuzz run fuzz_frame_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use oracle_presence::config::FrameConfig;
use oracle_presence::lidar::frame::{FrameDecoder, FrameEvent};
use oracle_presence::lidar::packet::PacketDecoder;

fuzz_target!(|data: &[u8]| {
    let config = FrameConfig::default();
    let mut decoder = FrameDecoder::new(&config);
    let packets = PacketDecoder::new(config.verify_checksum);

    decoder.feed(data, |event| {
        if let FrameEvent::Frame(frame) = event {
            assert_eq!(frame.len(), config.payload_len + 2);
            let batch = packets.decode(&frame);
            assert_eq!(batch.angles.len(), batch.distances.len());
            assert_eq!(batch.angles.len(), batch.confidences.len());
        }
    });

    // After a reset the decoder must accept bytes cleanly again.
    decoder.reset();
    decoder.feed(data, |_| {});
});
