#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use rigstream_wire::{encode_frame, ByteOrder, FrameHeader, HEADER_SIZE};

#[derive(Arbitrary, Debug)]
struct Input {
    big_endian: bool,
    max_body_len: u16,
    bytes: Vec<u8>,
}

fuzz_target!(|input: Input| {
    let order = if input.big_endian {
        ByteOrder::BigEndian
    } else {
        ByteOrder::LittleEndian
    };

    if let Ok(header) = FrameHeader::parse(&input.bytes, order) {
        if let Ok(len) = header.validate(input.max_body_len as usize) {
            assert!(len > 0 && len <= input.max_body_len as usize);
        }
    }

    if let Ok(frame) = encode_frame(&input.bytes, order) {
        let header = FrameHeader::parse(&frame, order).expect("own header");
        assert_eq!(frame.len(), HEADER_SIZE + input.bytes.len());
        assert_eq!(header.to_bytes(order), frame[..HEADER_SIZE]);
    }
});
