//! Stream parsing properties: frame recovery must not depend on how the
//! byte stream is chunked.

use proptest::prelude::*;
use proptest::sample::Index;
use stream_bench::sse::{decode_frame, DecodedEvent, FrameSplitter};

/// Split `bytes` at the given cut points and run every chunk through a
/// fresh splitter. Returns the frames and the discarded residue size.
fn split_with_cuts(bytes: &[u8], cuts: &[Index]) -> (Vec<String>, usize) {
    let mut points: Vec<usize> = cuts.iter().map(|i| i.index(bytes.len() + 1)).collect();
    points.sort_unstable();
    points.dedup();

    let mut splitter = FrameSplitter::new();
    let mut frames = Vec::new();
    let mut start = 0;
    for point in points.into_iter().chain(std::iter::once(bytes.len())) {
        frames.extend(splitter.push(&bytes[start..point]));
        start = point;
    }
    (frames, splitter.finish())
}

fn split_whole(bytes: &[u8]) -> (Vec<String>, usize) {
    let mut splitter = FrameSplitter::new();
    let frames = splitter.push(bytes);
    (frames, splitter.finish())
}

fn frame_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "event: [a-z_]{1,20}\ndata: [a-zA-Z0-9é✓ {}\":,]{0,40}",
        "event: [a-z_]{1,20}\ndata: \\{\"n\":[0-9]{1,4}\\}\ndata: [a-z]{0,8}",
        ": [a-z ]{0,16}",
    ]
}

proptest! {
    #[test]
    fn frames_independent_of_chunking(
        frames in prop::collection::vec(frame_strategy(), 0..10),
        trailing in "[a-z: ]{0,12}",
        cuts in prop::collection::vec(any::<Index>(), 0..24),
    ) {
        let mut wire = String::new();
        for frame in &frames {
            wire.push_str(frame);
            wire.push_str("\n\n");
        }
        wire.push_str(&trailing);
        let bytes = wire.as_bytes();

        let (whole, whole_residue) = split_whole(bytes);
        let (chunked, chunked_residue) = split_with_cuts(bytes, &cuts);

        prop_assert_eq!(&whole, &frames);
        prop_assert_eq!(&chunked, &whole);
        prop_assert_eq!(whole_residue, trailing.len());
        prop_assert_eq!(chunked_residue, whole_residue);

        let decoded_whole: Vec<Option<DecodedEvent>> = whole.iter().map(|f| decode_frame(f)).collect();
        let decoded_chunked: Vec<Option<DecodedEvent>> = chunked.iter().map(|f| decode_frame(f)).collect();
        prop_assert_eq!(decoded_whole, decoded_chunked);
    }

    #[test]
    fn arbitrary_bytes_independent_of_chunking(
        bytes in prop::collection::vec(
            prop_oneof![Just(b'\n'), Just(0xE2u8), Just(0x9Cu8), Just(0x93u8), any::<u8>()],
            0..256,
        ),
        cuts in prop::collection::vec(any::<Index>(), 0..32),
    ) {
        prop_assert_eq!(split_with_cuts(&bytes, &cuts), split_whole(&bytes));
    }
}

#[test]
fn test_one_byte_chunks() {
    let wire = "event: content_block_delta\ndata: {\"text\":\"naïve ✓\"}\n\nevent: message_stop\ndata: {}\n\n";
    let mut splitter = FrameSplitter::new();
    let mut frames = Vec::new();
    for byte in wire.as_bytes() {
        frames.extend(splitter.push(std::slice::from_ref(byte)));
    }

    assert_eq!(frames.len(), 2);
    let first = decode_frame(&frames[0]).unwrap();
    assert_eq!(first.name, "content_block_delta");
    assert_eq!(first.json().unwrap()["text"], "naïve ✓");
    assert_eq!(decode_frame(&frames[1]).unwrap().name, "message_stop");
    assert_eq!(splitter.finish(), 0);
}
