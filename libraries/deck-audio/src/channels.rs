//! Channel normalization to the fixed stereo output

use crate::frame::Frame;

/// Channels in every buffer handed to callers
pub const OUTPUT_CHANNELS: usize = 2;

/// Interleave a decoded frame as stereo into `out`, replacing its contents
///
/// Mono is duplicated into both slots. Sources with more than two channels
/// keep channels 0 and 1 only.
pub fn interleave_stereo(frame: &Frame<'_>, out: &mut Vec<i16>) {
    out.clear();
    match frame.header.channels {
        0 => {}
        1 => {
            for &sample in frame.channel(0) {
                let sample = narrow(sample);
                out.push(sample);
                out.push(sample);
            }
        }
        _ => {
            let left = frame.channel(0);
            let right = frame.channel(1);
            for (&l, &r) in left.iter().zip(right) {
                out.push(narrow(l));
                out.push(narrow(r));
            }
        }
    }
}

#[inline]
fn narrow(sample: i32) -> i16 {
    sample.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameHeader;
    use proptest::prelude::*;

    fn header(channels: usize, blocksize: usize) -> FrameHeader {
        FrameHeader {
            blocksize,
            channels,
            sample_rate: 44_100,
            bits_per_sample: 16,
            first_sample: 0,
        }
    }

    #[test]
    fn mono_is_duplicated() {
        let planes = vec![vec![10, -20, 30]];
        let frame = Frame::new(header(1, 3), &planes);
        let mut out = Vec::new();
        interleave_stereo(&frame, &mut out);
        assert_eq!(out, vec![10, 10, -20, -20, 30, 30]);
    }

    #[test]
    fn stereo_is_interleaved() {
        let planes = vec![vec![1, 2, 3], vec![-1, -2, -3]];
        let frame = Frame::new(header(2, 3), &planes);
        let mut out = Vec::new();
        interleave_stereo(&frame, &mut out);
        assert_eq!(out, vec![1, -1, 2, -2, 3, -3]);
    }

    #[test]
    fn extra_channels_are_dropped() {
        let planes = vec![vec![1, 2], vec![3, 4], vec![100, 100], vec![200, 200]];
        let frame = Frame::new(header(4, 2), &planes);
        let mut out = Vec::new();
        interleave_stereo(&frame, &mut out);
        assert_eq!(out, vec![1, 3, 2, 4]);
    }

    #[test]
    fn previous_contents_are_replaced() {
        let planes = vec![vec![5]];
        let frame = Frame::new(header(1, 1), &planes);
        let mut out = vec![9; 16];
        interleave_stereo(&frame, &mut out);
        assert_eq!(out, vec![5, 5]);
    }

    #[test]
    fn out_of_range_values_saturate() {
        let planes = vec![vec![40_000, -40_000]];
        let frame = Frame::new(header(1, 2), &planes);
        let mut out = Vec::new();
        interleave_stereo(&frame, &mut out);
        assert_eq!(out, vec![i16::MAX, i16::MAX, i16::MIN, i16::MIN]);
    }

    proptest! {
        #[test]
        fn mono_upmix_doubles_every_sample(
            samples in prop::collection::vec(any::<i16>(), 1..512)
        ) {
            let planes = vec![samples.iter().map(|&s| i32::from(s)).collect::<Vec<_>>()];
            let frame = Frame::new(header(1, samples.len()), &planes);
            let mut out = Vec::new();
            interleave_stereo(&frame, &mut out);

            prop_assert_eq!(out.len(), samples.len() * 2);
            for (i, &s) in samples.iter().enumerate() {
                prop_assert_eq!(out[2 * i], s);
                prop_assert_eq!(out[2 * i + 1], s);
            }
        }

        #[test]
        fn stereo_keeps_left_and_right_slots(
            pairs in prop::collection::vec((any::<i16>(), any::<i16>()), 1..512)
        ) {
            let left: Vec<i32> = pairs.iter().map(|p| i32::from(p.0)).collect();
            let right: Vec<i32> = pairs.iter().map(|p| i32::from(p.1)).collect();
            let planes = vec![left, right];
            let frame = Frame::new(header(2, pairs.len()), &planes);
            let mut out = Vec::new();
            interleave_stereo(&frame, &mut out);

            prop_assert_eq!(out.len(), pairs.len() * 2);
            for (i, &(l, r)) in pairs.iter().enumerate() {
                prop_assert_eq!(out[2 * i], l);
                prop_assert_eq!(out[2 * i + 1], r);
            }
        }
    }
}
