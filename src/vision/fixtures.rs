//! Shared OCR fixtures for unit tests
//!
//! Word table for a screenshot of the heading of the Wikipedia article on
//! Python, as tesseract reports it.

use std::sync::atomic::{AtomicUsize, Ordering};

use image::{Rgba, RgbaImage};

use super::matcher::OcrSegment;
use super::ocr::{OcrEngine, OcrRow};
use crate::geometry::Region;

pub const WIKI_TEXT: &str = "Python (programming language)\n\n \n\nFrom Wikipedia, the free encyclopedia\n(Redirected from Python (Programming Language))";

fn structural(level: u32, key: (u32, u32, u32, u32), bounds: (i32, i32, i32, i32)) -> OcrRow {
    OcrRow {
        level,
        page_num: key.0,
        block_num: key.1,
        par_num: key.2,
        line_num: key.3,
        word_num: 0,
        left: bounds.0,
        top: bounds.1,
        width: bounds.2,
        height: bounds.3,
        conf: -1.0,
        text: None,
    }
}

pub fn wiki_rows() -> Vec<OcrRow> {
    vec![
        structural(1, (1, 0, 0, 0), (0, 0, 1313, 817)),
        structural(2, (1, 1, 0, 0), (26, 29, 447, 32)),
        structural(3, (1, 1, 1, 0), (26, 29, 447, 32)),
        structural(4, (1, 1, 1, 1), (26, 29, 447, 32)),
        OcrRow::word(1, 1, 1, 1, 1, (26, 29, 98, 32), 96.839996, "Python"),
        OcrRow::word(1, 1, 1, 1, 2, (135, 29, 195, 32), 96.485741, "(programming"),
        OcrRow::word(1, 1, 1, 1, 3, (340, 29, 133, 32), 96.132133, "language)"),
        structural(2, (1, 2, 0, 0), (26, 59, 1287, 21)),
        structural(3, (1, 2, 1, 0), (26, 59, 1287, 21)),
        structural(4, (1, 2, 1, 1), (26, 59, 1287, 21)),
        OcrRow::word(1, 2, 1, 1, 1, (26, 59, 1287, 21), 95.0, " "),
        structural(2, (1, 3, 0, 0), (27, 84, 384, 36)),
        structural(3, (1, 3, 1, 0), (27, 84, 384, 36)),
        structural(4, (1, 3, 1, 1), (27, 84, 294, 15)),
        OcrRow::word(1, 3, 1, 1, 1, (27, 84, 36, 12), 96.981003, "From"),
        OcrRow::word(1, 3, 1, 1, 2, (69, 84, 79, 15), 94.515457, "Wikipedia,"),
        OcrRow::word(1, 3, 1, 1, 3, (155, 84, 24, 12), 94.887207, "the"),
        OcrRow::word(1, 3, 1, 1, 4, (185, 84, 30, 12), 95.936913, "free"),
        OcrRow::word(1, 3, 1, 1, 5, (220, 84, 101, 15), 96.515205, "encyclopedia"),
        structural(4, (1, 3, 1, 2), (50, 106, 361, 14)),
        OcrRow::word(1, 3, 1, 2, 1, (50, 106, 79, 12), 96.697075, "(Redirected"),
        OcrRow::word(1, 3, 1, 2, 2, (135, 106, 32, 11), 96.729462, "from"),
        OcrRow::word(1, 3, 1, 2, 3, (174, 106, 47, 14), 95.819839, "Python"),
        OcrRow::word(1, 3, 1, 2, 4, (227, 106, 99, 14), 93.306213, "(Programming"),
        OcrRow::word(1, 3, 1, 2, 5, (332, 106, 79, 14), 92.09182, "Language))"),
        structural(2, (1, 4, 0, 0), (27, 145, 1197, 18)),
        structural(3, (1, 4, 1, 0), (27, 145, 1197, 18)),
        structural(4, (1, 4, 1, 1), (27, 145, 1197, 18)),
    ]
}

pub fn seg(index_start: usize, index_end: usize, region: Region, confidence: Option<f64>) -> OcrSegment {
    OcrSegment {
        index_start,
        index_end,
        region,
        confidence,
    }
}

pub fn wiki_segments() -> Vec<OcrSegment> {
    let r = Region::new;
    vec![
        seg(0, 6, r(26, 29, 98, 32), Some(0.96839996)),
        seg(6, 7, r(124, 29, 11, 32), None),
        seg(7, 19, r(135, 29, 195, 32), Some(0.96485741)),
        seg(19, 20, r(330, 29, 10, 32), None),
        seg(20, 29, r(340, 29, 133, 32), Some(0.96132133)),
        seg(29, 31, r(473, 29, -447, 32), None),
        seg(31, 32, r(26, 59, 1287, 21), Some(0.950)),
        seg(32, 34, r(1313, 59, -1286, 21), None),
        seg(34, 38, r(27, 84, 36, 12), Some(0.96981003)),
        seg(38, 39, r(63, 84, 6, 12), None),
        seg(39, 49, r(69, 84, 79, 15), Some(0.94515457)),
        seg(49, 50, r(148, 84, 7, 15), None),
        seg(50, 53, r(155, 84, 24, 12), Some(0.94887207)),
        seg(53, 54, r(179, 84, 6, 12), None),
        seg(54, 58, r(185, 84, 30, 12), Some(0.95936913)),
        seg(58, 59, r(215, 84, 5, 12), None),
        seg(59, 71, r(220, 84, 101, 15), Some(0.96515205)),
        seg(71, 72, r(321, 84, -271, 15), None),
        seg(72, 83, r(50, 106, 79, 12), Some(0.96697075)),
        seg(83, 84, r(129, 106, 6, 12), None),
        seg(84, 88, r(135, 106, 32, 11), Some(0.96729462)),
        seg(88, 89, r(167, 106, 7, 11), None),
        seg(89, 95, r(174, 106, 47, 14), Some(0.95819839)),
        seg(95, 96, r(221, 106, 6, 14), None),
        seg(96, 108, r(227, 106, 99, 14), Some(0.93306213)),
        seg(108, 109, r(326, 106, 6, 14), None),
        seg(109, 119, r(332, 106, 79, 14), Some(0.9209182)),
    ]
}

/// Segment equality with a tolerance on confidence
pub fn assert_segment_eq(actual: &OcrSegment, expected: &OcrSegment) {
    assert_eq!(actual.index_start, expected.index_start, "{:?}", actual);
    assert_eq!(actual.index_end, expected.index_end, "{:?}", actual);
    assert_eq!(actual.region, expected.region, "{:?}", actual);
    match (actual.confidence, expected.confidence) {
        (None, None) => {}
        (Some(a), Some(e)) => assert!((a - e).abs() < 1e-8, "confidence {} != {}", a, e),
        (a, e) => panic!("confidence {:?} != {:?}", a, e),
    }
}

pub fn assert_segments_eq(actual: &[OcrSegment], expected: &[OcrSegment]) {
    assert_eq!(actual.len(), expected.len(), "{:?}", actual);
    for (a, e) in actual.iter().zip(expected) {
        assert_segment_eq(a, e);
    }
}

/// Engine that replays the fixture table and counts its invocations
#[derive(Default)]
pub struct FixtureEngine {
    pub calls: AtomicUsize,
}

impl FixtureEngine {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl OcrEngine for FixtureEngine {
    fn image_to_data(&self, _image: &RgbaImage, _language: Option<&str>) -> anyhow::Result<Vec<OcrRow>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(wiki_rows())
    }
}

/// Engine that always fails
pub struct FailingEngine;

impl OcrEngine for FailingEngine {
    fn image_to_data(&self, _image: &RgbaImage, _language: Option<&str>) -> anyhow::Result<Vec<OcrRow>> {
        anyhow::bail!("engine unavailable")
    }
}

/// Deterministic noise so no crop repeats elsewhere
pub fn noisy_image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let v = (x.wrapping_mul(73_856_093) ^ y.wrapping_mul(19_349_663)).wrapping_mul(2_654_435_761) >> 24;
        let v = v as u8;
        Rgba([v, v.wrapping_add(40), v.wrapping_add(80), 255])
    })
}
