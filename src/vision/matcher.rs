//! OCR text matcher
//!
//! Rebuilds an OCR word table into one flat transcript and keeps, for every
//! byte range of that transcript, the screen region it came from. Words are
//! joined with synthetic "glue" segments (spaces, line breaks, paragraph
//! breaks) whose regions bridge the previous segment to the next word and
//! whose confidence is `None`.
//!
//! Offsets are byte offsets into the UTF-8 transcript.

use image::RgbaImage;
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;
use tracing::{debug, info};

use super::ocr::{ConfidenceScale, OcrEngine, OcrRow};
use crate::error::{LocateError, Result};
use crate::geometry::Region;

/// A transcript byte range mapped to the region it came from
#[derive(Debug, Clone, PartialEq)]
pub struct OcrSegment {
    pub index_start: usize,
    pub index_end: usize,
    pub region: Region,
    /// Recognition confidence (0.0 - 1.0), `None` for glue
    pub confidence: Option<f64>,
}

impl OcrSegment {
    /// Whether this is a synthetic separator rather than a recognized word
    pub fn is_glue(&self) -> bool {
        self.confidence.is_none()
    }

    /// Byte length in the transcript
    pub fn len(&self) -> usize {
        self.index_end - self.index_start
    }

    pub fn is_empty(&self) -> bool {
        self.index_end == self.index_start
    }
}

/// A needle located in the transcript, with every segment it touches
#[derive(Debug, Clone, PartialEq)]
pub struct TextMatch {
    pub index_start: usize,
    pub index_end: usize,
    /// Touched segments in transcript order; partially covered words are included whole
    pub segments: Vec<OcrSegment>,
}

impl TextMatch {
    /// Collapse into a single segment: the match's own offsets, the bounding
    /// box of every touched segment and the lowest word confidence.
    ///
    /// Confidence is `None` only when every touched segment is glue.
    pub fn aggregate(&self) -> OcrSegment {
        let region = Region::bounding(self.segments.iter().map(|s| s.region)).unwrap_or_default();
        let confidence = self
            .segments
            .iter()
            .filter_map(|s| s.confidence)
            .reduce(f64::min);

        OcrSegment {
            index_start: self.index_start,
            index_end: self.index_end,
            region,
            confidence,
        }
    }
}

/// Transcript reconstruction settings; also the cache key for matchers of one image
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatcherOptions {
    /// Language hint passed to the engine
    pub language: Option<String>,
    /// Inserted between lines of a paragraph
    pub line_break: String,
    /// Inserted between paragraphs
    pub paragraph_break: String,
}

impl Default for MatcherOptions {
    fn default() -> Self {
        Self {
            language: None,
            line_break: "\n".to_string(),
            paragraph_break: "\n\n".to_string(),
        }
    }
}

impl MatcherOptions {
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_line_break(mut self, line_break: impl Into<String>) -> Self {
        self.line_break = line_break.into();
        self
    }

    pub fn with_paragraph_break(mut self, paragraph_break: impl Into<String>) -> Self {
        self.paragraph_break = paragraph_break.into();
        self
    }
}

/// Regex compilation flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegexFlags {
    pub case_insensitive: bool,
    pub multi_line: bool,
    pub dot_matches_new_line: bool,
    pub ignore_whitespace: bool,
}

impl RegexFlags {
    fn compile(&self, pattern: &str) -> Result<Regex> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(self.case_insensitive)
            .multi_line(self.multi_line)
            .dot_matches_new_line(self.dot_matches_new_line)
            .ignore_whitespace(self.ignore_whitespace)
            .build()?;
        Ok(regex)
    }
}

/// Where and how to search the transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchOptions {
    /// Window start (byte offset), clamped to the transcript
    pub start: Option<usize>,
    /// Window end (byte offset, exclusive), clamped to the transcript
    pub end: Option<usize>,
    /// Treat the needle as a regular expression
    pub regex: bool,
    pub flags: RegexFlags,
}

impl SearchOptions {
    /// Plain substring search over the whole transcript
    pub fn literal() -> Self {
        Self::default()
    }

    /// Regex search over the whole transcript
    pub fn regex() -> Self {
        Self {
            regex: true,
            ..Self::default()
        }
    }

    pub fn with_start(mut self, start: usize) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_end(mut self, end: usize) -> Self {
        self.end = Some(end);
        self
    }

    pub fn with_flags(mut self, flags: RegexFlags) -> Self {
        self.flags = flags;
        self
    }
}

/// Compiled form of a needle
enum Pattern<'a> {
    Literal(&'a str),
    Regex(Regex),
}

impl<'a> Pattern<'a> {
    fn new(needle: &'a str, options: &SearchOptions) -> Result<Self> {
        if options.regex {
            Ok(Pattern::Regex(options.flags.compile(needle)?))
        } else {
            Ok(Pattern::Literal(needle))
        }
    }

    /// First match in `haystack` as a byte range
    fn find_in(&self, haystack: &str) -> Option<(usize, usize)> {
        match self {
            Pattern::Literal(needle) => haystack.find(needle).map(|start| (start, start + needle.len())),
            Pattern::Regex(regex) => regex.find(haystack).map(|m| (m.start(), m.end())),
        }
    }
}

/// OCR results of one image, searchable by text
#[derive(Debug, Clone)]
pub struct OcrMatcher {
    options: MatcherOptions,
    text: String,
    segments: Vec<OcrSegment>,
}

impl OcrMatcher {
    /// Run the engine once over `image` and build the transcript.
    ///
    /// Engine failures are returned as-is; there is no retry.
    pub fn new(engine: &dyn OcrEngine, image: &RgbaImage, options: MatcherOptions) -> Result<Self> {
        let rows = engine
            .image_to_data(image, options.language.as_deref())
            .map_err(LocateError::OcrEngine)?;

        info!(
            "OCR over {}x{} image returned {} rows",
            image.width(),
            image.height(),
            rows.len()
        );

        Ok(Self::from_rows(&rows, engine.confidence_scale(), options))
    }

    /// Build from an already computed word table
    pub fn from_rows(rows: &[OcrRow], scale: ConfidenceScale, options: MatcherOptions) -> Self {
        let mut builder = TranscriptBuilder::default();

        for paragraph in group_by(rows.iter().filter(|row| row.has_text()), |row| {
            (row.page_num, row.block_num, row.par_num)
        }) {
            if !builder.is_empty() {
                builder.push_glue(&options.paragraph_break, paragraph[0].left);
            }

            for (line_index, line) in group_by(paragraph.into_iter(), |row| row.line_num)
                .into_iter()
                .enumerate()
            {
                if line_index > 0 {
                    builder.push_glue(&options.line_break, line[0].left);
                }

                for (word_index, word) in line.into_iter().enumerate() {
                    if word_index > 0 {
                        builder.push_glue(" ", word.left);
                    }
                    builder.push_word(word, scale);
                }
            }
        }

        debug!(
            "Built OCR transcript: {} bytes, {} segments",
            builder.text.len(),
            builder.segments.len()
        );

        Self {
            options,
            text: builder.text,
            segments: builder.segments,
        }
    }

    /// The flattened transcript
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Every segment in transcript order
    pub fn segments(&self) -> &[OcrSegment] {
        &self.segments
    }

    /// Options this matcher was built with
    pub fn options(&self) -> &MatcherOptions {
        &self.options
    }

    /// Segment covering the given byte offset
    pub fn segment_at(&self, offset: usize) -> Option<&OcrSegment> {
        let index = self.segments.partition_point(|s| s.index_end <= offset);
        self.segments.get(index).filter(|s| s.index_start <= offset)
    }

    /// Locate the first occurrence of `needle` and every segment it touches.
    ///
    /// Returns `None` when the needle does not occur inside the search window.
    pub fn find_bounding_boxes(&self, needle: &str, options: &SearchOptions) -> Result<Option<TextMatch>> {
        let pattern = Pattern::new(needle, options)?;
        self.search(&pattern, options.start, options.end)
    }

    /// Locate the first occurrence of `needle` as one aggregate segment
    pub fn find(&self, needle: &str, options: &SearchOptions) -> Result<Option<OcrSegment>> {
        Ok(self
            .find_bounding_boxes(needle, options)?
            .map(|found| found.aggregate()))
    }

    /// Every non-overlapping occurrence, in transcript order
    pub fn find_bounding_boxes_all(&self, needle: &str, options: &SearchOptions) -> Result<Vec<TextMatch>> {
        let pattern = Pattern::new(needle, options)?;

        let mut found = Vec::new();
        let mut start = options.start;
        while let Some(hit) = self.search(&pattern, start, options.end)? {
            start = Some(self.next_search_start(&hit));
            found.push(hit);
        }

        debug!("Found {} occurrence(s) of {:?}", found.len(), needle);
        Ok(found)
    }

    /// Every non-overlapping occurrence as aggregate segments
    pub fn find_all(&self, needle: &str, options: &SearchOptions) -> Result<Vec<OcrSegment>> {
        Ok(self
            .find_bounding_boxes_all(needle, options)?
            .iter()
            .map(TextMatch::aggregate)
            .collect())
    }

    /// Empty matches advance by one character so repeated searches terminate
    fn next_search_start(&self, hit: &TextMatch) -> usize {
        if hit.index_end > hit.index_start {
            return hit.index_end;
        }
        self.text[hit.index_end..]
            .chars()
            .next()
            .map_or(self.text.len() + 1, |c| hit.index_end + c.len_utf8())
    }

    fn search(&self, pattern: &Pattern<'_>, start: Option<usize>, end: Option<usize>) -> Result<Option<TextMatch>> {
        let len = self.text.len();
        let start = start.unwrap_or(0);
        let end = end.unwrap_or(len).min(len);
        if start > end {
            return Ok(None);
        }

        let window = self
            .text
            .get(start..end)
            .ok_or(LocateError::InvalidSearchWindow { start, end })?;

        let Some((match_start, match_end)) = pattern.find_in(window) else {
            return Ok(None);
        };
        let (match_start, match_end) = (match_start + start, match_end + start);

        Ok(self.touched_segments(match_start, match_end).map(|segments| TextMatch {
            index_start: match_start,
            index_end: match_end,
            segments,
        }))
    }

    /// The segment holding `start` followed by every segment that begins before `end`
    fn touched_segments(&self, start: usize, end: usize) -> Option<Vec<OcrSegment>> {
        let first = self.segments.partition_point(|s| s.index_end <= start);
        let head = self.segments.get(first)?;

        let mut touched = vec![head.clone()];
        touched.extend(
            self.segments[first + 1..]
                .iter()
                .take_while(|s| s.index_start < end)
                .cloned(),
        );
        Some(touched)
    }
}

#[derive(Default)]
struct TranscriptBuilder {
    text: String,
    segments: Vec<OcrSegment>,
}

impl TranscriptBuilder {
    fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Separator spanning from the previous segment's right edge to `next_left`,
    /// at the previous segment's height
    fn push_glue(&mut self, glue: &str, next_left: i32) {
        let Some(previous) = self.segments.last() else {
            return;
        };
        if glue.is_empty() {
            return;
        }

        let region = Region::from_coordinates(
            previous.region.right(),
            previous.region.top(),
            next_left,
            previous.region.bottom(),
        );
        self.push(glue, region, None);
    }

    fn push_word(&mut self, row: &OcrRow, scale: ConfidenceScale) {
        let text = row.text.as_deref().unwrap_or_default();
        let region = Region::new(row.left, row.top, row.width, row.height);
        self.push(text, region, Some(scale.normalize(row.conf)));
    }

    fn push(&mut self, text: &str, region: Region, confidence: Option<f64>) {
        let index_start = self.text.len();
        self.text.push_str(text);
        self.segments.push(OcrSegment {
            index_start,
            index_end: self.text.len(),
            region,
            confidence,
        });
    }
}

/// Group items by key, groups ordered by first appearance, items keeping their order
fn group_by<'a, I, K, F>(items: I, key: F) -> Vec<Vec<&'a OcrRow>>
where
    I: Iterator<Item = &'a OcrRow>,
    K: Eq + std::hash::Hash,
    F: Fn(&OcrRow) -> K,
{
    let mut positions: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<Vec<&'a OcrRow>> = Vec::new();

    for item in items {
        let index = *positions.entry(key(item)).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[index].push(item);
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vision::fixtures::{
        assert_segment_eq, assert_segments_eq, seg, wiki_rows, wiki_segments, FailingEngine, FixtureEngine, WIKI_TEXT,
    };

    fn wiki_matcher() -> OcrMatcher {
        OcrMatcher::from_rows(&wiki_rows(), ConfidenceScale::Percent, MatcherOptions::default())
    }

    fn literal() -> SearchOptions {
        SearchOptions::literal()
    }

    fn r(x: i32, y: i32, w: i32, h: i32) -> Region {
        Region::new(x, y, w, h)
    }

    #[test]
    fn test_transcript_reconstruction() {
        let matcher = wiki_matcher();
        assert_eq!(matcher.text(), WIKI_TEXT);
        assert_segments_eq(matcher.segments(), &wiki_segments());
    }

    #[test]
    fn test_engine_invoked_once_on_construction() {
        let engine = FixtureEngine::default();
        let image = RgbaImage::new(8, 8);
        let matcher = OcrMatcher::new(&engine, &image, MatcherOptions::default()).unwrap();

        assert_eq!(engine.calls(), 1);
        assert_eq!(matcher.text(), WIKI_TEXT);

        matcher.find("the", &literal()).unwrap();
        matcher.find_all("Python", &literal()).unwrap();
        assert_eq!(engine.calls(), 1);
    }

    #[test]
    fn test_engine_failure_is_propagated() {
        let image = RgbaImage::new(8, 8);
        let err = OcrMatcher::new(&FailingEngine, &image, MatcherOptions::default()).unwrap_err();
        assert!(matches!(err, LocateError::OcrEngine(_)));
        assert!(err.to_string().contains("engine unavailable"));
    }

    #[test]
    fn test_segment_offsets_round_trip() {
        let options = MatcherOptions::default();
        let matcher = wiki_matcher();
        let words: Vec<String> = wiki_rows().into_iter().filter_map(|row| row.text).collect();
        let mut words = words.iter();

        for segment in matcher.segments() {
            let slice = &matcher.text()[segment.index_start..segment.index_end];
            if segment.is_glue() {
                assert!(
                    slice == " " || slice == options.line_break || slice == options.paragraph_break,
                    "unexpected glue {:?}",
                    slice
                );
            } else {
                assert_eq!(Some(&slice.to_string()), words.next());
            }
        }
        assert_eq!(words.next(), None);
    }

    #[test]
    fn test_segments_are_contiguous() {
        let matcher = wiki_matcher();
        let segments = matcher.segments();

        assert_eq!(segments.first().map(|s| s.index_start), Some(0));
        assert_eq!(segments.last().map(|s| s.index_end), Some(matcher.text().len()));
        for pair in segments.windows(2) {
            assert_eq!(pair[0].index_end, pair[1].index_start);
        }
        assert!(segments.iter().all(|s| !s.is_empty()));
    }

    #[test]
    fn test_custom_separators() {
        let options = MatcherOptions::default()
            .with_line_break(" / ")
            .with_paragraph_break(" | ");
        let matcher = OcrMatcher::from_rows(&wiki_rows(), ConfidenceScale::Percent, options);

        assert!(matcher.text().starts_with("Python (programming language) |   | From"));
        assert!(matcher.text().contains("encyclopedia / (Redirected"));

        let found = matcher.find_bounding_boxes("encyclopedia / (Red", &literal()).unwrap().unwrap();
        assert_eq!(found.segments.len(), 3);
        assert_eq!(found.segments[1].region, r(321, 84, -271, 15));
    }

    #[test]
    fn test_rows_grouped_by_first_appearance() {
        let rows = vec![
            OcrRow::word(1, 2, 1, 1, 1, (0, 50, 10, 10), 90.0, "second"),
            OcrRow::word(1, 1, 1, 1, 1, (0, 0, 10, 10), 90.0, "first"),
            OcrRow::word(1, 2, 1, 1, 2, (20, 50, 10, 10), 80.0, "block"),
        ];
        let matcher = OcrMatcher::from_rows(&rows, ConfidenceScale::Percent, MatcherOptions::default());
        assert_eq!(matcher.text(), "second block\n\nfirst");
    }

    #[test]
    fn test_fraction_scale_is_not_rescaled() {
        let rows = vec![OcrRow::word(1, 1, 1, 1, 1, (0, 0, 10, 10), 0.75, "word")];
        let matcher = OcrMatcher::from_rows(&rows, ConfidenceScale::Fraction, MatcherOptions::default());
        assert_eq!(matcher.segments()[0].confidence, Some(0.75));
    }

    #[test]
    fn test_empty_table_gives_empty_transcript() {
        let matcher = OcrMatcher::from_rows(&[], ConfidenceScale::Percent, MatcherOptions::default());
        assert_eq!(matcher.text(), "");
        assert!(matcher.segments().is_empty());
        assert_eq!(matcher.find_bounding_boxes("", &literal()).unwrap(), None);
        assert!(matcher.find_all("a", &literal()).unwrap().is_empty());
    }

    #[test]
    fn test_finding_complete_single_word() {
        let found = wiki_matcher().find_bounding_boxes("the", &literal()).unwrap().unwrap();
        assert_eq!((found.index_start, found.index_end), (50, 53));
        assert_segments_eq(&found.segments, &[seg(50, 53, r(155, 84, 24, 12), Some(0.94887207))]);
    }

    #[test]
    fn test_finding_complete_single_word_using_regex() {
        let found = wiki_matcher()
            .find_bounding_boxes("[tT]he", &SearchOptions::regex())
            .unwrap()
            .unwrap();
        assert_eq!((found.index_start, found.index_end), (50, 53));
        assert_segments_eq(&found.segments, &[seg(50, 53, r(155, 84, 24, 12), Some(0.94887207))]);
    }

    #[test]
    fn test_finding_with_start_offset() {
        let matcher = wiki_matcher();
        for options in [literal().with_start(20), SearchOptions::regex().with_start(20)] {
            let needle = if options.regex { "[tT]he" } else { "the" };
            let found = matcher.find_bounding_boxes(needle, &options).unwrap().unwrap();
            assert_eq!((found.index_start, found.index_end), (50, 53));
            assert_segments_eq(&found.segments, &[seg(50, 53, r(155, 84, 24, 12), Some(0.94887207))]);
        }
    }

    #[test]
    fn test_latter_part_of_word_gives_whole_word_box() {
        let matcher = wiki_matcher();
        let found = matcher.find_bounding_boxes("he", &literal()).unwrap().unwrap();
        assert_eq!((found.index_start, found.index_end), (51, 53));
        assert_segments_eq(&found.segments, &[seg(50, 53, r(155, 84, 24, 12), Some(0.94887207))]);

        let single = matcher.find("he", &literal()).unwrap().unwrap();
        assert_segment_eq(&single, &seg(51, 53, r(155, 84, 24, 12), Some(0.94887207)));
    }

    #[test]
    fn test_beginning_part_of_word_gives_whole_word_box() {
        let found = wiki_matcher().find_bounding_boxes("(Red", &literal()).unwrap().unwrap();
        assert_eq!((found.index_start, found.index_end), (72, 76));
        assert_segments_eq(&found.segments, &[seg(72, 83, r(50, 106, 79, 12), Some(0.96697075))]);
    }

    #[test]
    fn test_word_with_preceding_space() {
        let found = wiki_matcher().find_bounding_boxes(" the", &literal()).unwrap().unwrap();
        assert_eq!((found.index_start, found.index_end), (49, 53));
        assert_segments_eq(
            &found.segments,
            &[
                seg(49, 50, r(148, 84, 7, 15), None),
                seg(50, 53, r(155, 84, 24, 12), Some(0.94887207)),
            ],
        );
    }

    #[test]
    fn test_word_with_space_before_and_after() {
        let matcher = wiki_matcher();
        let found = matcher.find_bounding_boxes(" the ", &literal()).unwrap().unwrap();
        assert_eq!((found.index_start, found.index_end), (49, 54));
        assert_segments_eq(
            &found.segments,
            &[
                seg(49, 50, r(148, 84, 7, 15), None),
                seg(50, 53, r(155, 84, 24, 12), Some(0.94887207)),
                seg(53, 54, r(179, 84, 6, 12), None),
            ],
        );

        let single = matcher.find(" the ", &literal()).unwrap().unwrap();
        assert_segment_eq(&single, &seg(49, 54, r(148, 84, 37, 15), Some(0.94887207)));
    }

    #[test]
    fn test_two_words() {
        let matcher = wiki_matcher();
        let found = matcher.find_bounding_boxes("Wikipedia, the", &literal()).unwrap().unwrap();
        assert_eq!((found.index_start, found.index_end), (39, 53));
        assert_segments_eq(
            &found.segments,
            &[
                seg(39, 49, r(69, 84, 79, 15), Some(0.94515457)),
                seg(49, 50, r(148, 84, 7, 15), None),
                seg(50, 53, r(155, 84, 24, 12), Some(0.94887207)),
            ],
        );

        let single = matcher.find("Wikipedia, the", &literal()).unwrap().unwrap();
        assert_segment_eq(&single, &seg(39, 53, r(69, 84, 110, 15), Some(0.94515457)));
    }

    #[test]
    fn test_match_ending_inside_a_word_includes_that_word() {
        let found = wiki_matcher().find_bounding_boxes("the fr", &literal()).unwrap().unwrap();
        assert_eq!((found.index_start, found.index_end), (50, 56));
        assert_eq!(
            found.segments.iter().map(|s| (s.index_start, s.index_end)).collect::<Vec<_>>(),
            [(50, 53), (53, 54), (54, 58)]
        );
    }

    #[test]
    fn test_word_on_second_line() {
        let found = wiki_matcher().find_bounding_boxes("(Redirected", &literal()).unwrap().unwrap();
        assert_eq!((found.index_start, found.index_end), (72, 83));
        assert_segments_eq(&found.segments, &[seg(72, 83, r(50, 106, 79, 12), Some(0.96697075))]);
    }

    #[test]
    fn test_end_before_token_fails_to_find_it() {
        let matcher = wiki_matcher();
        assert_eq!(
            matcher.find_bounding_boxes("(Redirected", &literal().with_end(50)).unwrap(),
            None
        );
        assert_eq!(
            matcher
                .find_bounding_boxes(r"\([rR]edirected", &SearchOptions::regex().with_end(50))
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_start_after_token_fails_to_find_it() {
        let matcher = wiki_matcher();
        assert_eq!(
            matcher.find_bounding_boxes("Wikipedia", &literal().with_start(100)).unwrap(),
            None
        );
        assert_eq!(
            matcher
                .find_bounding_boxes("Wikipedia", &SearchOptions::regex().with_start(100))
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_two_words_on_separate_lines() {
        let expected = [
            seg(59, 71, r(220, 84, 101, 15), Some(0.96515205)),
            seg(71, 72, r(321, 84, -271, 15), None),
            seg(72, 83, r(50, 106, 79, 12), Some(0.96697075)),
        ];
        let matcher = wiki_matcher();

        let found = matcher
            .find_bounding_boxes("encyclopedia\n(Redirected", &literal())
            .unwrap()
            .unwrap();
        assert_eq!((found.index_start, found.index_end), (59, 83));
        assert_segments_eq(&found.segments, &expected);

        let found = matcher
            .find_bounding_boxes(r"encyclopedia\s+\(Redirected", &SearchOptions::regex())
            .unwrap()
            .unwrap();
        assert_eq!((found.index_start, found.index_end), (59, 83));
        assert_segments_eq(&found.segments, &expected);

        let single = matcher.find("encyclopedia\n(Redirected", &literal()).unwrap().unwrap();
        assert_segment_eq(&single, &seg(59, 83, r(50, 84, 271, 34), Some(0.96515205)));
    }

    #[test]
    fn test_span_across_paragraphs() {
        let single = wiki_matcher().find("language)\n\n \n\nFrom", &literal()).unwrap().unwrap();
        assert_eq!((single.index_start, single.index_end), (20, 38));
        assert_eq!(single.region, r(26, 29, 1287, 67));
        assert!((single.confidence.unwrap() - 0.95).abs() < 1e-8);
    }

    #[test]
    fn test_failing_to_find_needle() {
        let matcher = wiki_matcher();
        assert_eq!(matcher.find_bounding_boxes("NOT IN TEXT", &literal()).unwrap(), None);
        assert_eq!(
            matcher.find_bounding_boxes("NOT IN TEXT", &SearchOptions::regex()).unwrap(),
            None
        );
        assert_eq!(matcher.find("NOT IN TEXT", &literal()).unwrap(), None);
    }

    #[test]
    fn test_regex_flags() {
        let matcher = wiki_matcher();
        assert_eq!(
            matcher.find_bounding_boxes("FROM WIKIPEDIA", &SearchOptions::regex()).unwrap(),
            None
        );

        let flags = RegexFlags {
            case_insensitive: true,
            ..Default::default()
        };
        let found = matcher
            .find_bounding_boxes("FROM WIKIPEDIA", &SearchOptions::regex().with_flags(flags))
            .unwrap()
            .unwrap();
        assert_eq!((found.index_start, found.index_end), (34, 48));
    }

    #[test]
    fn test_invalid_regex_is_an_error() {
        let err = wiki_matcher()
            .find_bounding_boxes("(unclosed", &SearchOptions::regex())
            .unwrap_err();
        assert!(matches!(err, LocateError::InvalidPattern(_)));
    }

    #[test]
    fn test_window_is_clamped_to_transcript() {
        let matcher = wiki_matcher();
        let found = matcher
            .find_bounding_boxes("Language))", &literal().with_end(10_000))
            .unwrap()
            .unwrap();
        assert_eq!((found.index_start, found.index_end), (109, 119));
        assert_eq!(matcher.find_bounding_boxes("the", &literal().with_start(10_000)).unwrap(), None);
        assert_eq!(
            matcher
                .find_bounding_boxes("the", &literal().with_start(60).with_end(40))
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_window_inside_a_character_is_an_error() {
        let rows = vec![OcrRow::word(1, 1, 1, 1, 1, (0, 0, 10, 10), 90.0, "café")];
        let matcher = OcrMatcher::from_rows(&rows, ConfidenceScale::Percent, MatcherOptions::default());
        let err = matcher
            .find_bounding_boxes("é", &literal().with_start(4))
            .unwrap_err();
        assert!(matches!(err, LocateError::InvalidSearchWindow { start: 4, .. }));
    }

    #[test]
    fn test_repeated_searches_are_identical() {
        let matcher = wiki_matcher();
        let first = matcher.find_bounding_boxes(" the ", &literal()).unwrap();
        let second = matcher.find_bounding_boxes(" the ", &literal()).unwrap();
        assert_eq!(first, second);
        assert_eq!(matcher.find("Python", &literal()).unwrap(), matcher.find("Python", &literal()).unwrap());
    }

    #[test]
    fn test_find_all_in_transcript_order() {
        let matcher = wiki_matcher();
        let found = matcher.find_all("Python", &literal()).unwrap();
        assert_eq!(found.len(), 2);
        assert_segment_eq(&found[0], &seg(0, 6, r(26, 29, 98, 32), Some(0.96839996)));
        assert_segment_eq(&found[1], &seg(89, 95, r(174, 106, 47, 14), Some(0.95819839)));

        let regex_hits = matcher
            .find_bounding_boxes_all(r"\([pP]rogramming", &SearchOptions::regex())
            .unwrap();
        assert_eq!(
            regex_hits.iter().map(|m| m.index_start).collect::<Vec<_>>(),
            [7, 96]
        );
    }

    #[test]
    fn test_find_all_honours_window() {
        let matcher = wiki_matcher();
        assert_eq!(matcher.find_all("Python", &literal().with_start(1)).unwrap().len(), 1);
        assert_eq!(matcher.find_all("Python", &literal().with_end(94)).unwrap().len(), 1);
        assert!(matcher.find_all("NOT IN TEXT", &literal()).unwrap().is_empty());
    }

    #[test]
    fn test_find_all_with_empty_matches_terminates() {
        let matcher = wiki_matcher();
        let hits = matcher.find_bounding_boxes_all("x*", &SearchOptions::regex().with_end(6)).unwrap();
        assert_eq!(hits.len(), 7);
        assert_eq!(hits.last().map(|hit| hit.index_start), Some(6));
        assert!(hits.iter().all(|hit| hit.segments.len() == 1));
    }

    #[test]
    fn test_aggregate_of_glue_only_match_has_no_confidence() {
        let found = TextMatch {
            index_start: 29,
            index_end: 31,
            segments: vec![seg(29, 31, r(473, 29, -447, 32), None)],
        };
        let single = found.aggregate();
        assert_eq!(single.confidence, None);
        assert_eq!(single.region, r(473, 29, -447, 32));
    }

    #[test]
    fn test_segment_at() {
        let matcher = wiki_matcher();
        assert_eq!(matcher.segment_at(51).map(|s| s.index_start), Some(50));
        assert_eq!(matcher.segment_at(53).map(|s| s.index_start), Some(53));
        assert_eq!(matcher.segment_at(0).map(|s| s.index_end), Some(6));
        assert_eq!(matcher.segment_at(119), None);
    }
}
