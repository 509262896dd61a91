//! Splitting input into segments.
//!
//! Text is first cut into maximal runs of one character class. Each run can be
//! encoded in its own mode or in any wider one (numeric runs as alphanumeric or
//! bytes, alphanumeric and Kanji runs as bytes). The cheapest choice per run is a
//! shortest path through a layered graph with one layer per run and one node per
//! candidate mode; edge weights are the extra bits a node adds after its predecessor.
//! Since every edge goes from one layer to the next, the path is found with a single
//! forward pass instead of a general graph search.

use log::{debug, warn};

use crate::error::QrError;
use crate::mode::Mode;
use crate::options::{KanjiEncoder, QrOptions};
use crate::segment::{self, Segment};
use crate::version::Version;

/// Raw content of a caller-provided segment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SegmentContent {
    Text(String),
    Bytes(Vec<u8>),
}

/// One caller-provided segment, with an optional forced mode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SegmentInput {
    pub content: SegmentContent,
    pub mode: Option<Mode>,
}

impl SegmentInput {
    pub fn text(text: impl Into<String>) -> Self {
        SegmentInput {
            content: SegmentContent::Text(text.into()),
            mode: None,
        }
    }

    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        SegmentInput {
            content: SegmentContent::Bytes(data.into()),
            mode: None,
        }
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Forces the mode by name. Unknown names leave the mode inferred.
    pub fn with_mode_name(mut self, name: &str) -> Self {
        self.mode = match name.parse::<Mode>() {
            Ok(mode) => Some(mode),
            Err(e) => {
                warn!("{}, inferring mode", e);
                None
            }
        };
        self
    }
}

/// A maximal run of one character class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Run<'t> {
    text: &'t str,
    mode: Mode,
}

/// A candidate encoding of one run.
#[derive(Clone, Copy, Debug)]
struct Node<'t> {
    text: &'t str,
    mode: Mode,
    /// Characters for numeric, alphanumeric and Kanji; UTF-8 bytes for byte mode.
    length: usize,
}

/// Best known path into a node.
#[derive(Clone, Copy, Debug)]
struct Step {
    cost: usize,
    /// Units of this node's mode accumulated since the last mode switch.
    run_length: usize,
    prev: Option<usize>,
}

/// Builds segments from text or caller-provided segment lists.
#[derive(Clone, Copy, Debug, Default)]
pub struct Segmenter<'a> {
    kanji_encoder: Option<&'a KanjiEncoder>,
    kanji_byte_fallback: bool,
}

impl<'a> Segmenter<'a> {
    /// Kanji runs are only detected when `kanji_encoder` is set.
    pub fn new(kanji_encoder: Option<&'a KanjiEncoder>) -> Self {
        Segmenter {
            kanji_encoder,
            kanji_byte_fallback: false,
        }
    }

    pub fn from_options(options: &'a QrOptions) -> Self {
        Segmenter {
            kanji_encoder: options.kanji_encoder.as_ref(),
            kanji_byte_fallback: options.kanji_byte_fallback,
        }
    }

    /// Encode forced Kanji segments as bytes when no encoder is available.
    pub fn with_byte_fallback(mut self, fallback: bool) -> Self {
        self.kanji_byte_fallback = fallback;
        self
    }

    fn kanji_enabled(&self) -> bool {
        self.kanji_encoder.is_some()
    }

    /// One segment per character-class run, without any optimization.
    pub fn raw_split(&self, text: &str) -> Result<Vec<Segment>, QrError> {
        let mut segments = Vec::new();
        for run in split_runs(text, self.kanji_enabled()) {
            if let Some(seg) = self.build_single(&SegmentContent::Text(run.text.to_string()), Some(run.mode))? {
                segments.push(seg);
            }
        }
        Ok(segments)
    }

    /// The cheapest segmentation of `text` for symbols of `version`.
    pub fn from_string(&self, text: &str, version: Version) -> Result<Vec<Segment>, QrError> {
        let runs = split_runs(text, self.kanji_enabled());
        let layers: Vec<Vec<Node>> = runs.iter().map(|run| candidates(*run)).collect();
        let path = shortest_path(&layers, version)?;

        let mut merged: Vec<(String, Mode)> = Vec::new();
        for node in path {
            match merged.last_mut() {
                Some((text, mode)) if *mode == node.mode => text.push_str(node.text),
                _ => merged.push((node.text.to_string(), node.mode)),
            }
        }

        let mut segments = Vec::with_capacity(merged.len());
        for (text, mode) in merged {
            if let Some(seg) = self.build_single(&SegmentContent::Text(text), Some(mode))? {
                segments.push(seg);
            }
        }
        debug!("segments for version {}: {:?}", version, segments);
        Ok(segments)
    }

    /// Builds caller-provided segments in order. Empty inputs are skipped.
    pub fn from_array(&self, inputs: &[SegmentInput]) -> Result<Vec<Segment>, QrError> {
        let mut segments = Vec::with_capacity(inputs.len());
        for input in inputs {
            if let Some(seg) = self.build_single(&input.content, input.mode)? {
                segments.push(seg);
            }
        }
        Ok(segments)
    }

    /// Builds one segment, inferring the mode when `hint` is `None`.
    ///
    /// A forced mode must be byte or at least as wide as the inferred one, so numeric
    /// is rejected for letters but byte is always accepted.
    pub fn build_single(&self, content: &SegmentContent, hint: Option<Mode>) -> Result<Option<Segment>, QrError> {
        let text = match content {
            SegmentContent::Bytes(data) if data.is_empty() => return Ok(None),
            SegmentContent::Bytes(data) => {
                return match hint {
                    None | Some(Mode::Byte) => Ok(Some(Segment::byte(data.clone()))),
                    Some(mode) => Err(QrError::IncompatibleMode {
                        data: String::from_utf8_lossy(data).into_owned(),
                        mode,
                        suggested: Mode::Byte,
                    }),
                };
            }
            SegmentContent::Text(text) if text.is_empty() => return Ok(None),
            SegmentContent::Text(text) => text,
        };

        let best_mode = Mode::best_for_data(text);
        let forced = hint.filter(|&m| m != Mode::Mixed);
        let mode = forced.unwrap_or(best_mode);

        if mode != Mode::Byte && mode.bit() < best_mode.bit() {
            return Err(QrError::IncompatibleMode {
                data: text.clone(),
                mode,
                suggested: best_mode,
            });
        }

        let segment = match mode {
            Mode::Numeric => Segment::numeric(text)?,
            Mode::Alphanumeric => Segment::alphanumeric(text)?,
            Mode::Kanji => match self.kanji_encoder {
                Some(encoder) => Segment::kanji(text, encoder)?,
                None if forced.is_none() || self.kanji_byte_fallback => Segment::byte(text.as_bytes()),
                None => return Err(QrError::KanjiEncoderMissing),
            },
            Mode::Byte | Mode::Mixed => Segment::byte(text.as_bytes()),
        };
        Ok(Some(segment))
    }
}

/// Builds segments from `inputs` with no Kanji encoder configured.
pub fn from_array(inputs: &[SegmentInput]) -> Result<Vec<Segment>, QrError> {
    Segmenter::default().from_array(inputs)
}

fn char_class(c: char, kanji_enabled: bool) -> Mode {
    if c.is_ascii_digit() {
        Mode::Numeric
    } else if segment::ALPHANUMERIC_CHARSET.contains(c) {
        Mode::Alphanumeric
    } else if kanji_enabled && segment::is_kanji_char(c) {
        Mode::Kanji
    } else {
        Mode::Byte
    }
}

fn split_runs(text: &str, kanji_enabled: bool) -> Vec<Run<'_>> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut current: Option<Mode> = None;

    for (i, c) in text.char_indices() {
        let class = char_class(c, kanji_enabled);
        match current {
            Some(mode) if mode == class => {}
            Some(mode) => {
                runs.push(Run { text: &text[start..i], mode });
                start = i;
                current = Some(class);
            }
            None => current = Some(class),
        }
    }
    if let Some(mode) = current {
        runs.push(Run { text: &text[start..], mode });
    }
    runs
}

fn candidates(run: Run<'_>) -> Vec<Node<'_>> {
    let chars = run.text.chars().count();
    let bytes = run.text.len();
    let node = |mode: Mode, length: usize| Node { text: run.text, mode, length };

    match run.mode {
        Mode::Numeric => vec![
            node(Mode::Numeric, chars),
            node(Mode::Alphanumeric, chars),
            node(Mode::Byte, chars),
        ],
        Mode::Alphanumeric => vec![node(Mode::Alphanumeric, chars), node(Mode::Byte, chars)],
        Mode::Kanji => vec![node(Mode::Kanji, chars), node(Mode::Byte, bytes)],
        Mode::Byte | Mode::Mixed => vec![node(Mode::Byte, bytes)],
    }
}

fn header_bits(mode: Mode, version: Version) -> usize {
    4 + usize::from(mode.char_count_bits(version))
}

/// Cheapest node sequence taking one node per layer.
///
/// Ties keep the earlier candidate, both when choosing a predecessor and at the end.
fn shortest_path<'t>(layers: &[Vec<Node<'t>>], version: Version) -> Result<Vec<Node<'t>>, QrError> {
    let not_found = || QrError::PathNotFound { from: "start", to: "end" };
    let mut steps: Vec<Vec<Step>> = Vec::with_capacity(layers.len());

    for (i, layer) in layers.iter().enumerate() {
        let mut current = Vec::with_capacity(layer.len());
        for node in layer {
            let fresh = Segment::bits_for(node.mode, node.length) + header_bits(node.mode, version);
            if i == 0 {
                current.push(Step {
                    cost: fresh,
                    run_length: node.length,
                    prev: None,
                });
                continue;
            }

            let mut best: Option<Step> = None;
            for (k, (prev_node, prev_step)) in layers[i - 1].iter().zip(&steps[i - 1]).enumerate() {
                let step = if prev_node.mode == node.mode {
                    let run_length = prev_step.run_length + node.length;
                    Step {
                        cost: prev_step.cost + Segment::bits_for(node.mode, run_length)
                            - Segment::bits_for(node.mode, prev_step.run_length),
                        run_length,
                        prev: Some(k),
                    }
                } else {
                    Step {
                        cost: prev_step.cost + fresh,
                        run_length: node.length,
                        prev: Some(k),
                    }
                };
                if best.map_or(true, |b| step.cost < b.cost) {
                    best = Some(step);
                }
            }
            current.push(best.ok_or_else(not_found)?);
        }
        steps.push(current);
    }

    let last = steps.last().ok_or_else(not_found)?;
    let mut index = last
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, usize)>, (j, step)| match best {
            Some((_, cost)) if cost <= step.cost => best,
            _ => Some((j, step.cost)),
        })
        .map(|(j, _)| j)
        .ok_or_else(not_found)?;

    let mut path = Vec::with_capacity(layers.len());
    for layer in (0..layers.len()).rev() {
        path.push(layers[layer][index]);
        if let Some(prev) = steps[layer][index].prev {
            index = prev;
        }
    }
    path.reverse();
    Ok(path)
}
