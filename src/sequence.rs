//! Frame sequence collapsing
//!
//! Folds a family of per-frame paths (`render.0001.exr`, `render.0002.exr`, ...)
//! into one [`FrameSequence`]: shared head and tail text, a padding width and
//! the set of frame numbers. A sequence is also written and read in collection
//! notation, `render.%04d.exr [1-3, 5]`.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// `%04d`, `%d` or a run of `#`
static FRAME_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%(?P<width>\d*)d|(?P<hashes>#+)").unwrap());

/// Trailing ` [1-3, 5]` range list
static RANGES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\[(?P<ranges>[^\]]*)\]\s*$").unwrap());

static DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// Widest padding a frame token may ask for
pub const MAX_PADDING: usize = 32;

/// Most frames one sequence may cover from `frame_in` to `frame_out`
pub const MAX_FRAME_SPAN: u64 = 1_000_000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameSequenceError {
    #[error("malformed frame sequence '{input}': {reason}")]
    Malformed { input: String, reason: String },
}

fn malformed(input: &str, reason: impl Into<String>) -> FrameSequenceError {
    FrameSequenceError::Malformed {
        input: input.to_string(),
        reason: reason.into(),
    }
}

/// Per-frame paths sharing a head and tail, with an inclusive frame range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSequence {
    head: String,
    padding: usize,
    tail: String,
    indexes: BTreeSet<u64>,
}

/// The single logical record stored in place of every per-frame path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameRecord {
    pub path: String,
    pub collection_path: String,
    pub frame_in: u64,
    pub frame_out: u64,
}

impl FrameSequence {
    /// Build a sequence.
    ///
    /// There must be at least one frame, the padding may not exceed
    /// [`MAX_PADDING`] and `frame_in..=frame_out` may not cover more than
    /// [`MAX_FRAME_SPAN`] frames.
    pub fn new(
        head: impl Into<String>,
        padding: usize,
        tail: impl Into<String>,
        indexes: impl IntoIterator<Item = u64>,
    ) -> Result<Self, FrameSequenceError> {
        let head = head.into();
        let tail = tail.into();
        let indexes: BTreeSet<u64> = indexes.into_iter().collect();
        if indexes.is_empty() {
            return Err(malformed(&format!("{}{}", head, tail), "no frames"));
        }
        if padding > MAX_PADDING {
            return Err(malformed(
                &format!("{}{}", head, tail),
                format!("padding of {} digits exceeds {}", padding, MAX_PADDING),
            ));
        }
        if let (Some(&first), Some(&last)) = (indexes.first(), indexes.last()) {
            check_span(first, last)
                .map_err(|reason| malformed(&format!("{}{}", head, tail), reason))?;
        }
        Ok(Self {
            head,
            padding,
            tail,
            indexes,
        })
    }

    pub fn head(&self) -> &str {
        &self.head
    }

    pub fn tail(&self) -> &str {
        &self.tail
    }

    /// Digit count of a padded frame number; 0 means unpadded
    pub fn padding(&self) -> usize {
        self.padding
    }

    /// Frame numbers in ascending order
    pub fn indexes(&self) -> impl Iterator<Item = u64> + '_ {
        self.indexes.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    pub fn frame_in(&self) -> u64 {
        self.indexes.first().copied().unwrap_or_default()
    }

    pub fn frame_out(&self) -> u64 {
        self.indexes.last().copied().unwrap_or_default()
    }

    /// `%04d`, or `%d` when unpadded
    pub fn padding_token(&self) -> String {
        if self.padding == 0 {
            "%d".to_string()
        } else {
            format!("%0{}d", self.padding)
        }
    }

    /// One representative path with the padding token in place of a frame
    pub fn format_single(&self) -> String {
        format!("{}{}{}", self.head, self.padding_token(), self.tail)
    }

    /// Compressed frame list, e.g. `1-3, 5`
    pub fn ranges(&self) -> String {
        let mut parts = Vec::new();
        let mut frames = self.indexes.iter().copied().peekable();
        while let Some(start) = frames.next() {
            let mut end = start;
            while let Some(next) = end.checked_add(1).filter(|next| frames.peek() == Some(next)) {
                end = next;
                frames.next();
            }
            if start == end {
                parts.push(start.to_string());
            } else {
                parts.push(format!("{}-{}", start, end));
            }
        }
        parts.join(", ")
    }

    /// Frames missing between `frame_in` and `frame_out`
    pub fn holes(&self) -> Vec<u64> {
        (self.frame_in()..=self.frame_out())
            .filter(|frame| !self.indexes.contains(frame))
            .collect()
    }

    /// Concrete per-frame paths
    pub fn paths(&self) -> impl Iterator<Item = String> + '_ {
        self.indexes.iter().map(move |frame| {
            format!(
                "{}{:0width$}{}",
                self.head,
                frame,
                self.tail,
                width = self.padding
            )
        })
    }

    pub fn record(&self) -> FrameRecord {
        FrameRecord {
            path: self.format_single(),
            collection_path: self.to_string(),
            frame_in: self.frame_in(),
            frame_out: self.frame_out(),
        }
    }
}

impl fmt::Display for FrameSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.format_single(), self.ranges())
    }
}

impl FromStr for FrameSequence {
    type Err = FrameSequenceError;

    /// Parse collection notation: `head%04dtail [1-3, 5]` or `head####tail [1-3]`
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let ranges = RANGES_RE
            .captures(input)
            .ok_or_else(|| malformed(input, "missing frame range list, expected `[first-last]`"))?;
        let body = &input[..ranges.get(0).map_or(input.len(), |m| m.start())];

        let token = FRAME_TOKEN_RE
            .captures(body)
            .ok_or_else(|| malformed(input, "no frame token (`%04d` or `####`) found"))?;
        let whole = token.get(0).map_or(0..0, |m| m.range());
        if FRAME_TOKEN_RE.is_match(&body[whole.end..]) {
            return Err(malformed(input, "more than one frame token"));
        }

        let padding = match (token.name("width"), token.name("hashes")) {
            (Some(width), _) if width.as_str().is_empty() => 0,
            (Some(width), _) => width
                .as_str()
                .parse()
                .map_err(|_| malformed(input, "padding width is not a number"))?,
            (None, Some(hashes)) => hashes.as_str().len(),
            (None, None) => 0,
        };

        let indexes = parse_ranges(&ranges["ranges"]).map_err(|reason| malformed(input, reason))?;
        FrameSequence::new(&body[..whole.start], padding, &body[whole.end..], indexes)
            .map_err(|FrameSequenceError::Malformed { reason, .. }| malformed(input, reason))
    }
}

fn check_span(first: u64, last: u64) -> Result<(), String> {
    if last - first >= MAX_FRAME_SPAN {
        return Err(format!(
            "frames {} to {} span more than {} frames",
            first, last, MAX_FRAME_SPAN
        ));
    }
    Ok(())
}

/// Expand a range list; the whole list must fit in [`MAX_FRAME_SPAN`]
fn parse_ranges(ranges: &str) -> Result<BTreeSet<u64>, String> {
    let mut bounds = Vec::new();
    for part in ranges.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let parse = |s: &str| {
            s.trim()
                .parse::<u64>()
                .map_err(|_| format!("invalid frame number '{}'", s.trim()))
        };
        match part.split_once('-') {
            Some((start, end)) => {
                let (start, end) = (parse(start)?, parse(end)?);
                if start > end {
                    return Err(format!("range '{}' runs backwards", part));
                }
                bounds.push((start, end));
            }
            None => {
                let frame = parse(part)?;
                bounds.push((frame, frame));
            }
        }
    }

    let first = bounds.iter().map(|&(start, _)| start).min();
    let last = bounds.iter().map(|&(_, end)| end).max();
    if let (Some(first), Some(last)) = (first, last) {
        check_span(first, last)?;
    }
    Ok(bounds.into_iter().flat_map(|(start, end)| start..=end).collect())
}

/// Collapse frame paths, or a single pattern in collection notation, into
/// one sequence.
///
/// A lone input containing a frame token (`%04d`, `####`) is read as
/// collection notation; anything else is a list of concrete per-frame paths.
pub fn collapse<S: AsRef<str>>(inputs: &[S]) -> Result<FrameSequence, FrameSequenceError> {
    match inputs {
        [] => Err(malformed("", "no input paths")),
        [single] if FRAME_TOKEN_RE.is_match(single.as_ref()) => single.as_ref().parse(),
        _ => collapse_paths(inputs),
    }
}

/// Collapse concrete per-frame paths.
///
/// The frame number is the rightmost digit run of the first path (ignoring a
/// letter-initial extension such as `.mp4`) around which every input shares
/// the same head and tail.
#[tracing::instrument(level = "debug", skip(paths), fields(count = paths.len()), err)]
pub fn collapse_paths<S: AsRef<str>>(paths: &[S]) -> Result<FrameSequence, FrameSequenceError> {
    let first = paths
        .first()
        .map(AsRef::as_ref)
        .ok_or_else(|| malformed("", "no input paths"))?;

    let extension_start = extension_start(first);
    let runs: Vec<_> = DIGITS_RE
        .find_iter(first)
        .filter(|m| extension_start.map_or(true, |ext| m.start() < ext))
        .collect();

    for run in runs.iter().rev() {
        let head = &first[..run.start()];
        let tail = &first[run.end()..];
        if let Some(frames) = frames_between(paths, head, tail) {
            let padding = padding_of(&frames).map_err(|reason| malformed(first, reason))?;
            let indexes = frames
                .iter()
                .map(|digits| digits.parse::<u64>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| malformed(first, "frame number out of range"))?;
            debug!(head, tail, padding, frames = indexes.len(), "collapsed frame paths");
            return FrameSequence::new(head, padding, tail, indexes);
        }
    }

    Err(malformed(first, "no frame number shared by every path"))
}

/// Byte offset of the `.` starting a letter-initial extension of the file name
fn extension_start(path: &str) -> Option<usize> {
    let name_start = path.rfind(['/', '\\']).map_or(0, |i| i + 1);
    let dot = name_start + path[name_start..].rfind('.')?;
    path[dot + 1..]
        .chars()
        .next()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|_| dot)
}

/// The frame digits of every path, if they all share `head` and `tail`
fn frames_between<'a, S: AsRef<str>>(paths: &'a [S], head: &str, tail: &str) -> Option<Vec<&'a str>> {
    paths
        .iter()
        .map(|path| {
            let digits = path.as_ref().strip_prefix(head)?.strip_suffix(tail)?;
            (!digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())).then_some(digits)
        })
        .collect()
}

/// Padded frames (leading zero) fix the width; unpadded frames may be longer
/// than it but never shorter.
fn padding_of(frames: &[&str]) -> Result<usize, String> {
    let mut padding = 0;
    for digits in frames {
        if digits.len() > 1 && digits.starts_with('0') {
            if padding != 0 && padding != digits.len() {
                return Err(format!(
                    "inconsistent padding: {} and {} digits",
                    padding,
                    digits.len()
                ));
            }
            padding = digits.len();
        }
    }
    if let Some(short) = frames.iter().find(|d| d.len() < padding) {
        return Err(format!(
            "frame '{}' is shorter than the {}-digit padding",
            short, padding
        ));
    }
    Ok(padding)
}
