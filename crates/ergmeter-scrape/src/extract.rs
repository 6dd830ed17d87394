//! Label-anchored extraction of meter counters.
//!
//! The stats page shows the counters next to the labels "Lifetime Meters"
//! and "Season Meters", but the exact nesting has drifted over time: the
//! number may sit in a text node of its own before the label, share the
//! label's text node, or be separated by markup the structural scan cannot
//! follow. Extraction therefore runs an ordered chain of strategies per
//! label and takes the first hit:
//!
//! 1. nearest preceding all-numeric text node
//! 2. digit-strip of the label's own text node
//! 3. raw regex over the whole document

use crate::number::clean_number;
use ergmeter_core::MeterReading;
use once_cell::sync::Lazy;
use regex::Regex;

static LIFETIME_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)lifetime\s*meters").expect("label pattern compiles"));

static SEASON_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)season\s*meters").expect("label pattern compiles"));

static LIFETIME_INLINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)([\d.,]+)\s*lifetime\s*meters").expect("inline pattern compiles")
});

static SEASON_INLINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)([\d.,]+)\s*season\s*meters").expect("inline pattern compiles")
});

/// A text node is "numeric" when its entire trimmed content is digits with
/// optional grouping separators and decimals.
static NUMERIC_NODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\d.,]+$").expect("numeric pattern compiles"));

/// Extract both counters from a stats page. Best effort; a field the page
/// does not yield comes back as `None` and nothing ever panics.
pub fn extract_meters(html: &str) -> MeterReading {
    let segments = text_segments(html);
    MeterReading {
        lifetime: extract_labeled(&segments, html, &LIFETIME_LABEL, &LIFETIME_INLINE),
        season: extract_labeled(&segments, html, &SEASON_LABEL, &SEASON_INLINE),
    }
}

fn extract_labeled(
    segments: &[String],
    html: &str,
    label: &Regex,
    inline: &Regex,
) -> Option<u64> {
    value_before_label(segments, label)
        .or_else(|| value_in_label_node(segments, label))
        .or_else(|| value_by_pattern(html, inline))
}

/// Strategy 1: locate the label's text node, then walk backward through the
/// preceding text nodes and take the nearest one that is entirely numeric.
fn value_before_label(segments: &[String], label: &Regex) -> Option<u64> {
    let at = segments.iter().position(|s| label.is_match(s))?;
    segments[..at]
        .iter()
        .rev()
        .map(|s| s.trim())
        .find(|s| NUMERIC_NODE.is_match(s))
        .and_then(clean_number)
}

/// Strategy 2: the number may share the label's text node
/// ("1,234,567 Lifetime Meters"); digit-strip the whole node.
fn value_in_label_node(segments: &[String], label: &Regex) -> Option<u64> {
    let node = segments.iter().find(|s| label.is_match(s))?;
    clean_number(node)
}

/// Strategy 3: raw regex over the whole document, markup and all.
fn value_by_pattern(html: &str, inline: &Regex) -> Option<u64> {
    inline
        .captures(html)
        .and_then(|caps| caps.get(1))
        .and_then(|m| clean_number(m.as_str()))
}

/// Split a document into the runs of character data between tags, with
/// minimal entity decoding. Empty runs are dropped; indices are in
/// document order, which is what the backward scan relies on.
fn text_segments(html: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => {
                in_tag = true;
                push_segment(&mut segments, &mut current);
            }
            '>' => in_tag = false,
            _ if !in_tag => current.push(ch),
            _ => {}
        }
    }
    push_segment(&mut segments, &mut current);
    segments
}

fn push_segment(segments: &mut Vec<String>, current: &mut String) {
    let text = normalize_entities(current);
    if !text.trim().is_empty() {
        segments.push(text);
    }
    current.clear();
}

/// Minimal entity decoding: the two entities the logbook actually emits.
fn normalize_entities(s: &str) -> String {
    s.replace("&nbsp;", " ").replace("&amp;", "&")
}
