//! ECG export extraction
//!
//! Walks the XML document once with a namespace-resolving pull parser and
//! fills a [`Record`]. Tag matching is namespace-qualified: an element is
//! recognized only when its local name matches and its resolved namespace
//! equals the namespace of the root element. Elements from foreign
//! namespaces are ignored.
//!
//! The pass runs in document order. `sampleRate` and `writerSpeed` matches
//! overwrite on each match (last write wins). `wav`, `interpretation` and
//! `hookupAdvisor` sections buffer the payload of their whole subtree and
//! are applied section by section in document order once the pass ends, so
//! a repeated lead name keeps the samples of the section applied last and
//! a statement inside nested sections contributes once per enclosing
//! section.
//!
//! The document must be well formed: mismatched tags, input that ends with
//! open elements and content after the root element all fail extraction.

use crate::types::{ExtractError, Record, Result, UnitValue};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;
use std::path::Path;

/// Extract a record from an export file
///
/// Reads the whole file into memory and parses it. The input must be a
/// well-formed XML document; a missing or unreadable file is reported as
/// [`ExtractError::InputRead`].
pub fn extract_file(path: &Path) -> Result<Record> {
    log::info!("Reading ECG export: {:?}", path);

    let xml = std::fs::read_to_string(path).map_err(|e| ExtractError::InputRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let record = extract_str(&xml)?;

    log::info!(
        "Extracted {} leads at {} {} from {:?}",
        record.leads.len(),
        record.sample_rate.value,
        record.sample_rate.unit,
        path
    );

    Ok(record)
}

/// Extract a record from XML text already in memory
pub fn extract_str(xml: &str) -> Result<Record> {
    let mut reader = NsReader::from_str(xml);
    let mut state = RecordExtractor::new();

    loop {
        match reader.read_resolved_event().map_err(xml_err)? {
            (ns, Event::Start(e)) => state.on_element(bound_uri(ns), &e, true)?,
            (ns, Event::Empty(e)) => state.on_element(bound_uri(ns), &e, false)?,
            (ns, Event::End(e)) => state.on_end(bound_uri(ns), &e),
            (_, Event::Text(e)) => state.on_text(&e)?,
            (_, Event::Eof) => break,
            _ => {}
        }
    }

    state.finish()
}

/// Streaming extraction state for one document pass
///
/// Matched `wav`, `interpretation` and `hookupAdvisor` sections are kept
/// as per-section payload buffers plus a stack of the currently open
/// sections: a payload element is recorded in every enclosing section, and
/// the buffers are applied in document order when the pass finishes. The
/// total open-element depth is tracked separately; input that ends with
/// open elements or continues past the root's close is rejected.
struct RecordExtractor {
    record: Record,
    saw_root: bool,
    open_depth: usize,
    wav_sections: Vec<Vec<(String, Vec<f64>)>>,
    open_wavs: Vec<usize>,
    interpretation_sections: Vec<Vec<String>>,
    open_interpretations: Vec<usize>,
    advisor_sections: Vec<Vec<String>>,
    open_advisors: Vec<usize>,
}

impl RecordExtractor {
    fn new() -> Self {
        Self {
            record: Record::new(),
            saw_root: false,
            open_depth: 0,
            wav_sections: Vec::new(),
            open_wavs: Vec::new(),
            interpretation_sections: Vec::new(),
            open_interpretations: Vec::new(),
            advisor_sections: Vec::new(),
            open_advisors: Vec::new(),
        }
    }

    /// Handle a start or empty element. `has_children` is false for empty
    /// elements, which open no section.
    fn on_element(&mut self, uri: Option<&[u8]>, e: &BytesStart, has_children: bool) -> Result<()> {
        if self.saw_root && self.open_depth == 0 {
            return Err(ExtractError::MalformedXml(
                "junk after document element".to_string(),
            ));
        }

        if !self.saw_root {
            self.saw_root = true;
            self.record.namespace = uri.map(|u| String::from_utf8_lossy(u).into_owned());
            log::debug!("Root namespace: {:?}", self.record.namespace);
        }

        if has_children {
            self.open_depth += 1;
        }

        if !self.in_root_namespace(uri) {
            return Ok(());
        }

        match e.local_name().as_ref() {
            b"sampleRate" => {
                self.record.sample_rate = metadata_value(e, "sampleRate")?;
                log::debug!(
                    "Sample rate: {} {}",
                    self.record.sample_rate.value,
                    self.record.sample_rate.unit
                );
            }
            b"writerSpeed" => {
                self.record.writer_speed = metadata_value(e, "writerSpeed")?;
                log::debug!(
                    "Writer speed: {} {}",
                    self.record.writer_speed.value,
                    self.record.writer_speed.unit
                );
            }
            b"wav" if has_children => open_section(&mut self.wav_sections, &mut self.open_wavs),
            b"ecgWaveform" if !self.open_wavs.is_empty() => self.store_waveform(e)?,
            b"interpretation" if has_children => {
                open_section(&mut self.interpretation_sections, &mut self.open_interpretations)
            }
            b"hookupAdvisor" if has_children => {
                open_section(&mut self.advisor_sections, &mut self.open_advisors)
            }
            b"statement"
                if !self.open_interpretations.is_empty() || !self.open_advisors.is_empty() =>
            {
                self.store_statement(e)?
            }
            _ => {}
        }

        Ok(())
    }

    fn on_end(&mut self, uri: Option<&[u8]>, e: &BytesEnd) {
        self.open_depth = self.open_depth.saturating_sub(1);

        if !self.in_root_namespace(uri) {
            return;
        }

        match e.local_name().as_ref() {
            b"wav" => {
                self.open_wavs.pop();
            }
            b"interpretation" => {
                self.open_interpretations.pop();
            }
            b"hookupAdvisor" => {
                self.open_advisors.pop();
            }
            _ => {}
        }
    }

    /// Non-whitespace character data is only legal inside the root element
    fn on_text(&mut self, text: &[u8]) -> Result<()> {
        if self.saw_root
            && self.open_depth == 0
            && !text.iter().all(u8::is_ascii_whitespace)
        {
            return Err(ExtractError::MalformedXml(
                "junk after document element".to_string(),
            ));
        }
        Ok(())
    }

    /// True when the element's resolved namespace equals the root's
    fn in_root_namespace(&self, uri: Option<&[u8]>) -> bool {
        match (&self.record.namespace, uri) {
            (Some(root), Some(uri)) => root.as_bytes() == uri,
            (None, None) => true,
            _ => false,
        }
    }

    fn store_waveform(&mut self, e: &BytesStart) -> Result<()> {
        let lead = require_attr(e, "ecgWaveform", "lead")?;
        let text = require_attr(e, "ecgWaveform", "V")?;
        let samples = parse_samples(&text)?;

        log::debug!("Lead {}: {} samples", lead, samples.len());
        store_in_sections(&mut self.wav_sections, &self.open_wavs, (lead, samples));
        Ok(())
    }

    fn store_statement(&mut self, e: &BytesStart) -> Result<()> {
        let value = require_attr(e, "statement", "V")?;

        store_in_sections(
            &mut self.interpretation_sections,
            &self.open_interpretations,
            value.clone(),
        );
        store_in_sections(&mut self.advisor_sections, &self.open_advisors, value);
        Ok(())
    }

    /// Finalize the record, applying the buffered sections in document
    /// order
    fn finish(self) -> Result<Record> {
        if !self.saw_root {
            return Err(ExtractError::MalformedXml(
                "document contains no root element".to_string(),
            ));
        }
        if self.open_depth > 0 {
            return Err(ExtractError::MalformedXml(
                "unexpected end of document".to_string(),
            ));
        }

        log::debug!(
            "Statements: {} interpretation, {} advisor",
            self.interpretation_sections.iter().map(Vec::len).sum::<usize>(),
            self.advisor_sections.iter().map(Vec::len).sum::<usize>()
        );

        let mut record = self.record;
        for (lead, samples) in self.wav_sections.into_iter().flatten() {
            record.leads.insert(lead, samples);
        }
        record.interpretation = join_sections(&self.interpretation_sections);
        record.diagnosis = join_sections(&self.advisor_sections);
        Ok(record)
    }
}

/// Namespace URI of a resolved element, if any
fn bound_uri(ns: ResolveResult<'_>) -> Option<&[u8]> {
    match ns {
        ResolveResult::Bound(Namespace(uri)) => Some(uri),
        _ => None,
    }
}

fn xml_err(e: impl std::fmt::Display) -> ExtractError {
    ExtractError::MalformedXml(e.to_string())
}

/// Open a new section buffer and push it on the open-section stack
fn open_section<T>(sections: &mut Vec<Vec<T>>, open: &mut Vec<usize>) {
    sections.push(Vec::new());
    open.push(sections.len() - 1);
}

/// Record a payload value in every currently open section
fn store_in_sections<T: Clone>(sections: &mut [Vec<T>], open: &[usize], value: T) {
    if let Some((&last, outer)) = open.split_last() {
        for &idx in outer {
            sections[idx].push(value.clone());
        }
        sections[last].push(value);
    }
}

/// Read a required attribute, unescaping entity references
fn require_attr(e: &BytesStart, element: &'static str, name: &'static str) -> Result<String> {
    for attr in e.attributes() {
        let attr = attr.map_err(xml_err)?;
        if attr.key.as_ref() == name.as_bytes() {
            let value = attr.unescape_value().map_err(xml_err)?;
            return Ok(value.into_owned());
        }
    }

    Err(ExtractError::MissingAttribute {
        element,
        attribute: name,
    })
}

/// Read the `U`/`V` attribute pair of a metadata element
fn metadata_value(e: &BytesStart, element: &'static str) -> Result<UnitValue> {
    let unit = require_attr(e, element, "U")?;
    let text = require_attr(e, element, "V")?;
    let value = parse_number(element, &text)?;
    Ok(UnitValue { unit, value })
}

/// Parse the whitespace-separated sample list of a waveform element
///
/// Zero tokens make an empty sample list, which is valid.
fn parse_samples(text: &str) -> Result<Vec<f64>> {
    text.split_whitespace()
        .map(|token| parse_number("ecgWaveform", token))
        .collect()
}

fn parse_number(element: &'static str, text: &str) -> Result<f64> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| ExtractError::InvalidNumber {
            element,
            value: text.to_string(),
        })
}

/// Fold the buffered section values into one string, every value followed
/// by a single space. The trailing space is part of the format.
fn join_sections(sections: &[Vec<String>]) -> String {
    sections.iter().flatten().fold(String::new(), |mut acc, part| {
        acc.push_str(part);
        acc.push(' ');
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_error() {
        let result = extract_str("");
        assert!(matches!(result, Err(ExtractError::MalformedXml(_))));

        let result = extract_str("<!-- nothing here -->");
        assert!(matches!(result, Err(ExtractError::MalformedXml(_))));
    }

    #[test]
    fn test_mismatched_tags_are_error() {
        let result = extract_str("<root><wav></root>");
        assert!(matches!(result, Err(ExtractError::MalformedXml(_))));
    }

    #[test]
    fn test_truncated_document_is_error() {
        let result = extract_str(r#"<root><wav><ecgWaveform lead="I" V="1 2"/>"#);
        assert!(matches!(result, Err(ExtractError::MalformedXml(_))));
    }

    #[test]
    fn test_content_after_root_is_error() {
        let result = extract_str(r#"<root/><wav><ecgWaveform lead="I" V="9"/></wav>"#);
        assert!(matches!(result, Err(ExtractError::MalformedXml(_))));

        let result = extract_str("<root></root><root/>");
        assert!(matches!(result, Err(ExtractError::MalformedXml(_))));
    }

    #[test]
    fn test_text_after_root_is_error() {
        let result = extract_str("<root/>leftover");
        assert!(matches!(result, Err(ExtractError::MalformedXml(_))));

        // Trailing whitespace stays legal
        extract_str("<root/>\n").unwrap();
    }

    #[test]
    fn test_namespace_detection() {
        let record = extract_str(r#"<root xmlns="urn:ecg:v1"/>"#).unwrap();
        assert_eq!(record.namespace.as_deref(), Some("urn:ecg:v1"));

        let record = extract_str("<root/>").unwrap();
        assert_eq!(record.namespace, None);
    }

    #[test]
    fn test_metadata_defaults_without_elements() {
        let record = extract_str("<root/>").unwrap();
        assert_eq!(record.sample_rate, UnitValue::new("Hz", 1000.0));
        assert_eq!(record.writer_speed, UnitValue::new("mm/s", 25.0));
    }

    #[test]
    fn test_last_sample_rate_wins() {
        let record = extract_str(
            r#"<root>
                <sampleRate U="Hz" V="250"/>
                <sampleRate U="kHz" V="500"/>
            </root>"#,
        )
        .unwrap();

        assert_eq!(record.sample_rate, UnitValue::new("kHz", 500.0));
    }

    #[test]
    fn test_invalid_metadata_value_fails() {
        let result = extract_str(r#"<root><sampleRate U="Hz" V="fast"/></root>"#);
        assert!(matches!(
            result,
            Err(ExtractError::InvalidNumber {
                element: "sampleRate",
                ..
            })
        ));
    }

    #[test]
    fn test_invalid_sample_token_fails() {
        let result = extract_str(
            r#"<root><wav><ecgWaveform lead="I" V="100 oops 300"/></wav></root>"#,
        );
        assert!(matches!(
            result,
            Err(ExtractError::InvalidNumber {
                element: "ecgWaveform",
                ..
            })
        ));
    }

    #[test]
    fn test_missing_lead_attribute_fails() {
        let result = extract_str(r#"<root><wav><ecgWaveform V="100"/></wav></root>"#);
        assert!(matches!(
            result,
            Err(ExtractError::MissingAttribute {
                element: "ecgWaveform",
                attribute: "lead",
            })
        ));
    }

    #[test]
    fn test_empty_waveform_value_gives_empty_lead() {
        let record = extract_str(r#"<root><wav><ecgWaveform lead="I" V=""/></wav></root>"#)
            .unwrap();
        assert_eq!(record.leads.get("I"), Some(&[][..]));
    }

    #[test]
    fn test_waveform_outside_wav_is_ignored() {
        let record = extract_str(r#"<root><ecgWaveform lead="I" V="100"/></root>"#).unwrap();
        assert!(record.leads.is_empty());
    }

    #[test]
    fn test_statement_outside_sections_is_ignored() {
        // Not even the missing V attribute matters outside a section
        let record = extract_str("<root><statement/></root>").unwrap();
        assert_eq!(record.interpretation, "");
        assert_eq!(record.diagnosis, "");
    }

    #[test]
    fn test_nested_sections_count_statements_once_per_section() {
        let record = extract_str(
            r#"<root>
                <interpretation><interpretation><statement V="x"/></interpretation></interpretation>
            </root>"#,
        )
        .unwrap();

        assert_eq!(record.interpretation, "x x ");
    }

    #[test]
    fn test_nested_section_replay_is_outer_section_first() {
        let record = extract_str(
            r#"<root><interpretation>
                <statement V="a"/>
                <interpretation><statement V="x"/></interpretation>
                <statement V="b"/>
            </interpretation></root>"#,
        )
        .unwrap();

        // The outer section collects a, x, b; the inner section adds x
        assert_eq!(record.interpretation, "a x b x ");
    }

    #[test]
    fn test_nested_wav_keeps_inner_section_samples() {
        let record = extract_str(
            r#"<root><wav>
                <ecgWaveform lead="I" V="1"/>
                <wav><ecgWaveform lead="I" V="2"/></wav>
                <ecgWaveform lead="I" V="3"/>
            </wav></root>"#,
        )
        .unwrap();

        // The nested wav is applied after its parent finishes
        assert_eq!(record.leads.get("I"), Some(&[2.0][..]));
    }

    #[test]
    fn test_escaped_attribute_values_are_unescaped() {
        let record = extract_str(
            r#"<root>
                <interpretation><statement V="PR &gt; 200 ms &amp; QT normal"/></interpretation>
            </root>"#,
        )
        .unwrap();

        assert_eq!(record.interpretation, "PR > 200 ms & QT normal ");
    }

    #[test]
    fn test_extract_file_not_found() {
        let result = extract_file(Path::new("nonexistent.xml"));
        assert!(matches!(result, Err(ExtractError::InputRead { .. })));
    }
}
