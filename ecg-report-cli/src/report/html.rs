//! HTML document assembly
//!
//! Builds the final self-contained report: the per-lead SVG panels in
//! table order, then the two clinical text blocks, then the generation
//! footer. Text content is escaped; panel SVG is embedded as-is.

use chrono::Utc;
use ecg_record::Record;
use quick_xml::escape::escape;

/// Assemble the complete report document
pub fn assemble(record: &Record, panels: &[String]) -> String {
    let mut body = String::new();

    for panel in panels {
        body.push_str("    <div class=\"panel\">\n");
        body.push_str(panel);
        body.push_str("\n    </div>\n");
    }

    body.push_str(&text_block("Interpretation", &record.interpretation));
    body.push_str(&text_block("Diagnosis", &record.diagnosis));

    let generated = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>ECG Report</title>
<style>
body {{
    font-family: arial, sans-serif;
    background-color: #ffffff;
    color: #000000;
    margin: 20px;
}}
.panel svg {{
    width: 100%;
    height: auto;
}}
.text-block {{
    font-size: 10pt;
    margin: 10px 0;
}}
.footer {{
    font-size: 8pt;
    color: #666666;
    margin-top: 20px;
}}
</style>
</head>
<body>
{body}    <div class="footer">Generated {generated}</div>
</body>
</html>
"#
    )
}

/// One labelled text block with escaped body text
fn text_block(label: &str, text: &str) -> String {
    format!(
        "    <div class=\"text-block\"><b>{}:</b> {}</div>\n",
        label,
        escape(text)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with_texts(interpretation: &str, diagnosis: &str) -> Record {
        let mut record = Record::new();
        record.interpretation = interpretation.to_string();
        record.diagnosis = diagnosis.to_string();
        record
    }

    #[test]
    fn test_panels_appear_in_order() {
        let record = Record::new();
        let panels = vec!["<svg>first</svg>".to_string(), "<svg>second</svg>".to_string()];

        let document = assemble(&record, &panels);

        let first = document.find("first").unwrap();
        let second = document.find("second").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_text_content_is_escaped() {
        let record = record_with_texts("QT < 450 ms & stable ", "");
        let document = assemble(&record, &[]);

        assert!(document.contains("QT &lt; 450 ms &amp; stable"));
        assert!(!document.contains("QT < 450"));
    }

    #[test]
    fn test_document_structure() {
        let record = record_with_texts("", "");
        let document = assemble(&record, &[]);

        assert!(document.starts_with("<!DOCTYPE html>"));
        assert!(document.contains("<title>ECG Report</title>"));
        assert!(document.contains("Interpretation"));
        assert!(document.contains("Diagnosis"));
        assert!(document.contains("Generated "));
        assert!(document.ends_with("</html>\n"));
    }
}
