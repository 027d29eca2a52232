//! HTML entity and LaTeX command names

use crate::ingest::CharTable;
use anyhow::{Context, Result};
use serde::Deserialize;

/// `{"c": ["00E9"], "n": ["eacute"]}`; multi-code entities are ignored
#[derive(Debug, Deserialize)]
struct HtmlEntry {
    c: Vec<String>,
    n: Vec<String>,
}

/// `{"c": "00E9", "n": ["\\'e", "\\'{e}"]}`
#[derive(Debug, Deserialize)]
struct LatexEntry {
    c: String,
    n: Vec<String>,
}

fn parse_hex(hex: &str) -> Result<u32> {
    u32::from_str_radix(hex, 16).with_context(|| format!("bad code point {:?}", hex))
}

pub fn apply_html(text: &str, table: &mut CharTable) -> Result<usize> {
    let entries: Vec<HtmlEntry> = serde_json::from_str(text)?;
    let mut applied = 0;
    for entry in entries {
        let [hex] = entry.c.as_slice() else { continue };
        if let Some(record) = table.get_mut(parse_hex(hex)?) {
            record.html_aliases = entry.n;
            applied += 1;
        }
    }
    Ok(applied)
}

pub fn apply_latex(text: &str, table: &mut CharTable) -> Result<usize> {
    let entries: Vec<LatexEntry> = serde_json::from_str(text)?;
    let mut applied = 0;
    for entry in entries {
        if let Some(record) = table.get_mut(parse_hex(&entry.c)?) {
            record.latex_aliases = entry.n;
            applied += 1;
        }
    }
    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::types::CharRecord;

    #[test]
    fn test_html_and_latex() {
        let mut table = CharTable::default();
        table.insert(CharRecord::assigned(0xE9, "LATIN SMALL LETTER E WITH ACUTE", "Ll"));

        let html = r#"[{"c":["00E9"],"n":["eacute"]},{"c":["003C","20D2"],"n":["nvlt"]},{"c":["2022"],"n":["bull"]}]"#;
        assert_eq!(apply_html(html, &mut table).unwrap(), 1);

        let latex = r#"[{"c":"00E9","n":["\\'e","\\'{e}"]}]"#;
        assert_eq!(apply_latex(latex, &mut table).unwrap(), 1);

        let record = table.get(0xE9).unwrap();
        assert_eq!(record.html_aliases, vec!["eacute"]);
        assert_eq!(record.latex_aliases, vec!["\\'e", "\\'{e}"]);

        assert!(apply_html("{}", &mut table).is_err());
        assert!(apply_latex(r#"[{"c":"XYZ","n":[]}]"#, &mut table).is_err());
    }
}
