//! Terminal output for characters, rows, search results and status

use crate::data::types::{Block, CharRecord, CodePoint, Sequence, to_hex};
use crate::query::{SearchHit, SearchResult};
use crate::server::protocol::{CharInfo, StatusResponse};
use serde::Serialize;
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

fn stdout(color: bool) -> StandardStream {
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stdout(choice)
}

/// Print any response value as pretty JSON (for --json)
pub fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)
}

/// The glyph for a record, or nothing when it would not render on its own
fn glyph(record: &CharRecord) -> Option<char> {
    if !record.is_assigned() || record.general_category.starts_with('C') {
        return None;
    }
    record.as_char()
}

fn codes_label(codes: &[CodePoint]) -> String {
    codes
        .iter()
        .map(|&c| format!("U+{}", to_hex(c)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn write_code(out: &mut impl WriteColor, code: CodePoint) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
    write!(out, "U+{:<6}", to_hex(code))?;
    out.reset()
}

fn write_field(out: &mut impl WriteColor, label: &str, value: &str) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
    write!(out, "{:>12}", label)?;
    out.reset()?;
    writeln!(out, "  {}", value)
}

pub fn write_char_info(out: &mut impl WriteColor, info: &CharInfo) -> io::Result<()> {
    let record = &info.char;
    write_code(out, record.code)?;
    if let Some(c) = glyph(record) {
        write!(out, " {}", c)?;
    }
    out.set_color(ColorSpec::new().set_bold(true))?;
    writeln!(out, "  {}", record.name.as_deref().unwrap_or("<unassigned>"))?;
    out.reset()?;

    let category = match &info.category_label {
        Some(label) => format!("{} ({})", label, record.general_category),
        None => record.general_category.clone(),
    };
    write_field(out, "category", &category)?;
    if let Some(age) = info.age_label.as_deref().or(record.age.as_deref()) {
        write_field(out, "age", age)?;
    }
    if let Some(block) = &info.block {
        write_field(out, "block", block)?;
    }
    if let Some(decomposition) = &record.decomposition {
        write_field(out, "decomp", decomposition)?;
    }
    if !record.cross_references.is_empty() {
        write_field(out, "see also", &codes_label(&record.cross_references))?;
    }
    if !record.html_aliases.is_empty() {
        let entities: Vec<String> = record.html_aliases.iter().map(|n| format!("&{};", n)).collect();
        write_field(out, "html", &entities.join(" "))?;
    }
    if !record.latex_aliases.is_empty() {
        write_field(out, "latex", &record.latex_aliases.join(" "))?;
    }
    if record.is_emoji {
        write_field(out, "emoji", "default presentation")?;
    }

    let readings = [
        ("pinyin", &record.pinyin),
        ("definition", &record.definition),
        ("on", &record.japanese_on),
        ("kun", &record.japanese_kun),
        ("korean", &record.korean),
        ("vietnamese", &record.vietnamese),
    ];
    for (label, value) in readings {
        if let Some(value) = value {
            write_field(out, label, value)?;
        }
    }
    if !record.variant_codes.is_empty() {
        write_field(out, "variants", &codes_label(&record.variant_codes))?;
    }
    Ok(())
}

pub fn print_char_info(info: &CharInfo, color: bool) -> io::Result<()> {
    write_char_info(&mut stdout(color), info)
}

pub fn write_row(out: &mut impl WriteColor, records: &[CharRecord]) -> io::Result<()> {
    for record in records {
        write_code(out, record.code)?;
        match glyph(record) {
            Some(c) => write!(out, " {} ", c)?,
            None => write!(out, "   ")?,
        }
        match &record.name {
            Some(name) => writeln!(out, " {}", name)?,
            None => {
                out.set_color(ColorSpec::new().set_dimmed(true))?;
                writeln!(out, " <{:?}>", record.kind)?;
                out.reset()?;
            }
        }
    }
    Ok(())
}

pub fn print_row(records: &[CharRecord], color: bool) -> io::Result<()> {
    write_row(&mut stdout(color), records)
}

pub fn write_search_results(out: &mut impl WriteColor, results: &[SearchResult]) -> io::Result<()> {
    for result in results {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
        write!(out, "{:>5.1} ", result.relevance)?;
        out.reset()?;

        let (text, name) = match &result.hit {
            SearchHit::Char { char } => (
                glyph(char).map(String::from).unwrap_or_default(),
                char.name.clone().unwrap_or_default(),
            ),
            SearchHit::Sequence { sequence } => (sequence.to_text(), sequence.name.clone()),
        };
        out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        write!(out, "{:<24}", codes_label(&result.codes))?;
        out.reset()?;
        write!(out, " {:<3}", text)?;
        out.set_color(ColorSpec::new().set_bold(true))?;
        write!(out, " {}", name)?;
        out.reset()?;

        if !result.matched.is_empty() {
            let matched: Vec<&str> = result.matched.iter().collect();
            out.set_color(ColorSpec::new().set_dimmed(true))?;
            write!(out, "  [{}]", matched.join(", "))?;
            out.reset()?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn print_search_results(results: &[SearchResult], color: bool) -> io::Result<()> {
    write_search_results(&mut stdout(color), results)
}

pub fn write_blocks<'a>(out: &mut impl WriteColor, blocks: impl IntoIterator<Item = &'a Block>) -> io::Result<()> {
    for block in blocks {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        write!(out, "{:>6}..{:<6}", to_hex(block.first_code), to_hex(block.last_code))?;
        out.reset()?;
        writeln!(out, " {}", block.name)?;
    }
    Ok(())
}

pub fn print_blocks<'a>(blocks: impl IntoIterator<Item = &'a Block>, color: bool) -> io::Result<()> {
    write_blocks(&mut stdout(color), blocks)
}

pub fn write_sequences(out: &mut impl WriteColor, sequences: &[Sequence]) -> io::Result<()> {
    for sequence in sequences {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        write!(out, "{:<24}", codes_label(&sequence.codes))?;
        out.reset()?;
        write!(out, " {} ", sequence.to_text())?;
        out.set_color(ColorSpec::new().set_bold(true))?;
        write!(out, " {}", sequence.name)?;
        out.reset()?;
        if let Some(age) = sequence.age_label().or(sequence.age.as_deref()) {
            out.set_color(ColorSpec::new().set_dimmed(true))?;
            write!(out, "  {}", age)?;
            out.reset()?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn print_sequences(sequences: &[Sequence], color: bool) -> io::Result<()> {
    write_sequences(&mut stdout(color), sequences)
}

pub fn print_status(status: &StatusResponse, color: bool) -> io::Result<()> {
    let mut out = stdout(color);
    out.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
    writeln!(out, "Daemon running")?;
    out.reset()?;
    write_field(&mut out, "uptime", &format!("{}s", status.uptime_secs))?;
    write_field(&mut out, "requests", &status.requests_served.to_string())?;
    write_field(&mut out, "searches", &status.searches_served.to_string())?;
    write_field(&mut out, "cache hits", &format!("{:.1}%", status.cache_hit_rate * 100.0))?;
    write_field(&mut out, "chunks", &status.chunks_loaded.to_string())?;
    write_field(&mut out, "reads", &status.chunk_reads.to_string())?;
    write_field(&mut out, "resources", &status.resources)
}
