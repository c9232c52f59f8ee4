//! End-to-end tests through the console buffer
//!
//! Each test feeds escape-laden output through `ConsoleBuffer::process`
//! and checks the resulting line contents, run structure, cursor, and
//! snapshots, the way the dump binary consumes the crate.

use std::sync::mpsc;

use ansiloom::buffer::ConsoleBuffer;
use ansiloom::core::{BufferSnapshot, ChannelMirror, Color, SegmentChain, Style, VecMirror};

fn line_text(buffer: &ConsoleBuffer<VecMirror>, row: usize) -> String {
    buffer
        .line(row)
        .map(|line| line.to_string())
        .unwrap_or_default()
}

#[test]
fn test_progress_bar_rewrites_in_place() {
    let mut buffer = ConsoleBuffer::<VecMirror>::new();
    buffer.process("downloading [    ]\r");
    buffer.process("downloading [\x1b[32m##\x1b[0m  ]\r");
    buffer.process("downloading [\x1b[32m####\x1b[0m]");

    assert_eq!(buffer.line_count(), 1);
    assert_eq!(line_text(&buffer, 0), "downloading [####]");

    let line = buffer.line(0).unwrap();
    let green: Vec<&str> = line
        .iter()
        .filter(|(_, seg)| seg.style().fg == Color::GREEN)
        .map(|(_, seg)| seg.text())
        .collect();
    assert_eq!(green, ["####"]);
    assert_eq!(line.mirror().texts(), line.run_texts());
}

#[test]
fn test_multiline_report_snapshot() {
    let mut buffer = ConsoleBuffer::<VecMirror>::new();
    buffer.process("Results:\n  \x1b[32mok\x1b[0m: 10\n  \x1b[31merr\x1b[0m: 1");

    let snapshot = buffer.snapshot();
    assert_eq!(snapshot.to_text(), "Results:\n  ok: 10\n  err: 1");
    assert_eq!(snapshot.cursor.row, 2);
    assert_eq!(snapshot.cursor.column, 8);

    let json = snapshot.to_json().unwrap();
    let back = BufferSnapshot::from_json(&json).unwrap();
    assert_eq!(back, snapshot);
}

#[test]
fn test_cursor_addressed_form_fill() {
    let mut buffer = ConsoleBuffer::<VecMirror>::new();
    buffer.process("\x1b[1;1HName: \x1b[2;1HAge:  \x1b[1;7HAlice\x1b[2;7H30");

    assert_eq!(buffer.line_count(), 2);
    assert_eq!(line_text(&buffer, 0), "Name: Alice");
    assert_eq!(line_text(&buffer, 1), "Age:  30");
    assert_eq!(buffer.cursor().row(), 1);
    assert_eq!(buffer.cursor().column(), 8);
}

#[test]
fn test_erase_trims_command_tail() {
    let mut buffer = ConsoleBuffer::<VecMirror>::new();
    buffer.process("echo hello world\x1b[11G\x1b[K");
    assert_eq!(line_text(&buffer, 0), "echo hello");
}

#[test]
fn test_status_line_overwrite_after_cursor_up() {
    let mut buffer = ConsoleBuffer::<VecMirror>::new();
    buffer.process("compiling crate-a\ncompiling crate-b\nwaiting\x1b[2A");
    buffer.process("\r\x1b[Kdone: crate-a\x1b[2B\r");

    assert_eq!(line_text(&buffer, 0), "done: crate-a");
    assert_eq!(line_text(&buffer, 1), "compiling crate-b");
    assert_eq!(line_text(&buffer, 2), "waiting");
    assert_eq!(buffer.cursor().row(), 2);
    assert_eq!(buffer.cursor().column(), 0);
}

#[test]
fn test_chunked_processing_matches_single_pass() {
    let mut whole = ConsoleBuffer::<VecMirror>::new();
    whole.process("\x1b[1mbold more\x1b[0m end\nplain line");

    let mut chunked = ConsoleBuffer::<VecMirror>::new();
    chunked.process("\x1b[1mbold more\x1b[0m");
    chunked.process(" end\npl");
    chunked.process("ain line");

    assert_eq!(chunked.snapshot(), whole.snapshot());
}

#[test]
fn test_unicode_text_keeps_char_columns() {
    let mut buffer = ConsoleBuffer::<VecMirror>::new();
    buffer.process("héllo wörld\n日本語");

    assert_eq!(line_text(&buffer, 0), "héllo wörld");
    assert_eq!(line_text(&buffer, 1), "日本語");
    // Columns count chars; display width is tracked separately.
    assert_eq!(buffer.cursor().column(), 3);
    assert_eq!(buffer.line(1).unwrap().line_len(), 3);
    assert_eq!(buffer.line(1).unwrap().display_width(), 6);
}

#[test]
fn test_quoted_escape_text_prints_literally() {
    let mut buffer = ConsoleBuffer::<VecMirror>::new();
    buffer.process("raw: \\Q\x1b[31mred\x1b[0m\\E");
    assert_eq!(line_text(&buffer, 0), "raw: \x1b[31mred\x1b[0m");

    let line = buffer.line(0).unwrap();
    assert_eq!(line.segment_count(), 1);
}

#[test]
fn test_channel_mirror_replays_chain_edits() {
    let (tx, rx) = mpsc::channel();
    let mut chain = SegmentChain::new(ChannelMirror::new(tx));
    let bold = Style {
        bold: true,
        ..Style::default()
    };

    chain.append("hello world", Style::default());
    chain.overwrite_run(6, "there", bold).unwrap();
    chain.insert_run(0, "> ", Style::default()).unwrap();
    chain.truncate_from(10).unwrap();

    let mut replayed = VecMirror::new();
    while let Ok(edit) = rx.try_recv() {
        edit.apply(&mut replayed);
    }

    let runs: Vec<(String, Style)> = chain
        .iter()
        .map(|(_, seg)| (seg.text().to_owned(), seg.style()))
        .collect();
    assert_eq!(replayed.entries(), runs.as_slice());
    assert_eq!(chain.to_string(), "> hello th");
}
