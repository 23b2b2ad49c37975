use std::io::{self, BufRead, Cursor, Read};

use keytone::hal::StorageError;
use keytone::script::{MAX_NAME_LEN, ScriptLine, ScriptStream, SongName, parse_line};

#[test]
fn test_parse_line_grammar() {
    // A chord with a duration.
    let ScriptLine::Step(step) = parse_line("0,2 500") else {
        panic!("expected a step");
    };
    assert_eq!(step.mask.keys().collect::<Vec<_>>(), vec![0, 2]);
    assert_eq!(step.duration_ms, 500);

    // Comment and blank lines are skipped.
    assert_eq!(parse_line("#comment"), ScriptLine::Comment);
    assert_eq!(parse_line(""), ScriptLine::Blank);

    // Out-of-range indices drop out of the mask; the line becomes a rest.
    let ScriptLine::Step(rest) = parse_line("9 300") else {
        panic!("expected a step");
    };
    assert!(rest.is_rest());
    assert_eq!(rest.duration_ms, 300);

    // No separator at all: the line is skipped entirely.
    assert_eq!(parse_line("0,2,500"), ScriptLine::Skipped);
}

#[test]
fn test_stream_parses_a_realistic_script() {
    let script = "\
# mary had a little lamb, opening
4 400
2 400
0 400
2 400

4 400
4 400
4 800
# end of phrase
";
    let steps: Vec<_> = ScriptStream::new(Cursor::new(script))
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(steps.len(), 7);
    assert_eq!(steps[0].mask.bits(), 0b0001_0000);
    assert_eq!(steps[6].duration_ms, 800);
    assert!(steps.iter().all(|step| !step.is_rest()));
}

#[test]
fn test_stream_counts_raw_lines() {
    let script = "# header\n\n0 100\n";
    let mut stream = ScriptStream::new(Cursor::new(script));
    assert!(stream.next().is_some());
    assert_eq!(stream.line_number(), 3);
    assert!(stream.next().is_none());
}

struct FailingReader;

impl Read for FailingReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::other("card yanked"))
    }
}

impl BufRead for FailingReader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        Err(io::Error::other("card yanked"))
    }

    fn consume(&mut self, _amt: usize) {}
}

#[test]
fn test_stream_surfaces_read_errors() {
    let mut stream = ScriptStream::new(FailingReader);
    match stream.next() {
        Some(Err(StorageError::Io(msg))) => assert!(msg.contains("card yanked")),
        other => panic!("expected an i/o error, got {:?}", other),
    }
}

#[test]
fn test_song_name_bounds() {
    let long = SongName::truncated("GREENSLEEVES_FULL.TXT");
    assert_eq!(long.as_str().len(), MAX_NAME_LEN);

    let exact = SongName::truncated("SCALE8.TXT");
    assert_eq!(exact.as_str(), "SCALE8.TXT");

    assert!(SongName::truncated("").is_empty());
}
