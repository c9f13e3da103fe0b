// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end parsing of meshes produced by the writer, in both encodings.

use std::cell::Cell;
use std::io::{Cursor, Write};

use msh_lite_core::{
    element_name, element_node_count, parse_file_with, parse_reader_with, Element, Error,
    FileType, MeshParser, MeshVisitor, MshWriter, Node, NodeIds, ParseStatus, ParserConfig,
    PhysicalName, StreamingValidator, Tags, UNKNOWN_ELEMENT_NAME,
};

/// Everything a parse dispatched, in order
#[derive(Debug, Clone, PartialEq)]
enum Event {
    Node(Node),
    Element(Element),
    PhysicalName(PhysicalName),
}

#[derive(Default)]
struct Recorder {
    events: Vec<Event>,
}

impl MeshVisitor for Recorder {
    fn on_node(&mut self, node: &Node) -> bool {
        self.events.push(Event::Node(*node));
        true
    }

    fn on_element(&mut self, element: &Element) -> bool {
        self.events.push(Event::Element(element.clone()));
        true
    }

    fn on_physical_name(&mut self, name: &PhysicalName) -> bool {
        self.events.push(Event::PhysicalName(name.clone()));
        true
    }
}

/// Two quads split into triangles, boundary lines and a corner point.
fn sample_mesh() -> (Vec<Node>, Vec<Element>, Vec<PhysicalName>) {
    let coords = [
        (0.0, 0.0),
        (1.0, 0.0),
        (2.0, 0.0),
        (0.0, 1.0),
        (1.0, 1.0),
        (2.0, 1.0),
    ];
    let nodes: Vec<Node> = coords
        .iter()
        .enumerate()
        .map(|(i, &(x, y))| Node::new(i + 1, x, y, 0.125 * i as f64))
        .collect();

    let tri = |id, nodes: [usize; 3]| Element::new(id, 2, Tags::from_slice(&[1, 10]), NodeIds::from_slice(&nodes));
    let line = |id, nodes: [usize; 2]| Element::new(id, 1, Tags::from_slice(&[2, 20]), NodeIds::from_slice(&nodes));
    let elements = vec![
        Element::new(1, 15, Tags::from_slice(&[3, 30]), NodeIds::from_slice(&[1])),
        line(2, [1, 2]),
        line(3, [2, 3]),
        tri(4, [1, 2, 5]),
        tri(5, [1, 5, 4]),
        tri(6, [2, 3, 6]),
        tri(7, [2, 6, 5]),
        Element::new(8, 3, Tags::from_slice(&[1, 10, 4]), NodeIds::from_slice(&[1, 2, 5, 4])),
    ];

    let names = vec![
        PhysicalName {
            id: 1,
            dimension: 2,
            name: "Surface".to_string(),
        },
        PhysicalName {
            id: 2,
            dimension: 1,
            name: "bottom edge".to_string(),
        },
    ];
    (nodes, elements, names)
}

fn encode(file_type: FileType) -> Vec<u8> {
    let (nodes, elements, names) = sample_mesh();
    let mut out = Vec::new();
    MshWriter::new(file_type)
        .write_to(&mut out, &nodes, &elements, &names)
        .unwrap();
    out
}

fn record(bytes: &[u8]) -> Vec<Event> {
    let mut recorder = Recorder::default();
    let outcome = parse_reader_with(Cursor::new(bytes), ParserConfig::default(), &mut recorder).unwrap();
    assert_eq!(outcome.status, ParseStatus::Completed);
    recorder.events
}

#[test]
fn test_encoding_independence() {
    let ascii = record(&encode(FileType::Ascii));
    let binary = record(&encode(FileType::Binary));
    assert_eq!(ascii.len(), 2 + 6 + 8);
    assert_eq!(ascii, binary);
}

#[test]
fn test_dispatch_order_and_content() {
    let events = record(&encode(FileType::Binary));
    let (nodes, elements, names) = sample_mesh();

    let expected: Vec<Event> = names
        .into_iter()
        .map(Event::PhysicalName)
        .chain(nodes.into_iter().map(Event::Node))
        .chain(elements.into_iter().map(Event::Element))
        .collect();
    assert_eq!(events, expected);
}

#[test]
fn test_idempotent_parse() {
    let bytes = encode(FileType::Ascii);
    assert_eq!(record(&bytes), record(&bytes));
}

#[test]
fn test_early_stop_dispatches_nothing_further() {
    let bytes = encode(FileType::Binary);
    for k in 1..=8 {
        let mut seen = Vec::new();
        let outcome = {
            let mut parser = MeshParser::new();
            parser.add_element_observer(|e| {
                seen.push(e.id);
                seen.len() < k
            });
            parser.parse_reader(Cursor::new(&bytes)).unwrap()
        };
        assert_eq!(outcome.status, ParseStatus::StoppedByObserver, "stop at {}", k);
        assert_eq!(seen, (1..=k).collect::<Vec<_>>());
        assert_eq!(outcome.elements, k);
    }
}

#[test]
fn test_stop_on_physical_name_skips_later_sections() {
    let bytes = encode(FileType::Ascii);
    let mut node_calls = 0;
    let outcome = {
        let mut parser = MeshParser::new();
        parser
            .add_physical_name_observer(|_| false)
            .add_node_observer(|_| {
                node_calls += 1;
                true
            });
        parser.parse_reader(Cursor::new(&bytes)).unwrap()
    };
    assert!(outcome.stopped_by_observer());
    assert_eq!(outcome.physical_names, 1);
    assert_eq!(node_calls, 0);
}

#[test]
fn test_parse_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&encode(FileType::Binary)).unwrap();
    file.flush().unwrap();

    let mut recorder = Recorder::default();
    let outcome = parse_file_with(file.path(), ParserConfig::default(), &mut recorder).unwrap();
    assert!(outcome.is_complete());
    assert_eq!(outcome.nodes, 6);
    assert_eq!(outcome.elements, 8);
    assert_eq!(outcome.physical_names, 2);
    let format = outcome.format.unwrap();
    assert_eq!(format.file_type, FileType::Binary);
    assert_eq!(format.data_size, 8);
}

#[test]
fn test_writer_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.msh");
    let (nodes, elements, names) = sample_mesh();
    MshWriter::new(FileType::Ascii)
        .write(&path, &nodes, &elements, &names)
        .unwrap();

    let mut recorder = Recorder::default();
    parse_file_with(&path, ParserConfig::default(), &mut recorder).unwrap();
    assert_eq!(recorder.events, record(&encode(FileType::Ascii)));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("does-not-exist.msh");

    let calls = Cell::new(0);
    let result = {
        let mut parser = MeshParser::new();
        parser
            .add_node_observer(|_| {
                calls.set(calls.get() + 1);
                true
            })
            .add_element_observer(|_| {
                calls.set(calls.get() + 1);
                true
            })
            .add_physical_name_observer(|_| {
                calls.set(calls.get() + 1);
                true
            });
        parser.parse(&path)
    };

    match result {
        Err(Error::FileNotFound { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected FileNotFound, got {:?}", other),
    }
    assert_eq!(calls.get(), 0);
}

#[test]
fn test_truncated_binary_never_completes() {
    let bytes = encode(FileType::Binary);
    let full = {
        let mut recorder = Recorder::default();
        parse_reader_with(Cursor::new(&bytes), ParserConfig::default(), &mut recorder).unwrap()
    };
    let end_tag = b"$EndElements";
    let end = bytes
        .windows(end_tag.len())
        .position(|w| w == end_tag)
        .unwrap()
        + end_tag.len();

    for cut in 0..end {
        let mut recorder = Recorder::default();
        match parse_reader_with(Cursor::new(&bytes[..cut]), ParserConfig::default(), &mut recorder) {
            Err(_) => {}
            Ok(outcome) => assert!(
                outcome.elements < full.elements,
                "prefix of {} bytes parsed as a complete mesh",
                cut
            ),
        }
    }
}

#[test]
fn test_blank_lines_between_sections() {
    let text = String::from_utf8(encode(FileType::Ascii)).unwrap();
    let spaced = text.replace("$EndNodes\n", "$EndNodes\n\n\n");
    assert_eq!(record(spaced.as_bytes()), record(text.as_bytes()));
}

#[test]
fn test_crlf_line_endings() {
    let text = String::from_utf8(encode(FileType::Ascii)).unwrap();
    let crlf = text.replace('\n', "\r\n");
    assert_eq!(record(crlf.as_bytes()), record(text.as_bytes()));
}

#[test]
fn test_streaming_validator_during_parse() {
    let text = String::from_utf8(encode(FileType::Ascii)).unwrap();
    // drop a node from a triangle and point another at an undeclared node
    let broken = text
        .replace("4 2 2 1 10 1 2 5\n", "4 2 2 1 10 1 2\n")
        .replace("6 2 2 1 10 2 3 6\n", "6 2 2 1 10 2 3 60\n")
        .replace("8 3 3 1 10 4", "8 77 3 1 10 4");

    let mut validator = StreamingValidator::new();
    let outcome = parse_reader_with(Cursor::new(broken), ParserConfig::default(), &mut validator).unwrap();
    assert!(outcome.is_complete());
    assert_eq!(outcome.unknown_element_types, 1);

    let report = validator.into_report();
    assert_eq!(report.node_count_mismatches, vec![3]);
    assert_eq!(report.invalid_references, vec![5]);
    assert_eq!(report.unknown_types, vec![7]);
    assert!(!report.is_valid());
}

#[test]
fn test_element_table_lookups() {
    assert_eq!(element_name(3), "4-node quadrangle");
    assert_eq!(element_node_count(3), Some(4));
    assert_eq!(element_name(999), UNKNOWN_ELEMENT_NAME);
    assert_eq!(element_node_count(999), None);
}
