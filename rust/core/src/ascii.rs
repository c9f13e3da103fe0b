// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ASCII record decoding
//!
//! Header and physical-name lines go through small [nom](https://docs.rs/nom)
//! combinators; node and element records are plain whitespace token streams
//! parsed with lexical-core / fast-float.

use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, digit1, space0, space1},
    combinator::{map_res, opt, recognize},
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};

use crate::encoding::{FileType, MeshFormat};
use crate::entities::{Element, Node, NodeIds, PhysicalName, Tags};

/// Decoding failure inside one line; the caller attaches the position.
pub(crate) type RecordResult<T> = std::result::Result<T, String>;

/// Section name of a `$Tag` line, without the `$`.
#[inline]
pub(crate) fn section_tag(text: &[u8]) -> Option<&[u8]> {
    match text.split_first() {
        Some((&b'$', name)) if !name.is_empty() => Some(name),
        _ => None,
    }
}

/// Version number: `2`, `2.2`
fn version(input: &str) -> IResult<&str, (&str, u32, u32)> {
    let (rest, text) = recognize(pair(digit1, opt(pair(char('.'), digit1))))(input)?;
    let mut parts = text.splitn(2, '.');
    let major = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0);
    let minor = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0);
    Ok((rest, (text, major, minor)))
}

fn unsigned(input: &str) -> IResult<&str, u32> {
    map_res(digit1, |s: &str| s.parse::<u32>())(input)
}

fn signed(input: &str) -> IResult<&str, i32> {
    map_res(recognize(pair(opt(char('-')), digit1)), |s: &str| {
        s.parse::<i32>()
    })(input)
}

/// Parse the `$MeshFormat` header line: `version file-type data-size`
pub(crate) fn mesh_format(text: &[u8]) -> RecordResult<MeshFormat> {
    let text = std::str::from_utf8(text).map_err(|_| "header is not valid UTF-8".to_string())?;

    let result: IResult<&str, ((&str, u32, u32), u32, u32)> = tuple((
        delimited(space0, version, space1),
        unsigned,
        preceded(space1, unsigned),
    ))(text);

    let (rest, ((version_text, major, minor), flag, data_size)) =
        result.map_err(|e| format!("malformed $MeshFormat header {:?}: {}", text, e))?;
    if !rest.trim().is_empty() {
        return Err(format!("unexpected trailing data in $MeshFormat header: {:?}", rest));
    }

    let file_type = FileType::from_flag(flag)
        .ok_or_else(|| format!("invalid file-type flag {} in $MeshFormat header", flag))?;

    Ok(MeshFormat {
        version: version_text.to_string(),
        major,
        minor,
        file_type,
        data_size: data_size as usize,
    })
}

/// Physical name: `"quoted name"` or a bare word
fn physical_label(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('"'), take_while(|c| c != '"'), char('"')),
        take_while1(|c: char| !c.is_whitespace() && c != '"'),
    ))(input)
}

/// Parse a `$PhysicalNames` record: `dimension id "name"`
pub(crate) fn physical_name(text: &[u8]) -> RecordResult<PhysicalName> {
    let text = std::str::from_utf8(text)
        .map_err(|_| "physical name record is not valid UTF-8".to_string())?;

    let result: IResult<&str, (u32, i32, &str)> = tuple((
        delimited(space0, unsigned, space1),
        signed,
        preceded(space1, physical_label),
    ))(text);

    let (rest, (dimension, id, name)) =
        result.map_err(|_| format!("malformed physical name record {:?}", text))?;
    if !rest.trim().is_empty() {
        return Err(format!("unexpected trailing data in physical name record {:?}", text));
    }
    if dimension > 3 {
        return Err(format!("physical name dimension {} out of range 0-3", dimension));
    }

    Ok(PhysicalName {
        id,
        dimension: dimension as u8,
        name: name.to_string(),
    })
}

/// Whitespace token stream over one record line
struct Tokens<'a> {
    rest: &'a [u8],
}

impl<'a> Tokens<'a> {
    fn new(text: &'a [u8]) -> Self {
        Self { rest: text }
    }

    fn next_token(&mut self) -> Option<&'a [u8]> {
        let start = self.rest.iter().position(|b| !b.is_ascii_whitespace())?;
        let rest = &self.rest[start..];
        let end = rest
            .iter()
            .position(|b| b.is_ascii_whitespace())
            .unwrap_or(rest.len());
        self.rest = &rest[end..];
        Some(&rest[..end])
    }

    fn int<T: lexical_core::FromLexical>(&mut self, field: &str) -> RecordResult<T> {
        let token = self
            .next_token()
            .ok_or_else(|| format!("missing {}", field))?;
        lexical_core::parse::<T>(token)
            .map_err(|_| format!("invalid {} {:?}", field, String::from_utf8_lossy(token)))
    }

    fn float(&mut self, field: &str) -> RecordResult<f64> {
        let token = self
            .next_token()
            .ok_or_else(|| format!("missing {}", field))?;
        fast_float::parse::<f64, _>(token)
            .map_err(|_| format!("invalid {} {:?}", field, String::from_utf8_lossy(token)))
    }

    fn is_empty(&self) -> bool {
        self.rest.iter().all(|b| b.is_ascii_whitespace())
    }
}

/// Parse a section count line.
pub(crate) fn count(text: &[u8]) -> RecordResult<usize> {
    let mut tokens = Tokens::new(text);
    let n = tokens.int::<usize>("record count")?;
    if !tokens.is_empty() {
        return Err("unexpected data after record count".to_string());
    }
    Ok(n)
}

/// Parse a `$Nodes` record: `id x y z`
pub(crate) fn node(text: &[u8]) -> RecordResult<Node> {
    let mut tokens = Tokens::new(text);
    let id = tokens.int::<usize>("node id")?;
    let x = tokens.float("x coordinate")?;
    let y = tokens.float("y coordinate")?;
    let z = tokens.float("z coordinate")?;
    if !tokens.is_empty() {
        return Err(format!("unexpected data after node {}", id));
    }
    Ok(Node { id, x, y, z })
}

/// Parse an `$Elements` record: `id type ntags tag... node...`
pub(crate) fn element(text: &[u8]) -> RecordResult<Element> {
    let mut tokens = Tokens::new(text);
    let id = tokens.int::<usize>("element id")?;
    let type_code = tokens.int::<i32>("element type")?;
    let num_tags = tokens.int::<usize>("tag count")?;

    let mut tags = Tags::new();
    for _ in 0..num_tags {
        tags.push(tokens.int::<i32>("element tag")?);
    }

    let mut node_ids = NodeIds::new();
    while !tokens.is_empty() {
        node_ids.push(tokens.int::<usize>("node id")?);
    }

    Ok(Element::new(id, type_code, tags, node_ids))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_section_tag() {
        assert_eq!(section_tag(b"$Nodes"), Some(&b"Nodes"[..]));
        assert_eq!(section_tag(b"$EndNodes"), Some(&b"EndNodes"[..]));
        assert_eq!(section_tag(b"$"), None);
        assert_eq!(section_tag(b"12"), None);
    }

    #[test]
    fn test_mesh_format() {
        let format = mesh_format(b"2.2 0 8").unwrap();
        assert_eq!(format.version, "2.2");
        assert_eq!((format.major, format.minor), (2, 2));
        assert_eq!(format.file_type, FileType::Ascii);
        assert_eq!(format.data_size, 8);

        let format = mesh_format(b"2 1 8").unwrap();
        assert_eq!((format.major, format.minor), (2, 0));
        assert_eq!(format.file_type, FileType::Binary);

        let format = mesh_format(b"4.1 0 8").unwrap();
        assert_eq!(format.major, 4);
    }

    #[test]
    fn test_mesh_format_rejects_garbage() {
        assert!(mesh_format(b"2.2 0").is_err());
        assert!(mesh_format(b"2.2 5 8").is_err());
        assert!(mesh_format(b"2.2 0 8 extra").is_err());
        assert!(mesh_format(b"abc 0 8").is_err());
    }

    #[test]
    fn test_physical_name() {
        let name = physical_name(br#"3 1 "Volume""#).unwrap();
        assert_eq!(name.dimension, 3);
        assert_eq!(name.id, 1);
        assert_eq!(name.name, "Volume");

        let name = physical_name(br#"1 12 "outer wall""#).unwrap();
        assert_eq!(name.name, "outer wall");

        let name = physical_name(b"2 5 inlet").unwrap();
        assert_eq!(name.name, "inlet");
    }

    #[test]
    fn test_physical_name_errors() {
        assert!(physical_name(br#"3 1 "unterminated"#).is_err());
        assert!(physical_name(br#"4 1 "Volume""#).is_err());
        assert!(physical_name(b"3").is_err());
    }

    #[test]
    fn test_node() {
        let n = node(b"17 0.5 -1.25e-3 2").unwrap();
        assert_eq!(n.id, 17);
        assert_relative_eq!(n.x, 0.5);
        assert_relative_eq!(n.y, -1.25e-3);
        assert_relative_eq!(n.z, 2.0);

        assert!(node(b"17 0.5 1.0").is_err());
        assert!(node(b"17 0.5 1.0 2.0 3.0").is_err());
        assert!(node(b"x 0.5 1.0 2.0").is_err());
    }

    #[test]
    fn test_element() {
        let e = element(b"4 2 2 7 3 10 11 12").unwrap();
        assert_eq!(e.id, 4);
        assert_eq!(e.type_code, 2);
        assert_eq!(e.tags.as_slice(), &[7, 3]);
        assert_eq!(e.physical_group_ids.as_slice(), &[7]);
        assert_eq!(e.node_ids.as_slice(), &[10, 11, 12]);
    }

    #[test]
    fn test_element_without_tags() {
        let e = element(b"1 3 0 1 2 3 4").unwrap();
        assert!(e.tags.is_empty());
        assert!(e.physical_group_ids.is_empty());
        assert_eq!(e.node_ids.len(), 4);
    }

    #[test]
    fn test_element_errors() {
        // tag count runs past the end of the record
        assert!(element(b"1 2 5 1 2").is_err());
        assert!(element(b"1 2 2 1 1 a b c").is_err());
        assert!(element(b"1").is_err());
    }

    #[test]
    fn test_element_huge_tag_count() {
        assert!(element(b"1 1 18446744073709551615 1 2").is_err());
    }

    #[test]
    fn test_count() {
        assert_eq!(count(b"703").unwrap(), 703);
        assert!(count(b"-1").is_err());
        assert!(count(b"12 13").is_err());
        assert!(count(b"").is_err());
    }
}
