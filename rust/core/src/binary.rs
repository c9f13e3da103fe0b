// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Binary record decoding
//!
//! Layout of the GMSH 2.2 binary payloads (ints are 4 bytes, floats are
//! `data-size` bytes, both in the byte order found by the sentinel):
//!
//! ```text
//! $Nodes     foreach node:     int id, float x, float y, float z
//! $Elements  foreach block:    int type, int count, int ntags
//!              foreach element:  int id, int tag[ntags], int node[N(type)]
//! ```

use crate::ascii::RecordResult;
use crate::encoding::{Encoding, INT_SIZE};
use crate::entities::{Element, Node, NodeIds, Tags};

/// Header of a run of elements sharing type code and tag count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BlockHeader {
    pub type_code: i32,
    pub count: usize,
    pub num_tags: usize,
}

pub(crate) const BLOCK_HEADER_SIZE: usize = 3 * INT_SIZE;

/// Upper bound on tags per element; GMSH writes at most a handful.
pub(crate) const MAX_TAGS: usize = 1024;

#[inline]
pub(crate) fn node_record_size(encoding: &Encoding) -> usize {
    INT_SIZE + 3 * encoding.data_size
}

#[inline]
pub(crate) fn element_record_size(num_tags: usize, num_nodes: usize) -> Option<usize> {
    num_tags
        .checked_add(num_nodes)?
        .checked_add(1)?
        .checked_mul(INT_SIZE)
}

fn non_negative(value: i32, field: &str) -> RecordResult<usize> {
    usize::try_from(value).map_err(|_| format!("negative {} {}", field, value))
}

pub(crate) fn node(encoding: &Encoding, bytes: &[u8]) -> RecordResult<Node> {
    let id = non_negative(encoding.int_at(bytes, 0), "node id")?;
    let size = encoding.data_size;
    Ok(Node {
        id,
        x: encoding.float_at(bytes, INT_SIZE),
        y: encoding.float_at(bytes, INT_SIZE + size),
        z: encoding.float_at(bytes, INT_SIZE + 2 * size),
    })
}

pub(crate) fn block_header(encoding: &Encoding, bytes: &[u8]) -> RecordResult<BlockHeader> {
    let num_tags = non_negative(encoding.int_at(bytes, 2), "block tag count")?;
    if num_tags > MAX_TAGS {
        return Err(format!(
            "implausible block tag count {} (at most {} supported)",
            num_tags, MAX_TAGS
        ));
    }
    Ok(BlockHeader {
        type_code: encoding.int_at(bytes, 0),
        count: non_negative(encoding.int_at(bytes, 1), "block element count")?,
        num_tags,
    })
}

pub(crate) fn element(
    encoding: &Encoding,
    header: &BlockHeader,
    num_nodes: usize,
    bytes: &[u8],
) -> RecordResult<Element> {
    let id = non_negative(encoding.int_at(bytes, 0), "element id")?;

    let tags: Tags = (0..header.num_tags)
        .map(|i| encoding.int_at(bytes, 1 + i))
        .collect();

    let first_node = 1 + header.num_tags;
    let mut node_ids = NodeIds::with_capacity(num_nodes);
    for i in 0..num_nodes {
        node_ids.push(non_negative(encoding.int_at(bytes, first_node + i), "node id")?);
    }

    Ok(Element::new(id, header.type_code, tags, node_ids))
}
