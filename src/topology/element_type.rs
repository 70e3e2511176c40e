//! Element type metadata: side tables, mirrored sides and side matching.
//!
//! Side numbering follows the Exodus II convention. Tables below are written
//! with 0-based positions into an element's connectivity.

use crate::mesh_error::MeshError;
use serde::{Deserialize, Serialize};

/// Element topologies supported by the adjacency builder.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ElementType {
    /// Point/sphere element; carries no face adjacency.
    Sphere,
    /// 2-node line.
    Bar2,
    /// 3-node line.
    Bar3,
    /// 4-node quadrilateral.
    Quad4,
    /// 8-node serendipity quadrilateral.
    Quad8,
    /// 9-node Lagrange quadrilateral.
    Quad9,
    /// 4-node quadrilateral shell (3-D).
    Shell4,
    /// 8-node quadrilateral shell (3-D).
    Shell8,
    /// 3-node triangle.
    Tri3,
    /// 6-node triangle.
    Tri6,
    /// 3-node triangular shell (3-D).
    TShell3,
    /// 6-node triangular shell (3-D).
    TShell6,
    /// 8-node hexahedron.
    Hex8,
    /// 20-node hexahedron.
    Hex20,
    /// 4-node tetrahedron.
    Tet4,
    /// 10-node tetrahedron.
    Tet10,
    /// 6-node wedge.
    Wedge6,
    /// 15-node wedge.
    Wedge15,
    /// 5-node pyramid.
    Pyramid5,
}

/// Wire code standing for "this process owns no element of the block".
///
/// It is the largest code, so a global min-reduction picks any real type.
pub const NULL_ELEMENT_CODE: u32 = u32::MAX;

/// Shape of a single side, used to build the mirrored node ordering.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SideShape {
    /// One node (sides of line elements).
    Point,
    /// Line edge: 2 corners, optionally a mid node.
    Edge,
    /// Triangular face: 3 corners, optionally 3 mid-edge nodes.
    Triangle,
    /// Quadrilateral face: 4 corners, optionally 4 mid-edge nodes.
    Quadrilateral,
}

impl SideShape {
    /// Number of corner nodes.
    pub fn corners(self) -> usize {
        match self {
            SideShape::Point => 1,
            SideShape::Edge => 2,
            SideShape::Triangle => 3,
            SideShape::Quadrilateral => 4,
        }
    }

    fn of_len(dimension_of_side: usize, len: usize) -> SideShape {
        match (dimension_of_side, len) {
            (0, _) => SideShape::Point,
            (1, _) => SideShape::Edge,
            (_, 3) | (_, 6) => SideShape::Triangle,
            _ => SideShape::Quadrilateral,
        }
    }
}

/// Outcome of looking for the side of an element that matches a mirrored side.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SideMatch {
    /// The element holds the side as its side `n` (1-based).
    Side(usize),
    /// The element does not hold the side.
    NoMatch,
    /// The element holds the nodes of the side with the same orientation as
    /// the querying element, i.e. one of the two elements is inverted.
    Inverted(usize),
}

const BAR_SIDES: &[&[usize]] = &[&[0], &[1]];

const QUAD4_SIDES: &[&[usize]] = &[&[0, 1], &[1, 2], &[2, 3], &[3, 0]];
const QUAD8_SIDES: &[&[usize]] = &[&[0, 1, 4], &[1, 2, 5], &[2, 3, 6], &[3, 0, 7]];

const TRI3_SIDES: &[&[usize]] = &[&[0, 1], &[1, 2], &[2, 0]];
const TRI6_SIDES: &[&[usize]] = &[&[0, 1, 3], &[1, 2, 4], &[2, 0, 5]];

const SHELL4_SIDES: &[&[usize]] = &[
    &[0, 1, 2, 3],
    &[0, 3, 2, 1],
    &[0, 1],
    &[1, 2],
    &[2, 3],
    &[3, 0],
];
const SHELL8_SIDES: &[&[usize]] = &[
    &[0, 1, 2, 3, 4, 5, 6, 7],
    &[0, 3, 2, 1, 7, 6, 5, 4],
    &[0, 1, 4],
    &[1, 2, 5],
    &[2, 3, 6],
    &[3, 0, 7],
];
const TSHELL3_SIDES: &[&[usize]] = &[&[0, 1, 2], &[0, 2, 1], &[0, 1], &[1, 2], &[2, 0]];
const TSHELL6_SIDES: &[&[usize]] = &[
    &[0, 1, 2, 3, 4, 5],
    &[0, 2, 1, 5, 4, 3],
    &[0, 1, 3],
    &[1, 2, 4],
    &[2, 0, 5],
];

const TET4_SIDES: &[&[usize]] = &[&[0, 1, 3], &[1, 2, 3], &[0, 3, 2], &[0, 2, 1]];
const TET10_SIDES: &[&[usize]] = &[
    &[0, 1, 3, 4, 8, 7],
    &[1, 2, 3, 5, 9, 8],
    &[0, 3, 2, 7, 9, 6],
    &[0, 2, 1, 6, 5, 4],
];

const HEX8_SIDES: &[&[usize]] = &[
    &[0, 1, 5, 4],
    &[1, 2, 6, 5],
    &[2, 3, 7, 6],
    &[0, 4, 7, 3],
    &[0, 3, 2, 1],
    &[4, 5, 6, 7],
];
const HEX20_SIDES: &[&[usize]] = &[
    &[0, 1, 5, 4, 8, 13, 16, 12],
    &[1, 2, 6, 5, 9, 14, 17, 13],
    &[2, 3, 7, 6, 10, 15, 18, 14],
    &[0, 4, 7, 3, 12, 19, 15, 11],
    &[0, 3, 2, 1, 11, 10, 9, 8],
    &[4, 5, 6, 7, 16, 17, 18, 19],
];

const WEDGE6_SIDES: &[&[usize]] = &[
    &[0, 1, 4, 3],
    &[1, 2, 5, 4],
    &[0, 3, 5, 2],
    &[0, 2, 1],
    &[3, 4, 5],
];
const WEDGE15_SIDES: &[&[usize]] = &[
    &[0, 1, 4, 3, 6, 10, 12, 9],
    &[1, 2, 5, 4, 7, 11, 13, 10],
    &[0, 3, 5, 2, 9, 14, 11, 8],
    &[0, 2, 1, 8, 7, 6],
    &[3, 4, 5, 12, 13, 14],
];

const PYRAMID5_SIDES: &[&[usize]] = &[
    &[0, 1, 4],
    &[1, 2, 4],
    &[2, 3, 4],
    &[0, 4, 3],
    &[0, 3, 2, 1],
];

impl ElementType {
    /// Every variant, in wire-code order.
    pub const ALL: [ElementType; 19] = [
        ElementType::Sphere,
        ElementType::Bar2,
        ElementType::Bar3,
        ElementType::Quad4,
        ElementType::Quad8,
        ElementType::Quad9,
        ElementType::Shell4,
        ElementType::Shell8,
        ElementType::Tri3,
        ElementType::Tri6,
        ElementType::TShell3,
        ElementType::TShell6,
        ElementType::Hex8,
        ElementType::Hex20,
        ElementType::Tet4,
        ElementType::Tet10,
        ElementType::Wedge6,
        ElementType::Wedge15,
        ElementType::Pyramid5,
    ];

    /// Determine the element type from a block's type name, its node count and
    /// the mesh dimension.
    pub fn classify(name: &str, nodes: usize, dimension: usize) -> Result<Self, MeshError> {
        let unknown = || MeshError::UnknownElementType {
            name: name.to_string(),
            nodes,
            dimension,
        };
        let prefix: String = name
            .trim()
            .chars()
            .take(3)
            .map(|c| c.to_ascii_uppercase())
            .collect();
        let ty = match (prefix.as_str(), nodes, dimension) {
            ("SPH", 1, _) => ElementType::Sphere,
            ("BAR" | "BEA" | "TRU", 2, _) => ElementType::Bar2,
            ("BAR" | "BEA" | "TRU", 3, _) => ElementType::Bar3,
            ("QUA", 4, 2) => ElementType::Quad4,
            ("QUA", 8, 2) => ElementType::Quad8,
            ("QUA", 9, 2) => ElementType::Quad9,
            ("QUA" | "SHE", 4, 3) => ElementType::Shell4,
            ("QUA" | "SHE", 8, 3) => ElementType::Shell8,
            ("SHE", 2, 2) => ElementType::Bar2,
            ("SHE", 3, 2) => ElementType::Bar3,
            ("TRI", 3, 2) => ElementType::Tri3,
            ("TRI", 6, 2) => ElementType::Tri6,
            ("TRI", 3, 3) => ElementType::TShell3,
            ("TRI", 6, 3) => ElementType::TShell6,
            ("TET", 4, 3) => ElementType::Tet4,
            ("TET", 10, 3) => ElementType::Tet10,
            ("HEX", 8, 3) => ElementType::Hex8,
            ("HEX", 20, 3) => ElementType::Hex20,
            ("WED", 6, 3) => ElementType::Wedge6,
            ("WED", 15, 3) => ElementType::Wedge15,
            ("PYR", 5, 3) => ElementType::Pyramid5,
            _ => return Err(unknown()),
        };
        Ok(ty)
    }

    /// Canonical block name for this type.
    pub fn name(self) -> &'static str {
        match self {
            ElementType::Sphere => "SPHERE",
            ElementType::Bar2 => "BAR2",
            ElementType::Bar3 => "BAR3",
            ElementType::Quad4 => "QUAD4",
            ElementType::Quad8 => "QUAD8",
            ElementType::Quad9 => "QUAD9",
            ElementType::Shell4 => "SHELL4",
            ElementType::Shell8 => "SHELL8",
            ElementType::Tri3 => "TRI3",
            ElementType::Tri6 => "TRI6",
            ElementType::TShell3 => "TSHELL3",
            ElementType::TShell6 => "TSHELL6",
            ElementType::Hex8 => "HEX8",
            ElementType::Hex20 => "HEX20",
            ElementType::Tet4 => "TET4",
            ElementType::Tet10 => "TET10",
            ElementType::Wedge6 => "WEDGE6",
            ElementType::Wedge15 => "WEDGE15",
            ElementType::Pyramid5 => "PYRAMID5",
        }
    }

    /// Stable code used when block shapes are reduced across processes.
    pub fn wire_code(self) -> u32 {
        Self::ALL
            .iter()
            .position(|&t| t == self)
            .map_or(NULL_ELEMENT_CODE, |p| p as u32)
    }

    /// Inverse of [`ElementType::wire_code`]; `None` for [`NULL_ELEMENT_CODE`]
    /// or an unknown code.
    pub fn from_wire_code(code: u32) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    /// Number of nodes per element.
    pub fn nodes(self) -> usize {
        match self {
            ElementType::Sphere => 1,
            ElementType::Bar2 => 2,
            ElementType::Bar3 | ElementType::Tri3 | ElementType::TShell3 => 3,
            ElementType::Quad4 | ElementType::Shell4 | ElementType::Tet4 => 4,
            ElementType::Pyramid5 => 5,
            ElementType::Tri6 | ElementType::TShell6 | ElementType::Wedge6 => 6,
            ElementType::Quad8 | ElementType::Shell8 | ElementType::Hex8 => 8,
            ElementType::Quad9 => 9,
            ElementType::Tet10 => 10,
            ElementType::Wedge15 => 15,
            ElementType::Hex20 => 20,
        }
    }

    /// Topological dimension of the element.
    pub fn dimension(self) -> usize {
        match self {
            ElementType::Sphere => 0,
            ElementType::Bar2 | ElementType::Bar3 => 1,
            ElementType::Quad4
            | ElementType::Quad8
            | ElementType::Quad9
            | ElementType::Tri3
            | ElementType::Tri6
            | ElementType::Shell4
            | ElementType::Shell8
            | ElementType::TShell3
            | ElementType::TShell6 => 2,
            ElementType::Hex8
            | ElementType::Hex20
            | ElementType::Tet4
            | ElementType::Tet10
            | ElementType::Wedge6
            | ElementType::Wedge15
            | ElementType::Pyramid5 => 3,
        }
    }

    /// Shells: 2-D elements in a 3-D mesh whose sides 1 and 2 are the two
    /// faces of the same surface.
    pub fn is_shell(self) -> bool {
        matches!(
            self,
            ElementType::Shell4 | ElementType::Shell8 | ElementType::TShell3 | ElementType::TShell6
        )
    }

    fn side_table(self) -> &'static [&'static [usize]] {
        match self {
            ElementType::Sphere => &[],
            ElementType::Bar2 | ElementType::Bar3 => BAR_SIDES,
            ElementType::Quad4 => QUAD4_SIDES,
            ElementType::Quad8 | ElementType::Quad9 => QUAD8_SIDES,
            ElementType::Shell4 => SHELL4_SIDES,
            ElementType::Shell8 => SHELL8_SIDES,
            ElementType::Tri3 => TRI3_SIDES,
            ElementType::Tri6 => TRI6_SIDES,
            ElementType::TShell3 => TSHELL3_SIDES,
            ElementType::TShell6 => TSHELL6_SIDES,
            ElementType::Hex8 => HEX8_SIDES,
            ElementType::Hex20 => HEX20_SIDES,
            ElementType::Tet4 => TET4_SIDES,
            ElementType::Tet10 => TET10_SIDES,
            ElementType::Wedge6 => WEDGE6_SIDES,
            ElementType::Wedge15 => WEDGE15_SIDES,
            ElementType::Pyramid5 => PYRAMID5_SIDES,
        }
    }

    /// Number of sides.
    pub fn num_sides(self) -> usize {
        self.side_table().len()
    }

    /// Connectivity positions of side `side` (1-based), or `None` when out of range.
    pub fn side_positions(self, side: usize) -> Option<&'static [usize]> {
        side.checked_sub(1)
            .and_then(|s| self.side_table().get(s).copied())
    }

    /// Number of nodes on side `side` (1-based); 0 when out of range.
    pub fn side_node_count(self, side: usize) -> usize {
        self.side_positions(side).map_or(0, <[usize]>::len)
    }

    /// Shape of side `side` (1-based).
    pub fn side_shape(self, side: usize) -> Option<SideShape> {
        let positions = self.side_positions(side)?;
        // the two faces of a shell are 2-D, the rest of its sides are edges
        let side_dim = if self.is_shell() {
            usize::from(side <= 2) + 1
        } else {
            self.dimension() - 1
        };
        Some(SideShape::of_len(side_dim, positions.len()))
    }

    /// Local node indices of side `side` (1-based) for an element with the given connectivity.
    pub fn side_nodes(self, connectivity: &[usize], side: usize) -> Option<Vec<usize>> {
        let positions = self.side_positions(side)?;
        positions
            .iter()
            .map(|&p| connectivity.get(p).copied())
            .collect()
    }

    /// The node ordering of side `side` as a correctly oriented neighbor would
    /// list it: the face traversal is reversed.
    pub fn mirror_side(self, side: usize, side_nodes: &[usize]) -> Option<Vec<usize>> {
        let shape = self.side_shape(side)?;
        Some(mirror(shape, side_nodes))
    }

    /// Find the side of an element of this type (with connectivity
    /// `connectivity`) that is listed by `mirrored` with the expected
    /// orientation.
    pub fn matching_side(self, connectivity: &[usize], mirrored: &[usize]) -> SideMatch {
        let mut inverted = None;
        for side in 1..=self.num_sides() {
            let Some(shape) = self.side_shape(side) else {
                continue;
            };
            let Some(nodes) = self.side_nodes(connectivity, side) else {
                continue;
            };
            if nodes.len() != mirrored.len() {
                continue;
            }
            if same_oriented_side(shape, &nodes, mirrored) {
                return SideMatch::Side(side);
            }
            if inverted.is_none() && same_oriented_side(shape, &nodes, &mirror(shape, mirrored)) {
                inverted = Some(side);
            }
        }
        inverted.map_or(SideMatch::NoMatch, SideMatch::Inverted)
    }
}

/// Reverse the traversal of a side's node list.
///
/// Edges swap their two corners; faces keep the first corner and reverse the
/// remaining corners and the mid-edge nodes.
pub fn mirror(shape: SideShape, nodes: &[usize]) -> Vec<usize> {
    let c = shape.corners().min(nodes.len());
    let (corners, mids) = nodes.split_at(c);
    let mut out = Vec::with_capacity(nodes.len());
    match shape {
        SideShape::Point => out.extend_from_slice(corners),
        SideShape::Edge => {
            out.extend(corners.iter().rev());
            out.extend_from_slice(mids);
        }
        SideShape::Triangle | SideShape::Quadrilateral => {
            if let Some((&first, rest)) = corners.split_first() {
                out.push(first);
                out.extend(rest.iter().rev());
            }
            if mids.len() >= c {
                out.extend(mids[..c].iter().rev());
                out.extend_from_slice(&mids[c..]);
            } else {
                out.extend_from_slice(mids);
            }
        }
    }
    out
}

/// `true` when `a` and `b` list the same side with the same orientation, up to
/// a cyclic rotation of the corners (mid-edge nodes rotate with them).
///
/// Orientation is not checked for edges: rotating two corners reverses them,
/// so an edge matches in either direction and is never reported as inverted.
fn same_oriented_side(shape: SideShape, a: &[usize], b: &[usize]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let c = shape.corners().min(a.len());
    let (ac, am) = a.split_at(c);
    let (bc, bm) = b.split_at(c);
    (0..c).any(|r| {
        let corners = (0..c).all(|i| ac[i] == bc[(i + r) % c]);
        let mids = if am.len() >= c {
            (0..c).all(|i| am[i] == bm[(i + r) % c]) && am[c..] == bm[c..]
        } else {
            am == bm
        };
        corners && mids
    })
}
