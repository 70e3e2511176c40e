#![allow(dead_code)]
use mesh_dualgraph::{
    algs::communicator::RayonComm,
    algs::{GraphBuildReport, GraphConfig, build_element_graph},
    data::{
        CommMapArrays, ElementCatalog, LoadBalanceParams, MeshArrays, NeighborId, RawBlock,
        RawElemCommMap,
    },
    mesh_error::MeshError,
    topology::ElementType,
};
use std::collections::{BTreeMap, HashMap};

/// A whole mesh before partitioning; global ids are index + 1.
#[derive(Clone, Debug)]
pub struct GlobalMesh {
    pub dimension: usize,
    /// Per node, `dimension` coordinates.
    pub coords: Vec<Vec<f64>>,
    pub type_name: &'static str,
    pub element_type: ElementType,
    /// 0-based global node indices per element.
    pub elements: Vec<Vec<usize>>,
}

impl GlobalMesh {
    pub fn nodes_per_element(&self) -> usize {
        self.element_type.nodes()
    }

    pub fn centroid_x(&self, e: usize) -> f64 {
        let conn = &self.elements[e];
        conn.iter().map(|&n| self.coords[n][0]).sum::<f64>() / conn.len() as f64
    }
}

/// `nx * ny` unit quads, counter-clockwise.
pub fn quad_grid(nx: usize, ny: usize) -> GlobalMesh {
    let n = |i: usize, j: usize| j * (nx + 1) + i;
    let mut coords = Vec::new();
    for j in 0..=ny {
        for i in 0..=nx {
            coords.push(vec![i as f64, j as f64]);
        }
    }
    let mut elements = Vec::new();
    for j in 0..ny {
        for i in 0..nx {
            elements.push(vec![n(i, j), n(i + 1, j), n(i + 1, j + 1), n(i, j + 1)]);
        }
    }
    GlobalMesh {
        dimension: 2,
        coords,
        type_name: "QUAD4",
        element_type: ElementType::Quad4,
        elements,
    }
}

/// Each unit square split into two counter-clockwise triangles.
pub fn tri_grid(nx: usize, ny: usize) -> GlobalMesh {
    let quads = quad_grid(nx, ny);
    let elements = quads
        .elements
        .iter()
        .flat_map(|q| [vec![q[0], q[1], q[2]], vec![q[0], q[2], q[3]]])
        .collect();
    GlobalMesh {
        type_name: "TRI3",
        element_type: ElementType::Tri3,
        elements,
        ..quads
    }
}

fn hex_nodes(nx: usize, ny: usize, nz: usize) -> (Vec<Vec<f64>>, impl Fn(usize, usize, usize) -> usize) {
    let mut coords = Vec::new();
    for k in 0..=nz {
        for j in 0..=ny {
            for i in 0..=nx {
                coords.push(vec![i as f64, j as f64, k as f64]);
            }
        }
    }
    (coords, move |i, j, k| (k * (ny + 1) + j) * (nx + 1) + i)
}

/// `nx * ny * nz` unit hexahedra.
pub fn hex_grid(nx: usize, ny: usize, nz: usize) -> GlobalMesh {
    let (coords, n) = hex_nodes(nx, ny, nz);
    let mut elements = Vec::new();
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                elements.push(vec![
                    n(i, j, k),
                    n(i + 1, j, k),
                    n(i + 1, j + 1, k),
                    n(i, j + 1, k),
                    n(i, j, k + 1),
                    n(i + 1, j, k + 1),
                    n(i + 1, j + 1, k + 1),
                    n(i, j + 1, k + 1),
                ]);
            }
        }
    }
    GlobalMesh {
        dimension: 3,
        coords,
        type_name: "HEX8",
        element_type: ElementType::Hex8,
        elements,
    }
}

/// Each unit cube split into six positively oriented tetrahedra sharing the
/// main diagonal.
pub fn tet_grid(nx: usize, ny: usize, nz: usize) -> GlobalMesh {
    let (coords, n) = hex_nodes(nx, ny, nz);
    const PERMS: [[usize; 3]; 6] = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];
    let mut elements = Vec::new();
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                for perm in PERMS {
                    let mut at = [i, j, k];
                    let mut tet = vec![n(at[0], at[1], at[2])];
                    for axis in perm {
                        at[axis] += 1;
                        tet.push(n(at[0], at[1], at[2]));
                    }
                    if signed_volume(&coords, &tet) < 0.0 {
                        tet.swap(1, 2);
                    }
                    elements.push(tet);
                }
            }
        }
    }
    GlobalMesh {
        dimension: 3,
        coords,
        type_name: "TETRA",
        element_type: ElementType::Tet4,
        elements,
    }
}

fn signed_volume(coords: &[Vec<f64>], tet: &[usize]) -> f64 {
    let d = |a: usize| -> [f64; 3] {
        let (p, q) = (&coords[tet[a]], &coords[tet[0]]);
        [p[0] - q[0], p[1] - q[1], p[2] - q[2]]
    };
    let (a, b, c) = (d(1), d(2), d(3));
    a[0] * (b[1] * c[2] - b[2] * c[1]) - a[1] * (b[0] * c[2] - b[2] * c[0])
        + a[2] * (b[0] * c[1] - b[1] * c[0])
}

/// Owner of each element by slab along x.
pub fn owners_by_x(mesh: &GlobalMesh, nranks: usize) -> Vec<usize> {
    let width = mesh
        .coords
        .iter()
        .map(|c| c[0])
        .fold(0.0_f64, f64::max)
        .max(1.0);
    (0..mesh.elements.len())
        .map(|e| ((mesh.centroid_x(e) / width * nranks as f64) as usize).min(nranks - 1))
        .collect()
}

/// For each element, side (1-based) → neighbor element, by brute-force
/// matching of sorted side node sets.
pub fn expected_neighbors(mesh: &GlobalMesh) -> Vec<BTreeMap<usize, usize>> {
    let ty = mesh.element_type;
    let mut faces: HashMap<Vec<usize>, Vec<(usize, usize)>> = HashMap::new();
    for (e, conn) in mesh.elements.iter().enumerate() {
        for side in 1..=ty.num_sides() {
            let mut key = ty.side_nodes(conn, side).unwrap();
            if key.len() < 2 {
                continue;
            }
            key.sort_unstable();
            faces.entry(key).or_default().push((e, side));
        }
    }
    let mut out = vec![BTreeMap::new(); mesh.elements.len()];
    for owners in faces.values() {
        if let [(e, se), (f, sf)] = owners[..] {
            out[e].insert(se, f);
            out[f].insert(sf, e);
        }
    }
    out
}

/// One process's input arrays.
#[derive(Clone, Debug)]
pub struct Part {
    pub rank: usize,
    pub mesh: MeshArrays,
    pub maps: CommMapArrays,
}

/// Split `mesh` over `nranks` processes according to `owners`.
pub fn partition(mesh: &GlobalMesh, owners: &[usize], nranks: usize) -> Vec<Part> {
    let ty = mesh.element_type;
    let local_elems: Vec<Vec<usize>> = (0..nranks)
        .map(|r| (0..mesh.elements.len()).filter(|&e| owners[e] == r).collect())
        .collect();
    let local_index = |e: usize| local_elems[owners[e]].iter().position(|&x| x == e).unwrap();

    // shared sides between ranks, listed in one agreed order per pair
    let expected = expected_neighbors(mesh);
    let mut pairs: BTreeMap<(usize, usize), Vec<(usize, usize, usize, usize)>> = BTreeMap::new();
    for (e, nbrs) in expected.iter().enumerate() {
        for (&se, &f) in nbrs {
            let (a, b) = (owners[e], owners[f]);
            if a < b {
                let sf = expected[f].iter().find(|&(_, &x)| x == e).map(|(&s, _)| s).unwrap();
                pairs.entry((a, b)).or_default().push((e, se, f, sf));
            }
        }
    }

    (0..nranks)
        .map(|rank| {
            let elems = &local_elems[rank];
            let mut nodes: Vec<usize> = elems
                .iter()
                .flat_map(|&e| mesh.elements[e].iter().copied())
                .collect();
            nodes.sort_unstable();
            nodes.dedup();
            let node_pos: HashMap<usize, usize> =
                nodes.iter().enumerate().map(|(i, &n)| (n, i)).collect();

            let connectivity: Vec<usize> = elems
                .iter()
                .flat_map(|&e| mesh.elements[e].iter().map(|n| node_pos[n] + 1))
                .collect();
            let block = RawBlock {
                id: 1,
                type_name: mesh.type_name.to_string(),
                count: elems.len(),
                nodes_per_element: if elems.is_empty() { 0 } else { ty.nodes() },
                attributes: 0,
                connectivity,
            };

            let mut elem_maps = Vec::new();
            for (&(a, b), shared) in &pairs {
                let (peer, entries): (usize, Vec<(usize, usize)>) = if a == rank {
                    (b, shared.iter().map(|&(e, se, _, _)| (e, se)).collect())
                } else if b == rank {
                    (a, shared.iter().map(|&(_, _, f, sf)| (f, sf)).collect())
                } else {
                    continue;
                };
                elem_maps.push(RawElemCommMap {
                    id: peer,
                    element_ids: entries.iter().map(|&(e, _)| local_index(e) + 1).collect(),
                    side_ids: entries.iter().map(|&(_, s)| s).collect(),
                });
            }
            let mut border: Vec<usize> = elem_maps
                .iter()
                .flat_map(|m| m.element_ids.iter().copied())
                .collect();
            border.sort_unstable();
            border.dedup();
            let internal: Vec<usize> =
                (1..=elems.len()).filter(|i| border.binary_search(i).is_err()).collect();

            let maps = CommMapArrays {
                params: LoadBalanceParams {
                    internal_nodes: nodes.len(),
                    internal_elements: internal.len(),
                    border_elements: border.len(),
                    elem_maps: elem_maps.len(),
                    ..Default::default()
                },
                internal_elements: internal,
                border_elements: border,
                elem_maps,
            };

            let mesh_arrays = MeshArrays {
                dimension: mesh.dimension,
                num_nodes: nodes.len(),
                coordinates: (0..mesh.dimension)
                    .map(|d| nodes.iter().map(|&n| mesh.coords[n][d]).collect())
                    .collect(),
                node_map: nodes.iter().map(|&n| n as u64 + 1).collect(),
                element_map: elems.iter().map(|&e| e as u64 + 1).collect(),
                blocks: vec![block],
            };
            Part {
                rank,
                mesh: mesh_arrays,
                maps,
            }
        })
        .collect()
}

/// Run the pipeline on every part, one thread per rank.
pub fn run_ranks(
    parts: Vec<Part>,
    config: GraphConfig,
) -> Vec<Result<(ElementCatalog, GraphBuildReport), MeshError>> {
    let size = parts.len();
    let handles: Vec<_> = parts
        .into_iter()
        .map(|part| {
            std::thread::spawn(move || {
                let comm = RayonComm::new(part.rank, size);
                build_element_graph(&part.mesh, &part.maps, &comm, &config)
            })
        })
        .collect();
    handles.into_iter().map(|h| h.join().unwrap()).collect()
}

/// Check every slot of every catalog against the brute-force neighbors.
pub fn assert_matches_global(mesh: &GlobalMesh, owners: &[usize], catalogs: &[ElementCatalog]) {
    let expected = expected_neighbors(mesh);
    let ty = mesh.element_type;
    for cat in catalogs {
        let rank = cat.rank();
        for (i, e) in cat.elements().iter().enumerate() {
            let g = e.global_id as usize - 1;
            assert_eq!(owners[g], rank);
            for side in 1..=ty.num_sides() {
                match (expected[g].get(&side), e.neighbor(side)) {
                    (None, None) => {}
                    (Some(&f), Some(adj)) => {
                        assert_eq!(adj.owner, owners[f], "rank {rank} element {i} side {side}");
                        assert_eq!(cat.neighbor_global_id(adj.neighbor), Some(f as u64 + 1));
                        assert_eq!(adj.edge_weight, ty.side_node_count(side) as f32);
                        match adj.neighbor {
                            NeighborId::Local(_) => assert_eq!(owners[f], rank),
                            NeighborId::Remote(_) => assert_ne!(owners[f], rank),
                        }
                    }
                    (want, got) => panic!(
                        "rank {rank} element {i} (gid {}) side {side}: expected {want:?}, got {got:?}",
                        e.global_id
                    ),
                }
            }
            assert_eq!(e.neighbor_count(), expected[g].len());
        }
    }
}

/// Config with its own tag range, so concurrently running tests never share
/// mailbox keys.
pub fn config_with_tags(base: u16) -> GraphConfig {
    GraphConfig {
        tag_base: mesh_dualgraph::algs::communicator::CommTag::new(base),
        ..GraphConfig::default()
    }
}
