//! Submeshes, vertices, faces and morph targets.

use glam::{Vec2, Vec3};

use super::Tolerance;

/// Bone weight on a vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Influence {
    pub bone_id: i32,
    pub weight: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    /// Defaults to white for files written before vertex colors existed
    pub color: Vec3,
    /// Level-of-detail collapse target, -1 if the vertex never collapses
    pub collapse_id: i32,
    pub face_collapse_count: i32,
    /// One entry per texture coordinate set of the owning submesh
    pub texcoords: Vec<Vec2>,
    pub influences: Vec<Influence>,
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            position,
            normal,
            color: Vec3::ONE,
            collapse_id: -1,
            face_collapse_count: 0,
            texcoords: Vec::new(),
            influences: Vec::new(),
        }
    }

    pub fn has_collapse(&self) -> bool {
        self.collapse_id >= 0 || self.face_collapse_count != 0
    }

    fn approx_eq(&self, other: &Vertex, tol: Tolerance) -> bool {
        tol.vec3(self.position, other.position)
            && tol.vec3(self.normal, other.normal)
            && tol.vec3(self.color, other.color)
            && self.collapse_id == other.collapse_id
            && self.face_collapse_count == other.face_collapse_count
            && tol.vec2s(&self.texcoords, &other.texcoords)
            && self.influences.len() == other.influences.len()
            && self
                .influences
                .iter()
                .zip(&other.influences)
                .all(|(a, b)| a.bone_id == b.bone_id && tol.scalar(a.weight, b.weight))
    }
}

/// Replacement attributes for one vertex under a morph target.
#[derive(Debug, Clone, PartialEq)]
pub struct BlendVertex {
    pub vertex_id: u32,
    pub position: Vec3,
    pub normal: Vec3,
    pub texcoords: Vec<Vec2>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MorphTarget {
    pub name: String,
    pub blend_vertices: Vec<BlendVertex>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Submesh {
    pub material_thread_id: i32,
    /// `None` when the source never stated a level-of-detail step count
    pub lod_step_count: Option<u32>,
    pub texcoord_count: u32,
    pub vertices: Vec<Vertex>,
    pub morph_targets: Vec<MorphTarget>,
    /// Triangles as vertex index triples
    pub faces: Vec<[u32; 3]>,
}

impl Submesh {
    pub fn new(material_thread_id: i32) -> Self {
        Self {
            material_thread_id,
            lod_step_count: None,
            texcoord_count: 0,
            vertices: Vec::new(),
            morph_targets: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Face indices and blend vertex ids point at existing vertices, and every
    /// vertex carries `texcoord_count` coordinate sets.
    pub fn validate(&self) -> Result<(), String> {
        let vertex_count = self.vertices.len() as u64;
        for (index, face) in self.faces.iter().enumerate() {
            if let Some(bad) = face.iter().find(|&&v| u64::from(v) >= vertex_count) {
                return Err(format!(
                    "face {index} references vertex {bad}, submesh has {vertex_count}"
                ));
            }
        }
        for (index, vertex) in self.vertices.iter().enumerate() {
            if vertex.texcoords.len() != self.texcoord_count as usize {
                return Err(format!(
                    "vertex {index} has {} texcoords, submesh declares {}",
                    vertex.texcoords.len(),
                    self.texcoord_count
                ));
            }
        }
        for morph in &self.morph_targets {
            for blend in &morph.blend_vertices {
                if u64::from(blend.vertex_id) >= vertex_count {
                    return Err(format!(
                        "morph {} blends vertex {}, submesh has {vertex_count}",
                        morph.name, blend.vertex_id
                    ));
                }
            }
        }
        Ok(())
    }

    fn approx_eq(&self, other: &Submesh, tol: Tolerance) -> bool {
        self.material_thread_id == other.material_thread_id
            && self.lod_step_count == other.lod_step_count
            && self.texcoord_count == other.texcoord_count
            && self.faces == other.faces
            && self.vertices.len() == other.vertices.len()
            && self
                .vertices
                .iter()
                .zip(&other.vertices)
                .all(|(a, b)| a.approx_eq(b, tol))
            && self.morph_targets.len() == other.morph_targets.len()
            && self
                .morph_targets
                .iter()
                .zip(&other.morph_targets)
                .all(|(a, b)| {
                    a.name == b.name
                        && a.blend_vertices.len() == b.blend_vertices.len()
                        && a.blend_vertices.iter().zip(&b.blend_vertices).all(|(x, y)| {
                            x.vertex_id == y.vertex_id
                                && tol.vec3(x.position, y.position)
                                && tol.vec3(x.normal, y.normal)
                                && tol.vec2s(&x.texcoords, &y.texcoords)
                        })
                })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub submeshes: Vec<Submesh>,
}

impl Mesh {
    pub fn validate(&self) -> Result<(), String> {
        for (index, submesh) in self.submeshes.iter().enumerate() {
            submesh
                .validate()
                .map_err(|e| format!("submesh {index}: {e}"))?;
        }
        Ok(())
    }

    pub fn approx_eq(&self, other: &Mesh, tol: Tolerance) -> bool {
        self.submeshes.len() == other.submeshes.len()
            && self
                .submeshes
                .iter()
                .zip(&other.submeshes)
                .all(|(a, b)| a.approx_eq(b, tol))
    }
}
