//! Summaries extracted by the introspection cache.

use cal_common::{Material, Mesh};
use hashbrown::HashMap;
use serde::Serialize;

/// Which texture file is bound to each map role of a material.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MaterialSummary {
    pub texture_bindings: HashMap<String, String>,
}

impl MaterialSummary {
    /// Later maps with a role already seen replace the earlier binding.
    pub fn of(material: &Material) -> Self {
        let texture_bindings = material
            .maps
            .iter()
            .map(|map| (map.role.clone(), map.filename.clone()))
            .collect();
        Self { texture_bindings }
    }
}

/// Per-submesh statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubmeshStat {
    pub material_thread_id: i32,
    pub face_count: usize,
    pub vertex_count: usize,
    pub lod_step_count: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MeshSummary {
    pub submeshes: Vec<SubmeshStat>,
}

impl MeshSummary {
    pub fn of(mesh: &Mesh) -> Self {
        let submeshes = mesh
            .submeshes
            .iter()
            .map(|submesh| SubmeshStat {
                material_thread_id: submesh.material_thread_id,
                face_count: submesh.faces.len(),
                vertex_count: submesh.vertices.len(),
                lod_step_count: submesh.lod_step_count,
            })
            .collect();
        Self { submeshes }
    }

    pub fn face_count(&self) -> usize {
        self.submeshes.iter().map(|s| s.face_count).sum()
    }

    pub fn vertex_count(&self) -> usize {
        self.submeshes.iter().map(|s| s.vertex_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cal_common::{MaterialMap, Submesh};

    #[test]
    fn test_duplicate_role_keeps_last() {
        let mut material = Material::default();
        material.maps = vec![
            MaterialMap::new("Diffuse Color", "first.tga"),
            MaterialMap::new("Opacity", "alpha.tga"),
            MaterialMap::new("Diffuse Color", "second.tga"),
        ];
        let summary = MaterialSummary::of(&material);
        assert_eq!(summary.texture_bindings.len(), 2);
        assert_eq!(summary.texture_bindings["Diffuse Color"], "second.tga");
        assert_eq!(summary.texture_bindings["Opacity"], "alpha.tga");
    }

    #[test]
    fn test_mesh_counts() {
        let mut first = Submesh::new(2);
        first.faces = vec![[0, 0, 0]; 3];
        first.lod_step_count = Some(0);
        let second = Submesh::new(7);
        let summary = MeshSummary::of(&Mesh {
            submeshes: vec![first, second],
        });
        assert_eq!(
            summary.submeshes,
            vec![
                SubmeshStat {
                    material_thread_id: 2,
                    face_count: 3,
                    vertex_count: 0,
                    lod_step_count: Some(0),
                },
                SubmeshStat {
                    material_thread_id: 7,
                    face_count: 0,
                    vertex_count: 0,
                    lod_step_count: None,
                },
            ]
        );
        assert_eq!(summary.face_count(), 3);
    }
}
