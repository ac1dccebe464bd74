//! Binary mesh format (.cmf)
//!
//! # Layout
//! ```text
//! header (8 bytes, magic "CMF\0")
//! submesh_count u32
//! submeshes:
//!   material_thread_id i32
//!   vertex_count u32, face_count u32
//!   lod_step_count i32 (-1 when absent)
//!   texcoord_count u32, morph_count u32
//!   vertices (vertex_count ×):
//!     position [f32; 3], normal [f32; 3], color [f32; 3]
//!     collapse_id i32, face_collapse_count i32
//!     texcoords (texcoord_count × [f32; 2])
//!     influence_count u32, influences (× bone_id i32, weight f32)
//!   morphs (morph_count ×):
//!     name, blend_count u32
//!     blend vertices (× vertex_id u32, position [f32; 3], normal [f32; 3],
//!                       texcoords (texcoord_count × [f32; 2]))
//!   faces (face_count × [u32; 3])
//! ```
//!
//! Face indices are limited to 16-bit range so that runtime index buffers stay
//! `u16`.

use cal_shared::MESH_FORMAT;

use super::header::BinaryHeader;
use super::io::{ByteReader, ByteWriter};
use crate::error::{CodecError, CodecResult};
use crate::model::{BlendVertex, Influence, Mesh, MorphTarget, Submesh, Vertex};

/// Largest vertex index a face may reference.
pub const MAX_FACE_INDEX: u32 = u16::MAX as u32;

const SUBMESH_HEADER_SIZE: usize = 24;
const FACE_SIZE: usize = 12;
const MIN_MORPH_SIZE: usize = 8;

fn vertex_size(texcoord_count: usize) -> usize {
    12 * 3 + 4 + 4 + texcoord_count * 8 + 4
}

fn blend_vertex_size(texcoord_count: usize) -> usize {
    4 + 12 + 12 + texcoord_count * 8
}

pub fn read_mesh(bytes: &[u8]) -> CodecResult<Mesh> {
    let mut r = ByteReader::new(bytes);
    BinaryHeader::read(&mut r, &MESH_FORMAT)?;

    let submesh_count = r.count(SUBMESH_HEADER_SIZE)?;
    let mut submeshes = Vec::with_capacity(submesh_count);
    for _ in 0..submesh_count {
        submeshes.push(read_submesh(&mut r)?);
    }
    r.finish()?;

    let mesh = Mesh { submeshes };
    mesh.validate().map_err(CodecError::Malformed)?;
    Ok(mesh)
}

fn read_submesh(r: &mut ByteReader<'_>) -> CodecResult<Submesh> {
    let material_thread_id = r.i32()?;
    let vertex_count = r.u32()? as usize;
    let face_count = r.u32()? as usize;
    let lod_steps = r.i32()?;
    let texcoord_count = r.u32()?;
    let morph_count = r.u32()? as usize;

    let tc = texcoord_count as usize;
    let needed = vertex_count
        .saturating_mul(vertex_size(tc))
        .saturating_add(face_count.saturating_mul(FACE_SIZE))
        .saturating_add(morph_count.saturating_mul(MIN_MORPH_SIZE));
    if needed > r.remaining() {
        return Err(CodecError::Truncated {
            offset: r.offset(),
            needed,
            available: r.remaining(),
        });
    }

    let mut vertices = Vec::with_capacity(vertex_count);
    for _ in 0..vertex_count {
        let position = r.vec3()?;
        let normal = r.vec3()?;
        let color = r.vec3()?;
        let collapse_id = r.i32()?;
        let face_collapse_count = r.i32()?;
        let texcoords = (0..tc).map(|_| r.vec2()).collect::<CodecResult<Vec<_>>>()?;
        let influence_count = r.count(8)?;
        let mut influences = Vec::with_capacity(influence_count);
        for _ in 0..influence_count {
            influences.push(Influence {
                bone_id: r.i32()?,
                weight: r.f32()?,
            });
        }
        vertices.push(Vertex {
            position,
            normal,
            color,
            collapse_id,
            face_collapse_count,
            texcoords,
            influences,
        });
    }

    let mut morph_targets = Vec::with_capacity(morph_count);
    for _ in 0..morph_count {
        let name = r.string()?;
        let blend_count = r.count(blend_vertex_size(tc))?;
        let mut blend_vertices = Vec::with_capacity(blend_count);
        for _ in 0..blend_count {
            blend_vertices.push(BlendVertex {
                vertex_id: r.u32()?,
                position: r.vec3()?,
                normal: r.vec3()?,
                texcoords: (0..tc).map(|_| r.vec2()).collect::<CodecResult<Vec<_>>>()?,
            });
        }
        morph_targets.push(MorphTarget {
            name,
            blend_vertices,
        });
    }

    let mut faces = Vec::with_capacity(face_count);
    for _ in 0..face_count {
        let face = [r.u32()?, r.u32()?, r.u32()?];
        if face.iter().any(|&v| v > MAX_FACE_INDEX) {
            return Err(CodecError::malformed(format!(
                "face {face:?} exceeds 16-bit vertex index"
            )));
        }
        faces.push(face);
    }

    Ok(Submesh {
        material_thread_id,
        lod_step_count: u32::try_from(lod_steps).ok(),
        texcoord_count,
        vertices,
        morph_targets,
        faces,
    })
}

pub fn write_mesh(mesh: &Mesh) -> CodecResult<Vec<u8>> {
    mesh.validate().map_err(CodecError::Unrepresentable)?;

    let mut w = ByteWriter::new();
    w.bytes(&BinaryHeader::new(&MESH_FORMAT).to_bytes());
    w.count(mesh.submeshes.len(), "submeshes")?;
    for submesh in &mesh.submeshes {
        write_submesh(&mut w, submesh)?;
    }
    Ok(w.into_bytes())
}

fn write_submesh(w: &mut ByteWriter, submesh: &Submesh) -> CodecResult<()> {
    if let Some(face) = submesh
        .faces
        .iter()
        .find(|face| face.iter().any(|&v| v > MAX_FACE_INDEX))
    {
        return Err(CodecError::unrepresentable(format!(
            "face {face:?} exceeds 16-bit vertex index"
        )));
    }
    let lod_steps = match submesh.lod_step_count {
        Some(steps) => i32::try_from(steps)
            .map_err(|_| CodecError::unrepresentable(format!("{steps} lod steps")))?,
        None => -1,
    };

    w.i32(submesh.material_thread_id);
    w.count(submesh.vertices.len(), "vertices")?;
    w.count(submesh.faces.len(), "faces")?;
    w.i32(lod_steps);
    w.u32(submesh.texcoord_count);
    w.count(submesh.morph_targets.len(), "morph targets")?;

    for vertex in &submesh.vertices {
        w.vec3(vertex.position);
        w.vec3(vertex.normal);
        w.vec3(vertex.color);
        w.i32(vertex.collapse_id);
        w.i32(vertex.face_collapse_count);
        for &tc in &vertex.texcoords {
            w.vec2(tc);
        }
        w.count(vertex.influences.len(), "influences")?;
        for influence in &vertex.influences {
            w.i32(influence.bone_id);
            w.f32(influence.weight);
        }
    }

    for morph in &submesh.morph_targets {
        w.string(&morph.name)?;
        w.count(morph.blend_vertices.len(), "blend vertices")?;
        for blend in &morph.blend_vertices {
            if blend.texcoords.len() != submesh.texcoord_count as usize {
                return Err(CodecError::unrepresentable(format!(
                    "morph {} vertex {} has {} texcoords, submesh declares {}",
                    morph.name,
                    blend.vertex_id,
                    blend.texcoords.len(),
                    submesh.texcoord_count
                )));
            }
            w.u32(blend.vertex_id);
            w.vec3(blend.position);
            w.vec3(blend.normal);
            for &tc in &blend.texcoords {
                w.vec2(tc);
            }
        }
    }

    for face in &submesh.faces {
        for &index in face {
            w.u32(index);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec3};

    fn quad() -> Mesh {
        let mut submesh = Submesh::new(3);
        submesh.texcoord_count = 1;
        submesh.lod_step_count = Some(0);
        for i in 0..4 {
            let mut vertex = Vertex::new(Vec3::new(i as f32, 1.0, -2.5), Vec3::Y);
            vertex.texcoords.push(Vec2::new(0.25 * i as f32, 0.75));
            vertex.influences.push(Influence {
                bone_id: 22,
                weight: 1.0,
            });
            submesh.vertices.push(vertex);
        }
        submesh.faces = vec![[0, 1, 2], [2, 1, 3]];
        submesh.morph_targets.push(MorphTarget {
            name: "eyes.Blink.Clamped".into(),
            blend_vertices: vec![BlendVertex {
                vertex_id: 1,
                position: Vec3::new(7.69704, -121.396, 862.701),
                normal: Vec3::X,
                texcoords: vec![Vec2::new(0.5, 0.25)],
            }],
        });
        Mesh {
            submeshes: vec![submesh, Submesh::new(5)],
        }
    }

    #[test]
    fn test_mesh_roundtrip() {
        let mesh = quad();
        let bytes = write_mesh(&mesh).unwrap();
        assert_eq!(&bytes[0..4], b"CMF\0");
        assert_eq!(read_mesh(&bytes).unwrap(), mesh);
    }

    #[test]
    fn test_missing_lod_steps_survive() {
        let mut mesh = quad();
        mesh.submeshes[0].lod_step_count = None;
        let decoded = read_mesh(&write_mesh(&mesh).unwrap()).unwrap();
        assert_eq!(decoded.submeshes[0].lod_step_count, None);
    }

    #[test]
    fn test_mesh_every_prefix_is_truncated() {
        let bytes = write_mesh(&quad()).unwrap();
        for len in 0..bytes.len() {
            assert!(read_mesh(&bytes[..len]).is_err(), "prefix {len} accepted");
        }
    }

    #[test]
    fn test_out_of_range_face_is_unrepresentable() {
        let mut mesh = quad();
        mesh.submeshes[0].faces.push([0, 1, 70_000]);
        assert!(matches!(
            write_mesh(&mesh),
            Err(CodecError::Unrepresentable(_))
        ));
    }
}
