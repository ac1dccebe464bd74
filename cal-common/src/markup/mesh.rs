//! Markup mesh (.xmf)
//!
//! ```text
//! <MESH NUMSUBMESH="n">
//!     <SUBMESH NUMVERTICES NUMFACES [NUMLODSTEPS] [NUMSPRINGS] [NUMMORPHS] NUMTEXCOORDS MATERIAL>
//!         <VERTEX NUMINFLUENCES="k" ID="i">
//!             <POS/> <NORM/> [<COLOR/>] [<COLLAPSEID/> <COLLAPSECOUNT/>]
//!             <TEXCOORD/>... <INFLUENCE ID="bone">weight</INFLUENCE>...
//!         </VERTEX>...
//!         <SPRING/>...
//!         <MORPH NAME NUMBLENDVERTS MORPHID>
//!             <BLENDVERTEX VERTEXID> <POSITION/> <NORMAL/> <TEXCOORD/>... </BLENDVERTEX>...
//!         </MORPH>...
//!         <FACE VERTEXID="a b c"/>...
//!     </SUBMESH>
//! </MESH>
//! ```
//!
//! Springs are skipped on read and never written.

use cal_shared::{FIRST_FILE_VERSION_WITH_VERTEX_COLORS, MESH_FORMAT};
use glam::{Vec2, Vec3};

use super::{Cursor, Element, MarkupWriter, parse_numbers, read_document};
use crate::error::{CodecError, CodecResult};
use crate::formats::MAX_FACE_INDEX;
use crate::model::{BlendVertex, Influence, Mesh, MorphTarget, Submesh, Vertex};

pub fn read_mesh(bytes: &[u8]) -> CodecResult<Mesh> {
    let (version, root) = read_document(bytes, &MESH_FORMAT)?;
    let has_vertex_colors = version >= FIRST_FILE_VERSION_WITH_VERTEX_COLORS;

    let submesh_count: usize = root.parse_attr("NUMSUBMESH")?;
    let mut cursor = root.cursor();
    let mut submeshes = Vec::with_capacity(submesh_count.min(root.children.len()));
    for _ in 0..submesh_count {
        submeshes.push(read_submesh(cursor.expect("SUBMESH")?, has_vertex_colors)?);
    }
    cursor.finish()?;

    let mesh = Mesh { submeshes };
    mesh.validate().map_err(CodecError::Markup)?;
    Ok(mesh)
}

fn read_submesh(element: &Element, has_vertex_colors: bool) -> CodecResult<Submesh> {
    let vertex_count: usize = element.parse_attr("NUMVERTICES")?;
    let face_count: usize = element.parse_attr("NUMFACES")?;
    let lod_steps: Option<i32> = element.parse_optional_attr("NUMLODSTEPS")?;
    let spring_count: usize = element.parse_optional_attr("NUMSPRINGS")?.unwrap_or(0);
    let texcoord_count: u32 = element.parse_attr("NUMTEXCOORDS")?;
    let material_thread_id: i32 = element.parse_attr("MATERIAL")?;

    // Every count is bounded by the children actually present.
    let available = element.children.len();
    if vertex_count
        .saturating_add(face_count)
        .saturating_add(spring_count)
        > available
    {
        return Err(CodecError::markup(format!(
            "<{}> declares {vertex_count} vertices, {face_count} faces and {spring_count} \
             springs but has {available} children",
            element.name
        )));
    }

    let mut cursor = element.cursor();

    let mut vertices = Vec::with_capacity(vertex_count);
    for _ in 0..vertex_count {
        vertices.push(read_vertex(
            cursor.expect("VERTEX")?,
            texcoord_count,
            has_vertex_colors,
        )?);
    }

    if spring_count > 0 {
        tracing::debug!("skipping {spring_count} springs");
        for _ in 0..spring_count {
            cursor.expect("SPRING")?;
        }
    }

    let mut morph_targets = Vec::new();
    while let Some(morph) = cursor.next_if("MORPH") {
        morph_targets.push(read_morph_target(morph, texcoord_count)?);
    }
    if let Some(declared) = element.parse_optional_attr::<usize>("NUMMORPHS")? {
        if declared != morph_targets.len() {
            return Err(CodecError::markup(format!(
                "NUMMORPHS={declared} but {} <MORPH> elements",
                morph_targets.len()
            )));
        }
    }

    let mut faces = Vec::with_capacity(face_count);
    for _ in 0..face_count {
        let face = cursor.expect("FACE")?;
        let indices: [u32; 3] = parse_numbers(face.required_attr("VERTEXID")?, "FACE")?;
        if indices.iter().any(|&v| v > MAX_FACE_INDEX) {
            return Err(CodecError::markup(format!(
                "face {indices:?} exceeds 16-bit vertex index"
            )));
        }
        faces.push(indices);
    }
    cursor.finish()?;

    Ok(Submesh {
        material_thread_id,
        lod_step_count: lod_steps.and_then(|n| u32::try_from(n).ok()),
        texcoord_count,
        vertices,
        morph_targets,
        faces,
    })
}

fn read_vertex(
    element: &Element,
    texcoord_count: u32,
    has_vertex_colors: bool,
) -> CodecResult<Vertex> {
    let influence_count: usize = element.parse_attr("NUMINFLUENCES")?;
    let mut cursor = element.cursor();

    let mut vertex = Vertex::new(vec3(cursor.expect("POS")?)?, vec3(cursor.expect("NORM")?)?);

    match cursor.next_if("COLOR") {
        Some(color) => vertex.color = vec3(color)?,
        None if has_vertex_colors => {
            return Err(CodecError::markup("<VERTEX> is missing <COLOR>"));
        }
        None => {}
    }

    if let Some(collapse) = cursor.next_if("COLLAPSEID") {
        [vertex.collapse_id] = parse_numbers(&collapse.text, "COLLAPSEID")?;
        [vertex.face_collapse_count] =
            parse_numbers(&cursor.expect("COLLAPSECOUNT")?.text, "COLLAPSECOUNT")?;
    }

    vertex.texcoords = read_texcoords(&mut cursor, texcoord_count)?;

    for _ in 0..influence_count {
        let influence = cursor.expect("INFLUENCE")?;
        let [weight] = parse_numbers(&influence.text, "INFLUENCE")?;
        vertex.influences.push(Influence {
            bone_id: influence.parse_attr("ID")?,
            weight,
        });
    }
    cursor.finish()?;
    Ok(vertex)
}

fn read_morph_target(element: &Element, texcoord_count: u32) -> CodecResult<MorphTarget> {
    let name = element.required_attr("NAME")?.to_owned();
    let blend_count: usize = element.parse_attr("NUMBLENDVERTS")?;
    let mut cursor = element.cursor();
    let mut blend_vertices = Vec::with_capacity(blend_count.min(element.children.len()));
    for _ in 0..blend_count {
        let blend = cursor.expect("BLENDVERTEX")?;
        let mut inner = blend.cursor();
        blend_vertices.push(BlendVertex {
            vertex_id: blend.parse_attr("VERTEXID")?,
            position: vec3(inner.expect("POSITION")?)?,
            normal: vec3(inner.expect("NORMAL")?)?,
            texcoords: read_texcoords(&mut inner, texcoord_count)?,
        });
        inner.finish()?;
    }
    cursor.finish()?;
    Ok(MorphTarget {
        name,
        blend_vertices,
    })
}

fn read_texcoords(cursor: &mut Cursor<'_>, count: u32) -> CodecResult<Vec<Vec2>> {
    (0..count)
        .map(|_| {
            let element = cursor.expect("TEXCOORD")?;
            Ok(Vec2::from_array(parse_numbers(&element.text, "TEXCOORD")?))
        })
        .collect()
}

fn vec3(element: &Element) -> CodecResult<Vec3> {
    Ok(Vec3::from_array(parse_numbers(&element.text, &element.name)?))
}

pub fn write_mesh(mesh: &Mesh) -> CodecResult<Vec<u8>> {
    mesh.validate().map_err(CodecError::Unrepresentable)?;

    let mut w = MarkupWriter::new(&MESH_FORMAT)?;
    w.start("MESH", &[("NUMSUBMESH", mesh.submeshes.len().to_string().as_str())])?;
    for submesh in &mesh.submeshes {
        write_submesh(&mut w, submesh)?;
    }
    w.end("MESH")?;
    Ok(w.finish())
}

fn write_submesh(w: &mut MarkupWriter, submesh: &Submesh) -> CodecResult<()> {
    let vertex_count = submesh.vertices.len().to_string();
    let face_count = submesh.faces.len().to_string();
    let lod_steps = submesh.lod_step_count.map(|n| n.to_string());
    let morph_count = submesh.morph_targets.len().to_string();
    let texcoord_count = submesh.texcoord_count.to_string();
    let material = submesh.material_thread_id.to_string();

    let mut attributes = vec![
        ("NUMVERTICES", vertex_count.as_str()),
        ("NUMFACES", face_count.as_str()),
    ];
    if let Some(lod_steps) = &lod_steps {
        attributes.push(("NUMLODSTEPS", lod_steps.as_str()));
    }
    attributes.extend([
        ("NUMSPRINGS", "0"),
        ("NUMMORPHS", morph_count.as_str()),
        ("NUMTEXCOORDS", texcoord_count.as_str()),
        ("MATERIAL", material.as_str()),
    ]);
    w.start("SUBMESH", &attributes)?;

    for (id, vertex) in submesh.vertices.iter().enumerate() {
        w.start(
            "VERTEX",
            &[
                ("NUMINFLUENCES", vertex.influences.len().to_string().as_str()),
                ("ID", id.to_string().as_str()),
            ],
        )?;
        w.floats("POS", &vertex.position.to_array())?;
        w.floats("NORM", &vertex.normal.to_array())?;
        w.floats("COLOR", &vertex.color.to_array())?;
        if vertex.has_collapse() {
            w.text("COLLAPSEID", &[], &vertex.collapse_id.to_string())?;
            w.text("COLLAPSECOUNT", &[], &vertex.face_collapse_count.to_string())?;
        }
        for tc in &vertex.texcoords {
            w.floats("TEXCOORD", &tc.to_array())?;
        }
        for influence in &vertex.influences {
            w.text(
                "INFLUENCE",
                &[("ID", influence.bone_id.to_string().as_str())],
                &super::format_float(influence.weight),
            )?;
        }
        w.end("VERTEX")?;
    }

    for (id, morph) in submesh.morph_targets.iter().enumerate() {
        let blend_count = morph.blend_vertices.len().to_string();
        let morph_id = id.to_string();
        let attributes = [
            ("NAME", morph.name.as_str()),
            ("NUMBLENDVERTS", blend_count.as_str()),
            ("MORPHID", morph_id.as_str()),
        ];
        if morph.blend_vertices.is_empty() {
            w.empty("MORPH", &attributes)?;
            continue;
        }
        w.start("MORPH", &attributes)?;
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
            w.start(
                "BLENDVERTEX",
                &[("VERTEXID", blend.vertex_id.to_string().as_str())],
            )?;
            w.floats("POSITION", &blend.position.to_array())?;
            w.floats("NORMAL", &blend.normal.to_array())?;
            for tc in &blend.texcoords {
                w.floats("TEXCOORD", &tc.to_array())?;
            }
            w.end("BLENDVERTEX")?;
        }
        w.end("MORPH")?;
    }

    for face in &submesh.faces {
        if face.iter().any(|&v| v > MAX_FACE_INDEX) {
            return Err(CodecError::unrepresentable(format!(
                "face {face:?} exceeds 16-bit vertex index"
            )));
        }
        let text = format!("{} {} {}", face[0], face[1], face[2]);
        w.empty("FACE", &[("VERTEXID", text.as_str())])?;
    }

    w.end("SUBMESH")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Tolerance;

    const MESH: &str = r#"<HEADER VERSION="910" MAGIC="XMF" />
<MESH NUMSUBMESH="1">
    <SUBMESH NUMVERTICES="3" NUMFACES="1" NUMLODSTEPS="0" NUMSPRINGS="0" NUMMORPHS="2" NUMTEXCOORDS="1" MATERIAL="2">
        <VERTEX NUMINFLUENCES="1" ID="0">
            <POS>30.7542 -112.13 825.308</POS>
            <NORM>-0.857233 0.397024 0.327908</NORM>
            <COLOR>1.35632e-019 1.35632e-019 1.35632e-019</COLOR>
            <TEXCOORD>0.571776 0.980153</TEXCOORD>
            <INFLUENCE ID="22">1</INFLUENCE>
        </VERTEX>
        <VERTEX NUMINFLUENCES="1" ID="1">
            <POS>21.5894 -115.955 805.98</POS>
            <NORM>-0.807413 0.586997 -0.0593164</NORM>
            <TEXCOORD>0.552218 0.978547</TEXCOORD>
            <INFLUENCE ID="22">1</INFLUENCE>
        </VERTEX>
        <VERTEX NUMINFLUENCES="2" ID="2">
            <POS>16.7126 -120.828 804.738</POS>
            <NORM>-0.460269 0.441253 -0.770356</NORM>
            <COLOR>-332.537 1.56945e-043 2.38221e-044</COLOR>
            <COLLAPSEID>1</COLLAPSEID>
            <COLLAPSECOUNT>2</COLLAPSECOUNT>
            <TEXCOORD>0.527233 0.977693</TEXCOORD>
            <INFLUENCE ID="22">0.75</INFLUENCE>
            <INFLUENCE ID="23">0.25</INFLUENCE>
        </VERTEX>
        <MORPH NAME="left.Eye.Down.Clamped" NUMBLENDVERTS="0" MORPHID="0" />
        <MORPH NAME="eyes.Blink.Clamped" NUMBLENDVERTS="1" MORPHID="1">
            <BLENDVERTEX VERTEXID="0">
                <POSITION>7.69704 -121.396 862.701</POSITION>
                <NORMAL>0.475756 -0.861712 -0.176376</NORMAL>
                <TEXCOORD>0.508674 0.275276</TEXCOORD>
            </BLENDVERTEX>
        </MORPH>
        <FACE VERTEXID="0 1 2" />
    </SUBMESH>
</MESH>"#;

    #[test]
    fn test_read_mesh() {
        let mesh = read_mesh(MESH.as_bytes()).unwrap();
        let submesh = &mesh.submeshes[0];
        assert_eq!(submesh.material_thread_id, 2);
        assert_eq!(submesh.lod_step_count, Some(0));
        assert_eq!(submesh.vertices.len(), 3);
        assert_eq!(submesh.vertices[1].color, Vec3::ONE);
        assert_eq!(submesh.vertices[2].collapse_id, 1);
        assert_eq!(submesh.vertices[2].influences.len(), 2);
        assert_eq!(submesh.morph_targets.len(), 2);
        assert_eq!(submesh.morph_targets[1].blend_vertices[0].vertex_id, 0);
        assert_eq!(submesh.faces, vec![[0, 1, 2]]);
    }

    #[test]
    fn test_write_then_read() {
        let mesh = read_mesh(MESH.as_bytes()).unwrap();
        let again = read_mesh(&write_mesh(&mesh).unwrap()).unwrap();
        assert!(again.approx_eq(&mesh, Tolerance::default()));
    }

    #[test]
    fn test_current_version_requires_color() {
        let newer = MESH.replacen(r#"VERSION="910""#, r#"VERSION="919""#, 1);
        assert!(read_mesh(newer.as_bytes()).is_err());
    }

    #[test]
    fn test_face_out_of_range() {
        let broken = MESH.replacen(r#"VERTEXID="0 1 2""#, r#"VERTEXID="0 1 3""#, 1);
        assert!(read_mesh(broken.as_bytes()).is_err());
    }

    #[test]
    fn test_declared_counts_must_match() {
        let broken = MESH.replacen(r#"NUMSUBMESH="1""#, r#"NUMSUBMESH="2""#, 1);
        assert!(read_mesh(broken.as_bytes()).is_err());
        let broken = MESH.replacen(r#"NUMMORPHS="2""#, r#"NUMMORPHS="3""#, 1);
        assert!(read_mesh(broken.as_bytes()).is_err());
    }

    #[test]
    fn test_skeleton_document_is_not_a_mesh() {
        let skeleton = br#"<HEADER MAGIC="XSF" VERSION="910"/><SKELETON NUMBONES="0"/>"#;
        assert!(read_mesh(skeleton).is_err());
    }
}
