//! Test fixtures: markup documents from real character assets, plus meshes and
//! materials generated on demand.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use cal_common::model::{Influence, Mesh, Submesh, Vertex};
use cal_common::{Resource, write_binary, write_markup};
use cal_export::ResourceKind;
use glam::{Vec2, Vec3};

pub const SKELETON: &str = include_str!("skeleton.xsf");
pub const MESH: &str = include_str!("mesh.xmf");
pub const MATERIAL: &str = include_str!("material.xrf");
/// Five arm tracks, 32 keyframes each.
pub const WALK: &str = include_str!("walk.xaf");
/// Version 919 animation with static, translation-free track.
pub const STATIC_POSE: &str = include_str!("static.xaf");
/// [`WALK`] with one NaN time and one NaN rotation.
pub const CORRUPT_WALK: &str = include_str!("corrupt.xaf");
pub const BLINK: &str = include_str!("blink.xpf");

/// Markup document with a `<HEADER>` but no attributes.
pub const HEADER_WITHOUT_ATTRIBUTES: &str = r#"<HEADER />
<SKELETON SCENEAMBIENTCOLOR="1 1 1" NUMBONES="1">
    <BONE NAME="FemaleAnimeRoot" NUMCHILDS="0" ID="0">
        <TRANSLATION>0 1.31134e-006 -30</TRANSLATION>
        <ROTATION>0 0 0 1</ROTATION>
        <LOCALTRANSLATION>0 -1.31134e-006 30</LOCALTRANSLATION>
        <LOCALROTATION>0 0 0 1</LOCALROTATION>
        <PARENTID>-1</PARENTID>
    </BONE>
</SKELETON>"#;

/// Settings document from another application, with mismatched closing tags.
pub const FOREIGN_DOCUMENT: &str = r#"<imvu>
  <settings>
    <bodyMesh>true</bodyMesh>
    <duration>120</duration>
  </settings>
  <skeletalAnimation>
    <skel frame="0" bone="0">
      <n11>1</n11>
        </ANIMATION>
      </xml>
    </xpf>
  </morphAnimation>
</imvu>
"#;

/// Every markup fixture with the kind it holds.
pub fn markup_fixtures() -> [(&'static str, ResourceKind, &'static str); 6] {
    [
        ("skeleton", ResourceKind::Skeleton, SKELETON),
        ("mesh", ResourceKind::Mesh, MESH),
        ("material", ResourceKind::Material, MATERIAL),
        ("walk", ResourceKind::SkeletalAnimation, WALK),
        ("static", ResourceKind::SkeletalAnimation, STATIC_POSE),
        ("blink", ResourceKind::MorphAnimation, BLINK),
    ]
}

/// Material with diffuse and opacity maps, as shipped with eyebrow products.
pub fn eyebrow_material() -> String {
    concat!(
        r#"<HEADER MAGIC="XRF" VERSION="919" />"#,
        r#"<MATERIAL NUMMAPS="2">"#,
        "<AMBIENT>149 149 149 0</AMBIENT>",
        "<DIFFUSE>255 255 255 255</DIFFUSE>",
        "<SPECULAR>229 229 229 0</SPECULAR>",
        "<SHININESS>0</SHININESS>",
        r#"<MAP TYPE="Diffuse Color">eyebrows001_brunette001.tga</MAP>"#,
        r#"<MAP TYPE="Opacity">eyebrows001_alpha.tga</MAP>"#,
        "</MATERIAL>"
    )
    .to_string()
}

/// (material thread, faces, vertices) of each submesh of a head morph mesh.
pub const HEAD_SUBMESHES: [(i32, usize, usize); 4] =
    [(2, 1430, 959), (3, 336, 172), (5, 66, 66), (6, 64, 48)];

/// A mesh with the submesh layout of [`HEAD_SUBMESHES`].
pub fn head_mesh() -> Mesh {
    let submeshes = HEAD_SUBMESHES
        .iter()
        .map(|&(material, faces, vertices)| {
            let mut submesh = Submesh::new(material);
            submesh.lod_step_count = Some(0);
            submesh.texcoord_count = 1;
            submesh.vertices = (0..vertices)
                .map(|i| {
                    let t = i as f32 / vertices as f32;
                    let mut vertex = Vertex::new(
                        Vec3::new(t * 10.0, (t * 6.28).sin(), (t * 6.28).cos()),
                        Vec3::Y,
                    );
                    vertex.texcoords = vec![Vec2::new(t, 1.0 - t)];
                    vertex.influences = vec![Influence {
                        bone_id: 22,
                        weight: 1.0,
                    }];
                    vertex
                })
                .collect();
            let n = vertices as u32;
            submesh.faces = (0..faces as u32)
                .map(|f| [f % n, (f + 1) % n, (f + 2) % n])
                .collect();
            submesh
        })
        .collect();
    Mesh { submeshes }
}

pub fn head_mesh_markup() -> Vec<u8> {
    write_markup(ResourceKind::Mesh, &Resource::Mesh(head_mesh())).unwrap()
}

pub fn head_mesh_binary() -> Vec<u8> {
    write_binary(ResourceKind::Mesh, &Resource::Mesh(head_mesh())).unwrap()
}

/// Write `contents` to `dir/name` and return the path.
pub fn write(dir: &Path, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("Failed to write fixture");
    path
}
