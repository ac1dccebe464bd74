//! Markup material (.xrf)
//!
//! ```text
//! <MATERIAL NUMMAPS="n">
//!     <AMBIENT>r g b a</AMBIENT>
//!     <DIFFUSE>r g b a</DIFFUSE>
//!     <SPECULAR>r g b a</SPECULAR>
//!     <SHININESS>s</SHININESS>
//!     <MAP TYPE="Diffuse Color">file.tga</MAP>...
//! </MATERIAL>
//! ```

use cal_shared::MATERIAL_FORMAT;

use super::{MarkupWriter, format_float, parse_numbers, read_document};
use crate::error::CodecResult;
use crate::model::{DEFAULT_MAP_ROLE, Material, MaterialMap};

pub fn read_material(bytes: &[u8]) -> CodecResult<Material> {
    let (_, root) = read_document(bytes, &MATERIAL_FORMAT)?;
    let mut cursor = root.cursor();

    let ambient = parse_numbers(&cursor.expect("AMBIENT")?.text, "AMBIENT")?;
    let diffuse = parse_numbers(&cursor.expect("DIFFUSE")?.text, "DIFFUSE")?;
    let specular = parse_numbers(&cursor.expect("SPECULAR")?.text, "SPECULAR")?;
    let [shininess] = parse_numbers(&cursor.expect("SHININESS")?.text, "SHININESS")?;

    let mut maps = Vec::new();
    while let Some(map) = cursor.next_if("MAP") {
        maps.push(MaterialMap {
            role: map.attr("TYPE").unwrap_or(DEFAULT_MAP_ROLE).to_owned(),
            filename: map.text.trim().to_owned(),
        });
    }
    cursor.finish()?;

    Ok(Material {
        ambient,
        diffuse,
        specular,
        shininess,
        maps,
    })
}

fn rgba(color: [u8; 4]) -> String {
    color.map(|c| c.to_string()).join(" ")
}

pub fn write_material(material: &Material) -> CodecResult<Vec<u8>> {
    let mut w = MarkupWriter::new(&MATERIAL_FORMAT)?;
    w.start(
        "MATERIAL",
        &[("NUMMAPS", material.maps.len().to_string().as_str())],
    )?;
    w.text("AMBIENT", &[], &rgba(material.ambient))?;
    w.text("DIFFUSE", &[], &rgba(material.diffuse))?;
    w.text("SPECULAR", &[], &rgba(material.specular))?;
    w.text("SHININESS", &[], &format_float(material.shininess))?;
    for map in &material.maps {
        w.text("MAP", &[("TYPE", map.role.as_str())], &map.filename)?;
    }
    w.end("MATERIAL")?;
    Ok(w.finish())
}
