//! Binary material format (.crf)
//!
//! # Layout
//! ```text
//! header (8 bytes, magic "CRF\0")
//! ambient [u8; 4], diffuse [u8; 4], specular [u8; 4]  (RGBA)
//! shininess f32
//! map_count u32
//! maps (map_count ×): filename, role (u32 len + UTF-8 each)
//! ```

use cal_shared::MATERIAL_FORMAT;

use super::header::BinaryHeader;
use super::io::{ByteReader, ByteWriter};
use crate::error::CodecResult;
use crate::model::{Material, MaterialMap};

pub fn read_material(bytes: &[u8]) -> CodecResult<Material> {
    let mut r = ByteReader::new(bytes);
    BinaryHeader::read(&mut r, &MATERIAL_FORMAT)?;

    let ambient = r.rgba()?;
    let diffuse = r.rgba()?;
    let specular = r.rgba()?;
    let shininess = r.f32()?;
    let map_count = r.count(8)?;
    let mut maps = Vec::with_capacity(map_count);
    for _ in 0..map_count {
        let filename = r.string()?;
        let role = r.string()?;
        maps.push(MaterialMap { role, filename });
    }
    r.finish()?;

    Ok(Material {
        ambient,
        diffuse,
        specular,
        shininess,
        maps,
    })
}

pub fn write_material(material: &Material) -> CodecResult<Vec<u8>> {
    let mut w = ByteWriter::new();
    w.bytes(&BinaryHeader::new(&MATERIAL_FORMAT).to_bytes());
    w.bytes(&material.ambient);
    w.bytes(&material.diffuse);
    w.bytes(&material.specular);
    w.f32(material.shininess);
    w.count(material.maps.len(), "maps")?;
    for map in &material.maps {
        w.string(&map.filename)?;
        w.string(&map.role)?;
    }
    Ok(w.into_bytes())
}
