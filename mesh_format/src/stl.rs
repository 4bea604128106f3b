use common::{
    config::ParseConfig,
    geometry::{Pos, Triangle},
    serde::{Deserializer, Serializer},
};
use tracing::debug;

use crate::{
    error::{ParseError, Result},
    Mesh,
};

pub const HEADER_SIZE: usize = 80;
pub const RECORD_SIZE: usize = 50;

// A hostile triangle count should not turn into a huge allocation before the
// data has been proven to exist.
const MAX_PREALLOC: usize = 1 << 16;

/// Decodes a binary STL.
///
/// ```text
/// UINT8[80]    – Header                 - 80 bytes
/// UINT32       – Number of triangles    - 04 bytes
/// foreach triangle                      - 50 bytes
///     REAL32[3] – Normal vector         - 12 bytes
///     REAL32[3] – Vertex 1              - 12 bytes
///     REAL32[3] – Vertex 2              - 12 bytes
///     REAL32[3] – Vertex 3              - 12 bytes
///     UINT16    – Attribute byte count  - 02 bytes
/// end
/// ```
///
/// All values are little endian. The header is kept verbatim and the
/// attribute field is read and dropped. Triangles are only handed out once
/// every record has been decoded, so an error never leaves a partial mesh
/// behind. Nothing past the last record is read unless
/// [`ParseConfig::strict_length`] asks for it.
pub fn parse<T: Deserializer>(des: &mut T, config: &ParseConfig) -> Result<Mesh> {
    let header = des.read_array::<HEADER_SIZE>()?;
    let tri_count = des.read_u32_le()?;
    debug!("Decoding {tri_count} triangles");

    let mut triangles = Vec::with_capacity((tri_count as usize).min(MAX_PREALLOC));
    for _ in 0..tri_count {
        let normal = des_vec3f_bin(des)?;
        let a = des_vec3f_bin(des)?;
        let b = des_vec3f_bin(des)?;
        let c = des_vec3f_bin(des)?;
        let _attribute = des.read_u16_le()?;

        triangles.push(Triangle { normal, a, b, c });
    }

    if config.strict_length {
        let trailing = des.skip_to_end()?;
        if trailing > 0 {
            return Err(ParseError::MalformedLength {
                declared: tri_count,
                trailing,
            });
        }
    }

    Ok(Mesh::new(header, triangles))
}

/// Encodes a mesh in the same layout [`parse`] reads. Attribute fields are
/// written as zero.
///
/// Fails without writing anything if the mesh has more triangles than the
/// count field can hold.
pub fn write<T: Serializer>(mesh: &Mesh, ser: &mut T) -> Result<()> {
    let tri_count = triangle_count(mesh.len())?;
    ser.write_bytes(mesh.header());
    ser.write_u32_le(tri_count);

    for triangle in mesh {
        for vec in [triangle.normal, triangle.a, triangle.b, triangle.c] {
            ser_vec3f_bin(ser, &vec);
        }
        ser.write_u16_le(0);
    }

    Ok(())
}

fn triangle_count(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| ParseError::TooManyTriangles { count: len })
}

fn des_vec3f_bin<T: Deserializer>(des: &mut T) -> Result<Pos> {
    Ok(Pos::new(
        des.read_f32_le()?,
        des.read_f32_le()?,
        des.read_f32_le()?,
    ))
}

fn ser_vec3f_bin<T: Serializer>(ser: &mut T, vec: &Pos) {
    ser.write_f32_le(vec.x);
    ser.write_f32_le(vec.y);
    ser.write_f32_le(vec.z);
}
