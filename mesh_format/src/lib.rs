//! Loading and saving of binary STL meshes into an immutable [`Mesh`].

use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
    slice,
};

use common::{
    config::ParseConfig,
    geometry::{triangle_bounds, Pos, Triangle},
    serde::{DynamicSerializer, ReaderDeserializer, SliceDeserializer},
};
use tracing::{debug, error};

mod error;
pub mod stl;

pub use error::{ParseError, Result};
pub use stl::{HEADER_SIZE, RECORD_SIZE};

/// A triangle soup along with the raw header it was loaded from.
///
/// A mesh is either fully populated and valid, or empty and invalid. It
/// cannot be modified after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    header: [u8; HEADER_SIZE],
    triangles: Vec<Triangle>,
    valid: bool,
}

impl Mesh {
    /// Creates a valid mesh from already decoded parts.
    pub fn new(header: [u8; HEADER_SIZE], triangles: Vec<Triangle>) -> Self {
        Self {
            header,
            triangles,
            valid: true,
        }
    }

    /// An empty mesh marked as invalid, standing in for one that failed to
    /// load.
    pub fn invalid() -> Self {
        Self {
            header: [0; HEADER_SIZE],
            triangles: Vec::new(),
            valid: false,
        }
    }

    pub fn from_bytes(data: &[u8], config: &ParseConfig) -> Result<Self> {
        stl::parse(&mut SliceDeserializer::new(data), config)
    }

    /// Parses a mesh from a reader in a blocking manner. The reader is left
    /// just past the last triangle unless [`ParseConfig::strict_length`] is
    /// set, in which case it is read to the end.
    pub fn from_reader<T: Read>(reader: T, config: &ParseConfig) -> Result<Self> {
        stl::parse(&mut ReaderDeserializer::new(reader), config)
    }

    pub fn from_path(path: impl AsRef<Path>, config: &ParseConfig) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ParseError::FileOpen {
            path: path.to_path_buf(),
            source,
        })?;

        let mesh = Self::from_reader(BufReader::new(file), config)?;
        debug!(
            "Loaded `{}` with {} triangles, header `{}`",
            path.display(),
            mesh.len(),
            mesh.header_lossy()
        );
        Ok(mesh)
    }

    /// Like [`Mesh::from_path`], but failures are logged and turned into
    /// [`Mesh::invalid`]. Check [`Mesh::is_valid`] before using the result.
    pub fn open(path: impl AsRef<Path>, config: &ParseConfig) -> Self {
        let path = path.as_ref();
        match Self::from_path(path, config) {
            Ok(mesh) => mesh,
            Err(err) => {
                error!("Failed to load mesh `{}`: {err}", path.display());
                Self::invalid()
            }
        }
    }

    /// Encodes the mesh with [`stl::write`].
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut ser = DynamicSerializer::with_capacity(HEADER_SIZE + 4 + self.len() * RECORD_SIZE);
        stl::write(self, &mut ser)?;
        Ok(ser.into_inner())
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// The first 80 bytes of the file, uninterpreted.
    pub fn header(&self) -> &[u8; HEADER_SIZE] {
        &self.header
    }

    /// The header as text, for diagnostics only.
    pub fn header_lossy(&self) -> String {
        String::from_utf8_lossy(&self.header)
            .trim_end_matches(['\0', ' '])
            .to_owned()
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn iter(&self) -> slice::Iter<'_, Triangle> {
        self.triangles.iter()
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Get the minimum and maximum of each component of every vertex in the
    /// model. An empty mesh has an inverted box.
    pub fn bounds(&self) -> (Pos, Pos) {
        triangle_bounds(&self.triangles)
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::invalid()
    }
}

impl<'a> IntoIterator for &'a Mesh {
    type Item = &'a Triangle;
    type IntoIter = slice::Iter<'a, Triangle>;

    fn into_iter(self) -> Self::IntoIter {
        self.triangles.iter()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn unit_triangle() -> Triangle {
        Triangle::new(
            Pos::z(),
            Pos::new(0.0, 0.0, 0.0),
            Pos::new(2.0, 0.0, 0.0),
            Pos::new(0.0, 3.0, 1.0),
        )
    }

    #[test]
    fn invalid_mesh_is_empty() {
        let mesh = Mesh::invalid();
        assert!(!mesh.is_valid());
        assert!(mesh.is_empty());
        assert_eq!(mesh.iter().count(), 0);
        assert_eq!(Mesh::default(), mesh);
    }

    #[test]
    fn header_lossy_trims_padding() {
        let mut header = [b' '; HEADER_SIZE];
        header[..5].copy_from_slice(b"hello");
        header[40] = 0;
        let mesh = Mesh::new(header, Vec::new());
        assert_eq!(mesh.header_lossy().trim_end(), "hello");

        let mut header = [0; HEADER_SIZE];
        header[..4].copy_from_slice(b"cube");
        assert_eq!(Mesh::new(header, Vec::new()).header_lossy(), "cube");
    }

    #[test]
    fn reader_and_slice_agree() {
        let mesh = Mesh::new([7; HEADER_SIZE], vec![unit_triangle(); 3]);
        let bytes = mesh.to_bytes().unwrap();

        let from_slice = Mesh::from_bytes(&bytes, &ParseConfig::default()).unwrap();
        let from_reader = Mesh::from_reader(Cursor::new(&bytes), &ParseConfig::default()).unwrap();
        assert_eq!(from_slice, mesh);
        assert_eq!(from_reader, mesh);
    }

    #[test]
    fn reader_keeps_trailing_data() {
        let mesh = Mesh::new([1; HEADER_SIZE], vec![unit_triangle(); 2]);
        let mut bytes = mesh.to_bytes().unwrap();
        bytes.extend_from_slice(b"NEXT");

        let mut cursor = Cursor::new(bytes);
        let parsed = Mesh::from_reader(&mut cursor, &ParseConfig::default()).unwrap();
        assert_eq!(parsed, mesh);

        let mut rest = Vec::new();
        cursor.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, b"NEXT");
    }

    #[test]
    fn truncated_reader() {
        let mesh = Mesh::new([0; HEADER_SIZE], vec![unit_triangle(); 4]);
        let bytes = mesh.to_bytes().unwrap();
        let short = &bytes[..HEADER_SIZE + 4 + 3 * RECORD_SIZE];

        let result = Mesh::from_reader(Cursor::new(short), &ParseConfig::default());
        assert!(matches!(result, Err(ParseError::Truncated { .. })));
    }

    #[test]
    fn bounds_and_iteration() {
        let mesh = Mesh::new([0; HEADER_SIZE], vec![unit_triangle()]);
        assert_eq!(mesh.bounds(), (Pos::zeros(), Pos::new(2.0, 3.0, 1.0)));
        assert_eq!((&mesh).into_iter().count(), 1);
    }
}
