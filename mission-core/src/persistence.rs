use crate::store::{ConfigStore, Snapshot};
use screen::{LoadError, ParseError, ScreenDocument, ScreenError};
use std::io::{Read, Write};

/// Moves a screen between the store and its JSON file form.
///
/// Decoding never touches a store; a document only takes effect once it is
/// applied with [`ConfigStore::apply_document`].
pub struct PersistenceAdapter;

impl PersistenceAdapter {
    pub fn to_bytes(snapshot: &Snapshot) -> Result<Vec<u8>, ScreenError> {
        Ok(snapshot.document().to_json_vec_pretty()?)
    }

    pub fn serialize<W: Write>(snapshot: &Snapshot, mut sink: W) -> Result<(), ScreenError> {
        let data = Self::to_bytes(snapshot)?;
        sink.write_all(&data)?;
        sink.flush()?;
        Ok(())
    }

    pub fn deserialize<R: Read>(mut source: R) -> Result<ScreenDocument, LoadError> {
        let mut data = Vec::new();
        source.read_to_end(&mut data).map_err(ParseError::from)?;
        ScreenDocument::from_json_slice(&data)
    }

    /// Decodes `source` and applies it to `store`. On any error the store is
    /// left exactly as it was.
    pub fn load_into<R: Read>(store: &mut ConfigStore, source: R) -> Result<(), LoadError> {
        let document = Self::deserialize(source)?;
        store.apply_document(document)?;
        Ok(())
    }
}
