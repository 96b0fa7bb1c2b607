//! Size-checked file input.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use certshelf_types::DecodeError;

/// Read `path`, refusing files larger than `limit` bytes before reading them.
pub fn read_input(path: &Path, limit: usize) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let file = File::open(path)
        .map_err(|e| format!("cannot open {}: {e}", path.display()))?;
    let size = usize::try_from(file.metadata()?.len()).unwrap_or(usize::MAX);
    if size > limit {
        return Err(DecodeError::InputTooLarge { size, limit }.into());
    }

    // the file may grow between the size check and the read
    let mut data = Vec::with_capacity(size);
    file.take((limit as u64).saturating_add(1)).read_to_end(&mut data)?;
    if data.len() > limit {
        return Err(DecodeError::InputTooLarge {
            size: data.len(),
            limit,
        }
        .into());
    }
    Ok(data)
}
