//! Cache encoding for sheet snapshots.

use std::io::Write;

use super::types::SheetGrid;
use crate::cache::CacheCodec;

impl CacheCodec for SheetGrid {
  fn write_to(&self, writer: &mut dyn Write) -> std::io::Result<()> {
    serde_json::to_writer(writer, self).map_err(std::io::Error::other)
  }

  fn read_from(bytes: Vec<u8>) -> Result<Self, String> {
    serde_json::from_slice(&bytes).map_err(|e| format!("corrupt sheet snapshot: {}", e))
  }
}
