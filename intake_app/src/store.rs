//! Destinations for accepted inventory items.

use std::fs::{self, OpenOptions};
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use indexmap::IndexMap;

use crate::inventory::InventoryItem;

/// Persists accepted items.
pub trait RecordSink {
    /// Stores one item.
    ///
    /// # Errors
    ///
    /// Returns an error if the item could not be written.
    fn store(&self, item: &InventoryItem) -> io::Result<()>;
}

impl<S: RecordSink + ?Sized> RecordSink for Box<S> {
    fn store(&self, item: &InventoryItem) -> io::Result<()> {
        (**self).store(item)
    }
}

/// Appends one JSON object per item to a file.
#[derive(Debug)]
pub struct JsonLinesSink {
    path: PathBuf,
    file: Mutex<fs::File>,
}

impl JsonLinesSink {
    /// Opens the file for appending, creating it if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for JsonLinesSink {
    fn store(&self, item: &InventoryItem) -> io::Result<()> {
        // one write per line so concurrent appends never interleave
        let mut line = serde_json::to_vec(item)?;
        line.push(b'\n');

        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        file.write_all(&line)?;
        file.flush()
    }
}

/// Keeps items in memory, merged by SKU.
///
/// Storing an item with a known SKU replaces the earlier one in place. Used
/// for dry runs.
#[derive(Debug, Default)]
pub struct MemorySink {
    items: Mutex<IndexMap<String, InventoryItem>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets a copy of the stored items, in order of first insertion.
    #[cfg(test)]
    pub fn items(&self) -> Vec<InventoryItem> {
        let items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.values().cloned().collect()
    }
}

impl RecordSink for MemorySink {
    fn store(&self, item: &InventoryItem) -> io::Result<()> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.insert(item.sku.clone(), item.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::env;

    use super::*;

    fn item(sku: &str, quantity: u64) -> InventoryItem {
        InventoryItem {
            sku: sku.to_owned(),
            name: format!("item {sku}"),
            quantity,
            price: 1.25,
        }
    }

    #[test]
    fn memory_merges_by_sku() {
        let sink = MemorySink::new();
        sink.store(&item("a", 1)).expect("memory store can't fail");
        sink.store(&item("b", 2)).expect("memory store can't fail");
        sink.store(&item("a", 3)).expect("memory store can't fail");

        assert_eq!(sink.items(), [item("a", 3), item("b", 2)]);
    }

    #[test]
    fn json_lines_appends() {
        let path = env::temp_dir().join(format!("intake-sink-{}.jsonl", std::process::id()));
        _ = fs::remove_file(&path);

        {
            let sink = JsonLinesSink::open(&path).expect("sink must open");
            assert_eq!(sink.path(), path);
            sink.store(&item("a", 1)).expect("store must work");
        }

        // reopening must not truncate
        let sink = JsonLinesSink::open(&path).expect("sink must reopen");
        sink.store(&item("a", 2)).expect("store must work");

        let content = fs::read_to_string(&path).expect("file must exist");
        _ = fs::remove_file(&path);

        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).expect("each line is json"))
            .collect();

        assert_eq!(
            lines,
            [
                serde_json::json!({ "sku": "a", "name": "item a", "quantity": 1, "price": 1.25 }),
                serde_json::json!({ "sku": "a", "name": "item a", "quantity": 2, "price": 1.25 }),
            ]
        );
    }
}
