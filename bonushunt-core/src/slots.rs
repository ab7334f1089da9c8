//! The slot reference catalog used for bonus-creation autocomplete.
//!
//! Bulk-loaded once from a `name,provider,image_url,category` CSV file,
//! then only ever read.

use std::sync::Arc;

use crate::{Database, DatabaseError, NewSlot, SlotData};

pub struct Slots<Db> {
    db: Arc<Db>,
}

impl<Db> Slots<Db>
where
    Db: Database,
{
    pub fn new(db: &Arc<Db>) -> Self {
        Self { db: db.clone() }
    }

    /// Exact lookup by slot name
    pub async fn by_name(&self, name: &str) -> Result<SlotData, DatabaseError> {
        self.db.slot_by_name(name).await
    }

    /// Case-insensitive substring search, at most 20 results
    pub async fn search(&self, query: &str) -> Result<Vec<SlotData>, DatabaseError> {
        self.db.search_slots(query).await
    }

    /// Imports the catalog from CSV data when the catalog is empty.
    /// Returns the number of imported rows.
    pub async fn ensure_catalog(&self, csv_data: &str) -> Result<usize, DatabaseError> {
        let count = self.db.slot_count().await?;

        if count > 0 {
            return Ok(0);
        }

        self.import_csv(csv_data).await
    }

    /// Parses `name,provider,image_url,category` rows, skipping the
    /// header, rows missing a name or provider, and duplicates.
    pub async fn import_csv(&self, csv_data: &str) -> Result<usize, DatabaseError> {
        let mut imported = 0;

        for line in csv_data.lines().skip(1) {
            let fields: Vec<_> = line.split(',').map(str::trim).collect();

            if fields.len() < 3 {
                continue;
            }

            let (name, provider) = (fields[0], fields[1]);

            if name.is_empty() || provider.is_empty() {
                continue;
            }

            let new_slot = NewSlot {
                name: name.to_string(),
                provider: provider.to_string(),
                image_url: Some(fields[2])
                    .filter(|f| !f.is_empty())
                    .map(str::to_string),
                category: fields.get(3).filter(|f| !f.is_empty()).map(|f| f.to_string()),
            };

            match self.db.create_slot(new_slot).await {
                Ok(_) => imported += 1,
                Err(DatabaseError::Conflict { .. }) => {
                    log::debug!("Skipped duplicate slot: {name}");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(imported)
    }
}
