//! In-process directory store.
//!
//! Holds the five tables in memory and gives each unit of work a private
//! copy of them. Commit swaps the copy in, provided nobody else committed a
//! write since the copy was taken; otherwise the commit fails with
//! [`Error::ConstraintViolation`], the same signal the PostgreSQL store
//! raises on a serialization failure. Uniqueness rules match the SQL schema.
//!
//! Used by the test suites and for running the API without a database.
//!
//! ```rust,ignore
//! use lingodir_core::{DirectoryService, Language, LocalizedNames, MemoryStore};
//!
//! let store = MemoryStore::new();
//! let service = DirectoryService::new(store.clone());
//! let names = LocalizedNames::new().with(Language::En, "Acme");
//! let id = service.get_or_create_company(&names).await?;
//! assert_eq!(service.find_company_by_name("Acme").await?, Some(id));
//! assert_eq!(store.counts().companies, 1);
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::trace;

use crate::error::{Error, Result};
use crate::models::{CompanyId, Language, NameRecord, TagId};
use crate::traits::{DirectoryStore, DirectoryTx};

#[derive(Debug, Clone)]
struct NameRow {
    id: i64,
    owner_id: i64,
    language: Language,
    name: String,
}

#[derive(Debug, Clone)]
struct LinkRow {
    id: i64,
    company_id: CompanyId,
    tag_id: TagId,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    /// Bumped on every committed write.
    version: u64,
    next_id: i64,
    companies: Vec<CompanyId>,
    company_names: Vec<NameRow>,
    tags: Vec<TagId>,
    tag_names: Vec<NameRow>,
    company_tags: Vec<LinkRow>,
}

impl Tables {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Row counts per table, for assertions in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreCounts {
    pub companies: usize,
    pub company_names: usize,
    pub tags: usize,
    pub tag_names: usize,
    pub company_tags: usize,
}

/// In-memory implementation of [`DirectoryStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current committed row counts.
    pub fn counts(&self) -> StoreCounts {
        let tables = lock(&self.tables);
        StoreCounts {
            companies: tables.companies.len(),
            company_names: tables.company_names.len(),
            tags: tables.tags.len(),
            tag_names: tables.tag_names.len(),
            company_tags: tables.company_tags.len(),
        }
    }
}

fn lock(tables: &Mutex<Tables>) -> std::sync::MutexGuard<'_, Tables> {
    // A panic while holding the lock cannot leave a half-applied commit:
    // commits replace the whole value in one assignment.
    tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl DirectoryStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn DirectoryTx>> {
        let snapshot = lock(&self.tables).clone();
        Ok(Box::new(MemoryTx {
            shared: Arc::clone(&self.tables),
            base_version: snapshot.version,
            working: snapshot,
            dirty: false,
            finished: false,
        }))
    }
}

/// Unit of work over a private copy of the tables.
struct MemoryTx {
    shared: Arc<Mutex<Tables>>,
    base_version: u64,
    working: Tables,
    dirty: bool,
    finished: bool,
}

impl MemoryTx {
    fn tables(&mut self) -> Result<&mut Tables> {
        if self.finished {
            return Err(Error::Internal("transaction already committed".to_string()));
        }
        Ok(&mut self.working)
    }

    fn tables_for_write(&mut self) -> Result<&mut Tables> {
        if self.finished {
            return Err(Error::Internal("transaction already committed".to_string()));
        }
        self.dirty = true;
        Ok(&mut self.working)
    }
}

fn first_owner(rows: &[NameRow], name: &str) -> Option<i64> {
    rows.iter()
        .filter(|row| row.name == name)
        .min_by_key(|row| row.id)
        .map(|row| row.owner_id)
}

fn names_of(rows: &[NameRow], owner_id: i64) -> Vec<NameRecord> {
    let mut names: Vec<NameRecord> = rows
        .iter()
        .filter(|row| row.owner_id == owner_id)
        .map(|row| NameRecord::new(row.id, row.language, row.name.clone()))
        .collect();
    names.sort_by_key(|record| record.id);
    names
}

fn insert_name(
    rows: &mut Vec<NameRow>,
    id: i64,
    owner_id: i64,
    language: Language,
    name: &str,
    constraint: &str,
) -> Result<()> {
    if rows
        .iter()
        .any(|row| row.owner_id == owner_id && row.language == language)
    {
        return Err(Error::ConstraintViolation(constraint.to_string()));
    }
    rows.push(NameRow {
        id,
        owner_id,
        language,
        name: name.to_string(),
    });
    Ok(())
}

#[async_trait]
impl DirectoryTx for MemoryTx {
    async fn find_company_by_name(&mut self, name: &str) -> Result<Option<CompanyId>> {
        let tables = self.tables()?;
        Ok(first_owner(&tables.company_names, name))
    }

    async fn insert_company(&mut self) -> Result<CompanyId> {
        let tables = self.tables_for_write()?;
        let id = tables.allocate_id();
        tables.companies.push(id);
        trace!(
            subsystem = "directory",
            component = "memory_store",
            company_id = id,
            "Inserted company"
        );
        Ok(id)
    }

    async fn insert_company_name(
        &mut self,
        company_id: CompanyId,
        language: Language,
        name: &str,
    ) -> Result<()> {
        let tables = self.tables_for_write()?;
        if !tables.companies.contains(&company_id) {
            return Err(Error::Internal(format!(
                "company {} does not exist",
                company_id
            )));
        }
        let id = tables.allocate_id();
        insert_name(
            &mut tables.company_names,
            id,
            company_id,
            language,
            name,
            "company_name_company_lang_uc",
        )
    }

    async fn company_names(&mut self, company_id: CompanyId) -> Result<Vec<NameRecord>> {
        let tables = self.tables()?;
        Ok(names_of(&tables.company_names, company_id))
    }

    async fn search_company_names(
        &mut self,
        query: &str,
        language: Language,
    ) -> Result<Vec<String>> {
        let needle = query.to_lowercase();
        let tables = self.tables()?;
        let mut rows: Vec<&NameRow> = tables
            .company_names
            .iter()
            .filter(|row| row.language == language && row.name.to_lowercase().contains(&needle))
            .collect();
        rows.sort_by_key(|row| row.id);
        Ok(rows.into_iter().map(|row| row.name.clone()).collect())
    }

    async fn find_tag_by_name(&mut self, name: &str) -> Result<Option<TagId>> {
        let tables = self.tables()?;
        Ok(first_owner(&tables.tag_names, name))
    }

    async fn insert_tag(&mut self) -> Result<TagId> {
        let tables = self.tables_for_write()?;
        let id = tables.allocate_id();
        tables.tags.push(id);
        trace!(
            subsystem = "directory",
            component = "memory_store",
            tag_id = id,
            "Inserted tag"
        );
        Ok(id)
    }

    async fn insert_tag_name(&mut self, tag_id: TagId, language: Language, name: &str) -> Result<()> {
        let tables = self.tables_for_write()?;
        if !tables.tags.contains(&tag_id) {
            return Err(Error::Internal(format!("tag {} does not exist", tag_id)));
        }
        let id = tables.allocate_id();
        insert_name(
            &mut tables.tag_names,
            id,
            tag_id,
            language,
            name,
            "tag_name_tag_lang_uc",
        )
    }

    async fn tag_names(&mut self, tag_id: TagId) -> Result<Vec<NameRecord>> {
        let tables = self.tables()?;
        Ok(names_of(&tables.tag_names, tag_id))
    }

    async fn search_tag_names(&mut self, query: &str) -> Result<Vec<TagId>> {
        let tables = self.tables()?;
        let mut rows: Vec<&NameRow> = tables
            .tag_names
            .iter()
            .filter(|row| row.name.contains(query))
            .collect();
        rows.sort_by_key(|row| row.id);
        Ok(rows.into_iter().map(|row| row.owner_id).collect())
    }

    async fn link(&mut self, company_id: CompanyId, tag_id: TagId) -> Result<bool> {
        let tables = self.tables()?;
        if tables
            .company_tags
            .iter()
            .any(|row| row.company_id == company_id && row.tag_id == tag_id)
        {
            return Ok(false);
        }
        let tables = self.tables_for_write()?;
        let id = tables.allocate_id();
        tables.company_tags.push(LinkRow {
            id,
            company_id,
            tag_id,
        });
        Ok(true)
    }

    async fn unlink(&mut self, company_id: CompanyId, tag_id: TagId) -> Result<bool> {
        let tables = self.tables()?;
        let Some(position) = tables
            .company_tags
            .iter()
            .position(|row| row.company_id == company_id && row.tag_id == tag_id)
        else {
            return Ok(false);
        };
        let tables = self.tables_for_write()?;
        tables.company_tags.remove(position);
        Ok(true)
    }

    async fn linked_tags(&mut self, company_id: CompanyId) -> Result<Vec<TagId>> {
        let tables = self.tables()?;
        let mut rows: Vec<&LinkRow> = tables
            .company_tags
            .iter()
            .filter(|row| row.company_id == company_id)
            .collect();
        rows.sort_by_key(|row| row.id);
        Ok(rows.into_iter().map(|row| row.tag_id).collect())
    }

    async fn linked_companies(&mut self, tag_id: TagId) -> Result<Vec<CompanyId>> {
        let tables = self.tables()?;
        let mut rows: Vec<&LinkRow> = tables
            .company_tags
            .iter()
            .filter(|row| row.tag_id == tag_id)
            .collect();
        rows.sort_by_key(|row| row.id);
        Ok(rows.into_iter().map(|row| row.company_id).collect())
    }

    async fn commit(&mut self) -> Result<()> {
        if self.finished {
            return Err(Error::Internal("transaction already committed".to_string()));
        }
        self.finished = true;
        if !self.dirty {
            return Ok(());
        }

        let mut shared = lock(&self.shared);
        if shared.version != self.base_version {
            return Err(Error::ConstraintViolation(
                "concurrent write to the directory".to_string(),
            ));
        }
        let mut committed = std::mem::take(&mut self.working);
        committed.version = self.base_version + 1;
        *shared = committed;
        Ok(())
    }
}
