//! Store traits for the multilingual directory.
//!
//! The directory service never talks to a database directly. It opens a unit
//! of work with [`DirectoryStore::begin`], issues reads and writes through
//! [`DirectoryTx`], and calls [`DirectoryTx::commit`] once everything
//! succeeded. Dropping a transaction without committing discards its writes,
//! so an entity is never observable without its names.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{CompanyId, Language, NameRecord, TagId};

// =============================================================================
// STORE
// =============================================================================

/// Factory for units of work against the directory store.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    /// Open a new unit of work.
    async fn begin(&self) -> Result<Box<dyn DirectoryTx>>;
}

// =============================================================================
// UNIT OF WORK
// =============================================================================

/// One atomic unit of work.
///
/// Implementations report uniqueness failures as
/// [`Error::ConstraintViolation`](crate::Error::ConstraintViolation).
#[async_trait]
pub trait DirectoryTx: Send {
    // ── Companies ──────────────────────────────────────────────────────────

    /// Owner of the earliest-inserted company name row equal to `name`
    /// (exact, case-sensitive, any language).
    async fn find_company_by_name(&mut self, name: &str) -> Result<Option<CompanyId>>;

    /// Insert a company with no names yet.
    async fn insert_company(&mut self) -> Result<CompanyId>;

    /// Attach a name to a company. Fails if the company already has a name
    /// in `language`.
    async fn insert_company_name(
        &mut self,
        company_id: CompanyId,
        language: Language,
        name: &str,
    ) -> Result<()>;

    /// All names of a company in insertion order.
    async fn company_names(&mut self, company_id: CompanyId) -> Result<Vec<NameRecord>>;

    /// Company names in `language` containing `query`, case-insensitively,
    /// in insertion order.
    async fn search_company_names(&mut self, query: &str, language: Language)
        -> Result<Vec<String>>;

    // ── Tags ───────────────────────────────────────────────────────────────

    /// Owner of the earliest-inserted tag name row equal to `name`
    /// (exact, case-sensitive, any language).
    async fn find_tag_by_name(&mut self, name: &str) -> Result<Option<TagId>>;

    /// Insert a tag with no names yet.
    async fn insert_tag(&mut self) -> Result<TagId>;

    /// Attach a name to a tag. Fails if the tag already has a name in
    /// `language`.
    async fn insert_tag_name(&mut self, tag_id: TagId, language: Language, name: &str)
        -> Result<()>;

    /// All names of a tag in insertion order.
    async fn tag_names(&mut self, tag_id: TagId) -> Result<Vec<NameRecord>>;

    /// Owners of tag name rows containing `query` (case-sensitive, any
    /// language), one entry per matching row, in row insertion order.
    async fn search_tag_names(&mut self, query: &str) -> Result<Vec<TagId>>;

    // ── Associations ───────────────────────────────────────────────────────

    /// Link a company to a tag unless already linked. Returns `true` when a
    /// new link was written.
    async fn link(&mut self, company_id: CompanyId, tag_id: TagId) -> Result<bool>;

    /// Remove the link between a company and a tag. Returns `true` when a
    /// link was removed.
    async fn unlink(&mut self, company_id: CompanyId, tag_id: TagId) -> Result<bool>;

    /// Tags linked to a company, in link insertion order.
    async fn linked_tags(&mut self, company_id: CompanyId) -> Result<Vec<TagId>>;

    /// Companies linked to a tag, in link insertion order.
    async fn linked_companies(&mut self, tag_id: TagId) -> Result<Vec<CompanyId>>;

    // ── Lifecycle ──────────────────────────────────────────────────────────

    /// Make every write in this unit of work visible. Calling any method
    /// after `commit` is an error.
    async fn commit(&mut self) -> Result<()>;
}
