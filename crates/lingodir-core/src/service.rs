//! Directory service: entity lookup, get-or-create merge logic, company-tag
//! associations, and localized response assembly.
//!
//! ## Duplicate policy
//!
//! Companies and tags are deduplicated differently:
//!
//! - **Company creation** is strict. If any name in the payload already
//!   belongs to some company, in any language, the whole request is
//!   rejected with [`Error::Conflict`].
//! - **Tags** (and companies arriving through the bulk loader) are reused.
//!   The payload's names are looked up in [`Language::PRIORITY`] order and
//!   the first hit wins; only when nothing matches is a new entity created
//!   with every supplied name.
//!
//! ## Atomicity
//!
//! Every public operation runs in one unit of work. Store-level uniqueness
//! failures raised by a mutation are reported as [`Error::Conflict`], and a
//! failed operation never leaves an entity without its names.
//!
//! Events carry `subsystem = "directory"`, `component = "service"` and the
//! other field names listed in [`crate::logging`].

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::localize::{resolve, sorted_unique};
use crate::models::{
    CompanyId, CompanySummary, CompanyView, CreateCompanyRequest, ImportOutcome, Language,
    LocalizedNames, TagId, TagInput,
};
use crate::traits::{DirectoryStore, DirectoryTx};

/// Stateless service over a shared [`DirectoryStore`].
///
/// Construct once at start-up and clone the handle into request handlers.
#[derive(Clone)]
pub struct DirectoryService {
    store: Arc<dyn DirectoryStore>,
}

impl DirectoryService {
    /// Create a service over `store`.
    pub fn new(store: impl DirectoryStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Create a service over an already shared store.
    pub fn from_shared(store: Arc<dyn DirectoryStore>) -> Self {
        Self { store }
    }

    // =========================================================================
    // ENTITY LOOKUP
    // =========================================================================

    /// Find the company owning a name in any language.
    ///
    /// Matching is exact and case-sensitive. If the store holds the same name
    /// for more than one company, the owner of the earliest-inserted name row
    /// is returned.
    pub async fn find_company_by_name(&self, name: &str) -> Result<Option<CompanyId>> {
        let mut tx = self.store.begin().await?;
        tx.find_company_by_name(name).await
    }

    /// Find the tag owning a name in any language. Same matching rules as
    /// [`find_company_by_name`](Self::find_company_by_name).
    pub async fn find_tag_by_name(&self, name: &str) -> Result<Option<TagId>> {
        let mut tx = self.store.begin().await?;
        tx.find_tag_by_name(name).await
    }

    // =========================================================================
    // GET-OR-CREATE
    // =========================================================================

    /// Return the company matching any of `names`, or create one carrying all
    /// of them.
    pub async fn get_or_create_company(&self, names: &LocalizedNames) -> Result<CompanyId> {
        names.validate()?;
        let mut tx = self.store.begin().await?;
        let (id, _) = get_or_create_company(tx.as_mut(), names)
            .await
            .map_err(Error::into_conflict)?;
        tx.commit().await.map_err(Error::into_conflict)?;
        Ok(id)
    }

    /// Return the tag matching any of `names`, or create one carrying all of
    /// them.
    pub async fn get_or_create_tag(&self, names: &LocalizedNames) -> Result<TagId> {
        names.validate()?;
        let mut tx = self.store.begin().await?;
        let id = get_or_create_tag(tx.as_mut(), names)
            .await
            .map_err(Error::into_conflict)?;
        tx.commit().await.map_err(Error::into_conflict)?;
        Ok(id)
    }

    // =========================================================================
    // ASSOCIATIONS
    // =========================================================================

    /// Link a company to a tag. Linking twice is a no-op; returns whether a
    /// new link was written.
    pub async fn link(&self, company_id: CompanyId, tag_id: TagId) -> Result<bool> {
        let mut tx = self.store.begin().await?;
        let created = tx.link(company_id, tag_id).await.map_err(Error::into_conflict)?;
        tx.commit().await.map_err(Error::into_conflict)?;
        Ok(created)
    }

    /// Remove a company-tag link. Removing a missing link is a no-op;
    /// returns whether a link was removed. The tag itself is kept even when
    /// no company references it any more.
    pub async fn unlink(&self, company_id: CompanyId, tag_id: TagId) -> Result<bool> {
        let mut tx = self.store.begin().await?;
        let removed = tx.unlink(company_id, tag_id).await?;
        tx.commit().await.map_err(Error::into_conflict)?;
        Ok(removed)
    }

    /// Localized names of every tag linked to a company, sorted and free of
    /// duplicate strings.
    pub async fn tag_names_for(&self, company_id: CompanyId, lang: Language) -> Result<Vec<String>> {
        let mut tx = self.store.begin().await?;
        tag_names_for(tx.as_mut(), company_id, lang).await
    }

    /// Full localized view of a company.
    pub async fn company_view(&self, company_id: CompanyId, lang: Language) -> Result<CompanyView> {
        let mut tx = self.store.begin().await?;
        company_view(tx.as_mut(), company_id, lang).await
    }

    // =========================================================================
    // EXTERNAL OPERATIONS
    // =========================================================================

    /// Company names in `lang` containing `query`, ignoring case.
    pub async fn autocomplete(&self, query: &str, lang: Language) -> Result<Vec<CompanySummary>> {
        if query.is_empty() {
            return Err(Error::InvalidInput("Query must not be empty".to_string()));
        }
        let start = Instant::now();
        let mut tx = self.store.begin().await?;
        let names = tx.search_company_names(query, lang).await?;

        debug!(
            subsystem = "directory",
            component = "service",
            op = "autocomplete",
            lang = %lang,
            query = %query,
            result_count = names.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Autocomplete finished"
        );
        Ok(names
            .into_iter()
            .map(|company_name| CompanySummary { company_name })
            .collect())
    }

    /// Localized view of the company owning `company_name` (any language).
    pub async fn get(&self, company_name: &str, lang: Language) -> Result<CompanyView> {
        let mut tx = self.store.begin().await?;
        let company_id = require_company(tx.as_mut(), company_name).await?;
        company_view(tx.as_mut(), company_id, lang).await
    }

    /// Register a new company with its tags.
    ///
    /// Rejected with [`Error::Conflict`] if any of the company's names is
    /// already registered. Tags are reused when any of their names matches
    /// an existing tag.
    pub async fn create(&self, req: &CreateCompanyRequest, lang: Language) -> Result<CompanyView> {
        req.company_name.validate()?;
        validate_tags(&req.tags)?;

        let mut tx = self.store.begin().await?;

        for (name_lang, name) in req.company_name.iter() {
            if let Some(existing) = tx.find_company_by_name(name).await? {
                warn!(
                    subsystem = "directory",
                    component = "service",
                    op = "create",
                    company_id = existing,
                    lang = %name_lang,
                    "Company name already registered"
                );
                return Err(Error::Conflict(format!(
                    "Company '{}' already exists",
                    name
                )));
            }
        }

        let outcome = async {
            let company_id = insert_company(tx.as_mut(), &req.company_name).await?;
            let links_created = attach_tags(tx.as_mut(), company_id, &req.tags).await?;
            let view = company_view(tx.as_mut(), company_id, lang).await?;
            tx.commit().await?;
            Ok::<_, Error>((company_id, links_created, view))
        }
        .await
        .map_err(Error::into_conflict)?;

        let (company_id, links_created, view) = outcome;
        info!(
            subsystem = "directory",
            component = "service",
            op = "create",
            company_id,
            links_created,
            "Company created"
        );
        Ok(view)
    }

    /// Localized names of every company linked to a tag whose name, in any
    /// language, contains `query` (case-sensitive). Each company appears once.
    pub async fn search_by_tag(&self, query: &str, lang: Language) -> Result<Vec<CompanySummary>> {
        let start = Instant::now();
        let mut tx = self.store.begin().await?;
        let tag_ids = tx.search_tag_names(query).await?;

        let mut seen: HashSet<CompanyId> = HashSet::new();
        let mut results = Vec::new();
        for tag_id in tag_ids {
            for company_id in tx.linked_companies(tag_id).await? {
                if !seen.insert(company_id) {
                    continue;
                }
                let names = tx.company_names(company_id).await?;
                match resolve(&names, lang) {
                    Some(name) => results.push(CompanySummary {
                        company_name: name.to_string(),
                    }),
                    None => warn!(
                        subsystem = "directory",
                        component = "service",
                        op = "search_by_tag",
                        company_id,
                        "Skipping company without names"
                    ),
                }
            }
        }

        debug!(
            subsystem = "directory",
            component = "service",
            op = "search_by_tag",
            lang = %lang,
            query = %query,
            result_count = results.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Tag search finished"
        );
        Ok(results)
    }

    /// Attach tags to an existing company, reusing tags that already exist.
    pub async fn add_tags(
        &self,
        company_name: &str,
        tags: &[TagInput],
        lang: Language,
    ) -> Result<CompanyView> {
        validate_tags(tags)?;

        let mut tx = self.store.begin().await?;
        let company_id = require_company(tx.as_mut(), company_name).await?;

        let (links_created, view) = async {
            let links_created = attach_tags(tx.as_mut(), company_id, tags).await?;
            let view = company_view(tx.as_mut(), company_id, lang).await?;
            tx.commit().await?;
            Ok::<_, Error>((links_created, view))
        }
        .await
        .map_err(Error::into_conflict)?;

        info!(
            subsystem = "directory",
            component = "service",
            op = "add_tags",
            company_id,
            links_created,
            "Tags added to company"
        );
        Ok(view)
    }

    /// Detach a tag from a company. Both are looked up by name in any
    /// language; detaching a tag the company does not carry is a no-op.
    pub async fn delete_tag(
        &self,
        company_name: &str,
        tag_name: &str,
        lang: Language,
    ) -> Result<CompanyView> {
        let mut tx = self.store.begin().await?;
        let company_id = require_company(tx.as_mut(), company_name).await?;
        let tag_id = tx
            .find_tag_by_name(tag_name)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Tag '{}' not found", tag_name)))?;

        let removed = tx.unlink(company_id, tag_id).await?;
        let view = company_view(tx.as_mut(), company_id, lang).await?;
        tx.commit().await.map_err(Error::into_conflict)?;

        info!(
            subsystem = "directory",
            component = "service",
            op = "delete_tag",
            company_id,
            tag_id,
            removed,
            "Tag detached from company"
        );
        Ok(view)
    }

    /// Import one bulk-loader row: reuse or create the company, reuse or
    /// create each tag, and link them. Running the same row twice changes
    /// nothing the second time.
    pub async fn import_row(
        &self,
        company_name: &LocalizedNames,
        tags: &[TagInput],
    ) -> Result<ImportOutcome> {
        company_name.validate()?;
        validate_tags(tags)?;

        let mut tx = self.store.begin().await?;
        let outcome = async {
            let (company_id, company_created) =
                get_or_create_company(tx.as_mut(), company_name).await?;
            let links_created = attach_tags(tx.as_mut(), company_id, tags).await?;
            tx.commit().await?;
            Ok::<_, Error>(ImportOutcome {
                company_id,
                company_created,
                links_created,
            })
        }
        .await
        .map_err(Error::into_conflict)?;

        debug!(
            subsystem = "import",
            component = "service",
            op = "import_row",
            company_id = outcome.company_id,
            created = outcome.company_created,
            links_created = outcome.links_created,
            "Row imported"
        );
        Ok(outcome)
    }
}

// =============================================================================
// UNIT-OF-WORK HELPERS
// =============================================================================

fn validate_tags(tags: &[TagInput]) -> Result<()> {
    tags.iter().try_for_each(|tag| tag.tag_name.validate())
}

async fn require_company(tx: &mut dyn DirectoryTx, company_name: &str) -> Result<CompanyId> {
    tx.find_company_by_name(company_name)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Company '{}' not found", company_name)))
}

/// First company matching any name, trying languages in priority order.
async fn lookup_company(
    tx: &mut dyn DirectoryTx,
    names: &LocalizedNames,
) -> Result<Option<CompanyId>> {
    for (_, name) in names.iter() {
        if let Some(id) = tx.find_company_by_name(name).await? {
            return Ok(Some(id));
        }
    }
    Ok(None)
}

/// First tag matching any name, trying languages in priority order.
async fn lookup_tag(tx: &mut dyn DirectoryTx, names: &LocalizedNames) -> Result<Option<TagId>> {
    for (_, name) in names.iter() {
        if let Some(id) = tx.find_tag_by_name(name).await? {
            return Ok(Some(id));
        }
    }
    Ok(None)
}

async fn insert_company(tx: &mut dyn DirectoryTx, names: &LocalizedNames) -> Result<CompanyId> {
    let id = tx.insert_company().await?;
    for (lang, name) in names.iter() {
        tx.insert_company_name(id, lang, name).await?;
    }
    Ok(id)
}

async fn insert_tag(tx: &mut dyn DirectoryTx, names: &LocalizedNames) -> Result<TagId> {
    let id = tx.insert_tag().await?;
    for (lang, name) in names.iter() {
        tx.insert_tag_name(id, lang, name).await?;
    }
    Ok(id)
}

/// Returns the company id and whether it was created.
async fn get_or_create_company(
    tx: &mut dyn DirectoryTx,
    names: &LocalizedNames,
) -> Result<(CompanyId, bool)> {
    if let Some(id) = lookup_company(tx, names).await? {
        debug!(
            subsystem = "directory",
            component = "service",
            company_id = id,
            "Reusing existing company"
        );
        return Ok((id, false));
    }
    let id = insert_company(tx, names).await?;
    debug!(
        subsystem = "directory",
        component = "service",
        company_id = id,
        "Created company"
    );
    Ok((id, true))
}

async fn get_or_create_tag(tx: &mut dyn DirectoryTx, names: &LocalizedNames) -> Result<TagId> {
    if let Some(id) = lookup_tag(tx, names).await? {
        debug!(
            subsystem = "directory",
            component = "service",
            tag_id = id,
            "Reusing existing tag"
        );
        return Ok(id);
    }
    let id = insert_tag(tx, names).await?;
    debug!(
        subsystem = "directory",
        component = "service",
        tag_id = id,
        "Created tag"
    );
    Ok(id)
}

/// Resolve every tag through the reuse path and link it. Returns the number
/// of links that did not exist before.
async fn attach_tags(
    tx: &mut dyn DirectoryTx,
    company_id: CompanyId,
    tags: &[TagInput],
) -> Result<usize> {
    let mut links_created = 0;
    for tag in tags {
        let tag_id = get_or_create_tag(tx, &tag.tag_name).await?;
        if tx.link(company_id, tag_id).await? {
            links_created += 1;
        }
    }
    Ok(links_created)
}

async fn tag_names_for(
    tx: &mut dyn DirectoryTx,
    company_id: CompanyId,
    lang: Language,
) -> Result<Vec<String>> {
    let mut localized = Vec::new();
    for tag_id in tx.linked_tags(company_id).await? {
        let names = tx.tag_names(tag_id).await?;
        if let Some(name) = resolve(&names, lang) {
            localized.push(name.to_string());
        }
    }
    Ok(sorted_unique(localized))
}

async fn company_view(
    tx: &mut dyn DirectoryTx,
    company_id: CompanyId,
    lang: Language,
) -> Result<CompanyView> {
    let names = tx.company_names(company_id).await?;
    let company_name = resolve(&names, lang)
        .ok_or_else(|| Error::Internal(format!("Company {} has no names", company_id)))?
        .to_string();
    let tags = tag_names_for(tx, company_id, lang).await?;
    Ok(CompanyView { company_name, tags })
}
