//! Behaviour tests for the directory service over the in-memory store.
//!
//! Covers:
//! - Localized views with exact-match-then-first-name fallback
//! - Strict duplicate rejection on company creation
//! - Tag reuse across companies
//! - Idempotent link/unlink
//! - Sorted, string-deduplicated tag lists
//! - Not-found handling for get, add_tags, and delete_tag
//! - Concurrent writers: the losing creation is a conflict with no rows left

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use lingodir_core::{
    CompanyId, CompanySummary, CompanyView, CreateCompanyRequest, DirectoryService,
    DirectoryStore, DirectoryTx, Error, Language, LocalizedNames, MemoryStore, NameRecord,
    Result, StoreCounts, TagId, TagInput,
};

// ============================================================================
// HELPERS
// ============================================================================

fn setup() -> (MemoryStore, DirectoryService) {
    let store = MemoryStore::new();
    let service = DirectoryService::new(store.clone());
    (store, service)
}

fn names(pairs: &[(Language, &str)]) -> LocalizedNames {
    pairs
        .iter()
        .fold(LocalizedNames::new(), |acc, (lang, name)| acc.with(*lang, *name))
}

fn tag(pairs: &[(Language, &str)]) -> TagInput {
    TagInput::new(names(pairs))
}

fn company(pairs: &[(Language, &str)], tags: Vec<TagInput>) -> CreateCompanyRequest {
    CreateCompanyRequest {
        company_name: names(pairs),
        tags,
    }
}

fn view(company_name: &str, tags: &[&str]) -> CompanyView {
    CompanyView {
        company_name: company_name.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

// ============================================================================
// CREATE / GET
// ============================================================================

#[tokio::test]
async fn test_create_then_get_round_trip() {
    let (_, service) = setup();

    let created = service
        .create(
            &company(&[(Language::Ko, "A")], vec![tag(&[(Language::Ko, "X")])]),
            Language::Ko,
        )
        .await
        .expect("create should succeed");
    assert_eq!(created, view("A", &["X"]));

    let fetched = service.get("A", Language::En).await.expect("get should succeed");
    assert_eq!(fetched, view("A", &["X"]));
}

#[tokio::test]
async fn test_end_to_end_fallback_to_first_available_language() {
    let (_, service) = setup();

    service
        .create(
            &company(&[(Language::En, "Acme")], vec![tag(&[(Language::En, "Retail")])]),
            Language::En,
        )
        .await
        .unwrap();

    assert_eq!(
        service.get("Acme", Language::En).await.unwrap(),
        view("Acme", &["Retail"])
    );
    assert_eq!(
        service.get("Acme", Language::Ja).await.unwrap(),
        view("Acme", &["Retail"])
    );
}

#[tokio::test]
async fn test_get_by_any_language_name_returns_requested_language() {
    let (_, service) = setup();

    service
        .create(
            &company(
                &[(Language::Ko, "삼성"), (Language::En, "Samsung"), (Language::Ja, "サムスン")],
                vec![tag(&[(Language::Ko, "전자"), (Language::En, "Electronics")])],
            ),
            Language::Ko,
        )
        .await
        .unwrap();

    assert_eq!(
        service.get("サムスン", Language::En).await.unwrap(),
        view("Samsung", &["Electronics"])
    );
    // Tag has no Japanese name, so it falls back to its first name (Korean).
    assert_eq!(
        service.get("Samsung", Language::Ja).await.unwrap(),
        view("サムスン", &["전자"])
    );
}

#[tokio::test]
async fn test_get_unknown_company_is_not_found() {
    let (_, service) = setup();
    let err = service.get("Nobody", Language::Ko).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_get_is_case_sensitive() {
    let (_, service) = setup();
    service
        .create(&company(&[(Language::En, "Acme")], vec![]), Language::En)
        .await
        .unwrap();
    assert!(matches!(
        service.get("ACME", Language::En).await,
        Err(Error::NotFound(_))
    ));
}

// ============================================================================
// DUPLICATE POLICY
// ============================================================================

#[tokio::test]
async fn test_create_rejects_any_existing_name_variant() {
    let (store, service) = setup();

    service
        .create(
            &company(&[(Language::Ko, "삼성"), (Language::En, "Samsung")], vec![]),
            Language::Ko,
        )
        .await
        .unwrap();
    let before = store.counts();

    let err = service
        .create(&company(&[(Language::En, "Samsung")], vec![]), Language::Ko)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)), "got {:?}", err);
    assert_eq!(store.counts(), before);
}

#[tokio::test]
async fn test_create_rejects_name_registered_in_other_language() {
    let (_, service) = setup();

    service
        .create(&company(&[(Language::Ja, "Toyota")], vec![]), Language::Ko)
        .await
        .unwrap();

    // Same string, different language slot: still a duplicate.
    let err = service
        .create(
            &company(&[(Language::Ko, "도요타"), (Language::En, "Toyota")], vec![]),
            Language::Ko,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
    assert!(matches!(
        service.get("도요타", Language::Ko).await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn test_rejected_create_leaves_no_tags_behind() {
    let (store, service) = setup();

    service
        .create(&company(&[(Language::En, "Acme")], vec![]), Language::En)
        .await
        .unwrap();

    service
        .create(
            &company(&[(Language::En, "Acme")], vec![tag(&[(Language::En, "Fresh")])]),
            Language::En,
        )
        .await
        .unwrap_err();

    assert_eq!(store.counts().tags, 0);
    assert_eq!(service.find_tag_by_name("Fresh").await.unwrap(), None);
}

#[tokio::test]
async fn test_tag_reuse_across_companies() {
    let (store, service) = setup();

    service
        .create(
            &company(&[(Language::Ko, "네이버")], vec![tag(&[(Language::Ko, "IT")])]),
            Language::Ko,
        )
        .await
        .unwrap();
    service
        .create(
            &company(&[(Language::Ko, "카카오")], vec![tag(&[(Language::Ko, "IT")])]),
            Language::Ko,
        )
        .await
        .unwrap();

    let counts = store.counts();
    assert_eq!(counts.tags, 1);
    assert_eq!(counts.company_tags, 2);
}

#[tokio::test]
async fn test_duplicate_tag_in_payload_links_once() {
    let (store, service) = setup();

    let created = service
        .create(
            &company(
                &[(Language::En, "Acme")],
                vec![
                    tag(&[(Language::En, "Retail")]),
                    tag(&[(Language::Ko, "소매"), (Language::En, "Retail")]),
                ],
            ),
            Language::En,
        )
        .await
        .unwrap();

    assert_eq!(created.tags, vec!["Retail".to_string()]);
    assert_eq!(store.counts().tags, 1);
    assert_eq!(store.counts().company_tags, 1);
}

#[tokio::test]
async fn test_create_rejects_empty_payloads() {
    let (store, service) = setup();

    let err = service
        .create(&company(&[], vec![]), Language::Ko)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));

    let err = service
        .create(&company(&[(Language::En, "Acme")], vec![tag(&[])]), Language::Ko)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));

    assert_eq!(store.counts(), StoreCounts::default());
}

// ============================================================================
// CONCURRENT WRITES
// ============================================================================

/// Store whose units of work let a competing transaction commit first.
///
/// The competitor is opened before the service begins, so both start from
/// the same committed state; it is committed right before the first write
/// transaction opened through this store commits.
struct CompetingStore {
    inner: MemoryStore,
    competitor: Arc<Mutex<Option<Box<dyn DirectoryTx>>>>,
}

impl CompetingStore {
    fn new(inner: MemoryStore, competitor: Box<dyn DirectoryTx>) -> Self {
        Self {
            inner,
            competitor: Arc::new(Mutex::new(Some(competitor))),
        }
    }
}

#[async_trait]
impl DirectoryStore for CompetingStore {
    async fn begin(&self) -> Result<Box<dyn DirectoryTx>> {
        Ok(Box::new(CompetingTx {
            inner: self.inner.begin().await?,
            competitor: Arc::clone(&self.competitor),
        }))
    }
}

struct CompetingTx {
    inner: Box<dyn DirectoryTx>,
    competitor: Arc<Mutex<Option<Box<dyn DirectoryTx>>>>,
}

#[async_trait]
impl DirectoryTx for CompetingTx {
    async fn find_company_by_name(&mut self, name: &str) -> Result<Option<CompanyId>> {
        self.inner.find_company_by_name(name).await
    }

    async fn insert_company(&mut self) -> Result<CompanyId> {
        self.inner.insert_company().await
    }

    async fn insert_company_name(
        &mut self,
        company_id: CompanyId,
        language: Language,
        name: &str,
    ) -> Result<()> {
        self.inner.insert_company_name(company_id, language, name).await
    }

    async fn company_names(&mut self, company_id: CompanyId) -> Result<Vec<NameRecord>> {
        self.inner.company_names(company_id).await
    }

    async fn search_company_names(
        &mut self,
        query: &str,
        language: Language,
    ) -> Result<Vec<String>> {
        self.inner.search_company_names(query, language).await
    }

    async fn find_tag_by_name(&mut self, name: &str) -> Result<Option<TagId>> {
        self.inner.find_tag_by_name(name).await
    }

    async fn insert_tag(&mut self) -> Result<TagId> {
        self.inner.insert_tag().await
    }

    async fn insert_tag_name(
        &mut self,
        tag_id: TagId,
        language: Language,
        name: &str,
    ) -> Result<()> {
        self.inner.insert_tag_name(tag_id, language, name).await
    }

    async fn tag_names(&mut self, tag_id: TagId) -> Result<Vec<NameRecord>> {
        self.inner.tag_names(tag_id).await
    }

    async fn search_tag_names(&mut self, query: &str) -> Result<Vec<TagId>> {
        self.inner.search_tag_names(query).await
    }

    async fn link(&mut self, company_id: CompanyId, tag_id: TagId) -> Result<bool> {
        self.inner.link(company_id, tag_id).await
    }

    async fn unlink(&mut self, company_id: CompanyId, tag_id: TagId) -> Result<bool> {
        self.inner.unlink(company_id, tag_id).await
    }

    async fn linked_tags(&mut self, company_id: CompanyId) -> Result<Vec<TagId>> {
        self.inner.linked_tags(company_id).await
    }

    async fn linked_companies(&mut self, tag_id: TagId) -> Result<Vec<CompanyId>> {
        self.inner.linked_companies(tag_id).await
    }

    async fn commit(&mut self) -> Result<()> {
        let competitor = self.competitor.lock().unwrap().take();
        if let Some(mut competitor) = competitor {
            competitor.commit().await.expect("competitor commit");
        }
        self.inner.commit().await
    }
}

/// Open a transaction that registers `name` as a new English company
/// without committing it.
async fn pending_company(store: &MemoryStore, name: &str) -> Box<dyn DirectoryTx> {
    let mut tx = store.begin().await.unwrap();
    let id = tx.insert_company().await.unwrap();
    tx.insert_company_name(id, Language::En, name).await.unwrap();
    tx
}

#[tokio::test]
async fn test_create_losing_race_is_conflict_without_partial_rows() {
    let store = MemoryStore::new();
    let competitor = pending_company(&store, "Acme").await;
    let service = DirectoryService::new(CompetingStore::new(store.clone(), competitor));

    let result = service
        .create(
            &company(
                &[(Language::En, "Acme"), (Language::Ko, "애크미")],
                vec![tag(&[(Language::En, "b2b")])],
            ),
            Language::En,
        )
        .await;

    assert!(
        matches!(result, Err(Error::Conflict(_))),
        "expected Conflict, got {:?}",
        result
    );
    // Only the competitor's company survives: no Korean name, no tag, no link.
    assert_eq!(
        store.counts(),
        StoreCounts {
            companies: 1,
            company_names: 1,
            ..StoreCounts::default()
        }
    );
    let plain = DirectoryService::new(store.clone());
    assert_eq!(plain.get("Acme", Language::Ko).await.unwrap(), view("Acme", &[]));
    assert!(matches!(
        plain.get("애크미", Language::Ko).await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn test_create_winning_race_makes_competitor_commit_fail() {
    let (store, service) = setup();
    let mut competitor = pending_company(&store, "Acme").await;

    let created = service
        .create(
            &company(&[(Language::En, "Acme")], vec![tag(&[(Language::En, "b2b")])]),
            Language::En,
        )
        .await
        .expect("create should win the race");
    assert_eq!(created, view("Acme", &["b2b"]));
    let committed = store.counts();

    let result = competitor.commit().await;
    assert!(
        matches!(result, Err(Error::ConstraintViolation(_))),
        "expected ConstraintViolation, got {:?}",
        result
    );
    assert!(matches!(
        result.map_err(Error::into_conflict),
        Err(Error::Conflict(_))
    ));
    assert_eq!(store.counts(), committed);
    assert_eq!(
        committed,
        StoreCounts {
            companies: 1,
            company_names: 1,
            tags: 1,
            tag_names: 1,
            company_tags: 1,
        }
    );
}

// ============================================================================
// GET-OR-CREATE
// ============================================================================

#[tokio::test]
async fn test_get_or_create_company_reuses_on_any_variant() {
    let (store, service) = setup();

    let first = service
        .get_or_create_company(&names(&[(Language::Ko, "현대"), (Language::En, "Hyundai")]))
        .await
        .unwrap();
    let second = service
        .get_or_create_company(&names(&[(Language::En, "Hyundai"), (Language::Ja, "ヒュンダイ")]))
        .await
        .unwrap();

    assert_eq!(first, second);
    // Reuse does not add the new Japanese name.
    assert_eq!(store.counts().company_names, 2);
}

#[tokio::test]
async fn test_get_or_create_picks_primary_language_match_first() {
    let (_, service) = setup();

    let korean = service
        .get_or_create_tag(&names(&[(Language::Ko, "금융")]))
        .await
        .unwrap();
    let english = service
        .get_or_create_tag(&names(&[(Language::En, "Finance")]))
        .await
        .unwrap();
    assert_ne!(korean, english);

    // Both variants match different tags; Korean is tried first.
    let resolved = service
        .get_or_create_tag(&names(&[(Language::En, "Finance"), (Language::Ko, "금융")]))
        .await
        .unwrap();
    assert_eq!(resolved, korean);
}

#[tokio::test]
async fn test_get_or_create_writes_every_supplied_name() {
    let (store, service) = setup();

    let id = service
        .get_or_create_tag(&names(&[
            (Language::Ko, "반도체"),
            (Language::En, "Semiconductor"),
            (Language::Ja, "半導体"),
            (Language::Tw, "半導體"),
        ]))
        .await
        .unwrap();

    assert_eq!(store.counts().tag_names, 4);
    for name in ["반도체", "Semiconductor", "半導体", "半導體"] {
        assert_eq!(service.find_tag_by_name(name).await.unwrap(), Some(id));
    }
}

// ============================================================================
// ASSOCIATIONS
// ============================================================================

#[tokio::test]
async fn test_link_and_unlink_are_idempotent() {
    let (store, service) = setup();

    let company_id = service
        .get_or_create_company(&names(&[(Language::En, "Acme")]))
        .await
        .unwrap();
    let tag_id = service
        .get_or_create_tag(&names(&[(Language::En, "Retail")]))
        .await
        .unwrap();

    assert!(service.link(company_id, tag_id).await.unwrap());
    assert!(!service.link(company_id, tag_id).await.unwrap());
    assert_eq!(store.counts().company_tags, 1);

    assert!(service.unlink(company_id, tag_id).await.unwrap());
    assert!(!service.unlink(company_id, tag_id).await.unwrap());
    assert_eq!(store.counts().company_tags, 0);

    // The tag outlives its last link.
    assert_eq!(store.counts().tags, 1);
}

#[tokio::test]
async fn test_tag_names_collapse_identical_localized_strings() {
    let (store, service) = setup();

    let company_id = service
        .get_or_create_company(&names(&[(Language::En, "Acme")]))
        .await
        .unwrap();

    // Get-or-create never produces two tags sharing a name, so write the
    // duplicates straight through the store.
    let mut tx = store.begin().await.unwrap();
    let banking = tx.insert_tag().await.unwrap();
    tx.insert_tag_name(banking, Language::En, "Finance").await.unwrap();
    let investing = tx.insert_tag().await.unwrap();
    tx.insert_tag_name(investing, Language::Ja, "Finance").await.unwrap();
    tx.commit().await.unwrap();

    service.link(company_id, banking).await.unwrap();
    service.link(company_id, investing).await.unwrap();
    assert_eq!(store.counts().company_tags, 2);

    assert_eq!(
        service.tag_names_for(company_id, Language::En).await.unwrap(),
        vec!["Finance".to_string()]
    );
    // With duplicates present, lookup returns the owner of the earliest row.
    assert_eq!(
        service.find_tag_by_name("Finance").await.unwrap(),
        Some(banking)
    );
}

#[tokio::test]
async fn test_tags_without_requested_language_fall_back_individually() {
    let (_, service) = setup();

    let company_id = service
        .get_or_create_company(&names(&[(Language::En, "Acme")]))
        .await
        .unwrap();
    let first = service
        .get_or_create_tag(&names(&[(Language::Ko, "금융")]))
        .await
        .unwrap();
    let second = service
        .get_or_create_tag(&names(&[(Language::Ja, "金融")]))
        .await
        .unwrap();
    assert_ne!(first, second);

    // Neither tag has an English name; both fall back to different strings.
    service.link(company_id, first).await.unwrap();
    service.link(company_id, second).await.unwrap();
    assert_eq!(
        service.tag_names_for(company_id, Language::En).await.unwrap(),
        vec!["금융".to_string(), "金融".to_string()]
    );
    let view = service.company_view(company_id, Language::En).await.unwrap();
    assert_eq!(view.tags.len(), 2);
}

#[tokio::test]
async fn test_tags_are_sorted_by_localized_value() {
    let (_, service) = setup();

    let view = service
        .create(
            &company(
                &[(Language::En, "Acme")],
                vec![
                    tag(&[(Language::En, "Zinc")]),
                    tag(&[(Language::En, "Aluminium")]),
                    tag(&[(Language::En, "Mining")]),
                ],
            ),
            Language::En,
        )
        .await
        .unwrap();
    assert_eq!(view.tags, vec!["Aluminium", "Mining", "Zinc"]);
}

// ============================================================================
// ADD / DELETE TAGS
// ============================================================================

#[tokio::test]
async fn test_add_tags_returns_full_state() {
    let (store, service) = setup();

    service
        .create(
            &company(&[(Language::En, "Acme")], vec![tag(&[(Language::En, "Retail")])]),
            Language::En,
        )
        .await
        .unwrap();

    let updated = service
        .add_tags(
            "Acme",
            &[
                tag(&[(Language::En, "Retail")]),
                tag(&[(Language::En, "Logistics")]),
            ],
            Language::En,
        )
        .await
        .unwrap();

    assert_eq!(updated, view("Acme", &["Logistics", "Retail"]));
    assert_eq!(store.counts().company_tags, 2);
    assert_eq!(store.counts().tags, 2);
}

#[tokio::test]
async fn test_add_tags_to_unknown_company_is_not_found() {
    let (store, service) = setup();
    let err = service
        .add_tags("Ghost", &[tag(&[(Language::En, "Retail")])], Language::En)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(store.counts(), StoreCounts::default());
}

#[tokio::test]
async fn test_delete_tag_by_any_language_name() {
    let (store, service) = setup();

    service
        .create(
            &company(
                &[(Language::En, "Acme")],
                vec![
                    tag(&[(Language::Ko, "소매"), (Language::En, "Retail")]),
                    tag(&[(Language::En, "Logistics")]),
                ],
            ),
            Language::En,
        )
        .await
        .unwrap();

    let updated = service
        .delete_tag("Acme", "소매", Language::En)
        .await
        .unwrap();
    assert_eq!(updated, view("Acme", &["Logistics"]));
    assert_eq!(store.counts().company_tags, 1);
    assert_eq!(store.counts().tags, 2);
}

#[tokio::test]
async fn test_delete_unlinked_tag_is_a_no_op() {
    let (store, service) = setup();

    service
        .create(&company(&[(Language::En, "Acme")], vec![]), Language::En)
        .await
        .unwrap();
    service
        .get_or_create_tag(&names(&[(Language::En, "Retail")]))
        .await
        .unwrap();

    let before = store.counts();
    let unchanged = service.delete_tag("Acme", "Retail", Language::En).await.unwrap();
    assert_eq!(unchanged, view("Acme", &[]));
    assert_eq!(store.counts(), before);
}

#[tokio::test]
async fn test_delete_tag_unknown_company_or_tag_is_not_found() {
    let (store, service) = setup();

    let err = service
        .delete_tag("Unknown Co", "X", Language::Ko)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));

    service
        .create(
            &company(&[(Language::En, "Acme")], vec![tag(&[(Language::En, "Retail")])]),
            Language::En,
        )
        .await
        .unwrap();
    let before = store.counts();

    let err = service
        .delete_tag("Acme", "Unknown Tag", Language::Ko)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(store.counts(), before);
}

// ============================================================================
// SEARCH
// ============================================================================

#[tokio::test]
async fn test_autocomplete_is_language_scoped_and_case_insensitive() {
    let (_, service) = setup();

    service
        .create(
            &company(&[(Language::Ko, "삼성전자"), (Language::En, "Samsung Electronics")], vec![]),
            Language::Ko,
        )
        .await
        .unwrap();
    service
        .create(&company(&[(Language::En, "Samsonite")], vec![]), Language::Ko)
        .await
        .unwrap();

    let hits = service.autocomplete("SAMS", Language::En).await.unwrap();
    assert_eq!(
        hits,
        vec![
            CompanySummary {
                company_name: "Samsung Electronics".to_string()
            },
            CompanySummary {
                company_name: "Samsonite".to_string()
            },
        ]
    );
    assert!(service.autocomplete("SAMS", Language::Ko).await.unwrap().is_empty());
    assert_eq!(service.autocomplete("삼성", Language::Ko).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_autocomplete_rejects_empty_query() {
    let (_, service) = setup();
    assert!(matches!(
        service.autocomplete("", Language::Ko).await,
        Err(Error::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_search_by_tag_dedupes_companies_and_localizes() {
    let (_, service) = setup();

    service
        .create(
            &company(
                &[(Language::Ko, "네이버"), (Language::En, "Naver")],
                vec![
                    tag(&[(Language::Ko, "인터넷 포털"), (Language::En, "Internet Portal")]),
                    tag(&[(Language::Ko, "인터넷 광고"), (Language::En, "Internet Ads")]),
                ],
            ),
            Language::Ko,
        )
        .await
        .unwrap();
    service
        .create(
            &company(
                &[(Language::Ko, "다음")],
                vec![tag(&[(Language::Ko, "인터넷 포털")])],
            ),
            Language::Ko,
        )
        .await
        .unwrap();

    let hits = service.search_by_tag("인터넷", Language::En).await.unwrap();
    let names: Vec<&str> = hits.iter().map(|h| h.company_name.as_str()).collect();
    assert_eq!(names, vec!["Naver", "다음"]);
}

#[tokio::test]
async fn test_search_by_tag_is_case_sensitive() {
    let (_, service) = setup();

    service
        .create(
            &company(&[(Language::En, "Acme")], vec![tag(&[(Language::En, "Retail")])]),
            Language::En,
        )
        .await
        .unwrap();

    assert!(service
        .search_by_tag("retail", Language::En)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(
        service.search_by_tag("Ret", Language::En).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn test_search_by_tag_skips_orphan_tags() {
    let (_, service) = setup();

    service
        .get_or_create_tag(&names(&[(Language::En, "Orphan")]))
        .await
        .unwrap();
    assert!(service
        .search_by_tag("Orphan", Language::En)
        .await
        .unwrap()
        .is_empty());
}

// ============================================================================
// BULK IMPORT
// ============================================================================

#[tokio::test]
async fn test_import_row_is_idempotent() {
    let (store, service) = setup();

    let company_name = names(&[(Language::Ko, "원티드랩"), (Language::En, "Wantedlab")]);
    let tags = vec![
        tag(&[(Language::Ko, "HR"), (Language::En, "HR")]),
        tag(&[(Language::Ko, "채용"), (Language::En, "Recruiting")]),
    ];

    let first = service.import_row(&company_name, &tags).await.unwrap();
    assert!(first.company_created);
    assert_eq!(first.links_created, 2);
    let after_first = store.counts();

    let second = service.import_row(&company_name, &tags).await.unwrap();
    assert_eq!(second.company_id, first.company_id);
    assert!(!second.company_created);
    assert_eq!(second.links_created, 0);
    assert_eq!(store.counts(), after_first);
}

#[tokio::test]
async fn test_import_row_reuses_company_created_through_api() {
    let (_, service) = setup();

    service
        .create(&company(&[(Language::Ko, "쿠팡")], vec![]), Language::Ko)
        .await
        .unwrap();

    let outcome = service
        .import_row(
            &names(&[(Language::Ko, "쿠팡"), (Language::En, "Coupang")]),
            &[tag(&[(Language::Ko, "이커머스")])],
        )
        .await
        .unwrap();
    assert!(!outcome.company_created);
    assert_eq!(
        service.get("쿠팡", Language::Ko).await.unwrap(),
        view("쿠팡", &["이커머스"])
    );
}
