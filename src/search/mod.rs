pub mod filter;
pub mod merge;
pub mod refine;

pub use filter::{TermJoin, build_relation_filter, build_term_filter, split_terms};
pub use merge::{attach_parent_titles, merge_by_id};
pub use refine::{Refinement, SortOrder, parse_price};

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::ai::{self, AiError, OpenAiClient};
use crate::config::AppConfig;
use crate::storage::{Equivalence, ListQuery, PocketBaseClient, Product, Record};

/// What the caller asked for
#[derive(Debug, Clone, PartialEq)]
pub enum SearchMode {
    /// Raw query text, matched directly against both collections
    Plain { query: String, join: TermJoin },
    /// Free-text description classified by the AI before matching products
    Assisted { description: String },
}

/// Result of one search request
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    pub terms: Vec<String>,
    /// Filter sent to the products collection, if any was sent
    pub filter: Option<String>,
    /// Parsed classifier output (assisted mode only)
    pub analysis: Option<Value>,
    pub records: Vec<Equivalence>,
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("{0}")]
    InvalidInput(String),
    #[error(transparent)]
    Ai(#[from] AiError),
}

/// Collection names, page sizes and match fields used by the pipeline
#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub products_collection: String,
    pub equivalences_collection: String,
    pub relation_field: String,
    pub product_page_size: u32,
    pub ai_product_page_size: u32,
    pub equivalence_page_size: u32,
    pub join_sort: String,
    pub product_fields: Vec<String>,
    pub equivalence_fields: Vec<String>,
    pub missing_parent_title: String,
}

impl SearchSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        let pb = &config.pocketbase;
        Self {
            products_collection: pb.products_collection.clone(),
            equivalences_collection: pb.equivalences_collection.clone(),
            relation_field: pb.relation_field.clone(),
            product_page_size: pb.product_page_size,
            ai_product_page_size: pb.ai_product_page_size,
            equivalence_page_size: pb.equivalence_page_size,
            join_sort: pb.join_sort.clone(),
            product_fields: config.search.product_fields.clone(),
            equivalence_fields: config.search.equivalence_fields.clone(),
            missing_parent_title: config.search.missing_parent_title.clone(),
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// Drives term extraction, filter building, fetching and merging for both search modes.
///
/// Sub-fetches soft-fail: a collection that errors contributes no records and the
/// request carries on with whatever the other paths returned.
#[derive(Debug, Clone)]
pub struct SearchService {
    catalog: Arc<PocketBaseClient>,
    assistant: Option<Arc<OpenAiClient>>,
    settings: SearchSettings,
}

impl SearchService {
    pub fn new(
        catalog: Arc<PocketBaseClient>,
        assistant: Option<Arc<OpenAiClient>>,
        settings: SearchSettings,
    ) -> Self {
        Self {
            catalog,
            assistant,
            settings,
        }
    }

    pub fn catalog(&self) -> &PocketBaseClient {
        &self.catalog
    }

    pub fn ai_enabled(&self) -> bool {
        self.assistant.is_some()
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    pub async fn run(&self, mode: SearchMode) -> Result<SearchOutcome, SearchError> {
        match mode {
            SearchMode::Plain { query, join } => self.plain(&query, join).await,
            SearchMode::Assisted { description } => self.assisted(&description).await,
        }
    }

    async fn plain(&self, query: &str, join: TermJoin) -> Result<SearchOutcome, SearchError> {
        let terms = split_terms(query);
        if terms.is_empty() {
            return Err(SearchError::InvalidInput("search text cannot be empty".into()));
        }

        let product_filter = build_term_filter(&terms, &self.settings.product_fields, join);
        let direct_filter = build_term_filter(&terms, &self.settings.equivalence_fields, join);

        // Direct lookups are independent; the join path waits on the product ids
        let (products, direct) = tokio::join!(
            self.products_matching(product_filter.as_deref(), self.settings.product_page_size),
            self.equivalences_where(direct_filter.as_deref()),
        );

        let product_ids = record_ids(&products);
        let joined = self.equivalences_for_products(&product_ids).await;

        info!(
            products = products.len(),
            direct = direct.len(),
            joined = joined.len(),
            "Plain search paths complete"
        );

        let mut records = merge_by_id(direct, joined);
        attach_parent_titles(&mut records, &self.settings.missing_parent_title);

        Ok(SearchOutcome {
            terms,
            filter: product_filter,
            analysis: None,
            records,
        })
    }

    async fn assisted(&self, description: &str) -> Result<SearchOutcome, SearchError> {
        let assistant = self.assistant.as_ref().ok_or(AiError::NotConfigured)?;

        let prompt = ai::build_prompt(description);
        let reply = assistant.complete_json(&prompt).await?;
        let analysis = ai::parse_analysis(&reply)?;

        let terms = ai::search_terms(&analysis);
        info!(terms = ?terms, "Search terms from AI analysis");

        let filter = build_term_filter(&terms, &self.settings.product_fields, TermJoin::Any);
        let products = match filter.as_deref() {
            Some(filter) => {
                self.products_matching(Some(filter), self.settings.ai_product_page_size)
                    .await
            }
            None => {
                info!("No search terms extracted from AI reply, skipping product search");
                Vec::new()
            }
        };

        let product_ids = record_ids(&products);
        let records = self.equivalences_for_products(&product_ids).await;

        info!(
            products = products.len(),
            equivalences = records.len(),
            "AI search complete"
        );

        Ok(SearchOutcome {
            terms,
            filter,
            analysis: Some(analysis),
            records,
        })
    }

    /// Equivalences whose parent is one of `product_ids`, parent titles attached
    pub async fn equivalences_for_products<S>(&self, product_ids: &[S]) -> Vec<Equivalence>
    where
        S: AsRef<str>,
    {
        let Some(filter) = build_relation_filter(&self.settings.relation_field, product_ids) else {
            return Vec::new();
        };

        let query = ListQuery::new(self.settings.equivalence_page_size)
            .filter(&filter)
            .expand(&self.settings.relation_field)
            .sort(&self.settings.join_sort);
        let mut records: Vec<Equivalence> = self
            .catalog
            .list_or_empty(&self.settings.equivalences_collection, &query)
            .await;
        attach_parent_titles(&mut records, &self.settings.missing_parent_title);
        records
    }

    /// Equivalences matching `terms` on their own fields, parent titles attached
    pub async fn equivalences_matching<S>(&self, terms: &[S], join: TermJoin) -> Vec<Equivalence>
    where
        S: AsRef<str>,
    {
        let filter = build_term_filter(terms, &self.settings.equivalence_fields, join);
        let mut records = self.equivalences_where(filter.as_deref()).await;
        attach_parent_titles(&mut records, &self.settings.missing_parent_title);
        records
    }

    async fn products_matching(&self, filter: Option<&str>, per_page: u32) -> Vec<Product> {
        let Some(filter) = filter else {
            return Vec::new();
        };
        let query = ListQuery::new(per_page).filter(filter);
        self.catalog
            .list_or_empty(&self.settings.products_collection, &query)
            .await
    }

    async fn equivalences_where(&self, filter: Option<&str>) -> Vec<Equivalence> {
        let Some(filter) = filter else {
            debug!("No equivalence filter, skipping direct equivalence search");
            return Vec::new();
        };
        let query = ListQuery::new(self.settings.equivalence_page_size)
            .filter(filter)
            .expand(&self.settings.relation_field);
        self.catalog
            .list_or_empty(&self.settings.equivalences_collection, &query)
            .await
    }
}

fn record_ids<T: Record>(records: &[T]) -> Vec<String> {
    records
        .iter()
        .filter_map(|record| record.record_id().map(str::to_string))
        .collect()
}
