pub mod categories;
pub mod detect_references;
pub mod get_topic;
pub mod kb_stats;
pub mod list_topics;
pub mod related_topics;
pub mod search_topics;
pub mod set_topic_active;
pub mod store_relation;
pub mod topic_history;
pub mod write_topic;

use categories::{CreateCategoryParams, ListCategoriesParams};
use detect_references::DetectReferencesParams;
use get_topic::GetTopicParams;
use kb_stats::KbStatsParams;
use list_topics::ListTopicsParams;
use related_topics::RelatedTopicsParams;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::{tool, tool_handler, tool_router, ServerHandler};
use rusqlite::Connection;
use search_topics::SearchTopicsParams;
use serde::Serialize;
use set_topic_active::SetTopicActiveParams;
use std::sync::{Arc, Mutex};
use store_relation::StoreRelationParams;
use topic_history::{RestoreVersionParams, TopicHistoryParams};
use write_topic::WriteTopicParams;

use crate::config::ScriptoriumConfig;
use crate::knowledge::name_index::NameIndex;
use crate::knowledge::references::ReferenceDetector;
use crate::knowledge::relations::Direction;
use crate::knowledge::topics::{TopicFilter, TopicWrite};
use crate::knowledge::types::ContentType;
use crate::knowledge::{history, relations, stats, topics};

/// The Scriptorium MCP tool handler. Holds shared state (db connection, config,
/// reference detector) and exposes all MCP tools via the `#[tool_router]` macro.
#[derive(Clone)]
pub struct KnowledgeTools {
    tool_router: ToolRouter<Self>,
    db: Arc<Mutex<Connection>>,
    config: Arc<ScriptoriumConfig>,
    detector: ReferenceDetector,
}

impl KnowledgeTools {
    /// Run a storage call on the blocking pool with the connection locked.
    async fn with_db<T, F>(&self, op: &'static str, f: F) -> Result<T, String>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> anyhow::Result<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let mut conn = db
                .lock()
                .map_err(|e| anyhow::anyhow!("db lock poisoned: {e}"))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| format!("db task failed: {e}"))?
        .map_err(|e| {
            tracing::warn!(op, error = %e, "tool call failed");
            format!("{op} failed: {e}")
        })
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("serialization failed: {e}"))
}

#[tool_router]
impl KnowledgeTools {
    pub fn new(db: Arc<Mutex<Connection>>, config: Arc<ScriptoriumConfig>) -> Self {
        let detector = ReferenceDetector::new(config.references.fuzzy_max_name_len);
        Self {
            tool_router: Self::tool_router(),
            db,
            config,
            detector,
        }
    }

    /// Create or update a topic.
    #[tool(description = "Create a topic or replace its content. The previous content is kept in history. Mentions of other topic names in the content are linked automatically (markdown link 1.0, exact word 0.9, spaced-out 0.7).")]
    async fn write_topic(
        &self,
        Parameters(params): Parameters<WriteTopicParams>,
    ) -> Result<String, String> {
        let content_type = match params.content_type.as_deref() {
            Some(ct) => ct.parse::<ContentType>().map_err(|e| e.to_string())?,
            None => ContentType::default(),
        };
        let detect = params
            .detect_references
            .unwrap_or(self.config.references.detect_by_default);

        tracing::info!(
            name = %params.name,
            category = ?params.category,
            content_len = params.content.len(),
            content_type = %content_type,
            detect,
            "write_topic called"
        );

        let detector = self.detector;
        let result = self
            .with_db("write_topic", move |conn| {
                topics::write_topic(
                    conn,
                    &TopicWrite {
                        name: &params.name,
                        category: params.category.as_deref(),
                        content: &params.content,
                        content_type,
                        detect_references: detect,
                    },
                    &detector,
                )
            })
            .await?;

        to_json(&result)
    }

    /// Fetch a single topic.
    #[tool(description = "Get a topic by id, name, or slug, with its full content. Optionally include related topics.")]
    async fn get_topic(
        &self,
        Parameters(params): Parameters<GetTopicParams>,
    ) -> Result<String, String> {
        tracing::info!(topic = %params.topic, "get_topic called");
        let include_related = params.include_related.unwrap_or(false);

        let response = self
            .with_db("get_topic", move |conn| {
                let topic = topics::find_topic(conn, &params.topic)?;
                let category = match topic.category_id {
                    Some(id) => crate::knowledge::categories::get_category(conn, id)?
                        .map(|c| c.name),
                    None => None,
                };
                let related = if include_related {
                    Some(relations::related_topics(
                        conn,
                        topic.id,
                        None,
                        Direction::Both,
                        0.0,
                    )?)
                } else {
                    None
                };
                Ok(serde_json::json!({
                    "topic": topic,
                    "category": category,
                    "related": related,
                }))
            })
            .await?;

        Ok(response.to_string())
    }

    /// List topics.
    #[tool(description = "List topics alphabetically, optionally filtered by category. Inactive topics are hidden unless include_inactive is true.")]
    async fn list_topics(
        &self,
        Parameters(params): Parameters<ListTopicsParams>,
    ) -> Result<String, String> {
        let filter = TopicFilter {
            category: params.category,
            include_inactive: params.include_inactive.unwrap_or(false),
            limit: self.config.listing.clamp(params.limit),
            offset: params.offset.unwrap_or(0),
        };
        tracing::info!(category = ?filter.category, limit = filter.limit, "list_topics called");

        let listed = self
            .with_db("list_topics", move |conn| topics::list_topics(conn, &filter))
            .await?;

        to_json(&serde_json::json!({ "topics": listed, "count": listed.len() }))
    }

    /// Substring search.
    #[tool(description = "Find topics whose name or content contains the query (case-insensitive). Most recently updated first; results are not ranked.")]
    async fn search_topics(
        &self,
        Parameters(params): Parameters<SearchTopicsParams>,
    ) -> Result<String, String> {
        tracing::info!(query = %params.query, "search_topics called");
        let limit = self.config.listing.clamp(params.limit);
        let include_inactive = params.include_inactive.unwrap_or(false);

        let results = self
            .with_db("search_topics", move |conn| {
                topics::search_topics(conn, &params.query, include_inactive, limit)
            })
            .await?;

        to_json(&serde_json::json!({ "results": results, "count": results.len() }))
    }

    /// Activate or deactivate a topic.
    #[tool(description = "Mark a topic active or inactive. Inactive topics are hidden from listings but stay linkable.")]
    async fn set_topic_active(
        &self,
        Parameters(params): Parameters<SetTopicActiveParams>,
    ) -> Result<String, String> {
        tracing::info!(topic = %params.topic, active = params.active, "set_topic_active called");

        let topic = self
            .with_db("set_topic_active", move |conn| {
                let topic = topics::find_topic(conn, &params.topic)?;
                topics::set_topic_active(conn, topic.id, params.active)
            })
            .await?;

        to_json(&serde_json::json!({
            "id": topic.id,
            "name": topic.name,
            "is_active": topic.is_active,
        }))
    }

    #[tool(description = "Create a category. Returns the existing one if the name is already taken.")]
    async fn create_category(
        &self,
        Parameters(params): Parameters<CreateCategoryParams>,
    ) -> Result<String, String> {
        tracing::info!(name = %params.name, "create_category called");

        let result = self
            .with_db("create_category", move |conn| {
                crate::knowledge::categories::create_category(conn, &params.name, params.description.as_deref())
            })
            .await?;

        to_json(&result)
    }

    #[tool(description = "List all categories with their topic counts.")]
    async fn list_categories(
        &self,
        Parameters(_params): Parameters<ListCategoriesParams>,
    ) -> Result<String, String> {
        tracing::info!("list_categories called");

        let listed = self
            .with_db("list_categories", |conn| {
                crate::knowledge::categories::list_categories(conn)
            })
            .await?;

        to_json(&serde_json::json!({ "categories": listed }))
    }

    /// Store a relationship between two topics.
    #[tool(description = "Create or re-weight a directed relation between two topics (e.g. 'depends_on', 'see_also'). Strength defaults to 0.5.")]
    async fn store_relation(
        &self,
        Parameters(params): Parameters<StoreRelationParams>,
    ) -> Result<String, String> {
        tracing::info!(
            source = %params.source,
            target = %params.target,
            relation_type = %params.relation_type,
            "store_relation called"
        );

        let result = self
            .with_db("store_relation", move |conn| {
                let source = topics::find_topic(conn, &params.source)?;
                let target = topics::find_topic(conn, &params.target)?;
                relations::store_relation(
                    conn,
                    source.id,
                    target.id,
                    &params.relation_type,
                    params.strength,
                )
            })
            .await?;

        to_json(&result)
    }

    #[tool(description = "List topics connected to a topic, strongest edge first. Direction: 'outgoing', 'incoming', or 'both'.")]
    async fn related_topics(
        &self,
        Parameters(params): Parameters<RelatedTopicsParams>,
    ) -> Result<String, String> {
        let direction = match params.direction.as_deref() {
            Some(d) => d.parse::<Direction>()?,
            None => Direction::Both,
        };
        let min_strength = params.min_strength.unwrap_or(0.0);
        tracing::info!(topic = %params.topic, ?direction, min_strength, "related_topics called");

        let related = self
            .with_db("related_topics", move |conn| {
                let topic = topics::find_topic(conn, &params.topic)?;
                relations::related_topics(
                    conn,
                    topic.id,
                    params.relation_type.as_deref(),
                    direction,
                    min_strength,
                )
            })
            .await?;

        to_json(&serde_json::json!({ "related": related, "count": related.len() }))
    }

    /// Version history for a topic.
    #[tool(description = "List prior versions of a topic (newest first), or fetch one version's content by number.")]
    async fn topic_history(
        &self,
        Parameters(params): Parameters<TopicHistoryParams>,
    ) -> Result<String, String> {
        tracing::info!(topic = %params.topic, version = ?params.version, "topic_history called");
        let limit = self.config.listing.clamp(params.limit);

        let response = self
            .with_db("topic_history", move |conn| {
                let topic = topics::find_topic(conn, &params.topic)?;
                let value = match params.version {
                    Some(v) => serde_json::json!({
                        "entry": history::get_version(conn, topic.id, v)?,
                    }),
                    None => serde_json::json!({
                        "topic_id": topic.id,
                        "current_version": topic.version,
                        "history": history::list_history(conn, topic.id, limit)?,
                    }),
                };
                Ok(value)
            })
            .await?;

        Ok(response.to_string())
    }

    #[tool(description = "Restore a prior version's content as a new version. The current content is kept in history.")]
    async fn restore_version(
        &self,
        Parameters(params): Parameters<RestoreVersionParams>,
    ) -> Result<String, String> {
        tracing::info!(topic = %params.topic, version = params.version, "restore_version called");
        let detect = params
            .detect_references
            .unwrap_or(self.config.references.detect_by_default);

        let detector = self.detector;
        let result = self
            .with_db("restore_version", move |conn| {
                let topic = topics::find_topic(conn, &params.topic)?;
                history::restore_version(conn, topic.id, params.version, detect, &detector)
            })
            .await?;

        to_json(&result)
    }

    /// Preview detection without writing.
    #[tool(description = "Scan text for mentions of known topics and report each with its confidence. Nothing is written.")]
    async fn detect_references(
        &self,
        Parameters(params): Parameters<DetectReferencesParams>,
    ) -> Result<String, String> {
        tracing::info!(content_len = params.content.len(), "detect_references called");

        let detector = self.detector;
        let mentions = self
            .with_db("detect_references", move |conn| {
                let index = NameIndex::load(conn)?;
                Ok(detector.detect(&params.content, &index))
            })
            .await?;

        to_json(&serde_json::json!({ "mentions": mentions, "count": mentions.len() }))
    }

    #[tool(description = "Get knowledge-base statistics: topic counts by category and content type, relation counts by type, history size, storage size.")]
    async fn kb_stats(
        &self,
        Parameters(_params): Parameters<KbStatsParams>,
    ) -> Result<String, String> {
        tracing::info!("kb_stats called");
        let db_path = self.config.resolved_db_path();

        let response = self
            .with_db("kb_stats", move |conn| stats::kb_stats(conn, Some(db_path.as_path())))
            .await?;

        to_json(&response)
    }
}

#[tool_handler]
impl ServerHandler for KnowledgeTools {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo {
            instructions: Some(
                "Scriptorium is a knowledge base. Use write_topic to save content (mentions of \
                 other topics are linked automatically), get_topic and search_topics to read, \
                 and related_topics to walk the topic graph."
                    .into(),
            ),
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}
