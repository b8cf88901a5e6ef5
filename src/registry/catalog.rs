//! The tool catalog.
//!
//! Entity collections get the same six CRUD tools, generated from the table
//! below. Lineage, usage, search and change events have hand-written
//! descriptors.

use reqwest::Method;
use serde_json::json;

use super::ApiGroup;
use super::descriptor::{ParamKind, ParamSpec, ToolDescriptor, UpstreamOperation};

/// Largest page size accepted by OpenMetadata list endpoints.
pub const MAX_LIST_LIMIT: i64 = 1_000_000;
pub const DEFAULT_LIST_LIMIT: i64 = 10;

/// An extra list filter sent as a query parameter.
struct Filter {
    param: &'static str,
    query: &'static str,
    description: &'static str,
}

const fn filter(param: &'static str, query: &'static str, description: &'static str) -> Filter {
    Filter {
        param,
        query,
        description,
    }
}

/// An OpenMetadata entity collection exposed through CRUD tools.
struct Entity {
    group: ApiGroup,
    singular: &'static str,
    plural: &'static str,
    label: &'static str,
    collection: &'static str,
    filters: &'static [Filter],
}

const BY_SERVICE: &[Filter] = &[filter(
    "service",
    "service",
    "Filter by service fully qualified name",
)];
const BY_DATABASE: &[Filter] = &[filter(
    "database",
    "database",
    "Filter by database fully qualified name",
)];

const ENTITIES: &[Entity] = &[
    Entity {
        group: ApiGroup::Table,
        singular: "table",
        plural: "tables",
        label: "table",
        collection: "tables",
        filters: &[
            filter(
                "database",
                "database",
                "Filter tables by database fully qualified name",
            ),
            filter(
                "database_schema",
                "databaseSchema",
                "Filter tables by schema fully qualified name",
            ),
        ],
    },
    Entity {
        group: ApiGroup::Database,
        singular: "database",
        plural: "databases",
        label: "database",
        collection: "databases",
        filters: BY_SERVICE,
    },
    Entity {
        group: ApiGroup::DatabaseSchema,
        singular: "database_schema",
        plural: "database_schemas",
        label: "database schema",
        collection: "databaseSchemas",
        filters: BY_DATABASE,
    },
    Entity {
        group: ApiGroup::Dashboard,
        singular: "dashboard",
        plural: "dashboards",
        label: "dashboard",
        collection: "dashboards",
        filters: BY_SERVICE,
    },
    Entity {
        group: ApiGroup::Chart,
        singular: "chart",
        plural: "charts",
        label: "chart",
        collection: "charts",
        filters: BY_SERVICE,
    },
    Entity {
        group: ApiGroup::Pipeline,
        singular: "pipeline",
        plural: "pipelines",
        label: "pipeline",
        collection: "pipelines",
        filters: BY_SERVICE,
    },
    Entity {
        group: ApiGroup::Topic,
        singular: "topic",
        plural: "topics",
        label: "topic",
        collection: "topics",
        filters: BY_SERVICE,
    },
    Entity {
        group: ApiGroup::Metrics,
        singular: "metric",
        plural: "metrics",
        label: "metric",
        collection: "metrics",
        filters: &[],
    },
    Entity {
        group: ApiGroup::Container,
        singular: "container",
        plural: "containers",
        label: "container",
        collection: "containers",
        filters: &[
            filter(
                "service",
                "service",
                "Filter by storage service fully qualified name",
            ),
            filter(
                "root",
                "root",
                "Only list root containers when set to 'true'",
            ),
        ],
    },
    Entity {
        group: ApiGroup::Report,
        singular: "report",
        plural: "reports",
        label: "report",
        collection: "reports",
        filters: &[],
    },
    Entity {
        group: ApiGroup::MlModel,
        singular: "ml_model",
        plural: "ml_models",
        label: "ML model",
        collection: "mlmodels",
        filters: BY_SERVICE,
    },
    Entity {
        group: ApiGroup::User,
        singular: "user",
        plural: "users",
        label: "user",
        collection: "users",
        filters: &[
            filter("team", "team", "Filter users by team name"),
            filter("is_bot", "isBot", "Set to 'true' to list bot users only"),
        ],
    },
    Entity {
        group: ApiGroup::Team,
        singular: "team",
        plural: "teams",
        label: "team",
        collection: "teams",
        filters: &[filter("parent_team", "parentTeam", "Filter by parent team name")],
    },
    Entity {
        group: ApiGroup::Classification,
        singular: "classification",
        plural: "classifications",
        label: "classification",
        collection: "classifications",
        filters: &[],
    },
    Entity {
        group: ApiGroup::Glossary,
        singular: "glossary",
        plural: "glossaries",
        label: "glossary",
        collection: "glossaries",
        filters: &[],
    },
    Entity {
        group: ApiGroup::Glossary,
        singular: "glossary_term",
        plural: "glossary_terms",
        label: "glossary term",
        collection: "glossaryTerms",
        filters: &[
            filter("glossary", "glossary", "Filter terms by glossary ID"),
            filter("parent", "parent", "Filter terms by parent term ID"),
        ],
    },
    Entity {
        group: ApiGroup::Tag,
        singular: "tag",
        plural: "tags",
        label: "tag",
        collection: "tags",
        filters: &[filter(
            "parent",
            "parent",
            "Filter tags by classification name",
        )],
    },
    Entity {
        group: ApiGroup::Bot,
        singular: "bot",
        plural: "bots",
        label: "bot",
        collection: "bots",
        filters: &[],
    },
    Entity {
        group: ApiGroup::Services,
        singular: "database_service",
        plural: "database_services",
        label: "database service",
        collection: "services/databaseServices",
        filters: &[],
    },
    Entity {
        group: ApiGroup::Services,
        singular: "dashboard_service",
        plural: "dashboard_services",
        label: "dashboard service",
        collection: "services/dashboardServices",
        filters: &[],
    },
    Entity {
        group: ApiGroup::Services,
        singular: "pipeline_service",
        plural: "pipeline_services",
        label: "pipeline service",
        collection: "services/pipelineServices",
        filters: &[],
    },
    Entity {
        group: ApiGroup::Services,
        singular: "messaging_service",
        plural: "messaging_services",
        label: "messaging service",
        collection: "services/messagingServices",
        filters: &[],
    },
    Entity {
        group: ApiGroup::Services,
        singular: "mlmodel_service",
        plural: "mlmodel_services",
        label: "ML model service",
        collection: "services/mlmodelServices",
        filters: &[],
    },
    Entity {
        group: ApiGroup::Services,
        singular: "storage_service",
        plural: "storage_services",
        label: "storage service",
        collection: "services/storageServices",
        filters: &[],
    },
    Entity {
        group: ApiGroup::Event,
        singular: "event_subscription",
        plural: "event_subscriptions",
        label: "event subscription",
        collection: "events/subscriptions",
        filters: &[],
    },
    Entity {
        group: ApiGroup::TestCase,
        singular: "test_case",
        plural: "test_cases",
        label: "test case",
        collection: "dataQuality/testCases",
        filters: &[
            filter(
                "entity_link",
                "entityLink",
                "Filter by entity link, e.g. <#E::table::svc.db.schema.orders>",
            ),
            filter("test_suite_id", "testSuiteId", "Filter by test suite ID"),
        ],
    },
    Entity {
        group: ApiGroup::TestSuite,
        singular: "test_suite",
        plural: "test_suites",
        label: "test suite",
        collection: "dataQuality/testSuites",
        filters: &[filter(
            "test_suite_type",
            "testSuiteType",
            "Filter by suite type (basic or logical)",
        )],
    },
    Entity {
        group: ApiGroup::Policy,
        singular: "policy",
        plural: "policies",
        label: "policy",
        collection: "policies",
        filters: &[],
    },
    Entity {
        group: ApiGroup::Role,
        singular: "role",
        plural: "roles",
        label: "role",
        collection: "roles",
        filters: &[],
    },
    Entity {
        group: ApiGroup::Domain,
        singular: "domain",
        plural: "domains",
        label: "domain",
        collection: "domains",
        filters: &[],
    },
    Entity {
        group: ApiGroup::Domain,
        singular: "data_product",
        plural: "data_products",
        label: "data product",
        collection: "dataProducts",
        filters: &[filter(
            "domain",
            "domain",
            "Filter data products by domain name",
        )],
    },
];

/// All descriptors belonging to `group`, in registration order.
pub fn descriptors_for(group: ApiGroup) -> Vec<ToolDescriptor> {
    let mut tools: Vec<ToolDescriptor> = ENTITIES
        .iter()
        .filter(|entity| entity.group == group)
        .flat_map(crud_tools)
        .collect();

    match group {
        ApiGroup::Event => tools.push(change_events()),
        ApiGroup::Lineage => tools.extend(lineage_tools()),
        ApiGroup::Usage => tools.extend(usage_tools()),
        ApiGroup::Search => tools.extend(search_tools()),
        _ => {}
    }
    tools
}

fn tool(
    group: ApiGroup,
    name: String,
    description: String,
    method: Method,
    path: String,
    params: Vec<ParamSpec>,
) -> ToolDescriptor {
    ToolDescriptor {
        name,
        description,
        group,
        params,
        operation: UpstreamOperation { method, path },
    }
}

fn fields_param() -> ParamSpec {
    ParamSpec::query(
        "fields",
        "fields",
        ParamKind::String,
        "Comma-separated list of fields to include",
    )
}

fn limit_param(query: &'static str, max: i64) -> ParamSpec {
    ParamSpec::query(
        "limit",
        query,
        ParamKind::Integer {
            min: 1,
            max: Some(max),
        },
        format!("Maximum number of results to return (1 to {})", max),
    )
    .with_default(json!(DEFAULT_LIST_LIMIT))
}

fn offset_param(name: &'static str, query: &'static str) -> ParamSpec {
    ParamSpec::query(
        name,
        query,
        ParamKind::Integer { min: 0, max: None },
        "Number of results to skip",
    )
    .with_default(json!(0))
}

fn crud_tools(entity: &Entity) -> Vec<ToolDescriptor> {
    let prefix = entity.group.as_str();
    let label = entity.label;
    let plural_label = entity.plural.replace('_', " ");
    let collection = entity.collection;
    let id = || ParamSpec::path("id", format!("ID of the {}", label));

    let mut list_params = vec![
        limit_param("limit", MAX_LIST_LIMIT),
        offset_param("offset", "offset"),
        fields_param(),
    ];
    list_params.extend(
        entity
            .filters
            .iter()
            .map(|f| ParamSpec::query(f.param, f.query, ParamKind::String, f.description)),
    );
    list_params.push(ParamSpec::include_deleted(format!(
        "Whether to include deleted {}",
        plural_label
    )));

    vec![
        tool(
            entity.group,
            format!("{}_get_{}", prefix, entity.plural),
            format!("List {} with pagination", plural_label),
            Method::GET,
            collection.to_string(),
            list_params,
        ),
        tool(
            entity.group,
            format!("{}_get_{}", prefix, entity.singular),
            format!("Get details of a specific {} by ID", label),
            Method::GET,
            format!("{}/{{id}}", collection),
            vec![id(), fields_param()],
        ),
        tool(
            entity.group,
            format!("{}_get_{}_by_name", prefix, entity.singular),
            format!("Get details of a specific {} by fully qualified name", label),
            Method::GET,
            format!("{}/name/{{fqn}}", collection),
            vec![
                ParamSpec::path("fqn", format!("Fully qualified name of the {}", label)),
                fields_param(),
            ],
        ),
        tool(
            entity.group,
            format!("{}_create_{}", prefix, entity.singular),
            format!("Create a new {}", label),
            Method::POST,
            collection.to_string(),
            vec![ParamSpec::body(
                "data",
                format!("{} definition as accepted by OpenMetadata", capitalize(label)),
            )],
        ),
        tool(
            entity.group,
            format!("{}_update_{}", prefix, entity.singular),
            format!("Update an existing {}", label),
            Method::PUT,
            format!("{}/{{id}}", collection),
            vec![id(), ParamSpec::body("data", format!("Updated {} data", label))],
        ),
        tool(
            entity.group,
            format!("{}_delete_{}", prefix, entity.singular),
            format!("Delete a {}", label),
            Method::DELETE,
            format!("{}/{{id}}", collection),
            vec![
                id(),
                ParamSpec::query(
                    "hard_delete",
                    "hardDelete",
                    ParamKind::Boolean,
                    "Permanently delete instead of soft delete",
                )
                .with_default(json!(false)),
                ParamSpec::query(
                    "recursive",
                    "recursive",
                    ParamKind::Boolean,
                    "Recursively delete children",
                )
                .with_default(json!(false)),
            ],
        ),
    ]
}

fn change_events() -> ToolDescriptor {
    let entity_list = |name: &'static str, query: &'static str, action: &str| {
        ParamSpec::query(
            name,
            query,
            ParamKind::String,
            format!(
                "Comma-separated entity types whose {} events to return, or '*'",
                action
            ),
        )
    };

    tool(
        ApiGroup::Event,
        "event_get_events".to_string(),
        "List change events since a timestamp".to_string(),
        Method::GET,
        "events".to_string(),
        vec![
            entity_list("entity_created", "entityCreated", "creation"),
            entity_list("entity_updated", "entityUpdated", "update"),
            entity_list("entity_deleted", "entityDeleted", "deletion"),
            ParamSpec::query(
                "timestamp",
                "timestamp",
                ParamKind::Integer { min: 0, max: None },
                "Return events after this Unix timestamp in milliseconds",
            )
            .required(),
        ],
    )
}

fn depth(name: &'static str, query: &'static str, direction: &str) -> ParamSpec {
    ParamSpec::query(
        name,
        query,
        ParamKind::Integer {
            min: 0,
            max: Some(3),
        },
        format!("Number of {} hops to include (0 to 3)", direction),
    )
    .with_default(json!(1))
}

fn entity_type() -> ParamSpec {
    ParamSpec::path("entity", "Entity type, e.g. table or dashboard")
}

fn lineage_tools() -> Vec<ToolDescriptor> {
    let g = ApiGroup::Lineage;
    vec![
        tool(
            g,
            "lineage_get_lineage".to_string(),
            "Get the lineage graph of an entity by ID".to_string(),
            Method::GET,
            "lineage/{entity}/{id}".to_string(),
            vec![
                entity_type(),
                ParamSpec::path("id", "ID of the entity"),
                depth("upstream_depth", "upstreamDepth", "upstream"),
                depth("downstream_depth", "downstreamDepth", "downstream"),
            ],
        ),
        tool(
            g,
            "lineage_get_lineage_by_name".to_string(),
            "Get the lineage graph of an entity by fully qualified name".to_string(),
            Method::GET,
            "lineage/{entity}/name/{fqn}".to_string(),
            vec![
                entity_type(),
                ParamSpec::path("fqn", "Fully qualified name of the entity"),
                depth("upstream_depth", "upstreamDepth", "upstream"),
                depth("downstream_depth", "downstreamDepth", "downstream"),
            ],
        ),
        tool(
            g,
            "lineage_add_lineage".to_string(),
            "Add a lineage edge between two entities".to_string(),
            Method::PUT,
            "lineage".to_string(),
            vec![ParamSpec::body(
                "data",
                "Lineage edge, e.g. {\"edge\": {\"fromEntity\": {...}, \"toEntity\": {...}}}",
            )],
        ),
        tool(
            g,
            "lineage_delete_lineage".to_string(),
            "Delete the lineage edge between two entities".to_string(),
            Method::DELETE,
            "lineage/{from_entity}/{from_id}/{to_entity}/{to_id}".to_string(),
            vec![
                ParamSpec::path("from_entity", "Entity type of the upstream side"),
                ParamSpec::path("from_id", "ID of the upstream entity"),
                ParamSpec::path("to_entity", "Entity type of the downstream side"),
                ParamSpec::path("to_id", "ID of the downstream entity"),
            ],
        ),
    ]
}

fn usage_tools() -> Vec<ToolDescriptor> {
    let g = ApiGroup::Usage;
    let days = || {
        ParamSpec::query(
            "days",
            "days",
            ParamKind::Integer {
                min: 1,
                max: Some(30),
            },
            "Number of days of usage to return (1 to 30)",
        )
        .with_default(json!(1))
    };
    let date = || {
        ParamSpec::query(
            "date",
            "date",
            ParamKind::String,
            "Last day of the usage window (YYYY-MM-DD)",
        )
    };

    vec![
        tool(
            g,
            "usage_get_usage".to_string(),
            "Get usage details of an entity by ID".to_string(),
            Method::GET,
            "usage/{entity}/{id}".to_string(),
            vec![
                entity_type(),
                ParamSpec::path("id", "ID of the entity"),
                days(),
                date(),
            ],
        ),
        tool(
            g,
            "usage_get_usage_by_name".to_string(),
            "Get usage details of an entity by fully qualified name".to_string(),
            Method::GET,
            "usage/{entity}/name/{fqn}".to_string(),
            vec![
                entity_type(),
                ParamSpec::path("fqn", "Fully qualified name of the entity"),
                days(),
                date(),
            ],
        ),
        tool(
            g,
            "usage_add_usage".to_string(),
            "Report usage for an entity".to_string(),
            Method::POST,
            "usage/{entity}/{id}".to_string(),
            vec![
                entity_type(),
                ParamSpec::path("id", "ID of the entity"),
                ParamSpec::body("data", "Daily usage, e.g. {\"date\": \"2024-01-31\", \"count\": 42}"),
            ],
        ),
        tool(
            g,
            "usage_compute_percentile".to_string(),
            "Compute usage percentiles for an entity type on a date".to_string(),
            Method::POST,
            "usage/compute.percentile/{entity}/{date}".to_string(),
            vec![
                entity_type(),
                ParamSpec::path("date", "Date to compute percentiles for (YYYY-MM-DD)"),
            ],
        ),
    ]
}

fn search_tools() -> Vec<ToolDescriptor> {
    let g = ApiGroup::Search;
    let index = || {
        ParamSpec::query(
            "index",
            "index",
            ParamKind::String,
            "Search index, e.g. table_search_index",
        )
    };

    vec![
        tool(
            g,
            "search_query".to_string(),
            "Search entities using a query string".to_string(),
            Method::GET,
            "search/query".to_string(),
            vec![
                ParamSpec::query(
                    "query",
                    "q",
                    ParamKind::String,
                    "Query string, e.g. 'orders' or 'owner.name:alice'",
                )
                .required(),
                index(),
                offset_param("from", "from"),
                ParamSpec::query(
                    "size",
                    "size",
                    ParamKind::Integer {
                        min: 1,
                        max: Some(10_000),
                    },
                    "Number of hits to return (1 to 10000)",
                )
                .with_default(json!(DEFAULT_LIST_LIMIT)),
                ParamSpec::query(
                    "deleted",
                    "deleted",
                    ParamKind::Boolean,
                    "Search deleted entities instead of live ones",
                )
                .with_default(json!(false)),
                ParamSpec::query(
                    "sort_field",
                    "sort_field",
                    ParamKind::String,
                    "Field to sort by",
                ),
                ParamSpec::query(
                    "sort_order",
                    "sort_order",
                    ParamKind::String,
                    "Sort order, asc or desc",
                ),
                ParamSpec::query(
                    "query_filter",
                    "query_filter",
                    ParamKind::String,
                    "Elasticsearch query filter as a JSON string",
                ),
            ],
        ),
        tool(
            g,
            "search_suggest".to_string(),
            "Suggest entity names for a prefix".to_string(),
            Method::GET,
            "search/suggest".to_string(),
            vec![
                ParamSpec::query("query", "q", ParamKind::String, "Prefix to complete").required(),
                index(),
                ParamSpec::query(
                    "field",
                    "field",
                    ParamKind::String,
                    "Field to suggest from",
                ),
                limit_param("size", 100),
            ],
        ),
        tool(
            g,
            "search_aggregate".to_string(),
            "Aggregate field values across a search index".to_string(),
            Method::GET,
            "search/aggregate".to_string(),
            vec![
                index().required(),
                ParamSpec::query(
                    "field",
                    "field",
                    ParamKind::String,
                    "Field to aggregate on, e.g. owner.displayName.keyword",
                )
                .required(),
                ParamSpec::query(
                    "value",
                    "value",
                    ParamKind::String,
                    "Only count buckets matching this value",
                ),
                ParamSpec::query(
                    "query",
                    "q",
                    ParamKind::String,
                    "Query string restricting the aggregated documents",
                ),
            ],
        ),
    ]
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
