use std::fmt;

use clap::ValueEnum;
use serde::Serialize;

/// OpenMetadata API groups that can be exposed as tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiGroup {
    // Core entities
    #[value(name = "table")]
    Table,
    #[value(name = "database")]
    Database,
    #[value(name = "databaseschema")]
    #[serde(rename = "databaseschema")]
    DatabaseSchema,

    // Data assets
    #[value(name = "dashboard")]
    Dashboard,
    #[value(name = "chart")]
    Chart,
    #[value(name = "pipeline")]
    Pipeline,
    #[value(name = "topic")]
    Topic,
    #[value(name = "metrics")]
    Metrics,
    #[value(name = "container")]
    Container,
    #[value(name = "report")]
    Report,
    #[value(name = "mlmodel")]
    #[serde(rename = "mlmodel")]
    MlModel,

    // Users and teams
    #[value(name = "user")]
    User,
    #[value(name = "team")]
    Team,

    // Governance
    #[value(name = "classification")]
    Classification,
    #[value(name = "glossary")]
    Glossary,
    #[value(name = "tag")]
    Tag,

    // System
    #[value(name = "bot")]
    Bot,
    #[value(name = "services")]
    Services,
    #[value(name = "event")]
    Event,

    // Analytics
    #[value(name = "lineage")]
    Lineage,
    #[value(name = "usage")]
    Usage,
    #[value(name = "search")]
    Search,

    // Data quality
    #[value(name = "test_case")]
    TestCase,
    #[value(name = "test_suite")]
    TestSuite,

    // Access control
    #[value(name = "policy")]
    Policy,
    #[value(name = "role")]
    Role,

    #[value(name = "domain")]
    Domain,
}

impl ApiGroup {
    /// Groups enabled when `--apis` is not given.
    pub const CORE: [ApiGroup; 9] = [
        ApiGroup::Table,
        ApiGroup::Database,
        ApiGroup::DatabaseSchema,
        ApiGroup::Dashboard,
        ApiGroup::Chart,
        ApiGroup::Pipeline,
        ApiGroup::Topic,
        ApiGroup::Metrics,
        ApiGroup::Container,
    ];

    /// Name used on the command line and as the tool name prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiGroup::Table => "table",
            ApiGroup::Database => "database",
            ApiGroup::DatabaseSchema => "databaseschema",
            ApiGroup::Dashboard => "dashboard",
            ApiGroup::Chart => "chart",
            ApiGroup::Pipeline => "pipeline",
            ApiGroup::Topic => "topic",
            ApiGroup::Metrics => "metrics",
            ApiGroup::Container => "container",
            ApiGroup::Report => "report",
            ApiGroup::MlModel => "mlmodel",
            ApiGroup::User => "user",
            ApiGroup::Team => "team",
            ApiGroup::Classification => "classification",
            ApiGroup::Glossary => "glossary",
            ApiGroup::Tag => "tag",
            ApiGroup::Bot => "bot",
            ApiGroup::Services => "services",
            ApiGroup::Event => "event",
            ApiGroup::Lineage => "lineage",
            ApiGroup::Usage => "usage",
            ApiGroup::Search => "search",
            ApiGroup::TestCase => "test_case",
            ApiGroup::TestSuite => "test_suite",
            ApiGroup::Policy => "policy",
            ApiGroup::Role => "role",
            ApiGroup::Domain => "domain",
        }
    }

    pub fn all() -> &'static [ApiGroup] {
        Self::value_variants()
    }
}

impl fmt::Display for ApiGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
