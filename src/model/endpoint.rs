use super::Record;
use crate::shared::ids::{AgentId, EndpointId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    Oracle,
    PostgreSql,
    MySql,
    SqlServer,
    Db2,
}

impl DatabaseType {
    pub const ALL: [DatabaseType; 5] = [
        Self::Oracle,
        Self::PostgreSql,
        Self::MySql,
        Self::SqlServer,
        Self::Db2,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Oracle => "Oracle",
            Self::PostgreSql => "PostgreSQL",
            Self::MySql => "MySQL",
            Self::SqlServer => "SQL Server",
            Self::Db2 => "Db2",
        }
    }

    pub fn default_port(self) -> u16 {
        match self {
            Self::Oracle => 1521,
            Self::PostgreSql => 5432,
            Self::MySql => 3306,
            Self::SqlServer => 1433,
            Self::Db2 => 50000,
        }
    }

    pub fn url_scheme(self) -> &'static str {
        match self {
            Self::Oracle => "oracle",
            Self::PostgreSql => "postgresql",
            Self::MySql => "mysql",
            Self::SqlServer => "sqlserver",
            Self::Db2 => "db2",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointRole {
    Source,
    Target,
}

impl EndpointRole {
    pub const ALL: [EndpointRole; 2] = [Self::Source, Self::Target];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Target => "target",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Source => "Source",
            Self::Target => "Target",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Endpoint {
    pub id: EndpointId,
    pub name: String,
    pub database_type: DatabaseType,
    pub role: EndpointRole,
    pub agent_id: AgentId,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password: String,
}

impl Record for Endpoint {
    type Id = EndpointId;
    const KIND: &'static str = "endpoint";

    fn id(&self) -> &EndpointId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Endpoint {
    /// Connection URL without the password.
    pub fn connection_url(&self) -> String {
        format!(
            "{}://{}@{}:{}/{}",
            self.database_type.url_scheme(),
            self.username,
            self.host,
            self.port,
            self.database
        )
    }

    pub fn label(&self) -> String {
        format!(
            "{} ({} {})",
            self.name,
            self.database_type.label(),
            self.role.as_str()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_url_omits_password() {
        let endpoint = Endpoint {
            id: EndpointId::parse("ep-1").expect("id"),
            name: "Orders".to_string(),
            database_type: DatabaseType::PostgreSql,
            role: EndpointRole::Source,
            agent_id: AgentId::parse("agt-1").expect("id"),
            host: "db.internal".to_string(),
            port: 5432,
            database: "orders".to_string(),
            username: "repl".to_string(),
            password: "hunter2".to_string(),
        };
        assert_eq!(
            endpoint.connection_url(),
            "postgresql://repl@db.internal:5432/orders"
        );
        let encoded = serde_json::to_string(&endpoint).expect("encode");
        assert!(!encoded.contains("hunter2"));
    }
}
