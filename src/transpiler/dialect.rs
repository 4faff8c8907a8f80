use serde::{Deserialize, Serialize};

use crate::error::PredError;
use crate::transpiler::sql::mysql::MysqlGenerator;
use crate::transpiler::sql::oracle::OracleGenerator;
use crate::transpiler::sql::postgres::PostgresGenerator;
use crate::transpiler::sql::sqlite::SqliteGenerator;
use crate::transpiler::sql::sqlserver::SqlServerGenerator;
use crate::transpiler::traits::SqlGenerator;

/// Supported SQL Dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    SqlServer,
    #[default]
    Sqlite,
    Postgresql,
    MySql,
    Oracle,
}

impl Dialect {
    pub const ALL: [Dialect; 5] = [
        Dialect::SqlServer,
        Dialect::Sqlite,
        Dialect::Postgresql,
        Dialect::MySql,
        Dialect::Oracle,
    ];

    pub fn generator(&self) -> &'static dyn SqlGenerator {
        match self {
            Dialect::SqlServer => &SqlServerGenerator,
            Dialect::Sqlite => &SqliteGenerator,
            Dialect::Postgresql => &PostgresGenerator,
            Dialect::MySql => &MysqlGenerator,
            Dialect::Oracle => &OracleGenerator,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Dialect::SqlServer => "sqlserver",
            Dialect::Sqlite => "sqlite",
            Dialect::Postgresql => "postgresql",
            Dialect::MySql => "mysql",
            Dialect::Oracle => "oracle",
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Dialect {
    type Err = PredError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sqlserver" | "mssql" => Ok(Dialect::SqlServer),
            "sqlite" => Ok(Dialect::Sqlite),
            "postgresql" | "postgres" | "pg" => Ok(Dialect::Postgresql),
            "mysql" => Ok(Dialect::MySql),
            "oracle" => Ok(Dialect::Oracle),
            other => Err(PredError::Config(format!(
                "unknown dialect '{}'. Expected: sqlserver, sqlite, postgresql, mysql, or oracle",
                other
            ))),
        }
    }
}
