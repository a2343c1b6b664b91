//! The fixed set of metadata queries.

/// A named metadata query paired with its SQL source and JSON destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryDescriptor {
    pub name: &'static str,
    pub output_file: &'static str,
    pub description: &'static str,
    pub sql_file: &'static str,
}

/// Queries in reporting order. They are independent of each other.
pub const DB_QUERIES: [QueryDescriptor; 7] = [
    QueryDescriptor {
        name: "tables",
        output_file: "tables.json",
        description: "Getting comprehensive table information",
        sql_file: "get_all_tables_detailed.sql",
    },
    QueryDescriptor {
        name: "functions",
        output_file: "functions.json",
        description: "Getting custom functions",
        sql_file: "get_all_functions.sql",
    },
    QueryDescriptor {
        name: "indexes",
        output_file: "indexes.json",
        description: "Getting index information",
        sql_file: "get_all_indexes.sql",
    },
    QueryDescriptor {
        name: "rls-policies",
        output_file: "rls-policies.json",
        description: "Getting RLS policies",
        sql_file: "get_all_rls_policies.sql",
    },
    QueryDescriptor {
        name: "constraints",
        output_file: "constraints.json",
        description: "Getting constraint information",
        sql_file: "get_all_constraints.sql",
    },
    QueryDescriptor {
        name: "triggers",
        output_file: "triggers.json",
        description: "Getting trigger information",
        sql_file: "get_all_triggers.sql",
    },
    QueryDescriptor {
        name: "extensions",
        output_file: "extensions.json",
        description: "Getting installed extensions",
        sql_file: "get_extensions.sql",
    },
];

/// Manifest file written after every run.
pub const MANIFEST_FILE: &str = "build-metadata.json";
