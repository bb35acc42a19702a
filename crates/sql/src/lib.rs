//! etlgraph-sql — best-effort SQL semantics extraction (C3). Used by the
//! SSIS Execute SQL task parser to recover table references, joins, column
//! projections, and filter predicates without a real SQL grammar.

pub mod edges;
pub mod parser;
pub mod semantics;

pub use edges::join_edges;
pub use parser::parse;
pub use semantics::{ColumnExpression, JoinKind, JoinRelationship, SqlSemantics, TableReference};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_empty_semantics() {
        let semantics = parse("");
        assert!(semantics.tables.is_empty());
        assert!(semantics.joins.is_empty());
        assert!(semantics.columns.is_empty());
        assert_eq!(semantics.original_query, "");
    }

    #[test]
    fn query_with_no_from_yields_no_tables() {
        let semantics = parse("SELECT 1");
        assert!(semantics.tables.is_empty());
        assert!(semantics.joins.is_empty());
    }

    #[test]
    fn inner_join_with_alias_and_where_clause() {
        let semantics = parse(
            "SELECT p.*, c.CategoryName FROM Products AS p INNER JOIN Categories AS c \
             ON p.CategoryID = c.CategoryID WHERE p.Discontinued = 0",
        );

        assert_eq!(semantics.tables.len(), 2);
        assert_eq!(semantics.tables[0].name, "Products");
        assert_eq!(semantics.tables[0].alias.as_deref(), Some("p"));
        assert_eq!(semantics.tables[1].name, "Categories");
        assert_eq!(semantics.tables[1].alias.as_deref(), Some("c"));

        assert_eq!(semantics.joins.len(), 1);
        let join = &semantics.joins[0];
        assert_eq!(join.kind, JoinKind::Inner);
        assert_eq!(join.left.name, "Products");
        assert_eq!(join.right.name, "Categories");
        assert_eq!(join.condition, "p.CategoryID = c.CategoryID");

        assert_eq!(semantics.where_clause.as_deref(), Some("p.Discontinued = 0"));

        let edges = join_edges(&semantics);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].source_id, "table:Products");
        assert_eq!(edges[0].target_id, "table:Categories");
    }

    #[test]
    fn multi_join_chain_flattens_to_the_from_table() {
        let semantics = parse(
            "SELECT * FROM Orders o \
             LEFT JOIN Customers c ON o.CustomerID = c.CustomerID \
             LEFT JOIN Employees e ON o.EmployeeID = e.EmployeeID",
        );

        assert_eq!(semantics.joins.len(), 2);
        assert!(semantics.joins.iter().all(|j| j.left.name == "Orders"));
        assert_eq!(semantics.joins[0].right.name, "Customers");
        assert_eq!(semantics.joins[1].right.name, "Employees");
    }

    #[test]
    fn schema_qualified_table_splits_schema_and_name() {
        let semantics = parse("SELECT * FROM dbo.Orders");
        assert_eq!(semantics.tables.len(), 1);
        assert_eq!(semantics.tables[0].schema.as_deref(), Some("dbo"));
        assert_eq!(semantics.tables[0].name, "Orders");
    }

    #[test]
    fn column_alias_is_captured_separately_from_column_name() {
        let semantics = parse("SELECT o.OrderID AS id FROM Orders o");
        assert_eq!(semantics.columns.len(), 1);
        let col = &semantics.columns[0];
        assert_eq!(col.alias.as_deref(), Some("id"));
        assert_eq!(col.source_alias.as_deref(), Some("o"));
        assert_eq!(col.source_table.as_deref(), Some("Orders"));
        assert_eq!(col.column_name.as_deref(), Some("OrderID"));
    }

    #[test]
    fn malformed_sql_never_panics() {
        let semantics = parse("SELECT FROM WHERE (((");
        assert_eq!(semantics.original_query.contains("SELECT"), true);
    }
}
