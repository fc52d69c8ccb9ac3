//! Literal-substitution points for query construction.
//!
//! Historical block numbers and address sets are interpolated directly into
//! the query text instead of being passed as bound variables. The indexer's
//! query planner only constant-folds block-pinned sub-queries when the block
//! number is a literal; sending it as a variable makes the server reject or
//! mis-plan the query. Do not "fix" this by switching to variables without
//! verifying the backend no longer requires literals.

/// Renders the optional block pin for a historical sub-query.
///
/// `None` yields an empty string, i.e. a query against current state.
pub fn block_clause(block: Option<u64>) -> String {
    match block {
        Some(number) => format!("block: {{ number: {number} }}"),
        None => String::new(),
    }
}

/// Renders an address set as a quoted array literal for `id_in`-style
/// predicates.
pub fn address_list(addresses: &[String]) -> String {
    format!("[\"{}\"]", addresses.join("\",\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_clause_inlines_number_as_literal() {
        assert_eq!(block_clause(Some(12_345_678)), "block: { number: 12345678 }");
    }

    #[test]
    fn block_clause_empty_for_current_state() {
        assert_eq!(block_clause(None), "");
    }

    #[test]
    fn address_list_quotes_and_joins() {
        let addresses = vec!["0xaa".to_string(), "0xbb".to_string()];
        assert_eq!(address_list(&addresses), r#"["0xaa","0xbb"]"#);
    }
}
