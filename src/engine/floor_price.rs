use crate::config::SearchConfig;
use crate::engine::matching::CompiledQuery;
use crate::model::{Dataset, ProductRecord, QueryError, QueryOutcome};
use std::collections::HashMap;

/// Trait defining the interface for a floor price query.
pub trait QueryEngine {
    /// Returns, for every (brand, cat) group among the records matching
    /// `query`, all rows priced at that group's minimum.
    fn find_floor_prices(
        &self,
        query: &str,
        dataset: &Dataset,
        cfg: &SearchConfig,
    ) -> Result<QueryOutcome, QueryError>;
}

/// Implementation of the floor price query engine. Stateless: every call is a
/// pure function of (query, dataset, cfg).
pub struct QueryEngineImpl;

impl QueryEngineImpl {
    pub fn new() -> Self {
        Self
    }
}

impl QueryEngine for QueryEngineImpl {
    fn find_floor_prices(
        &self,
        query: &str,
        dataset: &Dataset,
        cfg: &SearchConfig,
    ) -> Result<QueryOutcome, QueryError> {
        if query.trim().is_empty() {
            return Err(QueryError::Blank);
        }
        let compiled = CompiledQuery::new(query, cfg.match_mode);

        let matched: Vec<&ProductRecord> = dataset
            .records
            .iter()
            .filter(|r| r.name.as_deref().is_some_and(|n| compiled.matches(n)))
            .collect();
        if matched.is_empty() {
            return Ok(QueryOutcome::NoMatches);
        }

        // Minimum per (brand, cat), on unadjusted prices.
        let mut floors: HashMap<(&str, &str), f64> = HashMap::new();
        for r in &matched {
            floors
                .entry((r.brand.as_str(), r.cat.as_str()))
                .and_modify(|floor| {
                    if r.price < *floor {
                        *floor = r.price;
                    }
                })
                .or_insert(r.price);
        }

        // Keep every row tied for its group's floor, in sheet order. The
        // markup is applied only after selection, so it can never change
        // which rows are chosen.
        let mut result = Vec::new();
        for r in matched {
            let floor = floors[&(r.brand.as_str(), r.cat.as_str())];
            if r.price == floor {
                let mut record = r.clone();
                if let Some(factor) = cfg.markup_factor {
                    record.price = round_cents(record.price * factor);
                }
                result.push(record);
            }
        }
        Ok(QueryOutcome::Matches(result))
    }
}

fn round_cents(price: f64) -> f64 {
    (price * 100.0).round() / 100.0
}
