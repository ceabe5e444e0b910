//! Per-category skill scores derived from the tool records.

use std::collections::HashMap;
use tracing::warn;

use crate::error::DashError;
use crate::records::ToolRecord;

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryAggregate {
  pub category: String,
  pub weighted_sum: f64,
  pub weight_sum: f64,
  /// Weighted mean proficiency, truncated toward zero
  pub mean: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregates {
  /// Categories by descending mean; ties keep the order of first appearance
  pub ranked: Vec<CategoryAggregate>,
  /// Categories whose weights sum to zero and so have no mean
  pub excluded: Vec<String>,
}

impl Aggregates {
  pub fn warnings(&self) -> Vec<DashError> {
    self
      .excluded
      .iter()
      .map(|category| DashError::ZeroWeight {
        category: category.clone(),
      })
      .collect()
  }

  pub fn get(&self, category: &str) -> Option<&CategoryAggregate> {
    self.ranked.iter().find(|a| a.category == category)
  }
}

pub fn aggregate(tools: &[ToolRecord]) -> Aggregates {
  let mut order: Vec<(String, f64, f64)> = Vec::new();
  let mut index: HashMap<&str, usize> = HashMap::new();

  for tool in tools {
    let slot = *index.entry(tool.category.as_str()).or_insert_with(|| {
      order.push((tool.category.clone(), 0.0, 0.0));
      order.len() - 1
    });
    order[slot].1 += tool.weighted_score();
    order[slot].2 += tool.weight;
  }

  let mut aggregates = Aggregates::default();
  for (category, weighted_sum, weight_sum) in order {
    if weight_sum == 0.0 {
      warn!(category = %category, "category has zero total weight, left out of the ranking");
      aggregates.excluded.push(category);
      continue;
    }
    aggregates.ranked.push(CategoryAggregate {
      mean: (weighted_sum / weight_sum).trunc() as i64,
      category,
      weighted_sum,
      weight_sum,
    });
  }

  aggregates.ranked.sort_by(|a, b| b.mean.cmp(&a.mean));
  aggregates
}

/// Tools of one category, most proficient first; ties keep sheet order.
pub fn category_detail<'a>(tools: &'a [ToolRecord], category: &str) -> Vec<&'a ToolRecord> {
  let mut detail: Vec<&ToolRecord> = tools.iter().filter(|t| t.category == category).collect();
  detail.sort_by(|a, b| b.proficiency.total_cmp(&a.proficiency));
  detail
}
