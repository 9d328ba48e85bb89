//! Table query builder rendered as PostgREST query parameters.

use std::fmt;
use std::str::FromStr;

use url::Url;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// One `order` term, e.g. `order_index.asc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub direction: Direction,
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = match self.direction {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        };
        write!(f, "{}.{}", self.column, dir)
    }
}

impl FromStr for OrderBy {
    type Err = String;

    /// Accepts `column`, `column.asc` or `column.desc`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (column, direction) = match s.rsplit_once('.') {
            Some((column, "asc")) => (column, Direction::Asc),
            Some((column, "desc")) => (column, Direction::Desc),
            _ => (s, Direction::Asc),
        };
        if column.is_empty() {
            return Err(format!("invalid order term '{}'", s));
        }
        Ok(Self {
            column: column.to_string(),
            direction,
        })
    }
}

/// Select query for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    columns: String,
    filters: Vec<(String, String)>,
    order: Vec<OrderBy>,
    limit: Option<usize>,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            columns: "*".to_string(),
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(mut self, columns: &str) -> Self {
        self.columns = columns.to_string();
        self
    }

    /// `column = value`
    pub fn eq(mut self, column: &str, value: impl fmt::Display) -> Self {
        self.filters.push((column.to_string(), format!("eq.{}", value)));
        self
    }

    pub fn order(mut self, column: &str, direction: Direction) -> Self {
        self.order.push(OrderBy {
            column: column.to_string(),
            direction,
        });
        self
    }

    pub fn order_by(mut self, term: OrderBy) -> Self {
        self.order.push(term);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Query parameters in the order the backend documents them.
    pub fn pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("select".to_string(), self.columns.clone())];
        pairs.extend(self.filters.iter().cloned());
        if !self.order.is_empty() {
            let order = self
                .order
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",");
            pairs.push(("order".to_string(), order));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        pairs
    }

    /// Filter-only parameters, used by update and delete.
    pub fn filter_pairs(&self) -> Vec<(String, String)> {
        self.filters.clone()
    }

    pub fn apply(&self, url: &mut Url) {
        url.query_pairs_mut().extend_pairs(self.pairs());
    }
}
