//! Sort orders applied to queries.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{HqlError, HqlResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn is_descending(self) -> bool {
        self == Direction::Desc
    }
}

impl FromStr for Direction {
    type Err = HqlError;

    fn from_str(s: &str) -> HqlResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Direction::Asc),
            "desc" | "descending" => Ok(Direction::Desc),
            other => Err(HqlError::InvalidSort(format!(
                "Unknown sort direction: {}",
                other
            ))),
        }
    }
}

/// One sort term: a property path, its direction and case sensitivity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub property: String,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub ignore_case: bool,
}

impl Order {
    pub fn new(direction: Direction, property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction,
            ignore_case: false,
        }
    }

    pub fn asc(property: impl Into<String>) -> Self {
        Self::new(Direction::Asc, property)
    }

    pub fn desc(property: impl Into<String>) -> Self {
        Self::new(Direction::Desc, property)
    }

    /// Compare case-insensitively.
    pub fn ignore_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }

    pub fn is_descending(&self) -> bool {
        self.direction.is_descending()
    }

    pub fn validate(&self) -> HqlResult<()> {
        if self.property.trim().is_empty() {
            return Err(HqlError::InvalidSort(
                "Sort property must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parses `property[,asc|desc][,ignorecase]`.
impl FromStr for Order {
    type Err = HqlError;

    fn from_str(s: &str) -> HqlResult<Self> {
        let mut parts = s.split(',').map(str::trim);
        let property = parts.next().unwrap_or_default();

        let mut order = Order::asc(property);
        order.validate()?;

        for part in parts {
            if part.eq_ignore_ascii_case("ignorecase") || part.eq_ignore_ascii_case("ic") {
                order.ignore_case = true;
            } else {
                order.direction = part.parse()?;
            }
        }

        Ok(order)
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = match self.direction {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        };
        write!(f, "{},{}", self.property, direction)?;
        if self.ignore_case {
            write!(f, ",ignorecase")?;
        }
        Ok(())
    }
}

/// Ordered list of sort terms. An empty sort is "unsorted".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sort {
    orders: Vec<Order>,
}

impl Sort {
    pub fn unsorted() -> Self {
        Self::default()
    }

    /// Ascending sort over the given properties.
    pub fn by<I, S>(properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            orders: properties.into_iter().map(Order::asc).collect(),
        }
    }

    pub fn from_orders(orders: Vec<Order>) -> HqlResult<Self> {
        for order in &orders {
            order.validate()?;
        }
        Ok(Self { orders })
    }

    pub fn and(mut self, order: Order) -> Self {
        self.orders.push(order);
        self
    }

    pub fn is_sorted(&self) -> bool {
        !self.orders.is_empty()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Order> {
        self.orders.iter()
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }
}

impl<'a> IntoIterator for &'a Sort {
    type Item = &'a Order;
    type IntoIter = std::slice::Iter<'a, Order>;

    fn into_iter(self) -> Self::IntoIter {
        self.orders.iter()
    }
}

impl FromIterator<Order> for Sort {
    fn from_iter<T: IntoIterator<Item = Order>>(iter: T) -> Self {
        Self {
            orders: iter.into_iter().collect(),
        }
    }
}
